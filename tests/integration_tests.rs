use faidx_rs::{BoundsPolicy, FastaError, FastaIndex, FastaReader};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Write `records` as FASTA wrapped at `line_bases`, plus a matching `.fai`
fn create_test_fasta(records: &[(&str, &str)], line_bases: usize) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let fasta = dir.path().join("test.fa");

    let mut data = String::new();
    let mut fai = String::new();
    for (name, seq) in records {
        data.push_str(&format!(">{} description\n", name));
        let offset = data.len();
        for line in seq.as_bytes().chunks(line_bases) {
            data.push_str(std::str::from_utf8(line).unwrap());
            data.push('\n');
        }
        fai.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            name,
            seq.len(),
            offset,
            line_bases,
            line_bases + 1
        ));
    }

    fs::write(&fasta, data).unwrap();
    fs::write(dir.path().join("test.fa.fai"), fai).unwrap();
    (dir, fasta)
}

fn default_records() -> Vec<(&'static str, &'static str)> {
    vec![
        ("seq1", "ATCGATCGATCGATCG"),
        ("seq2", "GCTAGCTAGCTAGCTAAAAAAAAAAAAAAAAA"),
        ("seq3", "TTTTTTTTTTTTTTTT"),
    ]
}

#[test]
fn test_basic_functionality() {
    let (_dir, path) = create_test_fasta(&default_records(), 10);

    let index = FastaIndex::for_fasta(&path).unwrap();

    // Test index metadata
    assert_eq!(index.num_sequences(), 3);

    // Test sequence names
    let names = index.sequence_names();
    assert_eq!(names, vec!["seq1", "seq2", "seq3"]);

    // Test sequence lengths
    assert_eq!(index.sequence_length("seq1"), Some(16));
    assert_eq!(index.sequence_length("seq2"), Some(32));
    assert!(index.sequence_length("nonexistent").is_none());

    // Test sequence existence
    assert!(index.has_sequence("seq1"));
    assert!(!index.has_sequence("nonexistent"));

    let reader = FastaReader::new(&index, &path).unwrap();

    let seq = reader.fetch("seq1", 0, 10).unwrap();
    assert_eq!(seq.seq, "ATCGATCGAT");
    assert_eq!(seq.len, 10);

    let seq = reader.fetch("seq2", 8, 24).unwrap();
    assert_eq!(seq.seq, "GCTAGCTAAAAAAAAA");
}

#[test]
fn test_open_with_sibling_index() {
    let (_dir, path) = create_test_fasta(&default_records(), 7);

    let reader = FastaReader::open(&path).unwrap();
    assert_eq!(reader.fetch_seq_all("seq3").unwrap().seq, "T".repeat(16));
    assert_eq!(reader.index().num_sequences(), 3);
}

#[test]
fn test_error_handling() {
    // Test with nonexistent file
    let result = FastaIndex::for_fasta("/nonexistent/file.fa");
    assert!(result.is_err());

    match result.unwrap_err() {
        FastaError::Io(_) => (),
        _ => panic!("Expected Io"),
    }

    // Index present, FASTA missing
    let (dir, path) = create_test_fasta(&default_records(), 10);
    let index = FastaIndex::for_fasta(&path).unwrap();
    let result = FastaReader::new(&index, dir.path().join("missing.fa"));
    assert!(matches!(result, Err(FastaError::Io(_))));
}

#[test]
fn test_multi_line_region() {
    let bases: String = (0..400).map(|i| b"ACGT"[(i * 7 + i / 3) % 4] as char).collect();
    let (_dir, path) = create_test_fasta(&[("chr1", bases.as_str())], 60);
    let reader = FastaReader::open(&path).unwrap();

    // Starts 5 bases before the first line break and spans three of them
    let seq = reader.fetch("chr1", 55, 205).unwrap();
    assert_eq!(seq.len, 150);
    assert_eq!(seq.seq, &bases[55..205]);
    assert!(!seq.seq.contains('\n'));

    // Every line boundary, from both sides
    for boundary in [60, 120, 180, 240, 300, 360] {
        assert_eq!(
            reader.fetch("chr1", boundary - 1, boundary + 1).unwrap().seq,
            &bases[boundary as usize - 1..boundary as usize + 1]
        );
    }

    assert_eq!(reader.fetch("chr1", 390, 400).unwrap().seq, &bases[390..]);
}

#[test]
fn test_fetch_lengths() {
    let (_dir, path) = create_test_fasta(&default_records(), 5);
    let reader = FastaReader::open(&path).unwrap();

    for start in 0..=32 {
        for end in start..=32 {
            let seq = reader.fetch("seq2", start, end).unwrap();
            assert_eq!(seq.len as i64, end - start);
            assert_eq!(seq.seq.len(), seq.len);
            assert_eq!((seq.start, seq.end), (start, end));
        }
    }
}

#[test]
fn test_at_matches_fetch() {
    let (_dir, path) = create_test_fasta(&default_records(), 6);
    let reader = FastaReader::open(&path).unwrap();

    for pos in 0..32 {
        let base = reader.at("seq2", pos).unwrap();
        assert_eq!(base.to_string(), reader.fetch("seq2", pos, pos + 1).unwrap().seq);
    }
}

#[test]
fn test_empty_regions() {
    let (_dir, path) = create_test_fasta(&default_records(), 10);
    let reader = FastaReader::open(&path).unwrap();

    for pos in [0, 9, 10, 16] {
        let seq = reader.fetch("seq1", pos, pos).unwrap();
        assert_eq!(seq.seq, "");
        assert_eq!(seq.len, 0);
    }
}

#[test]
fn test_range_validation() {
    let (_dir, path) = create_test_fasta(&default_records(), 10);
    let reader = FastaReader::open(&path).unwrap();

    for (start, end) in [(-1, 5), (-1, 0), (-10, -20), (5, 4), (0, -1), (-5, -5)] {
        assert!(
            matches!(
                reader.fetch("seq1", start, end),
                Err(FastaError::InvalidRange { .. })
            ),
            "{start}..{end}"
        );
    }

    assert!(matches!(
        reader.fetch("chrUn", 0, 1),
        Err(FastaError::UnknownSequence(_))
    ));
    assert!(matches!(
        reader.fetch("seq1", 10, 17),
        Err(FastaError::RangeOutOfBounds { length: 16, .. })
    ));
}

#[test]
fn test_clamp_policy() {
    let (_dir, path) = create_test_fasta(&default_records(), 10);
    let reader = FastaReader::open(&path)
        .unwrap()
        .with_policy(BoundsPolicy::Clamp);

    let seq = reader.fetch("seq1", 12, 100).unwrap();
    assert_eq!(seq.seq, "ATCG");
    assert_eq!((seq.start, seq.end), (12, 16));
}

#[test]
fn test_region_parsing() {
    let (_dir, path) = create_test_fasta(&default_records(), 10);
    let reader = FastaReader::open(&path).unwrap();

    // 0-based half-open
    assert_eq!(reader.fetch_region("seq1:0-10").unwrap().seq, "ATCGATCGAT");
    // samtools style 1-based inclusive
    assert_eq!(
        reader.fetch_region_one_based("seq1:1-10").unwrap().seq,
        "ATCGATCGAT"
    );

    // Test whole sequence fetch
    assert_eq!(reader.fetch_region("seq1").unwrap().seq, "ATCGATCGATCGATCG");

    // Test invalid region
    assert!(matches!(
        reader.fetch_region("seq1:ten-20"),
        Err(FastaError::InvalidRegion(_))
    ));
    assert!(matches!(
        reader.fetch_region("invalid_format"),
        Err(FastaError::UnknownSequence(_))
    ));
}

#[test]
fn test_metrics_on_fetched_region() {
    let (_dir, path) = create_test_fasta(&[("chr1", "AAAAAATTTTTCCCCCCCGGGCGCGCG")], 8);
    let reader = FastaReader::open(&path).unwrap();

    let seq = reader.fetch("chr1", 0, 21).unwrap();
    assert!((seq.complexity() - 0.15).abs() < 1e-12);
    assert!((seq.gc_content() - 10.0 / 21.0).abs() < 1e-12);

    let seq = reader.fetch("chr1", 21, 27).unwrap();
    assert_eq!(seq.seq, "CGCGCG");
    assert_eq!(seq.count_cpg(), 3);
    assert_eq!(seq.gc_content(), 1.0);
}

#[test]
fn test_close() {
    let (_dir, path) = create_test_fasta(&default_records(), 10);
    let reader = FastaReader::open(&path).unwrap();

    assert!(reader.fetch("seq1", 0, 4).is_ok());
    reader.close();
    assert!(matches!(reader.fetch("seq1", 0, 4), Err(FastaError::Closed)));
    assert!(matches!(reader.at("seq1", 0), Err(FastaError::Closed)));
}

#[test]
fn test_clone_and_drop() {
    let (_dir, path) = create_test_fasta(&default_records(), 10);
    let index = FastaIndex::for_fasta(&path).unwrap();

    // Test cloning
    let index_clone = index.clone();

    // Both should have the same number of sequences
    assert_eq!(index.num_sequences(), index_clone.num_sequences());

    // Test that readers can be created from both
    let reader1 = FastaReader::new(&index, &path).unwrap();
    let reader2 = FastaReader::new(&index_clone, &path).unwrap();

    // Readers keep the index alive on their own
    drop(index);
    drop(index_clone);
    assert_eq!(reader1.fetch("seq3", 0, 2).unwrap().seq, "TT");
    assert_eq!(reader2.fetch("seq1", 0, 2).unwrap().seq, "AT");
}

#[test]
fn test_many_readers() {
    let (_dir, path) = create_test_fasta(&default_records(), 10);
    let index = FastaIndex::for_fasta(&path).unwrap();

    // Create many readers and drop them
    for i in 0..100 {
        let reader = FastaReader::new(&index, &path).unwrap();
        assert_eq!(reader.at("seq1", i % 16).unwrap(), "ATCG".as_bytes()[(i % 4) as usize] as char);
    }
}

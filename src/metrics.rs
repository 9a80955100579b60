//! Sequence statistics over fetched bases.
//!
//! All functions take raw bytes and never fail: degenerate inputs (empty or
//! single-base sequences) yield 0.

/// Per-character tallies of a nucleotide sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaseCounts {
    pub a: usize,
    pub c: usize,
    pub g: usize,
    pub t: usize,
    /// Ambiguous `N` bases
    pub n: usize,
    /// Anything that is not ACGTN
    pub other: usize,
}

impl BaseCounts {
    /// All characters counted
    pub fn total(&self) -> usize {
        self.a + self.c + self.g + self.t + self.n + self.other
    }

    /// G plus C
    pub fn gc(&self) -> usize {
        self.g + self.c
    }
}

/// Classify every byte of `seq`, ignoring case
pub fn count_bases(seq: &[u8]) -> BaseCounts {
    let mut counts = BaseCounts::default();
    for &base in seq {
        match base.to_ascii_uppercase() {
            b'A' => counts.a += 1,
            b'C' => counts.c += 1,
            b'G' => counts.g += 1,
            b'T' => counts.t += 1,
            b'N' => counts.n += 1,
            _ => counts.other += 1,
        }
    }
    counts
}

/// Fraction of bases that are G or C, over the full length.
///
/// ```
/// use faidx_rs::gc_content;
///
/// assert_eq!(gc_content(b"GCgc"), 1.0);
/// assert_eq!(gc_content(b"ATNN"), 0.0);
/// assert_eq!(gc_content(b""), 0.0);
/// ```
pub fn gc_content(seq: &[u8]) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    count_bases(seq).gc() as f64 / seq.len() as f64
}

/// Fraction of adjacent positions whose bases differ.
///
/// Comparison is byte-exact, so `a` and `A` count as different. Sequences
/// of length 0 or 1 have no adjacent pairs and score 0.
///
/// ```
/// use faidx_rs::complexity;
///
/// // 3 transitions over 20 adjacent pairs
/// assert!((complexity(b"AAAAAATTTTTCCCCCCCGGG") - 0.15).abs() < 1e-12);
/// ```
pub fn complexity(seq: &[u8]) -> f64 {
    if seq.len() <= 1 {
        return 0.0;
    }
    let transitions = seq.windows(2).filter(|w| w[0] != w[1]).count();
    transitions as f64 / (seq.len() - 1) as f64
}

/// Count CG/GC dinucleotides, case-insensitive.
///
/// Matching windows are taken greedily from the left and never overlap: the
/// window right after a counted one is skipped, so `CGC` is a single CpG and
/// `CGCGCG` is three.
pub fn count_cpg(seq: &[u8]) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i + 1 < seq.len() {
        if is_cpg(seq[i], seq[i + 1]) {
            count += 1;
            i += 2;
        } else {
            i += 1;
        }
    }
    count
}

fn is_cpg(first: u8, second: u8) -> bool {
    matches!(
        (first.to_ascii_uppercase(), second.to_ascii_uppercase()),
        (b'C', b'G') | (b'G', b'C')
    )
}

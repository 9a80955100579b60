//! `.fai` index loading and per-sequence byte arithmetic.
//!
//! Each line of a FASTA index describes one sequence with five tab-separated
//! columns:
//!
//! | column | meaning |
//! |---|---|
//! | NAME | sequence name |
//! | LENGTH | number of bases |
//! | OFFSET | byte offset of the first base |
//! | LINEBASES | bases per wrapped line |
//! | LINEWIDTH | bytes per wrapped line, terminator included |

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use log::debug;

use crate::{FastaError, FastaResult};

const FAI_COLUMNS: usize = 5;

/// Location of one sequence inside the FASTA file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    /// Sequence name
    pub name: String,
    /// Number of bases
    pub length: u64,
    /// Byte offset of base 0
    pub offset: u64,
    /// Bases per wrapped line
    pub line_bases: u64,
    /// Bytes per wrapped line including the line terminator
    pub line_width: u64,
}

impl IndexRecord {
    /// Parse a record from one index line.
    ///
    /// `line_no` is 1-based and only used for error reporting.
    pub fn from_line(line: &str, line_no: usize) -> FastaResult<Self> {
        let malformed = |msg: String| FastaError::MalformedIndex { line: line_no, msg };

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != FAI_COLUMNS {
            return Err(malformed(format!(
                "expected {} tab-separated fields, found {}",
                FAI_COLUMNS,
                fields.len()
            )));
        }

        let name = fields[0];
        if name.is_empty() {
            return Err(malformed("empty sequence name".to_string()));
        }

        let number = |idx: usize, column: &str| -> FastaResult<u64> {
            fields[idx]
                .parse::<u64>()
                .map_err(|e| malformed(format!("invalid {} '{}': {}", column, fields[idx], e)))
        };

        let record = IndexRecord {
            name: name.to_string(),
            length: number(1, "length")?,
            offset: number(2, "offset")?,
            line_bases: number(3, "line bases")?,
            line_width: number(4, "line width")?,
        };

        if record.line_width < record.line_bases {
            return Err(malformed(format!(
                "line width {} is smaller than line bases {}",
                record.line_width, record.line_bases
            )));
        }
        // Empty sequences are written with zero line bases
        if record.line_bases == 0 && record.length > 0 {
            return Err(malformed("line bases must be positive".to_string()));
        }

        Ok(record)
    }

    /// Number of terminator bytes at the end of every wrapped line
    pub fn terminator_width(&self) -> u64 {
        self.line_width - self.line_bases
    }

    /// Byte position of base `pos` in the FASTA file.
    ///
    /// `pos` is not checked against `length`; callers validate the range.
    pub fn byte_offset(&self, pos: u64) -> u64 {
        if self.line_bases == 0 {
            return self.offset;
        }
        self.offset + (pos / self.line_bases) * self.line_width + pos % self.line_bases
    }

    /// First byte and raw byte count covering the bases in `[start, end)`,
    /// embedded line terminators included.
    ///
    /// An empty range yields a zero-length span at `start`.
    pub fn byte_span(&self, start: u64, end: u64) -> (u64, u64) {
        let first = self.byte_offset(start);
        if end <= start {
            return (first, 0);
        }
        let last = self.byte_offset(end - 1);
        (first, last - first + 1)
    }
}

struct IndexInner {
    records: Vec<IndexRecord>,
    by_name: HashMap<String, usize>,
}

/// Shared FASTA index metadata
///
/// Immutable once loaded. Cloning is cheap and shares the same records, so a
/// single index can back any number of readers across threads.
#[derive(Clone)]
pub struct FastaIndex {
    inner: Arc<IndexInner>,
}

impl std::fmt::Debug for FastaIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastaIndex")
            .field("num_sequences", &self.num_sequences())
            .field("sequence_names", &self.sequence_names())
            .finish()
    }
}

impl FastaIndex {
    /// Parse an index from any line-oriented source
    ///
    /// # Errors
    ///
    /// `MalformedIndex` for a line that is not UTF-8, has the wrong number of
    /// fields or a bad number, `DuplicateKey` when a name repeats, `Io` on read failure.
    pub fn from_reader<R: Read>(reader: R) -> FastaResult<Self> {
        let mut records = Vec::new();
        let mut by_name = HashMap::new();

        for (i, line) in BufReader::new(reader).split(b'\n').enumerate() {
            let line = line?;
            let line = std::str::from_utf8(&line).map_err(|e| FastaError::MalformedIndex {
                line: i + 1,
                msg: format!("not valid UTF-8: {}", e),
            })?;
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.trim().is_empty() {
                continue;
            }

            let record = IndexRecord::from_line(line, i + 1)?;
            if by_name.contains_key(&record.name) {
                return Err(FastaError::DuplicateKey(record.name));
            }
            by_name.insert(record.name.clone(), records.len());
            records.push(record);
        }

        debug!("Loaded FASTA index with {} sequences", records.len());

        Ok(FastaIndex {
            inner: Arc::new(IndexInner { records, by_name }),
        })
    }

    /// Load an index file from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> FastaResult<Self> {
        let path = path.as_ref();
        debug!("Reading FASTA index {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load the `.fai` index that sits next to `fasta`
    pub fn for_fasta<P: AsRef<Path>>(fasta: P) -> FastaResult<Self> {
        Self::from_path(fai_path(fasta.as_ref()))
    }

    /// Look up the record for `name`
    pub fn get(&self, name: &str) -> FastaResult<&IndexRecord> {
        self.inner
            .by_name
            .get(name)
            .map(|&i| &self.inner.records[i])
            .ok_or_else(|| FastaError::UnknownSequence(name.to_string()))
    }

    /// Get the number of sequences in the index
    pub fn num_sequences(&self) -> usize {
        self.inner.records.len()
    }

    /// True when the index lists no sequences
    pub fn is_empty(&self) -> bool {
        self.inner.records.is_empty()
    }

    /// Get the name of the sequence at the given index
    pub fn sequence_name(&self, index: usize) -> Option<&str> {
        self.inner.records.get(index).map(|r| r.name.as_str())
    }

    /// Get the length of the specified sequence
    pub fn sequence_length(&self, name: &str) -> Option<u64> {
        self.get(name).ok().map(|r| r.length)
    }

    /// Check if the index contains the specified sequence
    pub fn has_sequence(&self, name: &str) -> bool {
        self.inner.by_name.contains_key(name)
    }

    /// Get all sequence names in file order
    pub fn sequence_names(&self) -> Vec<String> {
        self.records().map(|r| r.name.clone()).collect()
    }

    /// Iterate over records in file order
    pub fn records(&self) -> impl Iterator<Item = &IndexRecord> {
        self.inner.records.iter()
    }
}

/// `genome.fa` -> `genome.fa.fai`
pub(crate) fn fai_path(fasta: &Path) -> std::path::PathBuf {
    let mut name = fasta.as_os_str().to_owned();
    name.push(".fai");
    name.into()
}

//! # faidx-rs
//!
//! Random access to FASTA files through a `.fai` companion index.
//!
//! The index is loaded once into a shared, immutable lookup table. Readers
//! built on top of it translate 0-based half-open coordinates into byte
//! offsets inside the line-wrapped FASTA, seek straight to the region and
//! return only the bases, with line terminators removed.
//!
//! ## Features
//!
//! - Index shared across any number of readers and threads
//! - One explicit seek per fetch, no reliance on the previous file position
//! - Reader usable from several threads (fetches serialize) or one reader per thread
//! - GC content, adjacent-base complexity and CpG counting on fetched regions
//!
//! ## Example
//!
//! ```rust,no_run
//! use faidx_rs::{FastaIndex, FastaReader};
//!
//! // Load the index metadata once
//! let index = FastaIndex::for_fasta("genome.fa")?;
//!
//! // Create readers for each thread
//! let reader = FastaReader::new(&index, "genome.fa")?;
//!
//! // Fetch sequence data
//! let sequence = reader.fetch("chr1", 1000, 1100)?;
//! println!("{} GC={:.3}", sequence.seq, sequence.gc_content());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use thiserror::Error;

pub mod index;
pub mod metrics;
pub mod reader;
pub mod region;

pub use index::{FastaIndex, IndexRecord};
pub use metrics::{complexity, count_bases, count_cpg, gc_content, BaseCounts};
pub use reader::{strip_line_terminators, BoundsPolicy, FastaReader, Sequence};
pub use region::{Coordinates, Region};

/// Error types for FASTA index operations
#[derive(Error, Debug)]
pub enum FastaError {
    #[error("Malformed index at line {line}: {msg}")]
    MalformedIndex { line: usize, msg: String },
    #[error("Duplicate sequence name in index: {0}")]
    DuplicateKey(String),
    #[error("Sequence not found: {0}")]
    UnknownSequence(String),
    #[error("Invalid range: start={start} end={end}")]
    InvalidRange { start: i64, end: i64 },
    #[error("Range end {end} exceeds length {length} of sequence {name}")]
    RangeOutOfBounds { name: String, end: i64, length: u64 },
    #[error("Invalid region: {0}")]
    InvalidRegion(String),
    #[error("Non-ASCII bytes in sequence data for {0}")]
    InvalidSequenceData(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Reader has been closed")]
    Closed,
}

/// Result type for FASTA operations
pub type FastaResult<T> = Result<T, FastaError>;

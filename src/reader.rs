//! Region extraction from an indexed FASTA file.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, trace};

use crate::index::{FastaIndex, IndexRecord};
use crate::metrics::{self, BaseCounts};
use crate::region::{Coordinates, Region};
use crate::{FastaError, FastaResult};

/// What to do when a requested end lies past the end of the sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoundsPolicy {
    /// Fail with `RangeOutOfBounds`
    #[default]
    Reject,
    /// Truncate the range to the sequence length
    Clamp,
}

/// Bases fetched from one region, in 0-based half-open coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub seq: String,
    /// Always `seq.len()`, equal to `end - start`
    pub len: usize,
}

impl Sequence {
    /// True for a zero-length region
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Raw bases as bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.seq.as_bytes()
    }

    /// Fraction of G/C bases, 0 for an empty sequence
    pub fn gc_content(&self) -> f64 {
        metrics::gc_content(self.as_bytes())
    }

    /// Fraction of adjacent bases that differ, 0 below two bases
    pub fn complexity(&self) -> f64 {
        metrics::complexity(self.as_bytes())
    }

    /// Non-overlapping CG/GC dinucleotide count
    pub fn count_cpg(&self) -> usize {
        metrics::count_cpg(self.as_bytes())
    }

    /// Per-character tallies of the bases
    pub fn base_counts(&self) -> BaseCounts {
        metrics::count_bases(self.as_bytes())
    }
}

/// Drop the line terminators embedded in a raw byte span.
///
/// `raw` must start at column `first_column` of a wrapped line. Within every
/// `line_width` bytes, the columns at or past `line_bases` are terminator
/// bytes.
pub fn strip_line_terminators(
    raw: &[u8],
    first_column: u64,
    line_bases: u64,
    line_width: u64,
) -> Vec<u8> {
    if line_width == line_bases || line_width == 0 {
        return raw.to_vec();
    }

    let mut bases = Vec::with_capacity(raw.len());
    let mut pos = 0;
    let mut column = first_column % line_width;
    while pos < raw.len() {
        let remaining = raw.len() - pos;
        if column < line_bases {
            let take = ((line_bases - column) as usize).min(remaining);
            bases.extend_from_slice(&raw[pos..pos + take]);
            pos += take;
            column += take as u64;
        } else {
            pos += ((line_width - column) as usize).min(remaining);
            column = 0;
        }
    }
    bases
}

/// FASTA reader for accessing sequences
///
/// Holds one read handle and a shared index. The handle is guarded by a mutex
/// so a reader can be shared between threads; each fetch seeks explicitly
/// under the lock. For parallel reads, open one reader per thread over the
/// same [`FastaIndex`].
pub struct FastaReader<R = File> {
    handle: Mutex<Option<R>>,
    index: FastaIndex,
    policy: BoundsPolicy,
}

impl<R> std::fmt::Debug for FastaReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastaReader")
            .field("index", &self.index)
            .field("policy", &self.policy)
            .finish()
    }
}

impl FastaReader<File> {
    /// Open the FASTA file at `fasta` for reading through `index`
    pub fn new<P: AsRef<Path>>(index: &FastaIndex, fasta: P) -> FastaResult<Self> {
        let fasta = fasta.as_ref();
        debug!("Opening FASTA {}", fasta.display());
        let file = File::open(fasta)?;
        Self::from_reader(index, file)
    }

    /// Load `<fasta>.fai` and open `fasta` in one step
    pub fn open<P: AsRef<Path>>(fasta: P) -> FastaResult<Self> {
        let index = FastaIndex::for_fasta(fasta.as_ref())?;
        Self::new(&index, fasta)
    }
}

impl<R: Read + Seek> FastaReader<R> {
    /// Wrap an arbitrary seekable source.
    ///
    /// The source is rewound once to prove it can seek. Its contents are not
    /// checked against the index until a region is fetched.
    pub fn from_reader(index: &FastaIndex, mut source: R) -> FastaResult<Self> {
        source.seek(SeekFrom::Start(0))?;
        Ok(FastaReader {
            handle: Mutex::new(Some(source)),
            index: index.clone(),
            policy: BoundsPolicy::default(),
        })
    }

    /// Set how regions running past the sequence end are handled
    pub fn with_policy(mut self, policy: BoundsPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current bounds policy
    pub fn policy(&self) -> BoundsPolicy {
        self.policy
    }

    /// The index this reader resolves names through
    pub fn index(&self) -> &FastaIndex {
        &self.index
    }

    /// Fetch the bases of `chrom` in `[start, end)`
    ///
    /// # Errors
    ///
    /// - `Closed` after [`close`](Self::close)
    /// - `InvalidRange` if `end < start` or `start < 0`
    /// - `UnknownSequence` if `chrom` is not indexed
    /// - `RangeOutOfBounds` if `end` is past the sequence and the policy is
    ///   [`BoundsPolicy::Reject`]
    /// - `Io` if the seek or read fails, including a file shorter than the
    ///   index claims
    pub fn fetch(&self, chrom: &str, start: i64, end: i64) -> FastaResult<Sequence> {
        let mut guard = self.lock();
        let handle = guard.as_mut().ok_or(FastaError::Closed)?;

        if end < start || start < 0 {
            return Err(FastaError::InvalidRange { start, end });
        }
        let record = self.index.get(chrom)?;
        let (start, end) = self.resolve_bounds(record, start as u64, end as u64)?;

        let (first, span) = record.byte_span(start, end);
        trace!(
            "Fetching {}:{}-{} from bytes {}..{}",
            chrom,
            start,
            end,
            first,
            first + span
        );

        let raw = read_span(handle, first, span)?;
        drop(guard);

        let bases = strip_line_terminators(
            &raw,
            start % record.line_bases.max(1),
            record.line_bases,
            record.line_width,
        );
        debug_assert_eq!(bases.len() as u64, end - start);

        if !bases.is_ascii() {
            return Err(FastaError::InvalidSequenceData(chrom.to_string()));
        }
        let seq = String::from_utf8(bases)
            .map_err(|_| FastaError::InvalidSequenceData(chrom.to_string()))?;

        Ok(Sequence {
            chrom: chrom.to_string(),
            start: start as i64,
            end: end as i64,
            len: seq.len(),
            seq,
        })
    }

    /// Fetch the single base at `pos`
    pub fn at(&self, chrom: &str, pos: i64) -> FastaResult<char> {
        let end = pos
            .checked_add(1)
            .ok_or(FastaError::InvalidRange { start: pos, end: pos })?;
        let seq = self.fetch(chrom, pos, end)?;
        seq.seq.chars().next().ok_or_else(|| FastaError::RangeOutOfBounds {
            name: chrom.to_string(),
            end,
            length: seq.end as u64,
        })
    }

    /// Fetch the entire sequence
    pub fn fetch_seq_all(&self, chrom: &str) -> FastaResult<Sequence> {
        let length = self.index.get(chrom)?.length;
        self.fetch(chrom, 0, length as i64)
    }

    /// Fetch a 0-based region string such as `chr1:1000-2000`
    pub fn fetch_region(&self, region: &str) -> FastaResult<Sequence> {
        self.fetch_region_with(region, Coordinates::ZeroBased)
    }

    /// Fetch a samtools-style 1-based inclusive region string
    pub fn fetch_region_one_based(&self, region: &str) -> FastaResult<Sequence> {
        self.fetch_region_with(region, Coordinates::OneBased)
    }

    /// Fetch a region string in the given coordinate convention
    pub fn fetch_region_with(&self, region: &str, coords: Coordinates) -> FastaResult<Sequence> {
        // An exact sequence name wins over reading it as name:range
        let region = if self.index.has_sequence(region) {
            Region::whole(region)
        } else {
            Region::parse(region, coords)?
        };
        self.fetch_parsed(&region)
    }

    /// Fetch an already parsed [`Region`]; an open end runs to the sequence end
    pub fn fetch_parsed(&self, region: &Region) -> FastaResult<Sequence> {
        // A start past the end is left for the bounds policy to judge
        let end = match region.end {
            Some(end) => end,
            None => (self.index.get(&region.chrom)?.length as i64).max(region.start),
        };
        self.fetch(&region.chrom, region.start, end)
    }

    /// Release the file handle. Later fetches fail with `Closed`.
    pub fn close(&self) {
        if self.lock().take().is_some() {
            debug!("Closed FASTA reader");
        }
    }

    /// Whether [`close`](Self::close) has released the handle
    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    fn lock(&self) -> MutexGuard<'_, Option<R>> {
        // The guarded state is a handle that every fetch re-seeks
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve_bounds(&self, record: &IndexRecord, start: u64, end: u64) -> FastaResult<(u64, u64)> {
        if end <= record.length {
            return Ok((start, end));
        }
        match self.policy {
            BoundsPolicy::Reject => Err(FastaError::RangeOutOfBounds {
                name: record.name.clone(),
                end: end as i64,
                length: record.length,
            }),
            BoundsPolicy::Clamp => {
                debug!(
                    "Clamping {}:{}-{} to length {}",
                    record.name, start, end, record.length
                );
                Ok((start.min(record.length), record.length))
            }
        }
    }
}

fn read_span<R: Read + Seek>(handle: &mut R, first: u64, span: u64) -> FastaResult<Vec<u8>> {
    let mut raw = vec![0u8; span as usize];
    if span == 0 {
        return Ok(raw);
    }
    handle.seek(SeekFrom::Start(first))?;
    handle.read_exact(&mut raw)?;
    Ok(raw)
}

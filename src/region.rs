//! Region strings such as `chr1`, `chr1:1000` and `chr1:1,000-2,000`.

use std::fmt;
use std::str::FromStr;

use crate::{FastaError, FastaResult};

/// Coordinate convention of a region string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Coordinates {
    /// 0-based half-open, as in BED files and bedtools
    #[default]
    ZeroBased,
    /// 1-based inclusive, as in samtools faidx
    OneBased,
}

/// A parsed region in 0-based half-open coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub chrom: String,
    pub start: i64,
    /// `None` runs to the end of the sequence
    pub end: Option<i64>,
}

impl Region {
    /// The whole of `chrom`
    pub fn whole(chrom: &str) -> Self {
        Region {
            chrom: chrom.to_string(),
            start: 0,
            end: None,
        }
    }

    /// Parse a region string.
    ///
    /// Accepted forms are `chrom`, `chrom:pos`, `chrom:start-end` and
    /// `chrom:start-`. The range is split off at the last colon.
    pub fn parse(region: &str, coords: Coordinates) -> FastaResult<Self> {
        let invalid = || FastaError::InvalidRegion(region.to_string());

        let Some((chrom, range)) = region.rsplit_once(':') else {
            if region.is_empty() {
                return Err(invalid());
            }
            return Ok(Region::whole(region));
        };
        if chrom.is_empty() || range.is_empty() {
            return Err(invalid());
        }

        let shift = match coords {
            Coordinates::ZeroBased => 0,
            Coordinates::OneBased => 1,
        };

        let (start, end) = match range.split_once('-') {
            Some((start, "")) => (parse_position(start).ok_or_else(invalid)? - shift, None),
            Some((start, end)) => (
                parse_position(start).ok_or_else(invalid)? - shift,
                Some(parse_position(end).ok_or_else(invalid)?),
            ),
            None => {
                let pos = parse_position(range).ok_or_else(invalid)? - shift;
                (pos, Some(pos.checked_add(1).ok_or_else(invalid)?))
            }
        };

        Ok(Region {
            chrom: chrom.to_string(),
            start,
            end,
        })
    }
}

impl FromStr for Region {
    type Err = FastaError;

    fn from_str(s: &str) -> FastaResult<Self> {
        Region::parse(s, Coordinates::ZeroBased)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}:{}-{}", self.chrom, self.start, end),
            None if self.start == 0 => write!(f, "{}", self.chrom),
            None => write!(f, "{}:{}-", self.chrom, self.start),
        }
    }
}

fn parse_position(s: &str) -> Option<i64> {
    let digits: String = s.chars().filter(|&c| c != ',').collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

//! Manifest data model.

use std::str::FromStr;

use segstream_common::{Error, Result};

/// A single byte range of a track file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Byte offset into the remote track file.
    pub offset: u64,
    /// Number of bytes. The parser only produces positive sizes.
    pub size: u64,
}

impl Segment {
    pub fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    /// Offset of the last byte in the range (inclusive), or `None` for an
    /// empty range or one that runs past `u64::MAX`.
    pub fn last_byte(&self) -> Option<u64> {
        self.size
            .checked_sub(1)
            .and_then(|len| self.offset.checked_add(len))
    }

    /// Value of the HTTP `Range` header selecting this segment.
    ///
    /// ```
    /// use segstream_manifest::Segment;
    ///
    /// assert_eq!(
    ///     Segment::new(100, 50).range_header().as_deref(),
    ///     Some("bytes=100-149")
    /// );
    /// assert_eq!(Segment::new(0, 0).range_header(), None);
    /// ```
    pub fn range_header(&self) -> Option<String> {
        self.last_byte()
            .map(|last| format!("bytes={}-{}", self.offset, last))
    }
}

/// One media stream of a movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Track file name, relative to the movie directory on the origin.
    pub filename: String,
    pub codec: String,
    pub bitrate: String,
    pub duration: String,
    /// Segments in manifest order.
    pub segments: Vec<Segment>,
}

impl Track {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Sum of all segment sizes.
    pub fn total_size(&self) -> u64 {
        self.segments.iter().map(|s| s.size).sum()
    }
}

/// A parsed movie manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub movie: String,
    pub tracks: Vec<Track>,
}

impl Manifest {
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Look up a track by index.
    ///
    /// The index is signed so that values coming straight from a command line
    /// (including negative ones) are rejected here with a typed error.
    pub fn track(&self, index: i64) -> Result<&Track> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.tracks.get(i))
            .ok_or(Error::TrackIndex {
                index,
                count: self.tracks.len(),
            })
    }

    /// Take ownership of one track, dropping the others.
    pub fn into_track(mut self, index: i64) -> Result<Track> {
        self.track(index)?;
        // track() has validated the index.
        Ok(self.tracks.swap_remove(index as usize))
    }
}

impl FromStr for Manifest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        crate::parse_manifest(s)
    }
}

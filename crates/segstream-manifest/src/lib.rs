//! Segstream-Manifest: movie manifest parsing.
//!
//! An origin describes every movie with a plain-text manifest listing its
//! tracks and, for each track, the byte ranges (segments) the track file is
//! split into. This crate turns that text into a [`Manifest`] so callers can
//! fetch a track segment by segment.
//!
//! # Format
//!
//! ```text
//! <movie name>
//! <track count T>
//! repeated T times:
//!   <filename>
//!   <codec>
//!   <bitrate>
//!   <duration>
//!   <segment count S>
//!   repeated S times: "<offset> <size>"
//! ```
//!
//! Codec, bitrate and duration are kept as opaque strings.
//!
//! # Examples
//!
//! ```
//! use segstream_manifest::parse_manifest;
//!
//! let text = "demo\n1\ndemo.mp4\navc1\n800000\n1.5\n2\n0 100\n100 50\n";
//! let manifest = parse_manifest(text).unwrap();
//!
//! assert_eq!(manifest.movie, "demo");
//! assert_eq!(manifest.track_count(), 1);
//! assert_eq!(manifest.tracks[0].total_size(), 150);
//! ```

mod cursor;
mod model;
mod parser;

pub use cursor::LineCursor;
pub use model::{Manifest, Segment, Track};
pub use parser::{parse_manifest, parse_track};

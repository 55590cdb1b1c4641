//! One-shot measurement reports.
//!
//! - Size report: track count, per-track segment count and byte size, read
//!   straight from the manifest
//! - Measured download: fetch every track segment by segment into local
//!   files and record elapsed time and throughput

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use segstream_common::{Error, Result};
use segstream_manifest::{Manifest, Segment};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::fetch::{SegmentFetcher, SegmentSource};

/// Sizes of one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSize {
    pub filename: String,
    pub segments: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeReport {
    pub tracks: Vec<TrackSize>,
}

impl SizeReport {
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let tracks = manifest
            .tracks
            .iter()
            .map(|track| TrackSize {
                filename: track.filename.clone(),
                segments: track.segment_count(),
                bytes: track.total_size(),
            })
            .collect();
        Self { tracks }
    }

    /// Track count, then each track's segment count, then each track's size,
    /// one value per line.
    pub fn render(&self) -> String {
        let mut out = format!("{}\n", self.tracks.len());
        for track in &self.tracks {
            out.push_str(&format!("{}\n", track.segments));
        }
        for track in &self.tracks {
            out.push_str(&format!("{}\n", track.bytes));
        }
        out
    }
}

/// Fetch and parse the manifest, then write its size report to `output`.
pub async fn write_size_report(fetcher: &SegmentFetcher, output: &Path) -> Result<SizeReport> {
    let manifest = fetch_manifest(fetcher).await?;
    let report = SizeReport::from_manifest(&manifest);
    tokio::fs::write(output, report.render()).await?;
    tracing::info!(tracks = report.tracks.len(), output = ?output, "size report written");
    Ok(report)
}

/// Timing of one downloaded track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackTiming {
    pub filename: String,
    pub bytes: u64,
    pub elapsed: Duration,
}

impl TrackTiming {
    /// Bytes per second, or 0 when no time elapsed.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 / secs
        } else {
            0.0
        }
    }
}

/// Two lines per track: elapsed seconds, then throughput in bytes/second.
pub fn render_timings(timings: &[TrackTiming]) -> String {
    timings
        .iter()
        .map(|t| format!("{}\n{}\n", t.elapsed.as_secs_f64(), t.throughput()))
        .collect()
}

/// Download one track's segments in order, appending each to `dest` as it
/// arrives.
pub async fn download_track<S: SegmentSource>(
    source: &S,
    segments: &[Segment],
    dest: &Path,
) -> Result<TrackTiming> {
    let start = Instant::now();
    let mut file = File::create(dest).await?;
    let mut bytes = 0u64;

    for (index, segment) in segments.iter().enumerate() {
        let data = source.fetch(segment).await?;
        file.write_all(&data).await?;
        bytes += data.len() as u64;
        tracing::trace!(segment = index, bytes = data.len(), "segment written");
    }
    file.flush().await?;

    Ok(TrackTiming {
        filename: dest
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        bytes,
        elapsed: start.elapsed(),
    })
}

/// Download every track of the movie into `dest_dir`.
///
/// Every local path is resolved before the first request, so two tracks
/// mapping to the same file fail the whole run up front.
pub async fn download_tracks(fetcher: &SegmentFetcher, dest_dir: &Path) -> Result<Vec<TrackTiming>> {
    let manifest = fetch_manifest(fetcher).await?;
    let destinations = local_paths(dest_dir, &manifest)?;

    let mut timings = Vec::with_capacity(manifest.track_count());
    for (index, (track, dest)) in manifest.tracks.iter().zip(&destinations).enumerate() {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tracing::info!(track = index, filename = %track.filename, dest = ?dest, "downloading track");

        let source = fetcher.for_track(&track.filename);
        let timing = download_track(&source, &track.segments, dest).await?;

        tracing::info!(
            track = index,
            elapsed_secs = timing.elapsed.as_secs_f64(),
            bytes_per_sec = timing.throughput(),
            "track downloaded"
        );
        timings.push(timing);
    }

    Ok(timings)
}

/// Download every track and write the timing report to `output`.
pub async fn write_download_report(
    fetcher: &SegmentFetcher,
    dest_dir: &Path,
    output: &Path,
) -> Result<Vec<TrackTiming>> {
    let timings = download_tracks(fetcher, dest_dir).await?;
    tokio::fs::write(output, render_timings(&timings)).await?;
    tracing::info!(tracks = timings.len(), output = ?output, "download report written");
    Ok(timings)
}

async fn fetch_manifest(fetcher: &SegmentFetcher) -> Result<Manifest> {
    let text = fetcher.fetch_manifest().await?;
    segstream_manifest::parse_manifest(&text)
}

/// Local files for every track of `manifest`, rejecting duplicates.
fn local_paths(dest_dir: &Path, manifest: &Manifest) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::with_capacity(manifest.track_count());
    manifest
        .tracks
        .iter()
        .map(|track| {
            let path = local_path(dest_dir, &track.filename)?;
            if !seen.insert(path.clone()) {
                return Err(invalid_filename(format!(
                    "track filename {:?} maps to {} which another track already uses",
                    track.filename,
                    path.display()
                )));
            }
            Ok(path)
        })
        .collect()
}

/// Local file for a track: the manifest filename relative to `dest_dir`.
/// Absolute paths and `..` components are rejected.
fn local_path(dest_dir: &Path, filename: &str) -> Result<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(filename).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(invalid_filename(format!(
                    "track filename {filename:?} escapes the destination directory"
                )));
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(invalid_filename(format!(
            "track filename {filename:?} has no file name component"
        )));
    }
    Ok(dest_dir.join(relative))
}

fn invalid_filename(msg: String) -> Error {
    Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, msg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use segstream_manifest::parse_manifest;

    #[test]
    fn test_size_report_render() {
        let manifest = parse_manifest(
            "m\n2\nv.mp4\nc\nb\nd\n2\n0 100\n100 50\na.m4a\nc\nb\nd\n3\n0 1\n1 1\n2 1\n",
        )
        .unwrap();
        let report = SizeReport::from_manifest(&manifest);
        assert_eq!(report.tracks[0].bytes, 150);
        assert_eq!(report.render(), "2\n2\n3\n150\n3\n");
    }

    #[test]
    fn test_size_report_empty_manifest() {
        let manifest = parse_manifest("m\n0\n").unwrap();
        assert_eq!(SizeReport::from_manifest(&manifest).render(), "0\n");
    }

    #[test]
    fn test_throughput() {
        let timing = TrackTiming {
            filename: "a".to_string(),
            bytes: 1000,
            elapsed: Duration::from_millis(500),
        };
        assert!((timing.throughput() - 2000.0).abs() < f64::EPSILON);

        let instant = TrackTiming {
            elapsed: Duration::ZERO,
            ..timing
        };
        assert_eq!(instant.throughput(), 0.0);
    }

    #[test]
    fn test_render_timings() {
        let timings = vec![TrackTiming {
            filename: "a".to_string(),
            bytes: 300,
            elapsed: Duration::from_millis(1500),
        }];
        assert_eq!(render_timings(&timings), "1.5\n200\n");
    }

    #[test]
    fn test_local_path_keeps_subdirectories() {
        let dir = Path::new("/tmp/out");
        assert_eq!(
            local_path(dir, "hi/track.mp4").unwrap(),
            PathBuf::from("/tmp/out/hi/track.mp4")
        );
        assert_eq!(
            local_path(dir, "./video.mp4").unwrap(),
            PathBuf::from("/tmp/out/video.mp4")
        );
        assert!(local_path(dir, "../../etc/video.mp4").is_err());
        assert!(local_path(dir, "hi/../../video.mp4").is_err());
        assert!(local_path(dir, "/etc/video.mp4").is_err());
        assert!(local_path(dir, ".").is_err());
    }

    #[test]
    fn test_local_paths_reject_duplicates() {
        let manifest = parse_manifest(
            "m\n2\nv.mp4\nc\nb\nd\n1\n0 1\n./v.mp4\nc\nb\nd\n1\n0 1\n",
        )
        .unwrap();
        let err = local_paths(Path::new("out"), &manifest).unwrap_err();
        assert!(err.to_string().contains("another track"));
    }
}

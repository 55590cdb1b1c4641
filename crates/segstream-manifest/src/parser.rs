//! Manifest parser.

use segstream_common::{Error, Result};

use crate::{LineCursor, Manifest, Segment, Track};

/// Parse a complete manifest.
///
/// Fails with [`Error::ManifestFormat`] when a line is missing, a count or
/// segment field is not an integer, a segment line does not hold exactly two
/// integers, or content follows the last declared track.
pub fn parse_manifest(text: &str) -> Result<Manifest> {
    let mut cursor = LineCursor::new(text);

    let movie = cursor.next_line("movie name")?.to_string();
    let track_count = cursor.next_count("track count")?;

    // The count comes from untrusted text; don't let it drive the allocation.
    let mut tracks = Vec::with_capacity(track_count.min(cursor.remaining()));
    for _ in 0..track_count {
        tracks.push(parse_track_block(&mut cursor)?);
    }

    if !cursor.is_exhausted() {
        return Err(Error::manifest_format(
            cursor.line(),
            format!("unexpected content after {track_count} declared tracks"),
        ));
    }

    tracing::debug!(
        movie = %movie,
        tracks = tracks.len(),
        "parsed manifest"
    );

    Ok(Manifest { movie, tracks })
}

/// Parse a manifest and return the file name and segments of one track.
///
/// Format errors take precedence over index errors; an out-of-range or
/// negative `index` yields [`Error::TrackIndex`].
pub fn parse_track(text: &str, index: i64) -> Result<(String, Vec<Segment>)> {
    let track = parse_manifest(text)?.into_track(index)?;
    Ok((track.filename, track.segments))
}

fn parse_track_block(cursor: &mut LineCursor<'_>) -> Result<Track> {
    let filename_line = cursor.line();
    let filename = cursor.next_line("track filename")?;
    if filename.is_empty() {
        return Err(Error::manifest_format(filename_line, "empty track filename"));
    }

    let codec = cursor.next_line("track codec")?;
    let bitrate = cursor.next_line("track bitrate")?;
    let duration = cursor.next_line("track duration")?;
    let segment_count = cursor.next_count("segment count")?;

    let mut segments = Vec::with_capacity(segment_count.min(cursor.remaining()));
    for _ in 0..segment_count {
        segments.push(cursor.next_segment()?);
    }

    Ok(Track {
        filename: filename.to_string(),
        codec: codec.to_string(),
        bitrate: bitrate.to_string(),
        duration: duration.to_string(),
        segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const DEMO: &str = "demo\n1\ndemo.mp4\navc1.64001f\n800000\n1.5\n2\n0 100\n100 50\n";

    #[test]
    fn test_parse_demo() {
        let manifest = parse_manifest(DEMO).unwrap();
        assert_eq!(manifest.movie, "demo");
        assert_eq!(manifest.track_count(), 1);

        let track = &manifest.tracks[0];
        assert_eq!(track.filename, "demo.mp4");
        assert_eq!(track.codec, "avc1.64001f");
        assert_eq!(track.bitrate, "800000");
        assert_eq!(track.duration, "1.5");
        assert_eq!(
            track.segments,
            vec![Segment::new(0, 100), Segment::new(100, 50)]
        );
    }

    #[test]
    fn test_parse_track_selects_by_index() {
        let text = "movie\n2\n\
                    video.mp4\nh264\n1000\n10\n1\n0 10\n\
                    audio.m4a\naac\n128\n10\n2\n0 4\n4 4\n";
        let (name, segments) = parse_track(text, 1).unwrap();
        assert_eq!(name, "audio.m4a");
        assert_eq!(segments, vec![Segment::new(0, 4), Segment::new(4, 4)]);
    }

    #[test]
    fn test_zero_tracks() {
        let manifest = parse_manifest("empty\n0\n").unwrap();
        assert_eq!(manifest.track_count(), 0);
        assert_matches!(
            parse_track("empty\n0\n", 0),
            Err(Error::TrackIndex { index: 0, count: 0 })
        );
    }

    #[test]
    fn test_windows_line_endings_and_padding() {
        let text = "\r\n  demo \r\n 1\r\n demo.mp4 \r\nc\r\nb\r\nd\r\n1\r\n  0   7  \r\n\r\n";
        let manifest = parse_manifest(text).unwrap();
        assert_eq!(manifest.movie, "demo");
        assert_eq!(manifest.tracks[0].filename, "demo.mp4");
        assert_eq!(manifest.tracks[0].segments, vec![Segment::new(0, 7)]);
    }

    #[test]
    fn test_truncated_segment_list() {
        let text = "demo\n1\ndemo.mp4\nc\nb\nd\n3\n0 100\n100 50\n";
        assert_matches!(
            parse_manifest(text),
            Err(Error::ManifestFormat { line: 10, ref reason }) if reason == "missing segment line"
        );
    }

    #[test]
    fn test_non_integer_counts() {
        assert_matches!(
            parse_manifest("demo\ntwo\n"),
            Err(Error::ManifestFormat { line: 2, .. })
        );
        assert_matches!(
            parse_manifest("demo\n1\ndemo.mp4\nc\nb\nd\nmany\n"),
            Err(Error::ManifestFormat { line: 7, .. })
        );
    }

    #[test]
    fn test_missing_track_block() {
        assert_matches!(
            parse_manifest("demo\n2\ndemo.mp4\nc\nb\nd\n0\n"),
            Err(Error::ManifestFormat { ref reason, .. }) if reason == "missing track filename"
        );
    }

    #[test]
    fn test_trailing_content_rejected() {
        assert_matches!(
            parse_manifest("demo\n1\ndemo.mp4\nc\nb\nd\n1\n0 1\nextra.mp4\n"),
            Err(Error::ManifestFormat { line: 9, .. })
        );
    }

    #[test]
    fn test_blank_filename_rejected() {
        assert_matches!(
            parse_manifest("demo\n1\n\nc\nb\nd\n0\n"),
            Err(Error::ManifestFormat { line: 3, .. })
        );
    }

    #[test]
    fn test_format_error_wins_over_index_error() {
        assert_matches!(
            parse_track("demo\n1\n", 5),
            Err(Error::ManifestFormat { .. })
        );
    }

    #[test]
    fn test_huge_declared_count_does_not_allocate() {
        assert_matches!(
            parse_manifest("demo\n18446744073709551615\n"),
            Err(Error::ManifestFormat { .. })
        );
    }
}

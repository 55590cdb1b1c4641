//! Common error types used throughout segstream.
//!
//! A single enum covers the whole transfer path: manifest decoding, track
//! selection, HTTP range fetches, player socket delivery and the local
//! connection to the player.

use std::io;

/// Common error type for segstream.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The manifest text is short or malformed.
    #[error("Malformed manifest at line {line}: {reason}")]
    ManifestFormat { line: usize, reason: String },

    /// A track was requested that the manifest does not declare.
    #[error("Track index {index} is out of range (manifest has {count} tracks)")]
    TrackIndex { index: i64, count: usize },

    /// An HTTP fetch failed or returned the wrong number of bytes.
    #[error("Transfer error: {0}")]
    Transfer(String),

    /// Writing to the player socket failed for a reason other than the
    /// player hanging up.
    #[error("Socket error: {0}")]
    Socket(#[source] io::Error),

    /// The local playback endpoint could not be reached.
    #[error("Cannot connect to player at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The transfer was cancelled by the user.
    #[error("Interrupted")]
    Interrupted,

    /// A local I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a new ManifestFormat error at a 1-based line number.
    pub fn manifest_format<S: Into<String>>(line: usize, reason: S) -> Self {
        Self::ManifestFormat {
            line,
            reason: reason.into(),
        }
    }

    /// Create a new Transfer error.
    pub fn transfer<S: Into<String>>(msg: S) -> Self {
        Self::Transfer(msg.into())
    }
}

/// Returns true when the error means the remote end closed the connection.
///
/// A player closing its socket is an expected way for playback to end, so
/// callers treat these kinds as a clean stop rather than a failure.
pub fn is_peer_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
    )
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

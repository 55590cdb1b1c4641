//! Producer/consumer streaming pipeline.
//!
//! One track is streamed by two tasks joined by a bounded FIFO channel:
//!
//! - [`Producer`] fetches segments from a [`SegmentSource`](crate::fetch::SegmentSource)
//!   strictly in manifest order and sends them down the channel
//! - [`Consumer`] writes each payload to the player socket as soon as it
//!   arrives
//!
//! The channel carries [`Handoff`] items. The final segment is flagged with
//! `is_last`; a failed fetch is reported with [`Handoff::Abort`] so the
//! consumer never waits on a producer that has given up.
//!
//! [`StreamSession`] opens the player connection, resolves the track from the
//! manifest, runs both tasks and closes the socket on every exit path.

mod consumer;
mod producer;
mod session;

pub use consumer::{Consumer, ConsumerOutcome, ConsumerReport};
pub use producer::{Producer, ProducerReport};
pub use session::{StreamRequest, StreamSession, StreamSummary};

use bytes::Bytes;

/// Bytes of one fetched segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPayload {
    /// Position of the segment in the track's segment list.
    pub index: usize,
    pub bytes: Bytes,
    /// Set only on the final segment of the track.
    pub is_last: bool,
}

/// Item passed from the producer to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handoff {
    Payload(SegmentPayload),
    /// The producer failed to fetch segment `index` and will send nothing
    /// more.
    Abort { index: usize, reason: String },
}

use segstream_common::Result;
use segstream_manifest::Segment;
use tokio::sync::mpsc;

use super::{Handoff, SegmentPayload};
use crate::fetch::SegmentSource;

/// Totals for the segments a producer handed off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerReport {
    pub segments: usize,
    pub bytes: u64,
}

/// Fetches a track's segments in order and feeds them to the channel.
pub struct Producer<S> {
    source: S,
    segments: Vec<Segment>,
    tx: mpsc::Sender<Handoff>,
}

impl<S: SegmentSource> Producer<S> {
    pub fn new(source: S, segments: Vec<Segment>, tx: mpsc::Sender<Handoff>) -> Self {
        Self {
            source,
            segments,
            tx,
        }
    }

    /// Fetch every segment sequentially and send it.
    ///
    /// On a failed fetch an [`Handoff::Abort`] is sent and the error is
    /// returned; no later segment is fetched. If the consumer has stopped
    /// the producer returns early with what it handed off so far. The
    /// sender is dropped on return, which closes the channel.
    pub async fn run(self) -> Result<ProducerReport> {
        let total = self.segments.len();
        let mut report = ProducerReport::default();

        for (index, segment) in self.segments.iter().enumerate() {
            if self.tx.is_closed() {
                tracing::debug!(segment = index, "consumer gone, no more fetches");
                break;
            }

            let bytes = match self.source.fetch(segment).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::error!(segment = index, error = %err, "segment fetch failed, aborting track");
                    let abort = Handoff::Abort {
                        index,
                        reason: err.to_string(),
                    };
                    // A closed channel here means the consumer already stopped.
                    let _ = self.tx.send(abort).await;
                    return Err(err);
                }
            };

            let len = bytes.len() as u64;
            let payload = SegmentPayload {
                index,
                bytes,
                is_last: index + 1 == total,
            };

            if self.tx.send(Handoff::Payload(payload)).await.is_err() {
                tracing::debug!(segment = index, "consumer gone, dropping fetched segment");
                break;
            }

            report.segments += 1;
            report.bytes += len;
            tracing::trace!(segment = index, bytes = len, "segment handed off");
        }

        Ok(report)
    }
}

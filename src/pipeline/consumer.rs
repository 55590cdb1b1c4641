use segstream_common::{is_peer_disconnect, Error, Result};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use super::{Handoff, SegmentPayload};

/// Why the consumer stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumerOutcome {
    /// The final segment was written.
    Completed,
    /// The player closed its end of the socket.
    PeerClosed,
    /// The producer reported a failed fetch for segment `index`.
    ProducerFailed { index: usize, reason: String },
    /// The channel closed before the final segment arrived.
    ProducerGone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerReport {
    pub outcome: ConsumerOutcome,
    /// Segments fully written to the player.
    pub segments: usize,
    pub bytes: u64,
}

/// Drains the channel into the player socket.
pub struct Consumer<W> {
    writer: W,
    rx: mpsc::Receiver<Handoff>,
}

impl<W> Consumer<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W, rx: mpsc::Receiver<Handoff>) -> Self {
        Self { writer, rx }
    }

    /// Write payloads in the order received until the final segment, an
    /// abort, or a closed socket.
    ///
    /// A player hanging up is reported as [`ConsumerOutcome::PeerClosed`];
    /// any other write failure is returned as [`Error::Socket`]. The writer
    /// is shut down and dropped before returning.
    pub async fn run(mut self) -> Result<ConsumerReport> {
        let mut segments = 0usize;
        let mut bytes = 0u64;

        let result = loop {
            let payload = match self.rx.recv().await {
                Some(Handoff::Payload(payload)) => payload,
                Some(Handoff::Abort { index, reason }) => {
                    tracing::warn!(segment = index, %reason, "producer aborted, stopping delivery");
                    break Ok(ConsumerOutcome::ProducerFailed { index, reason });
                }
                None => {
                    tracing::warn!(delivered = segments, "channel closed before the final segment");
                    break Ok(ConsumerOutcome::ProducerGone);
                }
            };

            match self.deliver(&payload).await {
                Ok(()) => {
                    segments += 1;
                    bytes += payload.bytes.len() as u64;
                    tracing::trace!(segment = payload.index, bytes = payload.bytes.len(), "segment delivered");
                }
                Err(err) if is_peer_disconnect(&err) => {
                    tracing::info!(segment = payload.index, "player closed connection (playback may have ended)");
                    break Ok(ConsumerOutcome::PeerClosed);
                }
                Err(err) => {
                    tracing::error!(segment = payload.index, error = %err, "player connection error");
                    break Err(Error::Socket(err));
                }
            }

            if payload.is_last {
                break Ok(ConsumerOutcome::Completed);
            }
        };

        // Nothing more will be read; let a blocked producer see the closure.
        self.rx.close();
        if let Err(err) = self.writer.shutdown().await {
            tracing::debug!(error = %err, "socket shutdown failed");
        }

        result.map(|outcome| ConsumerReport {
            outcome,
            segments,
            bytes,
        })
    }

    async fn deliver(&mut self, payload: &SegmentPayload) -> std::io::Result<()> {
        self.writer.write_all(&payload.bytes).await?;
        self.writer.flush().await
    }
}

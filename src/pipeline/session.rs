use std::future::Future;

use segstream_common::{Error, Result};
use segstream_manifest::parse_manifest;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::{Consumer, ConsumerOutcome, ConsumerReport, Producer, ProducerReport};
use crate::config::{Config, OriginConfig};
use crate::fetch::SegmentFetcher;

/// What to stream.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    /// Origin base URL, e.g. `http://localhost:8080`.
    pub base_url: String,
    pub movie: String,
    /// Track index as given by the user; validated against the manifest.
    pub track: i64,
}

/// Result of a finished stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    pub filename: String,
    /// Segments fully written to the player.
    pub segments: usize,
    pub bytes: u64,
    /// True when the player hung up before the final segment.
    pub peer_closed: bool,
}

/// One track transfer from the origin to the local player.
pub struct StreamSession {
    request: StreamRequest,
    origin: OriginConfig,
    player_address: String,
    channel_capacity: usize,
}

enum TaskResult {
    Producer(Result<ProducerReport>),
    Consumer(Result<ConsumerReport>),
}

impl StreamSession {
    pub fn new(request: StreamRequest, config: &Config) -> Self {
        Self {
            request,
            origin: config.origin.clone(),
            player_address: config.player.address.clone(),
            channel_capacity: config.pipeline.channel_capacity.max(1),
        }
    }

    /// Connect to a different player endpoint than the configured one.
    pub fn with_player_address(mut self, address: impl Into<String>) -> Self {
        self.player_address = address.into();
        self
    }

    /// Run until the transfer ends or the process receives Ctrl-C.
    pub async fn run(self) -> Result<StreamSummary> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "cannot listen for Ctrl-C, interrupt disabled");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until the transfer ends or `shutdown` resolves.
    ///
    /// On shutdown both pipeline tasks are aborted, the player socket is
    /// closed and [`Error::Interrupted`] is returned.
    pub async fn run_until<F>(self, shutdown: F) -> Result<StreamSummary>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;

            _ = shutdown => {
                tracing::warn!("interrupted, shutting down stream");
                Err(Error::Interrupted)
            }
            result = self.transfer() => result,
        }
    }

    async fn transfer(&self) -> Result<StreamSummary> {
        tracing::info!(address = %self.player_address, "connecting to player");
        let socket = TcpStream::connect(&self.player_address)
            .await
            .map_err(|source| Error::Connect {
                addr: self.player_address.clone(),
                source,
            })?;
        tracing::info!("connected to player");

        let fetcher = SegmentFetcher::new(&self.request.base_url, &self.request.movie, &self.origin)?;
        let manifest = parse_manifest(&fetcher.fetch_manifest().await?)?;
        let track = manifest.into_track(self.request.track)?;

        tracing::info!(
            track = self.request.track,
            filename = %track.filename,
            segments = track.segment_count(),
            bytes = track.total_size(),
            "streaming track"
        );

        if track.segments.is_empty() {
            tracing::warn!(filename = %track.filename, "track has no segments, nothing to stream");
            return Ok(StreamSummary {
                filename: track.filename,
                segments: 0,
                bytes: 0,
                peer_closed: false,
            });
        }

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let producer = Producer::new(fetcher.for_track(&track.filename), track.segments, tx);
        let consumer = Consumer::new(socket, rx);

        // Dropping the set (on interrupt) aborts both tasks, which drops the socket.
        let mut tasks = JoinSet::new();
        tasks.spawn(async move { TaskResult::Producer(producer.run().await) });
        tasks.spawn(async move { TaskResult::Consumer(consumer.run().await) });

        let mut produced = None;
        let mut consumed = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(TaskResult::Producer(result)) => produced = Some(result),
                Ok(TaskResult::Consumer(result)) => consumed = Some(result),
                Err(err) => {
                    return Err(Error::Io(std::io::Error::other(format!(
                        "pipeline task failed: {err}"
                    ))));
                }
            }
        }

        let consumed = consumed.ok_or_else(|| Error::transfer("consumer did not report"))??;
        let produced = produced.ok_or_else(|| Error::transfer("producer did not report"))?;

        let summary = StreamSummary {
            filename: track.filename,
            segments: consumed.segments,
            bytes: consumed.bytes,
            peer_closed: consumed.outcome == ConsumerOutcome::PeerClosed,
        };

        match consumed.outcome {
            ConsumerOutcome::Completed | ConsumerOutcome::PeerClosed => {
                tracing::info!(
                    segments = summary.segments,
                    bytes = summary.bytes,
                    peer_closed = summary.peer_closed,
                    "streaming complete"
                );
                Ok(summary)
            }
            ConsumerOutcome::ProducerFailed { reason, .. } => match produced {
                Err(err) => Err(err),
                Ok(_) => Err(Error::transfer(reason)),
            },
            ConsumerOutcome::ProducerGone => match produced {
                Err(err) => Err(err),
                Ok(_) => Err(Error::transfer("producer ended before the final segment")),
            },
        }
    }
}

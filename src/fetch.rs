//! HTTP access to the origin.
//!
//! [`SegmentFetcher`] downloads a movie's manifest and issues one range
//! request per segment. Consumers of segment data go through the
//! [`SegmentSource`] trait so they can be driven by something other than the
//! network in tests.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client, StatusCode};
use segstream_common::{urls, Error, Result};
use segstream_manifest::Segment;

use crate::config::OriginConfig;

/// Source of segment bytes for one track.
#[async_trait]
pub trait SegmentSource: Send + Sync {
    /// Fetch exactly `segment.size` bytes starting at `segment.offset`.
    async fn fetch(&self, segment: &Segment) -> Result<Bytes>;
}

/// Fetches manifests and byte ranges for one movie on an origin.
#[derive(Clone)]
pub struct SegmentFetcher {
    client: Client,
    base_url: String,
    movie: String,
}

impl SegmentFetcher {
    pub fn new(base_url: &str, movie: &str, config: &OriginConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|err| Error::transfer(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: urls::normalize_base(base_url).to_string(),
            movie: movie.to_string(),
        })
    }

    pub fn manifest_url(&self) -> String {
        urls::manifest_url(&self.base_url, &self.movie)
    }

    pub fn track_url(&self, filename: &str) -> String {
        urls::track_url(&self.base_url, &self.movie, filename)
    }

    /// Download the movie's manifest text.
    pub async fn fetch_manifest(&self) -> Result<String> {
        let url = self.manifest_url();
        tracing::debug!(%url, "fetching manifest");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| Error::transfer(format!("failed to download {url}: {err}")))?;

        let response = response
            .error_for_status()
            .map_err(|err| Error::transfer(format!("request for {url} failed: {err}")))?;

        response
            .text()
            .await
            .map_err(|err| Error::transfer(format!("failed to read manifest body from {url}: {err}")))
    }

    /// Fetch one segment of the resource at `url` with a single range request.
    ///
    /// The body must be exactly `segment.size` bytes. An origin that answers a
    /// range starting past zero with `200 OK` has ignored the `Range` header,
    /// which is treated as a failure. Empty or overflowing segments are
    /// rejected without a request.
    pub async fn fetch_range(&self, url: &str, segment: &Segment) -> Result<Bytes> {
        let range = segment.range_header().ok_or_else(|| {
            Error::transfer(format!(
                "invalid segment for {url}: offset {} size {}",
                segment.offset, segment.size
            ))
        })?;

        let response = self
            .client
            .get(url)
            .header(header::RANGE, &range)
            .send()
            .await
            .map_err(|err| Error::transfer(format!("failed to download {url} ({range}): {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::transfer(format!(
                "request for {url} ({range}) failed with status {status}"
            )));
        }
        if status == StatusCode::OK && segment.offset > 0 {
            return Err(Error::transfer(format!(
                "origin ignored {range} for {url} and sent the whole resource"
            )));
        }

        let body = response.bytes().await.map_err(|err| {
            Error::transfer(format!("failed to read segment body from {url} ({range}): {err}"))
        })?;

        if body.len() as u64 != segment.size {
            return Err(Error::transfer(format!(
                "expected {} bytes for {url} ({range}), received {}",
                segment.size,
                body.len()
            )));
        }

        Ok(body)
    }

    /// Bind this fetcher to one track file.
    pub fn for_track(&self, filename: &str) -> TrackSource {
        TrackSource {
            url: self.track_url(filename),
            fetcher: self.clone(),
        }
    }
}

/// A [`SegmentFetcher`] bound to one track file URL.
#[derive(Clone)]
pub struct TrackSource {
    fetcher: SegmentFetcher,
    url: String,
}

impl TrackSource {
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SegmentSource for TrackSource {
    async fn fetch(&self, segment: &Segment) -> Result<Bytes> {
        self.fetcher.fetch_range(&self.url, segment).await
    }
}

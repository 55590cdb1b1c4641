//! Shared test harness for integration tests.
//!
//! Provides [`MockOrigin`], a wiremock server that serves a movie manifest
//! and answers range requests for track files, and [`Player`], a local TCP
//! listener that records everything streamed to it.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Deterministic resource bytes so misplaced ranges are detectable.
pub fn resource(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

/// Contiguous `(offset, size)` pairs covering `sizes` in order.
pub fn contiguous(sizes: &[u64]) -> Vec<(u64, u64)> {
    let mut offset = 0;
    sizes
        .iter()
        .map(|&size| {
            let seg = (offset, size);
            offset += size;
            seg
        })
        .collect()
}

/// Render a manifest in origin format.
pub fn manifest_text(movie: &str, tracks: &[(&str, &[(u64, u64)])]) -> String {
    let mut out = format!("{movie}\n{}\n", tracks.len());
    for (name, segments) in tracks {
        out.push_str(&format!("{name}\navc1.64001f\n800000\n1.5\n{}\n", segments.len()));
        for (offset, size) in segments.iter() {
            out.push_str(&format!("{offset} {size}\n"));
        }
    }
    out
}

fn range_value(offset: u64, size: u64) -> String {
    format!("bytes={}-{}", offset, offset + size - 1)
}

/// Origin server backed by wiremock.
pub struct MockOrigin {
    pub server: MockServer,
}

impl MockOrigin {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Serve `text` as the manifest of `movie`.
    pub async fn serve_manifest(&self, movie: &str, text: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/movies/{movie}/manifest.txt")))
            .respond_with(ResponseTemplate::new(200).set_body_string(text))
            .mount(&self.server)
            .await;
    }

    /// Serve each `(offset, size)` range of `data` with a 206 response.
    pub async fn serve_ranges(&self, movie: &str, file: &str, data: &[u8], ranges: &[(u64, u64)]) {
        for &(offset, size) in ranges {
            let body = data[offset as usize..(offset + size) as usize].to_vec();
            self.serve_range(movie, file, offset, size, ResponseTemplate::new(206).set_body_bytes(body))
                .await;
        }
    }

    /// Answer one exact range request with a custom response.
    pub async fn serve_range(
        &self,
        movie: &str,
        file: &str,
        offset: u64,
        size: u64,
        response: ResponseTemplate,
    ) {
        Mock::given(method("GET"))
            .and(path(format!("/movies/{movie}/{file}")))
            .and(header("Range", range_value(offset, size).as_str()))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Require that a range is never requested (checked when the server drops).
    pub async fn forbid_range(&self, movie: &str, file: &str, offset: u64, size: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/movies/{movie}/{file}")))
            .and(header("Range", range_value(offset, size).as_str()))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// Serve `data` split into `ranges` with a per-range response delay.
    pub async fn serve_ranges_delayed(
        &self,
        movie: &str,
        file: &str,
        data: &[u8],
        ranges: &[(u64, u64)],
        delay: impl Fn(usize) -> Duration,
    ) {
        for (i, &(offset, size)) in ranges.iter().enumerate() {
            let body = data[offset as usize..(offset + size) as usize].to_vec();
            let response = ResponseTemplate::new(206)
                .set_body_bytes(body)
                .set_delay(delay(i));
            self.serve_range(movie, file, offset, size, response).await;
        }
    }
}

/// A local player: accepts one connection and records the bytes it reads.
pub struct Player {
    pub addr: SocketAddr,
    handle: JoinHandle<Vec<u8>>,
}

impl Player {
    /// Read until the streamer closes the connection.
    pub async fn start() -> Self {
        Self::start_with_limit(None).await
    }

    /// Read at most `limit` bytes, then hang up.
    pub async fn start_closing_after(limit: usize) -> Self {
        Self::start_with_limit(Some(limit)).await
    }

    async fn start_with_limit(limit: Option<usize>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept failed");
            let mut received = Vec::new();
            match limit {
                None => {
                    socket.read_to_end(&mut received).await.expect("read failed");
                }
                Some(limit) => {
                    let mut buf = vec![0u8; limit];
                    socket.read_exact(&mut buf).await.expect("read failed");
                    received = buf;
                }
            }
            received
        });

        Self { addr, handle }
    }

    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Everything the player read before the connection ended.
    pub async fn received(self) -> Vec<u8> {
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("player did not see the connection close")
            .expect("player task panicked")
    }
}

/// A local address with nothing listening on it.
pub fn closed_port() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);
    addr
}

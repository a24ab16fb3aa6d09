//! Shared HTTP client for every stage of a scan
//!
//! Features:
//! - One connection pool for the whole run (cheap `Clone`, read-only)
//! - HTTP/1.1 by default, HTTP/2 only when the server negotiates it
//! - Brotli, Zstd, Gzip compression (auto-negotiated)
//! - Per-request timeouts, no client-wide deadline

use std::time::Duration;

use reqwest::{Client, Response};
use tracing::{debug, instrument};

use crate::scan::ProbeError;

/// Sent to every endpoint; IPTV boxes tend to reject empty agents
pub const USER_AGENT: &str = concat!("tvscan/", env!("CARGO_PKG_VERSION"));

/// HTTP client shared by the prober, enumerator and speed tester
#[derive(Debug, Clone)]
pub struct ScanClient {
    client: Client,
}

impl ScanClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            // Most candidates never answer; don't hoard sockets for them
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .brotli(true)
            .zstd(true)
            .gzip(true)
            .deflate(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    /// GET `url`, bounded by `timeout` for the whole exchange
    #[instrument(level = "trace", skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str, timeout: Duration) -> Result<Response, reqwest::Error> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }

    /// GET `url` and treat anything but 200 as a failure
    pub async fn get_ok(&self, url: &str, timeout: Duration) -> Result<Response, ProbeError> {
        let response = self.get(url, timeout).await?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(ProbeError::Status(response.status()));
        }
        Ok(response)
    }
}

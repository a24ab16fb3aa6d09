//! First-segment speed test
//!
//! Fetch the stream's m3u8, take the first media line, download that one
//! segment and divide its size by the wall-clock time it took.

use std::time::{Duration, Instant};

use url::Url;

use super::{ProbeError, SpeedResult, StreamEntry};
use crate::http_client::ScanClient;

/// Measure one stream. Both requests share the same `timeout`.
pub async fn measure(
    client: &ScanClient,
    entry: StreamEntry,
    timeout: Duration,
) -> Result<SpeedResult, ProbeError> {
    let manifest = client.get_ok(&entry.url, timeout).await?.text().await?;
    let segment = first_segment(&manifest).ok_or(ProbeError::EmptyManifest)?;
    let url = segment_url(&entry.url, segment);

    let start = Instant::now();
    let body = client.get(&url, timeout).await?.bytes().await?;
    let kbps = throughput_kbps(body.len(), start.elapsed())?;

    Ok(SpeedResult { entry, kbps })
}

/// First line that is neither blank nor a `#` directive
pub fn first_segment(manifest: &str) -> Option<&str> {
    manifest
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Resolve a segment line against the manifest URL.
///
/// Plain relative lines land next to the manifest, `/`-rooted lines hang off
/// its origin and absolute URLs are used as-is.
pub fn segment_url(manifest_url: &str, segment: &str) -> String {
    match Url::parse(manifest_url).and_then(|base| base.join(segment)) {
        Ok(url) => url.into(),
        Err(_) => {
            let base = manifest_url.rsplit_once('/').map_or(manifest_url, |(base, _)| base);
            format!("{base}/{segment}")
        }
    }
}

/// KB/s = bytes / seconds / 1024
pub fn throughput_kbps(bytes: usize, elapsed: Duration) -> Result<f64, ProbeError> {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return Err(ProbeError::ZeroElapsed);
    }
    Ok(bytes as f64 / secs / 1024.0)
}

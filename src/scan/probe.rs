//! Liveness probe for candidate endpoints

use std::time::Duration;

use tracing::info;

use super::{CandidateEndpoint, LiveEndpoint, ProbeError};
use crate::http_client::ScanClient;

/// One GET to the catalog path; only a 200 makes the endpoint live.
///
/// No retries. Timeouts, refusals and bad statuses all come back as
/// [`ProbeError`] for the stage runner to count.
pub async fn probe(
    client: &ScanClient,
    candidate: CandidateEndpoint,
    timeout: Duration,
) -> Result<LiveEndpoint, ProbeError> {
    client.get_ok(&candidate.catalog_url(), timeout).await?;
    info!("✅ Valid node: {}", candidate);
    Ok(LiveEndpoint::confirmed(candidate))
}

//! Stage orchestration: seeds → live endpoints → streams → speeds → listing

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use tracing::{info, warn};

use super::aggregate::{aggregate, Listing};
use super::limiter::{run_stage, ConcurrencyLimiter, StageReport};
use super::{catalog, probe, speed, CandidateEndpoint, ScanError, SeedEndpoint, StreamEntry};
use crate::config::ScanConfig;
use crate::http_client::ScanClient;

/// Counts for one stage of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageStats {
    pub submitted: usize,
    pub succeeded: usize,
    pub failures: BTreeMap<&'static str, usize>,
}

impl<T> From<&StageReport<T>> for StageStats {
    fn from(report: &StageReport<T>) -> Self {
        Self {
            submitted: report.submitted,
            succeeded: report.succeeded.len(),
            failures: report.failures.clone(),
        }
    }
}

impl fmt::Display for StageStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ok", self.succeeded, self.submitted)?;
        if !self.failures.is_empty() {
            let parts: Vec<String> = self.failures.iter().map(|(k, n)| format!("{k}={n}")).collect();
            write!(f, " ({})", parts.join(", "))?;
        }
        Ok(())
    }
}

/// What a run did, stage by stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub seeds_skipped: usize,
    pub candidates: usize,
    pub discovery: StageStats,
    pub enumeration: StageStats,
    /// Streams found across all live endpoints
    pub streams: usize,
    pub speed_test: StageStats,
    pub below_floor: usize,
    pub listed: usize,
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "   Seeds skipped: {}", self.seeds_skipped)?;
        writeln!(f, "   Candidates:    {}", self.candidates)?;
        writeln!(f, "   Discovery:     {}", self.discovery)?;
        writeln!(f, "   Enumeration:   {} → {} streams", self.enumeration, self.streams)?;
        writeln!(f, "   Speed test:    {}", self.speed_test)?;
        writeln!(f, "   Below floor:   {}", self.below_floor)?;
        write!(f, "   Listed:        {}", self.listed)
    }
}

/// Result of [`Scanner::scan`]
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub listing: Listing,
    pub summary: ScanSummary,
}

/// Runs the three network stages and the aggregation for one config
pub struct Scanner {
    client: ScanClient,
    config: ScanConfig,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        config.validate()?;
        Ok(Self {
            client: ScanClient::new()?,
            config,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run every stage and write the listing to the configured output.
    ///
    /// Only a failed write aborts; per-item network failures are counted.
    pub async fn run(&self) -> Result<ScanOutcome, ScanError> {
        let outcome = self.scan().await;
        outcome.listing.write_to(&self.config.output)?;
        info!(
            "🎉 Done! {} entries saved to {}",
            outcome.listing.len(),
            self.config.output.display()
        );
        Ok(outcome)
    }

    /// Run every stage without touching the filesystem.
    pub async fn scan(&self) -> ScanOutcome {
        let mut summary = ScanSummary::default();
        let timeouts = &self.config.timeouts;
        let limits = &self.config.limits;

        let candidates = self.candidates(&mut summary.seeds_skipped);
        summary.candidates = candidates.len();

        info!("🚀 Starting node discovery ({} candidates)...", candidates.len());
        let discovery = ConcurrencyLimiter::new("discovery", limits.discovery);
        let live = run_stage(&discovery, candidates, |candidate| {
            let client = self.client.clone();
            let timeout = timeouts.probe();
            async move { probe::probe(&client, candidate, timeout).await }
        })
        .await;
        summary.discovery = StageStats::from(&live);
        info!("🎯 Found {} valid nodes", live.succeeded.len());

        info!("📡 Fetching channels...");
        let enumeration = ConcurrencyLimiter::new("enumeration", limits.enumeration);
        let channels = run_stage(&enumeration, live.succeeded, |endpoint| {
            let client = self.client.clone();
            let timeout = timeouts.enumerate();
            async move { catalog::enumerate(&client, &endpoint, timeout).await }
        })
        .await;
        summary.enumeration = StageStats::from(&channels);
        let streams: Vec<StreamEntry> = channels
            .map(|lists| lists.into_iter().flatten().collect())
            .succeeded;
        summary.streams = streams.len();
        info!("📺 Total channels found: {}", streams.len());

        info!("⏱️ Speed testing...");
        let speed_test = ConcurrencyLimiter::new("speed_test", limits.speed_test);
        let measured = run_stage(&speed_test, streams, |entry| {
            let client = self.client.clone();
            let timeout = timeouts.speed_test();
            async move { speed::measure(&client, entry, timeout).await }
        })
        .await;
        summary.speed_test = StageStats::from(&measured);

        let listing = aggregate(measured.succeeded, &self.config.aggregate_options());
        summary.below_floor = listing.below_floor;
        summary.listed = listing.len();
        info!(
            discovery = %summary.discovery,
            enumeration = %summary.enumeration,
            speed_test = %summary.speed_test,
            "Scan finished"
        );

        ScanOutcome { listing, summary }
    }

    /// Expand every seed, skipping malformed ones and repeated candidates.
    fn candidates(&self, skipped: &mut usize) -> Vec<CandidateEndpoint> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for raw in &self.config.seeds {
            let expanded = SeedEndpoint::parse(raw).and_then(|seed| {
                Ok(seed.candidates(&self.config.catalog_path)?.collect::<Vec<_>>())
            });
            match expanded {
                Ok(candidates) => {
                    out.extend(candidates.into_iter().filter(|c| seen.insert(c.catalog_url())));
                }
                Err(e) => {
                    warn!("Skipping seed: {e}");
                    *skipped += 1;
                }
            }
        }

        out
    }
}

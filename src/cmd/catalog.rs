use std::time::{Duration, Instant};

use anyhow::Result;

use tvscan::config::DEFAULT_CATALOG_PATH;
use tvscan::scan::enumerate;
use tvscan::{ScanClient, SeedEndpoint};

pub async fn cmd_catalog(endpoint: &str, timeout_secs: f64) -> Result<()> {
    let seed = SeedEndpoint::parse(endpoint)?;
    let candidate = tvscan::CandidateEndpoint {
        scheme: seed.scheme,
        host: seed.host,
        port: seed.port,
        catalog_path: DEFAULT_CATALOG_PATH.to_string(),
    };
    let timeout = Duration::try_from_secs_f64(timeout_secs)?;
    let client = ScanClient::new()?;

    eprintln!("🌐 Fetching: {candidate}");
    let start = Instant::now();
    let live = tvscan::scan::probe(&client, candidate, timeout).await?;
    let entries = enumerate(&client, &live, timeout).await?;

    eprintln!(
        "📺 {} channels in {:.0}ms",
        entries.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    for entry in entries {
        println!("{},{}", entry.name, entry.url);
    }

    Ok(())
}

use anyhow::Result;

use tvscan::config::DEFAULT_CATALOG_PATH;
use tvscan::SeedEndpoint;

pub fn cmd_expand(seed: &str) -> Result<()> {
    let seed = SeedEndpoint::parse(seed)?;
    for candidate in seed.candidates(DEFAULT_CATALOG_PATH)? {
        println!("{candidate}");
    }
    Ok(())
}

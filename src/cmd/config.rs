use std::path::Path;

use anyhow::Result;

use tvscan::ScanConfig;

pub fn cmd_config(path: Option<&Path>) -> Result<()> {
    let config = ScanConfig::load(path)?;
    print!("{}", config.to_toml()?);
    Ok(())
}

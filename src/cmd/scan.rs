use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use tvscan::{ScanConfig, Scanner};

/// Command-line values layered over the config file
#[derive(Debug, Default)]
pub struct Overrides {
    pub seeds: Vec<String>,
    pub seeds_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub floor: Option<f64>,
    pub max_per_name: Option<usize>,
}

impl Overrides {
    fn apply(self, config: &mut ScanConfig) -> Result<()> {
        if let Some(path) = &self.seeds_file {
            config.seeds.extend(read_seeds_file(path)?);
        }
        config.seeds.extend(self.seeds);
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(floor) = self.floor {
            config.speed_floor_kbps = floor;
        }
        if let Some(max) = self.max_per_name {
            config.max_per_name = max;
        }
        Ok(())
    }
}

pub async fn cmd_scan(config_path: Option<&Path>, overrides: Overrides) -> Result<()> {
    let mut config = ScanConfig::load(config_path)?;
    overrides.apply(&mut config)?;

    if config.seeds.is_empty() {
        anyhow::bail!("No seeds configured: pass --seed, --seeds-file or set `seeds` in the config");
    }

    println!(
        "📺 tvscan {} scanning {} seeds (limits: {}/{}/{})",
        tvscan::VERSION,
        config.seeds.len(),
        config.limits.discovery,
        config.limits.enumeration,
        config.limits.speed_test
    );

    let scanner = Scanner::new(config)?;
    let outcome = scanner.run().await?;

    println!("\n📊 Summary:");
    println!("{}", outcome.summary);
    println!(
        "\n💾 Saved {} entries to {}",
        outcome.listing.len(),
        scanner.config().output.display()
    );

    Ok(())
}

/// One seed per line; blank lines and `#` comments are ignored.
fn read_seeds_file(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seeds file '{}'", path.display()))?;

    Ok(parse_seed_lines(&contents))
}

fn parse_seed_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_lines() {
        let seeds = parse_seed_lines("# hunan\nhttp://1.2.3.4:9901\n\n  http://5.6.7.8:8888  \n#http://9.9.9.9:1\n");
        assert_eq!(seeds, vec!["http://1.2.3.4:9901", "http://5.6.7.8:8888"]);
    }

    #[test]
    fn test_overrides_extend_seeds() {
        let mut config = ScanConfig {
            seeds: vec!["http://1.1.1.1:1".to_string()],
            ..ScanConfig::default()
        };
        Overrides {
            seeds: vec!["http://2.2.2.2:2".to_string()],
            floor: Some(0.0),
            ..Overrides::default()
        }
        .apply(&mut config)
        .unwrap();

        assert_eq!(config.seeds.len(), 2);
        assert!(config.speed_floor_kbps.abs() < f64::EPSILON);
        assert_eq!(config.max_per_name, 8);
    }
}

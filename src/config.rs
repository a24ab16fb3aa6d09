//! Scan configuration loaded from `~/.config/tvscan/config.toml`.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration that only lacks seeds.
//!
//! ```toml
//! seeds = ["http://110.52.99.30:9901"]
//! output = "itvlist.txt"
//! speed_floor_kbps = 500.0
//!
//! [limits]
//! discovery = 100
//!
//! [timeouts]
//! speed_test_secs = 5.0
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::scan::{AggregateOptions, ScanError};

/// Catalog endpoint queried for both liveness and the channel list
pub const DEFAULT_CATALOG_PATH: &str = "/iptv/live/1000.json?key=txiptv";

/// All tunables of a scan, threaded explicitly through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// `scheme://host:port` endpoints whose /24 neighbourhood is scanned
    pub seeds: Vec<String>,
    pub catalog_path: String,
    /// Streams slower than this (KB/s) are left out of the listing
    pub speed_floor_kbps: f64,
    /// Fastest URLs kept per channel name
    pub max_per_name: usize,
    pub output: PathBuf,
    pub emit_empty_categories: bool,
    pub dedupe_urls: bool,
    pub limits: Limits,
    pub timeouts: Timeouts,
}

/// In-flight caps per stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub discovery: usize,
    pub enumeration: usize,
    pub speed_test: usize,
}

/// Per-request timeouts in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub probe_secs: f64,
    pub enumerate_secs: f64,
    pub speed_test_secs: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            catalog_path: DEFAULT_CATALOG_PATH.to_string(),
            speed_floor_kbps: 500.0,
            max_per_name: 8,
            output: PathBuf::from("itvlist.txt"),
            emit_empty_categories: true,
            dedupe_urls: false,
            limits: Limits::default(),
            timeouts: Timeouts::default(),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            discovery: 100,
            enumeration: 50,
            speed_test: 20,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            probe_secs: 2.0,
            enumerate_secs: 2.0,
            speed_test_secs: 5.0,
        }
    }
}

impl Timeouts {
    pub fn probe(&self) -> Duration {
        Duration::from_secs_f64(self.probe_secs)
    }

    pub fn enumerate(&self) -> Duration {
        Duration::from_secs_f64(self.enumerate_secs)
    }

    pub fn speed_test(&self) -> Duration {
        Duration::from_secs_f64(self.speed_test_secs)
    }
}

impl ScanConfig {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing default file yields [`ScanConfig::default`]; an explicit
    /// path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let p = default_path();
                if !p.exists() {
                    return Ok(Self::default());
                }
                p
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        Self::from_toml(&content).with_context(|| format!("invalid config in {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values that would stall or empty every stage.
    pub fn validate(&self) -> Result<(), ScanError> {
        let limits = [
            ("discovery", self.limits.discovery),
            ("enumeration", self.limits.enumeration),
            ("speed_test", self.limits.speed_test),
        ];
        if let Some((stage, _)) = limits.iter().find(|(_, n)| *n == 0) {
            return Err(ScanError::Config(format!("limits.{stage} must be at least 1")));
        }
        if let Some((stage, _)) = limits.iter().find(|(_, n)| *n > Semaphore::MAX_PERMITS) {
            return Err(ScanError::Config(format!(
                "limits.{stage} must not exceed {}",
                Semaphore::MAX_PERMITS
            )));
        }

        let timeouts = [
            ("probe_secs", self.timeouts.probe_secs),
            ("enumerate_secs", self.timeouts.enumerate_secs),
            ("speed_test_secs", self.timeouts.speed_test_secs),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, s)| !(s.is_finite() && *s > 0.0)) {
            return Err(ScanError::Config(format!("timeouts.{name} must be positive")));
        }
        if let Some((name, _)) = timeouts
            .iter()
            .find(|(_, s)| Duration::try_from_secs_f64(*s).is_err())
        {
            return Err(ScanError::Config(format!("timeouts.{name} is out of range")));
        }

        if self.max_per_name == 0 {
            return Err(ScanError::Config("max_per_name must be at least 1".to_string()));
        }
        if !self.speed_floor_kbps.is_finite() {
            return Err(ScanError::Config("speed_floor_kbps must be finite".to_string()));
        }
        Ok(())
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            floor_kbps: self.speed_floor_kbps,
            max_per_name: self.max_per_name,
            dedupe_urls: self.dedupe_urls,
            emit_empty_categories: self.emit_empty_categories,
        }
    }
}

/// Return the path to the default config file.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tvscan")
        .join("config.toml")
}

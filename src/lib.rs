//! `tvscan` - IPTV endpoint discovery and stream speed ranking
//!
//! # Features
//!
//! - **Discovery**: expands each seed into its 255 /24 neighbours and probes them
//! - **Enumeration**: pulls the channel catalog of every live endpoint
//! - **Speed test**: times the first HLS segment of every stream
//! - **Ranking**: keeps the fastest URLs per channel, grouped by category
//!
//! # Example
//!
//! ```rust,no_run
//! use tvscan::{ScanConfig, Scanner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ScanConfig {
//!         seeds: vec!["http://110.52.99.30:9901".to_string()],
//!         ..ScanConfig::default()
//!     };
//!     let outcome = Scanner::new(config)?.run().await?;
//!     println!("Listed {} streams", outcome.listing.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod http_client;
pub mod scan;

pub use config::ScanConfig;
pub use http_client::ScanClient;
pub use scan::{
    aggregate, AggregateOptions, CandidateEndpoint, Category, ConcurrencyLimiter, Listing,
    LiveEndpoint, ProbeError, ScanError, ScanOutcome, ScanSummary, Scanner, SeedEndpoint,
    SeedError, SpeedResult, StreamEntry,
};

/// Version of tvscan
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

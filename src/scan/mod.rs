//! IPTV endpoint scanning pipeline
//!
//! Three concurrent stages followed by a single-threaded reduction:
//! - Discovery: expand each seed into 255 neighbours and probe them
//! - Enumeration: fetch the channel catalog of every live endpoint
//! - Speed test: time the first segment of every stream
//! - Aggregation: filter, categorize, rank and cap into a [`Listing`]
//!
//! Per-item failures never escape a stage. They surface as
//! [`ProbeError`] values that the stage runner counts and drops.

pub mod aggregate;
pub mod catalog;
pub mod expand;
pub mod limiter;
pub mod pipeline;
pub mod probe;
pub mod speed;

use std::fmt;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

pub use aggregate::{aggregate, AggregateOptions, Category, Listing, Section};
pub use catalog::{enumerate, normalize_name, parse_catalog, resolve_stream_url};
pub use expand::{Candidates, SeedEndpoint};
pub use limiter::{run_stage, ConcurrencyLimiter, StageReport};
pub use pipeline::{ScanOutcome, ScanSummary, Scanner};
pub use probe::probe;
pub use speed::{first_segment, measure, segment_url, throughput_kbps};

/// Errors that abort a whole scan
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to write listing to {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a seed endpoint contributed no candidates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    #[error("Unparsable seed '{seed}': {reason}")]
    Unparsable { seed: String, reason: String },

    #[error("Seed '{0}' has no host")]
    MissingHost(String),

    #[error("Seed host '{0}' is not a dotted address")]
    NotDotted(String),

    #[error("Seed '{0}' has no port and its scheme has no default")]
    MissingPort(String),
}

/// Failure of a single probe, catalog fetch or speed measurement
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("malformed catalog: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("manifest lists no segments")]
    EmptyManifest,

    #[error("segment arrived in zero time")]
    ZeroElapsed,

    #[error("stage limiter closed")]
    LimiterClosed,

    #[error("task panicked")]
    Panicked,
}

impl ProbeError {
    /// Short label used to tally failures in a [`StageReport`]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(e) if e.is_timeout() => "timeout",
            Self::Transport(e) if e.is_connect() => "connect",
            Self::Transport(_) => "transport",
            Self::Status(_) => "status",
            Self::Catalog(_) => "catalog",
            Self::EmptyManifest => "empty_manifest",
            Self::ZeroElapsed => "zero_elapsed",
            Self::LimiterClosed => "limiter_closed",
            Self::Panicked => "panicked",
        }
    }
}

/// An endpoint derived from a seed, not yet known to answer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateEndpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Catalog path and query, e.g. `/iptv/live/1000.json?key=txiptv`
    pub catalog_path: String,
}

impl CandidateEndpoint {
    /// `scheme://host:port`, the base for relative stream URLs
    pub fn origin(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    pub fn catalog_url(&self) -> String {
        format!("{}{}", self.origin(), self.catalog_path)
    }
}

impl fmt::Display for CandidateEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.catalog_url())
    }
}

/// A candidate that answered its catalog path with 200
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveEndpoint(CandidateEndpoint);

impl LiveEndpoint {
    pub(crate) fn confirmed(candidate: CandidateEndpoint) -> Self {
        Self(candidate)
    }

    pub fn origin(&self) -> String {
        self.0.origin()
    }

    pub fn catalog_url(&self) -> String {
        self.0.catalog_url()
    }
}

impl fmt::Display for LiveEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One named stream from a live endpoint's catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    /// Normalized channel name
    pub name: String,
    /// Absolute manifest URL
    pub url: String,
}

impl StreamEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A stream with its measured first-segment throughput
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedResult {
    pub entry: StreamEntry,
    /// KB/s (bytes / seconds / 1024)
    pub kbps: f64,
}

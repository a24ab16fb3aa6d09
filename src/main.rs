//! `tvscan` CLI - scan IPTV neighbourhoods and write a ranked channel list

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tvscan")]
#[command(about = "Discover IPTV endpoints, speed-test their streams and write a ranked channel list")]
#[command(version)]
struct Cli {
    /// Log every dropped probe and response
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run discovery, enumeration and speed test, then write the listing
    Scan {
        /// Config file (default: ~/.config/tvscan/config.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed endpoint `scheme://host:port` (repeatable, adds to config seeds)
        #[arg(short, long = "seed", value_name = "URL")]
        seeds: Vec<String>,

        /// File with one seed per line (# comments allowed)
        #[arg(long)]
        seeds_file: Option<PathBuf>,

        /// Where to write the listing
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minimum throughput in KB/s
        #[arg(long, value_name = "KBPS")]
        floor: Option<f64>,

        /// Fastest URLs kept per channel
        #[arg(long)]
        max_per_name: Option<usize>,
    },

    /// Print the 255 candidate catalog URLs derived from a seed
    Expand {
        /// Seed endpoint, e.g. http://110.52.99.30:9901
        seed: String,
    },

    /// Fetch one endpoint's channel catalog
    Catalog {
        /// Endpoint `scheme://host:port`
        endpoint: String,

        /// Request timeout in seconds
        #[arg(short, long, default_value = "5")]
        timeout: f64,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Config file (default: ~/.config/tvscan/config.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match cli.command {
        Commands::Scan {
            config,
            seeds,
            seeds_file,
            output,
            floor,
            max_per_name,
        } => {
            let overrides = cmd::scan::Overrides {
                seeds,
                seeds_file,
                output,
                floor,
                max_per_name,
            };
            cmd::scan::cmd_scan(config.as_deref(), overrides).await?;
        }
        Commands::Expand { seed } => {
            cmd::expand::cmd_expand(&seed)?;
        }
        Commands::Catalog { endpoint, timeout } => {
            cmd::catalog::cmd_catalog(&endpoint, timeout).await?;
        }
        Commands::Config { config } => {
            cmd::config::cmd_config(config.as_deref())?;
        }
    }

    Ok(())
}

//! CLI argument parsing using clap

use crate::util::logging::LogFormat;
use clap::Parser;
use std::path::PathBuf;

/// CachePulse - cache hit-rate experiments under synthetic query traffic
#[derive(Parser, Debug, Default)]
#[command(name = "cachepulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file (CLI options take precedence)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    // === Corpus Options ===
    /// Records required in the store before the experiment starts (<= 0 starts at once)
    #[arg(long, env = "TARGET_EVENT_COUNT", allow_negative_numbers = true)]
    pub target_record_count: Option<i64>,

    /// Pause between readiness polls in milliseconds
    #[arg(long)]
    pub wait_interval_ms: Option<u64>,

    /// Alerts produced per acquisition cycle
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Consecutive record store failures tolerated while polling
    #[arg(long)]
    pub max_store_failures: Option<u32>,

    /// JSON array of alerts to load into the store at startup
    #[arg(long, value_name = "FILE")]
    pub seed_file: Option<PathBuf>,

    // === Simulation Options ===
    /// Queries per distribution run (invalid values fall back to 1000)
    #[arg(short = 'n', long, env = "SIMULATION_QUERY_COUNT", allow_hyphen_values = true)]
    pub query_count: Option<String>,

    /// Comma-separated distributions to run in order (poisson, uniform)
    #[arg(short = 'D', long, env = "TRAFFIC_DISTRIBUTION_TYPES")]
    pub distributions: Option<String>,

    /// Poisson arrival rate in events per second
    #[arg(long)]
    pub poisson_lambda: Option<f64>,

    /// Lower bound of uniform waits in milliseconds
    #[arg(long)]
    pub uniform_min_ms: Option<u64>,

    /// Upper bound of uniform waits in milliseconds
    #[arg(long)]
    pub uniform_max_ms: Option<u64>,

    /// Skip the wait after the last query of each run
    #[arg(long)]
    pub no_trailing_wait: bool,

    /// Seed for reproducible interval sampling
    #[arg(long)]
    pub seed: Option<u64>,

    // === Cache Options ===
    /// Cache entry lifetime in seconds (0 disables expiry)
    #[arg(long, env = "CACHE_TTL")]
    pub cache_ttl: Option<u64>,

    // === Output Options ===
    /// Write the experiment report as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub json_output: Option<PathBuf>,

    /// Log line format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    // === Runtime Options ===
    /// Print the resolved configuration and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

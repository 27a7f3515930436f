//! TOML configuration file parsing

use super::*;
use crate::config::cli::Cli;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Load the configuration file named on the command line (if any) and
/// apply CLI overrides
pub fn load_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config {
        Some(ref path) => parse_toml_file(path)?,
        None => Config::default(),
    };
    merge_cli_with_config(cli, config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    // Corpus
    if let Some(target) = cli.target_record_count {
        config.corpus.target_record_count = target;
    }
    if let Some(wait) = cli.wait_interval_ms {
        config.corpus.wait_interval_ms = wait;
    }
    if let Some(batch) = cli.batch_size {
        config.corpus.acquisition_batch_size = batch;
    }
    if let Some(failures) = cli.max_store_failures {
        config.corpus.max_store_failures = failures;
    }
    if let Some(ref path) = cli.seed_file {
        config.corpus.seed_file = Some(path.clone());
    }

    // Simulation
    if let Some(ref raw) = cli.query_count {
        config.simulation.query_count = Some(RawQueryCount::Text(raw.clone()));
    }
    if let Some(ref distributions) = cli.distributions {
        config.simulation.distributions = distributions.clone();
    }
    if let Some(lambda) = cli.poisson_lambda {
        config.simulation.interval.poisson_lambda = lambda;
    }
    if let Some(min) = cli.uniform_min_ms {
        config.simulation.interval.uniform_min_ms = min;
    }
    if let Some(max) = cli.uniform_max_ms {
        config.simulation.interval.uniform_max_ms = max;
    }
    if cli.no_trailing_wait {
        config.simulation.trailing_wait = false;
    }
    if let Some(seed) = cli.seed {
        config.simulation.interval.seed = Some(seed);
    }

    // Cache
    if let Some(ttl) = cli.cache_ttl {
        config.cache.ttl_seconds = ttl;
    }

    // Output
    if let Some(ref path) = cli.json_output {
        config.output.json_output = Some(path.clone());
    }
    if let Some(format) = cli.log_format {
        config.output.log_format = format;
    }
    if cli.debug {
        config.output.debug = true;
    }
    if cli.dry_run {
        config.output.dry_run = true;
    }

    Ok(config)
}

//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.

pub mod cli;
pub mod toml;
pub mod validator;

use crate::distribution::IntervalParams;
use crate::readiness::GateConfig;
use crate::traffic::{GeneratorOptions, DEFAULT_DISTRIBUTIONS};
use crate::util::logging::LogFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Complete experiment configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Corpus bootstrap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Records required before the experiment starts
    ///
    /// Zero or negative means the experiment starts without acquiring.
    #[serde(default = "default_target_record_count")]
    pub target_record_count: i64,
    /// Pause between readiness polls (milliseconds)
    #[serde(default = "default_wait_interval_ms")]
    pub wait_interval_ms: u64,
    /// Alerts produced per acquisition cycle
    #[serde(default = "default_acquisition_batch_size")]
    pub acquisition_batch_size: usize,
    /// Consecutive record store failures tolerated while polling
    #[serde(default = "default_max_store_failures")]
    pub max_store_failures: u32,
    /// JSON array of alerts loaded into the store at startup
    pub seed_file: Option<PathBuf>,
}

fn default_target_record_count() -> i64 {
    100_000
}

fn default_wait_interval_ms() -> u64 {
    10_000
}

fn default_acquisition_batch_size() -> usize {
    50
}

fn default_max_store_failures() -> u32 {
    3
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            target_record_count: default_target_record_count(),
            wait_interval_ms: default_wait_interval_ms(),
            acquisition_batch_size: default_acquisition_batch_size(),
            max_store_failures: default_max_store_failures(),
            seed_file: None,
        }
    }
}

/// Query count as written in the configuration
///
/// Kept raw so that an unusable value falls back to the default at
/// experiment start instead of failing the whole configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawQueryCount {
    Number(i64),
    Text(String),
}

impl RawQueryCount {
    pub fn as_raw(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Traffic simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Comma-separated distribution names, run in order
    #[serde(default = "default_distributions")]
    pub distributions: String,
    /// Queries per distribution run
    pub query_count: Option<RawQueryCount>,
    /// Wait after the last query of each run as well
    #[serde(default = "default_trailing_wait")]
    pub trailing_wait: bool,
    /// Sampler parameters
    #[serde(flatten)]
    pub interval: IntervalParams,
}

fn default_distributions() -> String {
    DEFAULT_DISTRIBUTIONS.to_string()
}

fn default_trailing_wait() -> bool {
    true
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            distributions: default_distributions(),
            query_count: None,
            trailing_wait: default_trailing_wait(),
            interval: IntervalParams::default(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry lifetime in seconds (0 disables expiry)
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

fn default_ttl_seconds() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

/// Output and runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON report file path
    pub json_output: Option<PathBuf>,
    /// Log line format
    #[serde(default)]
    pub log_format: LogFormat,
    /// Enable debug logging (per-query lines)
    #[serde(default)]
    pub debug: bool,
    /// Print the resolved configuration and exit
    #[serde(default)]
    pub dry_run: bool,
}

impl Config {
    pub fn gate_config(&self) -> GateConfig {
        GateConfig {
            target_count: self.corpus.target_record_count.max(0) as u64,
            wait_interval: Duration::from_millis(self.corpus.wait_interval_ms),
            max_store_failures: self.corpus.max_store_failures,
        }
    }

    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            interval: self.simulation.interval.clone(),
            trailing_wait: self.simulation.trailing_wait,
        }
    }

    /// Default cache entry lifetime, `None` when expiry is disabled
    pub fn cache_ttl(&self) -> Option<Duration> {
        match self.cache.ttl_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn raw_query_count(&self) -> Option<String> {
        self.simulation.query_count.as_ref().map(RawQueryCount::as_raw)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration:")?;
        writeln!(f, "  Corpus: {}", self.corpus)?;
        writeln!(f, "  Simulation: {}", self.simulation)?;
        writeln!(f, "  Cache: {}", self.cache)?;
        writeln!(f, "  Output: {}", self.output)?;
        Ok(())
    }
}

impl fmt::Display for CorpusConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "target={}, wait_interval={}ms, batch_size={}, max_store_failures={}",
            self.target_record_count, self.wait_interval_ms, self.acquisition_batch_size, self.max_store_failures
        )?;
        if let Some(ref path) = self.seed_file {
            write!(f, ", seed_file={}", path.display())?;
        }
        Ok(())
    }
}

impl fmt::Display for SimulationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "distributions=[{}], queries=", self.distributions)?;
        match self.query_count {
            Some(ref raw) => write!(f, "{}", raw.as_raw())?,
            None => write!(f, "default")?,
        }
        write!(
            f,
            ", poisson_lambda={}, uniform=[{}, {}]ms, trailing_wait={}",
            self.interval.poisson_lambda,
            self.interval.uniform_min_ms,
            self.interval.uniform_max_ms,
            self.trailing_wait
        )?;
        if let Some(seed) = self.interval.seed {
            write!(f, ", seed={}", seed)?;
        }
        Ok(())
    }
}

impl fmt::Display for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ttl_seconds == 0 {
            write!(f, "ttl=none")
        } else {
            write!(f, "ttl={}s", self.ttl_seconds)
        }
    }
}

impl fmt::Display for OutputConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "log_format={:?}", self.log_format)?;
        if let Some(ref path) = self.json_output {
            write!(f, ", json={}", path.display())?;
        }
        if self.debug {
            write!(f, ", debug")?;
        }
        Ok(())
    }
}

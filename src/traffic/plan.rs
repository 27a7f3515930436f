//! Experiment plan resolution
//!
//! Turns the raw configured distribution list and query count into a plan.
//! Unknown distribution names are dropped, duplicates collapse onto their
//! first occurrence, and an invalid query count falls back to
//! [`DEFAULT_QUERY_COUNT`]. An empty distribution list aborts the whole
//! experiment.

use crate::distribution::DistributionKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

/// Queries per distribution run when none (or an invalid value) is configured
pub const DEFAULT_QUERY_COUNT: u64 = 1000;

/// Distribution list used when none is configured
pub const DEFAULT_DISTRIBUTIONS: &str = "poisson,uniform";

/// Reasons an experiment does not start
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExperimentError {
    #[error("no valid distribution in {raw:?} (known: poisson, uniform)")]
    NoValidDistributions { raw: String },
}

/// Resolved experiment plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentPlan {
    /// Distributions to run, in order, without duplicates
    pub distributions: Vec<DistributionKind>,
    /// Queries per distribution run
    pub query_count: u64,
}

impl ExperimentPlan {
    /// Resolve a plan from raw configuration values
    pub fn resolve(raw_distributions: &str, raw_query_count: Option<&str>) -> Result<Self, ExperimentError> {
        let distributions = resolve_distributions(raw_distributions);
        if distributions.is_empty() {
            error!(raw = raw_distributions, "no valid traffic distribution configured, aborting experiment");
            return Err(ExperimentError::NoValidDistributions {
                raw: raw_distributions.to_string(),
            });
        }
        let query_count = resolve_query_count(raw_query_count);

        let names: Vec<&str> = distributions.iter().map(|d| d.name()).collect();
        info!(distributions = %names.join(", "), query_count, "experiment plan resolved");

        Ok(Self {
            distributions,
            query_count,
        })
    }
}

/// Parse a comma-separated distribution list
///
/// Order is preserved; unknown names are dropped with a warning and repeated
/// names keep their first position.
pub fn resolve_distributions(raw: &str) -> Vec<DistributionKind> {
    let mut resolved = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        match DistributionKind::parse(name) {
            Some(kind) if !resolved.contains(&kind) => resolved.push(kind),
            Some(_) => {}
            None => warn!(name, "ignoring unknown traffic distribution"),
        }
    }
    resolved
}

/// Parse the configured query count
///
/// Missing values use the default silently; non-numeric or non-positive
/// values use it with a warning.
pub fn resolve_query_count(raw: Option<&str>) -> u64 {
    let Some(raw) = raw.map(str::trim) else {
        return DEFAULT_QUERY_COUNT;
    };
    match raw.parse::<i64>() {
        Ok(n) if n > 0 => n as u64,
        _ => {
            warn!(
                value = raw,
                default = DEFAULT_QUERY_COUNT,
                "invalid simulation query count, using default"
            );
            DEFAULT_QUERY_COUNT
        }
    }
}

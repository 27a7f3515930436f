//! Inter-arrival interval distributions
//!
//! This module provides the samplers that decide how long the traffic
//! generator waits between two simulated queries. Different distributions
//! model different client request cadences, which is what the cache
//! experiments compare.
//!
//! # Distributions
//!
//! - **Poisson**: Exponential inter-arrival times (memoryless, unbounded tail)
//! - **Uniform**: Waits drawn uniformly from a closed `[min, max]` interval
//!
//! # Example
//!
//! ```
//! use cachepulse::distribution::{DistributionKind, IntervalParams, IntervalSampler};
//!
//! let params = IntervalParams { seed: Some(7), ..IntervalParams::default() };
//! let mut sampler = DistributionKind::Uniform.sampler(&params);
//! let wait_ms = sampler.next_interval_ms();
//! assert!(wait_ms >= 0.0 && wait_ms <= 2000.0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub mod poisson;
pub mod uniform;

use poisson::PoissonInterval;
use uniform::UniformInterval;

/// Interval sampler trait
///
/// Samplers return the next wait in milliseconds. Values are always
/// non-negative. Parameter validation (positive lambda, ordered bounds) is
/// the caller's job; samplers never fail.
///
/// Each generator run owns its own sampler instance, so implementations may
/// keep a private RNG.
pub trait IntervalSampler: Send {
    /// Draw the next wait in milliseconds
    fn next_interval_ms(&mut self) -> f64;

    /// Draw the next wait as a `Duration`
    ///
    /// Draws above [`MAX_INTERVAL`] are clamped to it.
    fn next_interval(&mut self) -> Duration {
        let ms = self.next_interval_ms();
        if ms.is_finite() && ms > 0.0 {
            Duration::try_from_secs_f64(ms / 1000.0)
                .unwrap_or(MAX_INTERVAL)
                .min(MAX_INTERVAL)
        } else {
            Duration::ZERO
        }
    }
}

/// Longest wait a sampler hands out (one day)
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 3600);

/// Known distribution names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionKind {
    Poisson,
    Uniform,
}

impl DistributionKind {
    /// Every known distribution, in declaration order
    pub const ALL: [DistributionKind; 2] = [DistributionKind::Poisson, DistributionKind::Uniform];

    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Poisson => "poisson",
            Self::Uniform => "uniform",
        }
    }

    /// Match a configured name (case-insensitive, trimmed)
    ///
    /// `uniforme` is accepted as an alias of `uniform`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "poisson" => Some(Self::Poisson),
            "uniform" | "uniforme" => Some(Self::Uniform),
            _ => None,
        }
    }

    /// Build a fresh sampler for this distribution
    pub fn sampler(&self, params: &IntervalParams) -> Box<dyn IntervalSampler> {
        // Offset the seed per kind so two distributions never replay the same stream
        let seed = params.seed.map(|s| s.wrapping_add(*self as u64));
        match self {
            Self::Poisson => Box::new(match seed {
                Some(s) => PoissonInterval::with_seed(params.poisson_lambda, s),
                None => PoissonInterval::new(params.poisson_lambda),
            }),
            Self::Uniform => Box::new(match seed {
                Some(s) => UniformInterval::with_seed(params.uniform_min_ms, params.uniform_max_ms, s),
                None => UniformInterval::new(params.uniform_min_ms, params.uniform_max_ms),
            }),
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistributionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| anyhow::anyhow!("Unknown distribution: {}", s))
    }
}

/// Sampler parameters shared by all distributions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalParams {
    /// Poisson arrival rate (events per second)
    #[serde(default = "default_poisson_lambda")]
    pub poisson_lambda: f64,
    /// Lower bound of uniform waits (ms)
    #[serde(default)]
    pub uniform_min_ms: u64,
    /// Upper bound of uniform waits (ms)
    #[serde(default = "default_uniform_max_ms")]
    pub uniform_max_ms: u64,
    /// Fixed seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_poisson_lambda() -> f64 {
    1.0
}

fn default_uniform_max_ms() -> u64 {
    2000
}

impl Default for IntervalParams {
    fn default() -> Self {
        Self {
            poisson_lambda: default_poisson_lambda(),
            uniform_min_ms: 0,
            uniform_max_ms: default_uniform_max_ms(),
            seed: None,
        }
    }
}

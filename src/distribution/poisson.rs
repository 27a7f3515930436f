//! Poisson arrivals (exponential inter-arrival waits)
//!
//! A Poisson process with rate λ has exponentially distributed gaps between
//! events with mean `1/λ` seconds. Most draws are small; the tail is
//! unbounded.
//!
//! Sampling is `-ln(1 - u) / λ`, scaled to milliseconds. `Exp1` from
//! `rand_distr` performs the `-ln(1 - u)` step.

use super::IntervalSampler;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp1};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Exponential interval sampler
pub struct PoissonInterval {
    /// Arrival rate (events per second)
    lambda: f64,
    rng: Xoshiro256PlusPlus,
}

impl PoissonInterval {
    /// Create a sampler with a random seed
    pub fn new(lambda: f64) -> Self {
        Self {
            lambda,
            rng: Xoshiro256PlusPlus::from_entropy(),
        }
    }

    /// Create a sampler with a specific seed
    pub fn with_seed(lambda: f64, seed: u64) -> Self {
        Self {
            lambda,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Expected wait in milliseconds
    pub fn mean_ms(&self) -> f64 {
        1000.0 / self.lambda
    }
}

impl IntervalSampler for PoissonInterval {
    #[inline]
    fn next_interval_ms(&mut self) -> f64 {
        let unit: f64 = Exp1.sample(&mut self.rng);
        let ms = unit / self.lambda * 1000.0;
        // lambda <= 0 is rejected by config validation; never hand back a negative wait
        if ms.is_nan() || ms < 0.0 {
            0.0
        } else {
            ms
        }
    }
}

//! Uniform interval distribution
//!
//! Waits are drawn with equal probability from a closed `[min_ms, max_ms]`
//! interval. Bounded, unlike the Poisson sampler.

use super::IntervalSampler;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Uniform interval sampler
pub struct UniformInterval {
    min_ms: f64,
    max_ms: f64,
    rng: Xoshiro256PlusPlus,
}

impl UniformInterval {
    /// Create a sampler with a random seed
    ///
    /// Reversed bounds are swapped rather than rejected.
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self::with_rng(min_ms, max_ms, Xoshiro256PlusPlus::from_entropy())
    }

    /// Create a sampler with a specific seed
    pub fn with_seed(min_ms: u64, max_ms: u64, seed: u64) -> Self {
        Self::with_rng(min_ms, max_ms, Xoshiro256PlusPlus::seed_from_u64(seed))
    }

    fn with_rng(min_ms: u64, max_ms: u64, rng: Xoshiro256PlusPlus) -> Self {
        let (lo, hi) = if min_ms <= max_ms { (min_ms, max_ms) } else { (max_ms, min_ms) };
        Self {
            min_ms: lo as f64,
            max_ms: hi as f64,
            rng,
        }
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min_ms, self.max_ms)
    }
}

impl IntervalSampler for UniformInterval {
    #[inline]
    fn next_interval_ms(&mut self) -> f64 {
        self.rng.gen_range(self.min_ms..=self.max_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_within_bounds() {
        let mut dist = UniformInterval::with_seed(500, 1500, 42);
        for _ in 0..10_000 {
            let ms = dist.next_interval_ms();
            assert!((500.0..=1500.0).contains(&ms), "{} out of bounds", ms);
        }
    }

    #[test]
    fn test_uniform_degenerate_interval() {
        let mut dist = UniformInterval::new(250, 250);
        for _ in 0..10 {
            assert_eq!(dist.next_interval_ms(), 250.0);
        }
    }

    #[test]
    fn test_uniform_swapped_bounds() {
        let mut dist = UniformInterval::with_seed(900, 100, 5);
        assert_eq!(dist.bounds(), (100.0, 900.0));
        for _ in 0..1000 {
            let ms = dist.next_interval_ms();
            assert!((100.0..=900.0).contains(&ms));
        }
    }

    #[test]
    fn test_uniform_coverage() {
        let mut dist = UniformInterval::with_seed(0, 1000, 42);
        let mut buckets = vec![0u32; 10];

        for _ in 0..10_000 {
            let ms = dist.next_interval_ms();
            let bucket = ((ms / 100.0) as usize).min(9);
            buckets[bucket] += 1;
        }

        // Each bucket should have roughly 1000 samples; allow 20% deviation
        for count in buckets {
            assert!(count > 800 && count < 1200, "Bucket count {} outside expected range", count);
        }
    }

    #[test]
    fn test_uniform_seeded_reproducible() {
        let mut a = UniformInterval::with_seed(0, 2000, 12345);
        let mut b = UniformInterval::with_seed(0, 2000, 12345);
        for _ in 0..10 {
            assert_eq!(a.next_interval_ms(), b.next_interval_ms());
        }
    }
}

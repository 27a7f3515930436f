//! Configuration validation
//!
//! The query count and distribution list are not checked here: an unusable
//! query count falls back to its default and an empty distribution list
//! aborts the experiment when it is resolved.

use super::*;
use anyhow::Result;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_corpus(&config.corpus)?;
    validate_interval(&config.simulation.interval)?;
    Ok(())
}

/// Validate corpus bootstrap settings
pub fn validate_corpus(corpus: &CorpusConfig) -> Result<()> {
    if corpus.wait_interval_ms == 0 {
        anyhow::bail!("wait_interval_ms must be greater than 0");
    }

    if corpus.acquisition_batch_size == 0 {
        anyhow::bail!("acquisition_batch_size must be greater than 0");
    }

    if corpus.max_store_failures == 0 {
        anyhow::bail!("max_store_failures must be at least 1");
    }

    if let Some(ref path) = corpus.seed_file {
        if !path.exists() {
            anyhow::bail!("seed_file does not exist: {}", path.display());
        }
    }

    Ok(())
}

/// Validate sampler parameters
pub fn validate_interval(params: &IntervalParams) -> Result<()> {
    if !params.poisson_lambda.is_finite() || params.poisson_lambda <= 0.0 {
        anyhow::bail!("poisson_lambda must be positive, got {}", params.poisson_lambda);
    }

    if params.uniform_min_ms > params.uniform_max_ms {
        anyhow::bail!(
            "uniform_min_ms ({}) must not exceed uniform_max_ms ({})",
            params.uniform_min_ms,
            params.uniform_max_ms
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_lambda() {
        let mut params = IntervalParams::default();
        params.poisson_lambda = 0.0;
        assert!(validate_interval(&params).is_err());

        params.poisson_lambda = -1.0;
        assert!(validate_interval(&params).is_err());

        params.poisson_lambda = f64::NAN;
        assert!(validate_interval(&params).is_err());

        params.poisson_lambda = 0.5;
        assert!(validate_interval(&params).is_ok());
    }

    #[test]
    fn test_validate_uniform_bounds() {
        let mut params = IntervalParams::default();
        params.uniform_min_ms = 500;
        params.uniform_max_ms = 100;
        let err = validate_interval(&params).unwrap_err();
        assert!(err.to_string().contains("uniform_min_ms"));

        params.uniform_max_ms = 500;
        assert!(validate_interval(&params).is_ok());
    }

    #[test]
    fn test_validate_corpus() {
        let mut corpus = CorpusConfig::default();
        corpus.wait_interval_ms = 0;
        assert!(validate_corpus(&corpus).is_err());

        let mut corpus = CorpusConfig::default();
        corpus.acquisition_batch_size = 0;
        assert!(validate_corpus(&corpus).is_err());

        let mut corpus = CorpusConfig::default();
        corpus.max_store_failures = 0;
        let err = validate_corpus(&corpus).unwrap_err();
        assert!(err.to_string().contains("max_store_failures"));

        let mut corpus = CorpusConfig::default();
        corpus.max_store_failures = 1;
        assert!(validate_corpus(&corpus).is_ok());

        let mut corpus = CorpusConfig::default();
        corpus.seed_file = Some(PathBuf::from("/nonexistent/cachepulse/seed.json"));
        assert!(validate_corpus(&corpus).is_err());
    }

    #[test]
    fn test_query_count_and_distributions_not_validated() {
        let mut config = Config::default();
        config.simulation.query_count = Some(RawQueryCount::Number(-1));
        config.simulation.distributions = "bogus".to_string();
        assert!(validate_config(&config).is_ok());
    }
}

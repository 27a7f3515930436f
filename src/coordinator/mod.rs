//! Experiment coordinator
//!
//! Waits for the readiness gate's "target reached" signal, resolves the
//! experiment plan from configuration and drives the traffic generator
//! through every configured distribution.

use crate::readiness::TargetReached;
use crate::traffic::{ExperimentError, ExperimentPlan, RunSummary, TrafficGenerator};
use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// Everything an experiment produced
#[derive(Debug, Clone)]
pub struct ExperimentReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Corpus size reported by the readiness signal
    pub event_count: u64,
    pub plan: ExperimentPlan,
    pub runs: Vec<RunSummary>,
}

impl ExperimentReport {
    /// True if shutdown cut the experiment short
    pub fn cancelled(&self) -> bool {
        self.runs.iter().any(|run| run.cancelled)
    }
}

/// Runs the experiment once the corpus is ready
pub struct ExperimentCoordinator {
    generator: TrafficGenerator,
    raw_distributions: String,
    raw_query_count: Option<String>,
}

impl ExperimentCoordinator {
    /// `raw_distributions` and `raw_query_count` are resolved only when the
    /// signal arrives, as configured
    pub fn new(generator: TrafficGenerator, raw_distributions: impl Into<String>, raw_query_count: Option<String>) -> Self {
        Self {
            generator,
            raw_distributions: raw_distributions.into(),
            raw_query_count,
        }
    }

    /// Wait for the readiness signal, then run the experiment
    ///
    /// Returns `Ok(None)` if the gate went away without signalling.
    pub async fn run(&self, signal: oneshot::Receiver<TargetReached>) -> Result<Option<ExperimentReport>, ExperimentError> {
        match signal.await {
            Ok(reached) => self.on_target_reached(reached).await.map(Some),
            Err(_) => {
                warn!("readiness gate finished without reaching its target, no experiment run");
                Ok(None)
            }
        }
    }

    /// Run every configured distribution for a ready corpus
    pub async fn on_target_reached(&self, reached: TargetReached) -> Result<ExperimentReport, ExperimentError> {
        info!(count = reached.event_count, "corpus target reached, starting traffic experiment");
        let started_at = Utc::now();

        let plan = match ExperimentPlan::resolve(&self.raw_distributions, self.raw_query_count.as_deref()) {
            Ok(plan) => plan,
            Err(e) => {
                error!(error = %e, "experiment aborted");
                return Err(e);
            }
        };

        let runs = self.generator.run_all(&plan).await;

        Ok(ExperimentReport {
            started_at,
            finished_at: Utc::now(),
            event_count: reached.event_count,
            plan,
            runs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryCache;
    use crate::cache::CacheAccessor;
    use crate::distribution::DistributionKind;
    use crate::record::sample_record;
    use crate::stats::CacheStatistics;
    use crate::store::mock::MockRecordStore;
    use crate::traffic::GeneratorOptions;
    use crate::util::scheduler::ManualScheduler;
    use std::sync::Arc;

    fn coordinator(distributions: &str, query_count: Option<&str>) -> ExperimentCoordinator {
        let store = Arc::new(MockRecordStore::with_records(vec![sample_record("a"), sample_record("b")]));
        let cache = Arc::new(CacheAccessor::new(Arc::new(MemoryCache::new()), None));
        let generator = TrafficGenerator::new(
            store,
            cache,
            Arc::new(ManualScheduler::new()),
            GeneratorOptions::default(),
        );
        ExperimentCoordinator::new(generator, distributions, query_count.map(str::to_string))
    }

    #[tokio::test]
    async fn test_runs_each_distribution_in_order() {
        let coordinator = coordinator("uniform, poisson, bogus", Some("4"));

        let report = coordinator
            .on_target_reached(TargetReached { event_count: 7 })
            .await
            .unwrap();

        assert_eq!(report.event_count, 7);
        assert_eq!(
            report.plan.distributions,
            vec![DistributionKind::Uniform, DistributionKind::Poisson]
        );
        assert_eq!(report.runs.len(), 2);
        for run in &report.runs {
            assert_eq!(run.issued, 4);
            assert_eq!(run.statistics, CacheStatistics { hits: 2, misses: 2 });
        }
        assert!(report.finished_at >= report.started_at);
        assert!(!report.cancelled());
    }

    #[tokio::test]
    async fn test_no_valid_distribution_aborts() {
        let coordinator = coordinator("bogus,normal", Some("4"));

        let err = coordinator
            .on_target_reached(TargetReached { event_count: 1 })
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ExperimentError::NoValidDistributions {
                raw: "bogus,normal".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_query_count_uses_default() {
        let coordinator = coordinator("poisson", Some("lots"));

        let report = coordinator
            .on_target_reached(TargetReached { event_count: 1 })
            .await
            .unwrap();

        assert_eq!(report.plan.query_count, crate::traffic::DEFAULT_QUERY_COUNT);
        assert_eq!(report.runs[0].issued, crate::traffic::DEFAULT_QUERY_COUNT);
    }

    #[tokio::test]
    async fn test_waits_for_signal() {
        let coordinator = coordinator("poisson", Some("2"));
        let (tx, rx) = oneshot::channel();
        tx.send(TargetReached { event_count: 3 }).unwrap();

        let report = coordinator.run(rx).await.unwrap().unwrap();
        assert_eq!(report.runs.len(), 1);
        assert_eq!(report.event_count, 3);
    }

    #[tokio::test]
    async fn test_dropped_signal_runs_nothing() {
        let coordinator = coordinator("poisson", Some("2"));
        let (tx, rx) = oneshot::channel::<TargetReached>();
        drop(tx);

        assert!(coordinator.run(rx).await.unwrap().is_none());
    }
}

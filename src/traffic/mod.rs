//! Synthetic traffic generation
//!
//! The generator plays the part of a single client: it issues one simulated
//! query, waits an interval drawn from the active distribution, and repeats.
//! Queries never overlap, so the sampled intervals are the request cadence
//! the cache sees.
//!
//! One simulated query is a cache-aside lookup:
//!
//! 1. Fetch a uniformly random record from the record store
//! 2. Look up `record:<id>` through the cache accessor
//! 3. On a miss, store the fetched record under that key
//!
//! A failing query is logged and abandoned; the run carries on.
//!
//! Multiple distributions run strictly one after another. Between runs the
//! cache statistics are logged and the cache is reset and cleared, so no run
//! observes state left behind by the previous one.

pub mod plan;

pub use plan::{ExperimentError, ExperimentPlan, DEFAULT_DISTRIBUTIONS, DEFAULT_QUERY_COUNT};

use crate::cache::CacheAccessor;
use crate::distribution::{DistributionKind, IntervalParams};
use crate::error::BackendError;
use crate::record::AlertRecord;
use crate::stats::histogram::IntervalHistogram;
use crate::stats::CacheStatistics;
use crate::store::RecordStore;
use crate::util::scheduler::Scheduler;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Generator behaviour
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    /// Sampler parameters shared by every run
    pub interval: IntervalParams,
    /// Also wait after the last query of a run
    ///
    /// Adds one extra interval to each run's elapsed time.
    pub trailing_wait: bool,
}

/// Result of one simulated query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The record was served from the cache
    Hit(AlertRecord),
    /// The record came from the store and was written to the cache
    Miss(AlertRecord),
    /// The store had nothing to return
    EmptyStore,
    /// The query failed and was dropped
    Abandoned { record_id: Option<String> },
}

impl QueryOutcome {
    /// The record served by this query, if any
    pub fn record(&self) -> Option<&AlertRecord> {
        match self {
            Self::Hit(record) | Self::Miss(record) => Some(record),
            Self::EmptyStore | Self::Abandoned { .. } => None,
        }
    }
}

/// What happened during one distribution run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub distribution: DistributionKind,
    /// Queries the run was configured for
    pub requested: u64,
    /// Queries actually issued (less than `requested` if cancelled)
    pub issued: u64,
    /// Queries that returned a record
    pub served: u64,
    /// Queries skipped because the store was empty
    pub empty: u64,
    /// Queries that failed and were dropped
    pub abandoned: u64,
    /// Cache counters at the end of the run, before reset
    pub statistics: CacheStatistics,
    /// Waits scheduled between queries
    pub intervals: IntervalHistogram,
    pub elapsed: Duration,
    pub cancelled: bool,
}

impl RunSummary {
    fn new(distribution: DistributionKind, requested: u64) -> Self {
        Self {
            distribution,
            requested,
            issued: 0,
            served: 0,
            empty: 0,
            abandoned: 0,
            statistics: CacheStatistics::default(),
            intervals: IntervalHistogram::new(),
            elapsed: Duration::ZERO,
            cancelled: false,
        }
    }

    fn tally(&mut self, outcome: &QueryOutcome) {
        self.issued += 1;
        match outcome {
            QueryOutcome::Hit(_) | QueryOutcome::Miss(_) => self.served += 1,
            QueryOutcome::EmptyStore => self.empty += 1,
            QueryOutcome::Abandoned { .. } => self.abandoned += 1,
        }
    }
}

/// Sequential cache-aside query generator
pub struct TrafficGenerator {
    store: Arc<dyn RecordStore>,
    cache: Arc<CacheAccessor>,
    scheduler: Arc<dyn Scheduler>,
    options: GeneratorOptions,
}

impl TrafficGenerator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        cache: Arc<CacheAccessor>,
        scheduler: Arc<dyn Scheduler>,
        options: GeneratorOptions,
    ) -> Self {
        Self {
            store,
            cache,
            scheduler,
            options,
        }
    }

    pub fn cache(&self) -> &Arc<CacheAccessor> {
        &self.cache
    }

    /// Issue one cache-aside lookup for a random record
    pub async fn simulate_query(&self) -> QueryOutcome {
        let mut attempted: Option<String> = None;
        match self.try_query(&mut attempted).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    record_id = attempted.as_deref().unwrap_or("<unknown>"),
                    error = %e,
                    "simulated query failed"
                );
                QueryOutcome::Abandoned { record_id: attempted }
            }
        }
    }

    async fn try_query(&self, attempted: &mut Option<String>) -> Result<QueryOutcome, BackendError> {
        let record = match self.store.find_random().await? {
            Some(record) => record,
            None => {
                warn!("record store returned no record, skipping query");
                return Ok(QueryOutcome::EmptyStore);
            }
        };
        if record.id().is_empty() {
            return Err(BackendError::Other("random record has no identifier".to_string()));
        }
        *attempted = Some(record.id().to_string());

        let key = record.cache_key();
        if let Some(cached) = self.cache.get::<AlertRecord>(&key).await {
            return Ok(QueryOutcome::Hit(cached));
        }
        self.cache.set(&key, &record, None).await;
        Ok(QueryOutcome::Miss(record))
    }

    /// Run `query_count` queries paced by `distribution`
    pub async fn run(&self, distribution: DistributionKind, query_count: u64) -> RunSummary {
        info!(%distribution, queries = query_count, "starting traffic generation");

        let mut sampler = distribution.sampler(&self.options.interval);
        let mut summary = RunSummary::new(distribution, query_count);
        let start = Instant::now();

        for i in 0..query_count {
            let outcome = self.simulate_query().await;
            debug!(%distribution, query = i + 1, outcome = outcome_label(&outcome), "query finished");
            summary.tally(&outcome);

            let is_last = i + 1 == query_count;
            if is_last && !self.options.trailing_wait {
                break;
            }

            let wait = sampler.next_interval();
            summary.intervals.record(wait);
            if self.scheduler.sleep(wait).await.is_err() {
                warn!(%distribution, issued = summary.issued, "traffic generation cancelled by shutdown");
                summary.cancelled = true;
                break;
            }
        }

        summary.elapsed = start.elapsed();
        summary.statistics = self.cache.statistics();
        info!(
            %distribution,
            issued = summary.issued,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "traffic generation finished"
        );
        summary
    }

    /// Run every distribution in the plan, one after another
    ///
    /// After each run the cache statistics are logged and the cache is reset
    /// and cleared. A cancelled run ends the experiment early.
    pub async fn run_all(&self, plan: &ExperimentPlan) -> Vec<RunSummary> {
        let mut summaries = Vec::with_capacity(plan.distributions.len());

        for &distribution in &plan.distributions {
            info!(%distribution, "--- starting simulation ---");
            let summary = self.run(distribution, plan.query_count).await;
            log_statistics(distribution, &summary.statistics);
            self.cache.reset_and_clear().await;

            let cancelled = summary.cancelled;
            summaries.push(summary);
            if cancelled {
                warn!("experiment stopped before all distributions ran");
                break;
            }
        }

        info!(runs = summaries.len(), "all traffic simulations finished");
        summaries
    }
}

fn outcome_label(outcome: &QueryOutcome) -> &'static str {
    match outcome {
        QueryOutcome::Hit(_) => "hit",
        QueryOutcome::Miss(_) => "miss",
        QueryOutcome::EmptyStore => "empty",
        QueryOutcome::Abandoned { .. } => "abandoned",
    }
}

fn log_statistics(distribution: DistributionKind, stats: &CacheStatistics) {
    info!(
        %distribution,
        hits = stats.hits,
        misses = stats.misses,
        total = stats.total(),
        hit_rate = %stats.hit_rate_display(),
        "cache statistics"
    );
}

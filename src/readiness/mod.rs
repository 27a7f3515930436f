//! Corpus readiness gate
//!
//! Blocks experiment start until the record store holds at least
//! `target_count` records, running acquisition cycles in between.
//!
//! # State machine
//!
//! ```text
//! Idle ──ensure_minimum()──▶ Polling ──count ≥ target──▶ Signaled
//!   ▲                           │
//!   └──── cancelled / error ────┘
//! ```
//!
//! One polling iteration:
//!
//! 1. Read the record count; stop and signal if the target is met
//! 2. Run one acquisition cycle (a failed cycle is logged and retried next time)
//! 3. Re-read the count; stop and signal if the target is met
//! 4. Wait `wait_interval` and loop
//!
//! The "target reached" signal is a single-shot channel handed out by
//! [`ReadinessGate::new`]; it fires at most once per gate even if the loop
//! is entered again later.
//!
//! # Re-entry
//!
//! A second `ensure_minimum()` while a loop is running logs a warning and
//! returns [`GateOutcome::AlreadyActive`] without touching the store. The
//! `active` flag is an `AtomicBool` claimed with compare-exchange, since the
//! binary runs on a multi-threaded runtime, and released by a drop guard on
//! every exit path.

use crate::acquire::Acquirer;
use crate::error::BackendError;
use crate::store::RecordStore;
use crate::util::scheduler::Scheduler;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Default pause between polling iterations
pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_millis(10_000);

/// Payload of the "target reached" signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetReached {
    pub event_count: u64,
}

/// How an `ensure_minimum()` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// The corpus reached its target
    Reached(TargetReached),
    /// Another polling loop was already running; nothing was done
    AlreadyActive,
    /// Shutdown interrupted the wait between iterations
    Cancelled,
}

/// Fatal polling failure
#[derive(Debug, Error)]
pub enum GateError {
    #[error("record store failed {failures} consecutive times: {source}")]
    StoreUnavailable {
        failures: u32,
        #[source]
        source: BackendError,
    },
}

/// Gate tuning
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Corpus size required before experiments may run
    pub target_count: u64,
    /// Pause between polling iterations
    pub wait_interval: Duration,
    /// Consecutive `count_all` failures that end polling (at least 1)
    pub max_store_failures: u32,
}

impl GateConfig {
    pub fn new(target_count: u64) -> Self {
        Self {
            target_count,
            wait_interval: DEFAULT_WAIT_INTERVAL,
            max_store_failures: 3,
        }
    }
}

/// Releases the `active` flag when the polling loop exits
struct ActiveGuard<'a> {
    active: &'a AtomicBool,
}

impl<'a> ActiveGuard<'a> {
    fn acquire(active: &'a AtomicBool) -> Option<Self> {
        active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { active })
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
        info!("readiness polling loop finished");
    }
}

/// Polls the record store until the corpus is large enough
pub struct ReadinessGate {
    config: GateConfig,
    store: Arc<dyn RecordStore>,
    acquirer: Arc<dyn Acquirer>,
    scheduler: Arc<dyn Scheduler>,
    active: AtomicBool,
    signal: Mutex<Option<oneshot::Sender<TargetReached>>>,
}

impl ReadinessGate {
    /// Create a gate and the receiving end of its "target reached" signal
    pub fn new(
        config: GateConfig,
        store: Arc<dyn RecordStore>,
        acquirer: Arc<dyn Acquirer>,
        scheduler: Arc<dyn Scheduler>,
    ) -> (Self, oneshot::Receiver<TargetReached>) {
        let (tx, rx) = oneshot::channel();
        let gate = Self {
            config,
            store,
            acquirer,
            scheduler,
            active: AtomicBool::new(false),
            signal: Mutex::new(Some(tx)),
        };
        (gate, rx)
    }

    pub fn target_count(&self) -> u64 {
        self.config.target_count
    }

    /// Whether a polling loop is currently running
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Whether the signal has not been emitted yet
    pub fn signal_pending(&self) -> bool {
        self.signal
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Poll until the corpus reaches the target
    pub async fn ensure_minimum(&self) -> Result<GateOutcome, GateError> {
        let _guard = match ActiveGuard::acquire(&self.active) {
            Some(guard) => guard,
            None => {
                warn!("readiness polling already active, ignoring second start");
                return Ok(GateOutcome::AlreadyActive);
            }
        };

        let target = self.config.target_count;
        info!(target, "ensuring minimum corpus size");

        let mut failures = 0u32;
        let mut iteration = 0u64;
        loop {
            iteration += 1;

            if let Some(count) = self.read_count(iteration, &mut failures).await? {
                info!(iteration, count, target, "records currently stored");
                if count >= target {
                    info!(count, target, "corpus already at target");
                    return Ok(GateOutcome::Reached(self.emit(count)));
                }

                match self.acquirer.acquire_batch().await {
                    Ok(inserted) => debug!(iteration, inserted, "acquisition cycle stored records"),
                    Err(e) => error!(iteration, error = %e, "acquisition cycle failed"),
                }

                if let Some(count) = self.read_count(iteration, &mut failures).await? {
                    if count >= target {
                        info!(count, target, "corpus reached target");
                        return Ok(GateOutcome::Reached(self.emit(count)));
                    }
                    info!(
                        count,
                        target,
                        wait_ms = self.config.wait_interval.as_millis() as u64,
                        "corpus below target, waiting before next cycle"
                    );
                }
            }

            if self.scheduler.sleep(self.config.wait_interval).await.is_err() {
                info!(iteration, "readiness polling cancelled by shutdown");
                return Ok(GateOutcome::Cancelled);
            }
        }
    }

    /// Read the record count, tolerating up to `max_store_failures` failures in a row
    async fn read_count(&self, iteration: u64, failures: &mut u32) -> Result<Option<u64>, GateError> {
        match self.store.count_all().await {
            Ok(count) => {
                *failures = 0;
                Ok(Some(count))
            }
            Err(source) => {
                *failures += 1;
                error!(iteration, failures = *failures, error = %source, "failed to count stored records");
                if *failures >= self.config.max_store_failures {
                    return Err(GateError::StoreUnavailable {
                        failures: *failures,
                        source,
                    });
                }
                Ok(None)
            }
        }
    }

    /// Fire the signal if it has not fired yet
    fn emit(&self, event_count: u64) -> TargetReached {
        let payload = TargetReached { event_count };
        let sender = self
            .signal
            .lock()
            .map(|mut slot| slot.take())
            .unwrap_or(None);
        match sender {
            Some(tx) => {
                if tx.send(payload).is_err() {
                    warn!(event_count, "no listener for target-reached signal");
                }
            }
            None => debug!(event_count, "target-reached signal already emitted"),
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendResult;
    use crate::store::mock::MockRecordStore;
    use crate::util::scheduler::{ManualScheduler, TokioScheduler};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingAcquirer {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingAcquirer {
        fn failing() -> Self {
            Self { fail: true, ..Self::default() }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Acquirer for CountingAcquirer {
        async fn acquire_batch(&self) -> BackendResult<usize> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(BackendError::unavailable("feed timed out"))
            } else {
                Ok(10)
            }
        }
    }

    struct Fixture {
        gate: Arc<ReadinessGate>,
        rx: oneshot::Receiver<TargetReached>,
        store: Arc<MockRecordStore>,
        acquirer: Arc<CountingAcquirer>,
    }

    fn fixture(
        target: u64,
        store: MockRecordStore,
        acquirer: CountingAcquirer,
        scheduler: Arc<dyn Scheduler>,
    ) -> Fixture {
        let store = Arc::new(store);
        let acquirer = Arc::new(acquirer);
        let (gate, rx) = ReadinessGate::new(
            GateConfig::new(target),
            store.clone(),
            acquirer.clone(),
            scheduler,
        );
        Fixture {
            gate: Arc::new(gate),
            rx,
            store,
            acquirer,
        }
    }

    #[tokio::test]
    async fn test_negative_configured_target_signals_immediately() {
        let config = crate::config::toml::parse_toml_string("[corpus]\ntarget_record_count = -5\n").unwrap();
        let store = Arc::new(MockRecordStore::with_counts(vec![0]));
        let acquirer = Arc::new(CountingAcquirer::default());
        let scheduler = Arc::new(ManualScheduler::new());
        let (gate, mut rx) = ReadinessGate::new(config.gate_config(), store.clone(), acquirer.clone(), scheduler.clone());
        assert_eq!(gate.target_count(), 0);

        let outcome = gate.ensure_minimum().await.unwrap();

        assert_eq!(outcome, GateOutcome::Reached(TargetReached { event_count: 0 }));
        assert_eq!(rx.try_recv().unwrap(), TargetReached { event_count: 0 });
        assert_eq!(acquirer.calls(), 0);
        assert_eq!(store.count_calls(), 1);
        assert_eq!(scheduler.wait_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_target_signals_immediately() {
        let scheduler = Arc::new(ManualScheduler::new());
        let f = fixture(0, MockRecordStore::with_counts(vec![0]), CountingAcquirer::default(), scheduler.clone());

        let outcome = f.gate.ensure_minimum().await.unwrap();

        assert_eq!(outcome, GateOutcome::Reached(TargetReached { event_count: 0 }));
        assert_eq!(f.acquirer.calls(), 0);
        assert_eq!(scheduler.wait_count(), 0);
        assert_eq!(f.rx.await.unwrap(), TargetReached { event_count: 0 });
    }

    #[tokio::test]
    async fn test_signals_once_with_final_count() {
        let scheduler = Arc::new(ManualScheduler::new());
        let f = fixture(5, MockRecordStore::with_counts(vec![0, 2, 5]), CountingAcquirer::default(), scheduler.clone());

        let outcome = f.gate.ensure_minimum().await.unwrap();

        assert_eq!(outcome, GateOutcome::Reached(TargetReached { event_count: 5 }));
        assert_eq!(f.store.count_calls(), 3);
        assert_eq!(f.acquirer.calls(), 1);
        assert_eq!(scheduler.waits(), vec![DEFAULT_WAIT_INTERVAL]);
        assert!(!f.gate.is_active());
        assert!(!f.gate.signal_pending());

        // Entering again still reports the count but does not fire a second signal
        let again = f.gate.ensure_minimum().await.unwrap();
        assert_eq!(again, GateOutcome::Reached(TargetReached { event_count: 5 }));
        assert_eq!(f.rx.await.unwrap(), TargetReached { event_count: 5 });
    }

    #[tokio::test]
    async fn test_reached_after_acquisition_without_waiting() {
        let scheduler = Arc::new(ManualScheduler::new());
        let f = fixture(10, MockRecordStore::with_counts(vec![4, 12]), CountingAcquirer::default(), scheduler.clone());

        let outcome = f.gate.ensure_minimum().await.unwrap();

        assert_eq!(outcome, GateOutcome::Reached(TargetReached { event_count: 12 }));
        assert_eq!(scheduler.wait_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_acquisition_is_retried() {
        let scheduler = Arc::new(ManualScheduler::new());
        let f = fixture(3, MockRecordStore::with_counts(vec![0, 0, 0, 0, 3]), CountingAcquirer::failing(), scheduler.clone());

        let outcome = f.gate.ensure_minimum().await.unwrap();

        assert_eq!(outcome, GateOutcome::Reached(TargetReached { event_count: 3 }));
        assert_eq!(f.acquirer.calls(), 2);
        assert_eq!(scheduler.wait_count(), 1);
    }

    #[tokio::test]
    async fn test_store_failures_abort_and_release_flag() {
        let scheduler = Arc::new(ManualScheduler::new());
        let f = fixture(5, MockRecordStore::with_script(vec![None, None, None]), CountingAcquirer::default(), scheduler);

        let err = f.gate.ensure_minimum().await.unwrap_err();

        assert!(matches!(err, GateError::StoreUnavailable { failures: 3, .. }));
        assert!(!f.gate.is_active());
        assert_eq!(f.acquirer.calls(), 0);
        assert!(f.gate.signal_pending());
    }

    #[tokio::test]
    async fn test_store_recovers_after_transient_failure() {
        let scheduler = Arc::new(ManualScheduler::new());
        let f = fixture(5, MockRecordStore::with_script(vec![None, Some(5)]), CountingAcquirer::default(), scheduler.clone());

        let outcome = f.gate.ensure_minimum().await.unwrap();

        assert_eq!(outcome, GateOutcome::Reached(TargetReached { event_count: 5 }));
        assert_eq!(scheduler.wait_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_wait_releases_flag() {
        let scheduler = Arc::new(ManualScheduler::cancel_after(0));
        let f = fixture(100, MockRecordStore::with_counts(vec![0]), CountingAcquirer::default(), scheduler);

        let outcome = f.gate.ensure_minimum().await.unwrap();

        assert_eq!(outcome, GateOutcome::Cancelled);
        assert!(!f.gate.is_active());
        assert!(f.gate.signal_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reentrant_call_does_not_poll() {
        let scheduler = TokioScheduler::new();
        let shutdown = scheduler.shutdown_handle();
        let f = fixture(100, MockRecordStore::with_counts(vec![0]), CountingAcquirer::default(), Arc::new(scheduler));

        let first = {
            let gate = f.gate.clone();
            tokio::spawn(async move { gate.ensure_minimum().await })
        };
        while !f.gate.is_active() {
            tokio::task::yield_now().await;
        }
        let calls_before = f.store.count_calls();

        let second = f.gate.ensure_minimum().await.unwrap();

        assert_eq!(second, GateOutcome::AlreadyActive);
        assert_eq!(f.store.count_calls(), calls_before);

        shutdown.trigger();
        assert_eq!(first.await.unwrap().unwrap(), GateOutcome::Cancelled);
        assert!(!f.gate.is_active());
    }
}

//! Scheduled waits
//!
//! The readiness gate and the traffic generator only ever pause through a
//! [`Scheduler`]. The production scheduler sleeps on the tokio timer and wakes
//! early on shutdown; [`ManualScheduler`] records what was requested and
//! returns at once, which keeps tests fast and lets them assert on the exact
//! waits.
//!
//! # Example
//!
//! ```
//! use cachepulse::util::scheduler::{Scheduler, TokioScheduler};
//! use std::time::Duration;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let scheduler = TokioScheduler::new();
//! let shutdown = scheduler.shutdown_handle();
//!
//! assert!(scheduler.sleep(Duration::from_millis(1)).await.is_ok());
//! shutdown.trigger();
//! assert!(scheduler.sleep(Duration::from_secs(3600)).await.is_err());
//! # });
//! ```

use crate::error::Cancelled;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Source of cancellable waits
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Wait for `duration`, or return `Cancelled` if shutdown is requested first
    async fn sleep(&self, duration: Duration) -> Result<(), Cancelled>;
}

/// Scheduler backed by `tokio::time::sleep`
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    shutdown: Arc<watch::Sender<bool>>,
}

/// Requests shutdown of every wait on a [`TokioScheduler`]
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    shutdown: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Cancel in-flight and future waits
    pub fn trigger(&self) {
        self.shutdown.send_replace(true);
    }
}

impl TokioScheduler {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            shutdown: Arc::new(tx),
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            shutdown: self.shutdown.clone(),
        }
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        let mut rx = self.shutdown.subscribe();
        if *rx.borrow_and_update() {
            return Err(Cancelled);
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = rx.wait_for(|stop| *stop) => Err(Cancelled),
        }
    }
}

/// Scheduler that never actually waits
///
/// Every requested duration is recorded. With [`ManualScheduler::cancel_after`]
/// the scheduler starts returning `Cancelled` once that many waits have been
/// granted.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    waits: Mutex<Vec<Duration>>,
    cancel_after: Option<usize>,
    granted: AtomicUsize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `n` waits, then report shutdown
    pub fn cancel_after(n: usize) -> Self {
        Self {
            cancel_after: Some(n),
            ..Self::default()
        }
    }

    /// Every wait requested so far, in order
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn wait_count(&self) -> usize {
        self.waits.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl Scheduler for ManualScheduler {
    async fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        self.waits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
        let granted = self.granted.fetch_add(1, Ordering::SeqCst);
        match self.cancel_after {
            Some(limit) if granted >= limit => Err(Cancelled),
            _ => {
                tokio::task::yield_now().await;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_sleeps() {
        let scheduler = TokioScheduler::new();
        let start = tokio::time::Instant::now();
        scheduler.sleep(Duration::from_secs(10)).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_sleep() {
        let scheduler = TokioScheduler::new();
        let shutdown = scheduler.shutdown_handle();

        let sleeper = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.sleep(Duration::from_secs(3600)).await })
        };
        tokio::task::yield_now().await;
        shutdown.trigger();

        assert_eq!(sleeper.await.unwrap(), Err(Cancelled));
        assert!(scheduler.is_shutdown());
    }

    #[tokio::test]
    async fn test_manual_scheduler_records() {
        let scheduler = ManualScheduler::new();
        scheduler.sleep(Duration::from_millis(5)).await.unwrap();
        scheduler.sleep(Duration::from_millis(7)).await.unwrap();
        assert_eq!(
            scheduler.waits(),
            vec![Duration::from_millis(5), Duration::from_millis(7)]
        );
    }

    #[tokio::test]
    async fn test_manual_scheduler_cancel_after() {
        let scheduler = ManualScheduler::cancel_after(1);
        assert!(scheduler.sleep(Duration::from_millis(1)).await.is_ok());
        assert_eq!(scheduler.sleep(Duration::from_millis(1)).await, Err(Cancelled));
        assert_eq!(scheduler.wait_count(), 2);
    }
}

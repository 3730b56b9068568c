//! Fixed-interval status poller.
//!
//! The polling safety net that runs whenever push delivery is not
//! demonstrably healthy. The first poll fires immediately on start, closing
//! the staleness gap while a channel is still connecting; subsequent polls
//! fire on a fixed wall-clock interval. Start and stop are no-ops when the
//! poller is already in the requested state, which is the invariant that
//! prevents timer leaks when a channel flaps between open and erroring.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PollerConfig;
use crate::error::Result;
use crate::hooks::PollFn;

/// Runtime statistics for a status poller
#[derive(Debug, Default)]
pub struct PollerStats {
    /// Poll invocations issued
    pub polling_cycles: AtomicU64,
    /// Poll invocations that panicked
    pub polling_errors: AtomicU64,
    /// Inactive -> active transitions
    pub starts: AtomicU64,
    /// Active -> inactive transitions
    pub stops: AtomicU64,
}

impl PollerStats {
    /// Copy the counters into a plain snapshot
    pub fn snapshot(&self) -> PollerStatsSnapshot {
        PollerStatsSnapshot {
            polling_cycles: self.polling_cycles.load(Ordering::Relaxed),
            polling_errors: self.polling_errors.load(Ordering::Relaxed),
            starts: self.starts.load(Ordering::Relaxed),
            stops: self.stops.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`PollerStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollerStatsSnapshot {
    pub polling_cycles: u64,
    pub polling_errors: u64,
    pub starts: u64,
    pub stops: u64,
}

/// Interval-driven poll loop with idempotent start/stop
pub struct StatusPoller {
    poller_id: Uuid,
    config: PollerConfig,
    poll_fn: PollFn,
    active: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
    stats: Arc<PollerStats>,
}

impl std::fmt::Debug for StatusPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusPoller")
            .field("poller_id", &self.poller_id)
            .field("config", &self.config)
            .field("active", &self.is_active())
            .finish()
    }
}

impl StatusPoller {
    /// Create a poller; does not start it
    pub fn new(poll_fn: PollFn, config: PollerConfig) -> Result<Self> {
        config.validate()?;

        let poller_id = Uuid::new_v4();
        debug!(
            poller_id = %poller_id,
            poll_interval = ?config.poll_interval,
            "Creating StatusPoller"
        );

        Ok(Self {
            poller_id,
            config,
            poll_fn,
            active: Arc::new(AtomicBool::new(false)),
            task: Mutex::new(None),
            stats: Arc::new(PollerStats::default()),
        })
    }

    /// Begin polling: one invocation immediately, then one per interval
    ///
    /// No-op if the poller is already active. Must be called within a Tokio
    /// runtime.
    pub fn start(&self) {
        if self.active.swap(true, Ordering::SeqCst) {
            debug!(poller_id = %self.poller_id, "start() on active poller ignored");
            return;
        }

        self.stats.starts.fetch_add(1, Ordering::Relaxed);
        info!(
            poller_id = %self.poller_id,
            poll_interval = ?self.config.poll_interval,
            "Starting polling"
        );

        let poller_id = self.poller_id;
        let poll_interval = self.config.poll_interval;
        let poll_fn = self.poll_fn.clone();
        let active = self.active.clone();
        let stats = self.stats.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);

            loop {
                // First tick completes immediately; the schedule stays
                // anchored to wall-clock ticks regardless of poll latency.
                interval.tick().await;

                // Active flag checked at fire time so a stop() that raced a
                // pending tick suppresses the invocation.
                if !active.load(Ordering::SeqCst) {
                    break;
                }

                stats.polling_cycles.fetch_add(1, Ordering::Relaxed);
                debug!(poller_id = %poller_id, "Polling cycle");

                // An individual poll failing, even by panic, must not stop
                // the schedule; the interval is the delivery safety net.
                if AssertUnwindSafe(poll_fn()).catch_unwind().await.is_err() {
                    stats.polling_errors.fetch_add(1, Ordering::Relaxed);
                    warn!(poller_id = %poller_id, "Poll invocation panicked, keeping schedule");
                }
            }

            debug!(poller_id = %poller_id, "Polling loop ended");
        });

        *self.task.lock() = Some(handle);
    }

    /// Stop polling
    ///
    /// No-op if the poller is already inactive. No poll invocation begins
    /// after this returns.
    pub fn stop(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            debug!(poller_id = %self.poller_id, "stop() on inactive poller ignored");
            return;
        }

        self.stats.stops.fetch_add(1, Ordering::Relaxed);
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }

        info!(poller_id = %self.poller_id, "Stopped polling");
    }

    /// Check if the interval loop is currently active
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Snapshot of the poller counters
    pub fn stats(&self) -> PollerStatsSnapshot {
        self.stats.snapshot()
    }

    /// Poller instance identifier
    pub fn poller_id(&self) -> Uuid {
        self.poller_id
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

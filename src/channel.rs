//! Reconnecting push channel.
//!
//! Maintains one logical push connection across many underlying connection
//! instances: a driver task connects, forwards events to the consumer hooks,
//! and on failure releases the dead instance, waits the fixed retry delay,
//! and connects again. Teardown is a monotonic flag flip followed by task
//! abort, so a `close()` racing an already-scheduled retry always wins.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ChannelConfig;
use crate::error::Result;
use crate::guard::ShutdownGuard;
use crate::hooks::ChannelHooks;
use crate::states::{ChannelEvent, ChannelState};
use crate::transport::{ConnectionEvent, PushConnection, PushTransport};

/// Runtime statistics for a reconnecting channel
#[derive(Debug, Default)]
pub struct ChannelStats {
    /// Connection attempts issued (including the first)
    pub connect_attempts: AtomicU64,
    /// Successful open handshakes
    pub opens: AtomicU64,
    /// Messages delivered to the consumer handler
    pub messages_received: AtomicU64,
    /// Consumer handler invocations that panicked
    pub handler_panics: AtomicU64,
    /// Connection errors (explicit failures and unexpected stream ends)
    pub connection_errors: AtomicU64,
    /// Retry timers scheduled after an error
    pub reconnects_scheduled: AtomicU64,
}

impl ChannelStats {
    /// Copy the counters into a plain snapshot
    pub fn snapshot(&self) -> ChannelStatsSnapshot {
        ChannelStatsSnapshot {
            connect_attempts: self.connect_attempts.load(Ordering::Relaxed),
            opens: self.opens.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            handler_panics: self.handler_panics.load(Ordering::Relaxed),
            connection_errors: self.connection_errors.load(Ordering::Relaxed),
            reconnects_scheduled: self.reconnects_scheduled.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`ChannelStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStatsSnapshot {
    pub connect_attempts: u64,
    pub opens: u64,
    pub messages_received: u64,
    pub handler_panics: u64,
    pub connection_errors: u64,
    pub reconnects_scheduled: u64,
}

/// State shared between the handle and its driver task
struct ChannelShared {
    state: Mutex<ChannelState>,
    connection: Mutex<Option<Arc<dyn PushConnection>>>,
    guard: ShutdownGuard,
    stats: ChannelStats,
}

impl ChannelShared {
    fn transition(&self, channel_id: Uuid, event: ChannelEvent) -> ChannelState {
        let mut state = self.state.lock();
        let next = state.apply(event);
        debug!(
            channel_id = %channel_id,
            event = event.event_type(),
            from = %*state,
            to = %next,
            "Channel state transition"
        );
        *state = next;
        next
    }

    /// Release the current connection instance, if any
    fn release_connection(&self) {
        if let Some(connection) = self.connection.lock().take() {
            connection.close();
        }
    }
}

/// A push channel that survives connection drops
///
/// One handle owns at most one live connection instance at a time. The
/// instance exposed by [`connection`](Self::connection) changes across
/// reconnects and must not be cached past an error boundary.
pub struct ReconnectingChannel {
    channel_id: Uuid,
    config: ChannelConfig,
    shared: Arc<ChannelShared>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for ReconnectingChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconnectingChannel")
            .field("channel_id", &self.channel_id)
            .field("config", &self.config)
            .field("state", &self.state())
            .field("closed", &self.shared.guard.is_tripped())
            .finish()
    }
}

impl ReconnectingChannel {
    /// Create a channel and issue the first connection attempt immediately
    ///
    /// Must be called within a Tokio runtime; the connect/read/retry loop
    /// runs on a spawned driver task.
    pub fn new<S: Into<String>>(
        transport: Arc<dyn PushTransport>,
        url: S,
        hooks: ChannelHooks,
        config: ChannelConfig,
    ) -> Result<Self> {
        config.validate()?;

        let channel_id = Uuid::new_v4();
        let url = url.into();

        info!(
            channel_id = %channel_id,
            url = %url,
            retry_delay = ?config.retry_delay,
            "Creating ReconnectingChannel"
        );

        let shared = Arc::new(ChannelShared {
            state: Mutex::new(ChannelState::Connecting),
            connection: Mutex::new(None),
            guard: ShutdownGuard::new(),
            stats: ChannelStats::default(),
        });

        let driver = {
            let shared = shared.clone();
            let retry_delay = config.retry_delay;
            tokio::spawn(async move {
                Self::run(transport, url, hooks, retry_delay, shared, channel_id).await;
            })
        };

        Ok(Self {
            channel_id,
            config,
            shared,
            driver: Mutex::new(Some(driver)),
        })
    }

    /// Connect/read/retry loop
    ///
    /// The shutdown guard is re-checked after every await point so work
    /// scheduled before `close()` is suppressed rather than delivered.
    async fn run(
        transport: Arc<dyn PushTransport>,
        url: String,
        hooks: ChannelHooks,
        retry_delay: std::time::Duration,
        shared: Arc<ChannelShared>,
        channel_id: Uuid,
    ) {
        loop {
            if shared.guard.is_tripped() {
                break;
            }

            let attempt = shared.stats.connect_attempts.fetch_add(1, Ordering::Relaxed) + 1;
            let (connection, mut events) = transport.connect(&url);

            debug!(
                channel_id = %channel_id,
                connection_id = %connection.id(),
                attempt = attempt,
                "Issued connection attempt"
            );

            *shared.connection.lock() = Some(connection);

            let mut saw_failure = false;
            while let Some(event) = events.next().await {
                if shared.guard.is_tripped() {
                    return;
                }
                match event {
                    ConnectionEvent::Opened => {
                        shared.transition(channel_id, ChannelEvent::Opened);
                        shared.stats.opens.fetch_add(1, Ordering::Relaxed);
                        if let Some(on_open) = &hooks.on_open {
                            on_open();
                        }
                    }
                    ConnectionEvent::Message(payload) => {
                        shared.stats.messages_received.fetch_add(1, Ordering::Relaxed);
                        // A panicking consumer handler must not take the
                        // driver down; later messages and reconnects still
                        // have to flow.
                        let on_message = &hooks.on_message;
                        if catch_unwind(AssertUnwindSafe(|| on_message(payload))).is_err() {
                            shared.stats.handler_panics.fetch_add(1, Ordering::Relaxed);
                            warn!(
                                channel_id = %channel_id,
                                "Message handler panicked, continuing delivery"
                            );
                        }
                    }
                    ConnectionEvent::Failed => {
                        saw_failure = true;
                        break;
                    }
                }
            }

            if shared.guard.is_tripped() {
                return;
            }

            if !saw_failure {
                warn!(
                    channel_id = %channel_id,
                    "Connection event stream ended unexpectedly"
                );
            }

            shared.transition(channel_id, ChannelEvent::Failed);
            shared.stats.connection_errors.fetch_add(1, Ordering::Relaxed);

            // Release the dead instance before notifying, so the accessor
            // never exposes a connection that has moved on.
            shared.release_connection();
            drop(events);

            if let Some(on_error) = &hooks.on_error {
                on_error();
            }

            shared.stats.reconnects_scheduled.fetch_add(1, Ordering::Relaxed);
            debug!(
                channel_id = %channel_id,
                retry_delay = ?retry_delay,
                "Scheduling reconnect"
            );

            tokio::time::sleep(retry_delay).await;

            // Guarded at fire time, not schedule time: a close() that raced
            // the pending timer wins here.
            if shared.guard.is_tripped() {
                return;
            }
            shared.transition(channel_id, ChannelEvent::RetryElapsed);
        }
    }

    /// Permanently stop the channel
    ///
    /// Terminal and idempotent. Cancels any pending reconnect, detaches the
    /// driver so no hook fires after this returns, and closes the current
    /// connection instance.
    pub fn close(&self) {
        if !self.shared.guard.trip() {
            debug!(channel_id = %self.channel_id, "close() on closed channel ignored");
            return;
        }

        self.shared.transition(self.channel_id, ChannelEvent::Close);

        if let Some(driver) = self.driver.lock().take() {
            driver.abort();
        }
        self.shared.release_connection();

        info!(channel_id = %self.channel_id, "Channel closed");
    }

    /// Current lifecycle state
    pub fn state(&self) -> ChannelState {
        *self.shared.state.lock()
    }

    /// Current underlying connection instance, for diagnostics and tests
    ///
    /// The returned reference changes across reconnects; do not cache it
    /// across an error boundary.
    pub fn connection(&self) -> Option<Arc<dyn PushConnection>> {
        self.shared.connection.lock().clone()
    }

    /// Check if the channel has been closed
    pub fn is_closed(&self) -> bool {
        self.shared.guard.is_tripped()
    }

    /// Snapshot of the channel counters
    pub fn stats(&self) -> ChannelStatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Channel instance identifier
    pub fn channel_id(&self) -> Uuid {
        self.channel_id
    }
}

impl Drop for ReconnectingChannel {
    fn drop(&mut self) {
        // Dropping the handle without close() must not leak the driver task.
        if self.shared.guard.trip() {
            if let Some(driver) = self.driver.lock().take() {
                driver.abort();
            }
            self.shared.release_connection();
        }
    }
}

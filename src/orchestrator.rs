//! Fallback orchestrator: push when healthy, polling otherwise.
//!
//! Composes a reconnecting channel with an interval poller and decides which
//! delivery mechanism is currently authoritative. Polling starts before the
//! first connection attempt resolves, the channel's open event suspends it,
//! and every channel error resumes it, so the consumer is never left without
//! a delivery path. When the platform has no push primitive at all, no
//! channel is ever constructed and polling runs until teardown.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::channel::ReconnectingChannel;
use crate::config::OrchestratorConfig;
use crate::error::Result;
use crate::guard::ShutdownGuard;
use crate::hooks::{ChannelHooks, MessageHandler, PollFn};
use crate::poller::StatusPoller;
use crate::transport::PushCapability;

/// Which composition the orchestrator is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Push primary with polling fallback
    Hybrid,
    /// No push primitive available; polling is permanent
    PollingOnly,
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hybrid => write!(f, "hybrid"),
            Self::PollingOnly => write!(f, "polling_only"),
        }
    }
}

/// Update-delivery orchestrator with automatic polling fallback
///
/// Both the push handler and the poll function feed the same consumer-owned
/// update path; the orchestrator does not deduplicate, so the consumer's
/// handler must be idempotent with respect to seeing the same logical update
/// via both paths around a state transition.
pub struct FallbackOrchestrator {
    orchestrator_id: Uuid,
    mode: DeliveryMode,
    channel: Option<ReconnectingChannel>,
    poller: Arc<StatusPoller>,
    guard: Arc<ShutdownGuard>,
}

impl std::fmt::Debug for FallbackOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackOrchestrator")
            .field("orchestrator_id", &self.orchestrator_id)
            .field("mode", &self.mode)
            .field("polling_active", &self.poller.is_active())
            .field("closed", &self.guard.is_tripped())
            .finish()
    }
}

impl FallbackOrchestrator {
    /// Construct and immediately begin delivering updates
    ///
    /// Polling starts before the channel is built, so the first poll fires
    /// while the connection is still being established. Must be called
    /// within a Tokio runtime.
    pub fn new<S: Into<String>>(
        capability: PushCapability,
        url: S,
        on_message: MessageHandler,
        poll_fn: PollFn,
        config: OrchestratorConfig,
    ) -> Result<Self> {
        config.validate()?;

        let orchestrator_id = Uuid::new_v4();
        let url = url.into();
        let guard = Arc::new(ShutdownGuard::new());
        let poller = Arc::new(StatusPoller::new(poll_fn, config.poller.clone())?);

        poller.start();

        let (mode, channel) = match capability {
            None => {
                info!(
                    orchestrator_id = %orchestrator_id,
                    "Push primitive unavailable, running polling-only"
                );
                (DeliveryMode::PollingOnly, None)
            }
            Some(transport) => {
                let on_open = {
                    let poller = poller.clone();
                    let guard = guard.clone();
                    Arc::new(move || {
                        if !guard.is_tripped() {
                            poller.stop();
                        }
                    })
                };
                let on_error = {
                    let poller = poller.clone();
                    let guard = guard.clone();
                    Arc::new(move || {
                        if !guard.is_tripped() {
                            poller.start();
                        }
                    })
                };

                let hooks = ChannelHooks::new(on_message)
                    .with_on_open(on_open)
                    .with_on_error(on_error);

                let channel =
                    ReconnectingChannel::new(transport, url, hooks, config.channel.clone())?;
                (DeliveryMode::Hybrid, Some(channel))
            }
        };

        info!(
            orchestrator_id = %orchestrator_id,
            mode = %mode,
            poll_interval = ?config.poller.poll_interval,
            retry_delay = ?config.channel.retry_delay,
            "FallbackOrchestrator started"
        );

        Ok(Self {
            orchestrator_id,
            mode,
            channel,
            poller,
            guard,
        })
    }

    /// Tear down both delivery mechanisms
    ///
    /// Idempotent and safe to call from any state, including before the
    /// channel has ever opened. No handler or poll invocation begins after
    /// this returns.
    pub fn close(&self) {
        if !self.guard.trip() {
            debug!(
                orchestrator_id = %self.orchestrator_id,
                "close() on closed orchestrator ignored"
            );
            return;
        }

        if let Some(channel) = &self.channel {
            channel.close();
        }
        self.poller.stop();

        info!(orchestrator_id = %self.orchestrator_id, "FallbackOrchestrator closed");
    }

    /// Which composition this orchestrator is running
    pub fn delivery_mode(&self) -> DeliveryMode {
        self.mode
    }

    /// The composed channel, absent when push is unsupported
    pub fn channel(&self) -> Option<&ReconnectingChannel> {
        self.channel.as_ref()
    }

    /// The composed poller, for diagnostics and tests
    pub fn poller(&self) -> &StatusPoller {
        &self.poller
    }

    /// Check if the orchestrator has been closed
    pub fn is_closed(&self) -> bool {
        self.guard.is_tripped()
    }

    /// Orchestrator instance identifier
    pub fn orchestrator_id(&self) -> Uuid {
        self.orchestrator_id
    }
}

impl Drop for FallbackOrchestrator {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_mode_display() {
        assert_eq!(DeliveryMode::Hybrid.to_string(), "hybrid");
        assert_eq!(DeliveryMode::PollingOnly.to_string(), "polling_only");
    }
}

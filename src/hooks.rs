//! Callback types shared by the channel and the orchestrator.
//!
//! Hooks are plain `Arc<dyn Fn>` values rather than a handler trait: the
//! whole surface is a one-argument message sink plus zero-argument lifecycle
//! notifications, and trait objects with interior state would only add
//! ceremony. Every hook is invoked from a driver task, so they must be
//! `Send + Sync`.

use futures::future::BoxFuture;
use std::sync::Arc;

/// Consumer-supplied message sink, invoked once per inbound push payload
///
/// A panic in the handler is caught and logged by the caller; it skips that
/// one delivery and does not stop the channel or the poll schedule.
pub type MessageHandler = Arc<dyn Fn(String) + Send + Sync>;

/// Zero-argument lifecycle notification (channel opened / channel errored)
pub type LifecycleHook = Arc<dyn Fn() + Send + Sync>;

/// Opaque async poll operation invoked on a fixed schedule
///
/// The core awaits each invocation but does not inspect its outcome; retrying
/// or surfacing an individual poll failure is the poll function's own concern.
pub type PollFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Hook bundle wired into a [`ReconnectingChannel`](crate::channel::ReconnectingChannel)
#[derive(Clone)]
pub struct ChannelHooks {
    /// Invoked once per inbound message on any live connection instance
    pub on_message: MessageHandler,
    /// Invoked on each `CONNECTING -> OPEN` transition
    pub on_open: Option<LifecycleHook>,
    /// Invoked on each `OPEN/CONNECTING -> ERRORING` transition
    pub on_error: Option<LifecycleHook>,
}

impl ChannelHooks {
    /// Build a hook bundle with only a message handler
    pub fn new(on_message: MessageHandler) -> Self {
        Self {
            on_message,
            on_open: None,
            on_error: None,
        }
    }

    /// Attach an open notification hook
    pub fn with_on_open(mut self, hook: LifecycleHook) -> Self {
        self.on_open = Some(hook);
        self
    }

    /// Attach an error notification hook
    pub fn with_on_error(mut self, hook: LifecycleHook) -> Self {
        self.on_error = Some(hook);
        self
    }
}

impl std::fmt::Debug for ChannelHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelHooks")
            .field("has_on_open", &self.on_open.is_some())
            .field("has_on_error", &self.on_error.is_some())
            .finish()
    }
}

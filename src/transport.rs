//! Push transport abstraction.
//!
//! The channel consumes push delivery through a provider trait instead of a
//! concrete client, so platform capability becomes an injected value: an
//! orchestrator constructed with `None` runs the polling-only branch, and
//! tests exercise reconnect behavior with a scripted mock instead of a live
//! endpoint.

use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

/// Events emitted by one underlying connection instance
///
/// Within one instance events arrive in transport order; no ordering is
/// guaranteed across a reconnect boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The connection finished its handshake and is live
    Opened,
    /// An inbound message payload
    Message(String),
    /// The connection dropped; no further events will follow
    Failed,
}

impl ConnectionEvent {
    /// String representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Message(_) => "message",
            Self::Failed => "failed",
        }
    }
}

/// Stream of events for a single connection instance
pub type EventStream = Pin<Box<dyn Stream<Item = ConnectionEvent> + Send>>;

/// One underlying push connection instance
///
/// Instances are created per connect attempt and released on error or
/// teardown. Callers must not retain a reference across an error boundary;
/// the channel accessor always reflects the current instance.
pub trait PushConnection: Send + Sync {
    /// Stable identifier for this connection instance
    fn id(&self) -> Uuid;

    /// Platform-level close. Must be safe to call more than once.
    fn close(&self);
}

/// Factory for push connections
///
/// Connecting is synchronous and infallible at the call site, mirroring
/// browser-style push primitives: the instance exists immediately and
/// signals readiness or failure through its event stream.
pub trait PushTransport: Send + Sync {
    /// Open a new connection instance against `url`
    ///
    /// Returns the instance handle together with its event stream. The stream
    /// ending without a [`ConnectionEvent::Failed`] is treated by the channel
    /// as a connection error.
    fn connect(&self, url: &str) -> (Arc<dyn PushConnection>, EventStream);
}

/// Injected platform capability: `None` means no push primitive exists and
/// the orchestrator must fall back to polling permanently.
pub type PushCapability = Option<Arc<dyn PushTransport>>;

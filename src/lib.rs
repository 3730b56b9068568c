#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Jobwatch
//!
//! Resilient live-update delivery for job status changes: a server-push
//! channel with automatic fixed-delay reconnection, backed by an
//! interval-polling fallback that keeps the consumer inside a bounded
//! staleness window whenever push delivery is unavailable or degraded.
//!
//! ## Architecture
//!
//! Two composable components, layered leaf-first:
//!
//! - [`ReconnectingChannel`] owns one logical push connection across many
//!   underlying connection instances, re-establishing it after failure with
//!   a fixed delay and exposing open/error lifecycle hooks.
//! - [`FallbackOrchestrator`] composes a channel with a [`StatusPoller`] and
//!   keeps exactly one delivery mechanism authoritative: polling runs from
//!   construction until the channel opens, resumes on every channel error,
//!   and runs permanently when the platform has no push primitive.
//!
//! Push delivery is consumed through the [`PushTransport`] trait, so platform
//! capability is an injected value rather than a runtime type check and the
//! polling-only branch is exercised deterministically in tests.
//!
//! ## Module Organization
//!
//! - [`channel`] - Reconnecting push channel and its state machine driver
//! - [`poller`] - Fixed-interval poll loop with idempotent start/stop
//! - [`orchestrator`] - Channel/poller composition and capability branch
//! - [`transport`] - Push transport abstraction and connection events
//! - [`states`] - Channel lifecycle states and transition events
//! - [`config`] - Component configuration with validated defaults
//! - [`models`] - Typed job status payloads
//! - [`hooks`] - Consumer callback types
//! - [`guard`] - Monotonic shutdown guard
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use jobwatch::{FallbackOrchestrator, OrchestratorConfig, PushCapability};
//!
//! # fn transport() -> PushCapability { None }
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = FallbackOrchestrator::new(
//!     transport(), // None falls back to polling permanently
//!     "/api/jobs/123/events",
//!     Arc::new(|payload| println!("job update: {payload}")),
//!     Arc::new(|| Box::pin(async { /* fetch current status */ })),
//!     OrchestratorConfig::default(),
//! )?;
//!
//! // ... consumer view lives ...
//! orchestrator.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## Delivery semantics
//!
//! At-least-once, not exactly-once: around an open/error transition both
//! paths may briefly observe the same logical update, and the consumer's
//! handler must be idempotent. Message order is only what the transport
//! preserves within a single connection instance.

pub mod channel;
pub mod config;
pub mod error;
pub mod guard;
pub mod hooks;
pub mod models;
pub mod orchestrator;
pub mod poller;
pub mod states;
pub mod transport;

pub use channel::{ChannelStats, ChannelStatsSnapshot, ReconnectingChannel};
pub use config::{ChannelConfig, OrchestratorConfig, PollerConfig};
pub use error::{JobwatchError, Result};
pub use hooks::{ChannelHooks, LifecycleHook, MessageHandler, PollFn};
pub use models::{JobStatus, JobUpdate};
pub use orchestrator::{DeliveryMode, FallbackOrchestrator};
pub use poller::{PollerStats, PollerStatsSnapshot, StatusPoller};
pub use states::{ChannelEvent, ChannelState};
pub use transport::{ConnectionEvent, EventStream, PushCapability, PushConnection, PushTransport};

//! Channel lifecycle states and transition events.
//!
//! The reconnecting channel runs an explicit state machine over a closed set
//! of events rather than ad-hoc boolean flags, so the polling mutual-exclusion
//! invariant can be asserted mechanically: polling must be suspended exactly
//! while the channel is `Open`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle states for a reconnecting channel handle
///
/// One logical handle moves through these states across possibly many
/// underlying connection instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    /// A connection attempt has been issued and has not yet opened
    Connecting,
    /// The current connection instance is live and delivering messages
    Open,
    /// The current connection instance failed; a retry is pending
    Erroring,
    /// The handle was explicitly closed; terminal
    Closed,
}

impl ChannelState {
    /// Check if this is the terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Check if push delivery is currently authoritative
    ///
    /// Polling must be inactive exactly when this returns `true`.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Apply a transition event, returning the resulting state
    ///
    /// `Closed` absorbs every event. Events that do not apply to the current
    /// state leave it unchanged rather than panicking; the driver only emits
    /// valid sequences, but a stale callback racing a teardown must not be
    /// able to resurrect the handle.
    pub fn apply(self, event: ChannelEvent) -> ChannelState {
        match (self, event) {
            (Self::Closed, _) => Self::Closed,
            (_, ChannelEvent::Close) => Self::Closed,
            (Self::Connecting, ChannelEvent::Opened) => Self::Open,
            (Self::Open, ChannelEvent::Failed) | (Self::Connecting, ChannelEvent::Failed) => {
                Self::Erroring
            }
            (Self::Erroring, ChannelEvent::RetryElapsed) => Self::Connecting,
            (state, _) => state,
        }
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Open => write!(f, "open"),
            Self::Erroring => write!(f, "erroring"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for ChannelState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connecting" => Ok(Self::Connecting),
            "open" => Ok(Self::Open),
            "erroring" => Ok(Self::Erroring),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("Invalid channel state: {s}")),
        }
    }
}

/// Events that drive channel state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The underlying connection reported open
    Opened,
    /// The underlying connection failed or its event stream ended
    Failed,
    /// The fixed retry delay elapsed and a new attempt begins
    RetryElapsed,
    /// The owner called `close()`
    Close,
}

impl ChannelEvent {
    /// String representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Failed => "failed",
            Self::RetryElapsed => "retry_elapsed",
            Self::Close => "close",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn happy_path_transitions() {
        let state = ChannelState::Connecting;
        let state = state.apply(ChannelEvent::Opened);
        assert_eq!(state, ChannelState::Open);
        let state = state.apply(ChannelEvent::Failed);
        assert_eq!(state, ChannelState::Erroring);
        let state = state.apply(ChannelEvent::RetryElapsed);
        assert_eq!(state, ChannelState::Connecting);
    }

    #[test]
    fn close_applies_from_every_state() {
        for state in [
            ChannelState::Connecting,
            ChannelState::Open,
            ChannelState::Erroring,
            ChannelState::Closed,
        ] {
            assert_eq!(state.apply(ChannelEvent::Close), ChannelState::Closed);
        }
    }

    #[test]
    fn open_is_the_only_live_state() {
        assert!(ChannelState::Open.is_live());
        assert!(!ChannelState::Connecting.is_live());
        assert!(!ChannelState::Erroring.is_live());
        assert!(!ChannelState::Closed.is_live());
    }

    #[test]
    fn failed_during_connecting_schedules_retry() {
        // A connection can die before it ever opens; that still routes
        // through the erroring/retry path.
        assert_eq!(
            ChannelState::Connecting.apply(ChannelEvent::Failed),
            ChannelState::Erroring
        );
    }

    #[test]
    fn round_trip_display_from_str() {
        for state in [
            ChannelState::Connecting,
            ChannelState::Open,
            ChannelState::Erroring,
            ChannelState::Closed,
        ] {
            let parsed: ChannelState = state.to_string().parse().unwrap();
            assert_eq!(parsed, state);
        }
        assert!("bogus".parse::<ChannelState>().is_err());
    }

    fn arb_event() -> impl Strategy<Value = ChannelEvent> {
        prop_oneof![
            Just(ChannelEvent::Opened),
            Just(ChannelEvent::Failed),
            Just(ChannelEvent::RetryElapsed),
            Just(ChannelEvent::Close),
        ]
    }

    proptest! {
        /// Closed is absorbing: no event sequence after a Close ever leaves
        /// the terminal state.
        #[test]
        fn closed_is_absorbing(events in prop::collection::vec(arb_event(), 0..32)) {
            let mut state = ChannelState::Connecting.apply(ChannelEvent::Close);
            for event in events {
                state = state.apply(event);
                prop_assert_eq!(state, ChannelState::Closed);
            }
        }

        /// The machine never invents the Open state: only an Opened event on
        /// a Connecting handle can produce it.
        #[test]
        fn open_requires_opened_from_connecting(events in prop::collection::vec(arb_event(), 0..32)) {
            let mut state = ChannelState::Connecting;
            for event in events {
                let next = state.apply(event);
                if next == ChannelState::Open && state != ChannelState::Open {
                    prop_assert_eq!(state, ChannelState::Connecting);
                    prop_assert_eq!(event, ChannelEvent::Opened);
                }
                state = next;
            }
        }
    }
}

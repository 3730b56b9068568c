//! Structured error handling for jobwatch components.
//!
//! Errors surface only from construction and configuration validation. The
//! delivery paths themselves never return errors: transport failures feed the
//! reconnect loop, and poll failures belong to the poll function's own caller.

use thiserror::Error;

/// Errors produced by jobwatch constructors and configuration validation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum JobwatchError {
    /// Invalid configuration supplied at construction time
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport-level failure surfaced during setup
    #[error("Transport error: {0}")]
    Transport(String),

    /// Operation attempted on a handle that has already been closed
    #[error("Channel closed")]
    ChannelClosed,
}

impl JobwatchError {
    /// Build a configuration error from any displayable message
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, JobwatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let err = JobwatchError::config("poll_interval must be non-zero");
        assert_eq!(
            err.to_string(),
            "Configuration error: poll_interval must be non-zero"
        );
    }

    #[test]
    fn channel_closed_display() {
        assert_eq!(JobwatchError::ChannelClosed.to_string(), "Channel closed");
    }
}

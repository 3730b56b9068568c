//! Configuration for the channel, the poller, and their composition.
//!
//! Defaults match the shipped client behavior: one-second reconnect delay,
//! ten-second poll interval. All durations are plain [`Duration`] values
//! constructed by the consumer; there is no file-based configuration layer.

use std::time::Duration;

use crate::error::{JobwatchError, Result};

/// Configuration for a reconnecting channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Fixed delay between a connection error and the next attempt.
    /// Deliberately uncapped and unjittered; reconnection timing is part of
    /// the observable contract.
    pub retry_delay: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(1000),
        }
    }
}

impl ChannelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fixed reconnect delay
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Validate the configuration
    ///
    /// Any delay is acceptable, including zero (retry immediately); this
    /// exists for parity with the other configs and future constraints.
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Configuration for the interval poller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Fixed wall-clock interval between poll invocations. The first
    /// invocation fires immediately on start, not after one interval.
    pub poll_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10_000),
        }
    }
}

impl PollerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(JobwatchError::config("poll_interval must be non-zero"));
        }
        Ok(())
    }
}

/// Combined configuration for a fallback orchestrator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub channel: ChannelConfig,
    pub poller: PollerConfig,
}

impl OrchestratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the channel reconnect delay
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.channel.retry_delay = delay;
        self
    }

    /// Set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poller.poll_interval = interval;
        self
    }

    /// Validate both component configurations
    pub fn validate(&self) -> Result<()> {
        self.channel.validate()?;
        self.poller.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_client() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.channel.retry_delay, Duration::from_millis(1000));
        assert_eq!(config.poller.poll_interval, Duration::from_millis(10_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let config = PollerConfig::new().with_poll_interval(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_retry_delay_allowed() {
        let config = ChannelConfig::new().with_retry_delay(Duration::ZERO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_methods_compose() {
        let config = OrchestratorConfig::new()
            .with_retry_delay(Duration::from_millis(500))
            .with_poll_interval(Duration::from_secs(2));
        assert_eq!(config.channel.retry_delay, Duration::from_millis(500));
        assert_eq!(config.poller.poll_interval, Duration::from_secs(2));
    }
}

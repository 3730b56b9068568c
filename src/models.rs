//! Typed job status payloads.
//!
//! The backend's event stream and poll endpoint both report a job's status as
//! a bare string. The core never inspects payloads; these types let consumers
//! parse them into a closed vocabulary with terminal-state predicates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Job status vocabulary emitted by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is queued and has not started
    Pending,
    /// Job is being worked on
    Processing,
    /// Job finished successfully
    Completed,
    /// Job finished with an error
    Failed,
}

impl JobStatus {
    /// Check if this is a terminal status (the stream ends after emitting it)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Check if this status represents a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid job status: {s}")),
        }
    }
}

/// One observed update, stamping receipt time alongside the raw payload
///
/// `status` is `None` when the payload is outside the known vocabulary (the
/// backend emits a literal `"error"` sentinel when its own lookup fails);
/// consumers decide how to treat unparsed payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobUpdate {
    /// Raw payload exactly as received
    pub payload: String,
    /// Parsed status, when the payload is in the known vocabulary
    pub status: Option<JobStatus>,
    /// Client-side receipt timestamp
    pub received_at: DateTime<Utc>,
}

impl JobUpdate {
    /// Wrap a received payload, parsing it against the status vocabulary
    pub fn from_payload<S: Into<String>>(payload: S) -> Self {
        let payload = payload.into();
        let status = payload.trim().parse().ok();
        Self {
            payload,
            status,
            received_at: Utc::now(),
        }
    }

    /// Check if this update ends the job's logical timeline
    pub fn is_terminal(&self) -> bool {
        self.status.is_some_and(|s| s.is_terminal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_vocabulary() {
        let update = JobUpdate::from_payload("completed");
        assert_eq!(update.status, Some(JobStatus::Completed));
        assert!(update.is_terminal());

        let update = JobUpdate::from_payload("processing");
        assert_eq!(update.status, Some(JobStatus::Processing));
        assert!(!update.is_terminal());
    }

    #[test]
    fn unknown_payload_keeps_raw_text() {
        // The backend sends a bare "error" sentinel when its own job lookup
        // fails; that is not a job status.
        let update = JobUpdate::from_payload("error");
        assert_eq!(update.status, None);
        assert_eq!(update.payload, "error");
        assert!(!update.is_terminal());
    }

    #[test]
    fn trims_payload_whitespace_for_parsing() {
        let update = JobUpdate::from_payload("failed\n");
        assert_eq!(update.status, Some(JobStatus::Failed));
        assert!(update.status.unwrap().is_failure());
        assert_eq!(update.payload, "failed\n");
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&JobStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        let parsed: JobStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(parsed, JobStatus::Failed);
    }
}

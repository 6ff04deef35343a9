//! Status enums for stages, sub-steps, versions, and the run itself.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The execution status of a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Stage has not started yet.
    Pending,
    /// Stage is currently executing.
    InProgress,
    /// Stage finished successfully.
    Completed,
    /// Stage failed; eligible for retry.
    Error,
}

impl Default for StageStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// The status of a single sub-step within a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubStepStatus {
    /// Sub-step has not started yet.
    Pending,
    /// Sub-step is currently executing.
    InProgress,
    /// Sub-step finished.
    Completed,
}

impl Default for SubStepStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for SubStepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// The review lifecycle status of a content version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    /// Freshly generated, not yet reviewed.
    Draft,
    /// A user has looked at it.
    Reviewed,
    /// Accepted by the user.
    Approved,
    /// Rejected by the user.
    Rejected,
}

impl Default for VersionStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Reviewed => write!(f, "reviewed"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// The overall phase of a pipeline run.
///
/// Transitions: `Idle → Running → {Paused, Completed, Stopped}`;
/// `Paused → Running` (resume) or `Paused → Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Not started.
    Idle,
    /// Actively executing stages.
    Running,
    /// Halted at a stage boundary; resumable.
    Paused,
    /// All stages finished.
    Completed,
    /// Terminated by the caller; no further progress.
    Stopped,
}

impl Default for RunPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_pending_or_idle() {
        assert_eq!(StageStatus::default(), StageStatus::Pending);
        assert_eq!(SubStepStatus::default(), SubStepStatus::Pending);
        assert_eq!(VersionStatus::default(), VersionStatus::Draft);
        assert_eq!(RunPhase::default(), RunPhase::Idle);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&StageStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let status: RunPhase = serde_json::from_str("\"paused\"").unwrap();
        assert_eq!(status, RunPhase::Paused);
    }

    #[test]
    fn test_display_matches_serde() {
        assert_eq!(StageStatus::InProgress.to_string(), "in_progress");
        assert_eq!(RunPhase::Stopped.to_string(), "stopped");
    }
}

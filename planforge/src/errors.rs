//! Crate-wide error types.

use crate::assembly::ExportError;
use crate::core::{RunPhase, StageStatus};
use crate::persistence::DraftError;
use crate::providers::ProviderError;
use thiserror::Error;
use uuid::Uuid;

/// The crate's umbrella error.
#[derive(Debug, Error)]
pub enum PlanforgeError {
    /// A caller-supplied value failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A required input was absent.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// A lifecycle command was issued in a phase that does not accept it.
    #[error("cannot {command} while the run is {phase}")]
    InvalidTransition {
        /// Phase the run was in.
        phase: RunPhase,
        /// The rejected command.
        command: &'static str,
    },

    /// A stage id not present in the registry.
    #[error("unknown stage: '{0}'")]
    UnknownStage(String),

    /// Retry was requested for a stage that has not failed.
    #[error("stage '{stage_id}' is {status}, only failed stages can be retried")]
    StageNotRetryable {
        /// Stage the retry targeted.
        stage_id: String,
        /// Its actual status.
        status: StageStatus,
    },

    /// The generation backend failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A version id not owned by the named stage.
    #[error("stage '{stage_id}' has no version {version_id}")]
    UnknownVersion {
        /// Stage the lookup targeted.
        stage_id: String,
        /// The unknown version id.
        version_id: Uuid,
    },

    /// Regeneration was requested with no feedback on any existing version.
    #[error("stage '{stage_id}' has no version with feedback to regenerate from")]
    MissingFeedback {
        /// Stage the regeneration targeted.
        stage_id: String,
    },

    /// A stage is already at its version cap.
    #[error("stage '{stage_id}' already holds {limit} versions")]
    VersionLimitExceeded {
        /// Stage the generation targeted.
        stage_id: String,
        /// The configured cap.
        limit: usize,
    },

    /// Assembly was attempted before every stage completed.
    #[error("cannot assemble, incomplete stages: {}", missing.join(", "))]
    IncompletePipeline {
        /// Ids of the stages that are not `Completed`.
        missing: Vec<String>,
    },

    /// An export backend failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Draft persistence failed.
    #[error(transparent)]
    Draft(#[from] DraftError),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PlanforgeError>;

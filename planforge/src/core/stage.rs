//! Runtime state of a single pipeline stage.

use super::status::{StageStatus, SubStepStatus};
use super::version::ContentVersion;
use crate::registry::{ProviderTag, StageSpec};
use crate::utils::Timestamp;
use serde::{Deserialize, Serialize};

/// One named unit of work inside a stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubStep {
    /// Human-readable sub-step name.
    pub name: String,
    /// Current status.
    pub status: SubStepStatus,
    /// Wall-clock duration of the sub-step, once completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

impl SubStep {
    /// Creates a pending sub-step.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: SubStepStatus::Pending,
            duration_ms: None,
        }
    }
}

/// The mutable runtime record of one pipeline stage.
///
/// Created once at pipeline initialization from a [`StageSpec`]; mutated only
/// by the sequencer (status, progress, sub-steps, insights) and the version
/// manager (versions). Never deleted during a run, only reset on retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStage {
    /// Stable stage id, matching the registry spec.
    pub id: String,
    /// Human-readable label.
    pub name: String,
    /// Short description of what the stage produces.
    pub description: String,
    /// The provider assigned to this stage.
    pub provider: ProviderTag,
    /// Current execution status.
    pub status: StageStatus,
    /// Progress in `[0, 100]`, derived from completed sub-steps.
    pub progress: f64,
    /// Ordered sub-steps.
    pub sub_steps: Vec<SubStep>,
    /// Append-only free-text insight log.
    pub insights: Vec<String>,
    /// Deliverable labels from the registry spec.
    pub deliverables: Vec<String>,
    /// Message of the most recent failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Candidate versions generated for this stage.
    #[serde(default)]
    pub versions: Vec<ContentVersion>,
    /// When the stage last entered `InProgress`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,
    /// When the stage last completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

impl PipelineStage {
    /// Instantiates runtime state from a registry spec.
    #[must_use]
    pub fn from_spec(spec: &StageSpec) -> Self {
        Self {
            id: spec.id.clone(),
            name: spec.name.clone(),
            description: spec.description.clone(),
            provider: spec.provider,
            status: StageStatus::Pending,
            progress: 0.0,
            sub_steps: spec.sub_steps.iter().map(SubStep::new).collect(),
            insights: Vec::new(),
            deliverables: spec.deliverables.clone(),
            last_error: None,
            versions: Vec::new(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Number of completed sub-steps.
    #[must_use]
    pub fn completed_sub_steps(&self) -> usize {
        self.sub_steps
            .iter()
            .filter(|s| s.status == SubStepStatus::Completed)
            .count()
    }

    /// Appends an insight. The log is append-only; entries are never removed.
    pub fn record_insight(&mut self, insight: impl Into<String>) {
        self.insights.push(insight.into());
    }

    /// Resets the stage for a retry: progress to 0, sub-steps to pending,
    /// error cleared. Versions and insights are retained.
    pub fn reset_for_retry(&mut self) {
        self.status = StageStatus::Pending;
        self.progress = 0.0;
        self.last_error = None;
        self.started_at = None;
        self.completed_at = None;
        for step in &mut self.sub_steps {
            step.status = SubStepStatus::Pending;
            step.duration_ms = None;
        }
    }

    /// Looks up a version by id.
    #[must_use]
    pub fn version(&self, version_id: uuid::Uuid) -> Option<&ContentVersion> {
        self.versions.iter().find(|v| v.id == version_id)
    }

    /// The next version number for this stage (1-based, strictly increasing).
    #[must_use]
    pub fn next_version_number(&self) -> u32 {
        self.versions.last().map_or(1, |v| v.number + 1)
    }
}

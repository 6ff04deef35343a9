//! The pipeline run aggregate.
//!
//! All run state lives in one explicit [`PipelineRun`] value with a small
//! command surface. Each command validates against the prior state, mutates,
//! and returns a `Result`; nothing is silently swallowed.

use super::artifact::FinalArtifact;
use super::stage::PipelineStage;
use super::status::{RunPhase, StageStatus};
use super::version::{ContentVersion, VersionFeedback};
use crate::errors::PlanforgeError;
use crate::registry::StageCatalog;
use crate::requirements::RequirementAnalysis;
use crate::utils::{generate_uuid, now_utc, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// The idea the pipeline elaborates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdeaBrief {
    /// Idea title.
    pub title: String,
    /// Free-text description; required before a run may start.
    pub description: String,
    /// Idea category label.
    pub category: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl IdeaBrief {
    /// Creates a brief with a title and description.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: String::new(),
            tags: Vec::new(),
        }
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// One entry in the run's append-only error log.
///
/// Entries are never removed, only marked resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunError {
    /// Unique error id.
    pub id: Uuid,
    /// The stage the failure originated from.
    pub stage_id: String,
    /// Failure message.
    pub message: String,
    /// When the failure was recorded.
    pub timestamp: Timestamp,
    /// Whether a user has marked this entry resolved.
    pub resolved: bool,
}

/// The aggregate state of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    /// The idea being elaborated.
    pub idea: IdeaBrief,
    /// Stage runtime state, in registry order.
    pub stages: Vec<PipelineStage>,
    /// Current run phase.
    pub phase: RunPhase,
    /// Index of the stage the sequencer is positioned at; `None` when idle
    /// or stopped.
    pub current_stage_index: Option<usize>,
    /// When `start` was called.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,
    /// Append-only error log.
    #[serde(default)]
    pub errors: Vec<RunError>,
    /// Selected version per stage id.
    #[serde(default)]
    pub selected_versions: HashMap<String, Uuid>,
    /// The assembled artifact, once assembly has succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_artifact: Option<FinalArtifact>,
    /// The applied requirement analysis, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<RequirementAnalysis>,
}

impl PipelineRun {
    /// Creates an idle run with stage state instantiated from the catalogue.
    #[must_use]
    pub fn new(idea: IdeaBrief, catalog: &StageCatalog) -> Self {
        Self {
            idea,
            stages: catalog.iter().map(PipelineStage::from_spec).collect(),
            phase: RunPhase::Idle,
            current_stage_index: None,
            started_at: None,
            errors: Vec::new(),
            selected_versions: HashMap::new(),
            final_artifact: None,
            analysis: None,
        }
    }

    /// Aggregate progress: the arithmetic mean of per-stage progress.
    ///
    /// Always derived, never stored.
    #[must_use]
    pub fn overall_progress(&self) -> f64 {
        if self.stages.is_empty() {
            return 0.0;
        }
        let total: f64 = self.stages.iter().map(|s| s.progress).sum();
        total / self.stages.len() as f64
    }

    /// Looks up a stage by id.
    #[must_use]
    pub fn stage(&self, stage_id: &str) -> Option<&PipelineStage> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    /// Looks up a stage mutably by id.
    pub fn stage_mut(&mut self, stage_id: &str) -> Option<&mut PipelineStage> {
        self.stages.iter_mut().find(|s| s.id == stage_id)
    }

    /// Number of stages currently `InProgress`.
    #[must_use]
    pub fn in_progress_count(&self) -> usize {
        self.stages
            .iter()
            .filter(|s| s.status == StageStatus::InProgress)
            .count()
    }

    /// Applies a requirement analysis.
    ///
    /// Only legal while the run is idle; the analysis customizes the plan
    /// before the first `start`, and may be revised until then.
    pub fn apply_analysis(&mut self, analysis: RequirementAnalysis) -> Result<(), PlanforgeError> {
        if self.phase != RunPhase::Idle {
            return Err(PlanforgeError::InvalidTransition {
                phase: self.phase,
                command: "apply_analysis",
            });
        }
        self.analysis = Some(analysis);
        Ok(())
    }

    /// Transitions the run into `Running` from `Idle`.
    pub fn begin(&mut self) -> Result<(), PlanforgeError> {
        if self.phase != RunPhase::Idle {
            return Err(PlanforgeError::InvalidTransition {
                phase: self.phase,
                command: "start",
            });
        }
        if self.idea.description.trim().is_empty() {
            return Err(PlanforgeError::MissingInput(
                "idea description is empty".to_string(),
            ));
        }
        if self.analysis.is_none() {
            return Err(PlanforgeError::MissingInput(
                "no requirement analysis has been applied".to_string(),
            ));
        }
        self.phase = RunPhase::Running;
        self.current_stage_index = Some(0);
        self.started_at = Some(now_utc());
        Ok(())
    }

    /// Marks the run paused. Takes effect at the next stage boundary.
    pub fn mark_paused(&mut self) -> Result<(), PlanforgeError> {
        if self.phase != RunPhase::Running {
            return Err(PlanforgeError::InvalidTransition {
                phase: self.phase,
                command: "pause",
            });
        }
        self.phase = RunPhase::Paused;
        Ok(())
    }

    /// Resumes a paused run from the stored stage index.
    pub fn mark_resumed(&mut self) -> Result<(), PlanforgeError> {
        if self.phase != RunPhase::Paused {
            return Err(PlanforgeError::InvalidTransition {
                phase: self.phase,
                command: "resume",
            });
        }
        self.phase = RunPhase::Running;
        Ok(())
    }

    /// Stops the run; the stage index is cleared and no further progress
    /// occurs.
    pub fn mark_stopped(&mut self) -> Result<(), PlanforgeError> {
        match self.phase {
            RunPhase::Running | RunPhase::Paused => {
                self.phase = RunPhase::Stopped;
                self.current_stage_index = None;
                Ok(())
            }
            phase => Err(PlanforgeError::InvalidTransition {
                phase,
                command: "stop",
            }),
        }
    }

    /// Appends an entry to the error log and returns its id.
    pub fn record_error(&mut self, stage_id: impl Into<String>, message: impl Into<String>) -> Uuid {
        let id = generate_uuid();
        self.errors.push(RunError {
            id,
            stage_id: stage_id.into(),
            message: message.into(),
            timestamp: now_utc(),
            resolved: false,
        });
        id
    }

    /// Marks an error-log entry resolved. Entries are never removed.
    pub fn resolve_error(&mut self, error_id: Uuid) -> Result<(), PlanforgeError> {
        let entry = self
            .errors
            .iter_mut()
            .find(|e| e.id == error_id)
            .ok_or_else(|| {
                PlanforgeError::InvalidInput(format!("unknown error id: {error_id}"))
            })?;
        entry.resolved = true;
        Ok(())
    }

    /// Number of unresolved error-log entries.
    #[must_use]
    pub fn unresolved_error_count(&self) -> usize {
        self.errors.iter().filter(|e| !e.resolved).count()
    }

    /// Selects a version for a stage. Last write wins; no history is kept.
    pub fn select_version(
        &mut self,
        stage_id: &str,
        version_id: Uuid,
    ) -> Result<(), PlanforgeError> {
        let stage = self
            .stage(stage_id)
            .ok_or_else(|| PlanforgeError::UnknownStage(stage_id.to_string()))?;
        if stage.version(version_id).is_none() {
            return Err(PlanforgeError::UnknownVersion {
                stage_id: stage_id.to_string(),
                version_id,
            });
        }
        self.selected_versions
            .insert(stage_id.to_string(), version_id);
        Ok(())
    }

    /// Attaches feedback to a version anywhere in the run.
    ///
    /// Does not change the version's lifecycle status.
    pub fn submit_feedback(
        &mut self,
        version_id: Uuid,
        feedback: VersionFeedback,
    ) -> Result<(), PlanforgeError> {
        if !(1..=5).contains(&feedback.rating) {
            return Err(PlanforgeError::InvalidInput(format!(
                "feedback rating must be in 1..=5, got {}",
                feedback.rating
            )));
        }
        let version = self
            .stages
            .iter_mut()
            .flat_map(|s| s.versions.iter_mut())
            .find(|v| v.id == version_id)
            .ok_or_else(|| PlanforgeError::InvalidInput(format!(
                "unknown version id: {version_id}"
            )))?;
        version.feedback = Some(feedback);
        Ok(())
    }

    /// The selected version of a stage, if both exist.
    #[must_use]
    pub fn selected_version(&self, stage_id: &str) -> Option<&ContentVersion> {
        let version_id = self.selected_versions.get(stage_id)?;
        self.stage(stage_id)?.version(*version_id)
    }

    /// Total cost across every generated version of every stage.
    #[must_use]
    pub fn total_generation_cost(&self) -> f64 {
        self.stages
            .iter()
            .flat_map(|s| s.versions.iter())
            .map(|v| v.metrics.cost)
            .sum()
    }
}

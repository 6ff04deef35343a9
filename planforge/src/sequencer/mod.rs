//! The execution sequencer: owns the run state and drives stages in
//! registry order.
//!
//! Commands (`start`, `pause`, `resume`, `stop`, `retry_stage`) validate
//! against the current phase and mutate synchronously; [`Sequencer::run`]
//! and [`Sequencer::advance`] do the async driving. The state lock is a
//! `parking_lot::Mutex` and is never held across an await.

pub mod control;
mod runner;


pub use control::StopToken;

use crate::assembly::Assembler;
use crate::config::PipelineConfig;
use crate::core::{FinalArtifact, IdeaBrief, PipelineRun, RunPhase, StageStatus};
use crate::errors::PlanforgeError;
use crate::events::{EventSink, NoOpEventSink};
use crate::providers::GenerationProvider;
use crate::registry::StageCatalog;
use crate::requirements::RequirementAnalysis;
use crate::versions::VersionManager;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// What a driving call observed when it returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run has not been started.
    Idle,
    /// One stage completed; more remain.
    Advanced,
    /// Every stage completed.
    Completed,
    /// A pause request was observed at a stage boundary.
    Paused,
    /// A stop request was observed.
    Stopped,
    /// The current stage moved to `Error`; the run is waiting on a retry.
    StageFailed,
}

/// Outcome of executing a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StageOutcome {
    Completed,
    Failed,
    Stopped,
}

/// Drives a [`PipelineRun`] through its stages.
pub struct Sequencer {
    state: Arc<Mutex<PipelineRun>>,
    control: Arc<StopToken>,
    provider: Arc<dyn GenerationProvider>,
    sink: Arc<dyn EventSink>,
    config: PipelineConfig,
}

impl Sequencer {
    /// Creates a sequencer for an idea over the standard stage registry.
    #[must_use]
    pub fn new(idea: IdeaBrief, provider: Arc<dyn GenerationProvider>) -> Self {
        Self::with_catalog(idea, &StageCatalog::standard(), provider)
    }

    /// Creates a sequencer over an explicit stage catalogue.
    #[must_use]
    pub fn with_catalog(
        idea: IdeaBrief,
        catalog: &StageCatalog,
        provider: Arc<dyn GenerationProvider>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(PipelineRun::new(idea, catalog))),
            control: Arc::new(StopToken::new()),
            provider,
            sink: Arc::new(NoOpEventSink),
            config: PipelineConfig::default(),
        }
    }

    /// Restores a sequencer from a previously captured run.
    #[must_use]
    pub fn from_run(run: PipelineRun, provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            state: Arc::new(Mutex::new(run)),
            control: Arc::new(StopToken::new()),
            provider,
            sink: Arc::new(NoOpEventSink),
            config: PipelineConfig::default(),
        }
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Applies a requirement analysis. Only legal while the run is idle.
    pub fn apply_analysis(&self, analysis: RequirementAnalysis) -> Result<(), PlanforgeError> {
        self.state.lock().apply_analysis(analysis)
    }

    /// Starts the run.
    ///
    /// Requires `Idle`, a non-empty idea description, and an applied
    /// analysis. Positions the sequencer at the first stage; call
    /// [`Sequencer::run`] or [`Sequencer::advance`] to make progress.
    pub fn start(&self) -> Result<(), PlanforgeError> {
        let stage_count = {
            let mut run = self.state.lock();
            run.begin()?;
            run.stages.len()
        };
        self.control.reset();
        self.sink.try_emit(
            "run.started",
            Some(serde_json::json!({ "stages": stage_count })),
        );
        Ok(())
    }

    /// Requests a pause. Observed at the next stage boundary; the stage in
    /// flight finishes first.
    pub fn pause(&self) -> Result<(), PlanforgeError> {
        self.state.lock().mark_paused()?;
        self.sink.try_emit("run.paused", None);
        Ok(())
    }

    /// Resumes a paused run from the stored stage index.
    pub fn resume(&self) -> Result<(), PlanforgeError> {
        self.state.lock().mark_resumed()?;
        self.sink.try_emit("run.resumed", None);
        Ok(())
    }

    /// Stops the run. Terminal; partial stage progress is left as is.
    pub fn stop(&self) -> Result<(), PlanforgeError> {
        self.state.lock().mark_stopped()?;
        self.control.request("stop requested");
        self.sink.try_emit("run.stopped", None);
        Ok(())
    }

    /// Resets a failed stage and re-executes it.
    ///
    /// Requires the run to be `Running` or `Paused` and the stage's status
    /// to be `Error`. Only the named stage is reset; its versions, insights
    /// and the run error log are retained. While paused, the stage is reset
    /// and queued but executes on resume.
    pub async fn retry_stage(&self, stage_id: &str) -> Result<RunOutcome, PlanforgeError> {
        {
            let mut run = self.state.lock();
            match run.phase {
                RunPhase::Running | RunPhase::Paused => {}
                phase => {
                    return Err(PlanforgeError::InvalidTransition {
                        phase,
                        command: "retry_stage",
                    })
                }
            }
            let index = run
                .stages
                .iter()
                .position(|s| s.id == stage_id)
                .ok_or_else(|| PlanforgeError::UnknownStage(stage_id.to_string()))?;
            let status = run.stages[index].status;
            if status != StageStatus::Error {
                return Err(PlanforgeError::StageNotRetryable {
                    stage_id: stage_id.to_string(),
                    status,
                });
            }
            run.stages[index].reset_for_retry();
            run.current_stage_index = Some(index);
        }
        self.sink.try_emit(
            "stage.retrying",
            Some(serde_json::json!({ "stage_id": stage_id })),
        );
        self.advance().await
    }

    /// Marks an error-log entry resolved.
    pub fn resolve_error(&self, error_id: Uuid) -> Result<(), PlanforgeError> {
        self.state.lock().resolve_error(error_id)
    }

    /// A version manager sharing this sequencer's state and provider.
    #[must_use]
    pub fn versions(&self) -> VersionManager {
        VersionManager::new(
            Arc::clone(&self.state),
            Arc::clone(&self.provider),
            Arc::clone(&self.sink),
            self.config,
        )
    }

    /// A point-in-time copy of the run state.
    #[must_use]
    pub fn snapshot(&self) -> PipelineRun {
        self.state.lock().clone()
    }

    /// Assembles the final artifact from the run's selected versions and
    /// stores it on the run.
    pub fn assemble(&self) -> Result<FinalArtifact, PlanforgeError> {
        let artifact = {
            let run = self.state.lock();
            Assembler::new().assemble(&run)?
        };
        self.state.lock().final_artifact = Some(artifact.clone());
        self.sink.try_emit(
            "artifact.assembled",
            Some(serde_json::json!({ "sections": artifact.sections.len() })),
        );
        Ok(artifact)
    }

    /// Executes at most one stage and reports what happened.
    pub async fn advance(&self) -> Result<RunOutcome, PlanforgeError> {
        let index = {
            let mut run = self.state.lock();
            match run.phase {
                RunPhase::Idle => return Ok(RunOutcome::Idle),
                RunPhase::Paused => return Ok(RunOutcome::Paused),
                RunPhase::Stopped => return Ok(RunOutcome::Stopped),
                RunPhase::Completed => return Ok(RunOutcome::Completed),
                RunPhase::Running => {}
            }
            if self.control.is_stopped() {
                run.phase = RunPhase::Stopped;
                run.current_stage_index = None;
                return Ok(RunOutcome::Stopped);
            }

            let mut index = match run.current_stage_index {
                Some(index) => index,
                None => return self.complete_locked(&mut run),
            };
            // A retried earlier stage must not re-run its successors.
            while index < run.stages.len()
                && run.stages[index].status == StageStatus::Completed
            {
                index += 1;
            }
            if index >= run.stages.len() {
                return self.complete_locked(&mut run);
            }
            run.current_stage_index = Some(index);
            index
        };

        match self.execute_stage(index).await? {
            StageOutcome::Stopped => Ok(RunOutcome::Stopped),
            StageOutcome::Failed => Ok(RunOutcome::StageFailed),
            StageOutcome::Completed => {
                let mut run = self.state.lock();
                let next = index + 1;
                if next >= run.stages.len() {
                    return self.complete_locked(&mut run);
                }
                run.current_stage_index = Some(next);
                if run.phase == RunPhase::Paused {
                    Ok(RunOutcome::Paused)
                } else {
                    Ok(RunOutcome::Advanced)
                }
            }
        }
    }

    /// Drives the run until it completes, pauses, stops, or a stage fails.
    pub async fn run(&self) -> Result<RunOutcome, PlanforgeError> {
        loop {
            match self.advance().await? {
                RunOutcome::Advanced => {}
                outcome => return Ok(outcome),
            }
        }
    }

    fn complete_locked(&self, run: &mut PipelineRun) -> Result<RunOutcome, PlanforgeError> {
        run.phase = RunPhase::Completed;
        run.current_stage_index = None;
        self.sink.try_emit(
            "run.completed",
            Some(serde_json::json!({ "progress": run.overall_progress() })),
        );
        Ok(RunOutcome::Completed)
    }

    pub(crate) fn state(&self) -> &Arc<Mutex<PipelineRun>> {
        &self.state
    }

    pub(crate) fn control(&self) -> &StopToken {
        &self.control
    }

    pub(crate) fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }
}

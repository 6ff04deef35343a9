//! Per-stage execution.
//!
//! A stage runs as: mark `InProgress`, walk the sub-steps in order with a
//! yield between them, mark `Completed`, then hand off to the version
//! manager for content generation. Stop requests are observed between
//! sub-steps; pause is observed at stage boundaries only, never here.

use super::{Sequencer, StageOutcome};
use crate::core::{RunPhase, StageStatus, SubStepStatus};
use crate::errors::PlanforgeError;
use std::time::Instant;
use tracing::{debug, warn};

impl Sequencer {
    pub(crate) async fn execute_stage(
        &self,
        index: usize,
    ) -> Result<StageOutcome, PlanforgeError> {
        let (stage_id, stage_name, total_steps) = {
            let mut run = self.state().lock();
            let stage = &mut run.stages[index];
            stage.status = StageStatus::InProgress;
            stage.started_at = Some(crate::utils::now_utc());
            (stage.id.clone(), stage.name.clone(), stage.sub_steps.len())
        };
        debug!(stage_id = %stage_id, index, "stage started");
        self.sink()
            .emit(
                "stage.started",
                Some(serde_json::json!({ "stage_id": stage_id, "index": index })),
            )
            .await;

        for step in 0..total_steps {
            if self.control().is_stopped() {
                return Ok(self.observe_stop(index, &stage_id));
            }

            let started = Instant::now();
            {
                let mut run = self.state().lock();
                run.stages[index].sub_steps[step].status = SubStepStatus::InProgress;
            }
            // Intra-stage suspension point.
            tokio::task::yield_now().await;

            let progress = {
                let mut run = self.state().lock();
                let stage = &mut run.stages[index];
                let sub_step = &mut stage.sub_steps[step];
                sub_step.status = SubStepStatus::Completed;
                sub_step.duration_ms = Some(started.elapsed().as_secs_f64() * 1000.0);

                let completed = step + 1;
                stage.progress = (completed as f64 / total_steps as f64) * 100.0;
                if completed == total_steps.div_ceil(2) {
                    let insight =
                        format!("{stage_name}: {completed} of {total_steps} analysis steps done");
                    stage.record_insight(insight);
                }
                stage.progress
            };
            self.sink().try_emit(
                "stage.progress",
                Some(serde_json::json!({ "stage_id": stage_id, "progress": progress })),
            );
        }

        if self.control().is_stopped() {
            return Ok(self.observe_stop(index, &stage_id));
        }

        {
            let mut run = self.state().lock();
            let stage = &mut run.stages[index];
            stage.progress = 100.0;
            stage.status = StageStatus::Completed;
            stage.completed_at = Some(crate::utils::now_utc());
        }
        self.sink()
            .emit(
                "stage.completed",
                Some(serde_json::json!({ "stage_id": stage_id })),
            )
            .await;

        // Content generation happens once the stage itself is complete; a
        // provider failure flips the stage to Error and waits on a retry.
        match self.versions().generate_versions(&stage_id).await {
            Ok(_) => Ok(StageOutcome::Completed),
            Err(PlanforgeError::Provider(provider_error)) => {
                let message = provider_error.to_string();
                warn!(stage_id = %stage_id, error = %message, "stage generation failed");
                {
                    let mut run = self.state().lock();
                    let stage = &mut run.stages[index];
                    stage.status = StageStatus::Error;
                    stage.last_error = Some(message.clone());
                    run.record_error(&stage_id, &message);
                }
                self.sink()
                    .emit(
                        "stage.failed",
                        Some(serde_json::json!({ "stage_id": stage_id, "error": message })),
                    )
                    .await;
                Ok(StageOutcome::Failed)
            }
            Err(other) => Err(other),
        }
    }

    /// A stop observed mid-stage: the run goes terminal. Partial sub-step
    /// progress is kept as a historical record, but the interrupted stage
    /// drops back to `Pending` so a stopped run never claims a stage is
    /// still executing.
    fn observe_stop(&self, index: usize, stage_id: &str) -> StageOutcome {
        let mut run = self.state().lock();
        run.stages[index].status = StageStatus::Pending;
        run.phase = RunPhase::Stopped;
        run.current_stage_index = None;
        debug!(stage_id = %stage_id, "stop observed mid-stage");
        StageOutcome::Stopped
    }
}

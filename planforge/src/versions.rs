//! Version management: candidate generation, selection, feedback, and
//! feedback-driven regeneration.
//!
//! The manager shares the run state with the sequencer. The state lock is
//! never held across a provider call; each await point works from a
//! snapshot taken under the lock.

use crate::config::PipelineConfig;
use crate::core::{ContentVersion, PipelineRun, VersionFeedback};
use crate::errors::PlanforgeError;
use crate::events::EventSink;
use crate::providers::{GenerationProvider, GenerationRequest};
use crate::registry::ProviderTag;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Read-only side-by-side summary of two versions of one stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionComparison {
    /// Stage both versions belong to.
    pub stage_id: String,
    /// First version's number.
    pub first_number: u32,
    /// Second version's number.
    pub second_number: u32,
    /// `second.quality_score - first.quality_score`.
    pub quality_delta: f64,
    /// `second.metrics.cost - first.metrics.cost`.
    pub cost_delta: f64,
    /// Word counts of the concise renderings, first then second.
    pub word_counts: (u32, u32),
}

/// Generates and curates content versions for stages.
pub struct VersionManager {
    state: Arc<Mutex<PipelineRun>>,
    provider: Arc<dyn GenerationProvider>,
    sink: Arc<dyn EventSink>,
    config: PipelineConfig,
}

impl VersionManager {
    /// Creates a manager over shared run state.
    #[must_use]
    pub fn new(
        state: Arc<Mutex<PipelineRun>>,
        provider: Arc<dyn GenerationProvider>,
        sink: Arc<dyn EventSink>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            state,
            provider,
            sink,
            config,
        }
    }

    /// Generates the configured number of initial versions for a stage.
    ///
    /// Providers are called sequentially; version numbers increase strictly
    /// from 1. Versions the stage already holds count toward the target, so
    /// a stage retried after a partial generation failure is only topped up,
    /// never pushed over the cap. If the stage has no selected version
    /// afterwards, its first version is auto-selected. Returns the new
    /// version ids.
    pub async fn generate_versions(
        &self,
        stage_id: &str,
    ) -> Result<Vec<Uuid>, PlanforgeError> {
        let needed = {
            let run = self.state.lock();
            let stage = run
                .stage(stage_id)
                .ok_or_else(|| PlanforgeError::UnknownStage(stage_id.to_string()))?;
            self.config
                .initial_version_count()
                .saturating_sub(stage.versions.len())
        };
        let mut created = Vec::with_capacity(needed);
        for _ in 0..needed {
            let id = self.generate_one(stage_id, None).await?;
            created.push(id);
        }

        let mut run = self.state.lock();
        if !run.selected_versions.contains_key(stage_id) {
            let first = run
                .stage(stage_id)
                .and_then(|stage| stage.versions.first())
                .map(|version| version.id);
            if let Some(first) = first {
                run.select_version(stage_id, first)?;
            }
        }
        Ok(created)
    }

    /// Selects a version for a stage. Last write wins.
    pub fn select_version(
        &self,
        stage_id: &str,
        version_id: Uuid,
    ) -> Result<(), PlanforgeError> {
        self.state.lock().select_version(stage_id, version_id)?;
        self.sink.try_emit(
            "version.selected",
            Some(serde_json::json!({
                "stage_id": stage_id,
                "version_id": version_id,
            })),
        );
        Ok(())
    }

    /// Attaches feedback to a version. Rating must be 1 to 5.
    ///
    /// Never changes the version's lifecycle status.
    pub fn submit_feedback(
        &self,
        version_id: Uuid,
        feedback: VersionFeedback,
    ) -> Result<(), PlanforgeError> {
        self.state.lock().submit_feedback(version_id, feedback)
    }

    /// Generates one more version of a stage, steered by prior feedback.
    ///
    /// Requires that some existing version of the stage carries a feedback
    /// comment, and that the stage is below its version cap. The cap fails
    /// the call; it never evicts an existing version.
    pub async fn regenerate(
        &self,
        stage_id: &str,
        feedback_context: impl Into<String>,
    ) -> Result<Uuid, PlanforgeError> {
        {
            let run = self.state.lock();
            let stage = run
                .stage(stage_id)
                .ok_or_else(|| PlanforgeError::UnknownStage(stage_id.to_string()))?;
            if !stage.versions.iter().any(ContentVersion::has_feedback_comment) {
                return Err(PlanforgeError::MissingFeedback {
                    stage_id: stage_id.to_string(),
                });
            }
            if stage.versions.len() >= self.config.max_versions_per_stage {
                return Err(PlanforgeError::VersionLimitExceeded {
                    stage_id: stage_id.to_string(),
                    limit: self.config.max_versions_per_stage,
                });
            }
        }
        self.generate_one(stage_id, Some(feedback_context.into()))
            .await
    }

    /// Read-only comparison of two versions of the same stage.
    pub fn compare(
        &self,
        stage_id: &str,
        first_id: Uuid,
        second_id: Uuid,
    ) -> Result<VersionComparison, PlanforgeError> {
        let run = self.state.lock();
        let stage = run
            .stage(stage_id)
            .ok_or_else(|| PlanforgeError::UnknownStage(stage_id.to_string()))?;
        let unknown = |version_id| PlanforgeError::UnknownVersion {
            stage_id: stage_id.to_string(),
            version_id,
        };
        let first = stage.version(first_id).ok_or_else(|| unknown(first_id))?;
        let second = stage.version(second_id).ok_or_else(|| unknown(second_id))?;

        Ok(VersionComparison {
            stage_id: stage_id.to_string(),
            first_number: first.number,
            second_number: second.number,
            quality_delta: second.quality_score - first.quality_score,
            cost_delta: second.metrics.cost - first.metrics.cost,
            word_counts: (first.content.concise.word_count, second.content.concise.word_count),
        })
    }

    /// One provider round trip: snapshot the request under the lock, call
    /// the provider unlocked, append the version under the lock.
    async fn generate_one(
        &self,
        stage_id: &str,
        feedback_context: Option<String>,
    ) -> Result<Uuid, PlanforgeError> {
        let (request, number) = {
            let run = self.state.lock();
            let stage = run
                .stage(stage_id)
                .ok_or_else(|| PlanforgeError::UnknownStage(stage_id.to_string()))?;
            if stage.versions.len() >= self.config.max_versions_per_stage {
                return Err(PlanforgeError::VersionLimitExceeded {
                    stage_id: stage_id.to_string(),
                    limit: self.config.max_versions_per_stage,
                });
            }
            (
                build_request(&run, stage_id, stage.provider, feedback_context),
                stage.next_version_number(),
            )
        };

        let output = self.provider.generate(&request).await?;

        let version = ContentVersion::new(
            stage_id,
            number,
            request.provider,
            output.content,
            output.quality_score,
            output.metrics,
        );
        let version_id = version.id;
        {
            let mut run = self.state.lock();
            let stage = run
                .stage_mut(stage_id)
                .ok_or_else(|| PlanforgeError::UnknownStage(stage_id.to_string()))?;
            stage.versions.push(version);
        }
        self.sink.try_emit(
            "version.created",
            Some(serde_json::json!({
                "stage_id": stage_id,
                "version_id": version_id,
                "number": number,
            })),
        );
        Ok(version_id)
    }
}

/// Builds a provider request from the run's applied strategy.
fn build_request(
    run: &PipelineRun,
    stage_id: &str,
    provider: ProviderTag,
    feedback_context: Option<String>,
) -> GenerationRequest {
    let strategy = run.analysis.as_ref().map(|a| &a.strategy);
    GenerationRequest {
        stage_id: stage_id.to_string(),
        provider,
        instructions: strategy
            .map(|s| s.instructions_for(stage_id))
            .unwrap_or_default(),
        focus_areas: strategy.map(|s| s.focus_for(stage_id)).unwrap_or_default(),
        audience_emphasis: strategy.and_then(|s| s.audience_emphasis.clone()),
        weight_multiplier: strategy.map_or(1.0, |s| s.weight_for(stage_id)),
        feedback_context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{IdeaBrief, PipelineRun};
    use crate::events::NoOpEventSink;
    use crate::registry::StageCatalog;
    use crate::testing::fixtures;
    use crate::testing::mocks::MockProvider;

    fn manager_with(config: PipelineConfig) -> (VersionManager, Arc<Mutex<PipelineRun>>) {
        let mut run = PipelineRun::new(
            IdeaBrief::new("Pet telemedicine", "Video vet consults"),
            &StageCatalog::standard(),
        );
        run.analysis = Some(fixtures::sample_analysis());
        let state = Arc::new(Mutex::new(run));
        let manager = VersionManager::new(
            Arc::clone(&state),
            Arc::new(MockProvider::new()),
            Arc::new(NoOpEventSink),
            config,
        );
        (manager, state)
    }

    #[tokio::test]
    async fn test_generate_auto_selects_first_version() {
        let (manager, state) = manager_with(PipelineConfig::default());
        let created = manager.generate_versions("concept_analysis").await.unwrap();
        assert_eq!(created.len(), 1);

        let run = state.lock();
        let stage = run.stage("concept_analysis").unwrap();
        assert_eq!(stage.versions.len(), 1);
        assert_eq!(stage.versions[0].number, 1);
        assert_eq!(
            run.selected_versions.get("concept_analysis"),
            Some(&created[0])
        );
    }

    #[tokio::test]
    async fn test_generate_respects_configured_count() {
        let config = PipelineConfig {
            versions_per_stage: 2,
            max_versions_per_stage: 3,
        };
        let (manager, state) = manager_with(config);
        let created = manager.generate_versions("market_research").await.unwrap();
        assert_eq!(created.len(), 2);

        let run = state.lock();
        let numbers: Vec<u32> = run
            .stage("market_research")
            .unwrap()
            .versions
            .iter()
            .map(|v| v.number)
            .collect();
        assert_eq!(numbers, vec![1, 2]);
        // Auto-selection picked the first, not the latest.
        assert_eq!(
            run.selected_versions.get("market_research"),
            Some(&created[0])
        );
    }

    #[tokio::test]
    async fn test_generate_tops_up_a_partially_generated_stage() {
        let config = PipelineConfig {
            versions_per_stage: 2,
            max_versions_per_stage: 2,
        };
        let (manager, state) = manager_with(config);
        let retained = fixtures::sample_version("concept_analysis", 1);
        let retained_id = retained.id;
        state
            .lock()
            .stage_mut("concept_analysis")
            .unwrap()
            .versions
            .push(retained);

        let created = manager.generate_versions("concept_analysis").await.unwrap();
        assert_eq!(created.len(), 1);

        let run = state.lock();
        let stage = run.stage("concept_analysis").unwrap();
        let numbers: Vec<u32> = stage.versions.iter().map(|v| v.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        // Auto-selection covers the retained version, not just new ones.
        assert_eq!(
            run.selected_versions.get("concept_analysis"),
            Some(&retained_id)
        );
    }

    #[tokio::test]
    async fn test_generate_at_target_only_selects() {
        let config = PipelineConfig {
            versions_per_stage: 1,
            max_versions_per_stage: 3,
        };
        let (manager, state) = manager_with(config);
        let retained = fixtures::sample_version("concept_analysis", 1);
        let retained_id = retained.id;
        state
            .lock()
            .stage_mut("concept_analysis")
            .unwrap()
            .versions
            .push(retained);

        let created = manager.generate_versions("concept_analysis").await.unwrap();
        assert!(created.is_empty());

        let run = state.lock();
        assert_eq!(run.stage("concept_analysis").unwrap().versions.len(), 1);
        assert_eq!(
            run.selected_versions.get("concept_analysis"),
            Some(&retained_id)
        );
    }

    #[tokio::test]
    async fn test_regenerate_requires_feedback() {
        let (manager, _state) = manager_with(PipelineConfig::default());
        manager.generate_versions("concept_analysis").await.unwrap();

        let err = manager
            .regenerate("concept_analysis", "tighter summary")
            .await
            .unwrap_err();
        assert!(matches!(err, PlanforgeError::MissingFeedback { .. }));
    }

    #[tokio::test]
    async fn test_regenerate_appends_one_version() {
        let (manager, state) = manager_with(PipelineConfig::default());
        let created = manager.generate_versions("concept_analysis").await.unwrap();
        manager
            .submit_feedback(created[0], VersionFeedback::new(2, "too generic"))
            .unwrap();

        let new_id = manager
            .regenerate("concept_analysis", "be specific about the wedge market")
            .await
            .unwrap();

        let run = state.lock();
        let stage = run.stage("concept_analysis").unwrap();
        assert_eq!(stage.versions.len(), 2);
        assert_eq!(stage.version(new_id).unwrap().number, 2);
        // Selection is untouched by regeneration.
        assert_eq!(
            run.selected_versions.get("concept_analysis"),
            Some(&created[0])
        );
    }

    #[tokio::test]
    async fn test_cap_fails_and_never_evicts() {
        let config = PipelineConfig {
            versions_per_stage: 3,
            max_versions_per_stage: 3,
        };
        let (manager, state) = manager_with(config);
        let created = manager.generate_versions("concept_analysis").await.unwrap();
        assert_eq!(created.len(), 3);
        manager
            .submit_feedback(created[0], VersionFeedback::new(3, "needs depth"))
            .unwrap();

        let err = manager
            .regenerate("concept_analysis", "add depth")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PlanforgeError::VersionLimitExceeded { limit: 3, .. }
        ));

        let run = state.lock();
        let stage = run.stage("concept_analysis").unwrap();
        assert_eq!(stage.versions.len(), 3);
        let numbers: Vec<u32> = stage.versions.iter().map(|v| v.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_select_rejects_foreign_version() {
        let (manager, _state) = manager_with(PipelineConfig::default());
        let created = manager.generate_versions("concept_analysis").await.unwrap();

        let err = manager
            .select_version("market_research", created[0])
            .unwrap_err();
        assert!(matches!(err, PlanforgeError::UnknownVersion { .. }));
    }

    #[tokio::test]
    async fn test_compare_is_read_only() {
        let config = PipelineConfig {
            versions_per_stage: 2,
            max_versions_per_stage: 3,
        };
        let (manager, state) = manager_with(config);
        let created = manager.generate_versions("financial_model").await.unwrap();

        let comparison = manager
            .compare("financial_model", created[0], created[1])
            .unwrap();
        assert_eq!(comparison.first_number, 1);
        assert_eq!(comparison.second_number, 2);

        let run = state.lock();
        assert_eq!(run.stage("financial_model").unwrap().versions.len(), 2);
    }
}

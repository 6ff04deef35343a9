//! Pipeline configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a pipeline run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// How many candidate versions to generate when a stage completes.
    ///
    /// Clamped to `max_versions_per_stage` at generation time.
    pub versions_per_stage: usize,

    /// Hard cap on stored versions per stage. Regeneration beyond the cap
    /// fails rather than evicting an existing version.
    pub max_versions_per_stage: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            versions_per_stage: 1,
            max_versions_per_stage: 3,
        }
    }
}

impl PipelineConfig {
    /// Returns the number of versions to generate up front, bounded by the cap.
    #[must_use]
    pub fn initial_version_count(&self) -> usize {
        self.versions_per_stage.min(self.max_versions_per_stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.versions_per_stage, 1);
        assert_eq!(config.max_versions_per_stage, 3);
    }

    #[test]
    fn test_initial_count_bounded_by_cap() {
        let config = PipelineConfig {
            versions_per_stage: 5,
            max_versions_per_stage: 3,
        };
        assert_eq!(config.initial_version_count(), 3);
    }
}

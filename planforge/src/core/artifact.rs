//! The assembled final artifact.

use super::version::VersionContent;
use crate::registry::ProviderTag;
use crate::utils::{now_utc, Timestamp};
use serde::{Deserialize, Serialize};

/// One stage's contribution to the final artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSection {
    /// The contributing stage.
    pub stage_id: String,
    /// The stage's human-readable label.
    pub stage_name: String,
    /// The selected version's content.
    pub content: VersionContent,
}

/// Aggregate metadata for an assembled artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Total monetary cost across every generated version of every stage,
    /// selected or not.
    pub total_cost: f64,
    /// Wall-clock time since the run started, in milliseconds.
    pub total_elapsed_ms: f64,
    /// Distinct providers used, in first-use order.
    pub providers: Vec<ProviderTag>,
    /// When the artifact was assembled.
    pub created_at: Timestamp,
}

/// The assembled collection of all stages' selected content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalArtifact {
    /// Title of the overall artifact.
    pub title: String,
    /// Sections in registry order, one per stage.
    pub sections: Vec<ArtifactSection>,
    /// Aggregate run metadata.
    pub metadata: ArtifactMetadata,
}

impl FinalArtifact {
    /// Creates an artifact from assembled sections and metadata fields.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        sections: Vec<ArtifactSection>,
        total_cost: f64,
        total_elapsed_ms: f64,
        providers: Vec<ProviderTag>,
    ) -> Self {
        Self {
            title: title.into(),
            sections,
            metadata: ArtifactMetadata {
                total_cost,
                total_elapsed_ms,
                providers,
                created_at: now_utc(),
            },
        }
    }

    /// Looks up a section by stage id.
    #[must_use]
    pub fn section(&self, stage_id: &str) -> Option<&ArtifactSection> {
        self.sections.iter().find(|s| s.stage_id == stage_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_section_lookup() {
        let artifact = FinalArtifact::new(
            "Plan",
            vec![ArtifactSection {
                stage_id: "concept_analysis".to_string(),
                stage_name: "Concept analysis".to_string(),
                content: crate::testing::fixtures::sample_content("Concept"),
            }],
            1.25,
            60_000.0,
            vec![ProviderTag::DeepSeek],
        );

        assert!(artifact.section("concept_analysis").is_some());
        assert!(artifact.section("market_research").is_none());
        assert_eq!(artifact.metadata.providers, vec![ProviderTag::DeepSeek]);
    }
}

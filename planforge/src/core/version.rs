//! Content versions: candidate outputs generated for a completed stage.

use super::status::VersionStatus;
use crate::registry::ProviderTag;
use crate::utils::{generate_uuid, now_utc, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The short-form rendering of a stage's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConciseRendering {
    /// Condensed summary paragraph.
    pub summary: String,
    /// The few points a reader must take away.
    pub key_points: Vec<String>,
    /// Concrete next actions.
    pub action_items: Vec<String>,
    /// Actual word count of the rendering.
    pub word_count: u32,
    /// The word count the rendering was asked to target.
    pub target_word_count: u32,
}

/// One titled section of the long-form rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandableSection {
    /// Section heading.
    pub heading: String,
    /// Section body text.
    pub body: String,
}

/// The long-form rendering of a stage's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandableRendering {
    /// Detailed sections.
    pub sections: Vec<ExpandableSection>,
    /// Estimated reading time in minutes.
    pub estimated_read_minutes: u32,
}

/// The structured content payload of a version.
///
/// Provider payload shape is enforced here, at the boundary, rather than
/// assumed downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionContent {
    /// Content title.
    pub title: String,
    /// One-paragraph summary.
    pub summary: String,
    /// Full prose body.
    pub full_text: String,
    /// Key points extracted from the body.
    pub key_points: Vec<String>,
    /// Short-form rendering.
    pub concise: ConciseRendering,
    /// Long-form rendering.
    pub expandable: ExpandableRendering,
}

/// Resource usage reported by the provider for one generation call.
///
/// Recorded opaquely; the orchestrator never recomputes these.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GenerationMetrics {
    /// Tokens consumed from the prompt.
    pub input_tokens: u32,
    /// Tokens produced in the completion.
    pub output_tokens: u32,
    /// End-to-end call latency in milliseconds.
    pub latency_ms: f64,
    /// Monetary cost of the call.
    pub cost: f64,
}

impl GenerationMetrics {
    /// Total tokens for the call.
    #[must_use]
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// User feedback attached to a version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionFeedback {
    /// Rating in `1..=5`.
    pub rating: u8,
    /// Free-text comment.
    pub comment: String,
    /// Requested improvement tags.
    #[serde(default)]
    pub improvements: Vec<String>,
}

impl VersionFeedback {
    /// Creates feedback with a rating and comment.
    #[must_use]
    pub fn new(rating: u8, comment: impl Into<String>) -> Self {
        Self {
            rating,
            comment: comment.into(),
            improvements: Vec::new(),
        }
    }

    /// Adds an improvement tag.
    #[must_use]
    pub fn with_improvement(mut self, tag: impl Into<String>) -> Self {
        self.improvements.push(tag.into());
        self
    }
}

/// One candidate generated output for a stage.
///
/// Immutable once created, except for `status` and `feedback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentVersion {
    /// Unique version id.
    pub id: Uuid,
    /// The stage that owns this version.
    pub stage_id: String,
    /// 1-based version number, strictly increasing per stage.
    pub number: u32,
    /// Creation timestamp.
    pub created_at: Timestamp,
    /// The provider that generated this version.
    pub provider: ProviderTag,
    /// Structured content payload.
    pub content: VersionContent,
    /// Review lifecycle status.
    pub status: VersionStatus,
    /// Opaque quality score in `[0, 100]` reported by the provider.
    pub quality_score: f64,
    /// Resource metrics for the generation call.
    pub metrics: GenerationMetrics,
    /// Feedback, once a user has submitted any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<VersionFeedback>,
}

impl ContentVersion {
    /// Creates a new draft version.
    #[must_use]
    pub fn new(
        stage_id: impl Into<String>,
        number: u32,
        provider: ProviderTag,
        content: VersionContent,
        quality_score: f64,
        metrics: GenerationMetrics,
    ) -> Self {
        Self {
            id: generate_uuid(),
            stage_id: stage_id.into(),
            number,
            created_at: now_utc(),
            provider,
            content,
            status: VersionStatus::Draft,
            quality_score: quality_score.clamp(0.0, 100.0),
            metrics,
            feedback: None,
        }
    }

    /// Whether this version carries a non-empty feedback comment.
    #[must_use]
    pub fn has_feedback_comment(&self) -> bool {
        self.feedback
            .as_ref()
            .is_some_and(|f| !f.comment.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::sample_content;

    #[test]
    fn test_new_version_is_draft() {
        let version = ContentVersion::new(
            "concept_analysis",
            1,
            ProviderTag::DeepSeek,
            sample_content("Concept"),
            82.0,
            GenerationMetrics::default(),
        );
        assert_eq!(version.status, VersionStatus::Draft);
        assert_eq!(version.number, 1);
        assert!(version.feedback.is_none());
        assert!(!version.has_feedback_comment());
    }

    #[test]
    fn test_quality_score_is_clamped() {
        let version = ContentVersion::new(
            "concept_analysis",
            1,
            ProviderTag::DeepSeek,
            sample_content("Concept"),
            140.0,
            GenerationMetrics::default(),
        );
        assert_eq!(version.quality_score, 100.0);
    }

    #[test]
    fn test_feedback_comment_detection() {
        let mut version = ContentVersion::new(
            "concept_analysis",
            1,
            ProviderTag::DeepSeek,
            sample_content("Concept"),
            80.0,
            GenerationMetrics::default(),
        );
        version.feedback = Some(VersionFeedback::new(4, "   "));
        assert!(!version.has_feedback_comment());

        version.feedback = Some(
            VersionFeedback::new(4, "tighten the summary").with_improvement("brevity"),
        );
        assert!(version.has_feedback_comment());
    }

    #[test]
    fn test_metrics_total_tokens() {
        let metrics = GenerationMetrics {
            input_tokens: 100,
            output_tokens: 400,
            latency_ms: 900.0,
            cost: 0.02,
        };
        assert_eq!(metrics.total_tokens(), 500);
    }
}

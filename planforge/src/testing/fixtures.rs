//! Shared test fixtures.

use crate::core::{
    ConciseRendering, ContentVersion, ExpandableRendering, ExpandableSection, GenerationMetrics,
    IdeaBrief, VersionContent,
};
use crate::registry::ProviderTag;
use crate::requirements::{RequirementAnalyzer, RequirementAnalysis, RequirementSelection};

/// A fully populated content payload with the given title.
#[must_use]
pub fn sample_content(title: &str) -> VersionContent {
    VersionContent {
        title: title.to_string(),
        summary: "A short summary.".to_string(),
        full_text: "The full prose body of the section.".to_string(),
        key_points: vec!["First point".to_string(), "Second point".to_string()],
        concise: ConciseRendering {
            summary: "Condensed.".to_string(),
            key_points: vec!["First point".to_string()],
            action_items: vec!["Validate with ten customers".to_string()],
            word_count: 120,
            target_word_count: 150,
        },
        expandable: ExpandableRendering {
            sections: vec![ExpandableSection {
                heading: "Detail".to_string(),
                body: "More detail.".to_string(),
            }],
            estimated_read_minutes: 4,
        },
    }
}

/// A draft version for a stage with plausible metrics.
#[must_use]
pub fn sample_version(stage_id: &str, number: u32) -> ContentVersion {
    ContentVersion::new(
        stage_id,
        number,
        ProviderTag::DeepSeek,
        sample_content(&format!("{stage_id} v{number}")),
        82.0,
        GenerationMetrics {
            input_tokens: 1000,
            output_tokens: 700,
            latency_ms: 35.0,
            cost: 0.015,
        },
    )
}

/// An idea with enough detail to start a run.
#[must_use]
pub fn sample_idea() -> IdeaBrief {
    IdeaBrief::new(
        "Campus delivery robots",
        "Autonomous sidewalk robots delivering food across university campuses",
    )
    .with_category("logistics")
}

/// A selection touching multiple categories.
#[must_use]
pub fn sample_selection() -> RequirementSelection {
    let mut selection = RequirementSelection::new();
    selection.select("business_focus", "market_opportunity");
    selection.select("business_focus", "technology_innovation");
    selection.select("target_audience", "investors_vc");
    selection.select("timeline_priority", "medium_term");
    selection
}

/// A ready-to-apply analysis for [`sample_idea`] and [`sample_selection`].
///
/// Blocks on the analyzer internally so non-async tests can use it.
#[must_use]
pub fn sample_analysis() -> RequirementAnalysis {
    let analyzer = RequirementAnalyzer::standard();
    futures::executor::block_on(analyzer.analyze(&sample_idea(), &sample_selection()))
        .unwrap_or_else(|_| unreachable!("fixture inputs are valid"))
}

//! The standard eight-stage generation catalogue.

use super::ProviderTag;
use serde::{Deserialize, Serialize};

/// The static definition of one pipeline stage.
///
/// Specs are the immutable blueprint; runtime state lives on
/// [`crate::core::PipelineStage`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSpec {
    /// Stable, unique stage identifier.
    pub id: String,
    /// Human-readable stage label.
    pub name: String,
    /// Short description of what the stage produces.
    pub description: String,
    /// The provider assigned to this stage.
    pub provider: ProviderTag,
    /// Ordered names of the stage's sub-steps.
    pub sub_steps: Vec<String>,
    /// Labels of the deliverables this stage contributes.
    pub deliverables: Vec<String>,
    /// Base page budget used by the requirements analyzer's outline.
    pub base_pages: u32,
}

impl StageSpec {
    fn new(
        id: &str,
        name: &str,
        description: &str,
        provider: ProviderTag,
        sub_steps: &[&str],
        deliverables: &[&str],
        base_pages: u32,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            provider,
            sub_steps: sub_steps.iter().map(ToString::to_string).collect(),
            deliverables: deliverables.iter().map(ToString::to_string).collect(),
            base_pages,
        }
    }
}

/// An ordered, immutable catalogue of stage specs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageCatalog {
    specs: Vec<StageSpec>,
}

impl StageCatalog {
    /// Builds a catalogue from an explicit list of specs.
    #[must_use]
    pub fn new(specs: Vec<StageSpec>) -> Self {
        Self { specs }
    }

    /// The standard eight-stage business plan catalogue.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            StageSpec::new(
                "concept_analysis",
                "Concept analysis",
                "Analyzes the core value of the idea and frames the problem it solves",
                ProviderTag::DeepSeek,
                &[
                    "Parse the idea summary",
                    "Extract core concepts",
                    "Frame the problem statement",
                    "Summarize the value proposition",
                ],
                &["Concept report", "Keyword tags", "Problem statement"],
                6,
            ),
            StageSpec::new(
                "market_research",
                "Market research",
                "Sizes the target market and maps the competitive landscape",
                ProviderTag::Zhipu,
                &[
                    "Estimate market size",
                    "Scan competitors",
                    "Profile target users",
                    "Identify market opportunities",
                ],
                &["Market size report", "Competitor analysis", "User personas"],
                10,
            ),
            StageSpec::new(
                "tech_architecture",
                "Technical architecture",
                "Designs a scalable technical implementation approach",
                ProviderTag::Qwen,
                &[
                    "Select the technology stack",
                    "Sketch the system architecture",
                    "Design the API surface",
                    "Assess implementation feasibility",
                ],
                &["Architecture diagram", "API design", "Stack selection"],
                8,
            ),
            StageSpec::new(
                "business_model",
                "Business model",
                "Constructs a sustainable revenue and cost structure",
                ProviderTag::DeepSeek,
                &[
                    "Map the value chain",
                    "Design revenue streams",
                    "Outline the cost structure",
                    "Stress-test the model",
                ],
                &["Business model canvas", "Revenue stream design", "Cost structure"],
                8,
            ),
            StageSpec::new(
                "financial_model",
                "Financial model",
                "Builds a detailed financial projection and return analysis",
                ProviderTag::Qwen,
                &[
                    "Establish modeling assumptions",
                    "Project revenue",
                    "Project costs",
                    "Compute returns and valuation",
                ],
                &["Five-year projection", "Return analysis", "Valuation model"],
                10,
            ),
            StageSpec::new(
                "legal_compliance",
                "Legal & compliance",
                "Checks the project against applicable regulation and IP strategy",
                ProviderTag::Zhipu,
                &[
                    "List applicable regulations",
                    "Check licensing requirements",
                    "Review intellectual property",
                    "Assess compliance risk",
                ],
                &["Compliance checklist", "IP strategy", "Risk assessment"],
                5,
            ),
            StageSpec::new(
                "implementation_plan",
                "Implementation plan",
                "Produces an execution roadmap with milestones and team needs",
                ProviderTag::Qwen,
                &[
                    "Define milestones",
                    "Plan team composition",
                    "Sequence workstreams",
                    "Set progress checkpoints",
                ],
                &["Project timeline", "Team requirements", "Milestone plan"],
                6,
            ),
            StageSpec::new(
                "investor_pitch",
                "Investor pitch",
                "Assembles the investor-facing narrative and funding ask",
                ProviderTag::DeepSeek,
                &[
                    "Distill the story",
                    "Assemble investment highlights",
                    "Draft the funding ask",
                    "Polish the deck outline",
                ],
                &["Pitch deck outline", "Investment highlights", "Funding plan"],
                5,
            ),
        ])
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns whether the catalogue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Iterates over the specs in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &StageSpec> {
        self.specs.iter()
    }

    /// Looks up a spec by stage id.
    #[must_use]
    pub fn get(&self, stage_id: &str) -> Option<&StageSpec> {
        self.specs.iter().find(|s| s.id == stage_id)
    }

    /// Returns the registry-order position of a stage id.
    #[must_use]
    pub fn position(&self, stage_id: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.id == stage_id)
    }

    /// Returns whether a stage id exists in the catalogue.
    #[must_use]
    pub fn contains(&self, stage_id: &str) -> bool {
        self.get(stage_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_has_eight_stages() {
        let catalog = StageCatalog::standard();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.position("concept_analysis"), Some(0));
        assert_eq!(catalog.position("investor_pitch"), Some(7));
    }

    #[test]
    fn test_stage_ids_are_unique() {
        let catalog = StageCatalog::standard();
        let mut ids: Vec<&str> = catalog.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_every_stage_has_sub_steps() {
        let catalog = StageCatalog::standard();
        for spec in catalog.iter() {
            assert!(!spec.sub_steps.is_empty(), "{} has no sub-steps", spec.id);
            assert!(!spec.deliverables.is_empty());
            assert!(spec.base_pages > 0);
        }
    }

    #[test]
    fn test_lookup_unknown_stage() {
        let catalog = StageCatalog::standard();
        assert!(catalog.get("nonexistent").is_none());
        assert!(!catalog.contains("nonexistent"));
    }
}

//! Turns a requirement selection into an analysis the pipeline consumes.
//!
//! The analysis is deterministic for identical input and performs no
//! mutation. Validation failures surface before any computation, so a
//! rejected call leaves nothing behind.

use super::catalog::{RequirementCatalog, RequirementOption};
use super::RequirementSelection;
use crate::core::IdeaBrief;
use crate::errors::PlanforgeError;
use crate::registry::StageCatalog;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Emphasis level of one stage in the generated outline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlinePriority {
    /// Cover briefly.
    #[default]
    Low,
    /// Standard depth.
    Medium,
    /// Emphasized; the selection points at this stage.
    High,
}

impl OutlinePriority {
    /// One step up, saturating at `High`.
    #[must_use]
    pub fn raised(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium | Self::High => Self::High,
        }
    }
}

impl fmt::Display for OutlinePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Planned depth and emphasis for one stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutline {
    /// Stage this outline entry describes.
    pub stage_id: String,
    /// Stage display name.
    pub title: String,
    /// Emphasis derived from the selection.
    pub priority: OutlinePriority,
    /// Page budget: the stage's base plus the weight of every touching
    /// option.
    pub estimated_pages: u32,
    /// Labels of the options that pointed at this stage.
    pub focus_points: Vec<String>,
}

/// How generation should be steered, per stage and overall.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationStrategy {
    /// Depth multiplier per stage id; absent means 1.0.
    pub stage_weights: HashMap<String, f64>,
    /// Focus areas per stage id.
    pub focus_areas: HashMap<String, Vec<String>>,
    /// Instruction fragments per stage id, built from option prompt hints.
    pub instructions: HashMap<String, Vec<String>>,
    /// Instructions that apply to every stage, from custom answers and the
    /// additional context.
    pub general_instructions: Vec<String>,
    /// Emphasis derived from the selected target audience, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience_emphasis: Option<String>,
}

impl GenerationStrategy {
    /// Depth multiplier for a stage.
    #[must_use]
    pub fn weight_for(&self, stage_id: &str) -> f64 {
        self.stage_weights.get(stage_id).copied().unwrap_or(1.0)
    }

    /// Instruction fragments for a stage.
    #[must_use]
    pub fn instructions_for(&self, stage_id: &str) -> Vec<String> {
        let mut out = self.instructions.get(stage_id).cloned().unwrap_or_default();
        out.extend(self.general_instructions.iter().cloned());
        out
    }

    /// Focus areas for a stage.
    #[must_use]
    pub fn focus_for(&self, stage_id: &str) -> Vec<String> {
        self.focus_areas.get(stage_id).cloned().unwrap_or_default()
    }
}

/// Kind of an analyzer suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    /// The selection enables something extra.
    Enhancement,
    /// The selection should probably change.
    Adjustment,
    /// The selection carries a risk worth flagging.
    Warning,
}

/// One advisory note produced by the analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// What kind of note this is.
    pub kind: SuggestionKind,
    /// Human-readable note.
    pub message: String,
    /// How strongly to surface it.
    pub priority: OutlinePriority,
}

/// The analyzer's full output, applied to a run before it starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementAnalysis {
    /// How well the selection covers the questionnaire, 0 to 0.95.
    pub match_score: f64,
    /// Per-stage outline in registry order.
    pub outline: Vec<StageOutline>,
    /// Generation steering.
    pub strategy: GenerationStrategy,
    /// Advisory notes.
    pub suggestions: Vec<Suggestion>,
    /// Rough wall-clock estimate for the whole run, in minutes.
    pub estimated_minutes: u32,
}

impl RequirementAnalysis {
    /// The outline entry for a stage.
    #[must_use]
    pub fn outline_for(&self, stage_id: &str) -> Option<&StageOutline> {
        self.outline.iter().find(|o| o.stage_id == stage_id)
    }
}

/// Analyzes a requirement selection against the questionnaire and the stage
/// registry.
#[derive(Debug, Clone)]
pub struct RequirementAnalyzer {
    requirements: RequirementCatalog,
    stages: StageCatalog,
}

impl RequirementAnalyzer {
    /// Creates an analyzer over explicit catalogues.
    #[must_use]
    pub fn new(requirements: RequirementCatalog, stages: StageCatalog) -> Self {
        Self {
            requirements,
            stages,
        }
    }

    /// Creates an analyzer over the standard catalogues.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(RequirementCatalog::standard(), StageCatalog::standard())
    }

    /// Produces a [`RequirementAnalysis`] for an idea and selection.
    ///
    /// Deterministic for identical input. Rejects invalid input with
    /// [`PlanforgeError::InvalidInput`] before computing anything.
    pub async fn analyze(
        &self,
        idea: &IdeaBrief,
        selection: &RequirementSelection,
    ) -> Result<RequirementAnalysis, PlanforgeError> {
        self.validate(idea, selection)?;

        let chosen = self.chosen_options(selection);
        let custom_count = selection
            .custom
            .values()
            .filter(|text| !text.trim().is_empty())
            .count();

        let raw = 0.5 + 0.05 * chosen.len() as f64 + 0.05 * custom_count as f64;
        let match_score = raw.clamp(0.0, 0.95);

        let outline = self.build_outline(&chosen);
        let strategy = self.build_strategy(selection, &chosen);
        let suggestions = self.build_suggestions(selection, &chosen, match_score);
        let estimated_minutes = 40 + 2 * chosen.len() as u32;

        Ok(RequirementAnalysis {
            match_score,
            outline,
            strategy,
            suggestions,
            estimated_minutes,
        })
    }

    fn validate(
        &self,
        idea: &IdeaBrief,
        selection: &RequirementSelection,
    ) -> Result<(), PlanforgeError> {
        if idea.description.trim().is_empty() {
            return Err(PlanforgeError::InvalidInput(
                "idea description is empty".to_string(),
            ));
        }
        for (category_id, option_ids) in &selection.selected {
            let category = self.requirements.category(category_id).ok_or_else(|| {
                PlanforgeError::InvalidInput(format!(
                    "unknown requirement category: '{category_id}'"
                ))
            })?;
            if !category.multiple && option_ids.len() > 1 {
                return Err(PlanforgeError::InvalidInput(format!(
                    "category '{category_id}' accepts a single option, got {}",
                    option_ids.len()
                )));
            }
            for option_id in option_ids {
                if !category.options.iter().any(|o| &o.id == option_id) {
                    return Err(PlanforgeError::InvalidInput(format!(
                        "unknown option '{option_id}' in category '{category_id}'"
                    )));
                }
            }
        }
        for category_id in selection.custom.keys() {
            let category = self.requirements.category(category_id).ok_or_else(|| {
                PlanforgeError::InvalidInput(format!(
                    "unknown requirement category: '{category_id}'"
                ))
            })?;
            if !category.allow_custom {
                return Err(PlanforgeError::InvalidInput(format!(
                    "category '{category_id}' does not accept a custom answer"
                )));
            }
        }
        Ok(())
    }

    /// Resolves selected option ids to catalogue entries, questionnaire
    /// order.
    fn chosen_options(&self, selection: &RequirementSelection) -> Vec<&RequirementOption> {
        let mut chosen = Vec::new();
        for category in self.requirements.iter() {
            if let Some(option_ids) = selection.selected.get(&category.id) {
                for option in &category.options {
                    if option_ids.contains(&option.id) {
                        chosen.push(option);
                    }
                }
            }
        }
        chosen
    }

    fn build_outline(&self, chosen: &[&RequirementOption]) -> Vec<StageOutline> {
        self.stages
            .iter()
            .map(|spec| {
                let touching: Vec<&&RequirementOption> = chosen
                    .iter()
                    .filter(|o| o.related_stages.iter().any(|s| s == &spec.id))
                    .collect();

                let mut priority = OutlinePriority::default();
                let mut estimated_pages = spec.base_pages;
                let mut focus_points = Vec::new();
                for option in &touching {
                    priority = priority.raised();
                    estimated_pages += u32::from(option.weight);
                    focus_points.push(option.label.clone());
                }

                StageOutline {
                    stage_id: spec.id.clone(),
                    title: spec.name.clone(),
                    priority,
                    estimated_pages,
                    focus_points,
                }
            })
            .collect()
    }

    fn build_strategy(
        &self,
        selection: &RequirementSelection,
        chosen: &[&RequirementOption],
    ) -> GenerationStrategy {
        let mut strategy = GenerationStrategy::default();

        for spec in self.stages.iter() {
            let mut weight_sum = 0u32;
            for option in chosen {
                if option.related_stages.iter().any(|s| s == &spec.id) {
                    weight_sum += u32::from(option.weight);
                    strategy
                        .focus_areas
                        .entry(spec.id.clone())
                        .or_default()
                        .push(option.label.clone());
                    strategy
                        .instructions
                        .entry(spec.id.clone())
                        .or_default()
                        .push(option.prompt_hint.clone());
                }
            }
            if weight_sum > 0 {
                strategy
                    .stage_weights
                    .insert(spec.id.clone(), 1.0 + 0.1 * f64::from(weight_sum));
            }
        }

        for category in self.requirements.iter() {
            if let Some(text) = selection.custom.get(&category.id) {
                let text = text.trim();
                if !text.is_empty() {
                    strategy
                        .general_instructions
                        .push(format!("{}: {}", category.name, text));
                }
            }
        }
        if let Some(context) = &selection.additional_context {
            let context = context.trim();
            if !context.is_empty() {
                strategy.general_instructions.push(context.to_string());
            }
        }

        // Single-select category, so at most one audience option matches.
        if let (Some(audience), Some(ids)) = (
            self.requirements.category("target_audience"),
            selection.selected.get("target_audience"),
        ) {
            strategy.audience_emphasis = audience
                .options
                .iter()
                .find(|o| ids.contains(&o.id))
                .map(|o| o.prompt_hint.clone());
        }

        strategy
    }

    fn build_suggestions(
        &self,
        selection: &RequirementSelection,
        chosen: &[&RequirementOption],
        match_score: f64,
    ) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();
        let selected_ids: Vec<&str> = chosen.iter().map(|o| o.id.as_str()).collect();

        if !selection
            .selected
            .get("business_focus")
            .is_some_and(|ids| !ids.is_empty())
        {
            suggestions.push(Suggestion {
                kind: SuggestionKind::Adjustment,
                message: "No business focus selected; the plan will use a generic emphasis."
                    .to_string(),
                priority: OutlinePriority::Medium,
            });
        }
        if selected_ids.contains(&"regulatory_compliance") {
            suggestions.push(Suggestion {
                kind: SuggestionKind::Warning,
                message: "Regulated industry: budget extra time for the legal and compliance \
                          stage."
                    .to_string(),
                priority: OutlinePriority::High,
            });
        }
        if selected_ids.contains(&"funding_limited") && selected_ids.contains(&"immediate_launch") {
            suggestions.push(Suggestion {
                kind: SuggestionKind::Warning,
                message: "Limited funding combined with an immediate launch is aggressive; \
                          the financial model will flag runway risk."
                    .to_string(),
                priority: OutlinePriority::High,
            });
        }
        if match_score >= 0.8 {
            suggestions.push(Suggestion {
                kind: SuggestionKind::Enhancement,
                message: "Requirements are well specified; expect tightly focused stage content."
                    .to_string(),
                priority: OutlinePriority::Low,
            });
        }

        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn idea() -> IdeaBrief {
        IdeaBrief::new("Cold-chain telemetry", "Sensor network for food logistics")
    }

    fn analyzer() -> RequirementAnalyzer {
        RequirementAnalyzer::standard()
    }

    #[tokio::test]
    async fn test_empty_idea_is_rejected() {
        let selection = RequirementSelection::default();
        let err = analyzer()
            .analyze(&IdeaBrief::new("x", "  "), &selection)
            .await
            .unwrap_err();
        assert!(matches!(err, PlanforgeError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_unknown_option_is_rejected() {
        let mut selection = RequirementSelection::default();
        selection.select("business_focus", "not_an_option");
        let err = analyzer().analyze(&idea(), &selection).await.unwrap_err();
        assert!(matches!(err, PlanforgeError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_single_select_category_rejects_multiple() {
        let mut selection = RequirementSelection::default();
        selection.select("target_audience", "investors_vc");
        selection.select("target_audience", "angel_investors");
        let err = analyzer().analyze(&idea(), &selection).await.unwrap_err();
        assert!(matches!(err, PlanforgeError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_match_score_grows_with_selection() {
        let empty = analyzer()
            .analyze(&idea(), &RequirementSelection::default())
            .await
            .unwrap();
        assert!((empty.match_score - 0.5).abs() < f64::EPSILON);

        let mut selection = RequirementSelection::default();
        selection.select("business_focus", "market_opportunity");
        selection.select("business_focus", "revenue_model");
        selection.set_custom("industry_focus", "cold-chain specifics");
        let richer = analyzer().analyze(&idea(), &selection).await.unwrap();
        assert!((richer.match_score - 0.65).abs() < f64::EPSILON);
        assert!(richer.match_score > empty.match_score);
    }

    #[tokio::test]
    async fn test_match_score_is_capped() {
        let mut selection = RequirementSelection::default();
        for id in [
            "market_opportunity",
            "competitive_advantage",
            "revenue_model",
            "technology_innovation",
            "team_capability",
            "scalability_potential",
        ] {
            selection.select("business_focus", id);
        }
        for id in [
            "regulatory_compliance",
            "industry_trends",
            "ecosystem_position",
            "digital_transformation",
        ] {
            selection.select("industry_focus", id);
        }
        selection.set_custom("business_focus", "extra");
        selection.set_custom("industry_focus", "more");

        let analysis = analyzer().analyze(&idea(), &selection).await.unwrap();
        assert!((analysis.match_score - 0.95).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_selection_raises_outline_priority_and_pages() {
        let base = analyzer()
            .analyze(&idea(), &RequirementSelection::default())
            .await
            .unwrap();
        let base_market = base.outline_for("market_research").unwrap();
        assert_eq!(base_market.priority, OutlinePriority::Low);

        let mut selection = RequirementSelection::default();
        selection.select("business_focus", "market_opportunity");
        let focused = analyzer().analyze(&idea(), &selection).await.unwrap();
        let market = focused.outline_for("market_research").unwrap();

        assert_eq!(market.priority, OutlinePriority::Medium);
        assert_eq!(market.estimated_pages, base_market.estimated_pages + 3);
        assert_eq!(market.focus_points, vec!["Market Opportunity".to_string()]);

        // business_model is also touched by market_opportunity.
        let business = focused.outline_for("business_model").unwrap();
        assert_eq!(business.priority, OutlinePriority::Medium);
    }

    #[tokio::test]
    async fn test_strategy_weights_and_audience() {
        let mut selection = RequirementSelection::default();
        selection.select("business_focus", "market_opportunity");
        selection.select("business_focus", "revenue_model");
        selection.select("target_audience", "investors_vc");

        let analysis = analyzer().analyze(&idea(), &selection).await.unwrap();
        let strategy = &analysis.strategy;

        // business_model is touched by market_opportunity (3) and
        // revenue_model (3): 1.0 + 0.1 * 6.
        assert!((strategy.weight_for("business_model") - 1.6).abs() < 1e-9);
        // legal_compliance is untouched.
        assert!((strategy.weight_for("legal_compliance") - 1.0).abs() < f64::EPSILON);

        assert!(strategy.audience_emphasis.as_deref().unwrap().contains("returns"));
        assert!(!strategy.instructions_for("market_research").is_empty());
    }

    #[tokio::test]
    async fn test_analysis_is_deterministic() {
        let mut selection = RequirementSelection::default();
        selection.select("business_focus", "technology_innovation");
        selection.select("timeline_priority", "immediate_launch");

        let a = analyzer().analyze(&idea(), &selection).await.unwrap();
        let b = analyzer().analyze(&idea(), &selection).await.unwrap();
        assert_eq!(
            serde_json::to_value(&a).unwrap(),
            serde_json::to_value(&b).unwrap()
        );
    }

    #[tokio::test]
    async fn test_suggestions_flag_risky_combinations() {
        let mut selection = RequirementSelection::default();
        selection.select("resource_constraints", "funding_limited");
        selection.select("timeline_priority", "immediate_launch");

        let analysis = analyzer().analyze(&idea(), &selection).await.unwrap();
        assert!(analysis
            .suggestions
            .iter()
            .any(|s| s.kind == SuggestionKind::Warning && s.priority == OutlinePriority::High));
    }

    #[tokio::test]
    async fn test_estimated_minutes_scale_with_options() {
        let empty = analyzer()
            .analyze(&idea(), &RequirementSelection::default())
            .await
            .unwrap();
        assert_eq!(empty.estimated_minutes, 40);

        let mut selection = RequirementSelection::default();
        selection.select("business_focus", "market_opportunity");
        selection.select("business_focus", "revenue_model");
        let richer = analyzer().analyze(&idea(), &selection).await.unwrap();
        assert_eq!(richer.estimated_minutes, 44);
    }
}

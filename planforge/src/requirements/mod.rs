//! Requirement collection and analysis.
//!
//! Users answer a fixed questionnaire ([`RequirementCatalog`]) about their
//! idea; the [`RequirementAnalyzer`] turns those answers into a
//! [`RequirementAnalysis`] that steers every downstream stage.

pub mod analyzer;
pub mod catalog;

pub use analyzer::{
    GenerationStrategy, OutlinePriority, RequirementAnalysis, RequirementAnalyzer, StageOutline,
    Suggestion, SuggestionKind,
};
pub use catalog::{RequirementCatalog, RequirementCategory, RequirementOption};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A user's answers to the questionnaire.
///
/// Unvalidated by construction; the analyzer validates against the
/// catalogue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequirementSelection {
    /// Chosen option ids per category id.
    #[serde(default)]
    pub selected: HashMap<String, Vec<String>>,
    /// Free-text answer per category id, where the category allows one.
    #[serde(default)]
    pub custom: HashMap<String, String>,
    /// Context that applies across categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
}

impl RequirementSelection {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an option to a category. Duplicate ids are ignored.
    pub fn select(&mut self, category_id: &str, option_id: &str) {
        let options = self.selected.entry(category_id.to_string()).or_default();
        if !options.iter().any(|id| id == option_id) {
            options.push(option_id.to_string());
        }
    }

    /// Sets the free-text answer for a category.
    pub fn set_custom(&mut self, category_id: &str, text: impl Into<String>) {
        self.custom.insert(category_id.to_string(), text.into());
    }

    /// Total number of selected options across all categories.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selected.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_deduplicates() {
        let mut selection = RequirementSelection::new();
        selection.select("business_focus", "revenue_model");
        selection.select("business_focus", "revenue_model");
        selection.select("business_focus", "market_opportunity");
        assert_eq!(selection.selected_count(), 2);
    }

    #[test]
    fn test_selection_round_trips_through_json() {
        let mut selection = RequirementSelection::new();
        selection.select("industry_focus", "industry_trends");
        selection.set_custom("industry_focus", "ag-tech specifics");

        let json = serde_json::to_string(&selection).unwrap();
        let back: RequirementSelection = serde_json::from_str(&json).unwrap();
        assert_eq!(back.selected_count(), 1);
        assert_eq!(back.custom["industry_focus"], "ag-tech specifics");
    }
}

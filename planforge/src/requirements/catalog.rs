//! The built-in requirement questionnaire.

use serde::{Deserialize, Serialize};

/// One selectable option inside a requirement category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementOption {
    /// Stable option id.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Longer explanation shown next to the option.
    pub description: String,
    /// Importance weight, 1 to 3. Drives stage depth and priority.
    pub weight: u8,
    /// Stages this option should deepen.
    pub related_stages: Vec<String>,
    /// Instruction fragment forwarded to the generation strategy.
    pub prompt_hint: String,
}

impl RequirementOption {
    fn new(
        id: &str,
        label: &str,
        description: &str,
        weight: u8,
        related_stages: &[&str],
        prompt_hint: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            weight,
            related_stages: related_stages.iter().map(ToString::to_string).collect(),
            prompt_hint: prompt_hint.to_string(),
        }
    }
}

/// A group of related options the user answers together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementCategory {
    /// Stable category id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// What this category is asking.
    pub description: String,
    /// The selectable options.
    pub options: Vec<RequirementOption>,
    /// Whether a free-text answer is accepted alongside the options.
    pub allow_custom: bool,
    /// Whether more than one option may be selected.
    pub multiple: bool,
}

/// The full questionnaire: ordered categories with stable ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementCatalog {
    categories: Vec<RequirementCategory>,
}

impl RequirementCatalog {
    /// Creates a catalogue from explicit categories.
    #[must_use]
    pub fn new(categories: Vec<RequirementCategory>) -> Self {
        Self { categories }
    }

    /// The standard five-category questionnaire.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            RequirementCategory {
                id: "business_focus".to_string(),
                name: "Business Focus".to_string(),
                description: "Which aspects of the business should the plan emphasize?"
                    .to_string(),
                options: vec![
                    RequirementOption::new(
                        "market_opportunity",
                        "Market Opportunity",
                        "Size, growth and timing of the addressable market",
                        3,
                        &["market_research", "business_model"],
                        "quantify the market opportunity with sizing and growth data",
                    ),
                    RequirementOption::new(
                        "competitive_advantage",
                        "Competitive Advantage",
                        "What sets this venture apart from incumbents",
                        3,
                        &["concept_analysis", "market_research"],
                        "articulate durable differentiation versus named competitors",
                    ),
                    RequirementOption::new(
                        "revenue_model",
                        "Revenue Model",
                        "How the business earns and grows revenue",
                        3,
                        &["business_model", "financial_model"],
                        "detail revenue streams, pricing and unit economics",
                    ),
                    RequirementOption::new(
                        "technology_innovation",
                        "Technology Innovation",
                        "Novel technology or technical moat",
                        3,
                        &["tech_architecture", "concept_analysis"],
                        "explain the technical innovation and its defensibility",
                    ),
                    RequirementOption::new(
                        "team_capability",
                        "Team Capability",
                        "Strength and track record of the founding team",
                        2,
                        &["implementation_plan", "investor_pitch"],
                        "highlight team experience and execution capability",
                    ),
                    RequirementOption::new(
                        "scalability_potential",
                        "Scalability Potential",
                        "How the model scales beyond the initial market",
                        2,
                        &["business_model", "tech_architecture"],
                        "show the path from initial traction to scale",
                    ),
                ],
                allow_custom: true,
                multiple: true,
            },
            RequirementCategory {
                id: "target_audience".to_string(),
                name: "Target Audience".to_string(),
                description: "Who is the primary reader of the finished plan?".to_string(),
                options: vec![
                    RequirementOption::new(
                        "investors_vc",
                        "Venture Capital Investors",
                        "Institutional investors evaluating a funding round",
                        3,
                        &["financial_model", "investor_pitch"],
                        "frame the plan around returns, traction and exit potential",
                    ),
                    RequirementOption::new(
                        "angel_investors",
                        "Angel Investors",
                        "Individual early-stage investors",
                        2,
                        &["investor_pitch", "concept_analysis"],
                        "emphasize vision, founder story and early proof points",
                    ),
                    RequirementOption::new(
                        "strategic_partners",
                        "Strategic Partners",
                        "Potential partners or corporate collaborators",
                        2,
                        &["business_model", "implementation_plan"],
                        "emphasize partnership value and integration opportunities",
                    ),
                    RequirementOption::new(
                        "internal_team",
                        "Internal Team",
                        "The founding team and early employees",
                        2,
                        &["implementation_plan", "tech_architecture"],
                        "emphasize concrete milestones, ownership and execution detail",
                    ),
                    RequirementOption::new(
                        "government_agencies",
                        "Government Agencies",
                        "Grant bodies and public-sector programs",
                        2,
                        &["legal_compliance", "financial_model"],
                        "emphasize compliance, public benefit and budget discipline",
                    ),
                ],
                allow_custom: true,
                multiple: false,
            },
            RequirementCategory {
                id: "industry_focus".to_string(),
                name: "Industry Focus".to_string(),
                description: "Which industry dynamics matter most for this idea?".to_string(),
                options: vec![
                    RequirementOption::new(
                        "regulatory_compliance",
                        "Regulatory Compliance",
                        "The venture operates under material regulation",
                        3,
                        &["legal_compliance"],
                        "cover licensing, data protection and sector regulation in depth",
                    ),
                    RequirementOption::new(
                        "industry_trends",
                        "Industry Trends",
                        "Riding a visible industry shift",
                        2,
                        &["market_research", "concept_analysis"],
                        "anchor the opportunity in current industry trend data",
                    ),
                    RequirementOption::new(
                        "ecosystem_position",
                        "Ecosystem Position",
                        "Where the venture sits in its value chain",
                        2,
                        &["business_model", "market_research"],
                        "map the value chain and the venture's position in it",
                    ),
                    RequirementOption::new(
                        "digital_transformation",
                        "Digital Transformation",
                        "Digitizing a traditionally offline industry",
                        2,
                        &["tech_architecture", "market_research"],
                        "contrast the digital approach with incumbent offline processes",
                    ),
                ],
                allow_custom: true,
                multiple: true,
            },
            RequirementCategory {
                id: "resource_constraints".to_string(),
                name: "Resource Constraints".to_string(),
                description: "Which constraints shape what is realistic?".to_string(),
                options: vec![
                    RequirementOption::new(
                        "funding_limited",
                        "Limited Funding",
                        "Capital is tight; the plan must be lean",
                        3,
                        &["financial_model", "implementation_plan"],
                        "prioritize capital efficiency and staged spending",
                    ),
                    RequirementOption::new(
                        "team_building",
                        "Team Building",
                        "Key roles are still unfilled",
                        2,
                        &["implementation_plan"],
                        "include a realistic hiring plan with role priorities",
                    ),
                    RequirementOption::new(
                        "technology_gap",
                        "Technology Gap",
                        "Required technology is not yet built or proven",
                        2,
                        &["tech_architecture", "implementation_plan"],
                        "call out technical risk and a de-risking build sequence",
                    ),
                    RequirementOption::new(
                        "market_access",
                        "Market Access",
                        "Reaching customers is the hard part",
                        2,
                        &["market_research", "business_model"],
                        "detail channels and the cost of customer acquisition",
                    ),
                ],
                allow_custom: true,
                multiple: true,
            },
            RequirementCategory {
                id: "timeline_priority".to_string(),
                name: "Timeline Priority".to_string(),
                description: "What horizon should the plan optimize for?".to_string(),
                options: vec![
                    RequirementOption::new(
                        "immediate_launch",
                        "Immediate Launch",
                        "Get to market within months",
                        3,
                        &["implementation_plan", "business_model"],
                        "compress the roadmap toward a near-term launch",
                    ),
                    RequirementOption::new(
                        "medium_term",
                        "Medium Term",
                        "Build deliberately over one to two years",
                        2,
                        &["implementation_plan", "financial_model"],
                        "plan in quarterly phases over a one-to-two-year horizon",
                    ),
                    RequirementOption::new(
                        "long_term_vision",
                        "Long-Term Vision",
                        "Position for a multi-year category play",
                        2,
                        &["concept_analysis", "investor_pitch"],
                        "lead with the long-range vision and the staged path to it",
                    ),
                ],
                allow_custom: false,
                multiple: false,
            },
        ])
    }

    /// Iterates the categories in questionnaire order.
    pub fn iter(&self) -> impl Iterator<Item = &RequirementCategory> {
        self.categories.iter()
    }

    /// Looks up a category by id.
    #[must_use]
    pub fn category(&self, category_id: &str) -> Option<&RequirementCategory> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the catalogue has no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for RequirementCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_shape() {
        let catalog = RequirementCatalog::standard();
        assert_eq!(catalog.len(), 5);

        let ids: Vec<&str> = catalog.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "business_focus",
                "target_audience",
                "industry_focus",
                "resource_constraints",
                "timeline_priority"
            ]
        );
    }

    #[test]
    fn test_single_select_categories() {
        let catalog = RequirementCatalog::standard();
        assert!(!catalog.category("target_audience").unwrap().multiple);
        let timeline = catalog.category("timeline_priority").unwrap();
        assert!(!timeline.multiple);
        assert!(!timeline.allow_custom);
        assert!(catalog.category("business_focus").unwrap().multiple);
    }

    #[test]
    fn test_weights_are_in_range() {
        let catalog = RequirementCatalog::standard();
        for category in catalog.iter() {
            for option in &category.options {
                assert!((1..=3).contains(&option.weight), "{}", option.id);
                assert!(!option.related_stages.is_empty(), "{}", option.id);
            }
        }
    }
}

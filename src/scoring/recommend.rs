//! Recommendations for weak categories

use crate::constants::scoring::{MAX_RECOMMENDATIONS, RECOMMENDATION_THRESHOLD};
use crate::types::{AgentResults, Category, CategoryBreakdown};

/// Returned when no category is weak
pub const ENCOURAGEMENT: &str = "Keep developing all aspects of the startup";

pub fn recommendation_for(category: Category) -> &'static str {
    match category {
        Category::ProductTechnology => "Improve the description of the product and technology",
        Category::MarketOpportunity => "Add more information about market opportunities",
        Category::BusinessModel => "Detail the business model and monetization",
        Category::Financials => "Provide more financial data and forecasts",
        Category::Team => "Expand the information about the team and its experience",
        Category::Traction => "Show more metrics and progress",
        Category::Competition => "Add an analysis of competitors and competitive advantages",
        Category::RiskAssessment => "Describe the risks and ways to mitigate them",
    }
}

/// Weakest categories first, at most five. Never empty.
///
/// Only the breakdown drives the selection; `_results` is accepted so callers
/// hand over the same inputs the report is built from.
pub fn recommend(breakdown: &CategoryBreakdown, _results: &AgentResults) -> Vec<String> {
    // `iter` walks categories in declared order; the stable sort keeps it for ties
    let mut weak: Vec<(Category, f64)> = breakdown
        .iter()
        .filter(|(_, score)| *score < RECOMMENDATION_THRESHOLD)
        .collect();
    weak.sort_by(|a, b| a.1.total_cmp(&b.1));

    let recommendations: Vec<String> = weak
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|(category, _)| recommendation_for(category).to_string())
        .collect();

    if recommendations.is_empty() {
        vec![ENCOURAGEMENT.to_string()]
    } else {
        recommendations
    }
}

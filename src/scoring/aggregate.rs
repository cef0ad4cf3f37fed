//! Category aggregation
//!
//! Each of the eight categories averages the overall scores of a fixed set
//! of agents.

use crate::constants::scoring::DEFAULT_SCORE;
use crate::types::{AgentId, AgentResults, Category, CategoryBreakdown};

/// Agents whose overall score feeds a category
pub fn contributors(category: Category) -> &'static [AgentId] {
    use AgentId::*;
    match category {
        Category::ProductTechnology => &[TextAnalyzer],
        Category::MarketOpportunity => &[MarketAnalyzer],
        Category::BusinessModel => &[TextAnalyzer, MarketAnalyzer],
        Category::Financials => &[FinancialAnalyzer],
        Category::Team => &[TeamAnalyzer],
        Category::Traction => &[TextAnalyzer, MarketAnalyzer],
        // Uses the market agent's overall score, not its competition_level
        Category::Competition => &[MarketAnalyzer],
        Category::RiskAssessment => &[RiskPredictor],
    }
}

/// Breakdown over all eight categories. Categories with no usable
/// contributor score default to 50.
pub fn aggregate(results: &AgentResults) -> CategoryBreakdown {
    Category::ALL
        .into_iter()
        .map(|category| {
            let scores: Vec<f64> = contributors(category)
                .iter()
                .filter_map(|id| results.get(id))
                .filter_map(|result| result.usable_score())
                .collect();

            let score = if scores.is_empty() {
                DEFAULT_SCORE
            } else {
                scores.iter().sum::<f64>() / scores.len() as f64
            };
            (category, score)
        })
        .collect()
}

//! Weighted total score

use crate::types::{Category, CategoryBreakdown, round2};

/// Category weight in whole percent. The eight weights sum to 100.
pub fn weight_pct(category: Category) -> u32 {
    match category {
        Category::ProductTechnology
        | Category::MarketOpportunity
        | Category::BusinessModel
        | Category::Financials
        | Category::Team => 15,
        Category::Traction | Category::Competition => 10,
        Category::RiskAssessment => 5,
    }
}

pub fn weight(category: Category) -> f64 {
    f64::from(weight_pct(category)) / 100.0
}

/// Weighted sum over the eight categories, rounded to two decimals.
/// A category missing from the breakdown counts as 50.
pub fn total(breakdown: &CategoryBreakdown) -> f64 {
    let weighted: f64 = Category::ALL
        .into_iter()
        .map(|category| breakdown.score(category) * f64::from(weight_pct(category)))
        .sum();
    round2(weighted / 100.0)
}

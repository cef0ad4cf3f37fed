//! Scoring categories and the per-category breakdown

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::scoring::DEFAULT_SCORE;

/// One of the eight fixed scoring categories.
///
/// Variant order is the fixed display order and the tie-break order for
/// recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ProductTechnology,
    MarketOpportunity,
    BusinessModel,
    Financials,
    Team,
    Traction,
    Competition,
    RiskAssessment,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::ProductTechnology,
        Category::MarketOpportunity,
        Category::BusinessModel,
        Category::Financials,
        Category::Team,
        Category::Traction,
        Category::Competition,
        Category::RiskAssessment,
    ];

    /// Stable key used in serialized breakdowns
    pub fn key(&self) -> &'static str {
        match self {
            Category::ProductTechnology => "product_technology",
            Category::MarketOpportunity => "market_opportunity",
            Category::BusinessModel => "business_model",
            Category::Financials => "financials",
            Category::Team => "team",
            Category::Traction => "traction",
            Category::Competition => "competition",
            Category::RiskAssessment => "risk_assessment",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Category::ProductTechnology => "Product/Technology",
            Category::MarketOpportunity => "Market Opportunity",
            Category::BusinessModel => "Business Model",
            Category::Financials => "Financials",
            Category::Team => "Team",
            Category::Traction => "Traction",
            Category::Competition => "Competition",
            Category::RiskAssessment => "Risk Assessment",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Category key to score in [0,100]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryBreakdown(BTreeMap<Category, f64>);

impl CategoryBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Breakdown with every category at the same score
    pub fn uniform(score: f64) -> Self {
        Self(Category::ALL.into_iter().map(|c| (c, score)).collect())
    }

    pub fn insert(&mut self, category: Category, score: f64) {
        self.0.insert(category, score);
    }

    pub fn with(mut self, category: Category, score: f64) -> Self {
        self.insert(category, score);
        self
    }

    pub fn get(&self, category: Category) -> Option<f64> {
        self.0.get(&category).copied()
    }

    /// Score for a category, neutral when absent
    pub fn score(&self, category: Category) -> f64 {
        self.get(category).unwrap_or(DEFAULT_SCORE)
    }

    /// Entries in fixed category order
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.0.iter().map(|(c, s)| (*c, *s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when all eight categories are present
    pub fn is_complete(&self) -> bool {
        Category::ALL.iter().all(|c| self.0.contains_key(c))
    }
}

impl FromIterator<(Category, f64)> for CategoryBreakdown {
    fn from_iter<I: IntoIterator<Item = (Category, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_roundtrip() {
        for c in Category::ALL {
            assert_eq!(Category::from_key(c.key()), Some(c));
        }
        assert_eq!(Category::from_key("vibes"), None);
    }

    #[test]
    fn test_breakdown_serializes_with_string_keys() {
        let breakdown = CategoryBreakdown::new()
            .with(Category::Team, 30.0)
            .with(Category::Financials, 55.0);
        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json["team"], 30.0);
        assert_eq!(json["financials"], 55.0);

        let back: CategoryBreakdown = serde_json::from_value(json).unwrap();
        assert_eq!(back, breakdown);
    }

    #[test]
    fn test_iteration_follows_fixed_order() {
        let breakdown = CategoryBreakdown::new()
            .with(Category::RiskAssessment, 1.0)
            .with(Category::ProductTechnology, 2.0)
            .with(Category::Team, 3.0);
        let order: Vec<_> = breakdown.iter().map(|(c, _)| c).collect();
        assert_eq!(
            order,
            vec![
                Category::ProductTechnology,
                Category::Team,
                Category::RiskAssessment
            ]
        );
    }

    #[test]
    fn test_completeness() {
        assert!(CategoryBreakdown::uniform(50.0).is_complete());
        assert!(!CategoryBreakdown::new().with(Category::Team, 1.0).is_complete());
        assert_eq!(CategoryBreakdown::new().score(Category::Team), 50.0);
    }
}

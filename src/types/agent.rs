//! Agent identities and per-agent results

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::scoring::DEFAULT_SCORE;

/// Identity of one analyzer agent.
///
/// Variant order is the declared agent order and doubles as the
/// deterministic iteration order of [`AgentResults`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentId {
    TextAnalyzer,
    FinancialAnalyzer,
    MarketAnalyzer,
    TeamAnalyzer,
    RiskPredictor,
}

impl AgentId {
    pub const ALL: [AgentId; 5] = [
        AgentId::TextAnalyzer,
        AgentId::FinancialAnalyzer,
        AgentId::MarketAnalyzer,
        AgentId::TeamAnalyzer,
        AgentId::RiskPredictor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::TextAnalyzer => "text_analyzer",
            AgentId::FinancialAnalyzer => "financial_analyzer",
            AgentId::MarketAnalyzer => "market_analyzer",
            AgentId::TeamAnalyzer => "team_analyzer",
            AgentId::RiskPredictor => "risk_predictor",
        }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        AgentId::ALL
            .into_iter()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "Unknown agent: {}. Valid values: {}",
                    s,
                    AgentId::ALL.map(|id| id.as_str()).join(", ")
                )
            })
    }
}

/// Output of one agent invocation.
///
/// `score` and `details` are always present. Variant-specific fields live in
/// the open `fields` payload and are flattened on serialization, so a result
/// reads like the JSON object the agent was asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub score: f64,
    pub details: String,
    /// Why the result fell back to defaults, when it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl AgentResult {
    pub fn new(score: f64, details: impl Into<String>) -> Self {
        Self {
            score,
            details: details.into(),
            diagnostic: None,
            fields: Map::new(),
        }
    }

    /// Result synthesized by the orchestrator for an agent that failed outright
    pub fn agent_error(cause: impl fmt::Display) -> Self {
        Self::new(DEFAULT_SCORE, format!("Agent error: {}", cause))
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
        self.diagnostic = Some(diagnostic.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The `risks` list, when this result exposes one
    pub fn risks(&self) -> Option<&Vec<Value>> {
        self.fields.get("risks").and_then(Value::as_array)
    }

    /// Score when it is a usable number
    pub fn usable_score(&self) -> Option<f64> {
        self.score.is_finite().then_some(self.score)
    }
}

/// Completed results of one orchestration pass keyed by agent
pub type AgentResults = BTreeMap<AgentId, AgentResult>;

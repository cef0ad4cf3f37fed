//! Scoring report and its parts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::agent::{AgentResult, AgentResults};
use super::category::CategoryBreakdown;
use crate::constants::agent::{DETAILS_DEFAULT, NOT_SPECIFIED};
use crate::constants::scoring::DEFAULT_SCORE;
use crate::types::utils::{as_score, json_string_or};

// =============================================================================
// Risk Findings
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskImpact {
    Low,
    Medium,
    High,
}

impl RiskImpact {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskImpact::Low => "low",
            RiskImpact::Medium => "medium",
            RiskImpact::High => "high",
        }
    }

    /// Case-insensitive parse; unknown values yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(RiskImpact::Low),
            "medium" => Some(RiskImpact::Medium),
            "high" => Some(RiskImpact::High),
            _ => None,
        }
    }
}

/// One risk reported by an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFinding {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<RiskImpact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<String>,
}

impl RiskFinding {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            probability: None,
            impact: None,
            mitigation: None,
        }
    }

    /// Read a finding from an agent's loosely typed risk entry.
    ///
    /// Returns `None` unless the entry is an object with a non-blank string
    /// `description`. Optional fields that don't parse are dropped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let description = obj.get("description")?.as_str()?.trim();
        if description.is_empty() {
            return None;
        }

        let probability = obj
            .get("probability")
            .and_then(as_score)
            .map(|p| p.clamp(0.0, 1.0));
        let impact = obj
            .get("impact")
            .and_then(Value::as_str)
            .and_then(RiskImpact::parse);
        let mitigation = obj
            .get("mitigation")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(String::from);

        Some(Self {
            description: description.to_string(),
            probability,
            impact,
            mitigation,
        })
    }

    /// Identity used for deduplication
    pub fn dedup_key(&self) -> String {
        self.description.trim().to_lowercase()
    }
}

// =============================================================================
// Team Summary
// =============================================================================

/// Team summary lifted from the team analyzer's result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub team_size: String,
    pub experience_level: f64,
    #[serde(default)]
    pub key_members: Vec<Value>,
    #[serde(default)]
    pub team_strengths: Vec<Value>,
    pub details: String,
}

impl TeamInfo {
    pub fn from_result(result: &AgentResult) -> Self {
        let list = |key: &str| {
            result
                .field(key)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default()
        };
        let fields = Value::Object(result.fields.clone());

        Self {
            team_size: json_string_or(&fields, "team_size", NOT_SPECIFIED),
            experience_level: result
                .field("experience_level")
                .and_then(as_score)
                .unwrap_or(DEFAULT_SCORE),
            key_members: list("key_members"),
            team_strengths: list("team_strengths"),
            details: if result.details.is_empty() {
                DETAILS_DEFAULT.to_string()
            } else {
                result.details.clone()
            },
        }
    }
}

// =============================================================================
// Scoring Report
// =============================================================================

/// Final output of one orchestration pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringReport {
    pub subject_id: String,
    pub total_score: f64,
    pub breakdown: CategoryBreakdown,
    pub risks: Vec<RiskFinding>,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_info: Option<TeamInfo>,
    #[serde(default)]
    pub agent_results: AgentResults,
    pub scored_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_risk_from_value_full() {
        let risk = RiskFinding::from_value(&json!({
            "description": "  Cash runway under 6 months ",
            "probability": 0.7,
            "impact": "HIGH",
            "mitigation": "Raise bridge round"
        }))
        .unwrap();
        assert_eq!(risk.description, "Cash runway under 6 months");
        assert_eq!(risk.probability, Some(0.7));
        assert_eq!(risk.impact, Some(RiskImpact::High));
        assert_eq!(risk.mitigation.as_deref(), Some("Raise bridge round"));
    }

    #[test]
    fn test_risk_from_value_rejects_malformed() {
        assert!(RiskFinding::from_value(&json!("just a string")).is_none());
        assert!(RiskFinding::from_value(&json!({"impact": "high"})).is_none());
        assert!(RiskFinding::from_value(&json!({"description": 42})).is_none());
        assert!(RiskFinding::from_value(&json!({"description": "   "})).is_none());
    }

    #[test]
    fn test_risk_optional_fields_are_lenient() {
        let risk = RiskFinding::from_value(&json!({
            "description": "Churn",
            "probability": "very likely",
            "impact": "catastrophic"
        }))
        .unwrap();
        assert_eq!(risk.probability, None);
        assert_eq!(risk.impact, None);
        assert_eq!(risk.mitigation, None);
    }

    #[test]
    fn test_dedup_key_normalizes() {
        assert_eq!(
            RiskFinding::new(" Market Risk ").dedup_key(),
            RiskFinding::new("market risk").dedup_key()
        );
    }

    #[test]
    fn test_team_info_from_result() {
        let result = AgentResult::new(70.0, "Strong founders")
            .with_field("team_size", "4 people")
            .with_field("experience_level", 82)
            .with_field("key_members", json!([{"name": "Ann", "role": "CTO"}]))
            .with_field("team_strengths", json!(["ML expertise"]));
        let info = TeamInfo::from_result(&result);
        assert_eq!(info.team_size, "4 people");
        assert_eq!(info.experience_level, 82.0);
        assert_eq!(info.key_members.len(), 1);
        assert_eq!(info.team_strengths, vec![json!("ML expertise")]);
        assert_eq!(info.details, "Strong founders");
    }

    #[test]
    fn test_team_info_defaults() {
        let info = TeamInfo::from_result(&AgentResult::new(50.0, ""));
        assert_eq!(info.team_size, "Not specified");
        assert_eq!(info.experience_level, 50.0);
        assert!(info.key_members.is_empty());
        assert_eq!(info.details, "Analysis completed");
    }
}

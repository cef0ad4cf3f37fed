//! Risk Predictor
//!
//! Score is inverted relative to risk: higher means safer. Its `risks` list
//! is the primary source for the report's ranked risks.

use super::{AgentContext, AgentSchema, FieldSpec, ScoringAgent, run_scoring_agent};
use crate::types::{AgentId, AgentResult};

const RISK_LEVELS: &[&str] = &["low", "medium", "high"];

pub struct RiskPredictor {
    ctx: AgentContext,
}

impl RiskPredictor {
    pub const SCHEMA: AgentSchema = AgentSchema {
        id: AgentId::RiskPredictor,
        default_prompt: r#"Analyze and predict risks for the following startup pitch.

Text:
{text}

Provide a JSON response with:
- score: float (0-100) - risk assessment score (higher = lower risk)
- risks: list - list of risk objects, each with:
  - description: string - risk description
  - probability: float (0-1) - probability of risk
  - impact: string - impact level (low/medium/high)
  - mitigation: string - suggested mitigation
- overall_risk_level: string - overall risk level (low/medium/high)
- details: string - brief analysis summary

Return only valid JSON."#,
        fields: &[
            FieldSpec::list("risks"),
            FieldSpec::choice("overall_risk_level", RISK_LEVELS, "medium"),
        ],
    };

    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl ScoringAgent for RiskPredictor {
    fn id(&self) -> AgentId {
        AgentId::RiskPredictor
    }

    async fn analyze(&self, text: &str) -> AgentResult {
        run_scoring_agent(&self.ctx, &Self::SCHEMA, text).await
    }
}

//! Financial Analyzer

use super::{AgentContext, AgentSchema, FieldSpec, ScoringAgent, run_scoring_agent};
use crate::constants::agent::NOT_SPECIFIED;
use crate::types::{AgentId, AgentResult};

pub struct FinancialAnalyzer {
    ctx: AgentContext,
}

impl FinancialAnalyzer {
    pub const SCHEMA: AgentSchema = AgentSchema {
        id: AgentId::FinancialAnalyzer,
        default_prompt: r#"Analyze the financial information in the following startup pitch.

Text:
{text}

Provide a JSON response with:
- score: float (0-100) - financial analysis score
- revenue_model: string - description of revenue model
- financial_health: float (0-100) - assessment of financial health
- funding_needs: string - identified funding needs
- details: string - brief analysis summary

Return only valid JSON."#,
        fields: &[
            FieldSpec::text("revenue_model", NOT_SPECIFIED),
            FieldSpec::score("financial_health"),
            FieldSpec::text("funding_needs", NOT_SPECIFIED),
        ],
    };

    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl ScoringAgent for FinancialAnalyzer {
    fn id(&self) -> AgentId {
        AgentId::FinancialAnalyzer
    }

    async fn analyze(&self, text: &str) -> AgentResult {
        run_scoring_agent(&self.ctx, &Self::SCHEMA, text).await
    }
}

//! Market Analyzer
//!
//! Its overall score feeds three categories: market opportunity, business
//! model and competition.

use super::{AgentContext, AgentSchema, FieldSpec, ScoringAgent, run_scoring_agent};
use crate::constants::agent::NOT_SPECIFIED;
use crate::types::{AgentId, AgentResult};

pub struct MarketAnalyzer {
    ctx: AgentContext,
}

impl MarketAnalyzer {
    pub const SCHEMA: AgentSchema = AgentSchema {
        id: AgentId::MarketAnalyzer,
        default_prompt: r#"Analyze the market opportunity and competition in the following startup pitch.

Text:
{text}

Provide a JSON response with:
- score: float (0-100) - market analysis score
- market_size: string - assessment of market size
- competition_level: string - level of competition
- competitive_advantages: list - list of competitive advantages
- market_opportunity: float (0-100) - market opportunity score
- details: string - brief analysis summary

Return only valid JSON."#,
        fields: &[
            FieldSpec::text("market_size", NOT_SPECIFIED),
            FieldSpec::text("competition_level", "Unknown"),
            FieldSpec::list("competitive_advantages"),
            FieldSpec::score("market_opportunity"),
        ],
    };

    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl ScoringAgent for MarketAnalyzer {
    fn id(&self) -> AgentId {
        AgentId::MarketAnalyzer
    }

    async fn analyze(&self, text: &str) -> AgentResult {
        run_scoring_agent(&self.ctx, &Self::SCHEMA, text).await
    }
}

//! Scoring Agents
//!
//! Five analyzers share one contract: text in, `AgentResult` out, never an
//! error. Each wraps a prompt template and a result schema around the shared
//! runner in [`helpers`].

pub mod financial;
pub mod helpers;
pub mod market;
pub mod risk;
pub mod team;
pub mod text;

pub use financial::FinancialAnalyzer;
pub use helpers::{AgentContext, AgentSchema, FieldKind, FieldSpec, render_prompt, run_scoring_agent};
pub use market::MarketAnalyzer;
pub use risk::RiskPredictor;
pub use team::TeamAnalyzer;
pub use text::TextAnalyzer;

use std::sync::Arc;

use crate::ai::SharedProvider;
use crate::config::AgentConfigResolver;
use crate::types::{AgentId, AgentResult};

#[async_trait::async_trait]
pub trait ScoringAgent: Send + Sync {
    fn id(&self) -> AgentId;

    /// Analyze the document. Failures are folded into the result.
    async fn analyze(&self, text: &str) -> AgentResult;
}

/// Static schema for an agent identity
pub fn schema_for(id: AgentId) -> &'static AgentSchema {
    match id {
        AgentId::TextAnalyzer => &TextAnalyzer::SCHEMA,
        AgentId::FinancialAnalyzer => &FinancialAnalyzer::SCHEMA,
        AgentId::MarketAnalyzer => &MarketAnalyzer::SCHEMA,
        AgentId::TeamAnalyzer => &TeamAnalyzer::SCHEMA,
        AgentId::RiskPredictor => &RiskPredictor::SCHEMA,
    }
}

/// Build one agent with its resolved configuration
pub fn build_agent(
    id: AgentId,
    resolver: &AgentConfigResolver,
    provider: SharedProvider,
) -> Arc<dyn ScoringAgent> {
    let ctx = AgentContext::new(resolver.resolve(id), provider);
    match id {
        AgentId::TextAnalyzer => Arc::new(TextAnalyzer::new(ctx)),
        AgentId::FinancialAnalyzer => Arc::new(FinancialAnalyzer::new(ctx)),
        AgentId::MarketAnalyzer => Arc::new(MarketAnalyzer::new(ctx)),
        AgentId::TeamAnalyzer => Arc::new(TeamAnalyzer::new(ctx)),
        AgentId::RiskPredictor => Arc::new(RiskPredictor::new(ctx)),
    }
}

/// All five agents in declared order
pub fn build_agents(
    resolver: &AgentConfigResolver,
    provider: &SharedProvider,
) -> Vec<Arc<dyn ScoringAgent>> {
    AgentId::ALL
        .into_iter()
        .map(|id| build_agent(id, resolver, Arc::clone(provider)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::scripted::ScriptedProvider;

    #[test]
    fn test_schemas_match_ids() {
        for id in AgentId::ALL {
            assert_eq!(schema_for(id).id, id);
            assert!(schema_for(id).default_prompt.contains("{text}"));
            assert!(schema_for(id).default_prompt.contains("Return only valid JSON."));
        }
    }

    #[tokio::test]
    async fn test_every_agent_survives_a_failing_gateway() {
        let provider: SharedProvider = Arc::new(ScriptedProvider::failing());
        let agents = build_agents(&AgentConfigResolver::default(), &provider);
        assert_eq!(agents.len(), 5);

        for agent in agents {
            let result = agent.analyze("Our startup sells robots.").await;
            assert_eq!(result.score, 50.0);
            assert_eq!(result.details, "Analysis completed with default scores");
            assert_eq!(
                result.fields.len(),
                schema_for(agent.id()).fields.len(),
                "{} should emit every schema field",
                agent.id()
            );
        }
    }
}

//! Team Analyzer
//!
//! The only agent whose payload is lifted into the report (`team_info`).

use super::{AgentContext, AgentSchema, FieldSpec, ScoringAgent, run_scoring_agent};
use crate::constants::agent::NOT_SPECIFIED;
use crate::types::{AgentId, AgentResult};

pub struct TeamAnalyzer {
    ctx: AgentContext,
}

impl TeamAnalyzer {
    pub const SCHEMA: AgentSchema = AgentSchema {
        id: AgentId::TeamAnalyzer,
        default_prompt: r#"Analyze the team information in the following startup pitch.

Text:
{text}

Provide a JSON response with:
- score: float (0-100) - team analysis score
- team_size: string - team size assessment
- experience_level: float (0-100) - team experience score
- key_members: list - list of key team members identified
- team_strengths: list - list of team strengths
- details: string - brief analysis summary

Return only valid JSON."#,
        fields: &[
            FieldSpec::text("team_size", NOT_SPECIFIED),
            FieldSpec::score("experience_level"),
            FieldSpec::list("key_members"),
            FieldSpec::list("team_strengths"),
        ],
    };

    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl ScoringAgent for TeamAnalyzer {
    fn id(&self) -> AgentId {
        AgentId::TeamAnalyzer
    }

    async fn analyze(&self, text: &str) -> AgentResult {
        run_scoring_agent(&self.ctx, &Self::SCHEMA, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::scripted::ScriptedProvider;
    use crate::config::AgentConfig;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_defaults_on_gateway_failure() {
        let agent = TeamAnalyzer::new(AgentContext::new(
            AgentConfig::default(),
            Arc::new(ScriptedProvider::failing()),
        ));
        let result = agent.analyze("pitch").await;

        assert_eq!(result.score, 50.0);
        assert_eq!(result.field("team_size"), Some(&json!("Not specified")));
        assert_eq!(result.field("experience_level"), Some(&json!(50.0)));
        assert_eq!(result.field("key_members"), Some(&json!([])));
        assert_eq!(result.field("team_strengths"), Some(&json!([])));
    }

    #[tokio::test]
    async fn test_key_members_keep_their_shape() {
        let reply = r#"{"score": 85, "team_size": 6, "key_members": [{"name": "Ivan", "role": "CEO"}, "Olga (CTO)"], "team_strengths": "strong"}"#;
        let agent = TeamAnalyzer::new(AgentContext::new(
            AgentConfig::default(),
            Arc::new(ScriptedProvider::new().reply("team information", reply)),
        ));
        let result = agent.analyze("pitch").await;

        assert_eq!(result.field("team_size"), Some(&json!("6")));
        assert_eq!(
            result.field("key_members"),
            Some(&json!([{"name": "Ivan", "role": "CEO"}, "Olga (CTO)"]))
        );
        assert_eq!(result.field("team_strengths"), Some(&json!([])));
    }
}

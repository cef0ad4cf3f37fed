//! Text Analyzer
//!
//! Rates the pitch's writing: clarity, structure and completeness.

use super::{AgentContext, AgentSchema, FieldSpec, ScoringAgent, run_scoring_agent};
use crate::types::{AgentId, AgentResult};

pub struct TextAnalyzer {
    ctx: AgentContext,
}

impl TextAnalyzer {
    pub const SCHEMA: AgentSchema = AgentSchema {
        id: AgentId::TextAnalyzer,
        default_prompt: r#"Analyze the following startup pitch text for quality, structure, and clarity.

Text:
{text}

Provide a JSON response with:
- score: float (0-100) - overall text quality score
- clarity: float (0-100) - how clear and understandable the text is
- structure: float (0-100) - how well structured the text is
- completeness: float (0-100) - how complete the information is
- details: string - brief analysis summary

Return only valid JSON."#,
        fields: &[
            FieldSpec::score("clarity"),
            FieldSpec::score("structure"),
            FieldSpec::score("completeness"),
        ],
    };

    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl ScoringAgent for TextAnalyzer {
    fn id(&self) -> AgentId {
        AgentId::TextAnalyzer
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
        let agent = TextAnalyzer::new(AgentContext::new(
            AgentConfig::default(),
            Arc::new(ScriptedProvider::failing()),
        ));
        let result = agent.analyze("pitch").await;

        assert_eq!(result.score, 50.0);
        for field in ["clarity", "structure", "completeness"] {
            assert_eq!(result.field(field), Some(&json!(50.0)));
        }
        assert_eq!(result.details, "Analysis completed with default scores");
    }

    #[tokio::test]
    async fn test_decodes_fenced_reply() {
        let reply = "```json\n{\"score\": 77, \"clarity\": 80, \"structure\": 140, \"details\": \"Clear\"}\n```";
        let agent = TextAnalyzer::new(AgentContext::new(
            AgentConfig::default(),
            Arc::new(ScriptedProvider::new().reply("quality, structure, and clarity", reply)),
        ));
        let result = agent.analyze("pitch").await;

        assert_eq!(result.score, 77.0);
        assert_eq!(result.field("clarity"), Some(&json!(80.0)));
        assert_eq!(result.field("structure"), Some(&json!(100.0)));
        assert_eq!(result.field("completeness"), Some(&json!(50.0)));
        assert_eq!(result.details, "Clear");
    }
}

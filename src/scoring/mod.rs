//! Scoring Orchestration
//!
//! Fan-out/fan-in over the five agents, then a pure reduction of their
//! results into a [`ScoringReport`]:
//!
//! ```text
//! text ──┬─> text_analyzer ──────┐
//!        ├─> financial_analyzer ─┤
//!        ├─> market_analyzer ────┼─> aggregate ─> total
//!        ├─> team_analyzer ──────┤            ├─> rank risks
//!        └─> risk_predictor ─────┘            └─> recommend
//! ```
//!
//! Every agent runs in its own task under the gateway timeout. A panic,
//! timeout or join failure in one task becomes a default result for that
//! agent only.

pub mod aggregate;
pub mod recommend;
pub mod risks;
pub mod total;

pub use aggregate::{aggregate, contributors};
pub use recommend::{ENCOURAGEMENT, recommend, recommendation_for};
pub use risks::rank;
pub use total::{total, weight, weight_pct};

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::agents::{ScoringAgent, build_agents};
use crate::ai::{SharedProvider, with_timeout_map};
use crate::config::{AgentConfigResolver, Config, LlmConfig};
use crate::constants::network::AUTH_TIMEOUT_SECS;
use crate::types::{AgentId, AgentResult, AgentResults, ScoringReport, TeamInfo};

pub struct ScoringOrchestrator {
    agents: Vec<Arc<dyn ScoringAgent>>,
    agent_timeout: Duration,
}

impl ScoringOrchestrator {
    pub fn new(agents: Vec<Arc<dyn ScoringAgent>>, agent_timeout: Duration) -> Self {
        Self {
            agents,
            agent_timeout,
        }
    }

    /// All five agents with resolved configuration, timed out like the gateway
    pub fn from_config(
        config: &Config,
        resolver: &AgentConfigResolver,
        provider: SharedProvider,
    ) -> Self {
        Self::new(build_agents(resolver, &provider), agent_timeout(&config.llm))
    }

    pub fn agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.iter().map(|agent| agent.id())
    }

    /// Score one document. Never fails: agent failures degrade to defaults.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn score(&self, text: &str, subject_id: &str) -> ScoringReport {
        info!("Scoring: running {} agents", self.agents.len());

        let results = self.run_agents(text).await;
        let report = assemble(subject_id, results);

        info!(
            "Scoring: complete, total {:.2}, {} risks, {} recommendations",
            report.total_score,
            report.risks.len(),
            report.recommendations.len()
        );
        report
    }

    async fn run_agents(&self, text: &str) -> AgentResults {
        let text: Arc<str> = Arc::from(text);

        let tasks = self.agents.iter().map(|agent| {
            let agent = Arc::clone(agent);
            let text = Arc::clone(&text);
            let timeout = self.agent_timeout;
            let id = agent.id();

            let handle = tokio::spawn(async move {
                with_timeout_map(timeout, agent.analyze(&text), id.as_str()).await
            });
            async move { (id, handle.await) }
        });

        join_all(tasks)
            .await
            .into_iter()
            .map(|(id, outcome)| {
                let result = match outcome {
                    Ok(Ok(result)) => result,
                    Ok(Err(e)) => {
                        warn!("Scoring: agent {} failed: {}", id, e);
                        AgentResult::agent_error(e)
                    }
                    Err(join_error) => {
                        let cause = if join_error.is_panic() {
                            panic_message(join_error.into_panic())
                        } else {
                            join_error.to_string()
                        };
                        warn!("Scoring: agent {} aborted: {}", id, cause);
                        AgentResult::agent_error(cause)
                    }
                };
                (id, result)
            })
            .collect()
    }
}

/// Per-agent budget: the gateway's request timeout plus the GigaChat token
/// exchange that may precede it. Must outlast the gateway's own deadline.
pub fn agent_timeout(llm: &LlmConfig) -> Duration {
    let auth = if llm.provider == "gigachat" {
        AUTH_TIMEOUT_SECS
    } else {
        0
    };
    Duration::from_secs(llm.timeout_secs + auth)
}

/// Reduce completed agent results into a report
pub fn assemble(subject_id: &str, results: AgentResults) -> ScoringReport {
    let breakdown = aggregate(&results);

    ScoringReport {
        subject_id: subject_id.to_string(),
        total_score: total(&breakdown),
        risks: rank(&results),
        recommendations: recommend(&breakdown, &results),
        team_info: results.get(&AgentId::TeamAnalyzer).map(TeamInfo::from_result),
        breakdown,
        agent_results: results,
        scored_at: Utc::now(),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "agent panicked".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::scripted::ScriptedProvider;
    use crate::types::Category;
    use serde_json::json;

    struct FixedAgent {
        id: AgentId,
        result: AgentResult,
    }

    #[async_trait::async_trait]
    impl ScoringAgent for FixedAgent {
        fn id(&self) -> AgentId {
            self.id
        }

        async fn analyze(&self, _text: &str) -> AgentResult {
            self.result.clone()
        }
    }

    struct PanickingAgent(AgentId);

    #[async_trait::async_trait]
    impl ScoringAgent for PanickingAgent {
        fn id(&self) -> AgentId {
            self.0
        }

        async fn analyze(&self, _text: &str) -> AgentResult {
            panic!("model client exploded")
        }
    }

    struct StalledAgent(AgentId);

    #[async_trait::async_trait]
    impl ScoringAgent for StalledAgent {
        fn id(&self) -> AgentId {
            self.0
        }

        async fn analyze(&self, _text: &str) -> AgentResult {
            tokio::time::sleep(Duration::from_secs(30)).await;
            AgentResult::new(99.0, "too late")
        }
    }

    fn fixed(id: AgentId, score: f64) -> Arc<dyn ScoringAgent> {
        Arc::new(FixedAgent {
            id,
            result: AgentResult::new(score, "ok"),
        })
    }

    fn fixed_agents_except(skip: AgentId) -> Vec<Arc<dyn ScoringAgent>> {
        AgentId::ALL
            .into_iter()
            .filter(|id| *id != skip)
            .map(|id| fixed(id, 80.0))
            .collect()
    }

    #[tokio::test]
    async fn test_end_to_end_with_scripted_gateway() {
        let provider: SharedProvider = Arc::new(
            ScriptedProvider::new()
                .reply("quality, structure, and clarity", r#"{"score": 80, "clarity": 85}"#)
                .reply("financial information", r#"{"score": 80, "revenue_model": "Subscriptions"}"#)
                .reply(
                    "market opportunity and competition",
                    r#"{"score": 80, "market_size": "$4B", "competition_level": "medium"}"#,
                )
                .reply(
                    "team information",
                    r#"{"score": 80, "team_size": "5", "experience_level": 75, "key_members": ["CEO"], "details": "Strong founders"}"#,
                )
                .reply(
                    "predict risks",
                    r#"```json
{"score": 40, "overall_risk_level": "high", "risks": [
  {"description": "Long sales cycle", "probability": 0.6, "impact": "high"},
  {"description": "long sales cycle "},
  {"description": "Key person dependency", "impact": "medium"}
]}
```"#,
                ),
        );
        let orchestrator = ScoringOrchestrator::from_config(
            &Config::default(),
            &AgentConfigResolver::default(),
            provider,
        );

        let report = orchestrator
            .score("Our team of five sells to a large market with recurring revenue.", "acme")
            .await;

        assert_eq!(report.subject_id, "acme");
        assert_eq!(report.breakdown.score(Category::Competition), 80.0);
        assert_eq!(report.breakdown.score(Category::RiskAssessment), 40.0);
        assert!(report.breakdown.is_complete());
        assert_eq!(report.total_score, 78.0);
        assert_eq!(
            report.recommendations,
            vec![recommendation_for(Category::RiskAssessment)]
        );

        let risks: Vec<&str> = report.risks.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(risks, vec!["Long sales cycle", "Key person dependency"]);

        let team = report.team_info.expect("team info");
        assert_eq!(team.team_size, "5");
        assert_eq!(team.experience_level, 75.0);
        assert_eq!(team.key_members, vec![json!("CEO")]);
        assert_eq!(team.details, "Strong founders");
        assert_eq!(report.agent_results.len(), 5);
    }

    #[tokio::test]
    async fn test_unreachable_gateway_yields_neutral_report() {
        let orchestrator = ScoringOrchestrator::from_config(
            &Config::default(),
            &AgentConfigResolver::default(),
            Arc::new(ScriptedProvider::failing()),
        );
        let report = orchestrator.score("pitch", "s1").await;

        assert_eq!(report.total_score, 50.0);
        assert!(report.risks.is_empty());
        // Every category ties at 50, below the threshold: declared order wins
        assert_eq!(
            report.recommendations,
            vec![
                recommendation_for(Category::ProductTechnology),
                recommendation_for(Category::MarketOpportunity),
                recommendation_for(Category::BusinessModel),
                recommendation_for(Category::Financials),
                recommendation_for(Category::Team),
            ]
        );
        assert!(
            report
                .agent_results
                .values()
                .all(|r| r.details == "Analysis completed with default scores")
        );
    }

    #[tokio::test]
    async fn test_panicking_agent_is_isolated() {
        let mut panicking = fixed_agents_except(AgentId::TeamAnalyzer);
        panicking.push(Arc::new(PanickingAgent(AgentId::TeamAnalyzer)));
        let mut defaulted = fixed_agents_except(AgentId::TeamAnalyzer);
        defaulted.push(fixed(AgentId::TeamAnalyzer, 50.0));

        let timeout = Duration::from_secs(5);
        let with_panic = ScoringOrchestrator::new(panicking, timeout)
            .score("pitch", "s1")
            .await;
        let with_default = ScoringOrchestrator::new(defaulted, timeout)
            .score("pitch", "s1")
            .await;

        assert_eq!(with_panic.breakdown, with_default.breakdown);
        assert_eq!(with_panic.total_score, with_default.total_score);
        assert_eq!(
            with_panic.agent_results[&AgentId::TeamAnalyzer].details,
            "Agent error: model client exploded"
        );
        assert_eq!(with_panic.breakdown.score(Category::Team), 50.0);
    }

    #[tokio::test]
    async fn test_stalled_agent_times_out() {
        let mut agents = fixed_agents_except(AgentId::MarketAnalyzer);
        agents.push(Arc::new(StalledAgent(AgentId::MarketAnalyzer)));

        let report = ScoringOrchestrator::new(agents, Duration::from_millis(50))
            .score("pitch", "s1")
            .await;

        let market = &report.agent_results[&AgentId::MarketAnalyzer];
        assert_eq!(market.score, 50.0);
        assert!(market.details.starts_with("Agent error:"));
        assert_eq!(report.breakdown.score(Category::Competition), 50.0);
        assert_eq!(report.breakdown.score(Category::BusinessModel), 65.0);
        assert_eq!(report.breakdown.score(Category::Team), 80.0);
    }

    #[tokio::test]
    async fn test_hung_gateway_call_is_cut_off() {
        let provider: SharedProvider = Arc::new(
            ScriptedProvider::new().hang("team information", Duration::from_secs(30)),
        );
        let orchestrator = ScoringOrchestrator::new(
            build_agents(&AgentConfigResolver::default(), &provider),
            Duration::from_millis(100),
        );
        let report = orchestrator.score("pitch", "s1").await;

        let team = &report.agent_results[&AgentId::TeamAnalyzer];
        assert_eq!(team.score, 50.0);
        assert!(team.details.starts_with("Agent error:"), "{}", team.details);
        assert_eq!(
            report.agent_results[&AgentId::RiskPredictor].details,
            "Analysis completed with default scores"
        );
        assert_eq!(report.agent_results.len(), 5);
    }

    #[test]
    fn test_agent_timeout_covers_token_exchange() {
        let mut llm = LlmConfig {
            timeout_secs: 30,
            ..LlmConfig::default()
        };
        assert_eq!(
            agent_timeout(&llm),
            Duration::from_secs(30 + AUTH_TIMEOUT_SECS)
        );

        llm.provider = "openai".to_string();
        assert_eq!(agent_timeout(&llm), Duration::from_secs(30));
    }

    #[test]
    fn test_assemble_without_team_result() {
        let report = assemble("s1", AgentResults::new());
        assert!(report.team_info.is_none());
        assert_eq!(report.total_score, 50.0);
    }
}

//! Shared agent runner
//!
//! Every agent follows the same pattern:
//! 1. Render its template -> 2. Call the gateway -> 3. Decode leniently ->
//! 4. Apply per-field defaults. Variants differ only in their `AgentSchema`.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::ai::{CompletionRequest, SharedProvider, decode_object};
use crate::config::AgentConfig;
use crate::constants::agent::{DETAILS_DEFAULT, DETAILS_FALLBACK, TEXT_PLACEHOLDER};
use crate::constants::scoring::DEFAULT_SCORE;
use crate::types::{AgentId, AgentResult, as_score, preview};

// =============================================================================
// Schema
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Float in [0,100], neutral 50 when missing
    Score,
    /// Free text with a default
    Text(&'static str),
    /// One of a fixed set of lowercase values
    Choice {
        allowed: &'static [&'static str],
        default: &'static str,
    },
    /// Loosely typed list, empty when missing
    List,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn score(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Score,
        }
    }

    pub const fn text(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text(default),
        }
    }

    pub const fn choice(
        name: &'static str,
        allowed: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Choice { allowed, default },
        }
    }

    pub const fn list(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::List,
        }
    }

    fn default_value(&self) -> Value {
        match self.kind {
            FieldKind::Score => Value::from(DEFAULT_SCORE),
            FieldKind::Text(default) => Value::from(default),
            FieldKind::Choice { default, .. } => Value::from(default),
            FieldKind::List => Value::Array(Vec::new()),
        }
    }

    /// Field value from a decoded reply, `None` when absent or malformed
    fn read(&self, raw: &Value) -> Option<Value> {
        match self.kind {
            FieldKind::Score => as_score(raw).map(Value::from),
            FieldKind::Text(_) => match raw {
                Value::String(s) if !s.trim().is_empty() => Some(Value::from(s.trim())),
                Value::Number(n) => Some(Value::from(n.to_string())),
                _ => None,
            },
            FieldKind::Choice { allowed, .. } => {
                let normalized = raw.as_str()?.trim().to_lowercase();
                allowed
                    .iter()
                    .find(|a| **a == normalized)
                    .map(|a| Value::from(*a))
            }
            FieldKind::List => raw.as_array().map(|items| Value::Array(items.clone())),
        }
    }
}

/// Variant-specific prompt and result schema
#[derive(Debug)]
pub struct AgentSchema {
    pub id: AgentId,
    pub default_prompt: &'static str,
    /// Fields besides `score` and `details`
    pub fields: &'static [FieldSpec],
}

impl AgentSchema {
    /// Result built from a decoded reply, defaulting field by field
    pub fn from_object(&self, object: &Map<String, Value>) -> AgentResult {
        let score = object
            .get("score")
            .and_then(as_score)
            .unwrap_or(DEFAULT_SCORE);
        let details = object
            .get("details")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DETAILS_DEFAULT);

        self.fields
            .iter()
            .fold(AgentResult::new(score, details), |result, field| {
                let value = object
                    .get(field.name)
                    .and_then(|raw| field.read(raw))
                    .unwrap_or_else(|| field.default_value());
                result.with_field(field.name, value)
            })
    }

    /// All-defaults result for a reply that never arrived or never parsed
    pub fn fallback(&self, cause: impl Into<String>) -> AgentResult {
        self.fields
            .iter()
            .fold(AgentResult::new(DEFAULT_SCORE, DETAILS_FALLBACK), |result, field| {
                result.with_field(field.name, field.default_value())
            })
            .with_diagnostic(cause)
    }

    /// Decode a raw model reply; never fails
    pub fn decode(&self, raw: &str) -> AgentResult {
        match decode_object(raw) {
            Ok(object) => self.from_object(&object),
            Err(e) => {
                warn!("{}: undecodable reply ({}): {}", self.id, e, preview(raw, 200));
                self.fallback(e.to_string())
            }
        }
    }
}

// =============================================================================
// Agent Runner
// =============================================================================

/// What every agent instance holds: its resolved config and the gateway
#[derive(Clone)]
pub struct AgentContext {
    pub config: AgentConfig,
    pub provider: SharedProvider,
}

impl AgentContext {
    pub fn new(config: AgentConfig, provider: SharedProvider) -> Self {
        Self { config, provider }
    }

    pub fn request(&self, schema: &AgentSchema, text: &str) -> CompletionRequest {
        let template = self
            .config
            .analysis_prompt()
            .unwrap_or(schema.default_prompt);
        CompletionRequest {
            system_prompt: self.config.system_prompt.clone(),
            user_prompt: render_prompt(template, text),
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

/// Run one agent end to end. Gateway failures become the schema's
/// default result with the cause kept in `diagnostic`.
pub async fn run_scoring_agent(ctx: &AgentContext, schema: &AgentSchema, text: &str) -> AgentResult {
    let request = ctx.request(schema, text);
    debug!(
        "{}: calling {} via {} ({} chars)",
        schema.id,
        request.model,
        ctx.provider.name(),
        text.chars().count()
    );

    let result = match ctx.provider.complete(&request).await {
        Ok(response) => {
            debug!(
                "{}: reply in {}ms, {} tokens",
                schema.id,
                response.timing.total_ms,
                response.usage.total()
            );
            schema.decode(&response.content)
        }
        Err(e) => {
            warn!("{}: gateway failed, using default scores: {}", schema.id, e);
            schema.fallback(e.to_string())
        }
    };

    debug!("{}: score {:.1}", schema.id, result.score);
    result
}

/// Substitute the document into a template.
///
/// `{text}` is replaced by the document; `{{` and `}}` collapse to single
/// braces so templates can show literal JSON. Other braces pass through.
pub fn render_prompt(template: &str, text: &str) -> String {
    let mut out = String::with_capacity(template.len() + text.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with(TEXT_PLACEHOLDER) {
            out.push_str(text);
            rest = &tail[TEXT_PLACEHOLDER.len()..];
        } else if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
        } else {
            out.push_str(&tail[..1]);
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::scripted::ScriptedProvider;
    use crate::types::ErrorCategory;
    use serde_json::json;
    use std::sync::Arc;

    const SCHEMA: AgentSchema = AgentSchema {
        id: AgentId::MarketAnalyzer,
        default_prompt: "Analyze market:\n{text}\nReturn only valid JSON.",
        fields: &[
            FieldSpec::text("market_size", "Not specified"),
            FieldSpec::choice("level", &["low", "medium", "high"], "medium"),
            FieldSpec::score("opportunity"),
            FieldSpec::list("advantages"),
        ],
    };

    #[test]
    fn test_render_prompt() {
        assert_eq!(render_prompt("A {text} B", "doc"), "A doc B");
        assert_eq!(
            render_prompt(r#"{{"score": 1}} {text}"#, "{text}"),
            r#"{"score": 1} {text}"#
        );
        assert_eq!(render_prompt("no placeholder {x}", "doc"), "no placeholder {x}");
    }

    #[test]
    fn test_from_object_per_field_defaults() {
        let result = SCHEMA.decode(
            r#"{"score": "88", "market_size": "  $2B  ", "level": "HIGH", "opportunity": "big"}"#,
        );
        assert_eq!(result.score, 88.0);
        assert_eq!(result.details, "Analysis completed");
        assert_eq!(result.field("market_size"), Some(&json!("$2B")));
        assert_eq!(result.field("level"), Some(&json!("high")));
        assert_eq!(result.field("opportunity"), Some(&json!(50.0)));
        assert_eq!(result.field("advantages"), Some(&json!([])));
        assert!(result.diagnostic.is_none());
    }

    #[test]
    fn test_unknown_choice_and_bad_score() {
        let result = SCHEMA.decode(r#"{"score": null, "level": "extreme", "details": "x"}"#);
        assert_eq!(result.score, 50.0);
        assert_eq!(result.field("level"), Some(&json!("medium")));
        assert_eq!(result.details, "x");
    }

    #[test]
    fn test_extra_keys_are_dropped() {
        let result = SCHEMA.decode(r#"{"score": 10, "unexpected": true}"#);
        assert!(result.field("unexpected").is_none());
    }

    #[test]
    fn test_undecodable_reply_falls_back() {
        let result = SCHEMA.decode("Sorry, I can't do that");
        assert_eq!(result.score, 50.0);
        assert_eq!(result.details, "Analysis completed with default scores");
        assert_eq!(result.field("market_size"), Some(&json!("Not specified")));
        assert!(result.diagnostic.is_some());
    }

    #[tokio::test]
    async fn test_runner_uses_config_and_template() {
        let provider = Arc::new(ScriptedProvider::new().reply("Analyze market", r#"{"score": 70}"#));
        let config = AgentConfig {
            model: "GigaChat-Max".to_string(),
            system_prompt: "sys".to_string(),
            ..AgentConfig::default()
        };
        let ctx = AgentContext::new(config, provider.clone());

        let result = run_scoring_agent(&ctx, &SCHEMA, "pitch body").await;
        assert_eq!(result.score, 70.0);

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "GigaChat-Max");
        assert_eq!(requests[0].system_prompt, "sys");
        assert!(requests[0].user_prompt.contains("pitch body"));
        assert!(!requests[0].user_prompt.contains("{text}"));
    }

    #[tokio::test]
    async fn test_runner_prefers_configured_template() {
        let provider = Arc::new(ScriptedProvider::new().reply("CUSTOM", r#"{"score": 33}"#));
        let mut config = AgentConfig::default();
        config
            .prompts
            .insert("analysis_prompt".to_string(), "CUSTOM {text}".to_string());
        let ctx = AgentContext::new(config, provider);

        assert_eq!(run_scoring_agent(&ctx, &SCHEMA, "doc").await.score, 33.0);
    }

    #[tokio::test]
    async fn test_runner_gateway_failure_keeps_cause() {
        let provider = Arc::new(ScriptedProvider::new().fail(
            "Analyze market",
            ErrorCategory::Auth,
            "GIGACHAT_API_KEY not configured",
        ));
        let ctx = AgentContext::new(AgentConfig::default(), provider);

        let result = run_scoring_agent(&ctx, &SCHEMA, "doc").await;
        assert_eq!(result.details, "Analysis completed with default scores");
        assert!(
            result
                .diagnostic
                .as_deref()
                .unwrap()
                .contains("GIGACHAT_API_KEY")
        );
    }
}

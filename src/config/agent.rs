//! Per-agent configuration and its precedence chain
//!
//! Resolution order for one agent: persisted override (when active) →
//! packaged YAML default → hardcoded fallback. Resolution never fails; a
//! broken source is logged and skipped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use super::types::LlmConfig;
use crate::constants::agent::{
    ANALYSIS_PROMPT_KEY, FALLBACK_MAX_TOKENS, FALLBACK_MODEL, FALLBACK_SYSTEM_PROMPT,
    FALLBACK_TEMPERATURE,
};
use crate::types::{AgentId, Result, ScoreError};

/// Resolved settings for one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub model: String,
    pub system_prompt: String,
    /// Named prompt templates; `analysis_prompt` overrides the built-in one
    pub prompts: BTreeMap<String, String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Persisted overrides are ignored while inactive
    pub is_active: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: FALLBACK_MODEL.to_string(),
            system_prompt: FALLBACK_SYSTEM_PROMPT.to_string(),
            prompts: BTreeMap::new(),
            temperature: FALLBACK_TEMPERATURE,
            max_tokens: FALLBACK_MAX_TOKENS,
            is_active: true,
        }
    }
}

impl AgentConfig {
    /// Hardcoded fallback with the gateway's configured model settings
    pub fn from_llm_defaults(llm: &LlmConfig) -> Self {
        Self {
            model: llm.model.clone(),
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
            ..Self::default()
        }
    }

    pub fn prompt(&self, name: &str) -> Option<&str> {
        self.prompts.get(name).map(String::as_str)
    }

    /// Configured analysis template, if any
    pub fn analysis_prompt(&self) -> Option<&str> {
        self.prompt(ANALYSIS_PROMPT_KEY)
    }
}

// =============================================================================
// Sources
// =============================================================================

/// One layer of the precedence chain
pub trait AgentConfigSource: Send + Sync {
    /// Source name for logs and `agents show`
    fn name(&self) -> &str;

    /// Configuration for `agent`, or `None` when this source has none
    fn load(&self, agent: AgentId) -> Result<Option<AgentConfig>>;
}

/// `<dir>/<agent_id>.yaml` files shipped with the tool
#[derive(Debug, Clone)]
pub struct PackagedDefaults {
    dir: PathBuf,
}

impl PackagedDefaults {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, agent: AgentId) -> PathBuf {
        self.dir.join(format!("{}.yaml", agent))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl AgentConfigSource for PackagedDefaults {
    fn name(&self) -> &str {
        "packaged"
    }

    fn load(&self, agent: AgentId) -> Result<Option<AgentConfig>> {
        let path = self.path_for(agent);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        let config: AgentConfig = serde_yaml::from_str(&raw).map_err(|e| {
            ScoreError::Config(format!("Invalid agent config {}: {}", path.display(), e))
        })?;
        Ok(Some(config))
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Where a resolved configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    Source(String),
    Fallback,
}

impl std::fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigOrigin::Source(name) => f.write_str(name),
            ConfigOrigin::Fallback => f.write_str("fallback"),
        }
    }
}

pub struct AgentConfigResolver {
    sources: Vec<Arc<dyn AgentConfigSource>>,
    fallback: AgentConfig,
}

impl Default for AgentConfigResolver {
    fn default() -> Self {
        Self::new(AgentConfig::default())
    }
}

impl AgentConfigResolver {
    pub fn new(fallback: AgentConfig) -> Self {
        Self {
            sources: Vec::new(),
            fallback,
        }
    }

    /// Append a source; earlier sources take precedence
    pub fn with_source(mut self, source: Arc<dyn AgentConfigSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn resolve(&self, agent: AgentId) -> AgentConfig {
        self.resolve_with_origin(agent).0
    }

    pub fn resolve_with_origin(&self, agent: AgentId) -> (AgentConfig, ConfigOrigin) {
        for source in &self.sources {
            match source.load(agent) {
                Ok(Some(config)) => {
                    debug!("{}: config from {}", agent, source.name());
                    return (config, ConfigOrigin::Source(source.name().to_string()));
                }
                Ok(None) => {}
                Err(e) => warn!("{}: skipping {} config source: {}", agent, source.name(), e),
            }
        }
        debug!("{}: using fallback config", agent);
        (self.fallback.clone(), ConfigOrigin::Fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixed(Option<AgentConfig>);

    impl AgentConfigSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn load(&self, _agent: AgentId) -> Result<Option<AgentConfig>> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    impl AgentConfigSource for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn load(&self, _agent: AgentId) -> Result<Option<AgentConfig>> {
            Err(ScoreError::Storage("db locked".to_string()))
        }
    }

    #[test]
    fn test_fallback_values() {
        let (config, origin) = AgentConfigResolver::default().resolve_with_origin(AgentId::TeamAnalyzer);
        assert_eq!(origin, ConfigOrigin::Fallback);
        assert_eq!(config.model, "GigaChat-Pro");
        assert_eq!(
            config.system_prompt,
            "You are an AI assistant analyzing startup pitches."
        );
        assert!(config.prompts.is_empty());
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 2000);
    }

    #[test]
    fn test_packaged_yaml_partial_fields() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("market_analyzer.yaml"),
            "system_prompt: You are a market analyst.\ntemperature: 0.3\nprompts:\n  analysis_prompt: \"Market: {text}\"\n",
        )
        .unwrap();

        let packaged = PackagedDefaults::new(dir.path());
        let config = packaged.load(AgentId::MarketAnalyzer).unwrap().unwrap();
        assert_eq!(config.system_prompt, "You are a market analyst.");
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.model, "GigaChat-Pro");
        assert_eq!(config.analysis_prompt(), Some("Market: {text}"));

        assert!(packaged.load(AgentId::TeamAnalyzer).unwrap().is_none());
    }

    #[test]
    fn test_precedence_and_broken_source() {
        let persisted = AgentConfig {
            model: "GigaChat-Max".to_string(),
            ..AgentConfig::default()
        };
        let packaged = AgentConfig {
            model: "GigaChat-Lite".to_string(),
            ..AgentConfig::default()
        };

        let resolver = AgentConfigResolver::default()
            .with_source(Arc::new(Broken))
            .with_source(Arc::new(Fixed(Some(persisted))))
            .with_source(Arc::new(Fixed(Some(packaged))));
        assert_eq!(resolver.resolve(AgentId::RiskPredictor).model, "GigaChat-Max");

        let resolver = AgentConfigResolver::default()
            .with_source(Arc::new(Fixed(None)))
            .with_source(Arc::new(Fixed(Some(AgentConfig {
                model: "GigaChat-Lite".to_string(),
                ..AgentConfig::default()
            }))));
        assert_eq!(resolver.resolve(AgentId::RiskPredictor).model, "GigaChat-Lite");
    }

    #[test]
    fn test_invalid_yaml_falls_through() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("text_analyzer.yaml"), "temperature: [not a number").unwrap();

        let resolver = AgentConfigResolver::default()
            .with_source(Arc::new(PackagedDefaults::new(dir.path())));
        let (config, origin) = resolver.resolve_with_origin(AgentId::TextAnalyzer);
        assert_eq!(origin, ConfigOrigin::Fallback);
        assert_eq!(config, AgentConfig::default());
    }

    #[test]
    fn test_shipped_agent_files_parse() {
        let packaged = PackagedDefaults::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("agents"));
        for id in AgentId::ALL {
            let config = packaged
                .load(id)
                .unwrap()
                .unwrap_or_else(|| panic!("missing agents/{}.yaml", id));
            assert!(config.is_active);
            assert!(!config.system_prompt.is_empty());
            assert!((0.0..=2.0).contains(&config.temperature));
        }
    }

    #[test]
    fn test_from_llm_defaults() {
        let llm = LlmConfig {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 800,
            ..LlmConfig::default()
        };
        let config = AgentConfig::from_llm_defaults(&llm);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_tokens, 800);
        assert_eq!(config.system_prompt, FALLBACK_SYSTEM_PROMPT);
    }
}

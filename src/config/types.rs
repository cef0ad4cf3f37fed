//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global ($XDG_CONFIG_HOME/pitchscore/) and project (.pitchscore/)
//! level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::agent::{FALLBACK_MAX_TOKENS, FALLBACK_MODEL, FALLBACK_TEMPERATURE};
use crate::constants::network::{DEFAULT_TIMEOUT_SECS, GIGACHAT_AUTH_URL, GIGACHAT_SCOPE};
use crate::types::{Result, ScoreError};

const SUPPORTED_PROVIDERS: [&str; 2] = ["gigachat", "openai"];

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Language-model gateway settings
    pub llm: LlmConfig,

    /// Agent and scoring settings
    pub scoring: ScoringConfig,

    /// Persistence settings
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            scoring: ScoringConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ScoreError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(ScoreError::Config(format!(
                "Unknown LLM provider '{}'. Supported: {}",
                self.llm.provider,
                SUPPORTED_PROVIDERS.join(", ")
            )));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ScoreError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ScoreError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.max_tokens == 0 {
            return Err(ScoreError::Config(
                "LLM max_tokens must be greater than 0".to_string(),
            ));
        }

        if let Some(api_base) = &self.llm.api_base {
            validate_http_url("llm.api_base", api_base)?;
        }
        validate_http_url("llm.auth_url", &self.llm.auth_url)?;

        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| ScoreError::Config(format!("{} is not a valid URL '{}': {}", field, value, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ScoreError::Config(format!(
            "{} must use http or https, got '{}'",
            field, other
        ))),
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

/// Gateway settings.
///
/// `model`, `temperature` and `max_tokens` are the last-resort agent settings,
/// used when neither a persisted override nor a packaged default exists.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider: "gigachat" or "openai"
    pub provider: String,

    pub model: String,

    /// Chat API base URL (provider default when unset)
    pub api_base: Option<String>,

    /// OAuth endpoint for GigaChat token exchange
    pub auth_url: String,

    /// OAuth scope for GigaChat token exchange
    pub scope: String,

    /// Request timeout in seconds. Agents get this plus the token exchange time.
    pub timeout_secs: u64,

    pub temperature: f32,

    pub max_tokens: u32,

    /// Never serialized; set via PITCHSCORE_LLM_API_KEY, falls back to
    /// GIGACHAT_API_KEY / OPENAI_API_KEY
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Skip TLS certificate verification (GigaChat ships a private CA)
    pub accept_invalid_certs: bool,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("auth_url", &self.auth_url)
            .field("scope", &self.scope)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gigachat".to_string(),
            model: FALLBACK_MODEL.to_string(),
            api_base: None,
            auth_url: GIGACHAT_AUTH_URL.to_string(),
            scope: GIGACHAT_SCOPE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: FALLBACK_TEMPERATURE,
            max_tokens: FALLBACK_MAX_TOKENS,
            api_key: None,
            accept_invalid_certs: false,
        }
    }
}

// =============================================================================
// Scoring Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Directory holding packaged `<agent_id>.yaml` defaults
    pub agents_dir: PathBuf,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            agents_dir: PathBuf::from("agents"),
        }
    }
}

// =============================================================================
// Storage Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(".pitchscore/pitchscore.db"),
        }
    }
}

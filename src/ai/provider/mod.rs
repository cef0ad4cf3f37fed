//! Language-Model Gateway
//!
//! Defines the `LlmProvider` trait: a system+user prompt pair in, raw model
//! text out, or a typed `LlmError`. Adapters own authentication and sessions;
//! callers never see credentials.
//!
//! ## Modules
//!
//! - `gigachat`: GigaChat with OAuth token exchange and caching
//! - `openai`: any OpenAI-compatible chat-completions endpoint

mod chat;
mod gigachat;
mod openai;
#[cfg(test)]
pub(crate) mod scripted;

pub use gigachat::GigaChatProvider;
pub use openai::OpenAiProvider;

pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::types::{Result, ScoreError};

// =============================================================================
// Request / Response
// =============================================================================

/// One completion call: exactly what an agent hands the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Raw model reply with usage metrics
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text, unparsed
    pub content: String,
    pub usage: TokenUsage,
    pub timing: ResponseTiming,
    pub metadata: ResponseMetadata,
}

impl LlmResponse {
    /// Response with content only (usage unknown)
    pub fn content_only(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage::default(),
            timing: ResponseTiming::default(),
            metadata: ResponseMetadata::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseTiming {
    /// Wall clock time in milliseconds
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    pub model: String,
    pub provider: String,
}

/// Shared provider handle; agents hold clones and call concurrently.
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// LLM Provider Trait
// =============================================================================

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one system+user prompt pair and return the raw reply
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Check if the provider is reachable with the configured credentials
    async fn health_check(&self) -> Result<bool>;
}

/// Create a shared provider from configuration
pub fn create_provider(config: &LlmConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "gigachat" => Ok(Arc::new(GigaChatProvider::new(config)?)),
        "openai" => Ok(Arc::new(OpenAiProvider::new(config)?)),
        other => Err(ScoreError::Config(format!(
            "Unknown provider: {}. Supported: gigachat, openai",
            other
        ))),
    }
}

//! OpenAI-compatible Provider
//!
//! Bearer API key against any endpoint speaking the chat-completions API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{info, warn};

use super::chat::{build_client, send_chat};
use super::{CompletionRequest, LlmProvider, LlmResponse};
use crate::config::LlmConfig;
use crate::types::{ErrorCategory, LlmError, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const PROVIDER: &str = "openai";
const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub struct OpenAiProvider {
    /// Never exposed in logs or debug output
    api_key: Option<SecretString>,
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);

        Ok(Self {
            api_key,
            api_base: config
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            client: build_client(
                Duration::from_secs(config.timeout_secs),
                config.accept_invalid_certs,
            )?,
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret())
            .ok_or_else(|| {
                LlmError::with_provider(
                    ErrorCategory::Auth,
                    format!("API key not found. Set {} or llm.api_key", API_KEY_ENV),
                    PROVIDER,
                )
                .into()
            })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse> {
        let key = self.api_key()?;
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        send_chat(&self.client, &url, key, request, PROVIDER).await
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    async fn health_check(&self) -> Result<bool> {
        let key = match self.api_key() {
            Ok(k) => k,
            Err(e) => {
                warn!("OpenAI API check failed: {}", e);
                return Ok(false);
            }
        };
        let url = format!("{}/models", self.api_base.trim_end_matches('/'));

        match self.client.get(&url).bearer_auth(key).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("OpenAI API is available");
                Ok(true)
            }
            Ok(resp) => {
                warn!("OpenAI API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("OpenAI API check failed: {}", e);
                Ok(false)
            }
        }
    }
}

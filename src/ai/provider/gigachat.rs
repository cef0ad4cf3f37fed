//! GigaChat Provider
//!
//! Credentials are either a ready access token (`R-...`) or the base64
//! authorization key issued for OAuth. In the latter case an access token is
//! exchanged at `auth_url` and cached until shortly before it expires.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::chat::{build_client, send_chat};
use super::{CompletionRequest, LlmProvider, LlmResponse};
use crate::config::LlmConfig;
use crate::constants::network::{AUTH_TIMEOUT_SECS, GIGACHAT_API_BASE, TOKEN_REFRESH_MARGIN_SECS};
use crate::types::{ErrorCategory, ErrorClassifier, LlmError, Result, preview};

const PROVIDER: &str = "gigachat";
const API_KEY_ENV: &str = "GIGACHAT_API_KEY";
const ACCESS_TOKEN_PREFIX: &str = "R-";
/// Lifetime assumed when the OAuth reply omits `expires_at`
const DEFAULT_TOKEN_TTL_MINS: i64 = 30;

struct AccessToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + ChronoDuration::seconds(TOKEN_REFRESH_MARGIN_SECS) < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Unix epoch milliseconds
    expires_at: Option<i64>,
}

pub struct GigaChatProvider {
    credentials: Option<SecretString>,
    api_base: String,
    auth_url: String,
    scope: String,
    client: reqwest::Client,
    auth_client: reqwest::Client,
    token: Mutex<Option<AccessToken>>,
}

impl std::fmt::Debug for GigaChatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GigaChatProvider")
            .field("credentials", &self.credentials.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("auth_url", &self.auth_url)
            .field("scope", &self.scope)
            .finish()
    }
}

impl GigaChatProvider {
    /// Build the adapter. Missing credentials are reported per call, not here.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let credentials = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);

        Ok(Self {
            credentials,
            api_base: config
                .api_base
                .clone()
                .unwrap_or_else(|| GIGACHAT_API_BASE.to_string()),
            auth_url: config.auth_url.clone(),
            scope: config.scope.clone(),
            client: build_client(
                Duration::from_secs(config.timeout_secs),
                config.accept_invalid_certs,
            )?,
            auth_client: build_client(
                Duration::from_secs(AUTH_TIMEOUT_SECS),
                config.accept_invalid_certs,
            )?,
            token: Mutex::new(None),
        })
    }

    fn credentials(&self) -> Result<&SecretString> {
        self.credentials.as_ref().ok_or_else(|| {
            LlmError::with_provider(
                ErrorCategory::Auth,
                format!("{} not configured (set llm.api_key or {})", API_KEY_ENV, API_KEY_ENV),
                PROVIDER,
            )
            .into()
        })
    }

    /// Bearer token for the chat call, exchanging credentials when needed
    async fn bearer(&self) -> Result<String> {
        let credentials = self.credentials()?;
        if credentials.expose_secret().starts_with(ACCESS_TOKEN_PREFIX) {
            return Ok(credentials.expose_secret().to_string());
        }

        // Held across the exchange so concurrent agents share one request
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && token.is_fresh(Utc::now())
        {
            return Ok(token.value.expose_secret().to_string());
        }

        let token = self.exchange(credentials).await?;
        let bearer = token.value.expose_secret().to_string();
        *cached = Some(token);
        Ok(bearer)
    }

    async fn exchange(&self, credentials: &SecretString) -> Result<AccessToken> {
        let key = credentials.expose_secret();
        let authorization = if key.starts_with("Basic ") {
            key.to_string()
        } else {
            format!("Basic {}", key)
        };
        let rq_uid = Uuid::new_v4().to_string();
        debug!("Requesting GigaChat access token (RqUID {})", rq_uid);

        let response = self
            .auth_client
            .post(&self.auth_url)
            .header("Authorization", authorization)
            .header("Accept", "application/json")
            .header("RqUID", rq_uid)
            .form(&[("scope", self.scope.as_str())])
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("GigaChat token exchange failed: HTTP {}", status);
            return Err(LlmError::with_provider(
                ErrorCategory::Auth,
                format!("Token exchange failed (HTTP {}): {}", status, preview(&body, 300)),
                PROVIDER,
            )
            .into());
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER))?;

        let expires_at = body
            .expires_at
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or_else(|| Utc::now() + ChronoDuration::minutes(DEFAULT_TOKEN_TTL_MINS));
        info!("GigaChat access token acquired, expires at {}", expires_at);

        Ok(AccessToken {
            value: SecretString::from(body.access_token),
            expires_at,
        })
    }
}

#[async_trait]
impl LlmProvider for GigaChatProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse> {
        let bearer = self.bearer().await?;
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        send_chat(&self.client, &url, &bearer, request, PROVIDER).await
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    async fn health_check(&self) -> Result<bool> {
        let bearer = match self.bearer().await {
            Ok(b) => b,
            Err(e) => {
                warn!("GigaChat auth check failed: {}", e);
                return Ok(false);
            }
        };
        let url = format!("{}/models", self.api_base.trim_end_matches('/'));
        match self.client.get(&url).bearer_auth(bearer).send().await {
            Ok(resp) if resp.status().is_success() => Ok(true),
            Ok(resp) => {
                warn!("GigaChat API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("GigaChat API check failed: {}", e);
                Ok(false)
            }
        }
    }
}

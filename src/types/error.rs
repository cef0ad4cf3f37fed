//! Unified Error Type System
//!
//! Centralized error types for the scoring engine.
//!
//! ## Error Categories
//!
//! Gateway failures are classified so that agent diagnostics say why a call
//! failed (auth, quota, network, ...). Classification never drives retries;
//! every gateway failure degrades to the agent's default result.
//!
//! Agent-level failures are recovered inside the agent and never surface as
//! a `ScoreError`.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Categories of Language-Model Gateway failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Quota or rate limiting
    RateLimit,
    /// Prompt too large for the model context
    TokenLimit,
    /// Missing or rejected credentials
    Auth,
    /// Connectivity issues or timeouts
    Network,
    /// Provider unavailable
    Unavailable,
    /// Request rejected as invalid
    BadRequest,
    /// Provider answered with something we could not read
    ParseError,
    /// Temporary server issues
    Transient,
    /// Anything else
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::TokenLimit => write!(f, "TOKEN_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Typed Language-Model Gateway failure carrying a cause string
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category
    pub category: ErrorCategory,
    /// Cause of the failure
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    /// Create error with provider context
    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Message fragments checked in order; the first category with a hit wins.
const MESSAGE_PATTERNS: &[(ErrorCategory, &[&str])] = &[
    (
        ErrorCategory::RateLimit,
        &["rate limit", "429", "too many requests", "quota exceeded"],
    ),
    (
        ErrorCategory::TokenLimit,
        &["context length", "too large", "maximum context", "tokens exceed"],
    ),
    (
        ErrorCategory::Auth,
        &["auth", "401", "403", "api key", "unauthorized", "certificate"],
    ),
    (
        ErrorCategory::Network,
        &["network", "connection", "dns", "timeout", "timed out", "unreachable"],
    ),
    (
        ErrorCategory::Unavailable,
        &["502", "503", "service unavailable", "internal error"],
    ),
    (
        ErrorCategory::BadRequest,
        &["400", "bad request", "malformed"],
    ),
    (ErrorCategory::ParseError, &["parse", "json", "decode"]),
    (ErrorCategory::Transient, &["temporary", "overloaded"]),
];

/// Maps raw gateway failures onto error categories
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify a free-form failure message
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();
        let category = MESSAGE_PATTERNS
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
            .map(|(category, _)| *category)
            .unwrap_or(ErrorCategory::Unknown);
        LlmError::with_provider(category, message, provider)
    }

    /// Classify a non-2xx HTTP status; falls back to the message text
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400 | 422 => ErrorCategory::BadRequest,
            413 => ErrorCategory::TokenLimit,
            404 => ErrorCategory::Unavailable,
            500..=504 => ErrorCategory::Transient,
            _ => return Self::classify(message, provider),
        };
        LlmError::with_provider(category, message, provider)
    }

    /// Classify a transport-level reqwest failure
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> LlmError {
        if err.is_timeout() || err.is_connect() {
            return LlmError::with_provider(ErrorCategory::Network, err.to_string(), provider);
        }
        if err.is_decode() {
            return LlmError::with_provider(ErrorCategory::ParseError, err.to_string(), provider);
        }
        if let Some(status) = err.status() {
            return Self::classify_http_status(status.as_u16(), &err.to_string(), provider);
        }
        Self::classify(&err.to_string(), provider)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ScoreError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // -------------------------------------------------------------------------
    // Gateway Errors
    // -------------------------------------------------------------------------
    /// Structured gateway error with category
    #[error("LLM error: {0}")]
    Llm(LlmError),

    /// Operation timeout with context
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not initialized: run 'pitchscore init' first")]
    NotInitialized,
}

impl From<LlmError> for ScoreError {
    fn from(err: LlmError) -> Self {
        ScoreError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, ScoreError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl ScoreError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Gateway category when this is a gateway failure
    pub fn llm_category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Llm(e) => Some(e.category),
            Self::Timeout { .. } => Some(ErrorCategory::Network),
            _ => None,
        }
    }
}

/// Context extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> Result<T>;

    /// Add context using a closure (lazy evaluation)
    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| ScoreError::Storage(format!("{}: {}", context.into(), e)))
    }

    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| ScoreError::Storage(format!("{}: {}", f().into(), e)))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::ParseError.to_string(), "PARSE_ERROR");
    }

    #[test]
    fn test_classify_messages() {
        let cases = [
            ("GigaChat quota exceeded for this month", ErrorCategory::RateLimit),
            ("Prompt exceeds maximum context length", ErrorCategory::TokenLimit),
            ("Invalid API key provided", ErrorCategory::Auth),
            ("Connection timed out after 30s", ErrorCategory::Network),
            ("model is overloaded", ErrorCategory::Transient),
            ("Something weird happened", ErrorCategory::Unknown),
        ];
        for (message, expected) in cases {
            let err = ErrorClassifier::classify(message, "gigachat");
            assert_eq!(err.category, expected, "{}", message);
            assert_eq!(err.provider.as_deref(), Some("gigachat"));
        }
    }

    #[test]
    fn test_classify_http_status() {
        let status = |code, msg| ErrorClassifier::classify_http_status(code, msg, "openai").category;
        assert_eq!(status(429, "slow down"), ErrorCategory::RateLimit);
        assert_eq!(status(401, "Unauthorized"), ErrorCategory::Auth);
        assert_eq!(status(503, "busy"), ErrorCategory::Transient);
        assert_eq!(status(418, "certificate rejected"), ErrorCategory::Auth);
        assert_eq!(status(418, "teapot"), ErrorCategory::Unknown);
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::with_provider(ErrorCategory::Auth, "missing API key", "gigachat");
        assert_eq!(err.to_string(), "[gigachat:AUTH] missing API key");
        assert_eq!(
            LlmError::new(ErrorCategory::Network, "unreachable").to_string(),
            "[NETWORK] unreachable"
        );
    }

    #[test]
    fn test_llm_category() {
        let err = ScoreError::from(LlmError::new(ErrorCategory::Auth, "no key"));
        assert_eq!(err.llm_category(), Some(ErrorCategory::Auth));
        assert_eq!(
            ScoreError::timeout("call", Duration::from_secs(1)).llm_category(),
            Some(ErrorCategory::Network)
        );
        assert_eq!(ScoreError::NotInitialized.llm_category(), None);
    }
}

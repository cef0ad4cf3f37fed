//! Global Constants
//!
//! Centralized constants for scoring and gateway tuning.

/// Scoring pipeline constants
pub mod scoring {
    /// Neutral score used whenever an agent cannot produce one
    pub const DEFAULT_SCORE: f64 = 50.0;

    /// Lower bound of every score
    pub const MIN_SCORE: f64 = 0.0;

    /// Upper bound of every score
    pub const MAX_SCORE: f64 = 100.0;

    /// Categories strictly below this score get a recommendation
    pub const RECOMMENDATION_THRESHOLD: f64 = 60.0;

    /// Maximum number of ranked risks in a report
    pub const MAX_RISKS: usize = 5;

    /// Maximum number of recommendations in a report
    pub const MAX_RECOMMENDATIONS: usize = 5;
}

/// Agent defaults
pub mod agent {
    /// Prompt key holding the analysis template
    pub const ANALYSIS_PROMPT_KEY: &str = "analysis_prompt";

    /// Placeholder replaced by the document text
    pub const TEXT_PLACEHOLDER: &str = "{text}";

    /// `details` of a decoded response that omitted it
    pub const DETAILS_DEFAULT: &str = "Analysis completed";

    /// `details` of a result produced without a usable response
    pub const DETAILS_FALLBACK: &str = "Analysis completed with default scores";

    /// Default for free-text fields
    pub const NOT_SPECIFIED: &str = "Not specified";

    /// Hardcoded fallback model
    pub const FALLBACK_MODEL: &str = "GigaChat-Pro";

    /// Hardcoded fallback system prompt
    pub const FALLBACK_SYSTEM_PROMPT: &str = "You are an AI assistant analyzing startup pitches.";

    /// Hardcoded fallback temperature
    pub const FALLBACK_TEMPERATURE: f32 = 0.7;

    /// Hardcoded fallback completion budget
    pub const FALLBACK_MAX_TOKENS: u32 = 2000;
}

/// HTTP/Network constants
pub mod network {
    /// Default gateway request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// OAuth token request timeout (seconds)
    pub const AUTH_TIMEOUT_SECS: u64 = 10;

    /// GigaChat chat API base URL
    pub const GIGACHAT_API_BASE: &str = "https://gigachat.devices.sberbank.ru/api/v1";

    /// GigaChat OAuth endpoint
    pub const GIGACHAT_AUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";

    /// GigaChat OAuth scope for personal API access
    pub const GIGACHAT_SCOPE: &str = "GIGACHAT_API_PERS";

    /// Refresh cached access tokens this long before they expire (seconds)
    pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;
}

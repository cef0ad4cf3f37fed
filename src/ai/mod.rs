//! AI Integration Layer
//!
//! Language-model gateway adapters, timeouts and response decoding.

pub mod provider;
pub mod timeout;
pub mod validation;

pub use provider::{
    CompletionRequest, ErrorCategory, ErrorClassifier, GigaChatProvider, LlmError, LlmProvider,
    LlmResponse, OpenAiProvider, ResponseMetadata, ResponseTiming, SharedProvider, TokenUsage,
    create_provider,
};
pub use timeout::with_timeout_map;
pub use validation::{JsonRepairer, decode_object, extract_json_from_response};

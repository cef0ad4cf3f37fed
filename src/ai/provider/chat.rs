//! Chat-completions wire format shared by both adapters

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use super::{CompletionRequest, LlmResponse, ResponseMetadata, ResponseTiming, TokenUsage};
use crate::types::{ErrorCategory, ErrorClassifier, LlmError, Result, preview};

#[derive(Debug, Serialize)]
pub(super) struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a CompletionRequest> for ChatCompletionRequest<'a> {
    fn from(req: &'a CompletionRequest) -> Self {
        Self {
            model: &req.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &req.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &req.user_prompt,
                },
            ],
            temperature: req.temperature,
            max_tokens: req.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Build a reqwest client with the given timeout
pub(super) fn build_client(timeout: Duration, accept_invalid_certs: bool) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .map_err(|e| {
            LlmError::new(
                ErrorCategory::Unknown,
                format!("Failed to create HTTP client: {}", e),
            )
            .into()
        })
}

/// POST one chat-completions request and return the first choice's text
pub(super) async fn send_chat(
    client: &reqwest::Client,
    url: &str,
    bearer: &str,
    request: &CompletionRequest,
    provider: &str,
) -> Result<LlmResponse> {
    let start = Instant::now();
    debug!(
        "{} request: model={}, prompt={} chars",
        provider,
        request.model,
        request.user_prompt.chars().count()
    );

    let response = client
        .post(url)
        .bearer_auth(bearer)
        .header("Accept", "application/json")
        .json(&ChatCompletionRequest::from(request))
        .send()
        .await
        .map_err(|e| ErrorClassifier::classify_transport(&e, provider))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ErrorClassifier::classify_http_status(
            status.as_u16(),
            &format!("HTTP {}: {}", status, preview(&body, 300)),
            provider,
        )
        .into());
    }

    let body: ChatCompletionResponse = response
        .json()
        .await
        .map_err(|e| ErrorClassifier::classify_transport(&e, provider))?;

    let usage = body
        .usage
        .map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    let content = body
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| {
            LlmError::with_provider(ErrorCategory::ParseError, "No content in response", provider)
        })?;

    debug!(
        "{} response: {} chars, {} tokens",
        provider,
        content.chars().count(),
        usage.total()
    );

    Ok(LlmResponse {
        content,
        usage,
        timing: ResponseTiming::from_duration(start.elapsed()),
        metadata: ResponseMetadata {
            model: body.model.unwrap_or_else(|| request.model.clone()),
            provider: provider.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let req = CompletionRequest {
            system_prompt: "sys".to_string(),
            user_prompt: "user".to_string(),
            model: "GigaChat-Pro".to_string(),
            temperature: 0.5,
            max_tokens: 2000,
        };
        let json = serde_json::to_value(ChatCompletionRequest::from(&req)).unwrap();
        assert_eq!(json["model"], "GigaChat-Pro");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "user");
        assert_eq!(json["max_tokens"], 2000);
    }

    #[test]
    fn test_response_parses_minimal_body() {
        let body: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "{}"}}]}"#,
        )
        .unwrap();
        assert!(body.usage.is_none());
        assert_eq!(body.choices[0].message.content.as_deref(), Some("{}"));
    }
}

//! Scripted provider for tests: canned replies keyed by prompt content

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{CompletionRequest, LlmProvider, LlmResponse};
use crate::types::{ErrorCategory, LlmError, Result};

enum Reply {
    Text(String),
    Fail(ErrorCategory, String),
    Hang(Duration),
}

struct Rule {
    needle: String,
    reply: Reply,
}

/// Matches the user prompt against registered substrings in order.
/// Prompts matching no rule fail with a network error.
#[derive(Default)]
pub struct ScriptedProvider {
    rules: Vec<Rule>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that fails every call
    pub fn failing() -> Self {
        Self::new()
    }

    pub fn reply(mut self, needle: &str, text: impl Into<String>) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            reply: Reply::Text(text.into()),
        });
        self
    }

    pub fn fail(mut self, needle: &str, category: ErrorCategory, message: &str) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            reply: Reply::Fail(category, message.to_string()),
        });
        self
    }

    pub fn hang(mut self, needle: &str, duration: Duration) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            reply: Reply::Hang(duration),
        });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }

        let rule = self
            .rules
            .iter()
            .find(|r| request.user_prompt.contains(&r.needle));

        match rule.map(|r| &r.reply) {
            Some(Reply::Text(text)) => Ok(LlmResponse::content_only(text.clone())),
            Some(Reply::Fail(category, message)) => {
                Err(LlmError::with_provider(*category, message.clone(), "scripted").into())
            }
            Some(Reply::Hang(duration)) => {
                tokio::time::sleep(*duration).await;
                Ok(LlmResponse::content_only("{}"))
            }
            None => Err(LlmError::with_provider(
                ErrorCategory::Network,
                "connection refused",
                "scripted",
            )
            .into()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

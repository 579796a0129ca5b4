use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;
use url::Url;

// =============================================================================
// Chat messages
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion response contained no message content")]
    EmptyResponse,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("scripted backend has no replies left")]
    ScriptExhausted,
}

/// Anything that can turn a conversation into the assistant's next reply.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, BackendError>;
}

// =============================================================================
// OpenAI-compatible HTTP backend
// =============================================================================

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiBackend {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl OpenAiBackend {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, BackendError> {
        let endpoint = chat_endpoint(base_url)?;
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key: api_key.into(),
        })
    }
}

/// `{base_url}/chat/completions`, whether or not the base ends in a slash.
pub fn chat_endpoint(base_url: &str) -> Result<Url, BackendError> {
    let invalid = |reason: String| BackendError::InvalidUrl {
        url: base_url.to_string(),
        reason,
    };
    let mut base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".into()));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("chat/completions").map_err(|e| invalid(e.to_string()))
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<String, BackendError> {
        let body: Value = json!({
            "model": request.model,
            "messages": request.messages,
            "response_format": {"type": "json_object"},
        });

        tracing::debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            "sending chat completion"
        );
        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(BackendError::EmptyResponse)
    }
}

// =============================================================================
// Scripted backend
// =============================================================================

/// Replays canned replies in order and records every request it saw.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedBackend {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<String, BackendError> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .ok_or(BackendError::ScriptExhausted)
    }
}

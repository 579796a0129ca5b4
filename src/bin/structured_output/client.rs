use crate::backend::{BackendError, ChatRequest, CompletionBackend, Message};
use crate::models::{ResponseModel, ValidationError};
use crate::retry::RetryPolicy;
use std::sync::Arc;
use thiserror::Error;

/// Why a single reply was rejected.
#[derive(Error, Debug)]
pub enum ReplyError {
    #[error("reply is not valid JSON for {model}: {source}")]
    Parse {
        model: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Every attempt was rejected.
#[derive(Error, Debug)]
#[error("gave up after {attempts} attempt(s): {last_error}")]
pub struct RetryError {
    pub attempts: usize,
    /// Full conversation, including every rejected reply and correction.
    pub messages: Vec<Message>,
    pub last_completion: Option<String>,
    pub last_error: String,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Retry(#[from] RetryError),
}

/// Parses the reply as `T` and runs its validators. Tolerates a fenced
/// ```json block around the object.
pub fn parse_reply<T: ResponseModel>(reply: &str) -> Result<T, ReplyError> {
    let parsed: T =
        serde_json::from_str(strip_code_fence(reply)).map_err(|source| ReplyError::Parse {
            model: T::name(),
            source,
        })?;
    parsed.validate()?;
    Ok(parsed)
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// System prompt describing the expected JSON object.
pub fn schema_prompt<T: ResponseModel>() -> String {
    format!(
        "You extract structured data. Reply with a single JSON object for `{}` ({}) \
         matching this JSON schema:\n{}",
        T::name(),
        T::description(),
        T::json_schema()
    )
}

#[derive(Clone)]
pub struct StructuredClient {
    backend: Arc<dyn CompletionBackend>,
}

impl StructuredClient {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Asks for a `T` until a reply parses and validates or the policy stops.
    ///
    /// Rejected replies are fed back to the model with the error text.
    /// Backend failures are returned immediately.
    pub async fn create<T: ResponseModel>(
        &self,
        model: &str,
        messages: Vec<Message>,
        policy: &RetryPolicy,
    ) -> Result<T, ClientError> {
        let mut conversation = Vec::with_capacity(messages.len() + 1);
        conversation.push(Message::system(schema_prompt::<T>()));
        conversation.extend(messages);

        let max_attempts = policy.max_attempts();
        let mut last_completion = None;
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            tracing::info!(attempt, max_attempts, response_model = T::name(), "before attempt");

            let request = ChatRequest {
                model: model.to_string(),
                messages: conversation.clone(),
            };
            let completion = self.backend.complete(&request).await?;

            match parse_reply::<T>(&completion) {
                Ok(value) => {
                    tracing::info!(attempt, response_model = T::name(), "after attempt: accepted");
                    return Ok(value);
                }
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "after attempt: rejected");
                    conversation.push(Message::assistant(completion.clone()));
                    conversation.push(Message::user(format!(
                        "Please correct the function call; errors encountered:\n{}",
                        err
                    )));
                    last_completion = Some(completion);
                    last_error = err.to_string();
                }
            }

            if attempt < max_attempts {
                let delay = policy.delay_after(attempt, &mut rand::thread_rng());
                if !delay.is_zero() {
                    tracing::debug!(?delay, "waiting before next attempt");
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(RetryError {
            attempts: max_attempts,
            messages: conversation,
            last_completion,
            last_error,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Role, ScriptedBackend};
    use crate::models::{RejectingUser, UserDetail, UserResponse};
    use crate::retry::Wait;
    use std::time::{Duration, Instant};

    fn client_with(replies: &[&str]) -> (StructuredClient, Arc<ScriptedBackend>) {
        let backend = Arc::new(ScriptedBackend::new(replies.iter().copied()));
        (StructuredClient::new(backend.clone()), backend)
    }

    fn ask() -> Vec<Message> {
        vec![Message::user("Extract jason is 25 years old")]
    }

    #[test]
    fn test_parse_reply_strips_fence() {
        let user: UserResponse =
            parse_reply("```json\n{\"name\": \"Jason\", \"age\": 25}\n```").unwrap();
        assert_eq!(user.age, 25);
    }

    #[test]
    fn test_parse_reply_reports_bad_json() {
        let err = parse_reply::<UserResponse>("Jason, 25").unwrap_err();
        assert!(matches!(err, ReplyError::Parse { model: "UserResponse", .. }));
    }

    #[test]
    fn test_schema_prompt_mentions_model() {
        let prompt = schema_prompt::<UserDetail>();
        assert!(prompt.contains("UserDetail"));
        assert!(prompt.contains("\"age\""));
    }

    #[tokio::test]
    async fn test_first_valid_reply_wins() {
        let (client, backend) = client_with(&[r#"{"name": "Jason", "age": 25}"#]);
        let user: UserResponse = client
            .create("gpt-3.5-turbo", ask(), &RetryPolicy::max_retries(3))
            .await
            .unwrap();
        assert_eq!(user, UserResponse { name: "Jason".into(), age: 25 });

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages[0].role, Role::System);
        assert_eq!(requests[0].model, "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn test_validation_failure_is_fed_back() {
        let (client, backend) = client_with(&[
            r#"{"name": "jason", "age": 25}"#,
            r#"{"name": "JASON", "age": 25}"#,
        ]);
        let user: UserDetail = client
            .create("gpt-3.5-turbo", ask(), &RetryPolicy::max_retries(3))
            .await
            .unwrap();
        assert_eq!(user.name, "JASON");

        let second = &backend.requests()[1];
        let n = second.messages.len();
        assert_eq!(second.messages[n - 2], Message::assistant(r#"{"name": "jason", "age": 25}"#));
        assert_eq!(second.messages[n - 1].role, Role::User);
        assert!(second.messages[n - 1].content.contains("Name must be ALL CAPS"));
    }

    #[tokio::test]
    async fn test_exhaustion_returns_retry_error() {
        let (client, backend) = client_with(&[
            r#"{"name": "Jason", "age": 25}"#,
            r#"{"name": "Jason", "age": 26}"#,
        ]);
        let err = client
            .create::<RejectingUser>("gpt-3.5-turbo", ask(), &RetryPolicy::stop_after_attempt(2))
            .await
            .unwrap_err();

        match err {
            ClientError::Retry(retry) => {
                assert_eq!(retry.attempts, 2);
                assert_eq!(
                    retry.last_completion.as_deref(),
                    Some(r#"{"name": "Jason", "age": 26}"#)
                );
                assert!(retry.last_error.contains("Invalid age: 26"));
                // system + user + 2 * (assistant + correction)
                assert_eq!(retry.messages.len(), 6);
            }
            other => panic!("expected retry error, got {:?}", other),
        }
        assert_eq!(backend.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_backend_error_is_not_retried() {
        let (client, backend) = client_with(&[]);
        let err = client
            .create::<UserResponse>("gpt-3.5-turbo", ask(), &RetryPolicy::max_retries(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Backend(BackendError::ScriptExhausted)));
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_fixed_wait_between_attempts() {
        let (client, _) = client_with(&["nope", r#"{"name": "Jason", "age": 25}"#]);
        let policy = RetryPolicy::stop_after_attempt(2).with_wait(Wait::Fixed { seconds: 0.05 });
        let started = Instant::now();
        let _: UserResponse = client.create("m", ask(), &policy).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
    }
}

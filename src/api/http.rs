//! reqwest-backed implementation of [`Backend`]
//!
//! Requests are resolved against a configurable base URL, so the client can
//! talk to a server mounted under a path prefix (`http://host/app/`) as
//! well as at the root. User ids are inserted as percent-encoded path
//! segments.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::{
    Backend, ChatRequest, ChatResponse, ConversationRecord, CreateUserRequest, Todo, TodoStats,
    User, UserId,
};
use crate::config::BackendConfig;
use crate::error::{self, ApiError, TodobotError};

/// HTTP client for the TodoBot backend
///
/// # Examples
///
/// ```no_run
/// use todobot::api::{Backend, HttpBackend};
/// use todobot::config::BackendConfig;
///
/// # async fn example() -> todobot::error::Result<()> {
/// let backend = HttpBackend::new(&BackendConfig::default())?;
/// let users = backend.list_users().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Build a client from backend configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL does not parse or the HTTP client
    /// cannot be constructed
    pub fn new(config: &BackendConfig) -> error::Result<Self> {
        Self::with_base_url(&config.base_url, config.timeout())
    }

    /// Build a client with an explicit base URL and optional timeout
    pub fn with_base_url(base_url: &str, timeout: Option<Duration>) -> error::Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            TodobotError::Config(format!("Invalid base URL '{}': {}", base_url, e))
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(TodobotError::Http)?;

        Ok(Self { client, base_url })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::Transport(format!("Base URL cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn user_endpoint(&self, user: &UserId, tail: &str) -> Result<Url, ApiError> {
        let id = user.to_string();
        self.endpoint(&["api", "users", &id, tail])
    }
}

// Failures are logged at debug only: they happen while the console shows
// the pending placeholder, and the session reports them to the operator.
fn transport_error(err: reqwest::Error) -> ApiError {
    tracing::debug!("Request to backend failed: {}", err);
    ApiError::Transport(err.to_string())
}

/// Turn a non-success response into `ApiError::Rejected`
///
/// The body is inspected for a string `detail` field; anything else
/// (empty body, plain text, validation error arrays) leaves it unset.
async fn rejection(response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::debug!("Backend returned error {}: {}", status, body);

    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string));

    ApiError::Rejected {
        status: status.as_u16(),
        detail,
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(rejection(response).await);
    }

    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!("Failed to parse backend response: {}", e);
        ApiError::Decode(e.to_string())
    })
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let url = self.endpoint(&["api", "users"])?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(transport_error)?;
        decode(response).await
    }

    async fn create_user(&self, name: &str) -> Result<User, ApiError> {
        let url = self.endpoint(&["api", "users"])?;
        tracing::debug!("POST {} name={}", url, name);

        let body = CreateUserRequest {
            name: name.to_string(),
        };
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn conversation_history(
        &self,
        user: &UserId,
    ) -> Result<Vec<ConversationRecord>, ApiError> {
        let url = self.user_endpoint(user, "conversations")?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(transport_error)?;
        decode(response).await
    }

    async fn chat(&self, user: &UserId, message: &str) -> Result<String, ApiError> {
        let url = self.user_endpoint(user, "chat")?;
        tracing::debug!("POST {} ({} chars)", url, message.len());

        let body = ChatRequest {
            user_id: user.clone(),
            message: message.to_string(),
        };
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let reply: ChatResponse = decode(response).await?;
        Ok(reply.response)
    }

    async fn todos(&self, user: &UserId) -> Result<Vec<Todo>, ApiError> {
        let url = self.user_endpoint(user, "todos")?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(transport_error)?;
        decode(response).await
    }

    async fn todo_stats(&self, user: &UserId) -> Result<TodoStats, ApiError> {
        let id = user.to_string();
        let url = self.endpoint(&["api", "users", &id, "todos", "stats"])?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(transport_error)?;
        decode(response).await
    }
}

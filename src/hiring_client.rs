use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Errors raised while talking to the hiring assistant server.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Reply to a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default)]
    pub conversation_ended: bool,
}

/// The server-side conversation, as seen by the controller.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send one user message and wait for the assistant's reply.
    async fn send_message(&self, message: &str) -> Result<ChatReply, TransportError>;

    /// Ask the server to drop the current conversation.
    async fn reset(&self) -> Result<(), TransportError>;
}

pub struct HiringClient {
    base_url: Url,
    client: reqwest::Client,
}

impl HiringClient {
    /// Create a client for the server at `base_url`.
    ///
    /// The server tracks the conversation in a session cookie, so the
    /// underlying client keeps a cookie store for its whole lifetime.
    pub fn new(base_url: Url) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()?;

        Ok(Self { base_url, client })
    }

    fn endpoint(&self, name: &str) -> Result<Url, TransportError> {
        Ok(self.base_url.join(name)?)
    }
}

#[async_trait]
impl ChatTransport for HiringClient {
    async fn send_message(&self, message: &str) -> Result<ChatReply, TransportError> {
        let url = self.endpoint("chat")?;
        debug!("Sending chat message to {}", url);

        let response = self.client.post(url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!("Chat request failed with status {}: {}", status, body);
            return Err(TransportError::Status { status, body });
        }

        debug!("Received chat reply: {}", body);

        Ok(serde_json::from_str(&body)?)
    }

    async fn reset(&self) -> Result<(), TransportError> {
        let url = self.endpoint("reset")?;
        debug!("Resetting conversation at {}", url);

        let response = self.client.post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Reset request failed with status {}: {}", status, body);
            return Err(TransportError::Status { status, body });
        }

        Ok(())
    }
}

use crate::{Message, MessageId};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Body posted downstream for every message. The downstream service keys its
/// idempotency on `Id`, since a message may be relayed more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RelayRequest {
    id: String,
    message: String,
}

impl RelayRequest {
    pub fn new(id: &MessageId, message: impl Into<String>) -> Self {
        Self {
            id: id.as_str().to_string(),
            message: message.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&Message> for RelayRequest {
    fn from(message: &Message) -> Self {
        RelayRequest::new(message.id(), message.body())
    }
}

/// Any relay failure leaves the message on the queue. Nothing here is retried
/// in place; the next poll and the queue's redelivery take care of that.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("downstream responded with status {0}")]
    Status(u16),

    #[error("relay transport error: {0}")]
    Transport(String),

    #[error("relay cancelled")]
    Cancelled,
}

#[async_trait]
pub trait MessageRelay: Send + Sync {
    async fn send(
        &self,
        request: &RelayRequest,
        cancel: &CancellationToken,
    ) -> Result<(), RelayError>;

    /// Where messages are sent, for log lines.
    fn target(&self) -> &str;
}

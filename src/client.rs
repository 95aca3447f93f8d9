use crate::{Message, MessageId, ReceiptHandle};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    // expected while the environment is still coming up
    #[error("queue '{0}' does not exist")]
    QueueUnavailable(String),

    // receipt expired, or the message is already gone
    #[error("message not found for the given receipt")]
    NotFound,

    // can be retried in a bit, like a network issue
    #[error("queue transport error: {0}")]
    Transport(String),

    // requires human intervention, like bad credentials
    #[error("unrecoverable queue error: {0}")]
    Unrecoverable(String),

    #[error("queue operation cancelled")]
    Cancelled,
}

// This trait abstracts away message retrieval and disposal. Implementations will
// need to know the concrete queue API. Both calls must give up with
// `QueueError::Cancelled` once `cancel` fires instead of blocking.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Waits up to `wait` for a single message. `Ok(None)` means the queue was
    /// empty, which is not an error.
    async fn receive(
        &self,
        wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<Message>, QueueError>;

    /// Removes the delivery identified by `receipt_handle`. The id is only used
    /// for correlation.
    async fn delete(
        &self,
        message_id: &MessageId,
        receipt_handle: &ReceiptHandle,
        cancel: &CancellationToken,
    ) -> Result<(), QueueError>;

    /// Name of the queue being drained, for log lines.
    fn queue_name(&self) -> &str;
}

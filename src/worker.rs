use crate::{Message, MessageRelay, QueueClient, QueueError, RelayError, RelayRequest};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Long-poll wait passed to every receive.
pub const DEFAULT_RECEIVE_WAIT: Duration = Duration::from_secs(20);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkerError {
    #[error("queue reader stopped: {0}")]
    Queue(#[from] QueueError),
}

/// How long the loop pauses before polling again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// After an empty receive.
    pub idle: Duration,
    /// While the queue does not exist yet.
    pub missing_queue: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            idle: Duration::from_secs(5),
            missing_queue: Duration::from_secs(10),
        }
    }
}

/// What the loop does after one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Next {
    Poll,
    Delay(Duration),
    Drain,
}

/// Drains one queue into one relay target, one message at a time. A message
/// is only deleted once the relay confirmed it, so delivery is at least once.
pub struct Worker {
    queue_client: Arc<dyn QueueClient>,
    relay: Arc<dyn MessageRelay>,
    receive_wait: Duration,
    backoff: Backoff,
}

impl Worker {
    pub fn new(queue_client: Arc<dyn QueueClient>, relay: Arc<dyn MessageRelay>) -> Self {
        Self {
            queue_client,
            relay,
            receive_wait: DEFAULT_RECEIVE_WAIT,
            backoff: Backoff::default(),
        }
    }

    pub fn with_receive_wait(mut self, receive_wait: Duration) -> Self {
        self.receive_wait = receive_wait;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Runs until `cancel` fires (`Ok`) or the queue reports an error that
    /// needs an operator (`Err`). Either way the caller should stop the process.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), WorkerError> {
        log::info!(
            "Waiting for messages on '{}'. Ready to send messages to '{}'.",
            self.queue_client.queue_name(),
            self.relay.target()
        );

        let res = self.poll_until_cancelled(&cancel).await;
        match &res {
            Ok(()) => log::info!("Queue reader is shutting down.."),
            Err(e) => log::error!("{e}. Queue reader is shutting down.."),
        }
        res
    }

    async fn poll_until_cancelled(&self, cancel: &CancellationToken) -> Result<(), WorkerError> {
        while !cancel.is_cancelled() {
            match self.poll_once(cancel).await? {
                Next::Poll => {}
                Next::Delay(delay) => {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Next::Drain => break,
            }
        }
        Ok(())
    }

    pub(crate) async fn poll_once(&self, cancel: &CancellationToken) -> Result<Next, WorkerError> {
        let received = self
            .queue_client
            .receive(self.receive_wait, cancel)
            .instrument(tracing::info_span!(
                "receive-message",
                queue = self.queue_client.queue_name()
            ))
            .await;

        match received {
            Ok(Some(message)) => self.process_message(message, cancel).await,
            Ok(None) => Ok(Next::Delay(self.backoff.idle)),
            Err(QueueError::QueueUnavailable(name)) => {
                log::info!("Queue '{name}' does not exist. Waiting..");
                Ok(Next::Delay(self.backoff.missing_queue))
            }
            Err(QueueError::Cancelled) => Ok(Next::Drain),
            Err(e @ QueueError::Unrecoverable(_)) => Err(e.into()),
            // no backoff here, a broken connection keeps logging as fast as
            // receive fails
            Err(e @ (QueueError::Transport(_) | QueueError::NotFound)) => {
                log::error!("Something went wrong connecting to the queue: {e}");
                Ok(Next::Poll)
            }
        }
    }

    async fn process_message(
        &self,
        message: Message,
        cancel: &CancellationToken,
    ) -> Result<Next, WorkerError> {
        log::info!(
            "Message ID: '{}', contents: '{}'",
            message.id(),
            message.body()
        );

        let request = RelayRequest::from(&message);
        let (message_id, receipt_handle, _) = message.into_parts();

        match self.relay.send(&request, cancel).await {
            Ok(()) => {}
            Err(RelayError::Cancelled) => {
                log::info!("Relay of message {message_id} cancelled, leaving it on the queue.");
                return Ok(Next::Drain);
            }
            Err(e) => {
                log::error!("Something went wrong writing message {message_id} to the store: {e}");
                return Ok(Next::Poll);
            }
        }

        match self
            .queue_client
            .delete(&message_id, &receipt_handle, cancel)
            .await
        {
            Ok(()) => {
                log::debug!("Relayed and deleted message {message_id}.");
                Ok(Next::Poll)
            }
            Err(QueueError::Cancelled) => Ok(Next::Drain),
            Err(e @ QueueError::Unrecoverable(_)) => Err(e.into()),
            Err(e) => {
                log::warn!("Failed to delete message {message_id}, it will be redelivered: {e}");
                Ok(Next::Poll)
            }
        }
    }
}

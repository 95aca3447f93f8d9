use crate::{Message, MessageId, QueueClient, QueueError, ReceiptHandle};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sqs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_sqs::Client;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

// SQS caps long polling at 20 seconds
const MAX_WAIT_SECONDS: u64 = 20;

// the json protocol reports the short code, query-compatible mode the legacy one
const MISSING_QUEUE_CODES: &[&str] = &[
    "QueueDoesNotExist",
    "AWS.SimpleQueueService.NonExistentQueue",
];
const INVALID_RECEIPT_CODES: &[&str] = &["ReceiptHandleIsInvalid", "InvalidIdFormat"];
const UNRECOVERABLE_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "InvalidClientTokenId",
    "MissingAuthenticationToken",
    "SignatureDoesNotMatch",
    "UnrecognizedClientException",
];

pub struct SqsQueueClient {
    sqs_client: Client,
    queue_name: String,
    // resolved lazily so a queue created after startup is picked up
    queue_url: Mutex<Option<String>>,
}

impl SqsQueueClient {
    /// Credentials and region come from the usual AWS environment chain, the
    /// endpoint from `endpoint_url`.
    pub async fn init(endpoint_url: impl Into<String>, queue_name: impl Into<String>) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(endpoint_url)
            .load()
            .await;
        Self::new(Client::new(&config), queue_name)
    }

    pub fn new(sqs_client: Client, queue_name: impl Into<String>) -> Self {
        Self {
            sqs_client,
            queue_name: queue_name.into(),
            queue_url: Mutex::new(None),
        }
    }

    async fn queue_url(&self, cancel: &CancellationToken) -> Result<String, QueueError> {
        let mut cached = self.queue_url.lock().await;
        if let Some(url) = cached.as_ref() {
            return Ok(url.clone());
        }

        let output = cancellable(
            cancel,
            self.sqs_client
                .get_queue_url()
                .queue_name(&self.queue_name)
                .send(),
        )
        .await?
        .map_err(|e| classify(&self.queue_name, e))?;

        let url = output
            .queue_url
            .ok_or_else(|| QueueError::Transport("GetQueueUrl returned no queue url".into()))?;
        log::debug!("Resolved queue '{}' to {url}", self.queue_name);
        *cached = Some(url.clone());
        Ok(url)
    }

    // a queue deleted out from under us has to be looked up again once it is back
    async fn forget_missing_queue(&self, err: QueueError) -> QueueError {
        if matches!(err, QueueError::QueueUnavailable(_)) {
            self.queue_url.lock().await.take();
        }
        err
    }
}

#[async_trait]
impl QueueClient for SqsQueueClient {
    async fn receive(
        &self,
        wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<Message>, QueueError> {
        let queue_url = self.queue_url(cancel).await?;
        let wait_seconds = wait.as_secs().min(MAX_WAIT_SECONDS) as i32;

        let res = cancellable(
            cancel,
            self.sqs_client
                .receive_message()
                .queue_url(&queue_url)
                .max_number_of_messages(1)
                .wait_time_seconds(wait_seconds)
                .send(),
        )
        .await?;

        match res {
            Ok(output) => Ok(output
                .messages
                .unwrap_or_default()
                .into_iter()
                .next()
                .map(Message::from)),
            Err(e) => Err(self
                .forget_missing_queue(classify(&self.queue_name, e))
                .await),
        }
    }

    async fn delete(
        &self,
        message_id: &MessageId,
        receipt_handle: &ReceiptHandle,
        cancel: &CancellationToken,
    ) -> Result<(), QueueError> {
        let queue_url = self.queue_url(cancel).await?;

        let res = cancellable(
            cancel,
            self.sqs_client
                .delete_message()
                .queue_url(&queue_url)
                .receipt_handle(receipt_handle.as_str())
                .send(),
        )
        .await?;

        match res {
            Ok(_) => {
                log::trace!("Deleted message {message_id} from '{}'", self.queue_name);
                Ok(())
            }
            Err(e) => Err(self
                .forget_missing_queue(classify(&self.queue_name, e))
                .await),
        }
    }

    fn queue_name(&self) -> &str {
        &self.queue_name
    }
}

async fn cancellable<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, QueueError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(QueueError::Cancelled),
        out = fut => Ok(out),
    }
}

fn classify<E, R>(queue_name: &str, err: SdkError<E, R>) -> QueueError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = match &err {
        SdkError::ServiceError(service) => service.err().code(),
        _ => None,
    };
    let detail = DisplayErrorContext(&err).to_string();
    match code {
        Some(c) if MISSING_QUEUE_CODES.contains(&c) => {
            QueueError::QueueUnavailable(queue_name.to_string())
        }
        Some(c) if INVALID_RECEIPT_CODES.contains(&c) => QueueError::NotFound,
        Some(c) if UNRECOVERABLE_CODES.contains(&c) => QueueError::Unrecoverable(detail),
        _ => QueueError::Transport(detail),
    }
}

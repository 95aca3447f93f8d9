use crate::{
    Message, MessageId, MessageRelay, QueueClient, QueueError, ReceiptHandle, RelayError,
    RelayRequest,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

type Received = Result<Option<Message>, QueueError>;

/// Hands out scripted receive results in order. Once the script runs out it
/// either reports an empty queue or, when armed, cancels the run.
pub(crate) struct MockQueueClient {
    script: Mutex<VecDeque<Received>>,
    receive_times: Mutex<Vec<Instant>>,
    receive_waits: Mutex<Vec<Duration>>,
    deleted: Mutex<Vec<(String, ReceiptHandle)>>,
    delete_error: Option<QueueError>,
    cancel_when_exhausted: Mutex<Option<CancellationToken>>,
}

impl MockQueueClient {
    pub(crate) fn new(script: Vec<Received>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            receive_times: Mutex::new(Vec::new()),
            receive_waits: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            delete_error: None,
            cancel_when_exhausted: Mutex::new(None),
        }
    }

    pub(crate) fn fail_deletes_with(mut self, err: QueueError) -> Self {
        self.delete_error = Some(err);
        self
    }

    pub(crate) fn cancel_when_exhausted(&self, cancel: CancellationToken) {
        *self.cancel_when_exhausted.lock().unwrap() = Some(cancel);
    }

    pub(crate) fn receive_calls(&self) -> usize {
        self.receive_times.lock().unwrap().len()
    }

    pub(crate) fn receive_times(&self) -> Vec<Instant> {
        self.receive_times.lock().unwrap().clone()
    }

    pub(crate) fn receive_waits(&self) -> Vec<Duration> {
        self.receive_waits.lock().unwrap().clone()
    }

    pub(crate) fn deleted(&self) -> Vec<(String, ReceiptHandle)> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueueClient for MockQueueClient {
    async fn receive(
        &self,
        wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<Message>, QueueError> {
        self.receive_times.lock().unwrap().push(Instant::now());
        self.receive_waits.lock().unwrap().push(wait);
        if cancel.is_cancelled() {
            return Err(QueueError::Cancelled);
        }

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(received) => received,
            None => match self.cancel_when_exhausted.lock().unwrap().as_ref() {
                Some(token) => {
                    token.cancel();
                    Err(QueueError::Cancelled)
                }
                None => Ok(None),
            },
        }
    }

    async fn delete(
        &self,
        message_id: &MessageId,
        receipt_handle: &ReceiptHandle,
        _cancel: &CancellationToken,
    ) -> Result<(), QueueError> {
        self.deleted
            .lock()
            .unwrap()
            .push((message_id.to_string(), receipt_handle.clone()));
        match &self.delete_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn queue_name(&self) -> &str {
        "mock-queue"
    }
}

/// Records every request and answers from a script, succeeding once it runs
/// out.
pub(crate) struct MockMessageRelay {
    script: Mutex<VecDeque<Result<(), RelayError>>>,
    sent: Mutex<Vec<RelayRequest>>,
}

impl MockMessageRelay {
    pub(crate) fn new(script: Vec<Result<(), RelayError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn sent(&self) -> Vec<RelayRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageRelay for MockMessageRelay {
    async fn send(
        &self,
        request: &RelayRequest,
        _cancel: &CancellationToken,
    ) -> Result<(), RelayError> {
        self.sent.lock().unwrap().push(request.clone());
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    fn target(&self) -> &str {
        "mock-target"
    }
}

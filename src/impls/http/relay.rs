use crate::{MessageRelay, RelayError, RelayRequest};
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Posts each message as JSON to one fixed url, reusing a single client for
/// the lifetime of the worker.
pub struct HttpRelay {
    http_client: reqwest::Client,
    url: String,
}

impl HttpRelay {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RelayError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        Ok(Self::with_client(http_client, url))
    }

    pub fn with_client(http_client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl MessageRelay for HttpRelay {
    async fn send(
        &self,
        request: &RelayRequest,
        cancel: &CancellationToken,
    ) -> Result<(), RelayError> {
        let call = self.http_client.post(&self.url).json(request).send();
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(RelayError::Cancelled),
            res = call => res.map_err(|e| RelayError::Transport(e.to_string()))?,
        };

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(RelayError::Status(status.as_u16()))
        }
    }

    fn target(&self) -> &str {
        &self.url
    }
}

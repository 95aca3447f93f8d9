use anyhow::{Context, Result};
use queue_relay::impls::{http::HttpRelay, sqs::SqsQueueClient};
use queue_relay::{Config, Worker};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

// tags everything the worker loop logs
const ROLE_NAME: &str = "queuereader";

#[tokio::main]
async fn main() -> Result<()> {
    // library code logs through `log`, which the fmt subscriber picks up
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let queue_client =
        SqsQueueClient::init(&config.queue.connection, &config.queue.queue_name).await;
    let relay = HttpRelay::new(config.relay.url(), config.relay.timeout)
        .context("Failed to create HTTP client")?;

    let worker = Worker::new(Arc::new(queue_client), Arc::new(relay))
        .with_receive_wait(config.queue.wait);

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_shutdown_signal(cancel.clone()));

    worker
        .run(cancel)
        .instrument(tracing::info_span!("service", role = ROLE_NAME))
        .await?;
    Ok(())
}

async fn cancel_on_shutdown_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                let name = tokio::select! {
                    _ = sigterm.recv() => "SIGTERM",
                    _ = tokio::signal::ctrl_c() => "SIGINT",
                };
                log::info!("{name} received, stopping queue reader");
            }
            Err(e) => {
                log::warn!("Failed to register SIGTERM handler: {e}");
                wait_for_ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    wait_for_ctrl_c().await;

    cancel.cancel();
}

// without any signal handler the worker runs until killed
async fn wait_for_ctrl_c() {
    if !ctrl_c_received(tokio::signal::ctrl_c().await) {
        std::future::pending::<()>().await;
    }
}

fn ctrl_c_received(res: std::io::Result<()>) -> bool {
    match res {
        Ok(()) => {
            log::info!("SIGINT received, stopping queue reader");
            true
        }
        Err(e) => {
            log::warn!("Failed to listen for Ctrl-C, shutdown signals are ignored: {e}");
            false
        }
    }
}

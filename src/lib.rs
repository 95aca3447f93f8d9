//! Drains a durable queue into a downstream HTTP service, deleting each
//! message only after the downstream call succeeded.
//!
//! The [`Worker`] loop only talks to two ports, [`QueueClient`] and
//! [`MessageRelay`]. Concrete adapters live under `impls` behind the `sqs` and
//! `http` features.

mod client;
pub mod config;
pub mod impls;
mod message;
mod relay;
#[cfg(test)]
mod test_utils;
mod worker;

pub use client::{QueueClient, QueueError};
pub use config::{Config, ConfigError};
pub use message::{Message, MessageId, ReceiptHandle};
pub use relay::{MessageRelay, RelayError, RelayRequest};
pub use worker::{Backoff, Worker, WorkerError, DEFAULT_RECEIVE_WAIT};

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "sqs")]
pub mod sqs;

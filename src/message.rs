use std::fmt::{self, Debug, Display};

/// Stable identity the queue assigns to a message. Redeliveries of the same
/// message keep the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token for one specific delivery of a message. Only valid until the message
/// is deleted or its visibility timeout runs out.
#[derive(Clone, PartialEq, Eq)]
pub struct ReceiptHandle(String);

impl ReceiptHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// receipt handles are long opaque blobs, keep log lines readable
impl Debug for ReceiptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short: String = self.0.chars().take(12).collect();
        if short.len() < self.0.len() {
            write!(f, "ReceiptHandle({short}..)")
        } else {
            write!(f, "ReceiptHandle({short})")
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    id: MessageId,
    receipt_handle: ReceiptHandle,
    body: String,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        receipt_handle: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::new(id),
            receipt_handle: ReceiptHandle::new(receipt_handle),
            body: body.into(),
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn receipt_handle(&self) -> &ReceiptHandle {
        &self.receipt_handle
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Splits the message into the identifiers needed to delete it after the
    /// body has been handed off.
    pub fn into_parts(self) -> (MessageId, ReceiptHandle, String) {
        (self.id, self.receipt_handle, self.body)
    }
}

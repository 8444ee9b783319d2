//! Single-shot request/response channel between the content script and the
//! background dispatcher.
//!
//! Every message carries a correlation id; the reply echoes it back and the
//! sender rejects a reply that does not match.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::warn;
use uuid::Uuid;

use crate::core::models::SummaryLength;
use crate::errors::SummaristError;

const CHANNEL_BUFFER: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    GetSummary,
    AdjustLength,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionMessage {
    pub correlation_id: Uuid,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<SummaryLength>,
}

impl ExtensionMessage {
    fn new(action: Action) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            action,
            text: None,
            url: None,
            summary: None,
            length: None,
        }
    }

    #[must_use]
    pub fn summarize_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(Action::GetSummary)
        }
    }

    #[must_use]
    pub fn summarize_url(url: impl Into<String>, length: Option<SummaryLength>) -> Self {
        Self {
            url: Some(url.into()),
            length,
            ..Self::new(Action::GetSummary)
        }
    }

    #[must_use]
    pub fn adjust_length(
        text: impl Into<String>,
        summary: impl Into<String>,
        length: SummaryLength,
    ) -> Self {
        Self {
            text: Some(text.into()),
            summary: Some(summary.into()),
            length: Some(length),
            ..Self::new(Action::AdjustLength)
        }
    }
}

/// `{ summary }` on success, `{ error }` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageReply {
    Summary { summary: String },
    Error { error: String },
}

impl MessageReply {
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// Converts a service result into a reply, normalizing the error.
    #[must_use]
    pub fn from_result(result: Result<String, SummaristError>) -> Self {
        match result {
            Ok(summary) => Self::Summary { summary },
            Err(e) => Self::error(e.to_string()),
        }
    }
}

/// A message in flight, paired with the slot its reply goes to.
#[derive(Debug)]
pub struct Envelope {
    pub message: ExtensionMessage,
    respond_to: oneshot::Sender<(Uuid, MessageReply)>,
}

impl Envelope {
    /// Sends the one reply this message gets. A receiver that has gone away
    /// is logged and otherwise ignored.
    pub fn reply(self, reply: MessageReply) {
        let id = self.message.correlation_id;
        if self.respond_to.send((id, reply)).is_err() {
            warn!(correlation_id = %id, "Reply dropped: sender no longer waiting");
        }
    }
}

pub fn channel() -> (MessageSender, MessageReceiver) {
    let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER);
    (MessageSender { sender }, MessageReceiver { receiver })
}

#[derive(Debug, Clone)]
pub struct MessageSender {
    sender: mpsc::Sender<Envelope>,
}

impl MessageSender {
    /// Sends a message and waits for its single reply. There is no timeout.
    ///
    /// # Errors
    ///
    /// Returns `SummaristError::ChannelError` if the dispatcher is gone, drops
    /// the message without replying, or answers with another correlation id.
    pub async fn send(&self, message: ExtensionMessage) -> Result<MessageReply, SummaristError> {
        let expected = message.correlation_id;
        let (respond_to, receiver) = oneshot::channel();
        self.sender
            .send(Envelope {
                message,
                respond_to,
            })
            .await
            .map_err(|_| SummaristError::ChannelError("background dispatcher is not running".to_string()))?;

        let (id, reply) = receiver
            .await
            .map_err(|_| SummaristError::ChannelError("no reply was sent".to_string()))?;
        if id != expected {
            return Err(SummaristError::ChannelError(format!(
                "reply correlation id {id} does not match request {expected}"
            )));
        }
        Ok(reply)
    }
}

#[derive(Debug)]
pub struct MessageReceiver {
    receiver: mpsc::Receiver<Envelope>,
}

impl MessageReceiver {
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.receiver.recv().await
    }
}

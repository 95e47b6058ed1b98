//! Best-effort message delivery
//!
//! The core only knows how to hand a message to a [`MessageSink`]; the chat
//! transport behind it is an adapter. Delivery failures are logged and
//! swallowed.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::commands::BotCommand;
use crate::config::ChatId;
use crate::error::Result;

/// Interactive button attached to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub command: BotCommand,
}

impl Button {
    pub fn new(label: &str, command: BotCommand) -> Self {
        Self {
            label: label.to_string(),
            command,
        }
    }
}

/// Outbound message: text plus optional rows of buttons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub buttons: Vec<Vec<Button>>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn with_buttons(mut self, buttons: Vec<Vec<Button>>) -> Self {
        self.buttons = buttons;
        self
    }
}

impl From<&str> for OutgoingMessage {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for OutgoingMessage {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

/// Transport capable of delivering a message to one chat
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn deliver(&self, chat: ChatId, message: &OutgoingMessage) -> Result<()>;
}

/// Sends to single chats and broadcasts to the configured recipient list
pub struct Notifier {
    sink: Arc<dyn MessageSink>,
    recipients: Vec<ChatId>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn MessageSink>, recipients: Vec<ChatId>) -> Self {
        Self { sink, recipients }
    }

    pub fn recipients(&self) -> &[ChatId] {
        &self.recipients
    }

    /// Send to one chat. Returns whether delivery succeeded.
    pub async fn send_to(&self, chat: ChatId, message: impl Into<OutgoingMessage>) -> bool {
        let message = message.into();
        match self.sink.deliver(chat, &message).await {
            Ok(()) => {
                debug!(chat, "Message delivered");
                true
            }
            Err(e) => {
                warn!("Error sending message to chat {}: {}", chat, e);
                false
            }
        }
    }

    /// Send to every recipient. Returns the number of successful deliveries.
    pub async fn broadcast(&self, message: impl Into<OutgoingMessage>) -> usize {
        let message = message.into();
        let mut delivered = 0;
        for &chat in &self.recipients {
            if self.send_to(chat, message.clone()).await {
                delivered += 1;
            }
        }
        info!(
            "Broadcast delivered to {}/{} recipients",
            delivered,
            self.recipients.len()
        );
        delivered
    }
}

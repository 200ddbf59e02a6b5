pub mod telegram;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::schedule::DeliveryBatch;

/// A text message received from the chat platform
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub sender_id: u64,
    pub sender_display_name: String,
    pub sender_handle: Option<String>,
    pub chat_id: i64,
    pub message_id: i32,
    pub text: String,
}

/// Reply keyboard shown under the input field, one `Vec` per row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<String>>,
}

impl Keyboard {
    pub fn new(rows: Vec<Vec<&str>>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(str::to_string).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
impl Keyboard {
    pub fn button_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.rows.iter().flatten().any(|b| b == label)
    }
}

/// An outgoing text message with optional keyboard and HTML formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingText {
    pub text: String,
    pub keyboard: Option<Keyboard>,
    pub html: bool,
}

impl OutgoingText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            html: false,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            html: true,
            ..Self::plain(text)
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Outbound side of the chat platform
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, chat_id: i64, message: OutgoingText) -> Result<()>;

    /// Upload a file from disk; the document is named after the file
    async fn send_document(&self, chat_id: i64, path: &Path, caption: &str) -> Result<()>;

    async fn send_media_batch(&self, chat_id: i64, batch: &DeliveryBatch) -> Result<()>;

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<()>;
}

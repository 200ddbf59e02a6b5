use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    InputFile, InputMedia, InputMediaPhoto, KeyboardButton, KeyboardMarkup, MessageId, ParseMode,
};
use tracing::{info, warn};

use crate::platform::{InboundEvent, Keyboard, OutgoingText, Transport};
use crate::router::Router;
use crate::schedule::{DeliveryBatch, MediaItem};

/// [`Transport`] on top of the Telegram Bot API
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn keyboard_markup(keyboard: &Keyboard) -> KeyboardMarkup {
    KeyboardMarkup::new(
        keyboard
            .rows
            .iter()
            .map(|row| row.iter().map(KeyboardButton::new).collect::<Vec<_>>()),
    )
}

fn media_photo(item: &MediaItem) -> Result<InputMedia> {
    let url = reqwest::Url::parse(&item.url)
        .with_context(|| format!("Invalid image URL: {}", item.url))?;
    let mut photo = InputMediaPhoto::new(InputFile::url(url));
    if let Some(caption) = &item.caption {
        photo = photo.caption(caption.clone());
    }
    Ok(InputMedia::Photo(photo))
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(&self, chat_id: i64, message: OutgoingText) -> Result<()> {
        let mut request = self.bot.send_message(ChatId(chat_id), message.text);
        if let Some(keyboard) = &message.keyboard {
            request = request.reply_markup(keyboard_markup(keyboard));
        }
        if message.html {
            request = request.parse_mode(ParseMode::Html);
        }
        request.await.context("sendMessage failed")?;
        Ok(())
    }

    async fn send_document(&self, chat_id: i64, path: &Path, caption: &str) -> Result<()> {
        self.bot
            .send_document(ChatId(chat_id), InputFile::file(path))
            .caption(caption)
            .await
            .context("sendDocument failed")?;
        Ok(())
    }

    async fn send_media_batch(&self, chat_id: i64, batch: &DeliveryBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let media = batch
            .items
            .iter()
            .map(media_photo)
            .collect::<Result<Vec<_>>>()?;
        self.bot
            .send_media_group(ChatId(chat_id), media)
            .await
            .context("sendMediaGroup failed")?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<()> {
        self.bot
            .delete_message(ChatId(chat_id), MessageId(message_id))
            .await
            .context("deleteMessage failed")?;
        Ok(())
    }
}

/// Convert a Telegram message into an event; `None` for messages without
/// a sender or text.
fn to_event(msg: &Message) -> Option<InboundEvent> {
    let user = msg.from.as_ref()?;
    let text = msg.text()?;
    Some(InboundEvent {
        sender_id: user.id.0,
        sender_display_name: user.first_name.clone(),
        sender_handle: user.username.clone(),
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
        text: text.to_string(),
    })
}

/// Run the Telegram dispatcher until the process is stopped.
///
/// Updates from one chat are handled strictly in order; different chats
/// are handled concurrently.
pub async fn run(bot: Bot, router: Arc<Router>) -> Result<()> {
    info!("Starting Telegram platform...");

    let handler = Update::filter_message()
        .filter_map(|msg: Message| to_event(&msg))
        .endpoint(handle_event);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![router])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_event(event: InboundEvent, router: Arc<Router>) -> ResponseResult<()> {
    router.dispatch(&event).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_markup_keeps_rows() {
        let keyboard = Keyboard::new(vec![vec!["a", "b"], vec!["c"]]);
        let markup = keyboard_markup(&keyboard);
        assert_eq!(markup.keyboard.len(), 2);
        assert_eq!(markup.keyboard[0].len(), 2);
        assert_eq!(markup.keyboard[1][0].text, "c");
    }

    #[test]
    fn test_media_photo_caption_only_when_set() {
        let captioned = media_photo(&MediaItem {
            url: "https://nklpis.ru/a.png".to_string(),
            caption: Some("cap".to_string()),
        })
        .unwrap();
        match captioned {
            InputMedia::Photo(photo) => assert_eq!(photo.caption.as_deref(), Some("cap")),
            other => panic!("expected photo, got {:?}", other),
        }

        let plain = media_photo(&MediaItem {
            url: "https://nklpis.ru/b.png".to_string(),
            caption: None,
        })
        .unwrap();
        match plain {
            InputMedia::Photo(photo) => assert!(photo.caption.is_none()),
            other => panic!("expected photo, got {:?}", other),
        }
    }

    #[test]
    fn test_media_photo_rejects_relative_url() {
        assert!(media_photo(&MediaItem {
            url: "/relative.png".to_string(),
            caption: None,
        })
        .is_err());
    }
}

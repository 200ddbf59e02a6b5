use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::commands::{Command, CommandTable, Keyboards, PrivilegeTier};
use crate::listing::{self, Paginator};
use crate::platform::{InboundEvent, OutgoingText, Transport};
use crate::registry::UserRegistry;
use crate::schedule::{self, ScheduleService};
use crate::texts;

/// How a schedule request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Delivered { batches: usize, failed: usize },
    NotFound,
    LoadFailed,
}

/// Dispatches inbound events to command handlers.
///
/// No handler error escapes [`Router::dispatch`]: failures are logged and,
/// where the user is waiting for something, reported with a notice.
pub struct Router {
    admin_id: u64,
    commands: CommandTable,
    keyboards: Keyboards,
    paginator: Paginator,
    log_file: PathBuf,
    transport: Arc<dyn Transport>,
    registry: Arc<dyn UserRegistry>,
    schedule: ScheduleService,
}

impl Router {
    pub fn new(
        admin_id: u64,
        log_file: PathBuf,
        transport: Arc<dyn Transport>,
        registry: Arc<dyn UserRegistry>,
        schedule: ScheduleService,
    ) -> Self {
        Self {
            admin_id,
            commands: CommandTable::default(),
            keyboards: Keyboards::default(),
            paginator: Paginator::default(),
            log_file,
            transport,
            registry,
            schedule,
        }
    }

    pub async fn dispatch(&self, event: &InboundEvent) {
        if let Err(e) = self
            .registry
            .record_sighting(
                event.sender_id,
                event.sender_handle.as_deref(),
                &event.sender_display_name,
            )
            .await
        {
            error!("Failed to record user {}: {:#}", event.sender_id, e);
        }

        info!(
            "[{}] {}",
            event.sender_handle.as_deref().unwrap_or_default(),
            event.text
        );

        let tier = PrivilegeTier::of(event.sender_id, self.admin_id);
        let chat_id = event.chat_id;

        match self.commands.classify(&event.text) {
            Command::Start => {
                let welcome = match tier {
                    PrivilegeTier::Administrator => texts::ADMIN_WELCOME,
                    PrivilegeTier::Ordinary => texts::USER_WELCOME,
                };
                let keyboard = self.keyboards.for_tier(tier).clone();
                self.reply(chat_id, OutgoingText::plain(welcome).with_keyboard(keyboard))
                    .await;
            }
            Command::Schedule => {
                if let Err(e) = self
                    .transport
                    .delete_message(chat_id, event.message_id)
                    .await
                {
                    warn!("Failed to delete message {}: {:#}", event.message_id, e);
                }
                let outcome = self.send_schedule(chat_id).await;
                info!("Schedule request in chat {} finished: {:?}", chat_id, outcome);
            }
            Command::ViewLogs => match tier {
                PrivilegeTier::Administrator => self.send_logs(chat_id).await,
                PrivilegeTier::Ordinary => self.deny(chat_id).await,
            },
            Command::ViewRegistry => match tier {
                PrivilegeTier::Administrator => self.send_registry(chat_id).await,
                PrivilegeTier::Ordinary => self.deny(chat_id).await,
            },
            Command::Unknown => {
                let message = OutgoingText::plain(texts::UNKNOWN_COMMAND)
                    .with_keyboard(self.keyboards.user.clone());
                self.reply(chat_id, message).await;
            }
        }
    }

    /// Fetch, scan and deliver the schedule images to `chat_id`.
    pub async fn send_schedule(&self, chat_id: i64) -> ScheduleOutcome {
        let urls = match self.schedule.image_urls().await {
            Ok(urls) => urls,
            Err(e) => {
                error!("Failed to load schedule page: {:#}", e);
                self.reply(chat_id, OutgoingText::plain(texts::SCHEDULE_LOAD_FAILED))
                    .await;
                return ScheduleOutcome::LoadFailed;
            }
        };

        let batches = schedule::into_batches(urls, texts::SCHEDULE_CAPTION);
        if batches.is_empty() {
            self.reply(chat_id, OutgoingText::plain(texts::SCHEDULE_NOT_FOUND))
                .await;
            return ScheduleOutcome::NotFound;
        }

        let mut failed = 0;
        for (i, batch) in batches.iter().enumerate() {
            if let Err(e) = self.transport.send_media_batch(chat_id, batch).await {
                error!("Failed to send media group {} to {}: {:#}", i, chat_id, e);
                failed += 1;
            }
        }

        ScheduleOutcome::Delivered {
            batches: batches.len(),
            failed,
        }
    }

    async fn send_logs(&self, chat_id: i64) {
        match tokio::fs::metadata(&self.log_file)
            .await
            .with_context(|| format!("Failed to stat {}", self.log_file.display()))
        {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                error!("Log path is not a file: {}", self.log_file.display());
                self.reply(chat_id, OutgoingText::plain(texts::LOG_READ_FAILED))
                    .await;
                return;
            }
            Err(e) => {
                error!("{:#}", e);
                self.reply(chat_id, OutgoingText::plain(texts::LOG_READ_FAILED))
                    .await;
                return;
            }
        }

        if let Err(e) = self
            .transport
            .send_document(chat_id, &self.log_file, texts::LOG_DOCUMENT_CAPTION)
            .await
        {
            error!("Failed to send log file: {:#}", e);
            self.reply(chat_id, OutgoingText::plain(texts::LOG_SEND_FAILED))
                .await;
        }
    }

    async fn send_registry(&self, chat_id: i64) {
        if let Err(e) = self.try_send_registry(chat_id).await {
            error!("Failed to list users: {:#}", e);
            self.reply(chat_id, OutgoingText::plain(texts::REGISTRY_FAILED))
                .await;
        }
    }

    async fn try_send_registry(&self, chat_id: i64) -> Result<()> {
        let users = self.registry.list_all().await?;
        let records: Vec<String> = users.iter().map(listing::format_user).collect();

        for chunk in self
            .paginator
            .paginate(texts::REGISTRY_HEADER, &records, texts::REGISTRY_EMPTY)
        {
            self.reply(chat_id, OutgoingText::html(chunk)).await;
        }
        Ok(())
    }

    async fn deny(&self, chat_id: i64) {
        self.reply(chat_id, OutgoingText::plain(texts::ACCESS_DENIED))
            .await;
    }

    async fn reply(&self, chat_id: i64, message: OutgoingText) {
        if let Err(e) = self.transport.send_text(chat_id, message).await {
            error!("Failed to send message to {}: {:#}", chat_id, e);
        }
    }
}

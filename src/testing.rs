//! In-process fakes for the transport, registry and page source.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::platform::{OutgoingText, Transport};
use crate::registry::{UserRecord, UserRegistry};
use crate::schedule::{DeliveryBatch, PageSource};

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text {
        chat_id: i64,
        message: OutgoingText,
    },
    Document {
        chat_id: i64,
        path: PathBuf,
        caption: String,
    },
    Media {
        chat_id: i64,
        batch: DeliveryBatch,
    },
    Deleted {
        chat_id: i64,
        message_id: i32,
    },
}

/// Records every outbound call; individual call kinds can be made to fail
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    pub fail_text: AtomicBool,
    pub fail_documents: AtomicBool,
    pub fail_media: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<OutgoingText> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn media(&self) -> Vec<DeliveryBatch> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Media { batch, .. } => Some(batch),
                _ => None,
            })
            .collect()
    }

    pub fn documents(&self) -> usize {
        self.sent()
            .iter()
            .filter(|s| matches!(s, Sent::Document { .. }))
            .count()
    }

    fn record(&self, sent: Sent, fail: &AtomicBool) -> Result<()> {
        // Failed calls are still recorded as attempts
        self.sent.lock().unwrap().push(sent);
        if fail.load(Ordering::SeqCst) {
            anyhow::bail!("simulated transport failure");
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(&self, chat_id: i64, message: OutgoingText) -> Result<()> {
        self.record(Sent::Text { chat_id, message }, &self.fail_text)
    }

    async fn send_document(&self, chat_id: i64, path: &Path, caption: &str) -> Result<()> {
        self.record(
            Sent::Document {
                chat_id,
                path: path.to_path_buf(),
                caption: caption.to_string(),
            },
            &self.fail_documents,
        )
    }

    async fn send_media_batch(&self, chat_id: i64, batch: &DeliveryBatch) -> Result<()> {
        self.record(
            Sent::Media {
                chat_id,
                batch: batch.clone(),
            },
            &self.fail_media,
        )
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<()> {
        self.record(
            Sent::Deleted {
                chat_id,
                message_id,
            },
            &self.fail_delete,
        )
    }
}

/// Vec-backed registry with switchable failures
#[derive(Default)]
pub struct MemoryRegistry {
    users: Mutex<Vec<UserRecord>>,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl MemoryRegistry {
    pub fn with_users(count: u64) -> Self {
        let registry = Self::default();
        {
            let mut users = registry.users.lock().unwrap();
            for i in 0..count {
                users.push(UserRecord {
                    id: 100 + i,
                    handle: Some(format!("user{}", i)),
                    display_name: format!("Пользователь {}", i),
                    created_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
                });
            }
        }
        registry
    }

    pub fn ids(&self) -> Vec<u64> {
        self.users.lock().unwrap().iter().map(|u| u.id).collect()
    }
}

#[async_trait]
impl UserRegistry for MemoryRegistry {
    async fn record_sighting(
        &self,
        id: u64,
        handle: Option<&str>,
        display_name: &str,
    ) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("simulated registry write failure");
        }
        let mut users = self.users.lock().unwrap();
        if !users.iter().any(|u| u.id == id) {
            users.push(UserRecord {
                id,
                handle: handle.map(str::to_string),
                display_name: display_name.to_string(),
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<UserRecord>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("simulated registry read failure");
        }
        Ok(self.users.lock().unwrap().clone())
    }
}

/// Page source returning fixed markup, or always failing
pub struct StaticPage {
    body: Option<String>,
    requested: Mutex<Vec<String>>,
}

impl StaticPage {
    pub fn ok(body: &str) -> Self {
        Self {
            body: Some(body.to_string()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            body: None,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for StaticPage {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        match &self.body {
            Some(body) => Ok(body.clone()),
            None => anyhow::bail!("connection refused"),
        }
    }
}

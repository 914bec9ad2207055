use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::external::{StorageService, TelegramService};
use crate::models::QueuedMessage;

/// Message relay between a chat account and its paired device. Inbound chat
/// messages queue in storage until the device polls; outbound device
/// messages go straight through the chat gateway.
#[derive(Clone)]
pub struct RelayService {
    telegram: TelegramService,
    storage: StorageService,
    /// The KV service has no compare-and-swap, so queue updates are
    /// read-modify-write; every queue mutation holds this lock. Writers in
    /// another process would still race.
    queue_lock: Arc<Mutex<()>>,
}

impl RelayService {
    pub fn new(telegram: TelegramService, storage: StorageService) -> Self {
        Self {
            telegram,
            storage,
            queue_lock: Arc::new(Mutex::new(())),
        }
    }

    fn queue_key(user_id: i64) -> String {
        format!("queue:{user_id}")
    }

    /// Append an inbound chat message to the owner's device queue.
    pub async fn enqueue_for_device(
        &self,
        user_id: i64,
        from: Option<String>,
        text: String,
    ) -> AppResult<()> {
        let _guard = self.queue_lock.lock().await;
        let key = Self::queue_key(user_id);
        let mut queue: Vec<QueuedMessage> = self.storage.get(&key).await?.unwrap_or_default();
        queue.push(QueuedMessage {
            from,
            text,
            received_at: Utc::now(),
        });
        self.storage.put(&key, &queue).await
    }

    /// Drain and return everything queued for the device.
    pub async fn drain_for_device(&self, user_id: i64) -> AppResult<Vec<QueuedMessage>> {
        let _guard = self.queue_lock.lock().await;
        let key = Self::queue_key(user_id);
        let queue: Vec<QueuedMessage> = self.storage.get(&key).await?.unwrap_or_default();
        if !queue.is_empty() {
            self.storage.delete(&key).await?;
        }
        Ok(queue)
    }

    /// Deliver a device-originated message to the paired chat.
    pub async fn send_to_chat(&self, chat_id: i64, text: &str) -> AppResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::ValidationError(
                "Message text must not be empty".to_string(),
            ));
        }
        self.telegram.send_message(chat_id, text).await
    }
}

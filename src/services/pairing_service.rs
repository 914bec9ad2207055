use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::external::{StorageService, TelegramService};
use crate::models::*;
use crate::services::PairingRegistry;
use crate::utils::mint_session_token;

/// Issuer/redeemer flows around the registry: code delivery over the chat
/// gateway, session minting, and best-effort pairing records in storage.
#[derive(Clone)]
pub struct PairingService {
    registry: PairingRegistry,
    telegram: TelegramService,
    storage: StorageService,
}

impl PairingService {
    pub fn new(
        registry: PairingRegistry,
        telegram: TelegramService,
        storage: StorageService,
    ) -> Self {
        Self {
            registry,
            telegram,
            storage,
        }
    }

    /// Issue a code for `owner` and deliver it to their chat.
    ///
    /// Issuance is never rolled back: when delivery fails the orphaned code
    /// stays redeemable until it expires on its own, and the caller gets an
    /// internal error instead of the code.
    pub async fn request_pairing(&self, owner: OwnerIdentity) -> AppResult<ConnectRequestResponse> {
        let chat_id = owner.chat_id;
        let pending = self.registry.issue(owner).await;
        let expires_in = (pending.expires_at - pending.created_at).num_seconds();

        if let Err(e) = self.telegram.send_pairing_code(chat_id, &pending.code).await {
            log::error!("Pairing code issued but not delivered to chat {chat_id}: {e}");
            return Err(AppError::InternalError(
                "Failed to deliver pairing code, request a new one".to_string(),
            ));
        }

        Ok(ConnectRequestResponse {
            code: pending.code,
            expires_in,
        })
    }

    /// Redeem a submitted code into a connection configuration with a fresh
    /// opaque session token.
    ///
    /// The pairing record is written to storage best-effort; a storage outage
    /// is logged and never fails a redemption that already consumed the code.
    pub async fn verify(&self, code: &str) -> AppResult<DeviceConfig> {
        let pending = self.registry.redeem(code).await?;
        let session_token = mint_session_token();

        let record = SessionRecord {
            user_id: pending.owner.user_id,
            chat_id: pending.owner.chat_id,
            paired_at: Utc::now(),
        };
        if let Err(e) = self
            .storage
            .put(&format!("session:{session_token}"), &record)
            .await
        {
            log::error!("Failed to persist session record: {e}");
        }
        if let Err(e) = self
            .storage
            .put(&format!("paired:{}", pending.owner.chat_id), &record)
            .await
        {
            log::error!("Failed to persist pairing record: {e}");
        }

        Ok(DeviceConfig {
            user_id: pending.owner.user_id,
            chat_id: pending.owner.chat_id,
            username: pending.owner.username,
            first_name: pending.owner.first_name,
            session_token,
        })
    }

    /// Resolve a session token presented by the companion app.
    pub async fn authenticate(&self, session_token: &str) -> AppResult<SessionRecord> {
        let record: Option<SessionRecord> = self
            .storage
            .get(&format!("session:{session_token}"))
            .await?;

        record.ok_or_else(|| AppError::Unauthorized("Unknown session token".to_string()))
    }

    /// Whether a chat has a completed pairing on record.
    pub async fn pairing_for_chat(&self, chat_id: i64) -> AppResult<Option<SessionRecord>> {
        self.storage.get(&format!("paired:{chat_id}")).await
    }
}

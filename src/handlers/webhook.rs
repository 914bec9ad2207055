use actix_web::{HttpResponse, Result, web};
use log::{debug, error, info};
use serde_json::json;

use crate::external::telegram::{IncomingMessage, Update};
use crate::models::OwnerIdentity;
use crate::services::{PairingService, RelayService};

/// Bot update webhook.
///
/// Always acknowledges with 200: the upstream bot platform retries anything
/// else, and its payloads are not under our control, so an unparseable body
/// is dropped as a no-op rather than surfaced as a fault.
pub async fn telegram_webhook(
    body: web::Bytes,
    pairing_service: web::Data<PairingService>,
    relay_service: web::Data<RelayService>,
) -> Result<HttpResponse> {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            debug!("Ignoring unparseable webhook payload: {e}");
            return Ok(HttpResponse::Ok().json(json!({ "ok": true })));
        }
    };

    let Some(message) = update.message else {
        return Ok(HttpResponse::Ok().json(json!({ "ok": true })));
    };

    handle_message(message, &pairing_service, &relay_service).await;
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

async fn handle_message(
    message: IncomingMessage,
    pairing_service: &PairingService,
    relay_service: &RelayService,
) {
    let chat_id = message.chat.id;
    let Some(text) = message.text else {
        return;
    };

    let command = text.trim();
    if command == "/connect" || command == "/start" {
        let owner = match &message.from {
            Some(from) => OwnerIdentity {
                user_id: from.id,
                chat_id,
                username: from.username.clone(),
                first_name: from.first_name.clone(),
            },
            None => OwnerIdentity {
                user_id: chat_id,
                chat_id,
                username: None,
                first_name: None,
            },
        };

        match pairing_service.request_pairing(owner).await {
            Ok(_) => info!("Pairing code issued for chat {chat_id}"),
            Err(e) => error!("Pairing request from chat {chat_id} failed: {e}"),
        }
        return;
    }

    // Any other text from a paired chat is relayed to the device queue.
    match pairing_service.pairing_for_chat(chat_id).await {
        Ok(Some(session)) => {
            let from = message.from.and_then(|f| f.username.or(f.first_name));
            if let Err(e) = relay_service
                .enqueue_for_device(session.user_id, from, text)
                .await
            {
                error!("Failed to queue message for chat {chat_id}: {e}");
            }
        }
        Ok(None) => {
            debug!("Dropping message from unpaired chat {chat_id}");
        }
        Err(e) => error!("Pairing lookup for chat {chat_id} failed: {e}"),
    }
}

pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/webhook").route("/telegram", web::post().to(telegram_webhook)));
}

use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{PairingService, RelayService};

fn session_token_from_request(req: &HttpRequest) -> AppResult<String> {
    req.headers()
        .get("X-Session-Token")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::Unauthorized("Missing X-Session-Token header".to_string()))
}

#[utoipa::path(
    post,
    path = "/messages/send",
    tag = "messages",
    request_body = SendMessageRequest,
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Message delivered to the paired chat"),
        (status = 401, description = "Missing or unknown session token"),
        (status = 502, description = "Chat gateway failure")
    )
)]
pub async fn send_message(
    pairing_service: web::Data<PairingService>,
    relay_service: web::Data<RelayService>,
    req: HttpRequest,
    request: web::Json<SendMessageRequest>,
) -> Result<HttpResponse> {
    let result = async {
        let token = session_token_from_request(&req)?;
        let session = pairing_service.authenticate(&token).await?;
        relay_service
            .send_to_chat(session.chat_id, &request.text)
            .await
    }
    .await;

    match result {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Message sent"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/messages/poll",
    tag = "messages",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Queued messages for the device", body = PollMessagesResponse),
        (status = 401, description = "Missing or unknown session token")
    )
)]
pub async fn poll_messages(
    pairing_service: web::Data<PairingService>,
    relay_service: web::Data<RelayService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let result = async {
        let token = session_token_from_request(&req)?;
        let session = pairing_service.authenticate(&token).await?;
        relay_service.drain_for_device(session.user_id).await
    }
    .await;

    match result {
        Ok(messages) => Ok(HttpResponse::Ok().json(ApiResponse::success(PollMessagesResponse {
            messages,
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn message_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/messages")
            .route("/send", web::post().to(send_message))
            .route("/poll", web::get().to(poll_messages)),
    );
}

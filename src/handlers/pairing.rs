use actix_web::{HttpResponse, ResponseError, Result, web};

use crate::models::*;
use crate::services::PairingService;

#[utoipa::path(
    post,
    path = "/pair/request",
    tag = "pairing",
    request_body = OwnerIdentity,
    responses(
        (status = 200, description = "Code issued and delivered", body = ConnectRequestResponse),
        (status = 500, description = "Code issued but delivery failed")
    )
)]
pub async fn request_code(
    pairing_service: web::Data<PairingService>,
    request: web::Json<OwnerIdentity>,
) -> Result<HttpResponse> {
    match pairing_service.request_pairing(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            response,
            "Pairing code sent".to_string(),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/pair/verify",
    tag = "pairing",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Code redeemed", body = VerifyResponse),
        (status = 400, description = "Malformed code"),
        (status = 404, description = "Unknown code"),
        (status = 410, description = "Expired code")
    )
)]
pub async fn verify(
    pairing_service: web::Data<PairingService>,
    request: web::Json<VerifyRequest>,
) -> Result<HttpResponse> {
    match pairing_service.verify(&request.code).await {
        Ok(config) => Ok(HttpResponse::Ok().json(VerifyResponse {
            success: true,
            config,
        })),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn pairing_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/pair")
            .route("/request", web::post().to(request_code))
            .route("/verify", web::post().to(verify)),
    );
}

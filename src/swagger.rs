use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "session_token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Session-Token"))),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::pairing::request_code,
        handlers::pairing::verify,
        handlers::messages::send_message,
        handlers::messages::poll_messages,
    ),
    components(
        schemas(
            OwnerIdentity,
            ConnectRequestResponse,
            VerifyRequest,
            VerifyResponse,
            DeviceConfig,
            SendMessageRequest,
            PollMessagesResponse,
            QueuedMessage,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "pairing", description = "Pairing code API"),
        (name = "messages", description = "Device message relay API"),
    ),
    info(
        title = "Wearlink Backend API",
        version = "1.0.0",
        description = "Wearable pairing and message relay REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

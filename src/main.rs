use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use wearlink_backend::{
    config::Config,
    external::{StorageService, TelegramService},
    handlers,
    middlewares::create_cors,
    services::*,
    swagger::swagger_config,
    tasks,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration file");

    // External collaborators
    let telegram_service = TelegramService::new(config.telegram.clone());
    let storage_service = StorageService::new(config.storage.clone());

    // Registry instance is owned here and injected into handlers; nothing
    // survives a restart, which is acceptable for 5-minute codes.
    let registry = PairingRegistry::new(config.pairing.code_ttl_secs);

    let pairing_service = PairingService::new(
        registry.clone(),
        telegram_service.clone(),
        storage_service.clone(),
    );
    let relay_service = RelayService::new(telegram_service.clone(), storage_service.clone());

    // Periodic expiry sweep
    tasks::spawn_all(registry.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(pairing_service.clone()))
            .app_data(web::Data::new(relay_service.clone()))
            .configure(swagger_config)
            .configure(handlers::webhook_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::pairing_config)
                    .configure(handlers::message_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}

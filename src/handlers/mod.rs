pub mod pairing;
pub mod messages;
pub mod webhook;

pub use pairing::pairing_config;
pub use messages::message_config;
pub use webhook::webhook_config;

pub mod pairing_registry;
pub mod pairing_service;
pub mod relay_service;

pub use pairing_registry::*;
pub use pairing_service::*;
pub use relay_service::*;

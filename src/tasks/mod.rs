//! Background scheduled tasks for the application.
//!
//! The registry already sweeps opportunistically on issue, so the periodic
//! sweep here only keeps the map from holding expired entries between
//! requests during quiet periods. Call `spawn_all` once during startup.

use crate::services::PairingRegistry;

/// Spawn all background tasks.
///
/// Detaches tasks via `tokio::spawn`; does not block.
pub fn spawn_all(registry: PairingRegistry) {
    // Expiry sweep every 60 seconds.
    {
        let registry = registry.clone();
        tokio::spawn(async move {
            loop {
                let removed = registry.sweep().await;
                if removed > 0 {
                    log::info!("Swept {removed} expired pairing codes");
                }
                tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            }
        });
    }
}

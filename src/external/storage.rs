use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Client for the external key-value persistence service. Keys are scoped
/// under a namespace; values are JSON documents. The pairing registry never
/// touches this — only the surrounding pairing/relay services do.
#[derive(Clone)]
pub struct StorageService {
    client: Client,
    config: StorageConfig,
}

impl StorageService {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn key_url(&self, key: &str) -> String {
        format!(
            "{}/kv/{}/{}",
            self.config.base_url, self.config.namespace, key
        )
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let response = self
            .client
            .put(self.key_url(key))
            .bearer_auth(&self.config.auth_token)
            .json(value)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Storage put failed for key {key}: {error_text}");
            Err(AppError::ExternalApiError(format!(
                "Storage write failed: {error_text}"
            )))
        }
    }

    /// Fetch and deserialize a value; `None` when the key does not exist.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let response = self
            .client
            .get(self.key_url(key))
            .bearer_auth(&self.config.auth_token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Storage get failed for key {key}: {error_text}");
            return Err(AppError::ExternalApiError(format!(
                "Storage read failed: {error_text}"
            )));
        }

        Ok(Some(response.json::<T>().await?))
    }

    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let response = self
            .client
            .delete(self.key_url(key))
            .bearer_auth(&self.config.auth_token)
            .send()
            .await?;

        // Deleting an absent key is a no-op, not a fault.
        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Storage delete failed for key {key}: {error_text}");
            Err(AppError::ExternalApiError(format!(
                "Storage delete failed: {error_text}"
            )))
        }
    }
}

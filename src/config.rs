use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub telegram: TelegramConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub pairing: PairingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Override for testing against a mock Bot API.
    #[serde(default = "default_telegram_api_base_url")]
    pub api_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub base_url: String,
    pub auth_token: String,
    #[serde(default = "default_storage_namespace")]
    pub namespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingConfig {
    /// Lifetime of an issued pairing code, in seconds.
    pub code_ttl_secs: i64,
}

fn default_telegram_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_storage_namespace() -> String {
    "wearlink".to_string()
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self { code_ttl_secs: 300 }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // Try the config file first; without one, fall back to env vars entirely.
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str)
                    .map_err(|e| format!("Failed to parse config file: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // The bot token is the one thing we refuse to default.
                let bot_token = get_env("TELEGRAM_BOT_TOKEN")
                    .ok_or("Missing TELEGRAM_BOT_TOKEN env var and no config.toml found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    telegram: TelegramConfig {
                        bot_token,
                        api_base_url: get_env("TELEGRAM_API_BASE_URL")
                            .unwrap_or_else(default_telegram_api_base_url),
                    },
                    storage: StorageConfig {
                        base_url: get_env("STORAGE_BASE_URL").unwrap_or_default(),
                        auth_token: get_env("STORAGE_AUTH_TOKEN").unwrap_or_default(),
                        namespace: get_env("STORAGE_NAMESPACE")
                            .unwrap_or_else(default_storage_namespace),
                    },
                    pairing: PairingConfig {
                        code_ttl_secs: get_env_parse("PAIRING_CODE_TTL_SECS", 300i64),
                    },
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // Env vars override file values even when the file exists.
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("TELEGRAM_BOT_TOKEN") {
            config.telegram.bot_token = v;
        }
        if let Ok(v) = env::var("TELEGRAM_API_BASE_URL") {
            config.telegram.api_base_url = v;
        }
        if let Ok(v) = env::var("STORAGE_BASE_URL") {
            config.storage.base_url = v;
        }
        if let Ok(v) = env::var("STORAGE_AUTH_TOKEN") {
            config.storage.auth_token = v;
        }
        if let Ok(v) = env::var("STORAGE_NAMESPACE") {
            config.storage.namespace = v;
        }
        if let Ok(v) = env::var("PAIRING_CODE_TTL_SECS")
            && let Ok(n) = v.parse()
        {
            config.pairing.code_ttl_secs = n;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairing_defaults_to_five_minutes() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [telegram]
            bot_token = "123:abc"

            [storage]
            base_url = "http://localhost:9000"
            auth_token = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.pairing.code_ttl_secs, 300);
        assert_eq!(config.telegram.api_base_url, "https://api.telegram.org");
        assert_eq!(config.storage.namespace, "wearlink");
    }
}

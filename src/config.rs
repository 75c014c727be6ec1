use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(String),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    #[serde(default)]
    pub transfer_api: TransferApiConfig,
    #[serde(default)]
    pub notify_api: NotifyApiConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
}

/// Ledger backend transfer endpoint
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TransferApiConfig {
    pub base_url: String,
    pub transfer_path: String,
    pub timeout_ms: u64,
    pub used_card: u32,
    pub description: String,
}

impl Default for TransferApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            transfer_path: "/transfer".to_string(),
            timeout_ms: 10_000,
            used_card: 1,
            description: "withdrawal".to_string(),
        }
    }
}

/// Push-notification confirmation endpoint
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct NotifyApiConfig {
    pub base_url: String,
    pub notify_path: String,
    pub timeout_ms: u64,
}

impl Default for NotifyApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            notify_path: "/notify".to_string(),
            timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LocationConfig {
    /// Bounded wait for a fix
    pub timeout_ms: u64,
    /// Oldest fix still accepted
    pub max_age_ms: u64,
}

impl LocationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms)
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            max_age_ms: 10_000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SubmissionConfig {
    /// How long submit stays disabled after an attempt completes
    pub cooldown_ms: u64,
    pub max_amount_digits: usize,
}

impl SubmissionConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 1_500,
            max_amount_digits: crate::transfer::amount::MAX_AMOUNT_DIGITS,
        }
    }
}

impl AppConfig {
    /// Load `config/<env>.yaml`
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        Self::from_file(&format!("config/{}.yaml", env))
    }

    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }
}

//! Wallet layer configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use plsdao_types::ChainDescriptor;
use plsdao_utils::LogFormat;

use crate::WalletError;

/// Configuration for the wallet connection layer.
///
/// Can be loaded from a TOML file via [`WalletConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletConfig {
    /// File holding the persisted last used backend.
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,

    /// Whether to silently reconnect to the last used backend at startup.
    #[serde(default = "default_true")]
    pub auto_reconnect: bool,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// The chain connected wallets must be on.
    #[serde(default)]
    pub chain: ChainDescriptor,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_storage_path() -> PathBuf {
    PathBuf::from("./plsdao_wallet.json")
}

fn default_true() -> bool {
    true
}

fn default_log_format() -> LogFormat {
    LogFormat::Human
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl WalletConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, WalletError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| WalletError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, WalletError> {
        let config: Self = toml::from_str(s).map_err(|e| WalletError::Config(e.to_string()))?;
        config
            .chain
            .validate()
            .map_err(|e| WalletError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, WalletError> {
        toml::to_string_pretty(self).map_err(|e| WalletError::Config(e.to_string()))
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            auto_reconnect: default_true(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            chain: ChainDescriptor::default(),
        }
    }
}

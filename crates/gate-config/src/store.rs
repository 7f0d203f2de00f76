//! Credential storage backend configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the access and refresh credentials are persisted.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// OS keychain, falling back to files when the keychain is unavailable.
    #[default]
    Keyring,
    /// Plain files under `credentials_dir`.
    File,
    /// Process memory only; nothing survives the process.
    Memory,
}

fn default_keyring_service() -> String {
    "gatehouse".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Keychain service name.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Directory for file-backed credentials. `None` means `~/.gatehouse/credentials`.
    #[serde(default)]
    pub credentials_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            keyring_service: default_keyring_service(),
            credentials_dir: None,
        }
    }
}

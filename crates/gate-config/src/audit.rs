//! Audit log endpoint configuration.

use serde::{Deserialize, Serialize};

/// Base URL of the log ingest API when nothing is configured.
pub const DEFAULT_LOG_PATH: &str = "examplelog";

fn default_log_path() -> String {
    DEFAULT_LOG_PATH.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
    /// Base URL for `/ingest/{namespace}/{type}`.
    #[serde(default = "default_log_path")]
    pub path: String,

    /// Ingest namespace.
    #[serde(default)]
    pub namespace: String,

    /// Ingest record type.
    #[serde(default, rename = "type")]
    pub kind: String,

    /// Value sent as `X-API-KEY`.
    #[serde(default)]
    pub token: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
            namespace: String::new(),
            kind: String::new(),
            token: String::new(),
        }
    }
}

impl AuditConfig {
    /// Emission is enabled only when namespace, type and token are all set.
    pub fn is_configured(&self) -> bool {
        !self.namespace.is_empty() && !self.kind.is_empty() && !self.token.is_empty()
    }
}

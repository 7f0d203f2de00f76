//! Identity provider endpoint configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Base URL of the token and userdata API when nothing is configured.
pub const DEFAULT_SSO_PATH: &str = "examplesso";
/// Base URL of the provider's login UI when nothing is configured.
pub const DEFAULT_SSO_ROUTE: &str = "EMPTY";

fn default_sso_path() -> String {
    DEFAULT_SSO_PATH.to_string()
}

fn default_sso_route() -> String {
    DEFAULT_SSO_ROUTE.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdpConfig {
    /// Base URL for `/example/token` and `/example/userdata`.
    #[serde(default = "default_sso_path")]
    pub sso_path: String,

    /// Base URL the browser is sent to for `/oauth2/auth`.
    #[serde(default = "default_sso_route")]
    pub sso_route: String,
}

impl Default for IdpConfig {
    fn default() -> Self {
        Self {
            sso_path: default_sso_path(),
            sso_route: default_sso_route(),
        }
    }
}

impl IdpConfig {
    /// The API base must be an absolute http(s) URL to be reachable.
    pub fn is_configured(&self) -> bool {
        is_http_url(&self.sso_path)
    }

    /// Fail with `ConfigError::InvalidValue` naming the first unusable field.
    ///
    /// # Errors
    ///
    /// Returns an error if `sso_path` or `sso_route` is not an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_http_url(&self.sso_path) {
            return Err(ConfigError::InvalidValue {
                field: "idp.sso_path".into(),
                reason: format!("'{}' is not an absolute http(s) URL", self.sso_path),
            });
        }
        if !is_http_url(&self.sso_route) {
            return Err(ConfigError::InvalidValue {
                field: "idp.sso_route".into(),
                reason: format!("'{}' is not an absolute http(s) URL", self.sso_route),
            });
        }
        Ok(())
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}

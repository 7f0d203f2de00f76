use thiserror::Error;

use crate::classify;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The browser was sent to the SSO login page; carries the configured route.
    #[error("{route}")]
    RedirectInitiated { route: String },

    #[error("account is disabled")]
    AccountDisabled,

    /// Non-2xx response from the identity provider or the log endpoint.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Upstream {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("invalid location: {0}")]
    InvalidLocation(String),

    #[error("token store error: {0}")]
    TokenStore(String),

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error(transparent)]
    Core(#[from] gate_core::CoreError),
}

impl AuthError {
    /// True when the identity provider rejected the credential itself
    /// (expired, revoked, unknown code), meaning a retry with another
    /// credential can still succeed.
    ///
    /// Only HTTP error responses are ever classified; transport and decode
    /// failures are always fatal.
    #[must_use]
    pub fn is_credential_invalid(&self) -> bool {
        match self {
            Self::Upstream { body, .. } => classify::is_credential_invalid(body),
            _ => false,
        }
    }
}

//! # gate-auth
//!
//! SSO session acquisition for Gatehouse.
//!
//! Turns whatever credentials are at hand (stored access or refresh
//! credential, or an authorization code on the current location) into an
//! authenticated user profile, or sends the browser to the SSO login page.
//! Also provides the credential store backends (keyring, file, memory), the
//! identity provider client, error classification, and audit emission.

pub mod audit;
pub mod classify;
pub mod error;
pub mod gateway;
pub mod navigator;
pub mod session;
pub mod token_store;

pub use error::AuthError;
pub use navigator::{BrowserNavigator, Navigator};
pub use session::{LogOptions, LoginOptions, SessionConfig, SessionMachine, SessionOutcome};
pub use token_store::{CredentialKind, CredentialStore, FileStore, KeyringStore, MemoryStore};

/// Clear stored credentials.
///
/// # Errors
///
/// Returns `AuthError::TokenStore` if a credential cannot be removed.
pub fn logout(store: &dyn CredentialStore) -> Result<(), AuthError> {
    token_store::clear(store)
}

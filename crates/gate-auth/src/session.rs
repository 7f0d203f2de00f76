//! Session acquisition.
//!
//! Decides, from the stored credentials and the current location, how to end
//! up with an authenticated [`UserProfile`]:
//!
//! 1. stored access credential → fetch profile
//! 2. stored refresh credential → refresh grant → fetch profile
//! 3. `code` query parameter → authorization-code grant → fetch profile
//! 4. nothing usable → send the browser to the SSO login page
//!
//! A credential the provider rejects as invalid is cleared and the decision
//! starts over. Each credential source is tried at most once per call, so the
//! loop ends after [`MAX_PASSES`] passes.

use gate_config::{DEFAULT_LOG_PATH, DEFAULT_SSO_PATH, DEFAULT_SSO_ROUTE, GatehouseConfig};
use gate_core::UserProfile;
use serde::{Deserialize, Serialize};

use crate::audit::{AuditClient, AuditRecord, AuditTarget};
use crate::error::AuthError;
use crate::gateway::{IdpClient, TokenResponse};
use crate::navigator::{Navigator, authorization_code, login_url};
use crate::token_store::{self, CredentialKind, CredentialStore};

/// Initial pass plus one re-entry per clearable credential kind.
pub const MAX_PASSES: usize = 3;

/// Endpoints used by a [`SessionMachine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub sso_path: String,
    pub sso_route: String,
    pub log_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sso_path: DEFAULT_SSO_PATH.to_string(),
            sso_route: DEFAULT_SSO_ROUTE.to_string(),
            log_path: DEFAULT_LOG_PATH.to_string(),
        }
    }
}

impl From<&GatehouseConfig> for SessionConfig {
    fn from(config: &GatehouseConfig) -> Self {
        Self {
            sso_path: config.idp.sso_path.clone(),
            sso_route: config.idp.sso_route.clone(),
            log_path: config.audit.path.clone(),
        }
    }
}

/// Per-call overrides. Endpoint overrides stick to the machine for later calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOptions {
    #[serde(default)]
    pub sso_path: Option<String>,
    #[serde(default)]
    pub sso_route: Option<String>,
    #[serde(default)]
    pub logs: Option<LogOptions>,
}

/// Audit emission settings. Emission happens only when namespace, type and token are all given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogOptions {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl LogOptions {
    #[must_use]
    pub fn target(&self) -> Option<AuditTarget> {
        Some(AuditTarget {
            namespace: self.namespace.clone()?,
            kind: self.kind.clone()?,
            token: self.token.clone()?,
        })
    }
}

/// Terminal result of a session acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Authenticated(Box<UserProfile>),
    /// The browser has already been sent to the login page at `route`.
    RedirectRequired { route: String },
    /// The profile resolved but the account is disabled. Credentials are kept.
    Disabled,
}

/// Where the access credential used in a pass came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    StoredAccess,
    RefreshGrant,
    CodeGrant,
}

enum AccessStep {
    Ready(String),
    Retry,
    Redirect,
}

/// Drives session acquisition against one credential store and one browser location.
///
/// Not meant to be shared between concurrent callers: each call reads and
/// writes the credential store without coordination.
pub struct SessionMachine<S, N> {
    config: SessionConfig,
    store: S,
    navigator: N,
    http: reqwest::Client,
}

impl<S: CredentialStore, N: Navigator> SessionMachine<S, N> {
    pub fn new(config: SessionConfig, store: S, navigator: N) -> Self {
        Self {
            config,
            store,
            navigator,
            http: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured HTTP client (proxies, TLS roots).
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Merge the endpoint overrides that are present into the machine's config.
    pub fn configure(&mut self, options: &LoginOptions) {
        if let Some(sso_path) = &options.sso_path {
            self.config.sso_path.clone_from(sso_path);
        }
        if let Some(sso_route) = &options.sso_route {
            self.config.sso_route.clone_from(sso_route);
        }
        if let Some(path) = options.logs.as_ref().and_then(|logs| logs.path.as_ref()) {
            self.config.log_path.clone_from(path);
        }
    }

    /// Resolve a session, returning the terminal outcome.
    ///
    /// # Errors
    ///
    /// Provider failures that are not credential rejections, audit delivery
    /// failures, and credential store or navigation errors. Credentials touched
    /// by the failing step are cleared before the error is returned.
    pub async fn acquire(
        &mut self,
        options: Option<&LoginOptions>,
    ) -> Result<SessionOutcome, AuthError> {
        if let Some(options) = options {
            self.configure(options);
        }
        let audit = options
            .and_then(|o| o.logs.as_ref())
            .and_then(LogOptions::target);
        let code = authorization_code(self.navigator.location());
        let idp = IdpClient::new(self.http.clone(), &self.config.sso_path);

        let mut tried = Vec::with_capacity(MAX_PASSES);
        for pass in 1..=MAX_PASSES {
            tracing::debug!(pass, has_code = code.is_some(), "session acquisition pass");

            let access = match self.obtain_access(&idp, code.as_deref(), &mut tried).await? {
                AccessStep::Ready(access) => access,
                AccessStep::Retry => continue,
                AccessStep::Redirect => return self.redirect(),
            };

            if let Some(outcome) = self.resolve_profile(&idp, &access, audit.as_ref()).await? {
                return Ok(outcome);
            }
        }

        tracing::warn!(passes = MAX_PASSES, "every credential source was rejected");
        self.redirect()
    }

    /// Like [`Self::acquire`], but non-authenticated outcomes become errors.
    ///
    /// # Errors
    ///
    /// `AuthError::RedirectInitiated` after sending the browser to the login
    /// page, `AuthError::AccountDisabled` for a disabled account, and every
    /// error [`Self::acquire`] can return.
    pub async fn acquire_profile(
        &mut self,
        options: Option<&LoginOptions>,
    ) -> Result<UserProfile, AuthError> {
        match self.acquire(options).await? {
            SessionOutcome::Authenticated(profile) => Ok(*profile),
            SessionOutcome::RedirectRequired { route } => {
                Err(AuthError::RedirectInitiated { route })
            }
            SessionOutcome::Disabled => Err(AuthError::AccountDisabled),
        }
    }

    async fn obtain_access(
        &self,
        idp: &IdpClient,
        code: Option<&str>,
        tried: &mut Vec<Source>,
    ) -> Result<AccessStep, AuthError> {
        if let Some(access) = self.store.get(CredentialKind::Access)? {
            if !tried.contains(&Source::StoredAccess) {
                tried.push(Source::StoredAccess);
                return Ok(AccessStep::Ready(access));
            }
            tracing::warn!("ignoring access credential already rejected in this call");
        }

        if let Some(refresh) = self.store.get(CredentialKind::Refresh)?
            && !tried.contains(&Source::RefreshGrant)
        {
            tried.push(Source::RefreshGrant);
            return match idp.refresh_grant(&refresh).await {
                Ok(tokens) => {
                    tracing::debug!("refresh grant succeeded");
                    self.store.set(CredentialKind::Access, &tokens.access_token)?;
                    if let Some(rotated) = tokens.refresh_token.as_deref().filter(|r| !r.is_empty()) {
                        self.store.set(CredentialKind::Refresh, rotated)?;
                    }
                    Ok(AccessStep::Ready(tokens.access_token))
                }
                Err(error) => {
                    self.store.remove(CredentialKind::Refresh)?;
                    if error.is_credential_invalid() {
                        tracing::warn!(%error, "refresh credential rejected; cleared and retrying");
                        Ok(AccessStep::Retry)
                    } else {
                        Err(error)
                    }
                }
            };
        }

        let Some(code) = code.filter(|_| !tried.contains(&Source::CodeGrant)) else {
            return Ok(AccessStep::Redirect);
        };
        tried.push(Source::CodeGrant);

        match idp.code_grant(code).await {
            Ok(tokens) => {
                tracing::debug!("authorization code exchanged");
                self.store_tokens(&tokens)?;
                Ok(AccessStep::Ready(tokens.access_token))
            }
            Err(error) if error.is_credential_invalid() => {
                tracing::warn!(%error, "authorization code rejected");
                Ok(AccessStep::Redirect)
            }
            Err(error) => Err(error),
        }
    }

    fn store_tokens(&self, tokens: &TokenResponse) -> Result<(), AuthError> {
        self.store.set(CredentialKind::Access, &tokens.access_token)?;
        match tokens.refresh_token.as_deref().filter(|r| !r.is_empty()) {
            Some(refresh) => self.store.set(CredentialKind::Refresh, refresh),
            None => self.store.remove(CredentialKind::Refresh),
        }
    }

    /// `Ok(None)` means the access credential was rejected and cleared.
    async fn resolve_profile(
        &self,
        idp: &IdpClient,
        access: &str,
        audit: Option<&AuditTarget>,
    ) -> Result<Option<SessionOutcome>, AuthError> {
        match idp.user_profile(access).await {
            Ok(profile) if !profile.enabled => {
                tracing::info!("account is disabled");
                Ok(Some(SessionOutcome::Disabled))
            }
            Ok(profile) => {
                if let Some(target) = audit {
                    AuditClient::new(self.http.clone())
                        .emit(&self.config.log_path, target, &AuditRecord::from(&profile))
                        .await?;
                }
                tracing::info!("session authenticated");
                Ok(Some(SessionOutcome::Authenticated(Box::new(profile))))
            }
            Err(error) => {
                token_store::clear(&self.store)?;
                if error.is_credential_invalid() {
                    tracing::warn!(%error, "access credential rejected; cleared and retrying");
                    Ok(None)
                } else {
                    Err(error)
                }
            }
        }
    }

    fn redirect(&mut self) -> Result<SessionOutcome, AuthError> {
        let route = self.config.sso_route.clone();
        let url = login_url(&route, self.navigator.location());
        tracing::info!(%route, "redirecting to SSO login");
        self.navigator.assign(&url)?;
        Ok(SessionOutcome::RedirectRequired { route })
    }
}

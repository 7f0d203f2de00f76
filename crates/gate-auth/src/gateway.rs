//! Identity provider API: token exchange and user profile.
//!
//! Requests carry no client timeout and are never retried here; retry
//! decisions belong to the session machine.

use gate_core::UserProfile;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Successful token endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    /// Absent on some refresh grants.
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
enum TokenRequest<'a> {
    RefreshToken { refresh_token: &'a str },
    AuthorizationCode { code: &'a str },
}

/// Client for `{sso_path}/example/token` and `{sso_path}/example/userdata`.
#[derive(Debug, Clone)]
pub struct IdpClient {
    http: reqwest::Client,
    base: String,
}

impl IdpClient {
    #[must_use]
    pub fn new(http: reqwest::Client, sso_path: &str) -> Self {
        Self {
            http,
            base: sso_path.trim_end_matches('/').to_string(),
        }
    }

    /// Exchange a refresh credential for a new access credential.
    ///
    /// # Errors
    ///
    /// `AuthError::Upstream` on a non-2xx response, `Transport` if the request
    /// cannot be sent, `Decode` if the success body is not a token response.
    pub async fn refresh_grant(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        self.token(&TokenRequest::RefreshToken { refresh_token }).await
    }

    /// Exchange an authorization code for access and refresh credentials.
    ///
    /// # Errors
    ///
    /// Same as [`Self::refresh_grant`].
    pub async fn code_grant(&self, code: &str) -> Result<TokenResponse, AuthError> {
        self.token(&TokenRequest::AuthorizationCode { code }).await
    }

    /// Fetch the profile belonging to an access credential.
    ///
    /// # Errors
    ///
    /// Same as [`Self::refresh_grant`].
    pub async fn user_profile(&self, access_token: &str) -> Result<UserProfile, AuthError> {
        let endpoint = format!("{}/example/userdata", self.base);
        let resp = self
            .http
            .get(&endpoint)
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await
            .map_err(|e| AuthError::Transport(format!("{endpoint}: {e}")))?;

        read_json(&endpoint, resp).await
    }

    async fn token(&self, body: &TokenRequest<'_>) -> Result<TokenResponse, AuthError> {
        let endpoint = format!("{}/example/token", self.base);
        let resp = self
            .http
            .post(&endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Transport(format!("{endpoint}: {e}")))?;

        read_json(&endpoint, resp).await
    }
}

/// Turn a non-2xx response into `AuthError::Upstream`, keeping the body for classification.
pub(crate) async fn ensure_success(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, AuthError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(AuthError::Upstream {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

async fn read_json<T: serde::de::DeserializeOwned>(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<T, AuthError> {
    ensure_success(endpoint, resp)
        .await?
        .json::<T>()
        .await
        .map_err(|e| AuthError::Decode(format!("{endpoint}: {e}")))
}

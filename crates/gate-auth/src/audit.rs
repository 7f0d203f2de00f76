//! Audit emission of profile metadata after a successful login.

use gate_core::UserProfile;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::gateway::ensure_success;

/// Where audit records go. Only built when namespace, type and token are all known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditTarget {
    pub namespace: String,
    pub kind: String,
    pub token: String,
}

/// Fixed projection of the profile sent to the log endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditRecord {
    pub enabled: bool,
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub fullname: String,
    pub name: String,
    pub surname: String,
    pub source: String,
}

impl From<&UserProfile> for AuditRecord {
    fn from(profile: &UserProfile) -> Self {
        Self {
            enabled: profile.enabled,
            client_id: profile.client_id.clone(),
            email: profile.email.clone(),
            fullname: profile.fullname.clone(),
            name: profile.name.clone(),
            surname: profile.surname.clone(),
            source: profile.source.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuditClient {
    http: reqwest::Client,
}

impl AuditClient {
    #[must_use]
    pub const fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// `POST {log_path}/ingest/{namespace}/{type}` with `X-API-KEY`.
    ///
    /// Sent once; failures are returned as-is and never classified.
    ///
    /// # Errors
    ///
    /// `AuthError::Upstream` on a non-2xx response, `Transport` if the request cannot be sent.
    pub async fn emit(
        &self,
        log_path: &str,
        target: &AuditTarget,
        record: &AuditRecord,
    ) -> Result<(), AuthError> {
        let endpoint = format!(
            "{}/ingest/{}/{}",
            log_path.trim_end_matches('/'),
            target.namespace,
            target.kind
        );
        let resp = self
            .http
            .post(&endpoint)
            .header("X-API-KEY", &target.token)
            .json(record)
            .send()
            .await
            .map_err(|e| AuthError::Transport(format!("{endpoint}: {e}")))?;

        ensure_success(&endpoint, resp).await?;
        tracing::debug!(namespace = %target.namespace, kind = %target.kind, "audit record delivered");
        Ok(())
    }
}

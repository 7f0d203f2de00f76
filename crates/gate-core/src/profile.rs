use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// User profile as returned by the identity provider's userdata endpoint.
///
/// Treated as read-only by the session machinery and never persisted.
/// Fields the provider sends that Gatehouse has no use for (`groups`,
/// `vaults`, `conditions`) are ignored on deserialization. Everything but
/// `permissions` falls back to its default when missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UserProfile {
    /// A disabled account resolves to a valid profile but must not get a session.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub client_id: String,
    /// `None` when the provider sent no email or a non-string value.
    #[serde(default, deserialize_with = "string_or_absent")]
    #[schemars(with = "Option<String>")]
    pub email: Option<String>,
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub organizations: Vec<Organization>,
    /// Required: a profile without a permission list is rejected on deserialization.
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Tenant the user belongs to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Organization {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub deleted: bool,
}

/// A dot-namespaced grant such as `example-app.read`, optionally scoped to one organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Permission {
    pub key: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub inherit: bool,
}

impl Permission {
    /// Segment of the key before the first `.`; the whole key if it has no dot.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.key
            .split_once('.')
            .map_or(self.key.as_str(), |(namespace, _)| namespace)
    }

    /// Enabled and not soft-deleted.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.enabled && !self.deleted
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Role {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub inherit: bool,
}

fn string_or_absent<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_str().map(str::to_owned)))
}

//! Pure projections over a resolved [`UserProfile`].
//!
//! Each helper fails fast with [`CoreError::Validation`] on structurally
//! invalid input instead of returning an empty result. A profile without a
//! permission list never gets this far: [`UserProfile`] refuses to
//! deserialize it.

use crate::errors::CoreError;
use crate::profile::UserProfile;

/// Returned by [`tenant_for`] when the user has no tenant for the namespace.
pub const NO_TENANT: &str = "NO_TENANT";

fn require_namespace(namespace: &str) -> Result<(), CoreError> {
    if namespace.is_empty() {
        return Err(CoreError::Validation("namespace is required".into()));
    }
    Ok(())
}

/// Keys of the active permissions under `namespace`, in profile order.
///
/// # Errors
///
/// Returns `CoreError::Validation` if `namespace` is empty.
pub fn permissions_for<'a>(
    profile: &'a UserProfile,
    namespace: &str,
) -> Result<Vec<&'a str>, CoreError> {
    require_namespace(namespace)?;

    Ok(profile
        .permissions
        .iter()
        .filter(|p| p.is_active() && p.namespace() == namespace)
        .map(|p| p.key.as_str())
        .collect())
}

/// Username of the profile, which is its email.
///
/// # Errors
///
/// Returns `CoreError::Validation` if the profile is absent or carries no string email.
pub fn username_of(profile: Option<&UserProfile>) -> Result<&str, CoreError> {
    profile
        .and_then(|p| p.email.as_deref())
        .ok_or_else(|| CoreError::Validation("invalid user info".into()))
}

/// Organization attached to the first active `{namespace}.read` permission.
///
/// Falls back to [`NO_TENANT`] when there is no such permission or it has no
/// organization. Later matches are never consulted.
///
/// # Errors
///
/// Returns `CoreError::Validation` if `namespace` is empty.
pub fn tenant_for<'a>(profile: &'a UserProfile, namespace: &str) -> Result<&'a str, CoreError> {
    require_namespace(namespace)?;

    let read_key = format!("{namespace}.read");
    let tenant = profile
        .permissions
        .iter()
        .find(|p| p.key == read_key && p.is_active())
        .and_then(|p| p.organization.as_deref())
        .unwrap_or(NO_TENANT);

    Ok(tenant)
}

use gate_auth::AuthError;
use gate_config::GatehouseConfig;
use serde::Serialize;

use crate::cli::{GlobalFlags, WhoamiArgs};
use crate::output::output;

#[derive(Serialize)]
struct WhoamiResponse {
    username: String,
    namespace: String,
    permissions: Vec<String>,
    tenant: String,
}

pub async fn handle(
    args: &WhoamiArgs,
    flags: &GlobalFlags,
    config: &GatehouseConfig,
) -> anyhow::Result<()> {
    let mut session = super::session_for(&args.page, config)?;

    let profile = session
        .acquire_profile(None)
        .await
        .map_err(|error| match error {
            AuthError::RedirectInitiated { route } => anyhow::anyhow!(
                "not signed in; finish SSO login at {route} and rerun with the returned code in --location"
            ),
            other => anyhow::Error::from(other),
        })?;

    let response = WhoamiResponse {
        username: gate_core::username_of(Some(&profile))?.to_string(),
        namespace: args.namespace.clone(),
        permissions: gate_core::permissions_for(&profile, &args.namespace)?
            .into_iter()
            .map(str::to_owned)
            .collect(),
        tenant: gate_core::tenant_for(&profile, &args.namespace)?.to_string(),
    };

    output(&response, flags.format)
}

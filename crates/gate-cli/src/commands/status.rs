use gate_auth::CredentialKind;
use gate_config::GatehouseConfig;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Serialize)]
struct StatusResponse {
    backend: &'static str,
    access_token: bool,
    refresh_token: bool,
    sso_path: String,
    sso_route: String,
    idp_configured: bool,
    audit_configured: bool,
}

pub fn handle(flags: &GlobalFlags, config: &GatehouseConfig) -> anyhow::Result<()> {
    let store = gate_auth::token_store::open(&config.store)?;

    output(
        &StatusResponse {
            backend: store.backend_name(),
            access_token: store.get(CredentialKind::Access)?.is_some(),
            refresh_token: store.get(CredentialKind::Refresh)?.is_some(),
            sso_path: config.idp.sso_path.clone(),
            sso_route: config.idp.sso_route.clone(),
            idp_configured: config.idp.is_configured(),
            audit_configured: config.audit.is_configured(),
        },
        flags.format,
    )
}

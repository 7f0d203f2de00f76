use gate_config::GatehouseConfig;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Serialize)]
struct LogoutResponse {
    cleared: bool,
    backend: &'static str,
}

pub fn handle(flags: &GlobalFlags, config: &GatehouseConfig) -> anyhow::Result<()> {
    let store = gate_auth::token_store::open(&config.store)?;
    gate_auth::logout(store.as_ref())?;
    output(
        &LogoutResponse {
            cleared: true,
            backend: store.backend_name(),
        },
        flags.format,
    )
}

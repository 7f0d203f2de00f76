use gate_auth::{LogOptions, LoginOptions, Navigator, SessionOutcome};
use gate_config::GatehouseConfig;
use serde::Serialize;

use crate::cli::{GlobalFlags, LoginArgs};
use crate::output::output;

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum LoginResponse {
    Authenticated {
        username: Option<String>,
        client_id: String,
        source: String,
    },
    Redirect {
        route: String,
        url: Option<String>,
    },
    Disabled,
}

pub async fn handle(
    args: &LoginArgs,
    flags: &GlobalFlags,
    config: &GatehouseConfig,
) -> anyhow::Result<()> {
    let mut session = super::session_for(&args.page, config)?;
    tracing::debug!(location = %session.navigator().location(), "resolving session");

    let options = login_options(args, config);
    let response = match session.acquire(Some(&options)).await? {
        SessionOutcome::Authenticated(profile) => LoginResponse::Authenticated {
            username: profile.email.clone(),
            client_id: profile.client_id.clone(),
            source: profile.source.clone(),
        },
        SessionOutcome::RedirectRequired { route } => LoginResponse::Redirect {
            route,
            url: session.navigator().history().last().cloned(),
        },
        SessionOutcome::Disabled => LoginResponse::Disabled,
    };

    output(&response, flags.format)
}

/// Flags win over configured audit settings; endpoint overrides come from flags only.
fn login_options(args: &LoginArgs, config: &GatehouseConfig) -> LoginOptions {
    let audit = &config.audit;
    LoginOptions {
        sso_path: args.sso_path.clone(),
        sso_route: args.sso_route.clone(),
        logs: Some(LogOptions {
            namespace: args
                .log_namespace
                .clone()
                .or_else(|| non_empty(&audit.namespace)),
            kind: args.log_type.clone().or_else(|| non_empty(&audit.kind)),
            token: args.log_token.clone().or_else(|| non_empty(&audit.token)),
            path: args.log_path.clone(),
        }),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

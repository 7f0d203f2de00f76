pub mod login;
pub mod logout;
pub mod schema;
pub mod status;
pub mod whoami;

use gate_auth::{BrowserNavigator, CredentialStore, SessionConfig, SessionMachine};
use gate_config::GatehouseConfig;

use crate::cli::{Commands, GlobalFlags, LocationArgs};

pub type CliSession = SessionMachine<Box<dyn CredentialStore>, BrowserNavigator>;

/// Route a parsed command to its handler.
pub async fn dispatch(
    command: &Commands,
    flags: &GlobalFlags,
    config: &GatehouseConfig,
) -> anyhow::Result<()> {
    match command {
        Commands::Login(args) => login::handle(args, flags, config).await,
        Commands::Logout => logout::handle(flags, config),
        Commands::Status => status::handle(flags, config),
        Commands::Whoami(args) => whoami::handle(args, flags, config).await,
        Commands::Schema => schema::handle(flags),
    }
}

/// Build a session machine for the page, backed by the configured credential store.
pub fn session_for(page: &LocationArgs, config: &GatehouseConfig) -> anyhow::Result<CliSession> {
    let store = gate_auth::token_store::open(&config.store)?;
    let mut navigator = BrowserNavigator::parse(&page.location)?;
    if page.no_browser {
        navigator = navigator.headless();
    }
    Ok(SessionMachine::new(
        SessionConfig::from(config),
        store,
        navigator,
    ))
}

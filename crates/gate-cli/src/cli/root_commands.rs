use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Resolve a session for a page, redirecting to SSO login when needed.
    Login(LoginArgs),
    /// Clear stored credentials.
    Logout,
    /// Show which credentials are stored and where.
    Status,
    /// Resolve a session and print username, permissions and tenant for a namespace.
    Whoami(WhoamiArgs),
    /// Print the JSON schema of the user profile.
    Schema,
}

/// The page a session is being resolved for.
#[derive(Clone, Debug, Args)]
pub struct LocationArgs {
    /// Current page URL; its `code` query parameter is used as the authorization code.
    #[arg(long)]
    pub location: String,
    /// Print the SSO login URL instead of opening a browser.
    #[arg(long)]
    pub no_browser: bool,
}

#[derive(Clone, Debug, Args)]
pub struct LoginArgs {
    #[command(flatten)]
    pub page: LocationArgs,
    /// Override the identity provider API base URL.
    #[arg(long)]
    pub sso_path: Option<String>,
    /// Override the identity provider login UI base URL.
    #[arg(long)]
    pub sso_route: Option<String>,
    /// Audit ingest namespace.
    #[arg(long)]
    pub log_namespace: Option<String>,
    /// Audit ingest record type.
    #[arg(long)]
    pub log_type: Option<String>,
    /// Audit ingest API key.
    #[arg(long)]
    pub log_token: Option<String>,
    /// Override the audit ingest base URL.
    #[arg(long)]
    pub log_path: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct WhoamiArgs {
    #[command(flatten)]
    pub page: LocationArgs,
    /// Permission namespace (the part before the first `.` in permission keys).
    #[arg(short, long)]
    pub namespace: String,
}

use reqwest::Url;

use crate::error::AuthError;

/// Query parameter carrying the authorization code after an SSO round-trip.
pub const CODE_PARAM: &str = "code";

/// The browser location the session is being acquired for, plus the ability
/// to send the browser elsewhere.
pub trait Navigator {
    /// Current page, including its query string.
    fn location(&self) -> &Url;

    /// Send the browser to `url`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Navigation` if the navigation cannot be started.
    fn assign(&mut self, url: &str) -> Result<(), AuthError>;
}

/// Authorization code from the `code` query parameter, if present and non-empty.
#[must_use]
pub fn authorization_code(location: &Url) -> Option<String> {
    location
        .query_pairs()
        .find(|(key, _)| key == CODE_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
}

/// `{sso_route}/oauth2/auth?redirect_uri={origin}{path}`.
///
/// The redirect URI is the current origin and path without the query string,
/// so a stale `code` never travels back to the provider.
#[must_use]
pub fn login_url(sso_route: &str, location: &Url) -> String {
    format!(
        "{sso_route}/oauth2/auth?redirect_uri={origin}{path}",
        origin = location.origin().ascii_serialization(),
        path = location.path(),
    )
}

/// Opens navigations in the system browser.
///
/// Every assigned URL is also kept in [`history`](Self::history), and
/// launching can be turned off for headless use.
#[derive(Debug, Clone)]
pub struct BrowserNavigator {
    location: Url,
    launch: bool,
    history: Vec<String>,
}

impl BrowserNavigator {
    /// # Errors
    ///
    /// Returns `AuthError::InvalidLocation` unless `location` is an absolute http(s) URL.
    pub fn parse(location: &str) -> Result<Self, AuthError> {
        let url = Url::parse(location)
            .map_err(|e| AuthError::InvalidLocation(format!("{location}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AuthError::InvalidLocation(format!(
                "{location}: expected an http(s) URL"
            )));
        }
        Ok(Self {
            location: url,
            launch: true,
            history: Vec::new(),
        })
    }

    /// Record and print navigations without opening a browser.
    #[must_use]
    pub const fn headless(mut self) -> Self {
        self.launch = false;
        self
    }

    /// URLs assigned so far, oldest first.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl Navigator for BrowserNavigator {
    fn location(&self) -> &Url {
        &self.location
    }

    fn assign(&mut self, url: &str) -> Result<(), AuthError> {
        self.history.push(url.to_string());

        if !self.launch {
            eprintln!("Continue login at: {url}");
            return Ok(());
        }

        eprintln!("Opening browser to: {url}");
        if let Err(error) = open::that(url) {
            eprintln!("Failed to open browser: {error}");
            eprintln!("Open the URL above manually, then return here.");
        }
        Ok(())
    }
}

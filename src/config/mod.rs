use crate::core::{ConsoleError, Result};
use reqwest::Url;
use std::time::Duration;

pub const ENV_SERVER_URL: &str = "REALMCONSOLE_SERVER_URL";
pub const ENV_REALM: &str = "REALMCONSOLE_REALM";
pub const ENV_TOKEN: &str = "REALMCONSOLE_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "REALMCONSOLE_TIMEOUT_SECS";

/// Where and how the console talks to the admin API
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Base URL of the identity server, e.g. `https://sso.example.com`
    pub server_url: String,

    /// Realm every admin call is scoped to
    pub realm: String,

    /// Bearer token sent with each request
    pub access_token: Option<String>,

    /// Per-request timeout enforced by the HTTP client
    pub request_timeout: Duration,

    pub user_agent: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            realm: "master".to_string(),
            access_token: None,
            request_timeout: Duration::from_secs(30),
            user_agent: format!("realmconsole/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ConsoleConfig {
    pub fn new(server_url: &str, realm: &str) -> Self {
        Self::default().server_url(server_url).realm(realm)
    }

    /// Set the server base URL
    pub fn server_url(mut self, url: &str) -> Self {
        self.server_url = url.to_string();
        self
    }

    /// Set the realm
    pub fn realm(mut self, realm: &str) -> Self {
        self.realm = realm.to_string();
        self
    }

    /// Set the bearer token
    pub fn access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: &str) -> Self {
        self.user_agent = agent.to_string();
        self
    }

    /// Reads `REALMCONSOLE_*` variables over the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_SERVER_URL) {
            config.server_url = url;
        }
        if let Some(realm) = lookup(ENV_REALM) {
            config.realm = realm;
        }
        config.access_token = lookup(ENV_TOKEN).filter(|token| !token.is_empty());
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs = secs.trim().parse::<u64>().map_err(|_| {
                ConsoleError::Config(format!(
                    "{} must be a whole number of seconds",
                    ENV_TIMEOUT_SECS
                ))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Parsed server URL
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.server_url).map_err(|e| {
            ConsoleError::Config(format!("Invalid server url '{}': {}", self.server_url, e))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConsoleError::Config(format!("Unsupported url scheme '{}'", other))),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;

        if self.realm.trim().is_empty() {
            return Err(ConsoleError::Config("Realm cannot be empty".to_string()));
        }

        if self.request_timeout.is_zero() {
            return Err(ConsoleError::Config("request_timeout must be > 0".to_string()));
        }

        Ok(())
    }
}

//! Graph client configuration.

use std::time::Duration;

use url::Url;

/// Application credentials for the OAuth 2.0 client credentials grant.
///
/// These identify an app registration in Microsoft Entra ID; the app acts
/// on its own behalf with application permissions (e.g. `User.Read.All`,
/// `Calendars.ReadWrite`).
#[derive(Clone)]
pub struct ClientCredentials {
    /// Application (client) ID of the app registration.
    pub client_id: String,
    /// Client secret value.
    pub client_secret: String,
    /// Directory (tenant) ID or verified domain.
    pub tenant_id: String,
}

impl ClientCredentials {
    /// Creates new client credentials.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            tenant_id: tenant_id.into(),
        }
    }

    /// Validates that all fields are present.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.trim().is_empty() {
            return Err("client_id is required");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        if self.tenant_id.trim().is_empty() {
            return Err("tenant_id is required");
        }
        if self.tenant_id.contains('/') {
            return Err("tenant_id must not contain '/'");
        }
        Ok(())
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Configuration for the Graph client.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// App credentials used to acquire tokens.
    pub credentials: ClientCredentials,

    /// Graph REST base URL, including the version segment.
    pub api_base: String,

    /// Identity platform authority host.
    pub authority: String,

    /// Time zone Graph should use when rendering event times.
    ///
    /// Sent as `Prefer: outlook.timezone="..."`. Windows or IANA names are
    /// both accepted by the service.
    pub timezone: String,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string for API requests.
    pub user_agent: String,

    /// OAuth scopes to request.
    pub scopes: Vec<String>,
}

impl GraphConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default Graph endpoint.
    pub const DEFAULT_API_BASE: &'static str = "https://graph.microsoft.com/v1.0";

    /// Default identity platform authority.
    pub const DEFAULT_AUTHORITY: &'static str = "https://login.microsoftonline.com";

    /// Scope for application permissions granted to the app registration.
    pub const DEFAULT_SCOPE: &'static str = "https://graph.microsoft.com/.default";

    /// Time zone used when none is configured.
    pub const DEFAULT_TIMEZONE: &'static str = "UTC";

    /// Creates a new configuration with the given credentials.
    pub fn new(credentials: ClientCredentials) -> Self {
        Self {
            credentials,
            api_base: Self::DEFAULT_API_BASE.to_string(),
            authority: Self::DEFAULT_AUTHORITY.to_string(),
            timezone: Self::DEFAULT_TIMEZONE.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("graphcal/{}", env!("CARGO_PKG_VERSION")),
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
        }
    }

    /// Sets the Graph base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Sets the identity platform authority.
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    /// Sets the preferred time zone for event times.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the token endpoint for the configured tenant.
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority.trim_end_matches('/'),
            urlencoding::encode(&self.credentials.tenant_id)
        )
    }

    /// Returns the Graph base URL without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }

    /// Returns the `Prefer` header value selecting the event time zone.
    pub fn prefer_timezone_header(&self) -> String {
        format!("outlook.timezone=\"{}\"", self.timezone)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.credentials
            .validate()
            .map_err(|e| format!("invalid credentials: {}", e))?;

        for (name, value) in [("api_base", &self.api_base), ("authority", &self.authority)] {
            let url =
                Url::parse(value).map_err(|e| format!("invalid {} '{}': {}", name, value, e))?;
            if url.scheme() != "https" && url.scheme() != "http" {
                return Err(format!("{} must be an http(s) URL", name));
            }
        }

        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }

        if self.timeout.is_zero() {
            return Err("timeout must be greater than zero".to_string());
        }

        if self.timezone.trim().is_empty() || self.timezone.contains('"') {
            return Err(format!("invalid timezone '{}'", self.timezone));
        }

        Ok(())
    }
}

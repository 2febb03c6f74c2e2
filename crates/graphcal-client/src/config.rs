//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/graphcal/config.toml` by default.
//!
//! Credential values (`client_id`, `client_secret`, `tenant_id`) support
//! secret references:
//! - `pass::path/in/store` resolved via `pass show`
//! - `env::VAR_NAME` resolved from the environment
//! - plain text used as-is

use std::path::{Path, PathBuf};
use std::time::Duration;

use graphcal_graph::{ClientCredentials, GraphConfig};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the graphcal client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Graph connection settings.
    pub graph: GraphSettings,

    /// Inputs for the `sample` command.
    pub sample: SampleSettings,
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if it does
    /// not exist.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
        config.graph.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("graphcal")
    }

    /// Returns a copy safe to print: literal secrets are masked, secret
    /// references are kept.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(ref secret) = config.graph.client_secret
            && !crate::secret::is_reference(secret)
        {
            config.graph.client_secret = Some("<redacted>".to_string());
        }
        config
    }
}

// ---------------------------------------------------------------------------
// GraphSettings
// ---------------------------------------------------------------------------

/// `[graph]` section: app registration and endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Application (client) ID.
    pub client_id: Option<String>,

    /// Client secret.
    pub client_secret: Option<String>,

    /// Directory (tenant) ID or domain.
    pub tenant_id: Option<String>,

    /// Windows time zone name sent in `Prefer: outlook.timezone`.
    pub timezone: Option<String>,

    /// Request timeout in seconds.
    pub timeout: u64,

    /// Graph API base URL.
    pub api_base: Option<String>,

    /// Identity platform authority URL.
    pub authority: Option<String>,

    /// File these settings were read from, named in error hints.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            tenant_id: None,
            timezone: None,
            timeout: GraphConfig::DEFAULT_TIMEOUT_SECS,
            api_base: None,
            authority: None,
            source: None,
        }
    }
}

/// Credential values given on the command line. They take precedence over
/// the file.
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub tenant_id: Option<String>,
}

impl GraphSettings {
    /// Builds the Graph client configuration.
    ///
    /// Resolves credentials (expanding `pass::` / `env::` references),
    /// applies endpoint settings and validates the result.
    pub fn to_graph_config(&self, overrides: &CredentialOverrides) -> Result<GraphConfig, String> {
        let credentials = self.resolve_credentials(overrides)?;
        let mut config =
            GraphConfig::new(credentials).with_timeout(Duration::from_secs(self.timeout));

        if let Some(ref api_base) = self.api_base {
            config = config.with_api_base(api_base);
        }
        if let Some(ref authority) = self.authority {
            config = config.with_authority(authority);
        }
        if let Some(ref timezone) = self.timezone {
            config = config.with_timezone(timezone);
        }

        config.validate()?;
        Ok(config)
    }

    /// Resolves the client credentials, preferring command-line values.
    pub(crate) fn resolve_credentials(
        &self,
        overrides: &CredentialOverrides,
    ) -> Result<ClientCredentials, String> {
        let source = self.source.clone().unwrap_or_else(ClientConfig::default_path);
        let client_id = pick("client_id", &overrides.client_id, &self.client_id, &source)?;
        let client_secret = pick(
            "client_secret",
            &overrides.client_secret,
            &self.client_secret,
            &source,
        )?;
        let tenant_id = pick("tenant_id", &overrides.tenant_id, &self.tenant_id, &source)?;

        let credentials = ClientCredentials::new(client_id, client_secret, tenant_id);
        credentials.validate().map_err(|e| e.to_string())?;
        Ok(credentials)
    }
}

/// Takes the command-line value over the file value and resolves secret
/// references. `source` is the config file named in the hint.
fn pick(
    name: &str,
    cli: &Option<String>,
    file: &Option<String>,
    source: &Path,
) -> Result<String, String> {
    let raw = cli.as_deref().or(file.as_deref()).ok_or_else(|| {
        format!(
            "{name} is not set. Add it to the [graph] section of {} or pass --{}",
            source.display(),
            name.replace('_', "-")
        )
    })?;
    crate::secret::resolve(raw).map_err(|e| format!("failed to resolve {}: {}", name, e))
}

// ---------------------------------------------------------------------------
// SampleSettings
// ---------------------------------------------------------------------------

/// `[sample]` section: inputs for the end-to-end walkthrough.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleSettings {
    /// Calendar view start (RFC 3339).
    pub start: String,

    /// Calendar view end (RFC 3339).
    pub end: String,

    /// Department matched by the filtered user query.
    pub department: String,

    /// Job title matched by the filtered user query.
    pub job_title: String,

    /// User whose calendar receives the sample event. Event creation is
    /// skipped when unset.
    pub organizer: Option<String>,

    /// Required attendee of the sample event.
    pub attendee: Option<String>,

    /// Local start of the sample event.
    pub event_start: String,

    /// Local end of the sample event.
    pub event_end: String,

    /// Time zone of the sample event.
    pub event_timezone: String,
}

impl Default for SampleSettings {
    fn default() -> Self {
        Self {
            start: "2021-07-01T00:00:00Z".to_string(),
            end: "2021-08-01T00:00:00Z".to_string(),
            department: "Test Department".to_string(),
            job_title: "Test Title".to_string(),
            organizer: None,
            attendee: None,
            event_start: "2021-07-20T12:00:00".to_string(),
            event_end: "2021-07-20T14:00:00".to_string(),
            event_timezone: "Tokyo Standard Time".to_string(),
        }
    }
}

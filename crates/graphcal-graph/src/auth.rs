//! OAuth 2.0 client credentials grant against the Microsoft identity platform.
//!
//! The app authenticates as itself (no user sign-in): the client ID and
//! secret are posted to the tenant's token endpoint and exchanged for a
//! bearer token scoped to Graph's application permissions.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::GraphConfig;
use crate::error::{GraphError, GraphResult};

/// A bearer token returned by the token endpoint.
#[derive(Clone)]
pub struct AccessToken {
    /// The token value sent in the `Authorization` header.
    pub secret: String,
    /// When the token expires, if the endpoint reported a lifetime.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Creates a token from an endpoint response.
    pub fn new(secret: impl Into<String>, expires_in_secs: Option<i64>) -> Self {
        Self {
            secret: secret.into(),
            expires_at: expires_in_secs.map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        }
    }

    /// Returns true if the token is past its reported expiry.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            None => false,
        }
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Acquires app-only tokens for Graph.
#[derive(Debug)]
pub struct TokenClient {
    config: GraphConfig,
    http_client: reqwest::Client,
}

impl TokenClient {
    /// Creates a token client for the given configuration.
    pub fn new(config: GraphConfig) -> GraphResult<Self> {
        let http_client = build_http_client(config.timeout, &config.user_agent)?;
        Ok(Self::with_http_client(config, http_client))
    }

    /// Creates a token client that shares an existing HTTP client.
    pub fn with_http_client(config: GraphConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Requests a new token with the client credentials grant.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the endpoint rejects the
    /// credentials (the `error_description` is included in the message),
    /// or a network error if the endpoint cannot be reached.
    pub async fn acquire_token(&self) -> GraphResult<AccessToken> {
        let credentials = &self.config.credentials;
        let scope = self.config.scopes.join(" ");
        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("scope", scope.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let url = self.config.token_url();
        debug!("requesting token from {}", url);

        let response = self
            .http_client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                GraphError::network(format!("token request failed: {}", e)).with_source(e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GraphError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| match e.error_description {
                    Some(description) => format!("{}: {}", e.error, description),
                    None => e.error,
                })
                .unwrap_or(body);
            return Err(GraphError::authentication(format!(
                "token request failed ({}): {}",
                status, detail
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            GraphError::invalid_response(format!("invalid token response: {}", e))
        })?;

        if let Some(ref token_type) = token.token_type
            && !token_type.eq_ignore_ascii_case("bearer")
        {
            return Err(GraphError::invalid_response(format!(
                "unsupported token type '{}'",
                token_type
            )));
        }

        info!(
            tenant = %credentials.tenant_id,
            expires_in = ?token.expires_in,
            "acquired app-only access token"
        );
        Ok(AccessToken::new(token.access_token, token.expires_in))
    }
}

/// Builds the shared reqwest client.
pub(crate) fn build_http_client(
    timeout: Duration,
    user_agent: &str,
) -> GraphResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| GraphError::internal(format!("failed to create HTTP client: {}", e)))
}

/// Successful response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Error response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

//! Error types for Microsoft Graph operations.
//!
//! Every failure from token acquisition or a Graph request is reported as a
//! [`GraphError`] carrying a [`GraphErrorCode`] for classification.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// The category of a Graph error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphErrorCode {
    /// Authentication failed or credentials are invalid.
    AuthenticationFailed,
    /// Authorization failed - the application lacks a permission.
    AuthorizationFailed,
    /// Network error - connection failed, timeout, DNS resolution, etc.
    NetworkError,
    /// Rate limit exceeded - too many requests.
    RateLimited,
    /// Server returned an error (5xx status codes).
    ServerError,
    /// Invalid response from the server - parse error, unexpected format.
    InvalidResponse,
    /// Resource not found (404).
    NotFound,
    /// Request was invalid (400) - bad parameters, malformed filter.
    BadRequest,
    /// Configuration error - missing or invalid config.
    ConfigurationError,
    /// Internal error - unexpected state, bug.
    InternalError,
}

impl GraphErrorCode {
    /// Returns true if this error is transient and the operation may be retried.
    ///
    /// This is informational; the client itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    /// Returns a human-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for GraphErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to Microsoft Graph or the identity
/// platform.
#[derive(Debug, Error)]
pub struct GraphError {
    code: GraphErrorCode,
    message: String,
    /// The Graph service error code (e.g. `ErrorInvalidUser`), if reported.
    service_code: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl GraphError {
    /// Creates a new error with the given code and message.
    pub fn new(code: GraphErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            service_code: None,
            source: None,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GraphErrorCode::AuthenticationFailed, message)
    }

    /// Creates an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(GraphErrorCode::AuthorizationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GraphErrorCode::NetworkError, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(GraphErrorCode::RateLimited, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(GraphErrorCode::ServerError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GraphErrorCode::InvalidResponse, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(GraphErrorCode::NotFound, message)
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(GraphErrorCode::BadRequest, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(GraphErrorCode::ConfigurationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(GraphErrorCode::InternalError, message)
    }

    /// Maps a transport failure from reqwest.
    pub fn from_transport(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timeout".to_string()
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            format!("request failed: {}", err)
        };
        Self::network(message).with_source(err)
    }

    /// Builds an error from a non-success HTTP status and its response body.
    ///
    /// Graph error bodies (`{"error": {"code": ..., "message": ...}}`) are
    /// unpacked; anything else is included verbatim.
    pub fn from_status(
        status: reqwest::StatusCode,
        body: &str,
        retry_after: Option<u64>,
    ) -> Self {
        let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
        let detail = match &parsed {
            Some(envelope) => envelope.error.message.clone(),
            None if body.trim().is_empty() => status.to_string(),
            None => body.trim().to_string(),
        };

        let err = match status.as_u16() {
            400 => Self::bad_request(detail),
            401 => Self::authentication(detail),
            403 => Self::authorization(detail),
            404 => Self::not_found(detail),
            429 => Self::rate_limited(format!(
                "{}{}",
                detail,
                retry_after
                    .map(|s| format!(", retry after {} seconds", s))
                    .unwrap_or_default()
            )),
            s if s >= 500 => Self::server(format!("API error ({}): {}", status, detail)),
            _ => Self::invalid_response(format!("unexpected status ({}): {}", status, detail)),
        };

        match parsed {
            Some(envelope) => err.with_service_code(envelope.error.code),
            None => err,
        }
    }

    /// Sets the Graph service error code.
    pub fn with_service_code(mut self, code: impl Into<String>) -> Self {
        self.service_code = Some(code.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> GraphErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the Graph service error code, if set.
    pub fn service_code(&self) -> Option<&str> {
        self.service_code.as_deref()
    }

    /// Returns true if this error is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(ref service_code) = self.service_code {
            write!(f, " ({})", service_code)?;
        }
        Ok(())
    }
}

/// A specialized Result type for Graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn error_code_retryable() {
        assert!(GraphErrorCode::NetworkError.is_retryable());
        assert!(GraphErrorCode::RateLimited.is_retryable());
        assert!(GraphErrorCode::ServerError.is_retryable());
        assert!(!GraphErrorCode::AuthenticationFailed.is_retryable());
        assert!(!GraphErrorCode::NotFound.is_retryable());
    }

    #[test]
    fn error_code_display() {
        assert_eq!(
            GraphErrorCode::AuthenticationFailed.as_str(),
            "authentication_failed"
        );
        assert_eq!(GraphErrorCode::RateLimited.to_string(), "rate_limited");
    }

    #[test]
    fn graph_error_creation() {
        let err = GraphError::authentication("token rejected");
        assert_eq!(err.code(), GraphErrorCode::AuthenticationFailed);
        assert_eq!(err.message(), "token rejected");
        assert!(err.service_code().is_none());
        assert!(!err.is_retryable());
    }

    #[test]
    fn from_status_parses_graph_error_body() {
        let body = r#"{"error":{"code":"ErrorInvalidUser","message":"The requested user 'x' is invalid."}}"#;
        let err = GraphError::from_status(StatusCode::NOT_FOUND, body, None);
        assert_eq!(err.code(), GraphErrorCode::NotFound);
        assert_eq!(err.service_code(), Some("ErrorInvalidUser"));
        assert_eq!(err.message(), "The requested user 'x' is invalid.");
        assert_eq!(
            err.to_string(),
            "not_found: The requested user 'x' is invalid. (ErrorInvalidUser)"
        );
    }

    #[test]
    fn from_status_maps_codes() {
        let cases = [
            (StatusCode::BAD_REQUEST, GraphErrorCode::BadRequest),
            (StatusCode::UNAUTHORIZED, GraphErrorCode::AuthenticationFailed),
            (StatusCode::FORBIDDEN, GraphErrorCode::AuthorizationFailed),
            (StatusCode::NOT_FOUND, GraphErrorCode::NotFound),
            (StatusCode::TOO_MANY_REQUESTS, GraphErrorCode::RateLimited),
            (StatusCode::SERVICE_UNAVAILABLE, GraphErrorCode::ServerError),
            (StatusCode::CONFLICT, GraphErrorCode::InvalidResponse),
        ];
        for (status, expected) in cases {
            assert_eq!(GraphError::from_status(status, "", None).code(), expected);
        }
    }

    #[test]
    fn from_status_includes_retry_after() {
        let err = GraphError::from_status(StatusCode::TOO_MANY_REQUESTS, "slow down", Some(12));
        assert!(err.message().contains("slow down"));
        assert!(err.message().contains("retry after 12 seconds"));
        assert!(err.is_retryable());
    }

    #[test]
    fn from_status_keeps_plain_body() {
        let err = GraphError::from_status(StatusCode::BAD_GATEWAY, "upstream down", None);
        assert!(err.message().contains("upstream down"));
        assert!(err.service_code().is_none());
    }

    #[test]
    fn graph_error_with_source() {
        use std::error::Error;
        let io_err = std::io::Error::other("socket closed");
        let err = GraphError::internal("failed to read").with_source(io_err);
        assert!(err.source().is_some());
    }
}

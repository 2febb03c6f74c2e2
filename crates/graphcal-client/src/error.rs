//! Client error types.

use std::fmt;

use graphcal_core::{TimeError, UidError};
use graphcal_graph::GraphError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Graph request failed.
    Graph(GraphError),
    /// Identifier could not be re-encoded.
    Uid(UidError),
    /// Invalid time range.
    Time(TimeError),
    /// IO error.
    Io(std::io::Error),
    /// Output rendering failed.
    Output(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Graph(err) => write!(f, "graph error: {}", err),
            Self::Uid(err) => write!(f, "{}", err),
            Self::Time(err) => write!(f, "{}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Output(msg) => write!(f, "output error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Graph(err) => Some(err),
            Self::Uid(err) => Some(err),
            Self::Time(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<GraphError> for ClientError {
    fn from(err: GraphError) -> Self {
        Self::Graph(err)
    }
}

impl From<UidError> for ClientError {
    fn from(err: UidError) -> Self {
        Self::Uid(err)
    }
}

impl From<TimeError> for ClientError {
    fn from(err: TimeError) -> Self {
        Self::Time(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err.to_string())
    }
}

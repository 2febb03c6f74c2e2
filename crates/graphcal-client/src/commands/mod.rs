//! Command implementations.

pub mod calendar;
pub mod config;
pub mod event;
pub mod sample;
pub mod uid;
pub mod users;

use graphcal_graph::GraphClient;

use crate::config::{ClientConfig, CredentialOverrides};
use crate::error::{ClientError, ClientResult};

/// Builds a Graph client from the `[graph]` settings and command-line
/// credentials.
pub fn graph_client(
    config: &ClientConfig,
    overrides: &CredentialOverrides,
) -> ClientResult<GraphClient> {
    let graph_config = config
        .graph
        .to_graph_config(overrides)
        .map_err(ClientError::Config)?;
    Ok(GraphClient::new(graph_config)?)
}

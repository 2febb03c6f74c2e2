//! Configuration commands.

use std::path::Path;

use graphcal_core::TimeWindow;

use crate::config::{ClientConfig, CredentialOverrides};
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout, with literal secrets masked.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(&config.redacted())
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration.
///
/// Resolves credentials (including secret references) and checks the
/// sample time window. No request is sent.
pub fn validate(config: &ClientConfig, overrides: &CredentialOverrides) -> ClientResult<()> {
    let graph = config
        .graph
        .to_graph_config(overrides)
        .map_err(ClientError::Config)?;
    println!(
        "Graph credentials are valid (tenant {}).",
        graph.credentials.tenant_id
    );

    TimeWindow::parse(&config.sample.start, &config.sample.end)?;

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    Ok(())
}

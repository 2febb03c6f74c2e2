//! CLI, configuration, output rendering
//!
//! This crate provides the `graphcal` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod secret;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};

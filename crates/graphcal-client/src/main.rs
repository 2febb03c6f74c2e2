//! graphcal CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use graphcal_core::{TimeWindow, TracingConfig, init_tracing};

use graphcal_client::cli::{Cli, Command, ConfigAction};
use graphcal_client::commands;
use graphcal_client::config::{ClientConfig, CredentialOverrides};
use graphcal_client::error::{ClientError, ClientResult};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = if cli.config.is_some() {
        ClientConfig::load_from(&config_path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().map_err(ClientError::Config)?
    };

    let mut tracing_config = if cli.debug || config.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    };
    if let Some(format) = cli.log_format {
        tracing_config = tracing_config.with_format(format);
    }
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    let format = cli.output_format();
    let overrides: CredentialOverrides = cli.credentials.into();

    match cli.command {
        Command::Users {
            filter,
            department,
            job_title,
            limit,
            top,
        } => {
            let client = commands::graph_client(&config, &overrides)?;
            let query = commands::users::build_query(
                filter.as_deref(),
                department.as_deref(),
                job_title.as_deref(),
                limit,
                top,
            );
            commands::users::run(&client, &query, format).await?;
            Ok(())
        }
        Command::CalendarView {
            user,
            start,
            end,
            limit,
        } => {
            let window = TimeWindow::parse(&start, &end)?;
            let client = commands::graph_client(&config, &overrides)?;
            commands::calendar::run(&client, user.as_deref(), window, limit, format).await
        }
        Command::CreateEvent(args) => {
            let event = commands::event::build_event(&args)?;
            let client = commands::graph_client(&config, &overrides)?;
            commands::event::run(&client, &args.user, &event, format).await?;
            Ok(())
        }
        Command::Uid { hex } => {
            commands::uid::run(&hex, format)?;
            Ok(())
        }
        Command::Sample => {
            let client = commands::graph_client(&config, &overrides)?;
            commands::sample::run(&client, &config.sample, format).await
        }
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config, &overrides),
            ConfigAction::Path => commands::config::path(&config_path),
        },
    }
}

//! Log setup for the graphcal binary.
//!
//! Events go to stderr so that command output on stdout can be piped.
//! `RUST_LOG` replaces the built-in filter when set.

use thiserror::Error;
use tracing::{Level, Subscriber};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*, registry::LookupSpan};

/// Target prefix shared by every graphcal crate.
const TARGET_PREFIX: &str = "graphcal";

#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("invalid RUST_LOG directive: {0}")]
    Directive(#[from] tracing_subscriber::filter::ParseError),
}

/// Layout of log lines on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    Pretty,
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

impl std::str::FromStr for TracingOutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown log format '{}', expected pretty, compact or json",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for graphcal targets when `RUST_LOG` is unset.
    pub level: Level,
    pub format: TracingOutputFormat,
    /// Print source file and line with each event.
    pub source_location: bool,
    pub timestamps: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: TracingOutputFormat::Compact,
            source_location: false,
            timestamps: true,
        }
    }
}

impl TracingConfig {
    /// Verbose settings for `--debug`.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            level: Level::DEBUG,
            format: TracingOutputFormat::Compact,
            source_location: true,
            timestamps: false,
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Builds the filter, preferring `rust_log` over the configured level.
    fn filter(&self, rust_log: Option<&str>) -> Result<EnvFilter, TracingError> {
        match rust_log {
            Some(directives) if !directives.trim().is_empty() => {
                Ok(EnvFilter::try_new(directives)?)
            }
            _ => Ok(EnvFilter::new(format!("{}={}", TARGET_PREFIX, self.level))),
        }
    }

    fn stderr_layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        let location = self.source_location;
        match self.format {
            TracingOutputFormat::Pretty => fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_file(location)
                .with_line_number(location)
                .boxed(),
            TracingOutputFormat::Json => fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_file(location)
                .with_line_number(location)
                .boxed(),
            TracingOutputFormat::Compact if self.timestamps => fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_file(location)
                .with_line_number(location)
                .boxed(),
            TracingOutputFormat::Compact => fmt::layer()
                .compact()
                .without_time()
                .with_writer(std::io::stderr)
                .with_file(location)
                .with_line_number(location)
                .boxed(),
        }
    }
}

/// Installs the global subscriber. Call once, before any logging.
///
/// # Errors
///
/// Fails when `RUST_LOG` cannot be parsed or a subscriber is already set.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = config.filter(rust_log.as_deref())?;
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(config.stderr_layer());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use graphcal_core::TracingOutputFormat;

use crate::config::CredentialOverrides;
use crate::output::OutputFormat;

/// graphcal - Microsoft Graph users and calendars from the terminal
#[derive(Debug, Parser)]
#[command(name = "graphcal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "GRAPHCAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Log format on stderr (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<TracingOutputFormat>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Returns the output format based on CLI flags.
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_json_flag(self.json)
    }
}

/// App registration credentials; each overrides the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct CredentialArgs {
    /// Application (client) ID
    #[arg(long, global = true, env = "GRAPHCAL_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Client secret
    #[arg(long, global = true, env = "GRAPHCAL_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Directory (tenant) ID
    #[arg(long, global = true, env = "GRAPHCAL_TENANT_ID")]
    pub tenant_id: Option<String>,
}

impl From<CredentialArgs> for CredentialOverrides {
    fn from(args: CredentialArgs) -> Self {
        Self {
            client_id: args.client_id,
            client_secret: args.client_secret,
            tenant_id: args.tenant_id,
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List users in the tenant
    Users {
        /// Raw OData filter expression
        #[arg(long)]
        filter: Option<String>,

        /// Only users in this department
        #[arg(long)]
        department: Option<String>,

        /// Only users with this job title
        #[arg(long)]
        job_title: Option<String>,

        /// Maximum number of users to return
        #[arg(long)]
        limit: Option<usize>,

        /// Page size requested from Graph
        #[arg(long)]
        top: Option<usize>,
    },

    /// Show calendar events with their GlobalObjectId
    CalendarView {
        /// User ID or principal name (default: every user)
        #[arg(long)]
        user: Option<String>,

        /// Start of the range (RFC 3339)
        #[arg(long)]
        start: String,

        /// End of the range (RFC 3339)
        #[arg(long)]
        end: String,

        /// Maximum number of events per user
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Create an event in a user's default calendar
    CreateEvent(CreateEventArgs),

    /// Convert a hex iCalUId to its base64 GlobalObjectId (offline)
    Uid {
        /// Hexadecimal identifier
        hex: String,
    },

    /// Run the full walkthrough using the [sample] settings
    Sample,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for `create-event`.
#[derive(Debug, Clone, Args)]
pub struct CreateEventArgs {
    /// User ID or principal name owning the calendar
    #[arg(long)]
    pub user: String,

    /// Event subject
    #[arg(long)]
    pub subject: String,

    /// Local start time, e.g. 2021-07-20T12:00:00
    #[arg(long)]
    pub start: String,

    /// Local end time
    #[arg(long)]
    pub end: String,

    /// Windows time zone name of start and end
    #[arg(long, default_value = "UTC")]
    pub timezone: String,

    /// Event body (HTML unless --plain-text)
    #[arg(long)]
    pub body: Option<String>,

    /// Send the body as plain text
    #[arg(long, requires = "body")]
    pub plain_text: bool,

    /// Location display name
    #[arg(long)]
    pub location: Option<String>,

    /// Required attendee email address (can be repeated)
    #[arg(long, action = clap::ArgAction::Append)]
    pub attendee: Vec<String>,

    /// Optional attendee email address (can be repeated)
    #[arg(long, action = clap::ArgAction::Append)]
    pub optional_attendee: Vec<String>,

    /// Client transaction ID (default: random UUID)
    #[arg(long)]
    pub transaction_id: Option<String>,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_users_with_filters() {
        let cli = Cli::try_parse_from([
            "graphcal",
            "users",
            "--department",
            "Retail",
            "--job-title",
            "Manager",
            "--limit",
            "5",
            "--top",
            "100",
        ])
        .unwrap();
        match cli.command {
            Command::Users {
                department,
                job_title,
                limit,
                top,
                filter,
            } => {
                assert_eq!(department.as_deref(), Some("Retail"));
                assert_eq!(job_title.as_deref(), Some("Manager"));
                assert_eq!(limit, Some(5));
                assert_eq!(top, Some(100));
                assert!(filter.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["graphcal", "uid", "00", "--json", "--debug"]).unwrap();
        assert!(cli.json);
        assert!(cli.debug);
        assert_eq!(cli.output_format(), OutputFormat::Json);
    }

    #[test]
    fn create_event_collects_attendees() {
        let cli = Cli::try_parse_from([
            "graphcal",
            "create-event",
            "--user",
            "AdeleV@contoso.onmicrosoft.com",
            "--subject",
            "Let's go for lunch",
            "--start",
            "2021-07-20T12:00:00",
            "--end",
            "2021-07-20T14:00:00",
            "--attendee",
            "a@contoso.com",
            "--attendee",
            "b@contoso.com",
            "--optional-attendee",
            "c@contoso.com",
        ])
        .unwrap();
        match cli.command {
            Command::CreateEvent(args) => {
                assert_eq!(args.attendee.len(), 2);
                assert_eq!(
                    args.optional_attendee,
                    vec!["c@contoso.com".to_string()]
                );
                assert!(!args.plain_text);
                assert_eq!(args.timezone, "UTC");
                assert!(args.transaction_id.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn plain_text_requires_body() {
        let base = [
            "graphcal",
            "create-event",
            "--user",
            "u",
            "--subject",
            "s",
            "--start",
            "2021-07-20T12:00:00",
            "--end",
            "2021-07-20T13:00:00",
            "--plain-text",
        ];
        assert!(Cli::try_parse_from(base).is_err());
        assert!(Cli::try_parse_from(base.iter().chain(&["--body", "hi"])).is_ok());
    }

    #[test]
    fn calendar_view_requires_range() {
        assert!(Cli::try_parse_from(["graphcal", "calendar-view", "--start", "x"]).is_err());
    }

    #[test]
    fn log_format_parses() {
        let cli =
            Cli::try_parse_from(["graphcal", "--log-format", "json", "config", "path"]).unwrap();
        assert_eq!(cli.log_format, Some(TracingOutputFormat::Json));
        assert!(Cli::try_parse_from(["graphcal", "--log-format", "xml", "sample"]).is_err());
    }

    #[test]
    fn credential_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "graphcal",
            "users",
            "--tenant-id",
            "contoso.onmicrosoft.com",
        ])
        .unwrap();
        let overrides: CredentialOverrides = cli.credentials.into();
        assert_eq!(overrides.tenant_id.as_deref(), Some("contoso.onmicrosoft.com"));
    }
}

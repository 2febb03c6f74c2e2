//! Output rendering: plain text lines or JSON.

use graphcal_core::GlobalObjectId;
use graphcal_graph::{Event, User};
use serde::Serialize;
use tracing::warn;

use crate::error::ClientResult;

/// How command output is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

/// Formats a user as a single line.
pub fn user_line(user: &User) -> String {
    format!(
        "{} - DisplayName: {} (Email: {}, Title: {}, Department: {}, Location: {})",
        user.id,
        or_empty(&user.display_name),
        or_empty(&user.mail),
        or_empty(&user.job_title),
        or_empty(&user.department),
        or_empty(&user.office_location),
    )
}

fn or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// One calendar-view event with its identifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventReport {
    pub id: String,
    pub subject: String,
    pub start: Option<String>,
    pub response: Option<String>,
    /// Value of the expanded `GlobalObjectId` extended property.
    pub global_object_id_property: Option<String>,
    /// `GlobalObjectId` derived from `iCalUId`.
    pub global_object_id: Option<String>,
    /// Whether the two agree, when both are known.
    pub matches: Option<bool>,
    /// Why `iCalUId` could not be converted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl EventReport {
    pub fn from_event(event: &Event) -> Self {
        let property = event
            .single_value_extended_properties
            .first()
            .map(|p| p.value.clone());

        let (global_object_id, warning) = match event.ical_uid.as_deref() {
            Some(uid) => match GlobalObjectId::from_ical_uid(uid) {
                Ok(id) => (Some(id.into_string()), None),
                Err(e) => {
                    warn!(event = %event.id, "cannot convert iCalUId: {}", e);
                    (None, Some(format!("iCalUId is not hex: {}", e)))
                }
            },
            None => (None, Some("event has no iCalUId".to_string())),
        };

        let matches = match (&global_object_id, &property) {
            (Some(derived), Some(expanded)) => Some(derived.trim() == expanded.trim()),
            _ => None,
        };

        Self {
            id: event.id.clone(),
            subject: event.subject.clone().unwrap_or_default(),
            start: event.start.as_ref().map(|s| s.date_time.clone()),
            response: event.response().map(|r| r.to_string()),
            global_object_id_property: property,
            global_object_id,
            matches,
            warning,
        }
    }

    /// Renders the report as three text lines.
    pub fn lines(&self) -> [String; 3] {
        let header = format!(
            "{} {} {} {}",
            self.id,
            self.subject,
            self.start.as_deref().unwrap_or(""),
            self.response.as_deref().unwrap_or("")
        );
        let property = self
            .global_object_id_property
            .clone()
            .unwrap_or_else(|| "(no GlobalObjectId property)".to_string());
        let derived = match (&self.global_object_id, &self.warning) {
            (Some(id), _) => id.clone(),
            (None, Some(warning)) => format!("warning: {}", warning),
            (None, None) => String::new(),
        };
        [header, property, derived]
    }
}

/// A user with the events of their calendar view.
#[derive(Debug, Clone, Serialize)]
pub struct UserCalendar {
    pub user: User,
    pub events: Vec<EventReport>,
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> ClientResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! `graphcal sample`: the end-to-end walkthrough.
//!
//! 1. list users and read each user's calendar view
//! 2. list users matching a department and job title
//! 3. create an event in the organizer's calendar

use graphcal_core::TimeWindow;
use graphcal_graph::{CalendarViewQuery, GraphClient, NewEvent, UserQuery};
use tracing::{info, warn};

use crate::cli::CreateEventArgs;
use crate::commands::{calendar, event, users};
use crate::config::SampleSettings;
use crate::error::ClientResult;
use crate::output::OutputFormat;

/// Subject of the sample event.
pub const EVENT_SUBJECT: &str = "Let's go for lunch";
/// HTML body of the sample event.
pub const EVENT_BODY: &str = "Does mid month work for you?";
/// Location of the sample event.
pub const EVENT_LOCATION: &str = "Harry's Bar";

/// Runs the walkthrough.
pub async fn run(
    client: &GraphClient,
    settings: &SampleSettings,
    format: OutputFormat,
) -> ClientResult<()> {
    let window = TimeWindow::parse(&settings.start, &settings.end)?;

    info!("listing users and calendar views");
    let all_users = client.list_users(&UserQuery::new()).await?;
    let calendars = calendar::collect(client, all_users, &CalendarViewQuery::new(window)).await?;
    calendar::print_calendars(&calendars, format)?;

    info!(
        department = %settings.department,
        job_title = %settings.job_title,
        "listing filtered users"
    );
    let query = users::build_query(
        None,
        Some(settings.department.as_str()),
        Some(settings.job_title.as_str()),
        None,
        None,
    );
    users::run(client, &query, format).await?;

    match sample_event(settings)? {
        Some((organizer, new_event)) => {
            event::run(client, &organizer, &new_event, format).await?;
        }
        None => warn!("sample.organizer is not set, skipping event creation"),
    }
    Ok(())
}

/// Builds the sample event, or `None` when no organizer is configured.
pub fn sample_event(settings: &SampleSettings) -> ClientResult<Option<(String, NewEvent)>> {
    let Some(ref organizer) = settings.organizer else {
        return Ok(None);
    };

    let args = CreateEventArgs {
        user: organizer.clone(),
        subject: EVENT_SUBJECT.to_string(),
        start: settings.event_start.clone(),
        end: settings.event_end.clone(),
        timezone: settings.event_timezone.clone(),
        body: Some(EVENT_BODY.to_string()),
        plain_text: false,
        location: Some(EVENT_LOCATION.to_string()),
        attendee: settings.attendee.iter().cloned().collect(),
        optional_attendee: Vec::new(),
        transaction_id: None,
    };
    Ok(Some((organizer.clone(), event::build_event(&args)?)))
}

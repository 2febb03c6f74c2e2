//! `graphcal calendar-view`

use graphcal_core::TimeWindow;
use graphcal_graph::{
    CalendarViewQuery, DEFAULT_USER_SELECT, GraphClient, GraphErrorCode, User, UserQuery,
};
use tracing::{info, warn};

use crate::error::ClientResult;
use crate::output::{self, EventReport, OutputFormat, UserCalendar};

/// Reads the calendar view of one user, or of every user when `user` is
/// `None`, and prints each event with its `GlobalObjectId`.
pub async fn run(
    client: &GraphClient,
    user: Option<&str>,
    window: TimeWindow,
    limit: Option<usize>,
    format: OutputFormat,
) -> ClientResult<()> {
    let users = match user {
        Some(id) => vec![client.get_user(id, DEFAULT_USER_SELECT).await?],
        None => client.list_users(&UserQuery::new()).await?,
    };

    let mut query = CalendarViewQuery::new(window);
    if let Some(limit) = limit {
        query = query.with_max_results(limit);
    }

    let calendars = collect(client, users, &query).await?;
    print_calendars(&calendars, format)
}

/// Fetches the calendar view of each user.
///
/// Users without a mailbox are kept with no events, so every listed user
/// appears in the output.
pub async fn collect(
    client: &GraphClient,
    users: Vec<User>,
    query: &CalendarViewQuery,
) -> ClientResult<Vec<UserCalendar>> {
    let mut calendars = Vec::with_capacity(users.len());
    for user in users {
        let events = match client.calendar_view(&user.id, query).await {
            Ok(events) => events,
            Err(e) if e.code() == GraphErrorCode::NotFound => {
                warn!(user = %user.id, "no calendar: {}", e);
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        info!(user = %user.id, events = events.len(), "read calendar view");
        calendars.push(UserCalendar {
            events: events.iter().map(EventReport::from_event).collect(),
            user,
        });
    }
    Ok(calendars)
}

pub(crate) fn print_calendars(
    calendars: &[UserCalendar],
    format: OutputFormat,
) -> ClientResult<()> {
    match format {
        OutputFormat::Json => output::print_json(calendars),
        OutputFormat::Text => {
            for calendar in calendars {
                println!("{}", output::user_line(&calendar.user));
                for event in &calendar.events {
                    for line in event.lines() {
                        println!("{}", line);
                    }
                }
            }
            Ok(())
        }
    }
}

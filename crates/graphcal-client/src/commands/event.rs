//! `graphcal create-event`

use chrono::NaiveDateTime;
use graphcal_core::TimeError;
use graphcal_graph::{Attendee, DateTimeTimeZone, Event, GraphClient, ItemBody, NewEvent};
use tracing::info;

use crate::cli::CreateEventArgs;
use crate::error::ClientResult;
use crate::output::{self, OutputFormat};

const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Builds the event body from command-line arguments.
///
/// Start and end are local times in `args.timezone`; they are checked for
/// shape and order but sent to Graph unchanged. A missing transaction ID
/// is replaced with a fresh UUID so retries do not create duplicates.
pub fn build_event(args: &CreateEventArgs) -> ClientResult<NewEvent> {
    let start = parse_local(&args.start)?;
    let end = parse_local(&args.end)?;
    if start > end {
        return Err(TimeError::Inverted {
            start: args.start.clone(),
            end: args.end.clone(),
        }
        .into());
    }

    let mut event = NewEvent::new(
        &args.subject,
        DateTimeTimeZone::new(&args.start, &args.timezone),
        DateTimeTimeZone::new(&args.end, &args.timezone),
    );
    if let Some(ref body) = args.body {
        let body = if args.plain_text {
            ItemBody::text(body)
        } else {
            ItemBody::html(body)
        };
        event = event.with_body(body);
    }
    if let Some(ref location) = args.location {
        event = event.with_location(location);
    }
    for address in &args.attendee {
        event = event.with_attendee(Attendee::required(address));
    }
    for address in &args.optional_attendee {
        event = event.with_attendee(Attendee::optional(address));
    }

    let transaction_id = args
        .transaction_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    Ok(event.with_transaction_id(transaction_id))
}

fn parse_local(value: &str) -> Result<NaiveDateTime, TimeError> {
    NaiveDateTime::parse_from_str(value, LOCAL_TIME_FORMAT).map_err(|e| {
        TimeError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Creates the event and prints the result.
pub async fn run(
    client: &GraphClient,
    user: &str,
    event: &NewEvent,
    format: OutputFormat,
) -> ClientResult<Event> {
    let created = client.create_event(user, event).await?;
    info!(
        user = %user,
        id = %created.id,
        transaction_id = ?event.transaction_id,
        "created event"
    );

    match format {
        OutputFormat::Json => output::print_json(&created)?,
        OutputFormat::Text => println!(
            "created {} {} (transaction {})",
            created.id,
            created.subject.as_deref().unwrap_or(&event.subject),
            event.transaction_id.as_deref().unwrap_or("-")
        ),
    }
    Ok(created)
}

//! Graph resource types.
//!
//! Only the properties the client reads or writes are modelled. Unknown
//! properties in responses are ignored; absent optional properties are
//! skipped when serialising request bodies.

use serde::{Deserialize, Serialize};

/// A page of a Graph collection.
#[derive(Debug, Deserialize)]
pub(crate) struct CollectionPage<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// A directory user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Object ID of the user.
    pub id: String,
    pub display_name: Option<String>,
    pub mail: Option<String>,
    pub user_principal_name: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub office_location: Option<String>,
}

/// A calendar event as returned by Graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub subject: Option<String>,
    pub body: Option<ItemBody>,
    pub start: Option<DateTimeTimeZone>,
    pub end: Option<DateTimeTimeZone>,
    pub location: Option<Location>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    pub organizer: Option<Recipient>,
    /// The iCalendar UID, hex-encoded `GlobalObjectId` bytes for
    /// Exchange-originated meetings.
    #[serde(rename = "iCalUId")]
    pub ical_uid: Option<String>,
    pub response_status: Option<ResponseStatus>,
    pub is_all_day: Option<bool>,
    pub web_link: Option<String>,
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub single_value_extended_properties: Vec<SingleValueExtendedProperty>,
}

impl Event {
    /// Returns the value of the extended property with the given ID,
    /// compared case-insensitively as Graph does.
    pub fn extended_property(&self, property_id: &str) -> Option<&str> {
        self.single_value_extended_properties
            .iter()
            .find(|p| p.id.eq_ignore_ascii_case(property_id))
            .map(|p| p.value.as_str())
    }

    /// Returns the attendee's response, or `None` if not reported.
    pub fn response(&self) -> Option<ResponseType> {
        self.response_status.as_ref().map(|s| s.response)
    }
}

/// Body for creating an event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<ItemBody>,
    pub start: DateTimeTimeZone,
    pub end: DateTimeTimeZone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,
    /// Client-generated idempotency key; Graph rejects a second create with
    /// the same value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl NewEvent {
    /// Creates an event body with a subject and time range.
    pub fn new(subject: impl Into<String>, start: DateTimeTimeZone, end: DateTimeTimeZone) -> Self {
        Self {
            subject: subject.into(),
            start,
            end,
            ..Default::default()
        }
    }

    /// Sets the body.
    pub fn with_body(mut self, body: ItemBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the location display name.
    pub fn with_location(mut self, display_name: impl Into<String>) -> Self {
        self.location = Some(Location {
            display_name: Some(display_name.into()),
        });
        self
    }

    /// Adds an attendee.
    pub fn with_attendee(mut self, attendee: Attendee) -> Self {
        self.attendees.push(attendee);
        self
    }

    /// Sets the transaction ID.
    pub fn with_transaction_id(mut self, id: impl Into<String>) -> Self {
        self.transaction_id = Some(id.into());
        self
    }
}

/// Content of an event body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub content_type: BodyType,
    pub content: String,
}

impl ItemBody {
    /// Creates an HTML body.
    pub fn html(content: impl Into<String>) -> Self {
        Self {
            content_type: BodyType::Html,
            content: content.into(),
        }
    }

    /// Creates a plain-text body.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content_type: BodyType::Text,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    #[default]
    Text,
    Html,
}

/// A wall-clock time in a named time zone.
///
/// `date_time` is kept as text: Graph returns fractional seconds with seven
/// digits and no offset, and accepts any ISO 8601 local time on input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeTimeZone {
    pub date_time: String,
    pub time_zone: String,
}

impl DateTimeTimeZone {
    pub fn new(date_time: impl Into<String>, time_zone: impl Into<String>) -> Self {
        Self {
            date_time: date_time.into(),
            time_zone: time_zone.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email_address: EmailAddress,
    #[serde(rename = "type")]
    pub attendee_type: AttendeeType,
}

impl Attendee {
    /// Creates a required attendee.
    pub fn required(address: impl Into<String>) -> Self {
        Self {
            email_address: EmailAddress::new(address),
            attendee_type: AttendeeType::Required,
        }
    }

    /// Creates an optional attendee.
    pub fn optional(address: impl Into<String>) -> Self {
        Self {
            email_address: EmailAddress::new(address),
            attendee_type: AttendeeType::Optional,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeType {
    #[default]
    Required,
    Optional,
    Resource,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub address: String,
}

impl EmailAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            name: None,
            address: address.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub email_address: EmailAddress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStatus {
    pub response: ResponseType,
}

/// The invitee's response to a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseType {
    #[default]
    None,
    Organizer,
    TentativelyAccepted,
    Accepted,
    Declined,
    NotResponded,
    #[serde(other)]
    Unknown,
}

impl ResponseType {
    /// Returns the Graph wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Organizer => "organizer",
            Self::TentativelyAccepted => "tentativelyAccepted",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::NotResponded => "notResponded",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ResponseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A MAPI property exposed through Graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleValueExtendedProperty {
    pub id: String,
    pub value: String,
}

//! Microsoft Graph client for graphcal.
//!
//! This crate wraps the handful of Graph v1.0 endpoints graphcal needs:
//!
//! - [`TokenClient`] - app-only tokens via the OAuth 2.0 client credentials grant
//! - [`GraphClient`] - users, calendar views and event creation
//! - [`UserQuery`] / [`CalendarViewQuery`] - OData query builders
//! - [`GraphError`] - error type for all operations
//!
//! # Example
//!
//! ```ignore
//! use graphcal_graph::{CalendarViewQuery, ClientCredentials, GraphClient, GraphConfig, UserQuery};
//!
//! let credentials = ClientCredentials::new(client_id, client_secret, tenant_id);
//! let client = GraphClient::new(GraphConfig::new(credentials))?;
//!
//! for user in client.list_users(&UserQuery::new()).await? {
//!     let events = client.calendar_view(&user.id, &CalendarViewQuery::new(window)).await?;
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod query;

pub use auth::{AccessToken, TokenClient};
pub use client::GraphClient;
pub use config::{ClientCredentials, GraphConfig};
pub use error::{GraphError, GraphErrorCode, GraphResult};
pub use models::{
    Attendee, AttendeeType, BodyType, DateTimeTimeZone, EmailAddress, Event, ItemBody, Location,
    NewEvent, Recipient, ResponseStatus, ResponseType, SingleValueExtendedProperty, User,
};
pub use query::{
    CalendarViewQuery, DEFAULT_USER_SELECT, Filter, GLOBAL_OBJECT_ID_PROPERTY, UserQuery,
    quote_literal,
};

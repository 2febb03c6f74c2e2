//! Microsoft Graph REST client.
//!
//! This module provides a thin async client over the Graph v1.0 endpoints
//! used by graphcal: listing users, reading a user's calendar view and
//! creating events. Collections are paged by following `@odata.nextLink`.

use reqwest::header::{HeaderValue, RETRY_AFTER};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

use crate::auth::{AccessToken, TokenClient, build_http_client};
use crate::config::GraphConfig;
use crate::error::{GraphError, GraphResult};
use crate::models::{CollectionPage, Event, NewEvent, User};
use crate::query::{CalendarViewQuery, UserQuery};

/// Graph API client.
///
/// A single app-only token is acquired on first use and reused for the
/// lifetime of the client. It is never refreshed; once it expires, requests
/// fail with an authentication error.
#[derive(Debug)]
pub struct GraphClient {
    config: GraphConfig,
    http_client: reqwest::Client,
    token_client: TokenClient,
    token: OnceCell<AccessToken>,
}

impl GraphClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if [`GraphConfig::validate`] fails.
    pub fn new(config: GraphConfig) -> GraphResult<Self> {
        config.validate().map_err(GraphError::configuration)?;

        let http_client = build_http_client(config.timeout, &config.user_agent)?;
        let token_client = TokenClient::with_http_client(config.clone(), http_client.clone());

        Ok(Self {
            config,
            http_client,
            token_client,
            token: OnceCell::new(),
        })
    }

    /// Lists users in the directory.
    #[instrument(skip(self, query), fields(filter = ?query.filter.build()))]
    pub async fn list_users(&self, query: &UserQuery) -> GraphResult<Vec<User>> {
        let url = format!("{}/users", self.config.api_base());
        let users = self
            .get_collection(&url, &query.params(), query.max_results, false)
            .await?;
        debug!("fetched {} users", users.len());
        Ok(users)
    }

    /// Fetches a single user by object ID or user principal name.
    pub async fn get_user(&self, user_id: &str, select: &[&str]) -> GraphResult<User> {
        let url = format!("{}/users/{}", self.config.api_base(), encode_segment(user_id));
        let mut request = self.http_client.get(&url);
        if !select.is_empty() {
            request = request.query(&[("$select", select.join(","))]);
        }
        let body = self.send(request).await?;
        parse_body(&body)
    }

    /// Returns the events of a user's default calendar that overlap the
    /// query window, with recurring series expanded into occurrences.
    #[instrument(skip(self, query), fields(start = %query.window.start, end = %query.window.end))]
    pub async fn calendar_view(
        &self,
        user_id: &str,
        query: &CalendarViewQuery,
    ) -> GraphResult<Vec<Event>> {
        let url = format!(
            "{}/users/{}/calendarView",
            self.config.api_base(),
            encode_segment(user_id)
        );
        let events = self
            .get_collection(&url, &query.params(), query.max_results, true)
            .await?;
        debug!("fetched {} events for user {}", events.len(), user_id);
        Ok(events)
    }

    /// Creates an event in a user's default calendar.
    #[instrument(skip(self, event), fields(subject = %event.subject))]
    pub async fn create_event(&self, user_id: &str, event: &NewEvent) -> GraphResult<Event> {
        let url = format!(
            "{}/users/{}/calendar/events",
            self.config.api_base(),
            encode_segment(user_id)
        );
        let request = self.http_client.post(&url).json(event);
        let body = self.send(request).await?;
        let created: Event = parse_body(&body)?;
        debug!("created event {}", created.id);
        Ok(created)
    }

    /// Fetches every page of a collection, stopping early at `max_results`.
    async fn get_collection<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&'static str, String)],
        max_results: Option<usize>,
        prefer_timezone: bool,
    ) -> GraphResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next: Option<String> = None;

        loop {
            let mut request = match next.take() {
                // nextLink already carries the original query.
                Some(link) => self.http_client.get(link),
                None => self.http_client.get(url).query(params),
            };
            if prefer_timezone {
                request = request.header("Prefer", self.prefer_header()?);
            }

            let body = self.send(request).await?;
            let page: CollectionPage<T> = parse_body(&body)?;
            items.extend(page.value);

            if let Some(max) = max_results
                && items.len() >= max
            {
                items.truncate(max);
                break;
            }

            match page.next_link {
                Some(link) => next = Some(link),
                None => break,
            }
        }

        Ok(items)
    }

    /// Sends an authenticated request and returns the response body.
    async fn send(&self, request: reqwest::RequestBuilder) -> GraphResult<String> {
        let token = self.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(GraphError::from_transport)?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let body = response
            .text()
            .await
            .map_err(|e| GraphError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            warn!(%status, "graph request failed");
            return Err(GraphError::from_status(status, &body, retry_after));
        }

        Ok(body)
    }

    /// Returns the bearer token, acquiring it on first use.
    async fn access_token(&self) -> GraphResult<&str> {
        let token = self
            .token
            .get_or_try_init(|| self.token_client.acquire_token())
            .await?;
        if token.is_expired() {
            return Err(GraphError::authentication(
                "access token expired; create a new client to re-authenticate",
            ));
        }
        Ok(&token.secret)
    }

    fn prefer_header(&self) -> GraphResult<HeaderValue> {
        HeaderValue::from_str(&self.config.prefer_timezone_header()).map_err(|e| {
            GraphError::configuration(format!("invalid timezone header: {}", e))
        })
    }
}

/// Percent-encodes a path segment such as a user principal name.
fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

fn parse_body<T: DeserializeOwned>(body: &str) -> GraphResult<T> {
    serde_json::from_str(body)
        .map_err(|e| GraphError::invalid_response(format!("failed to parse response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientCredentials;
    use crate::error::GraphErrorCode;
    use crate::models::{Attendee, DateTimeTimeZone, ItemBody, ResponseType};
    use crate::query::Filter;
    use graphcal_core::TimeWindow;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "access_token": "test-token"
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer) -> GraphClient {
        let config = GraphConfig::new(ClientCredentials::new("app-id", "app-secret", "tenant-1"))
            .with_authority(server.uri())
            .with_api_base(format!("{}/v1.0", server.uri()))
            .with_timezone("Tokyo Standard Time");
        GraphClient::new(config).unwrap()
    }

    fn july_2021() -> TimeWindow {
        TimeWindow::parse("2021-07-01T00:00:00Z", "2021-08-01T00:00:00Z").unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GraphConfig::new(ClientCredentials::new("", "secret", "tenant"));
        let err = GraphClient::new(config).unwrap_err();
        assert_eq!(err.code(), GraphErrorCode::ConfigurationError);
    }

    #[test]
    fn encode_segment_escapes_upn() {
        assert_eq!(
            encode_segment("AdeleV@contoso.onmicrosoft.com"),
            "AdeleV%40contoso.onmicrosoft.com"
        );
    }

    #[tokio::test]
    async fn list_users_sends_select_and_filter() {
        let server = MockServer::start().await;
        mock_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1.0/users"))
            .and(header("authorization", "Bearer test-token"))
            .and(query_param(
                "$select",
                "id,displayName,mail,jobTitle,department,officeLocation",
            ))
            .and(query_param("$filter", "department eq 'Retail'"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [
                    {"id": "u1", "displayName": "Adele Vance", "department": "Retail"},
                    {"id": "u2", "displayName": "Alex Wilber", "department": "Retail"}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let query = UserQuery::new().with_filter(Filter::new().eq("department", "Retail"));
        let users = client.list_users(&query).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].display_name.as_deref(), Some("Alex Wilber"));
    }

    #[tokio::test]
    async fn list_users_follows_next_link_and_reuses_token() {
        let server = MockServer::start().await;
        mock_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/v1.0/users"))
            .and(query_param("$skiptoken", "page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{"id": "u3"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1.0/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "@odata.nextLink": format!("{}/v1.0/users?$skiptoken=page2", server.uri()),
                "value": [{"id": "u1"}, {"id": "u2"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let users = client.list_users(&UserQuery::new()).await.unwrap();
        let ids: Vec<_> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2", "u3"]);
    }

    #[tokio::test]
    async fn list_users_respects_max_results() {
        let server = MockServer::start().await;
        mock_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1.0/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "@odata.nextLink": format!("{}/v1.0/users?$skiptoken=never", server.uri()),
                "value": [{"id": "u1"}, {"id": "u2"}, {"id": "u3"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let users = client
            .list_users(&UserQuery::new().with_max_results(2))
            .await
            .unwrap();
        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn calendar_view_sends_window_expand_and_prefer() {
        let server = MockServer::start().await;
        mock_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1.0/users/u1/calendarView"))
            .and(query_param("startDateTime", "2021-07-01T00:00:00Z"))
            .and(query_param("endDateTime", "2021-08-01T00:00:00Z"))
            .and(query_param(
                "$expand",
                "singleValueExtendedProperties($filter=id eq 'Binary {6ED8DA90-450B-101B-98DA-00AA003F1305} Id 0x0003')",
            ))
            .and(header("prefer", "outlook.timezone=\"Tokyo Standard Time\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{
                    "id": "e1",
                    "subject": "Review",
                    "iCalUId": "48656C6C6F",
                    "start": {"dateTime": "2021-07-20T12:00:00.0000000", "timeZone": "Tokyo Standard Time"},
                    "end": {"dateTime": "2021-07-20T13:00:00.0000000", "timeZone": "Tokyo Standard Time"},
                    "responseStatus": {"response": "organizer"},
                    "singleValueExtendedProperties": [
                        {"id": "Binary {6ed8da90-450b-101b-98da-00aa003f1305} Id 0x3", "value": "SGVsbG8="}
                    ]
                }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let events = client
            .calendar_view("u1", &CalendarViewQuery::new(july_2021()))
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].response(), Some(ResponseType::Organizer));
        assert_eq!(
            events[0].single_value_extended_properties[0].value,
            "SGVsbG8="
        );
    }

    #[tokio::test]
    async fn create_event_posts_json_body() {
        let server = MockServer::start().await;
        mock_token(&server).await;

        let event = NewEvent::new(
            "Let's go for lunch",
            DateTimeTimeZone::new("2021-07-20T12:00:00", "Tokyo Standard Time"),
            DateTimeTimeZone::new("2021-07-20T14:00:00", "Tokyo Standard Time"),
        )
        .with_body(ItemBody::html("Does mid month work for you?"))
        .with_attendee(Attendee::required("alexw@contoso.onmicrosoft.com"))
        .with_transaction_id("7E163156-7762-4BEB-A1C6-729EA81755A7");

        Mock::given(method("POST"))
            .and(path("/v1.0/users/AdeleV%40contoso.onmicrosoft.com/calendar/events"))
            .and(body_json(serde_json::to_value(&event).unwrap()))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "AAMkNew",
                "subject": "Let's go for lunch",
                "transactionId": "7E163156-7762-4BEB-A1C6-729EA81755A7"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let created = client
            .create_event("AdeleV@contoso.onmicrosoft.com", &event)
            .await
            .unwrap();
        assert_eq!(created.id, "AAMkNew");
        assert_eq!(
            created.transaction_id.as_deref(),
            Some("7E163156-7762-4BEB-A1C6-729EA81755A7")
        );
    }

    #[tokio::test]
    async fn graph_errors_are_mapped() {
        let server = MockServer::start().await;
        mock_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1.0/users/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {
                    "code": "Request_ResourceNotFound",
                    "message": "Resource 'missing' does not exist."
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_user("missing", &["id"]).await.unwrap_err();
        assert_eq!(err.code(), GraphErrorCode::NotFound);
        assert_eq!(err.service_code(), Some("Request_ResourceNotFound"));
    }

    #[tokio::test]
    async fn throttling_reports_retry_after() {
        let server = MockServer::start().await;
        mock_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1.0/users"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("Retry-After", "7")
                    .set_body_json(serde_json::json!({
                        "error": {"code": "TooManyRequests", "message": "Too many requests"}
                    })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.list_users(&UserQuery::new()).await.unwrap_err();
        assert_eq!(err.code(), GraphErrorCode::RateLimited);
        assert!(err.message().contains("retry after 7 seconds"));
    }

    #[tokio::test]
    async fn token_failure_stops_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_request",
                "error_description": "AADSTS90002: Tenant not found."
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.list_users(&UserQuery::new()).await.unwrap_err();
        assert_eq!(err.code(), GraphErrorCode::AuthenticationFailed);
        assert!(err.message().contains("AADSTS90002"));
    }
}

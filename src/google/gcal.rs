//! Google Calendar API client for listing calendars, searching events,
//! and fetching a single event by id. Every list call exhausts the
//! cursor pagination before returning.

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const CAL_API: &str = "https://www.googleapis.com/calendar/v3";

/// Fixed page size for event listing.
const PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Calendar {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub primary: bool,
}

/// One attendee, creator, or organizer identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Person {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Either an instant (`dateTime`) or an all-day calendar date (`date`).
/// The distinction drives display formatting and must survive
/// round-trips, so both fields stay as the provider's raw strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventTime {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    pub fn raw(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }
}

/// An event record. Only the fields the tool reads are typed; the
/// provider sends plenty more, which `extra` carries through so the
/// detail view and export see the whole record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Event {
    #[serde(default)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<Person>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<Person>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Person>>,
    #[serde(rename = "hangoutLink", skip_serializing_if = "Option::is_none")]
    pub hangout_link: Option<String>,
    #[serde(rename = "htmlLink", skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Event {
    /// Attendee emails in listed order; a missing list is empty.
    pub fn attendee_emails(&self) -> Vec<&str> {
        self.attendees
            .iter()
            .flatten()
            .filter_map(|person| person.email.as_deref())
            .collect()
    }

    /// Re-serialize into the raw JSON tree for flattening.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Deserialize)]
struct CalendarListPage {
    items: Option<Vec<Calendar>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventsPage {
    items: Option<Vec<Event>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListEventsOptions {
    /// Constrain to instances starting at or after now, ordered by
    /// start time. Off means all events ordered by last modification.
    pub only_upcoming: bool,
    /// Free-text term forwarded verbatim to the provider's `q` param.
    pub query: Option<String>,
}

impl Default for ListEventsOptions {
    fn default() -> Self {
        Self {
            only_upcoming: true,
            query: None,
        }
    }
}

pub struct GcalClient {
    client: Client,
    api_base: String,
}

impl Default for GcalClient {
    fn default() -> Self {
        Self::new(CAL_API)
    }
}

impl GcalClient {
    pub fn new(api_base: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// List every calendar visible to the user, exhausting pagination.
    pub async fn list_calendars(&self, access_token: &str) -> Result<Vec<Calendar>> {
        let mut calendars: Vec<Calendar> = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut url = reqwest::Url::parse(&format!("{}/users/me/calendarList", self.api_base))?;
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }
            let page: CalendarListPage = self.get_json(access_token, url.as_str()).await?;
            calendars.extend(page.items.unwrap_or_default());
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(calendars)
    }

    /// List events for one calendar, exhausting pagination. Recurring
    /// events are always expanded into instances and soft-deleted
    /// events excluded.
    pub async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        opts: &ListEventsOptions,
    ) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut url = reqwest::Url::parse(&format!(
                "{}/calendars/{}/events",
                self.api_base,
                urlencoding::encode(calendar_id)
            ))?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs.append_pair("maxResults", &PAGE_SIZE.to_string());
                pairs.append_pair("singleEvents", "true");
                pairs.append_pair("showDeleted", "false");
                if opts.only_upcoming {
                    pairs.append_pair("orderBy", "startTime");
                    pairs.append_pair(
                        "timeMin",
                        &Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                    );
                } else {
                    pairs.append_pair("orderBy", "updated");
                }
                if let Some(q) = opts.query.as_deref().filter(|q| !q.is_empty()) {
                    pairs.append_pair("q", q);
                }
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }
            let page: EventsPage = self.get_json(access_token, url.as_str()).await?;
            events.extend(page.items.unwrap_or_default());
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(events)
    }

    /// Fetch one event by id. A missing record is an error, not a None.
    pub async fn fetch_event_by_id(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<Event> {
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.api_base,
            urlencoding::encode(calendar_id),
            urlencoding::encode(event_id)
        );
        self.get_json(access_token, &url).await
    }

    /// Authorized GET that fails fast on the first non-success status,
    /// carrying the provider's structured error message when parseable.
    async fn get_json<T: DeserializeOwned>(&self, access_token: &str, url: &str) -> Result<T> {
        let res = self.client.get(url).bearer_auth(access_token).send().await?;
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("{}", api_error_message(status, &text));
        }
        Ok(serde_json::from_str(&text)?)
    }
}

fn api_error_message(status: StatusCode, body: &str) -> String {
    let mut msg = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    if let Ok(json) = serde_json::from_str::<Value>(body)
        && let Some(detail) = json.pointer("/error/message").and_then(Value::as_str)
    {
        msg = format!("{}: {}", msg, detail);
    }
    msg
}

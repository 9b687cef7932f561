//! Inspection state: calendars, the selected calendar, search terms,
//! and the fetched event list. Mutating an input that a fetch depends
//! on re-derives the event list with exactly one new fetch, awaited in
//! place so a stale response can never overwrite a newer one.

use anyhow::Result;
use async_trait::async_trait;

use crate::google::gcal::{Calendar, Event, GcalClient, ListEventsOptions};
use crate::search::{filter_events, plan_server_query};

/// Calendar data provider consumed by the inspector; implemented by
/// the Google client and by fakes in tests.
#[async_trait]
pub trait EventSource {
    async fn list_calendars(&self, access_token: &str) -> Result<Vec<Calendar>>;
    async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        opts: &ListEventsOptions,
    ) -> Result<Vec<Event>>;
    async fn fetch_event_by_id(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<Event>;
}

#[async_trait]
impl EventSource for GcalClient {
    async fn list_calendars(&self, access_token: &str) -> Result<Vec<Calendar>> {
        GcalClient::list_calendars(self, access_token).await
    }

    async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        opts: &ListEventsOptions,
    ) -> Result<Vec<Event>> {
        GcalClient::list_events(self, access_token, calendar_id, opts).await
    }

    async fn fetch_event_by_id(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<Event> {
        GcalClient::fetch_event_by_id(self, access_token, calendar_id, event_id).await
    }
}

pub struct Inspector<S> {
    source: S,
    pub calendars: Vec<Calendar>,
    pub selected_cal_id: String,
    pub events: Vec<Event>,
    pub only_upcoming: bool,
    /// Draft search terms, live as the user types. They drive the
    /// local filter; `apply_search` commits them for the remote fetch.
    pub title_query: String,
    pub email_query: String,
    applied_title: String,
    applied_email: String,
    pub selected_event: Option<Event>,
    /// Last failure, shown as a single banner and cleared at the start
    /// of the next operation.
    pub error: Option<String>,
}

impl<S: EventSource> Inspector<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            calendars: Vec::new(),
            selected_cal_id: String::new(),
            events: Vec::new(),
            only_upcoming: true,
            title_query: String::new(),
            email_query: String::new(),
            applied_title: String::new(),
            applied_email: String::new(),
            selected_event: None,
            error: None,
        }
    }

    /// Replace the calendar working set wholesale; the first calendar
    /// becomes the selection if none was made yet.
    pub async fn load_calendars(&mut self, access_token: &str) {
        self.error = None;
        match self.source.list_calendars(access_token).await {
            Ok(calendars) => {
                if self.selected_cal_id.is_empty()
                    && let Some(first) = calendars.first()
                {
                    self.selected_cal_id = first.id.clone();
                }
                self.calendars = calendars;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    /// Re-fetch the event list for the current calendar, toggle, and
    /// applied search terms. A failure leaves the list empty; no
    /// partial results.
    pub async fn refresh_events(&mut self, access_token: &str) {
        if self.selected_cal_id.is_empty() {
            return;
        }
        self.error = None;
        self.events.clear();
        self.selected_event = None;
        let opts = ListEventsOptions {
            only_upcoming: self.only_upcoming,
            query: plan_server_query(&self.applied_title, &self.applied_email),
        };
        match self
            .source
            .list_events(access_token, &self.selected_cal_id, &opts)
            .await
        {
            Ok(events) => self.events = events,
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    pub async fn select_calendar(&mut self, access_token: &str, calendar_id: &str) {
        self.selected_cal_id = calendar_id.to_string();
        self.refresh_events(access_token).await;
    }

    pub async fn set_only_upcoming(&mut self, access_token: &str, only_upcoming: bool) {
        self.only_upcoming = only_upcoming;
        self.refresh_events(access_token).await;
    }

    /// Commit the draft terms; the applied pair is always a direct
    /// copy of the drafts at this moment.
    pub async fn apply_search(&mut self, access_token: &str) {
        self.applied_title = self.title_query.clone();
        self.applied_email = self.email_query.clone();
        self.refresh_events(access_token).await;
    }

    pub async fn clear_search(&mut self, access_token: &str) {
        self.title_query.clear();
        self.email_query.clear();
        self.applied_title.clear();
        self.applied_email.clear();
        self.refresh_events(access_token).await;
    }

    /// The always-live view of the fetched list under the draft terms.
    pub fn filtered_events(&self) -> Vec<&Event> {
        filter_events(&self.events, &self.title_query, &self.email_query)
    }

    pub fn select_event(&mut self, event: Event) {
        self.selected_event = Some(event);
    }

    /// Fetch one event by id. With a calendar selected this is a
    /// single GET; otherwise every known calendar is probed
    /// sequentially in listed order, stopping at the first hit and
    /// selecting that calendar.
    pub async fn fetch_by_id(&mut self, access_token: &str, event_id: &str) {
        self.error = None;
        self.selected_event = None;
        let event_id = event_id.trim();
        if event_id.is_empty() {
            self.error = Some("Please enter an event ID.".to_string());
            return;
        }

        if !self.selected_cal_id.is_empty() {
            match self
                .source
                .fetch_event_by_id(access_token, &self.selected_cal_id, event_id)
                .await
            {
                Ok(event) => self.selected_event = Some(event),
                Err(err) => self.error = Some(err.to_string()),
            }
            return;
        }

        for calendar in self.calendars.clone() {
            if let Ok(event) = self
                .source
                .fetch_event_by_id(access_token, &calendar.id, event_id)
                .await
            {
                self.selected_cal_id = calendar.id;
                self.refresh_events(access_token).await;
                self.selected_event = Some(event);
                return;
            }
        }
        self.error = Some("Event not found in your calendars.".to_string());
    }
}

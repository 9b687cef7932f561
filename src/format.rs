//! Display formatting for event start/end values. All-day events carry
//! a calendar date with no time component and must not grow one here.

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::google::gcal::EventTime;

/// The raw provider string for a start/end value: the instant if
/// present, otherwise the all-day date, otherwise empty.
pub fn human_date(value: Option<&EventTime>) -> String {
    value
        .and_then(EventTime::raw)
        .unwrap_or_default()
        .to_string()
}

/// Render a start/end pair for the events list.
///
/// Same-day timed ranges show both times with an en-dash; same-day
/// all-day ranges show the date once; cross-day ranges use an arrow
/// with each side formatted per its own kind. Unparseable values fall
/// back to the raw strings.
pub fn format_date_range(start: Option<&EventTime>, end: Option<&EventTime>) -> String {
    let (Some(start), Some(end)) = (start, end) else {
        return "Unknown time".to_string();
    };
    let (Some(raw_start), Some(raw_end)) = (start.raw(), end.raw()) else {
        return "Unknown time".to_string();
    };

    match (parse_event_time(start), parse_event_time(end)) {
        (Some(s), Some(e)) if s.date() == e.date() => {
            if start.date_time.is_some() {
                format!("{} – {}", s.format(true), e.format(true))
            } else {
                s.format(false)
            }
        }
        (Some(s), Some(e)) => format!(
            "{} → {}",
            s.format(start.date_time.is_some()),
            e.format(end.date_time.is_some())
        ),
        _ => format!("{} → {}", raw_start, raw_end),
    }
}

enum ParsedTime {
    Instant(DateTime<FixedOffset>),
    AllDay(NaiveDate),
}

impl ParsedTime {
    // Same-day comparison happens in the event's own offset
    fn date(&self) -> NaiveDate {
        match self {
            ParsedTime::Instant(dt) => dt.date_naive(),
            ParsedTime::AllDay(date) => *date,
        }
    }

    fn format(&self, with_time: bool) -> String {
        match self {
            ParsedTime::Instant(dt) if with_time => dt.format("%b %d, %Y %H:%M").to_string(),
            ParsedTime::Instant(dt) => dt.format("%b %d, %Y").to_string(),
            ParsedTime::AllDay(date) => date.format("%b %d, %Y").to_string(),
        }
    }
}

fn parse_event_time(value: &EventTime) -> Option<ParsedTime> {
    if let Some(date_time) = &value.date_time {
        return DateTime::parse_from_rfc3339(date_time)
            .ok()
            .map(ParsedTime::Instant);
    }
    value
        .date
        .as_ref()
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .map(ParsedTime::AllDay)
}

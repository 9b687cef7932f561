//! CSV serialization for the events table and the single-event
//! field/value table, plus the file save boundary.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::flatten::{flatten_value, value_to_text};
use crate::format::human_date;
use crate::google::gcal::Event;

/// Fixed column set for the events table export.
pub const EVENTS_CSV_COLUMNS: [&str; 12] = [
    "id",
    "summary",
    "start",
    "end",
    "status",
    "created",
    "updated",
    "creator.email",
    "organizer.email",
    "attendees",
    "hangoutLink",
    "htmlLink",
];

/// Serialize rows into one CSV document with RFC 4180 quoting. A BOM
/// is prepended so spreadsheet tools read wide characters correctly.
pub fn to_csv(rows: &[Vec<String>]) -> String {
    let body = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|field| csv_escape(field))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("\u{feff}{}", body)
}

/// Quote a field only when it contains a comma, double-quote, or
/// newline; internal double-quotes are doubled.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// One row per event with the fixed column set; first row is the header.
pub fn events_csv_rows(events: &[&Event]) -> Vec<Vec<String>> {
    let mut rows = vec![EVENTS_CSV_COLUMNS.iter().map(|c| c.to_string()).collect()];
    for event in events {
        rows.push(vec![
            event.id.clone(),
            event.summary.clone().unwrap_or_default(),
            human_date(event.start.as_ref()),
            human_date(event.end.as_ref()),
            event.status.clone().unwrap_or_default(),
            event.created.clone().unwrap_or_default(),
            event.updated.clone().unwrap_or_default(),
            event
                .creator
                .as_ref()
                .and_then(|p| p.email.clone())
                .unwrap_or_default(),
            event
                .organizer
                .as_ref()
                .and_then(|p| p.email.clone())
                .unwrap_or_default(),
            event.attendee_emails().join("; "),
            event.hangout_link.clone().unwrap_or_default(),
            event.html_link.clone().unwrap_or_default(),
        ]);
    }
    rows
}

/// Field/Value rows for a single event, one row per flattened path.
pub fn event_detail_rows(event: &Event) -> Vec<Vec<String>> {
    let mut rows = vec![vec!["Field".to_string(), "Value".to_string()]];
    for (path, value) in flatten_value(&event.to_value()) {
        rows.push(vec![path, value_to_text(&value)]);
    }
    rows
}

/// Opaque "save as file" capability so exports are testable without
/// touching the filesystem.
pub trait FileSink {
    fn save(&self, filename: &str, payload: &str) -> Result<()>;
}

/// Writes exports into a base directory.
pub struct DiskSink {
    base: PathBuf,
}

impl DiskSink {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl FileSink for DiskSink {
    fn save(&self, filename: &str, payload: &str) -> Result<()> {
        fs::write(self.base.join(filename), payload)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::gcal::{EventTime, Person};

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("with,comma"), "\"with,comma\"");
        assert_eq!(csv_escape("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(
            csv_escape("He said \"hi\", bye"),
            "\"He said \"\"hi\"\", bye\""
        );
    }

    #[test]
    fn test_to_csv_prepends_bom() {
        let rows = vec![
            vec!["Field".to_string(), "Value".to_string()],
            vec!["summary".to_string(), "Standup, daily".to_string()],
        ];
        assert_eq!(
            to_csv(&rows),
            "\u{feff}Field,Value\nsummary,\"Standup, daily\""
        );
    }

    #[test]
    fn test_events_csv_rows() {
        let event = Event {
            id: "ev1".to_string(),
            summary: Some("Planning".to_string()),
            status: Some("confirmed".to_string()),
            start: Some(EventTime {
                date_time: Some("2024-01-05T09:00:00Z".to_string()),
                ..Default::default()
            }),
            end: Some(EventTime {
                date_time: Some("2024-01-05T10:00:00Z".to_string()),
                ..Default::default()
            }),
            organizer: Some(Person {
                email: Some("boss@example.com".to_string()),
                ..Default::default()
            }),
            attendees: Some(vec![
                Person {
                    email: Some("a@example.com".to_string()),
                    ..Default::default()
                },
                Person {
                    email: Some("b@example.com".to_string()),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        };

        let rows = events_csv_rows(&[&event]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "id");
        assert_eq!(rows[1][0], "ev1");
        assert_eq!(rows[1][1], "Planning");
        assert_eq!(rows[1][2], "2024-01-05T09:00:00Z");
        assert_eq!(rows[1][8], "boss@example.com");
        assert_eq!(rows[1][9], "a@example.com; b@example.com");
        // Absent creator renders empty rather than erroring
        assert_eq!(rows[1][7], "");
    }

    #[test]
    fn test_event_detail_rows() {
        let event = Event {
            id: "ev1".to_string(),
            summary: Some("Planning".to_string()),
            ..Default::default()
        };

        let rows = event_detail_rows(&event);
        assert_eq!(rows[0], vec!["Field".to_string(), "Value".to_string()]);
        assert!(rows.contains(&vec!["id".to_string(), "ev1".to_string()]));
        assert!(rows.contains(&vec!["summary".to_string(), "Planning".to_string()]));
    }

    #[test]
    fn test_disk_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DiskSink::new(dir.path());
        sink.save("events.csv", "\u{feff}id,summary").unwrap();

        let written = std::fs::read_to_string(dir.path().join("events.csv")).unwrap();
        assert_eq!(written, "\u{feff}id,summary");
    }
}

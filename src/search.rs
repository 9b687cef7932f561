//! Two-tier event search: a single narrowed server-side query term,
//! then an exact client-side filter over both fields.

use crate::google::gcal::Event;

/// Pick the single free-text term to send to the provider, which only
/// accepts one. Both fields empty after trimming means no term;
/// otherwise the longer trimmed string wins, with ties going to the
/// email term. The server match is lossy either way and
/// `filter_events` re-validates everything, so this only reduces
/// pages fetched.
pub fn plan_server_query(title_query: &str, email_query: &str) -> Option<String> {
    let title = title_query.trim();
    let email = email_query.trim();
    if title.is_empty() && email.is_empty() {
        return None;
    }
    if title.len() > email.len() {
        Some(title.to_string())
    } else {
        Some(email.to_string())
    }
}

/// Exact client-side filter over both search fields with AND
/// semantics. An empty term is vacuously satisfied; when both are
/// empty this is the identity on the input list.
pub fn filter_events<'a>(
    events: &'a [Event],
    title_query: &str,
    email_query: &str,
) -> Vec<&'a Event> {
    let title = title_query.trim().to_lowercase();
    let email = email_query.trim().to_lowercase();
    if title.is_empty() && email.is_empty() {
        return events.iter().collect();
    }
    events
        .iter()
        .filter(|event| matches_title(event, &title) && matches_emails(event, &email))
        .collect()
}

/// Case-insensitive substring over summary, description, and location.
/// Absent fields do not match.
fn matches_title(event: &Event, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    [
        event.summary.as_deref(),
        event.description.as_deref(),
        event.location.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|text| text.to_lowercase().contains(term))
}

/// Case-insensitive substring over the creator, organizer, and
/// attendee emails. A missing attendee list is treated as empty.
fn matches_emails(event: &Event, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    event
        .creator
        .iter()
        .chain(event.organizer.iter())
        .chain(event.attendees.iter().flatten())
        .filter_map(|person| person.email.as_deref())
        .any(|email| email.to_lowercase().contains(term))
}

use anyhow::Result;

use crate::cli::require_token;
use crate::core::AppConfig;
use crate::export::{DiskSink, FileSink, events_csv_rows, to_csv};
use crate::format::format_date_range;
use crate::google::gcal::{GcalClient, ListEventsOptions};
use crate::search::{filter_events, plan_server_query};

pub async fn run(
    config: &AppConfig,
    calendar: Option<String>,
    all: bool,
    title: &str,
    email: &str,
    csv: Option<String>,
) -> Result<()> {
    let token = require_token(config)?;
    let gcal = GcalClient::default();

    let calendar_id = match calendar {
        Some(id) => id,
        None => {
            let calendars = gcal.list_calendars(&token).await?;
            let Some(first) = calendars.into_iter().next() else {
                anyhow::bail!("No calendars found");
            };
            first.id
        }
    };

    let opts = ListEventsOptions {
        only_upcoming: !all,
        query: plan_server_query(title, email),
    };
    let events = gcal.list_events(&token, &calendar_id, &opts).await?;
    let filtered = filter_events(&events, title, email);

    if let Some(filename) = csv {
        let sink = DiskSink::new(config.export_dir.clone());
        sink.save(&filename, &to_csv(&events_csv_rows(&filtered)))?;
        println!("Wrote {} events to {}", filtered.len(), filename);
        return Ok(());
    }

    for event in &filtered {
        println!("{}", event.summary.as_deref().unwrap_or("(no title)"));
        println!(
            "  {} • {}",
            format_date_range(event.start.as_ref(), event.end.as_ref()),
            event
                .creator
                .as_ref()
                .and_then(|p| p.email.as_deref())
                .unwrap_or("unknown")
        );
        println!("  {}", event.id);
    }
    println!("{} events", filtered.len());
    Ok(())
}

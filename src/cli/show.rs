use anyhow::Result;

use crate::cli::require_token;
use crate::core::AppConfig;
use crate::export::{DiskSink, FileSink, event_detail_rows, to_csv};
use crate::google::gcal::GcalClient;
use crate::inspector::Inspector;

pub async fn run(
    config: &AppConfig,
    event_id: &str,
    calendar: Option<String>,
    csv: Option<String>,
) -> Result<()> {
    let token = require_token(config)?;
    let mut inspector = Inspector::new(GcalClient::default());

    match calendar {
        Some(id) => inspector.selected_cal_id = id,
        None => {
            // Probe every calendar for the id rather than assuming one
            inspector.load_calendars(&token).await;
            if let Some(err) = inspector.error.take() {
                anyhow::bail!("{}", err);
            }
            inspector.selected_cal_id.clear();
        }
    }

    inspector.fetch_by_id(&token, event_id).await;
    if let Some(err) = inspector.error.take() {
        anyhow::bail!("{}", err);
    }
    let Some(event) = inspector.selected_event.take() else {
        anyhow::bail!("Event not found in your calendars.");
    };

    let rows = event_detail_rows(&event);
    if let Some(filename) = csv {
        let sink = DiskSink::new(config.export_dir.clone());
        sink.save(&filename, &to_csv(&rows))?;
        println!("Wrote {} fields to {}", rows.len() - 1, filename);
        return Ok(());
    }

    for row in rows.iter().skip(1) {
        println!("{}: {}", row[0], row[1]);
    }
    Ok(())
}

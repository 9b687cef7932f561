use anyhow::Result;

use crate::cli::require_token;
use crate::core::AppConfig;
use crate::google::gcal::GcalClient;

pub async fn run(config: &AppConfig) -> Result<()> {
    let token = require_token(config)?;
    let gcal = GcalClient::default();

    let calendars = gcal.list_calendars(&token).await?;
    for calendar in &calendars {
        let marker = if calendar.primary { " (primary)" } else { "" };
        println!("{}  {}{}", calendar.id, calendar.summary, marker);
    }
    println!("{} calendars", calendars.len());
    Ok(())
}

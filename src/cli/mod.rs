use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub mod auth;
pub mod calendars;
pub mod events;
pub mod inspect;
pub mod show;

use crate::core::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Start the interactive inspection shell
    Inspect {},
    /// Perform interactive sign-in and print the access token
    Auth {},
    /// List calendars
    Calendars {},
    /// List events for a calendar
    Events {
        /// Calendar to list; defaults to the first calendar
        #[arg(long)]
        calendar: Option<String>,
        /// Include past events, ordered by last modification
        #[arg(long)]
        all: bool,
        /// Match against title, description, or location
        #[arg(long, default_value = "")]
        title: String,
        /// Match against creator, organizer, or attendee emails
        #[arg(long, default_value = "")]
        email: String,
        /// Write the result as CSV to this filename instead of printing
        #[arg(long)]
        csv: Option<String>,
    },
    /// Fetch one event by id and show every field
    Show {
        event_id: String,
        /// Calendar holding the event; without it every calendar is probed
        #[arg(long)]
        calendar: Option<String>,
        /// Write the fields as CSV to this filename instead of printing
        #[arg(long)]
        csv: Option<String>,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Cli::parse();
    let config = AppConfig::from_env();

    // Handle each sub command
    match args.command {
        Some(Command::Auth {}) => auth::run(&config).await?,
        Some(Command::Calendars {}) => calendars::run(&config).await?,
        Some(Command::Events {
            calendar,
            all,
            title,
            email,
            csv,
        }) => {
            events::run(&config, calendar, all, &title, &email, csv).await?;
        }
        Some(Command::Show {
            event_id,
            calendar,
            csv,
        }) => {
            show::run(&config, &event_id, calendar, csv).await?;
        }
        Some(Command::Inspect {}) | None => inspect::run(&config).await?,
    }

    Ok(())
}

pub(crate) fn require_token(config: &AppConfig) -> Result<String> {
    config.access_token.clone().ok_or_else(|| {
        anyhow::anyhow!(
            "No access token. Run `calinspect auth` and export CALINSPECT_ACCESS_TOKEN."
        )
    })
}

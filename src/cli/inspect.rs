//! Interactive inspection shell: sign in, pick a calendar, search,
//! and export, with the event list re-derived after every change.

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::cli::auth::StdioAuthProvider;
use crate::core::AppConfig;
use crate::export::{DiskSink, FileSink, event_detail_rows, events_csv_rows, to_csv};
use crate::format::format_date_range;
use crate::google::auth::GoogleAuth;
use crate::google::gcal::GcalClient;
use crate::inspector::Inspector;
use crate::session::Session;

const HELP: &str = "\
Commands:
  signin                 start the interactive consent flow
  signout                revoke the token and clear the session
  whoami                 show the signed-in identity
  calendars              list calendars
  select <calendar-id>   switch calendars (refetches events)
  upcoming on|off        toggle upcoming-only fetching
  title [text]           set or clear the title/description/location term
  email [text]           set or clear the email term
  apply                  commit both terms and refetch
  clear                  clear both terms and refetch
  events                 show the filtered event list
  pick <n>               show event <n> from the list without refetching
  show <event-id>        fetch one event and show every field
  export events|event    write events.csv or event_<id>.csv
  help                   this message
  quit                   exit";

pub async fn run(config: &AppConfig) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    let provider = StdioAuthProvider::new(config.google_client_id.clone().unwrap_or_default());
    let mut session = Session::new(provider, GoogleAuth::default());
    session.initialize(config.google_client_id.as_deref()).await;
    if let Some(token) = &config.access_token {
        session.adopt_token(token.clone()).await;
    }

    let mut inspector = Inspector::new(GcalClient::default());
    let sink = DiskSink::new(config.export_dir.clone());

    if let Some(token) = session.token().map(str::to_string) {
        bootstrap(&mut inspector, &token).await;
    } else {
        println!("Sign in to load your calendars.");
    }

    println!("Type 'help' for commands.");
    loop {
        let readline = rl.readline("calinspect> ");
        match readline {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                if !dispatch(&line, &mut session, &mut inspector, &sink).await? {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

async fn bootstrap(inspector: &mut Inspector<GcalClient>, token: &str) {
    inspector.load_calendars(token).await;
    inspector.refresh_events(token).await;
    report(inspector);
}

/// Handle one shell line; false means exit.
async fn dispatch(
    line: &str,
    session: &mut Session<StdioAuthProvider>,
    inspector: &mut Inspector<GcalClient>,
    sink: &DiskSink,
) -> Result<bool> {
    let (command, rest) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "help" => println!("{}", HELP),
        "quit" | "exit" => return Ok(false),
        "signin" => {
            if !session.ready() {
                println!("Sign-in is disabled; set CALINSPECT_GOOGLE_CLIENT_ID.");
                return Ok(true);
            }
            if let Err(err) = session.sign_in().await {
                println!("Error: {}", err);
            } else if let Some(token) = session.token().map(str::to_string) {
                println!("Signed in as {}", session.email().unwrap_or("(unknown)"));
                bootstrap(inspector, &token).await;
            } else {
                println!("Sign-in cancelled.");
            }
        }
        "signout" => {
            session.sign_out().await;
            *inspector = Inspector::new(GcalClient::default());
            println!("Signed out.");
        }
        "whoami" => match (session.is_authed(), session.email()) {
            (true, Some(email)) => println!("{}", email),
            (true, None) => println!("(unknown identity)"),
            (false, _) => println!("Not signed in."),
        },
        _ => {
            let Some(token) = session.token().map(str::to_string) else {
                println!("Sign in first.");
                return Ok(true);
            };
            dispatch_authed(command, rest, &token, inspector, sink).await?;
        }
    }

    Ok(true)
}

async fn dispatch_authed(
    command: &str,
    rest: &str,
    token: &str,
    inspector: &mut Inspector<GcalClient>,
    sink: &DiskSink,
) -> Result<()> {
    match command {
        "calendars" => {
            inspector.load_calendars(token).await;
            for calendar in &inspector.calendars {
                let marker = if calendar.primary { " (primary)" } else { "" };
                let selected = if calendar.id == inspector.selected_cal_id {
                    "*"
                } else {
                    " "
                };
                println!("{} {}  {}{}", selected, calendar.id, calendar.summary, marker);
            }
            if let Some(err) = &inspector.error {
                println!("Error: {}", err);
            }
        }
        "select" => {
            inspector.select_calendar(token, rest).await;
            report(inspector);
        }
        "upcoming" => match rest {
            "on" => {
                inspector.set_only_upcoming(token, true).await;
                report(inspector);
            }
            "off" => {
                inspector.set_only_upcoming(token, false).await;
                report(inspector);
            }
            _ => println!("Usage: upcoming on|off"),
        },
        "title" => {
            inspector.title_query = rest.to_string();
            println!("{} events match", inspector.filtered_events().len());
        }
        "email" => {
            inspector.email_query = rest.to_string();
            println!("{} events match", inspector.filtered_events().len());
        }
        "apply" => {
            inspector.apply_search(token).await;
            report(inspector);
        }
        "clear" => {
            inspector.clear_search(token).await;
            report(inspector);
        }
        "events" => print_events(inspector),
        "pick" => {
            let position = rest.parse::<usize>().ok().and_then(|n| n.checked_sub(1));
            let Some(position) = position else {
                println!("Usage: pick <n>");
                return Ok(());
            };
            let picked = inspector
                .filtered_events()
                .get(position)
                .map(|event| (*event).clone());
            match picked {
                Some(event) => {
                    inspector.select_event(event);
                    print_selected(inspector);
                }
                None => println!("No event at position {}.", position + 1),
            }
        }
        "show" => {
            inspector.fetch_by_id(token, rest).await;
            print_selected(inspector);
            if let Some(err) = &inspector.error {
                println!("Error: {}", err);
            }
        }
        "export" => export(rest, inspector, sink)?,
        _ => println!("Unknown command; type 'help'."),
    }
    Ok(())
}

fn print_selected(inspector: &Inspector<GcalClient>) {
    if let Some(event) = &inspector.selected_event {
        for row in event_detail_rows(event).iter().skip(1) {
            println!("{}: {}", row[0], row[1]);
        }
    }
}

fn print_events(inspector: &Inspector<GcalClient>) {
    let filtered = inspector.filtered_events();
    if filtered.is_empty() {
        println!("No events match your filters.");
        return;
    }
    for (ix, event) in filtered.iter().enumerate() {
        println!("{:>3} {}", ix + 1, event.summary.as_deref().unwrap_or("(no title)"));
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
}

fn export(target: &str, inspector: &Inspector<GcalClient>, sink: &DiskSink) -> Result<()> {
    match target {
        "events" => {
            let filtered = inspector.filtered_events();
            sink.save("events.csv", &to_csv(&events_csv_rows(&filtered)))?;
            println!("Wrote {} events to events.csv", filtered.len());
        }
        "event" => {
            let Some(event) = &inspector.selected_event else {
                println!("Select an event first with 'show <event-id>'.");
                return Ok(());
            };
            let id = if event.id.is_empty() {
                "details"
            } else {
                event.id.as_str()
            };
            let filename = format!("event_{}.csv", id);
            sink.save(&filename, &to_csv(&event_detail_rows(event)))?;
            println!("Wrote {}", filename);
        }
        _ => println!("Usage: export events|event"),
    }
    Ok(())
}

fn report(inspector: &Inspector<GcalClient>) {
    if let Some(err) = &inspector.error {
        println!("Error: {}", err);
    } else {
        println!("{} events", inspector.filtered_events().len());
    }
}

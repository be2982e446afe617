mod app;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::cache::ResourceKey;
use crate::state::messages::UiEvent;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use espn_api::League;
use log::{info, trace};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Duration;
use tui::{Terminal, backend::CrosstermBackend};

#[derive(Debug, PartialEq)]
enum CliAction {
    Run { league: Option<League> },
    Exit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let league_override = match handle_cli_args(std::env::args().skip(1)) {
        Ok(CliAction::Run { league }) => league,
        Ok(CliAction::Exit) => return Ok(()),
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Error)?;
    tui_logger::set_default_level(log::LevelFilter::Error);

    let mut settings = AppSettings::load();
    if let Some(league) = league_override {
        settings.league = league;
    }

    // Cache entries report every state change here so the UI can redraw.
    let (update_tx, update_rx) = mpsc::unbounded_channel::<ResourceKey>();
    let app = Arc::new(Mutex::new(App::new(settings, update_tx)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // UI tick thread
    let tick_tx = ui_event_tx.clone();
    let tick_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            if tick_tx.send(UiEvent::Tick).await.is_err() {
                break;
            }
        }
    });

    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, update_rx).await;

    input_handler.abort();
    tick_task.abort();

    Ok(())
}

fn handle_cli_args(mut args: impl Iterator<Item = String>) -> Result<CliAction, String> {
    let mut league = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", usage_text());
                return Ok(CliAction::Exit);
            }
            "-V" | "--version" => {
                println!("sportsdash {}", env!("CARGO_PKG_VERSION"));
                return Ok(CliAction::Exit);
            }
            "-l" | "--league" => {
                let value = args.next().ok_or("--league needs a value")?;
                league = Some(value.parse::<League>().map_err(|e| e.to_string())?);
            }
            other => {
                if let Some(value) = other.strip_prefix("--league=") {
                    league = Some(value.parse::<League>().map_err(|e| e.to_string())?);
                } else {
                    return Err(format!("Unknown argument: {other}"));
                }
            }
        }
    }
    Ok(CliAction::Run { league })
}

fn usage_text() -> &'static str {
    "sportsdash - NBA and NFL scores in the terminal

Usage:
  sportsdash [--league nba|nfl]
  sportsdash --help
  sportsdash --version

Environment:
  SPORTSDASH_LEAGUE     League shown at startup (nba or nfl, default nba)
  SPORTSDASH_API_BASE   Override the ESPN site API base URL
  SPORTSDASH_LOG        Log level for the log pane (error, warn, info, debug, trace)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    mut cache_updates: mpsc::UnboundedReceiver<ResourceKey>,
) {
    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                if handle_ui_event(ui_event, &app).await {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard);
                }
            }

            Some(key) = cache_updates.recv() => {
                trace!("cache updated: {key}");
                // Coalesce bursts into one frame.
                while cache_updates.try_recv().is_ok() {}
                let mut app_guard = app.lock().await;
                draw::draw(&mut terminal, &mut app_guard);
            }

            else => break,
        }
    }
}

async fn handle_ui_event(ui_event: UiEvent, app: &Arc<Mutex<App>>) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let mut guard = app.lock().await;
            info!("starting with league {}", guard.league());
            guard.sync_subscriptions();
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::Tick => {
            let mut guard = app.lock().await;
            guard.state.tick = guard.state.tick.wrapping_add(1);
            true
        }
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        let event = tokio::task::spawn_blocking(crossterm_event::read).await;
        if let Ok(Ok(event)) = event {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliAction, String> {
        handle_cli_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn no_arguments_runs_with_configured_league() {
        assert_eq!(parse(&[]), Ok(CliAction::Run { league: None }));
    }

    #[test]
    fn league_flag_accepts_both_forms() {
        assert_eq!(parse(&["--league", "nfl"]), Ok(CliAction::Run { league: Some(League::Nfl) }));
        assert_eq!(parse(&["--league=NBA"]), Ok(CliAction::Run { league: Some(League::Nba) }));
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(parse(&["--league"]).is_err());
        assert!(parse(&["--league", "mlb"]).is_err());
        assert_eq!(parse(&["--bogus"]), Err("Unknown argument: --bogus".to_string()));
    }
}

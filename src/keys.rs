use crate::app::{App, MenuItem};
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_key_bindings(key_event: KeyEvent, app: &Arc<Mutex<App>>) {
    let mut guard = app.lock().await;

    // Search input swallows printable keys until Enter or Esc.
    if guard.state.active_tab == MenuItem::Teams && guard.state.teams.searching {
        match (key_event.code, key_event.modifiers) {
            (Char('c'), KeyModifiers::CONTROL) => {
                crate::cleanup_terminal();
                std::process::exit(0);
            }
            (KeyCode::Enter | KeyCode::Esc, _) => guard.state.teams.searching = false,
            (KeyCode::Backspace, _) => guard.state.teams.pop_search(),
            (Char(c), _) => guard.state.teams.push_search(c),
            _ => {}
        }
        return;
    }

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Dashboard),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Scoreboard),
        (_, Char('3'), _) => guard.update_tab(MenuItem::Teams),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Overlays close before anything else reacts to Esc
        (_, KeyCode::Esc, _) => {
            guard.close_overlay();
        }

        // Lists and overlay scrolling
        (MenuItem::Scoreboard | MenuItem::Teams, Char('j') | KeyCode::Down, _) => guard.move_down(),
        (MenuItem::Scoreboard | MenuItem::Teams, Char('k') | KeyCode::Up, _) => guard.move_up(),
        (MenuItem::Scoreboard | MenuItem::Teams, KeyCode::Enter, _) => guard.open_selected(),
        (MenuItem::Teams, Char('/'), _) if !guard.overlay_open() => {
            guard.state.teams.searching = true;
        }

        // Data
        (_, Char('l'), _) => guard.cycle_league(),
        (_, Char('r'), _) => {
            let issued = guard.retry();
            info!("retry issued {issued} fetch(es)");
        }
        (_, Char('R'), _) => guard.reload(),

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    guard.sync_subscriptions();
}

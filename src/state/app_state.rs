use crate::app::MenuItem;
use crate::state::views::{ScoreboardView, TeamsView};

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub scoreboard: ScoreboardView,
    pub teams: TeamsView,
    /// Monotonic UI tick counter, drives the fetch spinner.
    pub tick: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget per-page selection, e.g. after the league changes.
    pub fn reset_pages(&mut self) {
        self.scoreboard.reset();
        self.teams.reset();
    }
}

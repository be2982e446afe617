//! Presentation state for each page, derived from cache snapshots on every
//! render. Nothing here is stored between frames except the local
//! selection/search state each page owns.

use crate::state::cache::{Snapshot, Status};
use crate::state::overlay::DetailOverlay;
use espn_api::{Game, League, Team};
use std::sync::Arc;

/// What a page shows. Exactly one variant per render; there is no blank state.
#[derive(Debug, Clone, PartialEq)]
pub enum Presentation<T> {
    Loading { message: String },
    Error { message: String },
    /// Upstream returned an empty collection.
    Empty { message: String },
    /// Upstream had data but the local filter matched nothing.
    NoMatches { message: String },
    Ready(T),
}

impl<T> Presentation<T> {
    #[cfg(test)]
    pub fn is_ready(&self) -> bool {
        matches!(self, Presentation::Ready(_))
    }
}

/// Gate a single snapshot: `Ok(data)` when fresh, otherwise the
/// presentation to show instead.
fn require<T, U>(snapshot: &Snapshot<T>, loading: &str) -> Result<Arc<T>, Presentation<U>> {
    match (snapshot.status, &snapshot.data) {
        (Status::Error, _) => Err(Presentation::Error {
            message: snapshot
                .error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "Something went wrong".to_owned()),
        }),
        (Status::Fresh, Some(data)) => Ok(Arc::clone(data)),
        _ => Err(Presentation::Loading { message: loading.to_owned() }),
    }
}

/// "1 game found", "3 games found", "0 teams found".
pub fn count_label(count: usize, noun: &str) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{plural} found")
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub league: League,
    pub total_games: usize,
    pub live_games: usize,
    pub upcoming_games: usize,
    pub total_teams: usize,
}

/// Errors win over loading: one failed input is reported even while the
/// other is still pending.
pub fn dashboard(
    league: League,
    scoreboard: &Snapshot<Vec<Game>>,
    teams: &Snapshot<Vec<Team>>,
) -> Presentation<DashboardSummary> {
    let loading = format!("Loading {league} dashboard...");
    let games = require(scoreboard, &loading);
    let teams = require(teams, &loading);

    let (games, teams) = match (games, teams) {
        (Err(err @ Presentation::Error { .. }), _) | (_, Err(err @ Presentation::Error { .. })) => {
            return err;
        }
        (Ok(games), Ok(teams)) => (games, teams),
        (Err(pending), _) | (_, Err(pending)) => return pending,
    };

    if games.is_empty() && teams.is_empty() {
        return Presentation::Empty {
            message: format!("No {league} data available"),
        };
    }

    Presentation::Ready(DashboardSummary {
        league,
        total_games: games.len(),
        live_games: games.iter().filter(|g| g.is_live()).count(),
        upcoming_games: games.iter().filter(|g| g.is_upcoming()).count(),
        total_teams: teams.len(),
    })
}

// ---------------------------------------------------------------------------
// Scoreboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ScoreboardPage {
    pub title: String,
    pub count_label: String,
    pub games: Arc<Vec<Game>>,
}

pub fn scoreboard(league: League, snapshot: &Snapshot<Vec<Game>>) -> Presentation<ScoreboardPage> {
    let games = match require(snapshot, "Loading scoreboard...") {
        Ok(games) => games,
        Err(state) => return state,
    };
    if games.is_empty() {
        return Presentation::Empty {
            message: format!("No {league} games available"),
        };
    }
    Presentation::Ready(ScoreboardPage {
        title: format!("{league} Scoreboard"),
        count_label: count_label(games.len(), "game"),
        games,
    })
}

/// Local state of the scoreboard page: list cursor plus the open game.
#[derive(Debug, Default)]
pub struct ScoreboardView {
    pub cursor: usize,
    pub game_overlay: DetailOverlay,
}

impl ScoreboardView {
    pub fn select_next(&mut self, len: usize) {
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Open the drawer for the game under the cursor.
    pub fn open_selected(&mut self, games: &[Game]) -> Option<&str> {
        let game = games.get(self.cursor)?;
        self.game_overlay.open(&game.id);
        self.game_overlay.id()
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.game_overlay.close();
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TeamsPage {
    pub title: String,
    pub count_label: String,
    pub teams: Vec<Team>,
}

/// Case-insensitive substring match on display name, location and
/// abbreviation. Pure and order-preserving; an empty query keeps every team.
pub fn filter_teams(teams: &[Team], query: &str) -> Vec<Team> {
    let needle = query.to_lowercase();
    teams
        .iter()
        .filter(|team| {
            [&team.display_name, &team.location, &team.abbreviation]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

pub fn teams(league: League, snapshot: &Snapshot<Vec<Team>>, query: &str) -> Presentation<TeamsPage> {
    let all = match require(snapshot, "Loading teams...") {
        Ok(teams) => teams,
        Err(state) => return state,
    };
    if all.is_empty() {
        return Presentation::Empty {
            message: format!("No {league} teams available"),
        };
    }

    let filtered = filter_teams(&all, query);
    if filtered.is_empty() {
        return Presentation::NoMatches {
            message: "No teams match your search".to_owned(),
        };
    }
    Presentation::Ready(TeamsPage {
        title: format!("{league} Teams"),
        count_label: count_label(filtered.len(), "team"),
        teams: filtered,
    })
}

/// Local state of the teams page: cursor, search text and the open team.
#[derive(Debug, Default)]
pub struct TeamsView {
    pub cursor: usize,
    pub search: String,
    pub searching: bool,
    pub team_overlay: DetailOverlay,
}

impl TeamsView {
    pub fn select_next(&mut self, len: usize) {
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn push_search(&mut self, c: char) {
        self.search.push(c);
        self.cursor = 0;
    }

    pub fn pop_search(&mut self) {
        self.search.pop();
        self.cursor = 0;
    }

    /// Open the modal for the team under the cursor of the filtered list.
    pub fn open_selected(&mut self, visible: &[Team]) -> Option<&str> {
        let team = visible.get(self.cursor)?;
        self.team_overlay.open(&team.id);
        self.team_overlay.id()
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.search.clear();
        self.searching = false;
        self.team_overlay.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::cache::FetchError;
    use crate::state::fetchers::tests::team;
    use espn_api::GameState;

    fn fresh<T>(data: T) -> Snapshot<T> {
        Snapshot {
            status: Status::Fresh,
            data: Some(Arc::new(data)),
            error: None,
            fetched_at: None,
            is_fetching: false,
        }
    }

    fn pending<T>() -> Snapshot<T> {
        Snapshot { status: Status::Pending, is_fetching: true, ..Snapshot::disabled() }
    }

    fn failed<T>(message: &str) -> Snapshot<T> {
        Snapshot {
            status: Status::Error,
            error: Some(FetchError::Transport(message.into())),
            ..Snapshot::disabled()
        }
    }

    fn game(id: &str, state: GameState) -> Game {
        Game { id: id.into(), state, ..Default::default() }
    }

    fn three_teams() -> Vec<Team> {
        vec![
            team("1", "Alpha", "Northport", "ALP"),
            team("2", "Beta", "Southport", "BET"),
            team("3", "Gamma City", "Eastport", "GMC"),
        ]
    }

    #[test]
    fn empty_scoreboard_names_the_league() {
        let state = scoreboard(League::Nba, &fresh(Vec::new()));
        assert!(matches!(state, Presentation::Empty { message } if message == "No NBA games available"));
        let state = scoreboard(League::Nfl, &fresh(Vec::new()));
        assert!(matches!(state, Presentation::Empty { message } if message == "No NFL games available"));
    }

    #[test]
    fn scoreboard_states_follow_snapshot_status() {
        assert!(matches!(scoreboard(League::Nba, &pending()), Presentation::Loading { .. }));
        assert!(matches!(
            scoreboard(League::Nba, &failed("Failed to fetch scoreboard: Bad Gateway")),
            Presentation::Error { message } if message == "Failed to fetch scoreboard: Bad Gateway"
        ));

        let Presentation::Ready(page) =
            scoreboard(League::Nba, &fresh(vec![game("g1", GameState::In)]))
        else {
            panic!("expected ready scoreboard");
        };
        assert_eq!(page.title, "NBA Scoreboard");
        assert_eq!(page.count_label, "1 game found");
    }

    #[test]
    fn searching_ga_finds_gamma_city() {
        let Presentation::Ready(page) = teams(League::Nba, &fresh(three_teams()), "ga") else {
            panic!("expected ready teams page");
        };
        let names: Vec<&str> = page.teams.iter().map(|t| t.display_name.as_str()).collect();
        assert_eq!(names, vec!["Gamma City"]);
        assert_eq!(page.count_label, "1 team found");
    }

    #[test]
    fn filter_matches_location_and_abbreviation_case_insensitively() {
        let all = three_teams();
        let by_location: Vec<String> =
            filter_teams(&all, "SOUTH").into_iter().map(|t| t.id).collect();
        assert_eq!(by_location, vec!["2"]);
        let by_abbrev: Vec<String> = filter_teams(&all, "gmc").into_iter().map(|t| t.id).collect();
        assert_eq!(by_abbrev, vec!["3"]);
        assert_eq!(filter_teams(&all, "").len(), 3);
    }

    #[test]
    fn filter_is_idempotent_and_order_preserving() {
        let all = three_teams();
        let before = all.clone();
        let once = filter_teams(&all, "port");
        let twice = filter_teams(&once, "port");
        assert_eq!(once, twice);
        assert_eq!(once, before, "every team matches 'port', order kept");
        assert_eq!(all, before, "source list untouched");
    }

    #[test]
    fn no_matches_is_distinct_from_empty_upstream() {
        assert_eq!(
            teams(League::Nba, &fresh(three_teams()), "zzz"),
            Presentation::NoMatches { message: "No teams match your search".into() }
        );
        assert_eq!(
            teams(League::Nfl, &fresh(Vec::new()), "zzz"),
            Presentation::Empty { message: "No NFL teams available".into() }
        );
    }

    #[test]
    fn dashboard_counts_live_and_upcoming_games() {
        let games = vec![
            game("1", GameState::In),
            game("2", GameState::Pre),
            game("3", GameState::Pre),
            game("4", GameState::Post),
        ];
        let state = dashboard(League::Nba, &fresh(games), &fresh(three_teams()));
        assert_eq!(
            state,
            Presentation::Ready(DashboardSummary {
                league: League::Nba,
                total_games: 4,
                live_games: 1,
                upcoming_games: 2,
                total_teams: 3,
            })
        );
    }

    #[test]
    fn dashboard_reports_errors_before_loading() {
        let state = dashboard(League::Nba, &pending(), &failed("Failed to fetch teams: Not Found"));
        assert_eq!(state, Presentation::Error { message: "Failed to fetch teams: Not Found".into() });
        let state = dashboard(League::Nba, &pending(), &fresh(three_teams()));
        assert!(matches!(state, Presentation::Loading { .. }));
        let state = dashboard(League::Nba, &fresh(Vec::new()), &fresh(Vec::new()));
        assert!(matches!(state, Presentation::Empty { .. }));
    }

    #[test]
    fn count_label_pluralises() {
        assert_eq!(count_label(0, "team"), "0 teams found");
        assert_eq!(count_label(1, "team"), "1 team found");
        assert_eq!(count_label(12, "game"), "12 games found");
    }

    #[test]
    fn cursor_stays_in_bounds_and_opens_selected() {
        let games = vec![game("a", GameState::Pre), game("b", GameState::Pre)];
        let mut view = ScoreboardView::default();
        view.select_next(games.len());
        view.select_next(games.len());
        assert_eq!(view.cursor, 1);
        assert_eq!(view.open_selected(&games), Some("b"));
        view.select_prev();
        view.select_prev();
        assert_eq!(view.cursor, 0);
        view.reset();
        assert!(!view.game_overlay.is_open());
    }
}

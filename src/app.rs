use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::cache::{ResourceKey, Snapshot, Subscription};
use crate::state::fetchers::{Resources, SportsSource};
use crate::state::league::LeagueStore;
use crate::state::overlay::{OverlayState, overlay_state};
use crate::state::views::{self, DashboardSummary, Presentation, ScoreboardPage, TeamsPage};
use espn_api::client::EspnApi;
use espn_api::{Game, GameSummary, League, TeamDetail};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Dashboard,
    Scoreboard,
    Teams,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    pub leagues: LeagueStore,
    pub resources: Resources,
    subscriptions: HashMap<ResourceKey, Subscription>,
}

impl App {
    pub fn new(settings: AppSettings, updates: mpsc::UnboundedSender<ResourceKey>) -> Self {
        let api = match settings.api_base.as_deref() {
            Some(base) => EspnApi::with_base_url(base),
            None => EspnApi::new(),
        };
        info!("using ESPN API at {}", api.base_url());
        Self::with_source(settings, Arc::new(api), Some(updates))
    }

    pub fn with_source(
        settings: AppSettings,
        source: Arc<dyn SportsSource>,
        updates: Option<mpsc::UnboundedSender<ResourceKey>>,
    ) -> Self {
        let app = Self {
            leagues: LeagueStore::new(settings.league),
            resources: Resources::new(source, updates),
            state: AppState::new(),
            subscriptions: HashMap::new(),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    pub fn league(&self) -> League {
        self.leagues.get_league()
    }

    // -----------------------------------------------------------------------
    // Subscriptions: what the visible components need right now
    // -----------------------------------------------------------------------

    /// Keys the mounted components read from. Overlays are only listed while
    /// open, so a closed overlay holds no subscription.
    pub fn active_keys(&self) -> Vec<ResourceKey> {
        let league = self.league();
        let mut keys = Vec::new();
        match self.state.active_tab {
            MenuItem::Dashboard => {
                keys.push(ResourceKey::scoreboard(league));
                keys.push(ResourceKey::teams(league));
            }
            MenuItem::Scoreboard => {
                keys.push(ResourceKey::scoreboard(league));
                if let Some(game_id) = self.state.scoreboard.game_overlay.id() {
                    keys.push(ResourceKey::game_summary(league, game_id));
                }
            }
            MenuItem::Teams => {
                keys.push(ResourceKey::teams(league));
                if let Some(team_id) = self.state.teams.team_overlay.id() {
                    keys.push(ResourceKey::team_detail(league, team_id));
                }
            }
            MenuItem::Help => {}
        }
        keys
    }

    /// Subscribe to newly needed keys and release the rest. Called after
    /// every state change; unchanged keys keep their subscription.
    pub fn sync_subscriptions(&mut self) {
        let wanted = self.active_keys();
        self.subscriptions.retain(|key, _| {
            let keep = wanted.contains(key);
            if !keep {
                debug!("unsubscribing from {key}");
            }
            keep
        });
        for key in wanted {
            if self.subscriptions.contains_key(&key) {
                continue;
            }
            if let Some(subscription) = self.resources.subscribe(&key) {
                debug!("subscribing to {key}");
                self.subscriptions.insert(key, subscription);
            }
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.resources.is_fetching(&self.active_keys())
    }

    /// Retry every visible resource whose last fetch failed. Returns how
    /// many fetches were issued.
    pub fn retry(&mut self) -> usize {
        let failed: Vec<ResourceKey> = self
            .active_keys()
            .into_iter()
            .filter(|key| self.resources.is_errored(key))
            .collect();
        failed.iter().filter(|key| self.resources.refetch(key)).count()
    }

    /// Mark every visible resource stale and fetch it again.
    pub fn reload(&mut self) {
        for key in self.active_keys() {
            info!("reloading {key}");
            self.resources.invalidate(&key);
        }
    }

    // -----------------------------------------------------------------------
    // Derived page state, recomputed on every render
    // -----------------------------------------------------------------------

    pub fn scoreboard_snapshot(&self) -> Snapshot<Vec<Game>> {
        self.resources.scoreboard(self.league())
    }

    pub fn dashboard(&self) -> Presentation<DashboardSummary> {
        let league = self.league();
        views::dashboard(
            league,
            &self.resources.scoreboard(league),
            &self.resources.teams(league),
        )
    }

    pub fn scoreboard_page(&self) -> Presentation<ScoreboardPage> {
        views::scoreboard(self.league(), &self.scoreboard_snapshot())
    }

    pub fn teams_page(&self) -> Presentation<TeamsPage> {
        let league = self.league();
        views::teams(league, &self.resources.teams(league), &self.state.teams.search)
    }

    pub fn game_overlay(&self) -> OverlayState<GameSummary> {
        let game_id = self.state.scoreboard.game_overlay.id();
        overlay_state(&self.resources.game_summary(self.league(), game_id))
    }

    pub fn team_overlay(&self) -> OverlayState<TeamDetail> {
        let team_id = self.state.teams.team_overlay.id();
        overlay_state(&self.resources.team_detail(self.league(), team_id))
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        self.state.teams.searching = false;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    pub fn cycle_league(&mut self) {
        self.leagues.cycle();
        self.state.reset_pages();
    }

    // -----------------------------------------------------------------------
    // List navigation and overlays
    // -----------------------------------------------------------------------

    pub fn overlay_open(&self) -> bool {
        match self.state.active_tab {
            MenuItem::Scoreboard => self.state.scoreboard.game_overlay.is_open(),
            MenuItem::Teams => self.state.teams.team_overlay.is_open(),
            _ => false,
        }
    }

    pub fn move_down(&mut self) {
        match self.state.active_tab {
            MenuItem::Scoreboard if self.state.scoreboard.game_overlay.is_open() => {
                self.state.scoreboard.game_overlay.scroll_down();
            }
            MenuItem::Scoreboard => {
                let len = visible_len(&self.scoreboard_page(), |page| page.games.len());
                self.state.scoreboard.select_next(len);
            }
            MenuItem::Teams if self.state.teams.team_overlay.is_open() => {
                self.state.teams.team_overlay.scroll_down();
            }
            MenuItem::Teams => {
                let len = visible_len(&self.teams_page(), |page| page.teams.len());
                self.state.teams.select_next(len);
            }
            _ => {}
        }
    }

    pub fn move_up(&mut self) {
        match self.state.active_tab {
            MenuItem::Scoreboard if self.state.scoreboard.game_overlay.is_open() => {
                self.state.scoreboard.game_overlay.scroll_up();
            }
            MenuItem::Scoreboard => self.state.scoreboard.select_prev(),
            MenuItem::Teams if self.state.teams.team_overlay.is_open() => {
                self.state.teams.team_overlay.scroll_up();
            }
            MenuItem::Teams => self.state.teams.select_prev(),
            _ => {}
        }
    }

    /// Open the detail overlay for the highlighted row.
    pub fn open_selected(&mut self) {
        match self.state.active_tab {
            MenuItem::Scoreboard => {
                if let Presentation::Ready(page) = self.scoreboard_page()
                    && let Some(game_id) = self.state.scoreboard.open_selected(&page.games)
                {
                    info!("opening game {game_id}");
                }
            }
            MenuItem::Teams => {
                if let Presentation::Ready(page) = self.teams_page()
                    && let Some(team_id) = self.state.teams.open_selected(&page.teams)
                {
                    info!("opening team {team_id}");
                }
            }
            _ => {}
        }
    }

    /// Returns false when there was nothing to close.
    pub fn close_overlay(&mut self) -> bool {
        let overlay = match self.state.active_tab {
            MenuItem::Scoreboard => &mut self.state.scoreboard.game_overlay,
            MenuItem::Teams => &mut self.state.teams.team_overlay,
            _ => return false,
        };
        let was_open = overlay.is_open();
        overlay.close();
        was_open
    }
}

fn visible_len<T>(page: &Presentation<T>, len: impl Fn(&T) -> usize) -> usize {
    match page {
        Presentation::Ready(page) => len(page),
        _ => 0,
    }
}

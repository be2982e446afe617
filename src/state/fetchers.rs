use crate::state::cache::{
    FetchError, FetchFn, Policy, ResourceCache, ResourceKey, ResourceKind, Snapshot, Subscription,
};
use espn_api::client::{ApiError, ApiResult, EspnApi};
use espn_api::{Game, GameSummary, League, Team, TeamDetail};
use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use log::error;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(60 * 60);

impl ResourceKind {
    /// Freshness window and refresh cadence per resource kind.
    pub fn policy(&self) -> Policy {
        match self {
            ResourceKind::Scoreboard => Policy { stale_after: MINUTE, refetch_every: Some(MINUTE) },
            ResourceKind::Teams => Policy { stale_after: 24 * HOUR, refetch_every: None },
            ResourceKind::TeamDetail => Policy { stale_after: HOUR, refetch_every: None },
            ResourceKind::GameSummary => {
                Policy { stale_after: Duration::from_secs(30), refetch_every: None }
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Scoreboard => "scoreboard",
            ResourceKind::Teams => "teams",
            ResourceKind::TeamDetail => "team details",
            ResourceKind::GameSummary => "game summary",
        }
    }
}

impl FetchError {
    fn transport(kind: ResourceKind, err: &ApiError) -> Self {
        FetchError::Transport(format!("Failed to fetch {}: {}", kind.label(), err.summary()))
    }
}

/// The remote side of the fetchers. Implemented by [`EspnApi`]; tests
/// substitute in-memory sources.
pub trait SportsSource: Send + Sync + 'static {
    fn scoreboard(&self, league: League) -> BoxFuture<'static, ApiResult<Vec<Game>>>;
    fn teams(&self, league: League) -> BoxFuture<'static, ApiResult<Vec<Team>>>;
    fn team(&self, league: League, team_id: String) -> BoxFuture<'static, ApiResult<TeamDetail>>;
    fn game_summary(
        &self,
        league: League,
        game_id: String,
    ) -> BoxFuture<'static, ApiResult<GameSummary>>;
}

impl SportsSource for EspnApi {
    fn scoreboard(&self, league: League) -> BoxFuture<'static, ApiResult<Vec<Game>>> {
        let api = self.clone();
        async move { api.fetch_scoreboard(league).await }.boxed()
    }

    fn teams(&self, league: League) -> BoxFuture<'static, ApiResult<Vec<Team>>> {
        let api = self.clone();
        async move { api.fetch_teams(league).await }.boxed()
    }

    fn team(&self, league: League, team_id: String) -> BoxFuture<'static, ApiResult<TeamDetail>> {
        let api = self.clone();
        async move { api.fetch_team(league, &team_id).await }.boxed()
    }

    fn game_summary(
        &self,
        league: League,
        game_id: String,
    ) -> BoxFuture<'static, ApiResult<GameSummary>> {
        let api = self.clone();
        async move { api.fetch_game_summary(league, &game_id).await }.boxed()
    }
}

/// The four resource fetchers over one shared set of caches.
pub struct Resources {
    source: Arc<dyn SportsSource>,
    scoreboard: ResourceCache<Vec<Game>>,
    teams: ResourceCache<Vec<Team>>,
    team_detail: ResourceCache<TeamDetail>,
    game_summary: ResourceCache<GameSummary>,
}

impl Resources {
    pub fn new(
        source: Arc<dyn SportsSource>,
        updates: Option<mpsc::UnboundedSender<ResourceKey>>,
    ) -> Self {
        Self {
            source,
            scoreboard: ResourceCache::new(updates.clone()),
            teams: ResourceCache::new(updates.clone()),
            team_detail: ResourceCache::new(updates.clone()),
            game_summary: ResourceCache::new(updates),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors: called on every render
    // -----------------------------------------------------------------------

    pub fn scoreboard(&self, league: League) -> Snapshot<Vec<Game>> {
        let key = ResourceKey::scoreboard(league);
        self.scoreboard
            .get_or_fetch(&key, self.scoreboard_fetch(league), key.kind.policy())
    }

    pub fn teams(&self, league: League) -> Snapshot<Vec<Team>> {
        let key = ResourceKey::teams(league);
        self.teams.get_or_fetch(&key, self.teams_fetch(league), key.kind.policy())
    }

    /// Disabled until a team id is supplied.
    pub fn team_detail(&self, league: League, team_id: Option<&str>) -> Snapshot<TeamDetail> {
        let Some(team_id) = team_id else {
            return Snapshot::disabled();
        };
        let key = ResourceKey::team_detail(league, team_id);
        self.team_detail.get_or_fetch(
            &key,
            self.team_detail_fetch(league, Some(team_id.to_owned())),
            key.kind.policy(),
        )
    }

    /// Disabled until a game id is supplied.
    pub fn game_summary(&self, league: League, game_id: Option<&str>) -> Snapshot<GameSummary> {
        let Some(game_id) = game_id else {
            return Snapshot::disabled();
        };
        let key = ResourceKey::game_summary(league, game_id);
        self.game_summary.get_or_fetch(
            &key,
            self.game_summary_fetch(league, Some(game_id.to_owned())),
            key.kind.policy(),
        )
    }

    // -----------------------------------------------------------------------
    // Lifecycle: dispatch on the key's kind
    // -----------------------------------------------------------------------

    /// Subscribe to `key`. Detail keys without an id are disabled and yield
    /// no subscription.
    pub fn subscribe(&self, key: &ResourceKey) -> Option<Subscription> {
        let policy = key.kind.policy();
        let league = key.league;
        let subscription = match key.kind {
            ResourceKind::Scoreboard => {
                self.scoreboard.subscribe(key, self.scoreboard_fetch(league), policy)
            }
            ResourceKind::Teams => self.teams.subscribe(key, self.teams_fetch(league), policy),
            ResourceKind::TeamDetail => {
                let fetch = self.team_detail_fetch(league, Some(key.id.clone()?));
                self.team_detail.subscribe(key, fetch, policy)
            }
            ResourceKind::GameSummary => {
                let fetch = self.game_summary_fetch(league, Some(key.id.clone()?));
                self.game_summary.subscribe(key, fetch, policy)
            }
        };
        Some(subscription)
    }

    /// User-initiated retry: drop the current state of `key` and fetch again.
    pub fn refetch(&self, key: &ResourceKey) -> bool {
        match key.kind {
            ResourceKind::Scoreboard => self.scoreboard.refetch(key),
            ResourceKind::Teams => self.teams.refetch(key),
            ResourceKind::TeamDetail => self.team_detail.refetch(key),
            ResourceKind::GameSummary => self.game_summary.refetch(key),
        }
    }

    pub fn invalidate(&self, key: &ResourceKey) {
        match key.kind {
            ResourceKind::Scoreboard => self.scoreboard.invalidate(key),
            ResourceKind::Teams => self.teams.invalidate(key),
            ResourceKind::TeamDetail => self.team_detail.invalidate(key),
            ResourceKind::GameSummary => self.game_summary.invalidate(key),
        }
    }

    /// True when the last fetch for `key` failed.
    pub fn is_errored(&self, key: &ResourceKey) -> bool {
        let error = match key.kind {
            ResourceKind::Scoreboard => self.scoreboard.peek(key).and_then(|s| s.error),
            ResourceKind::Teams => self.teams.peek(key).and_then(|s| s.error),
            ResourceKind::TeamDetail => self.team_detail.peek(key).and_then(|s| s.error),
            ResourceKind::GameSummary => self.game_summary.peek(key).and_then(|s| s.error),
        };
        error.is_some()
    }

    /// True while any of `keys` has a fetch running.
    pub fn is_fetching(&self, keys: &[ResourceKey]) -> bool {
        keys.iter().any(|key| {
            let fetching = match key.kind {
                ResourceKind::Scoreboard => self.scoreboard.peek(key).map(|s| s.is_fetching),
                ResourceKind::Teams => self.teams.peek(key).map(|s| s.is_fetching),
                ResourceKind::TeamDetail => self.team_detail.peek(key).map(|s| s.is_fetching),
                ResourceKind::GameSummary => self.game_summary.peek(key).map(|s| s.is_fetching),
            };
            fetching.unwrap_or(false)
        })
    }

    // -----------------------------------------------------------------------
    // Fetch functions
    // -----------------------------------------------------------------------

    fn scoreboard_fetch(&self, league: League) -> FetchFn<Vec<Game>> {
        let source = Arc::clone(&self.source);
        Arc::new(move || {
            let request = source.scoreboard(league);
            async move {
                request
                    .await
                    .map_err(|e| FetchError::transport(ResourceKind::Scoreboard, &e))
            }
            .boxed()
        })
    }

    fn teams_fetch(&self, league: League) -> FetchFn<Vec<Team>> {
        let source = Arc::clone(&self.source);
        Arc::new(move || {
            let request = source.teams(league);
            async move {
                request
                    .await
                    .map_err(|e| FetchError::transport(ResourceKind::Teams, &e))
            }
            .boxed()
        })
    }

    fn team_detail_fetch(&self, league: League, team_id: Option<String>) -> FetchFn<TeamDetail> {
        let source = Arc::clone(&self.source);
        Arc::new(move || {
            let Some(team_id) = team_id.clone() else {
                return missing_identifier(ResourceKind::TeamDetail);
            };
            let request = source.team(league, team_id);
            async move {
                request
                    .await
                    .map_err(|e| FetchError::transport(ResourceKind::TeamDetail, &e))
            }
            .boxed()
        })
    }

    fn game_summary_fetch(&self, league: League, game_id: Option<String>) -> FetchFn<GameSummary> {
        let source = Arc::clone(&self.source);
        Arc::new(move || {
            let Some(game_id) = game_id.clone() else {
                return missing_identifier(ResourceKind::GameSummary);
            };
            let request = source.game_summary(league, game_id);
            async move {
                request
                    .await
                    .map_err(|e| FetchError::transport(ResourceKind::GameSummary, &e))
            }
            .boxed()
        })
    }
}

fn missing_identifier<T: Send + 'static>(
    kind: ResourceKind,
) -> BoxFuture<'static, Result<T, FetchError>> {
    error!("{} fetch invoked without an id", kind.label());
    future::ready(Err(FetchError::MissingIdentifier(kind))).boxed()
}

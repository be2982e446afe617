use crate::espn::{
    EspnCompetition, EspnCompetitor, EspnEvent, EspnStatus, EspnTeam, ScoreboardResponse,
    SummaryResponse, TeamDetailResponse, TeamsResponse,
};
use crate::{
    Competitor, Game, GameState, GameSummary, Leader, LeaderCategory, League, PlayerStatGroup,
    PlayerStatRow, Team, TeamDetail, TeamStatLine, Venue,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const ESPN_SITE_V2: &str = "https://site.api.espn.com/apis/site/v2/sports";

/// Client for ESPN's public site API, scoped per request to a league.
#[derive(Debug, Clone)]
pub struct EspnApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for EspnApi {
    fn default() -> Self {
        Self::with_base_url(ESPN_SITE_V2)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Status {
        status: u16,
        reason: String,
        url: String,
    },
    Parsing(reqwest::Error, String),
    NotFound(String),
}

impl ApiError {
    /// Short human-readable cause, suitable for an error panel.
    pub fn summary(&self) -> String {
        match self {
            ApiError::Network(e, _) => e.to_string(),
            ApiError::Status { reason, .. } => reason.clone(),
            ApiError::Parsing(e, _) => format!("unexpected response ({e})"),
            ApiError::NotFound(msg) => format!("Not found: {msg}"),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Status {
                status,
                reason,
                url,
            } => write!(f, "HTTP {status} {reason} for {url}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Parsing(e, _) => Some(e),
            _ => None,
        }
    }
}

impl EspnApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at another host serving the same path layout.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("sportsdash/0.1 (terminal scoreboard)")
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn league_url(&self, league: League) -> String {
        format!("{}/{}/{}", self.base_url, league.sport(), league.slug())
    }

    /// Today's games for a league.
    pub async fn fetch_scoreboard(&self, league: League) -> ApiResult<Vec<Game>> {
        let url = format!("{}/scoreboard", self.league_url(league));
        let raw: ScoreboardResponse = self.get(&url).await?;
        Ok(raw.events.unwrap_or_default().iter().map(map_event).collect())
    }

    /// All teams of a league, in upstream order.
    pub async fn fetch_teams(&self, league: League) -> ApiResult<Vec<Team>> {
        let url = format!("{}/teams?limit=100", self.league_url(league));
        let raw: TeamsResponse = self.get(&url).await?;
        Ok(flatten_teams(raw))
    }

    pub async fn fetch_team(&self, league: League, team_id: &str) -> ApiResult<TeamDetail> {
        let url = format!("{}/teams/{team_id}", self.league_url(league));
        let raw: TeamDetailResponse = self.get(&url).await?;
        let team = raw
            .team
            .ok_or_else(|| ApiError::NotFound(format!("team {team_id} in {league}")))?;

        Ok(TeamDetail {
            team: map_team(&team.team),
            record: team
                .record
                .and_then(|r| r.items)
                .and_then(|items| items.into_iter().find_map(|i| i.summary)),
            standing: team.standing_summary,
            venue: team
                .franchise
                .and_then(|f| f.venue)
                .and_then(|v| v.full_name),
        })
    }

    /// Fetch the full game summary (header, venue, leaders, box score).
    pub async fn fetch_game_summary(&self, league: League, game_id: &str) -> ApiResult<GameSummary> {
        let url = format!("{}/summary?event={game_id}", self.league_url(league));
        let raw: SummaryResponse = self.get(&url).await?;
        map_summary(game_id, raw)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown Status").to_owned(),
                url: url.to_owned(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Mapping: ESPN wire types → clean domain types
// ---------------------------------------------------------------------------

fn flatten_teams(raw: TeamsResponse) -> Vec<Team> {
    raw.sports
        .unwrap_or_default()
        .into_iter()
        .flat_map(|s| s.leagues.unwrap_or_default())
        .flat_map(|l| l.teams.unwrap_or_default())
        .filter_map(|item| item.team)
        .map(|t| map_team(&t))
        .collect()
}

fn map_team(t: &EspnTeam) -> Team {
    let logo = t.logo.clone().or_else(|| {
        t.logos
            .as_ref()
            .and_then(|logos| logos.iter().find_map(|l| l.href.clone()))
    });
    let display_name = t.display_name.clone().unwrap_or_default();

    Team {
        id: t.id.clone().unwrap_or_default(),
        location: t.location.clone().unwrap_or_default(),
        name: t.name.clone().unwrap_or_default(),
        abbreviation: t.abbreviation.clone().unwrap_or_default(),
        short_display_name: t
            .short_display_name
            .clone()
            .unwrap_or_else(|| display_name.clone()),
        display_name,
        color: t.color.clone().filter(|c| !c.is_empty()),
        alternate_color: t.alternate_color.clone().filter(|c| !c.is_empty()),
        is_active: t.is_active.unwrap_or(true),
        logo,
    }
}

fn map_event(event: &EspnEvent) -> Game {
    let competition = event.competitions.as_ref().and_then(|c| c.first());
    let status = event
        .status
        .as_ref()
        .or_else(|| competition.and_then(|c| c.status.as_ref()));
    let mut game = map_competition(
        event.id.clone().unwrap_or_default(),
        competition,
        status,
        event.date.as_deref(),
    );
    game.name = event.name.clone().unwrap_or_default();
    game.short_name = event.short_name.clone().unwrap_or_default();
    game
}

fn map_competition(
    id: String,
    competition: Option<&EspnCompetition>,
    status: Option<&EspnStatus>,
    date: Option<&str>,
) -> Game {
    let (home, away) = competition
        .and_then(|c| c.competitors.as_deref())
        .map(split_competitors)
        .unwrap_or_default();
    let status_type = status.and_then(|s| s.status_type.as_ref());

    Game {
        id,
        date: date
            .or_else(|| competition.and_then(|c| c.date.as_deref()))
            .and_then(parse_espn_date),
        state: status_type
            .and_then(|t| t.state.as_deref())
            .map(parse_state)
            .unwrap_or_default(),
        detail: status_type
            .and_then(|t| t.detail.clone().or_else(|| t.short_detail.clone()))
            .unwrap_or_default(),
        display_clock: status.and_then(|s| s.display_clock.clone()),
        period: status.and_then(|s| s.period),
        home,
        away,
        ..Default::default()
    }
}

/// Split ESPN's competitor list into (home, away). When `homeAway` is
/// missing, fall back to list order (ESPN lists home first).
fn split_competitors(competitors: &[EspnCompetitor]) -> (Competitor, Competitor) {
    let home = competitors
        .iter()
        .find(|c| c.home_away.as_deref() == Some("home"))
        .or_else(|| competitors.first());
    let away = competitors
        .iter()
        .find(|c| c.home_away.as_deref() == Some("away"))
        .or_else(|| competitors.get(1));
    (
        home.map(map_competitor).unwrap_or_default(),
        away.map(map_competitor).unwrap_or_default(),
    )
}

fn map_competitor(c: &EspnCompetitor) -> Competitor {
    Competitor {
        team: c.team.as_ref().map(map_team).unwrap_or_default(),
        score: c.score.as_deref().and_then(|s| s.trim().parse().ok()),
        winner: c.winner.unwrap_or(false),
        record: c.records.as_ref().and_then(|records| {
            records
                .iter()
                .find(|r| r.record_type.as_deref() == Some("total"))
                .or_else(|| records.first())
                .and_then(|r| r.summary.clone())
        }),
    }
}

fn parse_state(s: &str) -> GameState {
    match s {
        "in" => GameState::In,
        "post" => GameState::Post,
        _ => GameState::Pre,
    }
}

/// ESPN dates are RFC 3339 but frequently omit seconds ("2025-01-15T00:30Z").
fn parse_espn_date(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%MZ")
                .ok()
                .map(|n| n.and_utc())
        })
}

fn map_summary(game_id: &str, raw: SummaryResponse) -> ApiResult<GameSummary> {
    let header = raw
        .header
        .as_ref()
        .and_then(|h| h.competitions.as_ref()?.first().map(|c| (h, c)))
        .map(|(h, c)| {
            map_competition(
                h.id.clone().or_else(|| c.id.clone()).unwrap_or_default(),
                Some(c),
                c.status.as_ref(),
                None,
            )
        })
        .ok_or_else(|| ApiError::NotFound(format!("game {game_id}")))?;

    let game_info = raw.game_info.as_ref();
    let venue = game_info.and_then(|g| g.venue.as_ref()).map(|v| Venue {
        name: v.full_name.clone().unwrap_or_default(),
        city: v.address.as_ref().and_then(|a| a.city.clone()),
        state: v.address.as_ref().and_then(|a| a.state.clone()),
    });

    let leaders = raw
        .leaders
        .unwrap_or_default()
        .into_iter()
        .flat_map(|team_leaders| {
            let abbrev = team_leaders
                .team
                .as_ref()
                .and_then(|t| t.abbreviation.clone())
                .unwrap_or_default();
            team_leaders
                .leaders
                .unwrap_or_default()
                .into_iter()
                .map(move |cat| (abbrev.clone(), cat))
        })
        .fold(Vec::<LeaderCategory>::new(), |mut acc, (abbrev, cat)| {
            let name = cat.display_name.or(cat.name).unwrap_or_default();
            let leaders = cat.leaders.unwrap_or_default().into_iter().map(|item| Leader {
                athlete: item
                    .athlete
                    .and_then(|a| a.display_name)
                    .unwrap_or_default(),
                team_abbreviation: abbrev.clone(),
                display_value: item.display_value.unwrap_or_default(),
            });
            match acc.iter_mut().find(|c| c.name == name) {
                Some(existing) => existing.leaders.extend(leaders),
                None => acc.push(LeaderCategory {
                    name,
                    leaders: leaders.collect(),
                }),
            }
            acc
        });

    let boxscore = raw.boxscore.unwrap_or_default();
    let team_stats = map_team_stats(boxscore.teams.unwrap_or_default());
    let player_groups = boxscore
        .players
        .unwrap_or_default()
        .into_iter()
        .flat_map(|tp| {
            let team = tp
                .team
                .as_ref()
                .and_then(|t| t.display_name.clone())
                .unwrap_or_default();
            tp.statistics
                .unwrap_or_default()
                .into_iter()
                .map(move |cat| PlayerStatGroup {
                    team: team.clone(),
                    category: cat.name.unwrap_or_default(),
                    labels: cat.labels.unwrap_or_default(),
                    rows: cat
                        .athletes
                        .unwrap_or_default()
                        .into_iter()
                        .map(|a| PlayerStatRow {
                            athlete: a.athlete.and_then(|a| a.display_name).unwrap_or_default(),
                            stats: a.stats.unwrap_or_default(),
                        })
                        .collect(),
                })
        })
        .collect();

    Ok(GameSummary {
        game_id: game_id.to_owned(),
        header,
        venue,
        attendance: game_info.and_then(|g| g.attendance).filter(|&a| a > 0),
        leaders,
        team_stats,
        player_groups,
    })
}

/// Box score teams arrive as [away, home]; rows are paired by position.
fn map_team_stats(teams: Vec<crate::espn::EspnBoxscoreTeam>) -> Vec<TeamStatLine> {
    let mut teams = teams.into_iter();
    let (Some(away), Some(home)) = (teams.next(), teams.next()) else {
        return Vec::new();
    };
    let away_stats = away.statistics.unwrap_or_default();
    let home_stats = home.statistics.unwrap_or_default();

    away_stats
        .iter()
        .zip(home_stats.iter())
        .map(|(a, h)| TeamStatLine {
            label: a
                .label
                .clone()
                .or_else(|| a.display_name.clone())
                .or_else(|| a.name.clone())
                .unwrap_or_default(),
            away: a.display_value.clone().unwrap_or_default(),
            home: h.display_value.clone().unwrap_or_default(),
        })
        .collect()
}

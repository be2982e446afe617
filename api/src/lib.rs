pub mod client;
pub mod espn;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// League: the closed set of supported leagues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum League {
    #[default]
    Nba,
    Nfl,
}

impl League {
    /// ESPN sport path segment.
    pub fn sport(&self) -> &'static str {
        match self {
            League::Nba => "basketball",
            League::Nfl => "football",
        }
    }

    /// ESPN league path segment.
    pub fn slug(&self) -> &'static str {
        match self {
            League::Nba => "nba",
            League::Nfl => "nfl",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            League::Nba => "NBA",
            League::Nfl => "NFL",
        }
    }

    pub fn next(self) -> Self {
        match self {
            League::Nba => League::Nfl,
            League::Nfl => League::Nba,
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLeague(pub String);

impl fmt::Display for UnknownLeague {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown league {:?} (expected nba or nfl)", self.0)
    }
}

impl std::error::Error for UnknownLeague {}

impl FromStr for League {
    type Err = UnknownLeague;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nba" => Ok(League::Nba),
            "nfl" => Ok(League::Nfl),
            _ => Err(UnknownLeague(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of ESPN wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GameState {
    #[default]
    Pre,
    In,
    Post,
}

#[derive(Debug, Clone, Default)]
pub struct Game {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub date: Option<DateTime<Utc>>,
    pub state: GameState,
    /// Human status line, e.g. "Final" or "Q3 - 4:12".
    pub detail: String,
    pub display_clock: Option<String>,
    pub period: Option<u8>,
    pub home: Competitor,
    pub away: Competitor,
}

impl Game {
    pub fn is_live(&self) -> bool {
        self.state == GameState::In
    }

    pub fn is_upcoming(&self) -> bool {
        self.state == GameState::Pre
    }

    pub fn is_final(&self) -> bool {
        self.state == GameState::Post
    }
}

#[derive(Debug, Clone, Default)]
pub struct Competitor {
    pub team: Team,
    pub score: Option<u16>, // None before tip-off / kickoff
    pub winner: bool,
    pub record: Option<String>, // "31-12"
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Team {
    pub id: String,
    pub location: String,     // "Boston"
    pub name: String,         // "Celtics"
    pub abbreviation: String, // "BOS"
    pub display_name: String, // "Boston Celtics"
    pub short_display_name: String,
    pub color: Option<String>, // hex without '#'
    pub alternate_color: Option<String>,
    pub is_active: bool,
    pub logo: Option<String>,
}

/// Single-team payload from the team detail endpoint.
#[derive(Debug, Clone, Default)]
pub struct TeamDetail {
    pub team: Team,
    pub record: Option<String>,
    pub standing: Option<String>, // "1st in Atlantic Division"
    pub venue: Option<String>,
}

/// Full game payload fetched on demand for the game drawer.
#[derive(Debug, Clone, Default)]
pub struct GameSummary {
    pub game_id: String,
    pub header: Game,
    pub venue: Option<Venue>,
    pub attendance: Option<u32>,
    pub leaders: Vec<LeaderCategory>,
    pub team_stats: Vec<TeamStatLine>,
    pub player_groups: Vec<PlayerStatGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Venue {
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl Venue {
    pub fn location(&self) -> Option<String> {
        match (&self.city, &self.state) {
            (Some(city), Some(state)) => Some(format!("{city}, {state}")),
            (Some(city), None) => Some(city.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LeaderCategory {
    pub name: String, // "Points"
    pub leaders: Vec<Leader>,
}

#[derive(Debug, Clone, Default)]
pub struct Leader {
    pub athlete: String,
    pub team_abbreviation: String,
    pub display_value: String,
}

/// One row of the team comparison table: (away, home) display values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamStatLine {
    pub label: String,
    pub away: String,
    pub home: String,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerStatGroup {
    pub team: String,
    pub category: String,
    pub labels: Vec<String>,
    pub rows: Vec<PlayerStatRow>,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerStatRow {
    pub athlete: String,
    pub stats: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn league_parses_case_insensitively() {
        assert_eq!("NBA".parse::<League>(), Ok(League::Nba));
        assert_eq!(" nfl ".parse::<League>(), Ok(League::Nfl));
        assert!("mlb".parse::<League>().is_err());
    }

    #[test]
    fn league_next_cycles_through_closed_set() {
        assert_eq!(League::Nba.next(), League::Nfl);
        assert_eq!(League::Nfl.next(), League::Nba);
        assert_eq!(League::default(), League::Nba);
    }

    #[test]
    fn venue_location_joins_city_and_state() {
        let venue = Venue {
            name: "TD Garden".into(),
            city: Some("Boston".into()),
            state: Some("MA".into()),
        };
        assert_eq!(venue.location().as_deref(), Some("Boston, MA"));
        let venue = Venue { state: None, ..venue };
        assert_eq!(venue.location().as_deref(), Some("Boston"));
    }
}

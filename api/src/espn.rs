/// ESPN API raw wire types: serde shapes for deserializing ESPN responses.
/// These map to our clean domain types via the mapping functions in client.rs.
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Scoreboard  (site v2 API)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScoreboardResponse {
    pub events: Option<Vec<EspnEvent>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnEvent {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "shortName")]
    pub short_name: Option<String>,
    pub date: Option<String>, // ISO 8601, sometimes without seconds
    pub status: Option<EspnStatus>,
    pub competitions: Option<Vec<EspnCompetition>>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnStatus {
    #[serde(rename = "type")]
    pub status_type: Option<EspnStatusType>,
    pub period: Option<u8>,
    #[serde(rename = "displayClock")]
    pub display_clock: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnStatusType {
    pub state: Option<String>, // "pre" | "in" | "post"
    pub detail: Option<String>,
    #[serde(rename = "shortDetail")]
    pub short_detail: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnCompetition {
    pub id: Option<String>,
    pub date: Option<String>,
    pub status: Option<EspnStatus>,
    pub competitors: Option<Vec<EspnCompetitor>>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnCompetitor {
    pub id: Option<String>,
    #[serde(rename = "homeAway")]
    pub home_away: Option<String>, // "home" | "away"
    pub team: Option<EspnTeam>,
    pub score: Option<String>, // ESPN sends scores as strings
    pub winner: Option<bool>,
    // Scoreboard uses "records", summary header uses "record".
    #[serde(alias = "record")]
    pub records: Option<Vec<EspnRecord>>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnTeam {
    pub id: Option<String>,
    pub location: Option<String>,
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(rename = "shortDisplayName")]
    pub short_display_name: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "alternateColor")]
    pub alternate_color: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
    pub logo: Option<String>,
    pub logos: Option<Vec<EspnLogo>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnLogo {
    pub href: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnRecord {
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    pub summary: Option<String>,
}

// ---------------------------------------------------------------------------
// Team list and team detail  (site v2 API)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct TeamsResponse {
    pub sports: Option<Vec<EspnSport>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnSport {
    pub leagues: Option<Vec<EspnLeague>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnLeague {
    pub teams: Option<Vec<EspnTeamItem>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnTeamItem {
    pub team: Option<EspnTeam>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct TeamDetailResponse {
    pub team: Option<EspnTeamDetail>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnTeamDetail {
    #[serde(flatten)]
    pub team: EspnTeam,
    pub record: Option<EspnRecordItems>,
    #[serde(rename = "standingSummary")]
    pub standing_summary: Option<String>,
    pub franchise: Option<EspnFranchise>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnRecordItems {
    pub items: Option<Vec<EspnRecord>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnFranchise {
    pub venue: Option<EspnVenue>,
}

// ---------------------------------------------------------------------------
// Game summary  (site v2 API)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct SummaryResponse {
    pub header: Option<EspnHeader>,
    #[serde(rename = "gameInfo")]
    pub game_info: Option<EspnGameInfo>,
    pub leaders: Option<Vec<EspnTeamLeaders>>,
    pub boxscore: Option<EspnBoxscore>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnHeader {
    pub id: Option<String>,
    pub competitions: Option<Vec<EspnCompetition>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnGameInfo {
    pub venue: Option<EspnVenue>,
    pub attendance: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnVenue {
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
    pub address: Option<EspnAddress>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnAddress {
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnTeamLeaders {
    pub team: Option<EspnTeam>,
    pub leaders: Option<Vec<EspnLeaderCategory>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnLeaderCategory {
    pub name: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub leaders: Option<Vec<EspnLeaderItem>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnLeaderItem {
    #[serde(rename = "displayValue")]
    pub display_value: Option<String>,
    pub athlete: Option<EspnAthlete>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnBoxscore {
    pub teams: Option<Vec<EspnBoxscoreTeam>>,
    pub players: Option<Vec<EspnTeamPlayers>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnBoxscoreTeam {
    pub team: Option<EspnTeam>,
    pub statistics: Option<Vec<EspnStatistic>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnStatistic {
    pub name: Option<String>,
    pub label: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(rename = "displayValue")]
    pub display_value: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnTeamPlayers {
    pub team: Option<EspnTeam>,
    pub statistics: Option<Vec<EspnStatCategory>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnStatCategory {
    pub name: Option<String>,
    pub labels: Option<Vec<String>>,
    pub athletes: Option<Vec<EspnAthleteStats>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnAthleteStats {
    pub athlete: Option<EspnAthlete>,
    pub stats: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnAthlete {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

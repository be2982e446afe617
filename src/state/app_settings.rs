use espn_api::League;
use log::{LevelFilter, warn};

pub const LEAGUE_VAR: &str = "SPORTSDASH_LEAGUE";
pub const API_BASE_VAR: &str = "SPORTSDASH_API_BASE";
pub const LOG_VAR: &str = "SPORTSDASH_LOG";

#[derive(Debug, Default, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    /// League selected at startup.
    pub league: League,
    /// Alternative host for the ESPN site API.
    pub api_base: Option<String>,
}

impl AppSettings {
    /// Settings come from the environment only; nothing is persisted.
    pub fn load() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let league = value(LEAGUE_VAR)
            .and_then(|raw| {
                raw.parse::<League>()
                    .map_err(|e| warn!("ignoring {LEAGUE_VAR}: {e}"))
                    .ok()
            })
            .unwrap_or_default();

        let log_level = value(LOG_VAR).and_then(|raw| {
            raw.trim()
                .parse::<LevelFilter>()
                .map_err(|_| warn!("ignoring {LOG_VAR}: unknown level {raw:?}"))
                .ok()
        });

        Self {
            full_screen: false,
            log_level,
            league,
            api_base: value(API_BASE_VAR),
        }
    }
}

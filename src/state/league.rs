use espn_api::League;
use log::info;

/// Process-wide league selection. Owned by the app and passed by reference
/// to everything that builds request keys.
#[derive(Debug, Default, Clone)]
pub struct LeagueStore {
    league: League,
}

impl LeagueStore {
    pub fn new(league: League) -> Self {
        Self { league }
    }

    pub fn get_league(&self) -> League {
        self.league
    }

    /// Switching never evicts cache entries: the other league simply uses a
    /// disjoint set of keys.
    pub fn set_league(&mut self, league: League) {
        if self.league != league {
            info!("league switched {} -> {}", self.league, league);
        }
        self.league = league;
    }

    pub fn cycle(&mut self) -> League {
        self.set_league(self.league.next());
        self.league
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_nba() {
        assert_eq!(LeagueStore::default().get_league(), League::Nba);
    }

    #[test]
    fn set_and_cycle() {
        let mut store = LeagueStore::new(League::Nfl);
        assert_eq!(store.cycle(), League::Nba);
        store.set_league(League::Nfl);
        assert_eq!(store.get_league(), League::Nfl);
    }
}

// Sleeper API endpoints with their cache keys and lifetimes.
use chrono::Duration;

pub const BASE_URL: &str = "https://api.sleeper.app/v1";

pub const TRENDING_LOOKBACK_HOURS: u32 = 24;
pub const TRENDING_LIMIT: u32 = 25;
const SEASON_TYPE: &str = "regular";

#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub path: String,
    pub cache_key: String,
    pub ttl: Duration,
}

impl Endpoint {
    fn new(path: String, cache_key: String, ttl: Duration) -> Self {
        Endpoint { path, cache_key, ttl }
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url, self.path)
    }
}

pub fn league(league_id: &str) -> Endpoint {
    Endpoint::new(
        format!("/league/{}", league_id),
        format!("league_{}", league_id),
        Duration::hours(24),
    )
}

pub fn rosters(league_id: &str) -> Endpoint {
    Endpoint::new(
        format!("/league/{}/rosters", league_id),
        format!("rosters_{}", league_id),
        Duration::hours(1),
    )
}

pub fn users(league_id: &str) -> Endpoint {
    Endpoint::new(
        format!("/league/{}/users", league_id),
        format!("users_{}", league_id),
        Duration::hours(24),
    )
}

pub fn all_players() -> Endpoint {
    Endpoint::new("/players/nfl".to_string(), "all_players".to_string(), Duration::hours(168))
}

pub fn trending_adds(lookback_hours: u32, limit: u32) -> Endpoint {
    Endpoint::new(
        format!("/players/nfl/trending/add?lookback_hours={}&limit={}", lookback_hours, limit),
        format!("trending_nfl_add_{}_{}", lookback_hours, limit),
        Duration::hours(1),
    )
}

pub fn stats(season: u16, week: u32) -> Endpoint {
    Endpoint::new(
        format!("/stats/nfl/{}/{}/{}", SEASON_TYPE, season, week),
        format!("stats_{}_{}_{}", season, SEASON_TYPE, week),
        Duration::hours(6),
    )
}

pub fn projections(season: u16, week: u32) -> Endpoint {
    Endpoint::new(
        format!("/projections/nfl/{}/{}/{}", SEASON_TYPE, season, week),
        format!("projections_{}_{}_{}", season, SEASON_TYPE, week),
        Duration::hours(6),
    )
}

pub fn transactions(league_id: &str, week: u32) -> Endpoint {
    Endpoint::new(
        format!("/league/{}/transactions/{}", league_id, week),
        format!("transactions_{}_{}", league_id, week),
        Duration::hours(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        assert_eq!(league("784").url(BASE_URL), "https://api.sleeper.app/v1/league/784");
        assert_eq!(stats(2024, 6).path, "/stats/nfl/regular/2024/6");
        assert_eq!(projections(2024, 7).cache_key, "projections_2024_regular_7");
        assert_eq!(
            trending_adds(TRENDING_LOOKBACK_HOURS, TRENDING_LIMIT).path,
            "/players/nfl/trending/add?lookback_hours=24&limit=25"
        );
    }

    #[test]
    fn test_ttls() {
        assert_eq!(all_players().ttl, Duration::hours(168));
        assert_eq!(rosters("1").ttl, Duration::hours(1));
        assert_eq!(users("1").ttl, Duration::hours(24));
        assert_eq!(transactions("1", 3).ttl, Duration::hours(1));
    }
}

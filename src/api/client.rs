use crate::analysis::scoring::StatSnapshot;
use crate::cache::ResponseCache;
use crate::error::AppError;
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::endpoints::{self, Endpoint};
use super::models::*;

const REQUESTS_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(100) {
    Some(n) => n,
    None => panic!("request quota must be non-zero"),
};
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("waiver_wire/", env!("CARGO_PKG_VERSION"));

pub struct SleeperClient {
    agent: ureq::Agent,
    base_url: String,
    cache: ResponseCache,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl SleeperClient {
    pub fn new(cache: ResponseCache) -> Self {
        Self::with_base_url(endpoints::BASE_URL, cache)
    }

    pub fn with_base_url(base_url: &str, cache: ResponseCache) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build();

        SleeperClient {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
            rate_limiter: RateLimiter::direct(Quota::per_minute(REQUESTS_PER_MINUTE)),
        }
    }

    pub fn clear_cache(&self) -> Result<usize, AppError> {
        self.cache.clear()
    }

    fn wait_for_quota(&self) {
        let clock = DefaultClock::default();
        while let Err(not_until) = self.rate_limiter.check() {
            let wait = not_until.wait_time_from(clock.now());
            debug!("Request quota exhausted, waiting {:?}", wait);
            thread::sleep(wait);
        }
    }

    fn execute_request(&self, url: &str) -> Result<serde_json::Value, AppError> {
        self.wait_for_quota();

        let body = match self.agent.get(url).call() {
            Ok(resp) => resp.into_string().map_err(|e| AppError::HttpError(e.to_string()))?,
            Err(ureq::Error::Status(429, _)) => return Err(AppError::RateLimited),
            Err(ureq::Error::Status(404, _)) => return Err(AppError::NotFound(url.to_string())),
            Err(ureq::Error::Status(code, _)) => {
                return Err(AppError::ApiError(format!("{} returned status {}", url, code)))
            }
            Err(e) => return Err(AppError::HttpError(e.to_string())),
        };

        serde_json::from_str(&body).map_err(|e| AppError::JsonError(format!("{}: {}", url, e)))
    }

    /// Serve from cache when fresh, otherwise hit the API and store the raw
    /// response. Sleeper answers unknown ids with a literal `null`.
    fn fetch<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T, AppError> {
        let data = match self.cache.get(&endpoint.cache_key, endpoint.ttl) {
            Some(data) => {
                debug!("Using cached data for {}", endpoint.cache_key);
                data
            }
            None => {
                let url = endpoint.url(&self.base_url);
                debug!("Fetching {}", url);
                let data = self.execute_request(&url)?;
                if data.is_null() {
                    return Err(AppError::NotFound(url));
                }
                if let Err(e) = self.cache.put(&endpoint.cache_key, &data) {
                    warn!("Could not cache {}: {}", endpoint.cache_key, e);
                }
                data
            }
        };

        serde_json::from_value(data)
            .map_err(|e| AppError::JsonError(format!("{}: {}", endpoint.cache_key, e)))
    }

    pub fn get_league(&self, league_id: &str) -> Result<League, AppError> {
        self.fetch(&endpoints::league(league_id)).map_err(|e| match e {
            AppError::NotFound(_) => AppError::LeagueNotFound(league_id.to_string()),
            other => other,
        })
    }

    pub fn get_rosters(&self, league_id: &str) -> Result<Vec<Roster>, AppError> {
        self.fetch(&endpoints::rosters(league_id))
    }

    pub fn get_users(&self, league_id: &str) -> Result<Vec<LeagueUser>, AppError> {
        self.fetch(&endpoints::users(league_id))
    }

    pub fn get_all_players(&self) -> Result<PlayerDirectory, AppError> {
        self.fetch(&endpoints::all_players())
    }

    pub fn get_trending_players(&self) -> Result<Vec<TrendingPlayer>, AppError> {
        self.fetch(&endpoints::trending_adds(
            endpoints::TRENDING_LOOKBACK_HOURS,
            endpoints::TRENDING_LIMIT,
        ))
    }

    pub fn get_stats(&self, season: u16, week: u32) -> Result<StatSnapshot, AppError> {
        self.fetch(&endpoints::stats(season, week))
    }

    pub fn get_projections(&self, season: u16, week: u32) -> Result<StatSnapshot, AppError> {
        self.fetch(&endpoints::projections(season, week))
    }

    pub fn get_transactions(&self, league_id: &str, week: u32) -> Result<Vec<Transaction>, AppError> {
        self.fetch(&endpoints::transactions(league_id, week))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    // Unroutable base URL: any request that escapes the cache fails fast.
    const OFFLINE: &str = "http://127.0.0.1:1";

    fn offline_client(dir: &TempDir) -> SleeperClient {
        SleeperClient::with_base_url(OFFLINE, ResponseCache::open(dir.path()).unwrap())
    }

    #[test]
    fn test_cached_league_is_served_without_network() {
        let dir = TempDir::new().unwrap();
        let cache = ResponseCache::open(dir.path()).unwrap();
        cache
            .put(
                &endpoints::league("42").cache_key,
                &json!({"league_id": "42", "name": "Bench Mob", "scoring_settings": {"pts_rec": 1}}),
            )
            .unwrap();

        let client = SleeperClient::with_base_url(OFFLINE, cache);
        let league = client.get_league("42").unwrap();

        assert_eq!(league.name, "Bench Mob");
        assert_eq!(league.scoring_settings.points_per_reception(), 1.0);
    }

    #[test]
    fn test_cached_stats_snapshot_parses() {
        let dir = TempDir::new().unwrap();
        let client = offline_client(&dir);
        client
            .cache
            .put(
                &endpoints::stats(2024, 3).cache_key,
                &json!({"4046": {"pass_yd": 291.0, "pass_td": 2}, "DAL": {"def_int": 1}}),
            )
            .unwrap();

        let stats = client.get_stats(2024, 3).unwrap();
        assert_eq!(stats["4046"].get("pass_yd"), Some(291.0));
        assert_eq!(stats.len(), 2);
    }

    #[test]
    fn test_cached_payload_with_wrong_shape_is_json_error() {
        let dir = TempDir::new().unwrap();
        let client = offline_client(&dir);
        client
            .cache
            .put(&endpoints::rosters("9").cache_key, &json!({"not": "a list"}))
            .unwrap();

        assert!(matches!(client.get_rosters("9"), Err(AppError::JsonError(_))));
    }

    #[test]
    fn test_clear_cache_forgets_entries() {
        let dir = TempDir::new().unwrap();
        let client = offline_client(&dir);
        client.cache.put("users_9", &json!([])).unwrap();

        assert_eq!(client.clear_cache().unwrap(), 1);
    }
}

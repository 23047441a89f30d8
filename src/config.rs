use crate::error::AppError;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_SEASON: u16 = 2024;
pub const DEFAULT_WEEK: u32 = 1;
pub const DEFAULT_PRESETS_PATH: &str = "config/scoring_settings.json";
pub const DEFAULT_OVERRIDE_PATH: &str = ".env.scoring.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub league_id: Option<String>,
    pub season: u16,
    pub current_week: u32,
    pub cache_dir: PathBuf,
    pub presets_path: PathBuf,
    pub scoring_override_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let league_id = lookup("LEAGUE_ID").filter(|id| !id.trim().is_empty());

        let season = match lookup("SEASON") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                AppError::ConfigError(format!("SEASON must be a year, got '{}'", raw))
            })?,
            None => DEFAULT_SEASON,
        };

        let current_week = match lookup("CURRENT_WEEK") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| {
                AppError::ConfigError(format!("CURRENT_WEEK must be a week number, got '{}'", raw))
            })?,
            None => DEFAULT_WEEK,
        };

        let cache_dir = lookup("WAIVER_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_cache_dir);

        let presets_path = lookup("SCORING_PRESETS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PRESETS_PATH));

        let scoring_override_path = lookup("SCORING_OVERRIDE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OVERRIDE_PATH));

        Ok(Config {
            league_id,
            season,
            current_week,
            cache_dir,
            presets_path,
            scoring_override_path,
        })
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".waiver_wire")
        .join("cache")
}

use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheEntry {
    pub cached_at: DateTime<Utc>,
    pub data: serde_json::Value,
}

impl CacheEntry {
    pub fn is_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.cached_at) < max_age
    }
}

/// On-disk JSON cache of API responses, one file per key.
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            AppError::CacheError(format!("Failed to create cache dir {:?}: {}", dir, e))
        })?;
        Ok(ResponseCache { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }

    /// Cached data for `key` if it is younger than `max_age`. Unreadable or
    /// corrupt entries count as misses.
    pub fn get(&self, key: &str, max_age: Duration) -> Option<serde_json::Value> {
        let content = fs::read_to_string(self.entry_path(key)).ok()?;
        let entry: CacheEntry = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Ignoring corrupt cache entry {}: {}", key, e);
                return None;
            }
        };

        if entry.is_fresh(max_age, Utc::now()) {
            Some(entry.data)
        } else {
            debug!("Cache entry {} is stale", key);
            None
        }
    }

    pub fn put(&self, key: &str, data: &serde_json::Value) -> Result<(), AppError> {
        let entry = CacheEntry {
            cached_at: Utc::now(),
            data: data.clone(),
        };
        let json = serde_json::to_string(&entry).map_err(|e| {
            AppError::JsonError(format!("Failed to serialize cache entry: {}", e))
        })?;

        let path = self.entry_path(key);
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, json)
            .and_then(|_| fs::rename(&temp_path, &path))
            .map_err(|e| AppError::CacheError(format!("Failed to write cache entry {:?}: {}", path, e)))?;

        Ok(())
    }

    pub fn clear(&self) -> Result<usize, AppError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            AppError::CacheError(format!("Failed to read cache dir {:?}: {}", self.dir, e))
        })?;

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json" || ext == "tmp") {
                fs::remove_file(&path).map_err(|e| {
                    AppError::CacheError(format!("Failed to remove {:?}: {}", path, e))
                })?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}

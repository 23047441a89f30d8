use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("League not found: {0}")]
    LeagueNotFound(String),

    #[error("User '{0}' not found in league")]
    UserNotFound(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Unknown scoring preset '{name}' (available: {available})")]
    UnknownPreset { name: String, available: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("Cache error: {0}")]
    CacheError(String),
}

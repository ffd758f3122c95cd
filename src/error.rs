use thiserror::Error;

/// Rejected analyzer configuration. Raised only at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("buffer percentage must be within [0, 1), got {0}")]
    BufferOutOfRange(f64),

    #[error("risk weights must sum to 1.0, got {0:.4}")]
    WeightsDoNotSumToOne(f64),

    #[error("risk weight '{name}' must be a finite value in [0, 1], got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("threshold '{name}' is out of range: {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("CD target percentage must be within [0, 1], got {0}")]
    CdTargetOutOfRange(f64),
}

#[derive(Debug, Error)]
pub enum StrategistError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DB error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T, E = StrategistError> = std::result::Result<T, E>;

pub mod analysis;
pub mod commands;
pub mod error;
pub mod models;

pub use error::{ConfigError, Result, StrategistError};

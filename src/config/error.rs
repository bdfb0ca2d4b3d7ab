//! Load-time configuration errors.

use std::path::PathBuf;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Reason a single weapon definition was rejected.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigViolation {
    #[error("{weapon}: {field} must be positive (got {value})")]
    NotPositive {
        weapon: String,
        field: &'static str,
        value: f64,
    },

    #[error("{weapon}: {field} must be within {min}..={max} (got {value})")]
    OutOfRange {
        weapon: String,
        field: &'static str,
        min: u32,
        max: u32,
        value: u32,
    },

    #[error("{weapon}: shoot trigger binds no hand")]
    MissingTrigger { weapon: String },

    #[error("{weapon}: selective fire needs a burst or full-automatic mode")]
    SelectiveFireWithoutModes { weapon: String },

    #[error("{weapon}: full-automatic fire cannot poll non-continuous trigger {trigger} in {slot}")]
    NonContinuousFullAuto {
        weapon: String,
        slot: &'static str,
        trigger: String,
    },

    #[error("{weapon}: ammo section lists no ammo types")]
    NoAmmoTypes { weapon: String },
}

/// Failure to load a weapon registry.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported weapon file extension: {0}")]
    UnsupportedFormat(String),

    #[error("Weapon {weapon} rejected with {} violation(s)", .violations.len())]
    Invalid {
        weapon: String,
        violations: NonEmptyVec<ConfigViolation>,
    },
}

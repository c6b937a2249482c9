//! Error types for the scoring engine

use thiserror::Error;

/// A provider record that cannot be turned into canonical statistics
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("Stat line for '{name}' has no player id")]
    MissingPlayerId { name: String },

    #[error("Stat line for player {player_id} has no game key")]
    MissingGameKey { player_id: String },

    #[error("Stat line for player {player_id} has a non-finite value in {field}")]
    NonFiniteValue { player_id: String, field: &'static str },

    #[error("Stat line for player {player_id} overflows {field}")]
    Overflow { player_id: String, field: &'static str },
}

/// Errors from the statistics provider collaborator
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider request failed with status {status} for {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("Statistics for season {season} week {week} are not available")]
    WeekNotAvailable { season: u16, week: u8 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

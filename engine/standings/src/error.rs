use scoring_engine::{GameId, NormalizationError, PlayerId};
use thiserror::Error;

/// Statistics for one (player, game) could not be produced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsLookupError {
    #[error("Statistics for {player_id}@{game_id} are malformed: {source}")]
    Malformed {
        player_id: PlayerId,
        game_id: GameId,
        #[source]
        source: NormalizationError,
    },

    #[error("Statistics for {player_id}@{game_id} are unavailable: {reason}")]
    Unavailable { player_id: PlayerId, game_id: GameId, reason: String },

    #[error("Pick set {actual} cannot be scored as {expected}")]
    KeyMismatch { expected: String, actual: String },
}

/// Errors from folding weekly scores into standings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StandingsError {
    #[error("Weekly score {score} does not belong to standing {standing}")]
    MismatchedScore { score: String, standing: String },
}

pub type Result<T> = std::result::Result<T, StandingsError>;

//! Pick rejection reasons

use crate::ids::Position;
use chrono::{DateTime, Utc};
use scoring_engine::PlayerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a proposed pick set was refused.
///
/// Returned to the caller for display. A rejection names the first rule the
/// proposal broke; picks are never dropped or corrected silently.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionReason {
    #[error("Week is locked: picks closed at {lock_at}")]
    WeekLocked { lock_at: DateTime<Utc> },

    #[error("Picks for this week are already locked")]
    PicksAlreadyLocked,

    #[error("Invalid number of {position} picks: expected {expected}, got {actual}")]
    InvalidSlotCount { position: Position, expected: usize, actual: usize },

    #[error("Player {player_id} selected more than once")]
    DuplicatePlayer { player_id: PlayerId },

    #[error("Unknown player: {player_id}")]
    UnknownPlayer { player_id: PlayerId },

    #[error("Player {player_id} is not eligible at {position}")]
    IneligiblePosition { player_id: PlayerId, position: Position },

    #[error("Player {player_id} has no game scheduled this week")]
    PlayerNotScheduled { player_id: PlayerId },

    #[error("Player {player_id} was already used at {position} this season")]
    PlayerAlreadyUsed { player_id: PlayerId, position: Position },

    #[error("Too many players from {team}: limit {limit}, got {actual}")]
    TeamLimitExceeded { team: String, limit: usize, actual: usize },
}

/// Result type for pick validation
pub type Result<T> = std::result::Result<T, RejectionReason>;

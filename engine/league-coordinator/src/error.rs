//! Error types for the league coordinator

use persistence::PersistenceError;
use pick_ledger::RejectionReason;
use standings::StandingsError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("Picks rejected: {0}")]
    Rejected(#[from] RejectionReason),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Standings error: {0}")]
    Standings(#[from] StandingsError),

    #[error("Pick set {key} is not locked")]
    NotLocked { key: String },

    #[error("Backfill {run_id} for {week} is already running")]
    BackfillAlreadyRunning { week: String, run_id: Uuid },

    #[error("Backfill {run_id} for {week} failed: {reason}")]
    SystemicBackfillFailure { week: String, run_id: Uuid, reason: String },
}

impl CoordinatorError {
    /// The rejection, when this is a user-facing validation failure
    pub fn rejection(&self) -> Option<&RejectionReason> {
        match self {
            Self::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoordinatorError>;

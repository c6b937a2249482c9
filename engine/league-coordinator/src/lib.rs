//! League Coordinator
//!
//! The stateful edge of the pick'em core. Everything here runs against a
//! [`persistence::PickemStore`] and serializes per (league, season, week)
//! through a shared [`pick_ledger::WeekLockRegistry`]:
//!
//! - **lock**: pick submission, scheduled and admin lock transitions, undo
//! - **backfill**: rescoring a week after statistics corrections

pub mod backfill;
pub mod config;
pub mod error;
pub mod lock;


pub use backfill::{BackfillCoordinator, BackfillState, BackfillStatus, MemberOutcome, MemberReport};
pub use config::{BackfillConfig, LeagueConfig};
pub use error::{CoordinatorError, Result};
pub use lock::{LockCoordinator, LockSummary};

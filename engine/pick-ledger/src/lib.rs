//! Pick Ledger - weekly QB/RB/WR picks and the rules that govern them
//!
//! This crate owns the pick side of the game: who picked whom, whether a
//! pick is still editable, which players a member has already burned this
//! season, and whether a proposed pick set is legal.

pub mod error;
pub mod ids;
pub mod pick;
pub mod rules;
pub mod schedule;
pub mod usage;
pub mod validator;
pub mod week_lock;

pub use error::{RejectionReason, Result};
pub use ids::{LeagueId, MemberId, MemberWeekKey, Position, WeekKey};
pub use pick::{Pick, PickSet, ProposedPick, ProposedPicks, ValidatedPicks};
pub use rules::LeagueRules;
pub use schedule::{Game, InMemorySchedule, PlayerInfo, ScheduleProvider, WeekDeadline};
pub use usage::{UsageKey, UsageLookup, UsageRecord, UsageTracker};
pub use validator::PickValidator;
pub use week_lock::{WeekGuard, WeekLockRegistry};

/// Re-export commonly used types
pub use scoring_engine::{GameId, PlayerId, Season, Week};

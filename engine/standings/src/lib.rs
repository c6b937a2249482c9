//! Standings
//!
//! Derived artifacts of the pick'em pipeline:
//!
//! - **weekly**: locked picks + statistics -> [`WeeklyScore`]
//! - **season**: weekly scores -> [`SeasonStanding`]
//! - **table**: standings -> ranked league table
//!
//! Everything here is a pure function of its inputs. Stored scores and
//! standings are caches that can be rebuilt at any time.

pub mod error;
pub mod lookup;
pub mod season;
pub mod table;
pub mod weekly;

pub use error::{StandingsError, StatsLookupError};
pub use lookup::{StatsLookup, WeekStatsTable};
pub use season::{SeasonStanding, SeasonStandingsAggregator};
pub use table::{rank_standings, RankedStanding};
pub use weekly::{DoublePickAdjustment, DoublePickPolicy, SlotScore, WeeklyScore, WeeklyScoreAggregator};

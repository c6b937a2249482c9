//! Scoring Engine
//!
//! Turns raw per-player, per-game NFL statistics into fantasy points.
//!
//! ## Architecture
//!
//! - **normalizer**: adapts provider records into [`PlayerGameStatistics`]
//! - **scoring**: the fixed PPR formula, evaluated in fixed-point decimal
//! - **provider**: the statistics provider collaborator (SportsDataIO, in-memory)
//!
//! The scoring formula only ever sees [`PlayerGameStatistics`], so upstream
//! schema drift is absorbed by the normalizer.

pub mod config;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod points;
pub mod provider;
pub mod scoring;

pub use config::ProviderConfig;
pub use error::{NormalizationError, ProviderError};
pub use models::{GameId, PlayerGameStatistics, PlayerId, Season, StatKey, Week};
pub use normalizer::{SportsDataIoNormalizer, SportsDataIoStatLine, StatsNormalizer};
pub use points::FantasyPoints;
pub use provider::{InMemoryStatsProvider, SportsDataIoProvider, StatsProvider};
pub use scoring::{ScoreBreakdown, ScoringEngine};

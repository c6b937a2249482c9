use serde::{Deserialize, Serialize};
use std::fmt;

/// NFL season year (e.g. 2025)
pub type Season = u16;

/// Week number within a season, starting at 1
pub type Week = u8;

/// Provider-assigned player identifier (SportsDataIO `PlayerID`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

/// Provider-assigned game identifier (SportsDataIO `GameKey`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of one canonical statistics record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StatKey {
    pub player_id: PlayerId,
    pub game_id: GameId,
}

impl StatKey {
    pub fn new(player_id: PlayerId, game_id: GameId) -> Self {
        Self { player_id, game_id }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.player_id, self.game_id)
    }
}

/// Canonical per-player, per-game statistics.
///
/// Counts are never negative; yardage may be (a sack-heavy rushing line).
/// Missing provider values are zero by the time a record reaches this type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerGameStatistics {
    pub passing_yards: i32,
    pub passing_touchdowns: u32,
    pub interceptions: u32,

    pub rushing_yards: i32,
    pub rushing_touchdowns: u32,

    pub receiving_yards: i32,
    pub receiving_touchdowns: u32,
    pub receptions: u32,

    pub fumbles_lost: u32,
    pub two_point_conversions: u32,
    pub offensive_fumble_recovery_touchdowns: u32,
}

impl PlayerGameStatistics {
    /// Statistics for a player with no recorded activity
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

use crate::ids::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-league configuration of the pick rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueRules {
    /// Maximum selected players from one real-world team, `None` for no limit
    pub max_players_per_team: Option<usize>,

    /// Whether a player used at one position may be picked at another
    pub allow_cross_position_reuse: bool,

    /// Positions where a member may pick two players instead of one
    pub double_pick_positions: BTreeSet<Position>,
}

impl Default for LeagueRules {
    fn default() -> Self {
        Self {
            max_players_per_team: None,
            allow_cross_position_reuse: true,
            double_pick_positions: BTreeSet::new(),
        }
    }
}

impl LeagueRules {
    pub fn allows_double_pick(&self, position: Position) -> bool {
        self.double_pick_positions.contains(&position)
    }

    /// Largest number of picks accepted at a position
    pub fn max_picks_at(&self, position: Position) -> usize {
        if self.allows_double_pick(position) {
            2
        } else {
            1
        }
    }
}

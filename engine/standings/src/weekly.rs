//! Weekly score aggregation

use crate::error::StatsLookupError;
use crate::lookup::StatsLookup;
use pick_ledger::{MemberWeekKey, PickSet, Position};
use scoring_engine::{FantasyPoints, GameId, PlayerId, ScoringEngine};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Combines the two picks at a double-pick position into one slot value
pub trait DoublePickAdjustment: Send + Sync {
    fn adjust(&self, position: Position, pair: [FantasyPoints; 2]) -> FantasyPoints;
}

/// Built-in double-pick adjustments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoublePickPolicy {
    /// Both picks count in full
    #[default]
    NoAdjustment,
    /// Only the better pick counts
    BestOfPair,
}

impl DoublePickAdjustment for DoublePickPolicy {
    fn adjust(&self, _position: Position, pair: [FantasyPoints; 2]) -> FantasyPoints {
        match self {
            DoublePickPolicy::NoAdjustment => pair[0] + pair[1],
            DoublePickPolicy::BestOfPair => pair[0].max(pair[1]),
        }
    }
}

/// Score of one pick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotScore {
    pub position: Position,
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub locked: bool,
    /// Unadjusted points; zero for an unlocked pick
    pub points: FantasyPoints,
}

/// A member's score for one week, derived from locked picks and statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyScore {
    pub key: MemberWeekKey,
    pub slots: Vec<SlotScore>,
    /// Per-position value after any double-pick adjustment
    pub position_points: BTreeMap<Position, FantasyPoints>,
    pub total_points: FantasyPoints,
    pub double_pick_positions: BTreeSet<Position>,
    /// Set once a payout has been made from this score
    #[serde(default)]
    pub payout_recorded: bool,
}

impl WeeklyScore {
    /// Whether two scores carry the same derived values, ignoring payout state
    pub fn same_result(&self, other: &WeeklyScore) -> bool {
        self.key == other.key
            && self.slots == other.slots
            && self.position_points == other.position_points
            && self.total_points == other.total_points
            && self.double_pick_positions == other.double_pick_positions
    }
}

/// Produces [`WeeklyScore`]s from locked picks
#[derive(Clone)]
pub struct WeeklyScoreAggregator {
    engine: ScoringEngine,
    adjustment: Arc<dyn DoublePickAdjustment>,
}

impl Default for WeeklyScoreAggregator {
    fn default() -> Self {
        Self::new(Arc::new(DoublePickPolicy::default()))
    }
}

impl WeeklyScoreAggregator {
    pub fn new(adjustment: Arc<dyn DoublePickAdjustment>) -> Self {
        Self { engine: ScoringEngine::new(), adjustment }
    }

    pub fn with_policy(policy: DoublePickPolicy) -> Self {
        Self::new(Arc::new(policy))
    }

    /// Score a member's week.
    ///
    /// Unlocked picks score zero. Missing statistics score zero. A lookup
    /// error for any locked pick fails the whole member.
    pub fn compute_weekly_score(
        &self,
        key: &MemberWeekKey,
        picks: &PickSet,
        stats: &dyn StatsLookup,
    ) -> Result<WeeklyScore, StatsLookupError> {
        if picks.key != *key {
            return Err(StatsLookupError::KeyMismatch {
                expected: key.to_string(),
                actual: picks.key.to_string(),
            });
        }

        let mut slots = Vec::with_capacity(picks.picks().len());
        for pick in picks.picks() {
            let points = if pick.is_locked() {
                let line = stats.stats_for(pick.player_id(), pick.game_id())?.unwrap_or_default();
                self.engine.score(&line)
            } else {
                FantasyPoints::zero()
            };
            slots.push(SlotScore {
                position: pick.position(),
                player_id: pick.player_id().clone(),
                game_id: pick.game_id().clone(),
                locked: pick.is_locked(),
                points,
            });
        }

        let mut position_points = BTreeMap::new();
        let mut double_pick_positions = BTreeSet::new();
        for position in Position::ALL {
            let values: Vec<FantasyPoints> =
                slots.iter().filter(|s| s.position == position).map(|s| s.points).collect();
            let value = match values.as_slice() {
                [] => FantasyPoints::zero(),
                [single] => *single,
                [first, second] => {
                    double_pick_positions.insert(position);
                    self.adjustment.adjust(position, [*first, *second])
                }
                // shape validation never lets more than two through
                more => more.iter().sum(),
            };
            position_points.insert(position, value);
        }

        let total_points = position_points.values().sum();

        Ok(WeeklyScore {
            key: key.clone(),
            slots,
            position_points,
            total_points,
            double_pick_positions,
            payout_recorded: false,
        })
    }
}

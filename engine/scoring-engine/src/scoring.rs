use crate::models::PlayerGameStatistics;
use crate::points::FantasyPoints;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const PASSING_TD_POINTS: i64 = 4;
const RUSHING_TD_POINTS: i64 = 6;
const RECEIVING_TD_POINTS: i64 = 6;
const RECEPTION_POINTS: i64 = 1;
const INTERCEPTION_POINTS: i64 = -1;
const FUMBLE_LOST_POINTS: i64 = -1;
const TWO_POINT_CONVERSION_POINTS: i64 = 2;
const FUMBLE_RECOVERY_TD_POINTS: i64 = 6;

const PASSING_YARDS_BONUS_THRESHOLD: i32 = 300;
const RUSHING_YARDS_BONUS_THRESHOLD: i32 = 100;
const RECEIVING_YARDS_BONUS_THRESHOLD: i32 = 100;
const YARDAGE_BONUS_POINTS: i64 = 3;

/// 0.04 points per passing yard
fn passing_yard_rate() -> Decimal {
    Decimal::new(4, 2)
}

/// 0.1 points per rushing or receiving yard
fn ground_yard_rate() -> Decimal {
    Decimal::new(1, 1)
}

/// Per-component contribution to a score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Passing yards and touchdowns
    pub passing: FantasyPoints,
    /// Rushing yards and touchdowns
    pub rushing: FantasyPoints,
    /// Receiving yards and touchdowns
    pub receiving: FantasyPoints,
    pub receptions: FantasyPoints,
    /// 300-yard passing, 100-yard rushing and receiving bonuses
    pub bonuses: FantasyPoints,
    /// Interceptions and lost fumbles (never positive)
    pub turnovers: FantasyPoints,
    /// Two-point conversions and offensive fumble recovery touchdowns
    pub misc: FantasyPoints,
}

impl ScoreBreakdown {
    pub fn total(&self) -> FantasyPoints {
        [
            self.passing,
            self.rushing,
            self.receiving,
            self.receptions,
            self.bonuses,
            self.turnovers,
            self.misc,
        ]
        .iter()
        .sum()
    }
}

/// Fixed full-PPR scoring formula.
///
/// Pure and total: every [`PlayerGameStatistics`] maps to exactly one
/// score and nothing is read from the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Fantasy points for one player-game, rounded half up to cents
    pub fn score(&self, stats: &PlayerGameStatistics) -> FantasyPoints {
        self.breakdown(stats).total()
    }

    /// Score split by component
    pub fn breakdown(&self, stats: &PlayerGameStatistics) -> ScoreBreakdown {
        let passing = Decimal::from(stats.passing_yards) * passing_yard_rate()
            + Decimal::from(stats.passing_touchdowns) * Decimal::from(PASSING_TD_POINTS);

        let rushing = Decimal::from(stats.rushing_yards) * ground_yard_rate()
            + Decimal::from(stats.rushing_touchdowns) * Decimal::from(RUSHING_TD_POINTS);

        let receiving = Decimal::from(stats.receiving_yards) * ground_yard_rate()
            + Decimal::from(stats.receiving_touchdowns) * Decimal::from(RECEIVING_TD_POINTS);

        let receptions = Decimal::from(stats.receptions) * Decimal::from(RECEPTION_POINTS);

        let mut bonuses = 0i64;
        if stats.passing_yards >= PASSING_YARDS_BONUS_THRESHOLD {
            bonuses += YARDAGE_BONUS_POINTS;
        }
        if stats.rushing_yards >= RUSHING_YARDS_BONUS_THRESHOLD {
            bonuses += YARDAGE_BONUS_POINTS;
        }
        if stats.receiving_yards >= RECEIVING_YARDS_BONUS_THRESHOLD {
            bonuses += YARDAGE_BONUS_POINTS;
        }

        let turnovers = Decimal::from(stats.interceptions) * Decimal::from(INTERCEPTION_POINTS)
            + Decimal::from(stats.fumbles_lost) * Decimal::from(FUMBLE_LOST_POINTS);

        let misc = Decimal::from(stats.two_point_conversions)
            * Decimal::from(TWO_POINT_CONVERSION_POINTS)
            + Decimal::from(stats.offensive_fumble_recovery_touchdowns)
                * Decimal::from(FUMBLE_RECOVERY_TD_POINTS);

        ScoreBreakdown {
            passing: FantasyPoints::from_decimal(passing),
            rushing: FantasyPoints::from_decimal(rushing),
            receiving: FantasyPoints::from_decimal(receiving),
            receptions: FantasyPoints::from_decimal(receptions),
            bonuses: FantasyPoints::from_whole(bonuses),
            turnovers: FantasyPoints::from_decimal(turnovers),
            misc: FantasyPoints::from_decimal(misc),
        }
    }
}

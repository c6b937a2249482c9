//! Season standings aggregation

use crate::error::{Result, StandingsError};
use crate::weekly::WeeklyScore;
use pick_ledger::{LeagueId, MemberId};
use scoring_engine::{FantasyPoints, Season, Week};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A member's running season totals.
///
/// The per-week totals are kept alongside the summary, so folding a corrected
/// week replaces that week instead of adding it a second time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonStanding {
    pub league: LeagueId,
    pub season: Season,
    pub member: MemberId,
    pub total_points: FantasyPoints,
    pub weeks_played: u32,
    pub best_week: Option<Week>,
    pub best_week_points: FantasyPoints,
    weekly_totals: BTreeMap<Week, FantasyPoints>,
}

impl SeasonStanding {
    /// Standing with no scored weeks
    pub fn empty(league: LeagueId, season: Season, member: MemberId) -> Self {
        Self {
            league,
            season,
            member,
            total_points: FantasyPoints::zero(),
            weeks_played: 0,
            best_week: None,
            best_week_points: FantasyPoints::zero(),
            weekly_totals: BTreeMap::new(),
        }
    }

    pub fn weekly_totals(&self) -> &BTreeMap<Week, FantasyPoints> {
        &self.weekly_totals
    }

    pub fn week_total(&self, week: Week) -> Option<FantasyPoints> {
        self.weekly_totals.get(&week).copied()
    }

    fn accepts(&self, score: &WeeklyScore) -> bool {
        score.key.league == self.league
            && score.key.season == self.season
            && score.key.member == self.member
    }

    fn refresh_summary(&mut self) {
        self.total_points = self.weekly_totals.values().sum();
        self.weeks_played = self.weekly_totals.len() as u32;

        // ascending week order, so strict > keeps the earliest on ties
        let mut best: Option<(Week, FantasyPoints)> = None;
        for (&week, &points) in &self.weekly_totals {
            match best {
                Some((_, best_points)) if points <= best_points => {}
                _ => best = Some((week, points)),
            }
        }
        self.best_week = best.map(|(week, _)| week);
        self.best_week_points = best.map(|(_, points)| points).unwrap_or_default();
    }
}

impl fmt::Display for SeasonStanding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.league, self.season, self.member)
    }
}

/// Folds weekly scores into season standings
#[derive(Debug, Clone, Copy, Default)]
pub struct SeasonStandingsAggregator;

impl SeasonStandingsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Apply one weekly score. Re-folding a week replaces its earlier total,
    /// so the result is independent of order and of repeats.
    pub fn fold(&self, existing: &SeasonStanding, score: &WeeklyScore) -> Result<SeasonStanding> {
        if !existing.accepts(score) {
            return Err(StandingsError::MismatchedScore {
                score: score.key.to_string(),
                standing: existing.to_string(),
            });
        }

        let mut updated = existing.clone();
        updated.weekly_totals.insert(score.key.week, score.total_points);
        updated.refresh_summary();
        Ok(updated)
    }

    /// Rebuild a standing from every weekly score of the member's season
    pub fn recompute<'a>(
        &self,
        league: &LeagueId,
        season: Season,
        member: &MemberId,
        scores: impl IntoIterator<Item = &'a WeeklyScore>,
    ) -> Result<SeasonStanding> {
        let empty = SeasonStanding::empty(league.clone(), season, member.clone());
        scores.into_iter().try_fold(empty, |standing, score| self.fold(&standing, score))
    }
}

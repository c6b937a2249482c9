//! League table ranking

use crate::season::SeasonStanding;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A standing with its place in the league table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedStanding {
    pub rank: u32,
    pub standing: SeasonStanding,
}

fn compare_results(a: &SeasonStanding, b: &SeasonStanding) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| b.best_week_points.cmp(&a.best_week_points))
        .then_with(|| b.weeks_played.cmp(&a.weeks_played))
}

/// Order standings into a league table.
///
/// Sorted by total, then best week, then weeks played, all descending, with
/// member id as a stable final key. Members level on the first three share a
/// rank and the next rank skips (1, 2, 2, 4).
pub fn rank_standings(standings: &[SeasonStanding]) -> Vec<RankedStanding> {
    let mut sorted: Vec<&SeasonStanding> = standings.iter().collect();
    sorted.sort_by(|a, b| compare_results(a, b).then_with(|| a.member.cmp(&b.member)));

    let mut table: Vec<RankedStanding> = Vec::with_capacity(sorted.len());
    for (index, standing) in sorted.into_iter().enumerate() {
        let rank = match table.last() {
            Some(prev) if compare_results(&prev.standing, standing) == Ordering::Equal => prev.rank,
            _ => index as u32 + 1,
        };
        table.push(RankedStanding { rank, standing: standing.clone() });
    }
    table
}

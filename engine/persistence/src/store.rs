//! Store trait

use crate::error::Result;
use async_trait::async_trait;
use pick_ledger::{LeagueId, MemberId, MemberWeekKey, Pick, PickSet, UsageRecord, WeekKey};
use scoring_engine::Season;
use standings::{SeasonStanding, WeeklyScore};

/// A pick set lock state change and the usage entries it implies.
///
/// `recorded` picks are added to usage. `released` picks are removed unless
/// another locked week of the same member still holds the player at that
/// position. The pick set write and the usage change are applied together or
/// not at all.
#[derive(Debug, Clone)]
pub struct LockCommit {
    pub pick_set: PickSet,
    pub expected_version: u64,
    pub recorded: Vec<Pick>,
    pub released: Vec<Pick>,
}

/// Rescored weekly scores of one backfill run, written as a single batch
#[derive(Debug, Clone)]
pub struct BackfillCommit {
    pub week: WeekKey,
    pub scores: Vec<WeeklyScore>,
}

/// Storage collaborator for the pick'em core
#[async_trait]
pub trait PickemStore: Send + Sync {
    async fn get_pick_set(&self, key: &MemberWeekKey) -> Result<Option<PickSet>>;

    /// Every member's pick set for a week, ordered by member
    async fn list_pick_sets(&self, week: &WeekKey) -> Result<Vec<PickSet>>;

    /// Store an unlocked pick set.
    ///
    /// `expected_version` is `None` when no set may exist yet, otherwise the
    /// version the caller read. Returns the stored set with its new version.
    async fn put_pick_set(&self, pick_set: PickSet, expected_version: Option<u64>)
        -> Result<PickSet>;

    /// Apply a lock or unlock transition atomically with its usage changes
    async fn commit_lock(&self, commit: LockCommit) -> Result<PickSet>;

    async fn usage_records(&self, league: &LeagueId, season: Season) -> Result<Vec<UsageRecord>>;

    async fn get_weekly_score(&self, key: &MemberWeekKey) -> Result<Option<WeeklyScore>>;

    async fn list_weekly_scores(&self, week: &WeekKey) -> Result<Vec<WeeklyScore>>;

    /// All stored weekly scores of one member's season, ordered by week
    async fn member_weekly_scores(
        &self,
        league: &LeagueId,
        season: Season,
        member: &MemberId,
    ) -> Result<Vec<WeeklyScore>>;

    async fn put_weekly_score(&self, score: WeeklyScore) -> Result<()>;

    /// Flag a stored weekly score as paid out
    async fn mark_payout_recorded(&self, key: &MemberWeekKey) -> Result<WeeklyScore>;

    async fn get_standing(
        &self,
        league: &LeagueId,
        season: Season,
        member: &MemberId,
    ) -> Result<Option<SeasonStanding>>;

    async fn list_standings(&self, league: &LeagueId, season: Season)
        -> Result<Vec<SeasonStanding>>;

    /// Write a backfill's scores and rebuild the season standing of every
    /// member they touch from all of that member's stored weeks, as one batch.
    ///
    /// The rebuild reads the weeks under the same write, so concurrent
    /// backfills of different weeks cannot drop each other's totals.
    /// Returns the rebuilt standings.
    async fn commit_backfill(&self, commit: BackfillCommit) -> Result<Vec<SeasonStanding>>;
}

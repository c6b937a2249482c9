//! Pick submission and lock transitions

use crate::error::{CoordinatorError, Result};
use chrono::{DateTime, Utc};
use persistence::{LockCommit, PersistenceError, PickemStore};
use pick_ledger::{
    LeagueRules, MemberId, MemberWeekKey, PickSet, PickValidator, ProposedPicks, ScheduleProvider,
    UsageLookup, UsageTracker, WeekKey, WeekLockRegistry,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a scheduled lock pass over one week
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSummary {
    /// Members whose picks locked in this pass
    pub locked: Vec<MemberId>,
    pub already_locked: usize,
    pub not_due: usize,
}

/// Owns every transition of a pick set: submit, lock, and admin undo.
///
/// Each operation holds the week's exclusivity token, shared with backfill.
pub struct LockCoordinator {
    store: Arc<dyn PickemStore>,
    schedule: Arc<dyn ScheduleProvider>,
    rules: LeagueRules,
    weeks: Arc<WeekLockRegistry>,
}

impl LockCoordinator {
    pub fn new(
        store: Arc<dyn PickemStore>,
        schedule: Arc<dyn ScheduleProvider>,
        rules: LeagueRules,
        weeks: Arc<WeekLockRegistry>,
    ) -> Self {
        Self { store, schedule, rules, weeks }
    }

    pub fn rules(&self) -> &LeagueRules {
        &self.rules
    }

    async fn load_usage(&self, key: &MemberWeekKey) -> Result<UsageTracker> {
        let records = self.store.usage_records(&key.league, key.season).await?;
        Ok(UsageTracker::from_records(records))
    }

    /// Validate and store a member's picks for a week
    pub async fn submit_picks(
        &self,
        key: &MemberWeekKey,
        proposal: &ProposedPicks,
        now: DateTime<Utc>,
    ) -> Result<PickSet> {
        let _token = self.weeks.acquire(&key.week_key()).await;

        let existing = self.store.get_pick_set(key).await?;
        let usage = self.load_usage(key).await?;
        let validated = PickValidator::new(self.schedule.as_ref(), &usage, &self.rules)
            .validate(key, proposal, existing.as_ref(), now)?;

        let stored = self
            .store
            .put_pick_set(validated.into_pick_set(), existing.map(|p| p.version))
            .await?;

        info!(
            key = %key,
            version = stored.version,
            lock_at = ?stored.lock_at(),
            "Picks submitted"
        );
        Ok(stored)
    }

    /// Lock every pick set of the week whose lock time has passed.
    ///
    /// Safe to repeat: sets that are already locked are counted and skipped.
    pub async fn lock_due(&self, week: &WeekKey, now: DateTime<Utc>) -> Result<LockSummary> {
        let _token = self.weeks.acquire(week).await;

        let mut summary = LockSummary::default();
        for pick_set in self.store.list_pick_sets(week).await? {
            if pick_set.is_locked() {
                summary.already_locked += 1;
            } else if pick_set.lock_is_due(now) {
                let member = pick_set.key.member.clone();
                self.lock_pick_set(pick_set, now).await?;
                summary.locked.push(member);
            } else {
                summary.not_due += 1;
            }
        }

        info!(
            week = %week,
            locked = summary.locked.len(),
            already_locked = summary.already_locked,
            not_due = summary.not_due,
            "Lock pass complete"
        );
        Ok(summary)
    }

    /// Lock one member's picks now, regardless of kickoff
    pub async fn admin_lock(&self, key: &MemberWeekKey, now: DateTime<Utc>) -> Result<PickSet> {
        let _token = self.weeks.acquire(&key.week_key()).await;

        let pick_set = self.require_pick_set(key).await?;
        if pick_set.is_locked() {
            debug!(key = %key, "Admin lock on already locked picks");
            return Ok(pick_set);
        }
        info!(key = %key, "Admin lock");
        self.lock_pick_set(pick_set, now).await
    }

    /// Revert a locked pick set to unlocked, removing the usage its lock
    /// recorded unless another locked week of the member still holds it
    pub async fn undo_lock(&self, key: &MemberWeekKey) -> Result<PickSet> {
        let _token = self.weeks.acquire(&key.week_key()).await;

        let pick_set = self.require_pick_set(key).await?;
        if !pick_set.is_locked() {
            return Err(CoordinatorError::NotLocked { key: key.to_string() });
        }

        let expected_version = pick_set.version;
        let mut unlocked = pick_set;
        let released = unlocked.unlock();
        let stored = self
            .store
            .commit_lock(LockCommit {
                pick_set: unlocked,
                expected_version,
                recorded: Vec::new(),
                released,
            })
            .await?;

        warn!(key = %key, version = stored.version, "Lock undone by admin");
        Ok(stored)
    }

    async fn require_pick_set(&self, key: &MemberWeekKey) -> Result<PickSet> {
        self.store
            .get_pick_set(key)
            .await?
            .ok_or_else(|| PersistenceError::not_found(format!("pick set {key}")).into())
    }

    async fn lock_pick_set(&self, pick_set: PickSet, now: DateTime<Utc>) -> Result<PickSet> {
        let key = pick_set.key.clone();
        let expected_version = pick_set.version;

        // Two open weeks may name the same player; the earlier lock wins the usage
        let usage = self.load_usage(&key).await?;
        for pick in pick_set.picks() {
            if usage.has_used(key.season, &key.league, &key.member, pick.position(), pick.player_id())
            {
                warn!(
                    key = %key,
                    position = %pick.position(),
                    player = %pick.player_id(),
                    "Locking a player already used at this position"
                );
            }
        }

        let mut locked = pick_set;
        let recorded = locked.lock(now);
        let stored = self
            .store
            .commit_lock(LockCommit {
                pick_set: locked,
                expected_version,
                recorded,
                released: Vec::new(),
            })
            .await?;

        info!(key = %key, version = stored.version, "Picks locked");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use persistence::InMemoryStore;
    use pick_ledger::{Game, InMemorySchedule, LeagueId, Position, RejectionReason};
    use scoring_engine::{GameId, PlayerId};

    fn kickoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 7, 17, 0, 0).unwrap()
    }

    fn schedule() -> InMemorySchedule {
        let mut s = InMemorySchedule::new();
        s.add_player("qb", "Lamar Jackson", "BAL", &[Position::Quarterback])
            .add_player("rb", "Derrick Henry", "BAL", &[Position::RunningBack])
            .add_player("wr", "Zay Flowers", "BAL", &[Position::WideReceiver])
            .add_player("wr2", "Rashod Bateman", "BAL", &[Position::WideReceiver]);
        for week in 1..=2u8 {
            s.add_game(Game {
                id: GameId::new(format!("BAL-W{week}")),
                season: 2025,
                week,
                kickoff: kickoff() + Duration::weeks(week as i64 - 1),
                home_team: "BAL".to_string(),
                away_team: "KC".to_string(),
            });
        }
        s
    }

    fn coordinator() -> (LockCoordinator, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let coordinator = LockCoordinator::new(
            store.clone(),
            Arc::new(schedule()),
            LeagueRules::default(),
            Arc::new(WeekLockRegistry::new()),
        );
        (coordinator, store)
    }

    fn key(week: u8) -> MemberWeekKey {
        MemberWeekKey::new(LeagueId::new("office"), 2025, week, MemberId::new("sam"))
    }

    fn proposal(wr: &str) -> ProposedPicks {
        ProposedPicks::new()
            .with(Position::Quarterback, "qb")
            .with(Position::RunningBack, "rb")
            .with(Position::WideReceiver, wr)
    }

    #[tokio::test]
    async fn test_submit_then_resubmit() {
        let (coordinator, _) = coordinator();
        let before = kickoff() - Duration::hours(2);

        let first = coordinator.submit_picks(&key(1), &proposal("wr"), before).await.unwrap();
        assert_eq!(first.version, 1);

        let second = coordinator.submit_picks(&key(1), &proposal("wr2"), before).await.unwrap();
        assert_eq!(second.version, 2);
        assert_eq!(second.picks()[2].player_id(), &PlayerId::new("wr2"));
    }

    #[tokio::test]
    async fn test_lock_due_is_idempotent() {
        let (coordinator, store) = coordinator();
        let week = key(1).week_key();
        coordinator.submit_picks(&key(1), &proposal("wr"), kickoff() - Duration::hours(2)).await.unwrap();

        let early = coordinator.lock_due(&week, kickoff() - Duration::minutes(1)).await.unwrap();
        assert_eq!(early.not_due, 1);
        assert!(early.locked.is_empty());

        let due = coordinator.lock_due(&week, kickoff()).await.unwrap();
        assert_eq!(due.locked, vec![MemberId::new("sam")]);

        let again = coordinator.lock_due(&week, kickoff() + Duration::hours(1)).await.unwrap();
        assert!(again.locked.is_empty());
        assert_eq!(again.already_locked, 1);

        assert_eq!(store.usage_records(&LeagueId::new("office"), 2025).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_locked_picks_cannot_be_resubmitted() {
        let (coordinator, _) = coordinator();
        coordinator.submit_picks(&key(1), &proposal("wr"), kickoff() - Duration::hours(2)).await.unwrap();
        coordinator.admin_lock(&key(1), kickoff() - Duration::hours(1)).await.unwrap();

        let err = coordinator
            .submit_picks(&key(1), &proposal("wr2"), kickoff() - Duration::minutes(30))
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(&RejectionReason::PicksAlreadyLocked));
    }

    #[tokio::test]
    async fn test_usage_blocks_repeat_next_week() {
        let (coordinator, _) = coordinator();
        coordinator.submit_picks(&key(1), &proposal("wr"), kickoff() - Duration::hours(2)).await.unwrap();
        coordinator.lock_due(&key(1).week_key(), kickoff()).await.unwrap();

        let err = coordinator
            .submit_picks(&key(2), &proposal("wr2"), kickoff() + Duration::days(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err.rejection(),
            Some(RejectionReason::PlayerAlreadyUsed { position: Position::Quarterback, .. })
        ));
    }

    #[tokio::test]
    async fn test_undo_lock_releases_usage() {
        let (coordinator, store) = coordinator();
        coordinator.submit_picks(&key(1), &proposal("wr"), kickoff() - Duration::hours(2)).await.unwrap();
        coordinator.admin_lock(&key(1), kickoff() - Duration::hours(1)).await.unwrap();

        let undone = coordinator.undo_lock(&key(1)).await.unwrap();
        assert!(!undone.is_locked());
        assert!(store.usage_records(&LeagueId::new("office"), 2025).await.unwrap().is_empty());

        let err = coordinator.undo_lock(&key(1)).await.unwrap_err();
        assert!(matches!(err, CoordinatorError::NotLocked { .. }));
    }

    #[tokio::test]
    async fn test_undo_keeps_usage_of_other_locked_week() {
        let (coordinator, store) = coordinator();
        let early = kickoff() - Duration::hours(2);
        // both weeks name the same players while still open
        coordinator.submit_picks(&key(1), &proposal("wr"), early).await.unwrap();
        coordinator.submit_picks(&key(2), &proposal("wr"), early).await.unwrap();
        coordinator.admin_lock(&key(1), early).await.unwrap();
        coordinator.admin_lock(&key(2), early).await.unwrap();

        coordinator.undo_lock(&key(2)).await.unwrap();
        let usage = store.usage_records(&LeagueId::new("office"), 2025).await.unwrap();
        assert_eq!(usage.len(), 3);

        coordinator.undo_lock(&key(1)).await.unwrap();
        assert!(store.usage_records(&LeagueId::new("office"), 2025).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_started_unlocked_picks_cannot_be_swapped() {
        let (coordinator, store) = coordinator();
        coordinator.submit_picks(&key(1), &proposal("wr"), kickoff() - Duration::hours(2)).await.unwrap();

        // no sweep has run yet, but the stored picks have kicked off
        let err = coordinator
            .submit_picks(&key(1), &proposal("wr2"), kickoff() + Duration::hours(1))
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(&RejectionReason::WeekLocked { lock_at: kickoff() }));

        let stored = store.get_pick_set(&key(1)).await.unwrap().unwrap();
        assert_eq!(stored.picks()[2].player_id(), &PlayerId::new("wr"));
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn test_admin_lock_missing_pick_set() {
        let (coordinator, _) = coordinator();
        let err = coordinator.admin_lock(&key(1), kickoff()).await.unwrap_err();
        assert!(matches!(err, CoordinatorError::Persistence(PersistenceError::NotFound(_))));
    }
}

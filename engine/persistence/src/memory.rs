//! In-memory store

use crate::error::{PersistenceError, Result};
use crate::snapshot::StoreSnapshot;
use crate::store::{BackfillCommit, LockCommit, PickemStore};
use async_trait::async_trait;
use pick_ledger::{
    LeagueId, MemberId, MemberWeekKey, Pick, PickSet, Position, UsageRecord, UsageTracker, WeekKey,
};
use scoring_engine::{GameId, PlayerId, Season, Week};
use standings::{SeasonStanding, SeasonStandingsAggregator, WeeklyScore};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, info};

type StandingKey = (LeagueId, Season, MemberId);

#[derive(Debug, Default)]
struct StoreState {
    pick_sets: BTreeMap<MemberWeekKey, PickSet>,
    weekly_scores: BTreeMap<MemberWeekKey, WeeklyScore>,
    standings: BTreeMap<StandingKey, SeasonStanding>,
    usage: UsageTracker,
}

fn in_week(key: &MemberWeekKey, week: &WeekKey) -> bool {
    key.league == week.league && key.season == week.season && key.week == week.week
}

fn selection(picks: &[Pick]) -> Vec<(Position, &PlayerId, &GameId)> {
    picks.iter().map(|p| (p.position(), p.player_id(), p.game_id())).collect()
}

/// Whether another locked week of the same member still uses this player at this position
fn held_elsewhere(
    pick_sets: &BTreeMap<MemberWeekKey, PickSet>,
    key: &MemberWeekKey,
    pick: &Pick,
) -> bool {
    pick_sets.values().any(|other| {
        other.key != *key
            && other.key.league == key.league
            && other.key.season == key.season
            && other.key.member == key.member
            && other.is_locked()
            && other.picks_at(pick.position()).any(|p| p.player_id() == pick.player_id())
    })
}

/// Store held in memory behind one lock, so every write is atomic
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self> {
        snapshot.check_format()?;

        let mut state = StoreState {
            usage: UsageTracker::from_records(snapshot.usage),
            ..Default::default()
        };
        for pick_set in snapshot.pick_sets {
            state.pick_sets.insert(pick_set.key.clone(), pick_set);
        }
        for score in snapshot.weekly_scores {
            state.weekly_scores.insert(score.key.clone(), score);
        }
        for standing in snapshot.standings {
            let key = (standing.league.clone(), standing.season, standing.member.clone());
            state.standings.insert(key, standing);
        }

        Ok(Self { state: RwLock::new(state) })
    }

    /// Capture the current contents
    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read().await;
        StoreSnapshot::new(
            state.pick_sets.values().cloned().collect(),
            state.weekly_scores.values().cloned().collect(),
            state.standings.values().cloned().collect(),
            state.usage.records(),
        )
    }

    /// Load from a snapshot file, starting empty when the file does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        match StoreSnapshot::load(path.as_ref())? {
            Some(snapshot) => Self::from_snapshot(snapshot),
            None => {
                info!("No snapshot at {:?}, starting with an empty store", path.as_ref());
                Ok(Self::new())
            }
        }
    }

    /// Write the current contents to a snapshot file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.snapshot().await.save(path.as_ref())
    }
}

#[async_trait]
impl PickemStore for InMemoryStore {
    async fn get_pick_set(&self, key: &MemberWeekKey) -> Result<Option<PickSet>> {
        Ok(self.state.read().await.pick_sets.get(key).cloned())
    }

    async fn list_pick_sets(&self, week: &WeekKey) -> Result<Vec<PickSet>> {
        let state = self.state.read().await;
        Ok(state.pick_sets.values().filter(|p| in_week(&p.key, week)).cloned().collect())
    }

    async fn put_pick_set(
        &self,
        mut pick_set: PickSet,
        expected_version: Option<u64>,
    ) -> Result<PickSet> {
        let mut state = self.state.write().await;
        let key = pick_set.key.clone();
        let current = state.pick_sets.get(&key);

        if current.map(PickSet::is_locked).unwrap_or(false)
            || pick_set.picks().iter().any(Pick::is_locked)
        {
            return Err(PersistenceError::LockedPickSet(key.to_string()));
        }

        let actual = current.map(|p| p.version);
        if actual != expected_version {
            return Err(PersistenceError::VersionConflict {
                key: key.to_string(),
                expected: expected_version,
                actual,
            });
        }

        pick_set.version = actual.map(|v| v + 1).unwrap_or(1);
        state.pick_sets.insert(key.clone(), pick_set.clone());
        debug!(key = %key, version = pick_set.version, "Stored pick set");
        Ok(pick_set)
    }

    async fn commit_lock(&self, commit: LockCommit) -> Result<PickSet> {
        let mut state = self.state.write().await;
        let LockCommit { mut pick_set, expected_version, recorded, released } = commit;
        let key = pick_set.key.clone();

        let current = state
            .pick_sets
            .get(&key)
            .ok_or_else(|| PersistenceError::not_found(format!("pick set {key}")))?;

        if current.version != expected_version {
            return Err(PersistenceError::VersionConflict {
                key: key.to_string(),
                expected: Some(expected_version),
                actual: Some(current.version),
            });
        }
        if current.is_locked() && selection(current.picks()) != selection(pick_set.picks()) {
            return Err(PersistenceError::LockedPickSet(key.to_string()));
        }

        pick_set.version = current.version + 1;
        for pick in &recorded {
            state.usage.record_usage(
                key.season,
                &key.league,
                &key.member,
                pick.position(),
                pick.player_id(),
            );
        }
        for pick in &released {
            if held_elsewhere(&state.pick_sets, &key, pick) {
                debug!(
                    key = %key,
                    player_id = %pick.player_id(),
                    "Usage still held by another locked week"
                );
                continue;
            }
            state.usage.remove_usage(
                key.season,
                &key.league,
                &key.member,
                pick.position(),
                pick.player_id(),
            );
        }
        state.pick_sets.insert(key.clone(), pick_set.clone());

        debug!(
            key = %key,
            version = pick_set.version,
            recorded = recorded.len(),
            released = released.len(),
            "Committed lock transition"
        );
        Ok(pick_set)
    }

    async fn usage_records(&self, league: &LeagueId, season: Season) -> Result<Vec<UsageRecord>> {
        let state = self.state.read().await;
        Ok(state
            .usage
            .records()
            .into_iter()
            .filter(|r| &r.key.league == league && r.key.season == season)
            .collect())
    }

    async fn get_weekly_score(&self, key: &MemberWeekKey) -> Result<Option<WeeklyScore>> {
        Ok(self.state.read().await.weekly_scores.get(key).cloned())
    }

    async fn list_weekly_scores(&self, week: &WeekKey) -> Result<Vec<WeeklyScore>> {
        let state = self.state.read().await;
        Ok(state.weekly_scores.values().filter(|s| in_week(&s.key, week)).cloned().collect())
    }

    async fn member_weekly_scores(
        &self,
        league: &LeagueId,
        season: Season,
        member: &MemberId,
    ) -> Result<Vec<WeeklyScore>> {
        let state = self.state.read().await;
        let mut scores: Vec<WeeklyScore> = state
            .weekly_scores
            .values()
            .filter(|s| &s.key.league == league && s.key.season == season && &s.key.member == member)
            .cloned()
            .collect();
        scores.sort_by_key(|s| s.key.week);
        Ok(scores)
    }

    async fn put_weekly_score(&self, score: WeeklyScore) -> Result<()> {
        self.state.write().await.weekly_scores.insert(score.key.clone(), score);
        Ok(())
    }

    async fn mark_payout_recorded(&self, key: &MemberWeekKey) -> Result<WeeklyScore> {
        let mut state = self.state.write().await;
        let score = state
            .weekly_scores
            .get_mut(key)
            .ok_or_else(|| PersistenceError::not_found(format!("weekly score {key}")))?;
        score.payout_recorded = true;
        info!(key = %key, total = %score.total_points, "Recorded payout");
        Ok(score.clone())
    }

    async fn get_standing(
        &self,
        league: &LeagueId,
        season: Season,
        member: &MemberId,
    ) -> Result<Option<SeasonStanding>> {
        let key = (league.clone(), season, member.clone());
        Ok(self.state.read().await.standings.get(&key).cloned())
    }

    async fn list_standings(
        &self,
        league: &LeagueId,
        season: Season,
    ) -> Result<Vec<SeasonStanding>> {
        let state = self.state.read().await;
        Ok(state
            .standings
            .values()
            .filter(|s| &s.league == league && s.season == season)
            .cloned()
            .collect())
    }

    async fn commit_backfill(&self, commit: BackfillCommit) -> Result<Vec<SeasonStanding>> {
        let BackfillCommit { week, scores } = commit;

        if let Some(stray) = scores.iter().find(|s| !in_week(&s.key, &week)) {
            return Err(PersistenceError::corruption(format!(
                "weekly score {} is outside backfill week {}",
                stray.key, week
            )));
        }

        let mut state = self.state.write().await;
        let members: BTreeSet<&MemberId> = scores.iter().map(|s| &s.key.member).collect();
        let aggregator = SeasonStandingsAggregator::new();
        let mut rebuilt = Vec::with_capacity(members.len());
        for member in members {
            let mut weeks: BTreeMap<Week, &WeeklyScore> = state
                .weekly_scores
                .values()
                .filter(|s| {
                    s.key.league == week.league
                        && s.key.season == week.season
                        && &s.key.member == member
                })
                .map(|s| (s.key.week, s))
                .collect();
            for score in scores.iter().filter(|s| &s.key.member == member) {
                weeks.insert(score.key.week, score);
            }
            let standing = aggregator
                .recompute(&week.league, week.season, member, weeks.into_values())
                .map_err(|e| PersistenceError::corruption(e.to_string()))?;
            rebuilt.push(standing);
        }

        let score_count = scores.len();
        for score in scores {
            state.weekly_scores.insert(score.key.clone(), score);
        }
        for standing in &rebuilt {
            let key = (standing.league.clone(), standing.season, standing.member.clone());
            state.standings.insert(key, standing.clone());
        }

        info!(week = %week, scores = score_count, standings = rebuilt.len(), "Committed backfill");
        Ok(rebuilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pick_ledger::UsageLookup;
    use scoring_engine::FantasyPoints;
    use std::sync::Arc;

    fn key(member: &str) -> MemberWeekKey {
        MemberWeekKey::new(LeagueId::new("office"), 2025, 3, MemberId::new(member))
    }

    fn pick_set(member: &str) -> PickSet {
        let kickoff = Utc.with_ymd_and_hms(2025, 9, 21, 17, 0, 0).unwrap();
        PickSet::new(
            key(member),
            vec![
                Pick::new(Position::Quarterback, PlayerId::new("qb"), GameId::new("g1")),
                Pick::new(Position::RunningBack, PlayerId::new("rb"), GameId::new("g1")),
                Pick::new(Position::WideReceiver, PlayerId::new("wr"), GameId::new("g2")),
            ],
            Some(kickoff),
            kickoff,
        )
    }

    fn score(member: &str, cents: i64) -> WeeklyScore {
        WeeklyScore {
            key: key(member),
            slots: Vec::new(),
            position_points: BTreeMap::new(),
            total_points: FantasyPoints::from_cents(cents),
            double_pick_positions: BTreeSet::new(),
            payout_recorded: false,
        }
    }

    #[tokio::test]
    async fn test_put_pick_set_compare_and_swap() {
        let store = InMemoryStore::new();

        let stored = store.put_pick_set(pick_set("sam"), None).await.unwrap();
        assert_eq!(stored.version, 1);

        let err = store.put_pick_set(pick_set("sam"), None).await.unwrap_err();
        assert!(err.is_version_conflict());

        let err = store.put_pick_set(pick_set("sam"), Some(7)).await.unwrap_err();
        assert!(err.is_version_conflict());

        let replaced = store.put_pick_set(pick_set("sam"), Some(1)).await.unwrap();
        assert_eq!(replaced.version, 2);
    }

    #[tokio::test]
    async fn test_lock_commit_records_usage_atomically() {
        let store = InMemoryStore::new();
        let stored = store.put_pick_set(pick_set("sam"), None).await.unwrap();

        let mut locked = stored.clone();
        let recorded = locked.lock(locked.lock_at().unwrap());
        let committed = store
            .commit_lock(LockCommit {
                pick_set: locked,
                expected_version: stored.version,
                recorded,
                released: Vec::new(),
            })
            .await
            .unwrap();
        assert!(committed.is_locked());
        assert_eq!(committed.version, 2);

        let usage = store.usage_records(&LeagueId::new("office"), 2025).await.unwrap();
        assert_eq!(usage.len(), 3);
        {
            let state = store.state.read().await;
            let k = &committed.key;
            assert!(committed.picks().iter().all(|p| state.usage.has_used(
                k.season,
                &k.league,
                &k.member,
                p.position(),
                p.player_id()
            )));
        }

        // stale version loses
        let err = store
            .commit_lock(LockCommit {
                pick_set: committed.clone(),
                expected_version: stored.version,
                recorded: Vec::new(),
                released: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(err.is_version_conflict());
    }

    #[tokio::test]
    async fn test_locked_pick_set_cannot_be_replaced() {
        let store = InMemoryStore::new();
        let stored = store.put_pick_set(pick_set("sam"), None).await.unwrap();
        let mut locked = stored.clone();
        let recorded = locked.lock(locked.lock_at().unwrap());
        let committed = store
            .commit_lock(LockCommit {
                pick_set: locked,
                expected_version: 1,
                recorded,
                released: Vec::new(),
            })
            .await
            .unwrap();

        let err = store.put_pick_set(pick_set("sam"), Some(committed.version)).await.unwrap_err();
        assert!(matches!(err, PersistenceError::LockedPickSet(_)));

        // a lock commit may not swap the selection either
        let mut swapped = PickSet::new(
            key("sam"),
            vec![Pick::new(Position::Quarterback, PlayerId::new("other"), GameId::new("g1"))],
            committed.lock_at(),
            committed.submitted_at,
        );
        swapped.lock(committed.lock_at().unwrap());
        let err = store
            .commit_lock(LockCommit {
                pick_set: swapped,
                expected_version: committed.version,
                recorded: Vec::new(),
                released: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::LockedPickSet(_)));
    }

    async fn commit_locked(store: &InMemoryStore, pick_set: PickSet) -> PickSet {
        let stored = store.put_pick_set(pick_set, None).await.unwrap();
        let mut locked = stored.clone();
        let recorded = locked.lock(locked.lock_at().unwrap());
        store
            .commit_lock(LockCommit {
                pick_set: locked,
                expected_version: stored.version,
                recorded,
                released: Vec::new(),
            })
            .await
            .unwrap()
    }

    async fn commit_unlocked(store: &InMemoryStore, locked: &PickSet) {
        let mut unlocked = locked.clone();
        let released = unlocked.unlock();
        store
            .commit_lock(LockCommit {
                pick_set: unlocked,
                expected_version: locked.version,
                recorded: Vec::new(),
                released,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unlock_keeps_usage_held_by_other_locked_week() {
        let store = InMemoryStore::new();
        let office = LeagueId::new("office");
        let week_three = commit_locked(&store, pick_set("sam")).await;
        let mut later = pick_set("sam");
        later.key.week = 4;
        let week_four = commit_locked(&store, later).await;
        // another member's locked week does not hold sam's usage
        commit_locked(&store, pick_set("kim")).await;

        commit_unlocked(&store, &week_four).await;
        let sam_usage = |records: Vec<UsageRecord>| {
            records.into_iter().filter(|r| r.key.member == MemberId::new("sam")).count()
        };
        assert_eq!(sam_usage(store.usage_records(&office, 2025).await.unwrap()), 3);

        commit_unlocked(&store, &week_three).await;
        assert_eq!(sam_usage(store.usage_records(&office, 2025).await.unwrap()), 0);
    }

    #[tokio::test]
    async fn test_backfill_commit_rejects_stray_rows() {
        let store = InMemoryStore::new();
        store.put_weekly_score(score("sam", 1000)).await.unwrap();

        let mut stray = score("kim", 500);
        stray.key.week = 9;
        let err = store
            .commit_backfill(BackfillCommit {
                week: key("sam").week_key(),
                scores: vec![score("sam", 2000), stray],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Corruption(_)));

        // nothing from the rejected batch was written
        let kept = store.get_weekly_score(&key("sam")).await.unwrap().unwrap();
        assert_eq!(kept.total_points, FantasyPoints::from_cents(1000));
    }

    #[tokio::test]
    async fn test_backfill_commits_of_different_weeks_keep_both_totals() {
        let store = Arc::new(InMemoryStore::new());
        let mut week_four = score("sam", 700);
        week_four.key.week = 4;

        let commit = |scores: Vec<WeeklyScore>| {
            let store = store.clone();
            let week = scores[0].key.week_key();
            tokio::spawn(async move { store.commit_backfill(BackfillCommit { week, scores }).await })
        };
        let (three, four) = tokio::join!(
            commit(vec![score("sam", 1000), score("kim", 300)]),
            commit(vec![week_four])
        );
        three.unwrap().unwrap();
        four.unwrap().unwrap();

        let sam = store
            .get_standing(&LeagueId::new("office"), 2025, &MemberId::new("sam"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sam.weeks_played, 2);
        assert_eq!(sam.total_points, FantasyPoints::from_cents(1700));
        assert_eq!(sam.best_week, Some(3));

        // a later rescore of one week rebuilds on top of the other
        let rebuilt = store
            .commit_backfill(BackfillCommit {
                week: key("sam").week_key(),
                scores: vec![score("sam", 200)],
            })
            .await
            .unwrap();
        assert_eq!(rebuilt.len(), 1);
        assert_eq!(rebuilt[0].total_points, FantasyPoints::from_cents(900));
        assert_eq!(rebuilt[0].best_week, Some(4));
        assert_eq!(store.list_standings(&LeagueId::new("office"), 2025).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_payout_flag() {
        let store = InMemoryStore::new();
        assert!(store.mark_payout_recorded(&key("sam")).await.is_err());

        store.put_weekly_score(score("sam", 1000)).await.unwrap();
        let paid = store.mark_payout_recorded(&key("sam")).await.unwrap();
        assert!(paid.payout_recorded);
    }

    #[tokio::test]
    async fn test_member_scores_ordered_by_week() {
        let store = InMemoryStore::new();
        for week in [5u8, 1, 3] {
            let mut s = score("sam", week as i64 * 100);
            s.key.week = week;
            store.put_weekly_score(s).await.unwrap();
        }
        store.put_weekly_score(score("kim", 100)).await.unwrap();

        let weeks: Vec<u8> = store
            .member_weekly_scores(&LeagueId::new("office"), 2025, &MemberId::new("sam"))
            .await
            .unwrap()
            .iter()
            .map(|s| s.key.week)
            .collect();
        assert_eq!(weeks, vec![1, 3, 5]);
    }
}

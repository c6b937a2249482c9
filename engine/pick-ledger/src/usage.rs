//! Season-long player usage per member and position

use crate::ids::{LeagueId, MemberId, Position};
use dashmap::DashMap;
use scoring_engine::{PlayerId, Season};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// (league, season, member, position)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UsageKey {
    pub league: LeagueId,
    pub season: Season,
    pub member: MemberId,
    pub position: Position,
}

impl UsageKey {
    pub fn new(league: LeagueId, season: Season, member: MemberId, position: Position) -> Self {
        Self { league, season, member, position }
    }
}

/// Flat record used for persistence
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UsageRecord {
    #[serde(flatten)]
    pub key: UsageKey,
    pub players: BTreeSet<PlayerId>,
}

/// Read side of usage history, as consumed by validation
pub trait UsageLookup {
    /// Whether the member has started this player at this position this season
    fn has_used(
        &self,
        season: Season,
        league: &LeagueId,
        member: &MemberId,
        position: Position,
        player_id: &PlayerId,
    ) -> bool;

    /// Whether the member has started this player at any position this season
    fn has_used_any_position(
        &self,
        season: Season,
        league: &LeagueId,
        member: &MemberId,
        player_id: &PlayerId,
    ) -> bool {
        Position::ALL.iter().any(|&p| self.has_used(season, league, member, p, player_id))
    }
}

/// Tracks which players each member has already started at each position.
///
/// Entries only appear through a lock transition and only disappear through an
/// administrative undo of that lock. Each league/season gets its own keys, so
/// one tracker can be shared by independent leagues.
#[derive(Debug, Default)]
pub struct UsageTracker {
    entries: DashMap<UsageKey, BTreeSet<PlayerId>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a player was started. Returns `false` if it was already
    /// recorded, which is not an error: lock retries land here.
    pub fn record_usage(
        &self,
        season: Season,
        league: &LeagueId,
        member: &MemberId,
        position: Position,
        player_id: &PlayerId,
    ) -> bool {
        let key = UsageKey::new(league.clone(), season, member.clone(), position);
        let inserted = self.entries.entry(key).or_default().insert(player_id.clone());
        if inserted {
            debug!(%league, season, %member, %position, player = %player_id, "Recorded usage");
        }
        inserted
    }

    /// Remove a usage entry.
    ///
    /// Precondition: the pick that recorded it is being reverted to unlocked in
    /// the same operation.
    pub fn remove_usage(
        &self,
        season: Season,
        league: &LeagueId,
        member: &MemberId,
        position: Position,
        player_id: &PlayerId,
    ) -> bool {
        let key = UsageKey::new(league.clone(), season, member.clone(), position);
        let removed = match self.entries.get_mut(&key) {
            Some(mut players) => players.remove(player_id),
            None => false,
        };
        if removed {
            self.entries.remove_if(&key, |_, players| players.is_empty());
            info!(%league, season, %member, %position, player = %player_id, "Removed usage (admin undo)");
        }
        removed
    }

    /// Players the member has used at a position, in id order
    pub fn players_used(
        &self,
        season: Season,
        league: &LeagueId,
        member: &MemberId,
        position: Position,
    ) -> Vec<PlayerId> {
        let key = UsageKey::new(league.clone(), season, member.clone(), position);
        self.entries.get(&key).map(|p| p.iter().cloned().collect()).unwrap_or_default()
    }

    /// Snapshot of all entries, sorted by key
    pub fn records(&self) -> Vec<UsageRecord> {
        let mut records: Vec<UsageRecord> = self
            .entries
            .iter()
            .map(|e| UsageRecord { key: e.key().clone(), players: e.value().clone() })
            .collect();
        records.sort();
        records
    }

    pub fn from_records(records: impl IntoIterator<Item = UsageRecord>) -> Self {
        let tracker = Self::new();
        for record in records {
            tracker.entries.entry(record.key).or_default().extend(record.players);
        }
        tracker
    }

    pub fn len(&self) -> usize {
        self.entries.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UsageLookup for UsageTracker {
    fn has_used(
        &self,
        season: Season,
        league: &LeagueId,
        member: &MemberId,
        position: Position,
        player_id: &PlayerId,
    ) -> bool {
        let key = UsageKey::new(league.clone(), season, member.clone(), position);
        self.entries.get(&key).map(|p| p.contains(player_id)).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (LeagueId, MemberId, PlayerId) {
        (LeagueId::new("office"), MemberId::new("sam"), PlayerId::new("4314"))
    }

    #[test]
    fn test_record_is_idempotent() {
        let tracker = UsageTracker::new();
        let (league, member, player) = ids();

        assert!(tracker.record_usage(2025, &league, &member, Position::RunningBack, &player));
        assert!(!tracker.record_usage(2025, &league, &member, Position::RunningBack, &player));
        assert_eq!(tracker.len(), 1);
        assert!(tracker.has_used(2025, &league, &member, Position::RunningBack, &player));
    }

    #[test]
    fn test_usage_is_scoped() {
        let tracker = UsageTracker::new();
        let (league, member, player) = ids();
        tracker.record_usage(2025, &league, &member, Position::RunningBack, &player);

        assert!(!tracker.has_used(2025, &league, &member, Position::WideReceiver, &player));
        assert!(!tracker.has_used(2024, &league, &member, Position::RunningBack, &player));
        assert!(!tracker.has_used(2025, &LeagueId::new("other"), &member, Position::RunningBack, &player));
        assert!(!tracker.has_used(2025, &league, &MemberId::new("kim"), Position::RunningBack, &player));
        assert!(tracker.has_used_any_position(2025, &league, &member, &player));
    }

    #[test]
    fn test_remove_usage() {
        let tracker = UsageTracker::new();
        let (league, member, player) = ids();
        tracker.record_usage(2025, &league, &member, Position::Quarterback, &player);

        assert!(tracker.remove_usage(2025, &league, &member, Position::Quarterback, &player));
        assert!(!tracker.remove_usage(2025, &league, &member, Position::Quarterback, &player));
        assert!(tracker.is_empty());
        assert!(tracker.records().is_empty());
    }

    #[test]
    fn test_records_round_trip() {
        let tracker = UsageTracker::new();
        let (league, member, player) = ids();
        tracker.record_usage(2025, &league, &member, Position::Quarterback, &player);
        tracker.record_usage(2025, &league, &member, Position::Quarterback, &PlayerId::new("1"));
        tracker.record_usage(2025, &league, &member, Position::WideReceiver, &player);

        let restored = UsageTracker::from_records(tracker.records());
        assert_eq!(restored.records(), tracker.records());
        assert_eq!(
            restored.players_used(2025, &league, &member, Position::Quarterback),
            vec![PlayerId::new("1"), PlayerId::new("4314")]
        );
    }
}

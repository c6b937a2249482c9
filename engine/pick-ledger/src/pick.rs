//! Picks, pick sets and proposals

use crate::ids::{MemberWeekKey, Position};
use chrono::{DateTime, Utc};
use scoring_engine::{GameId, PlayerId};
use serde::{Deserialize, Serialize};

/// One requested (position, player) selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedPick {
    pub position: Position,
    pub player_id: PlayerId,
}

/// A member's requested picks for one week, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedPicks {
    pub picks: Vec<ProposedPick>,
}

impl ProposedPicks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper
    pub fn with(mut self, position: Position, player_id: impl Into<String>) -> Self {
        self.push(position, PlayerId::new(player_id));
        self
    }

    pub fn push(&mut self, position: Position, player_id: PlayerId) {
        self.picks.push(ProposedPick { position, player_id });
    }

    pub fn count_at(&self, position: Position) -> usize {
        self.picks.iter().filter(|p| p.position == position).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProposedPick> {
        self.picks.iter()
    }
}

/// A single position slot selection bound to the game the player appears in.
///
/// Player and game are fixed at construction. The only state change a pick
/// ever sees is its lock flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    position: Position,
    player_id: PlayerId,
    game_id: GameId,
    locked: bool,
    locked_at: Option<DateTime<Utc>>,
}

impl Pick {
    /// Create an unlocked pick
    pub fn new(position: Position, player_id: PlayerId, game_id: GameId) -> Self {
        Self { position, player_id, game_id, locked: false, locked_at: None }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn locked_at(&self) -> Option<DateTime<Utc>> {
        self.locked_at
    }

    fn lock(&mut self, now: DateTime<Utc>) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        self.locked_at = Some(now);
        true
    }

    fn unlock(&mut self) -> bool {
        let was_locked = self.locked;
        self.locked = false;
        self.locked_at = None;
        was_locked
    }
}

/// Output of a successful validation. Immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedPicks {
    key: MemberWeekKey,
    picks: Vec<Pick>,
    lock_at: Option<DateTime<Utc>>,
    validated_at: DateTime<Utc>,
}

impl ValidatedPicks {
    pub(crate) fn new(
        key: MemberWeekKey,
        picks: Vec<Pick>,
        lock_at: Option<DateTime<Utc>>,
        validated_at: DateTime<Utc>,
    ) -> Self {
        Self { key, picks, lock_at, validated_at }
    }

    pub fn key(&self) -> &MemberWeekKey {
        &self.key
    }

    pub fn picks(&self) -> &[Pick] {
        &self.picks
    }

    /// Instant the picks stop being editable
    pub fn lock_at(&self) -> Option<DateTime<Utc>> {
        self.lock_at
    }

    pub fn validated_at(&self) -> DateTime<Utc> {
        self.validated_at
    }

    pub fn into_pick_set(self) -> PickSet {
        PickSet {
            key: self.key,
            picks: self.picks,
            lock_at: self.lock_at,
            version: 0,
            submitted_at: self.validated_at,
        }
    }
}

/// A member's stored picks for one week.
///
/// All picks in a set lock together. `version` is owned by the store and
/// bumps on every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickSet {
    pub key: MemberWeekKey,
    picks: Vec<Pick>,
    lock_at: Option<DateTime<Utc>>,
    pub version: u64,
    pub submitted_at: DateTime<Utc>,
}

impl PickSet {
    pub fn new(
        key: MemberWeekKey,
        picks: Vec<Pick>,
        lock_at: Option<DateTime<Utc>>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self { key, picks, lock_at, version: 0, submitted_at }
    }

    pub fn picks(&self) -> &[Pick] {
        &self.picks
    }

    /// Earliest kickoff or deadline covering the selection
    pub fn lock_at(&self) -> Option<DateTime<Utc>> {
        self.lock_at
    }

    pub fn picks_at(&self, position: Position) -> impl Iterator<Item = &Pick> {
        self.picks.iter().filter(move |p| p.position == position)
    }

    /// True once every pick in the set is locked
    pub fn is_locked(&self) -> bool {
        !self.picks.is_empty() && self.picks.iter().all(Pick::is_locked)
    }

    /// Whether the lock threshold has been reached at `now`
    pub fn lock_is_due(&self, now: DateTime<Utc>) -> bool {
        matches!(self.lock_at, Some(lock_at) if now >= lock_at)
    }

    /// Lock every pick. Returns the picks that changed state; empty when the
    /// set was already locked.
    pub fn lock(&mut self, now: DateTime<Utc>) -> Vec<Pick> {
        self.picks.iter_mut().filter_map(|p| p.lock(now).then(|| p.clone())).collect()
    }

    /// Revert every pick to unlocked. Returns the picks that were locked.
    ///
    /// Callers must remove the matching usage entries in the same operation.
    pub fn unlock(&mut self) -> Vec<Pick> {
        self.picks.iter_mut().filter_map(|p| p.unlock().then(|| p.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{LeagueId, MemberId};
    use chrono::TimeZone;

    fn sample_set() -> PickSet {
        let key = MemberWeekKey::new(LeagueId::new("l"), 2025, 1, MemberId::new("m"));
        let kickoff = Utc.with_ymd_and_hms(2025, 9, 7, 17, 0, 0).unwrap();
        PickSet::new(
            key,
            vec![
                Pick::new(Position::Quarterback, PlayerId::new("qb"), GameId::new("g1")),
                Pick::new(Position::RunningBack, PlayerId::new("rb"), GameId::new("g2")),
                Pick::new(Position::WideReceiver, PlayerId::new("wr"), GameId::new("g1")),
            ],
            Some(kickoff),
            kickoff - chrono::Duration::days(2),
        )
    }

    #[test]
    fn test_lock_is_due_at_threshold() {
        let set = sample_set();
        let lock_at = set.lock_at.unwrap();
        assert!(!set.lock_is_due(lock_at - chrono::Duration::seconds(1)));
        assert!(set.lock_is_due(lock_at));
    }

    #[test]
    fn test_lock_is_idempotent() {
        let mut set = sample_set();
        let now = set.lock_at.unwrap();
        assert!(!set.is_locked());

        let changed = set.lock(now);
        assert_eq!(changed.len(), 3);
        assert!(set.is_locked());
        assert!(set.picks().iter().all(|p| p.locked_at() == Some(now)));

        assert!(set.lock(now + chrono::Duration::minutes(5)).is_empty());
        assert!(set.picks().iter().all(|p| p.locked_at() == Some(now)));
    }

    #[test]
    fn test_lock_never_changes_selection() {
        let mut set = sample_set();
        let before: Vec<_> =
            set.picks().iter().map(|p| (p.player_id().clone(), p.game_id().clone())).collect();
        set.lock(set.lock_at.unwrap());
        let after: Vec<_> =
            set.picks().iter().map(|p| (p.player_id().clone(), p.game_id().clone())).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_unlock_reports_previously_locked() {
        let mut set = sample_set();
        assert!(set.unlock().is_empty());
        set.lock(set.lock_at.unwrap());
        assert_eq!(set.unlock().len(), 3);
        assert!(!set.is_locked());
    }

    #[test]
    fn test_proposal_builder() {
        let proposal = ProposedPicks::new()
            .with(Position::Quarterback, "1")
            .with(Position::WideReceiver, "2")
            .with(Position::WideReceiver, "3");
        assert_eq!(proposal.count_at(Position::WideReceiver), 2);
        assert_eq!(proposal.count_at(Position::RunningBack), 0);
    }
}

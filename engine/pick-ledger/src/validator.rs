//! Pick legality checks

use crate::error::{RejectionReason, Result};
use crate::ids::{MemberWeekKey, Position};
use crate::pick::{Pick, PickSet, ProposedPick, ProposedPicks, ValidatedPicks};
use crate::rules::LeagueRules;
use crate::schedule::{Game, PlayerInfo, ScheduleProvider};
use crate::usage::UsageLookup;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Validates a member's proposed picks for one week.
///
/// Checks run in a fixed order and stop at the first failure:
///
/// 0. shape: slot counts per position, no player twice
/// 1. the week is still open for this member
/// 2. every player is eligible for the slot
/// 3. every player has a game this week
/// 4. no player was already used at that position this season
/// 5. league constraints (players per team)
pub struct PickValidator<'a> {
    schedule: &'a dyn ScheduleProvider,
    usage: &'a dyn UsageLookup,
    rules: &'a LeagueRules,
}

struct Resolved<'p> {
    pick: &'p ProposedPick,
    info: Option<PlayerInfo>,
    game: Option<Game>,
}

impl<'a> PickValidator<'a> {
    pub fn new(
        schedule: &'a dyn ScheduleProvider,
        usage: &'a dyn UsageLookup,
        rules: &'a LeagueRules,
    ) -> Self {
        Self { schedule, usage, rules }
    }

    /// Validate `proposal` for `key` at `now`.
    ///
    /// `existing` is the member's currently stored pick set for the week, if
    /// any; a locked one can never be replaced.
    pub fn validate(
        &self,
        key: &MemberWeekKey,
        proposal: &ProposedPicks,
        existing: Option<&PickSet>,
        now: DateTime<Utc>,
    ) -> Result<ValidatedPicks> {
        let result = self.run_checks(key, proposal, existing, now);
        if let Err(reason) = &result {
            debug!(key = %key, %reason, "Rejected picks");
        }
        result
    }

    fn run_checks(
        &self,
        key: &MemberWeekKey,
        proposal: &ProposedPicks,
        existing: Option<&PickSet>,
        now: DateTime<Utc>,
    ) -> Result<ValidatedPicks> {
        self.check_shape(proposal)?;

        let resolved: Vec<Resolved<'_>> = proposal
            .iter()
            .map(|p| {
                let info = self.schedule.player(&p.player_id);
                let game = info
                    .as_ref()
                    .and_then(|i| self.schedule.game_for_team(key.season, key.week, &i.team));
                Resolved { pick: p, info, game }
            })
            .collect();

        // 1. timing
        if let Some(existing) = existing {
            if existing.is_locked() {
                return Err(RejectionReason::PicksAlreadyLocked);
            }
            // stored picks whose games have started are frozen even before the lock sweep
            if let Some(lock_at) = existing.lock_at().filter(|_| existing.lock_is_due(now)) {
                return Err(RejectionReason::WeekLocked { lock_at });
            }
        }
        let lock_at = resolved
            .iter()
            .filter_map(|r| r.game.as_ref().map(|g| g.kickoff))
            .chain(self.schedule.week_deadline(key.season, key.week))
            .min();
        if let Some(lock_at) = lock_at {
            if now >= lock_at {
                return Err(RejectionReason::WeekLocked { lock_at });
            }
        }

        // 2. eligibility
        for r in &resolved {
            let info = r.info.as_ref().ok_or_else(|| RejectionReason::UnknownPlayer {
                player_id: r.pick.player_id.clone(),
            })?;
            if !info.is_eligible(r.pick.position) {
                return Err(RejectionReason::IneligiblePosition {
                    player_id: r.pick.player_id.clone(),
                    position: r.pick.position,
                });
            }
        }

        // 3. scheduled this week
        let mut picks = Vec::with_capacity(resolved.len());
        for r in &resolved {
            let game = r.game.as_ref().ok_or_else(|| RejectionReason::PlayerNotScheduled {
                player_id: r.pick.player_id.clone(),
            })?;
            picks.push(Pick::new(r.pick.position, r.pick.player_id.clone(), game.id.clone()));
        }

        // 4. no-repeat
        for r in &resolved {
            let player_id = &r.pick.player_id;
            let used = self.usage.has_used(key.season, &key.league, &key.member, r.pick.position, player_id)
                || (!self.rules.allow_cross_position_reuse
                    && self.usage.has_used_any_position(
                        key.season,
                        &key.league,
                        &key.member,
                        player_id,
                    ));
            if used {
                return Err(RejectionReason::PlayerAlreadyUsed {
                    player_id: player_id.clone(),
                    position: r.pick.position,
                });
            }
        }

        // 5. league constraints
        if let Some(limit) = self.rules.max_players_per_team {
            let mut per_team: BTreeMap<&str, usize> = BTreeMap::new();
            for info in resolved.iter().filter_map(|r| r.info.as_ref()) {
                *per_team.entry(info.team.as_str()).or_default() += 1;
            }
            if let Some((team, actual)) = per_team.into_iter().find(|&(_, count)| count > limit) {
                return Err(RejectionReason::TeamLimitExceeded {
                    team: team.to_string(),
                    limit,
                    actual,
                });
            }
        }

        Ok(ValidatedPicks::new(key.clone(), picks, lock_at, now))
    }

    fn check_shape(&self, proposal: &ProposedPicks) -> Result<()> {
        for position in Position::ALL {
            let actual = proposal.count_at(position);
            let expected = self.rules.max_picks_at(position);
            if actual == 0 || actual > expected {
                return Err(RejectionReason::InvalidSlotCount { position, expected, actual });
            }
        }

        let mut seen = HashSet::new();
        for pick in proposal.iter() {
            if !seen.insert(&pick.player_id) {
                return Err(RejectionReason::DuplicatePlayer { player_id: pick.player_id.clone() });
            }
        }
        Ok(())
    }
}

//! Statistics backfill
//!
//! Rescores one (league, season, week) from freshly fetched statistics,
//! diffs against what is stored, and rebuilds the season standings of every
//! member whose score moved. Picks are never touched.

use crate::config::BackfillConfig;
use crate::error::{CoordinatorError, Result};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use persistence::{BackfillCommit, PickemStore};
use pick_ledger::{MemberId, PickSet, WeekKey, WeekLockRegistry};
use scoring_engine::{FantasyPoints, StatsProvider};
use serde::{Deserialize, Serialize};
use standings::{WeekStatsTable, WeeklyScore, WeeklyScoreAggregator};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Backfill run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackfillState {
    /// Registered, waiting for the week token
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl fmt::Display for BackfillState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackfillState::Pending => "pending",
            BackfillState::InProgress => "in_progress",
            BackfillState::Completed => "completed",
            BackfillState::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// What a backfill did for one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MemberOutcome {
    Unchanged { total: FantasyPoints },
    Changed { old_total: Option<FantasyPoints>, new_total: FantasyPoints },
    /// Score moved but a payout was already recorded, so the stored score stays
    Frozen { stored_total: FantasyPoints, recomputed_total: FantasyPoints },
    /// Picks still unlocked; nothing to score
    SkippedUnlocked,
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberReport {
    pub member: MemberId,
    #[serde(flatten)]
    pub outcome: MemberOutcome,
}

/// Status report of one backfill run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillStatus {
    pub run_id: Uuid,
    pub week: WeekKey,
    pub state: BackfillState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub members: Vec<MemberReport>,
    /// Systemic failure reason, set only when `state` is `Failed`
    pub error: Option<String>,
}

impl BackfillStatus {
    fn pending(week: WeekKey) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            week,
            state: BackfillState::Pending,
            started_at: Utc::now(),
            finished_at: None,
            members: Vec::new(),
            error: None,
        }
    }

    pub fn changed_members(&self) -> impl Iterator<Item = &MemberReport> {
        self.members.iter().filter(|r| matches!(r.outcome, MemberOutcome::Changed { .. }))
    }

    pub fn member_errors(&self) -> impl Iterator<Item = &MemberReport> {
        self.members.iter().filter(|r| matches!(r.outcome, MemberOutcome::Error { .. }))
    }

    pub fn outcome_for(&self, member: &MemberId) -> Option<&MemberOutcome> {
        self.members.iter().find(|r| &r.member == member).map(|r| &r.outcome)
    }
}

struct Rescored {
    report: MemberReport,
    write: Option<WeeklyScore>,
}

/// Fails a registered run that is dropped before reaching a final state
struct CancelGuard<'a> {
    runs: &'a DashMap<WeekKey, BackfillStatus>,
    week: &'a WeekKey,
    run_id: Uuid,
}

impl Drop for CancelGuard<'_> {
    fn drop(&mut self) {
        let Some(mut status) = self.runs.get_mut(self.week) else {
            return;
        };
        if status.run_id != self.run_id
            || !matches!(status.state, BackfillState::Pending | BackfillState::InProgress)
        {
            return;
        }
        status.state = BackfillState::Failed;
        status.error = Some("cancelled before completion".to_string());
        status.finished_at = Some(Utc::now());
        warn!(week = %self.week, run_id = %self.run_id, "Backfill cancelled");
    }
}

/// Re-derives weekly scores and standings after statistics corrections.
///
/// Runs for different weeks proceed independently; a run holds its week's
/// exclusivity token for its whole duration, so no pick locks underneath it.
pub struct BackfillCoordinator {
    store: Arc<dyn PickemStore>,
    provider: Arc<dyn StatsProvider>,
    weeks: Arc<WeekLockRegistry>,
    weekly: WeeklyScoreAggregator,
    config: BackfillConfig,
    runs: DashMap<WeekKey, BackfillStatus>,
}

impl BackfillCoordinator {
    pub fn new(
        store: Arc<dyn PickemStore>,
        provider: Arc<dyn StatsProvider>,
        weeks: Arc<WeekLockRegistry>,
        weekly: WeeklyScoreAggregator,
        config: BackfillConfig,
    ) -> Self {
        Self {
            store,
            provider,
            weeks,
            weekly,
            config,
            runs: DashMap::new(),
        }
    }

    /// Last known status for a week
    pub fn status(&self, week: &WeekKey) -> Option<BackfillStatus> {
        self.runs.get(week).map(|s| s.clone())
    }

    fn register(&self, week: &WeekKey) -> Result<BackfillStatus> {
        match self.runs.entry(week.clone()) {
            Entry::Occupied(mut entry) => {
                let current = entry.get();
                if matches!(current.state, BackfillState::Pending | BackfillState::InProgress) {
                    return Err(CoordinatorError::BackfillAlreadyRunning {
                        week: week.to_string(),
                        run_id: current.run_id,
                    });
                }
                let status = BackfillStatus::pending(week.clone());
                entry.insert(status.clone());
                Ok(status)
            }
            Entry::Vacant(entry) => {
                let status = BackfillStatus::pending(week.clone());
                entry.insert(status.clone());
                Ok(status)
            }
        }
    }

    fn publish(&self, status: &BackfillStatus) {
        self.runs.insert(status.week.clone(), status.clone());
    }

    /// Rescore a week and reconcile stored scores and standings.
    ///
    /// Per-member failures are reported and the run still completes. A
    /// systemic failure marks the run `Failed` and writes nothing, as does
    /// dropping the returned future before it finishes.
    pub async fn run_backfill(&self, week: &WeekKey) -> Result<BackfillStatus> {
        let mut status = self.register(week)?;
        let _cancel = CancelGuard { runs: &self.runs, week, run_id: status.run_id };
        let _token = self.weeks.acquire(week).await;

        status.state = BackfillState::InProgress;
        self.publish(&status);
        info!(week = %week, run_id = %status.run_id, "Backfill started");

        match self.execute(week).await {
            Ok(members) => {
                status.members = members;
                status.state = BackfillState::Completed;
                status.finished_at = Some(Utc::now());
                self.publish(&status);
                info!(
                    week = %week,
                    run_id = %status.run_id,
                    members = status.members.len(),
                    changed = status.changed_members().count(),
                    errors = status.member_errors().count(),
                    "Backfill completed"
                );
                Ok(status)
            }
            Err(reason) => {
                status.state = BackfillState::Failed;
                status.error = Some(reason.clone());
                status.finished_at = Some(Utc::now());
                self.publish(&status);
                error!(week = %week, run_id = %status.run_id, %reason, "Backfill failed");
                Err(CoordinatorError::SystemicBackfillFailure {
                    week: week.to_string(),
                    run_id: status.run_id,
                    reason,
                })
            }
        }
    }

    /// Err carries the systemic failure reason
    async fn execute(&self, week: &WeekKey) -> std::result::Result<Vec<MemberReport>, String> {
        let lines = self
            .provider
            .fetch_week(week.season, week.week)
            .await
            .map_err(|e| format!("statistics unavailable: {e}"))?;
        if lines.is_empty() {
            return Err("provider returned no statistics for the week".to_string());
        }
        let table = WeekStatsTable::from_provider_lines(&lines);

        let pick_sets = self
            .store
            .list_pick_sets(week)
            .await
            .map_err(|e| format!("could not read pick sets: {e}"))?;

        let rescored: Vec<Rescored> = stream::iter(pick_sets)
            .map(|pick_set| self.rescore_member(pick_set, &table))
            .buffer_unordered(self.config.workers())
            .collect()
            .await;

        let mut reports = Vec::with_capacity(rescored.len());
        let mut scores = Vec::new();
        for Rescored { report, write } in rescored {
            scores.extend(write);
            reports.push(report);
        }
        reports.sort_by(|a, b| a.member.cmp(&b.member));

        if !scores.is_empty() {
            let standings = self
                .store
                .commit_backfill(BackfillCommit { week: week.clone(), scores })
                .await
                .map_err(|e| format!("could not commit results: {e}"))?;
            debug!(week = %week, standings = standings.len(), "Standings rebuilt");
        }

        Ok(reports)
    }

    async fn rescore_member(&self, pick_set: PickSet, table: &WeekStatsTable) -> Rescored {
        let key = pick_set.key.clone();
        let member = key.member.clone();
        let report = |outcome| MemberReport { member: member.clone(), outcome };

        if !pick_set.is_locked() {
            return Rescored { report: report(MemberOutcome::SkippedUnlocked), write: None };
        }

        let mut recomputed = match self.weekly.compute_weekly_score(&key, &pick_set, table) {
            Ok(score) => score,
            Err(e) => {
                warn!(key = %key, error = %e, "Member rescoring failed");
                return Rescored {
                    report: report(MemberOutcome::Error { message: e.to_string() }),
                    write: None,
                };
            }
        };

        let stored = match self.store.get_weekly_score(&key).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(key = %key, error = %e, "Reading stored score failed");
                return Rescored {
                    report: report(MemberOutcome::Error { message: e.to_string() }),
                    write: None,
                };
            }
        };

        match stored {
            Some(stored) if stored.same_result(&recomputed) => Rescored {
                report: report(MemberOutcome::Unchanged { total: stored.total_points }),
                write: None,
            },
            Some(stored) if stored.payout_recorded && self.config.respect_payout_freeze => {
                info!(key = %key, stored = %stored.total_points, recomputed = %recomputed.total_points, "Score frozen by payout");
                Rescored {
                    report: report(MemberOutcome::Frozen {
                        stored_total: stored.total_points,
                        recomputed_total: recomputed.total_points,
                    }),
                    write: None,
                }
            }
            stored => {
                let old_total = stored.as_ref().map(|s| s.total_points);
                recomputed.payout_recorded = stored.map(|s| s.payout_recorded).unwrap_or(false);
                Rescored {
                    report: report(MemberOutcome::Changed {
                        old_total,
                        new_total: recomputed.total_points,
                    }),
                    write: Some(recomputed),
                }
            }
        }
    }
}

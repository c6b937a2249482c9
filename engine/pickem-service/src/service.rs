//! Service state: the snapshot-backed store and the coordinators built on it

use crate::config::ServiceConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use league_coordinator::{BackfillCoordinator, BackfillStatus, LockCoordinator, LockSummary};
use persistence::{InMemoryStore, PickemStore};
use pick_ledger::{
    InMemorySchedule, LeagueId, MemberWeekKey, PickSet, ProposedPicks, WeekKey, WeekLockRegistry,
};
use scoring_engine::{
    FantasyPoints, InMemoryStatsProvider, ScoreBreakdown, ScoringEngine, Season,
    SportsDataIoNormalizer, SportsDataIoProvider, SportsDataIoStatLine, StatKey, StatsNormalizer,
    StatsProvider,
};
use serde::Serialize;
use standings::{rank_standings, RankedStanding, WeeklyScore, WeeklyScoreAggregator};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// One scored provider line
#[derive(Debug, Clone, Serialize)]
pub struct ScoredLine {
    #[serde(flatten)]
    pub key: StatKey,
    pub name: String,
    pub breakdown: ScoreBreakdown,
    pub total: FantasyPoints,
}

/// Result of scoring a provider stat file
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoreReport {
    pub lines: Vec<ScoredLine>,
    /// Lines that failed normalization, with the reason
    pub rejected: Vec<String>,
}

/// Score every line of a provider JSON array, best first
pub fn score_stats_file(path: &Path) -> Result<ScoreReport> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read stats file: {:?}", path))?;
    let lines: Vec<SportsDataIoStatLine> =
        serde_json::from_str(&json).context("Stats file is not a JSON array of stat lines")?;

    let normalizer = SportsDataIoNormalizer::new();
    let engine = ScoringEngine::new();
    let mut report = ScoreReport::default();
    for line in &lines {
        match normalizer.normalize(line) {
            Ok((key, stats)) => {
                let breakdown = engine.breakdown(&stats);
                report.lines.push(ScoredLine {
                    key,
                    name: line.name.clone(),
                    total: breakdown.total(),
                    breakdown,
                });
            }
            Err(e) => report.rejected.push(e.to_string()),
        }
    }
    report.lines.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.key.cmp(&b.key)));
    Ok(report)
}

/// Long-lived service state for one invocation.
///
/// Mutating operations persist the snapshot to `data_file` once they succeed.
pub struct PickemService {
    config: ServiceConfig,
    store: Arc<InMemoryStore>,
    weeks: Arc<WeekLockRegistry>,
}

impl PickemService {
    /// Open the snapshot named by `data_file`, starting empty if it is absent
    pub fn open(config: ServiceConfig) -> Result<Self> {
        let store = InMemoryStore::open(&config.data_file)
            .with_context(|| format!("Failed to open data file: {:?}", config.data_file))?;
        info!(data_file = ?config.data_file, "Store opened");
        Ok(Self { config, store: Arc::new(store), weeks: Arc::new(WeekLockRegistry::new()) })
    }

    async fn save(&self) -> Result<()> {
        self.store
            .save(&self.config.data_file)
            .await
            .with_context(|| format!("Failed to save data file: {:?}", self.config.data_file))
    }

    fn schedule(&self) -> Result<InMemorySchedule> {
        let path = self
            .config
            .schedule_file
            .as_ref()
            .context("schedule_file is not configured")?;
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schedule file: {:?}", path))?;
        InMemorySchedule::from_json(&json)
            .with_context(|| format!("Failed to parse schedule file: {:?}", path))
    }

    fn lock_coordinator(&self) -> Result<LockCoordinator> {
        Ok(LockCoordinator::new(
            self.store.clone(),
            Arc::new(self.schedule()?),
            self.config.league.rules.clone(),
            self.weeks.clone(),
        ))
    }

    fn backfill_coordinator(&self, provider: Arc<dyn StatsProvider>) -> BackfillCoordinator {
        BackfillCoordinator::new(
            self.store.clone(),
            provider,
            self.weeks.clone(),
            WeeklyScoreAggregator::with_policy(self.config.league.double_pick_policy),
            self.config.backfill.clone(),
        )
    }

    pub async fn submit(
        &self,
        key: &MemberWeekKey,
        proposal: &ProposedPicks,
        now: DateTime<Utc>,
    ) -> Result<PickSet> {
        let stored = self.lock_coordinator()?.submit_picks(key, proposal, now).await?;
        self.save().await?;
        Ok(stored)
    }

    pub async fn lock_due(&self, week: &WeekKey, now: DateTime<Utc>) -> Result<LockSummary> {
        let summary = self.lock_coordinator()?.lock_due(week, now).await?;
        if !summary.locked.is_empty() {
            self.save().await?;
        }
        Ok(summary)
    }

    pub async fn admin_lock(&self, key: &MemberWeekKey, now: DateTime<Utc>) -> Result<PickSet> {
        let locked = self.lock_coordinator()?.admin_lock(key, now).await?;
        self.save().await?;
        Ok(locked)
    }

    pub async fn undo_lock(&self, key: &MemberWeekKey) -> Result<PickSet> {
        let unlocked = self.lock_coordinator()?.undo_lock(key).await?;
        self.save().await?;
        Ok(unlocked)
    }

    /// Rescore a week from a fixture file, or from SportsDataIO when none is given
    pub async fn backfill(&self, week: &WeekKey, stats_file: Option<&Path>) -> Result<BackfillStatus> {
        let provider: Arc<dyn StatsProvider> = match stats_file {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read stats file: {:?}", path))?;
                let provider = InMemoryStatsProvider::new();
                provider.load_week_json(week.season, week.week, &json).await?;
                Arc::new(provider)
            }
            None => Arc::new(
                SportsDataIoProvider::new(self.config.provider.clone())
                    .context("Failed to create SportsDataIO provider")?,
            ),
        };

        let status = self.backfill_coordinator(provider).run_backfill(week).await?;
        if status.changed_members().next().is_some() {
            self.save().await?;
        }
        for report in status.member_errors() {
            warn!(week = %week, member = %report.member, "Member not rescored");
        }
        Ok(status)
    }

    /// Record that a week's result was paid out, freezing it against backfill
    pub async fn mark_payout(&self, key: &MemberWeekKey) -> Result<WeeklyScore> {
        let score = self.store.mark_payout_recorded(key).await?;
        self.save().await?;
        info!(key = %key, total = %score.total_points, "Payout recorded");
        Ok(score)
    }

    pub async fn standings(&self, league: &LeagueId, season: Season) -> Result<Vec<RankedStanding>> {
        let standings = self.store.list_standings(league, season).await?;
        Ok(rank_standings(&standings))
    }
}

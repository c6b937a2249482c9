//! Statistics lookup collaborator

use crate::error::StatsLookupError;
use scoring_engine::{
    GameId, NormalizationError, PlayerGameStatistics, PlayerId, SportsDataIoNormalizer,
    SportsDataIoStatLine, StatKey, StatsNormalizer,
};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Canonical statistics for a (player, game).
///
/// `Ok(None)` means the provider has nothing yet (game not started or not
/// final); callers score that as zero. `Err` is a failure for this key only.
pub trait StatsLookup: Send + Sync {
    fn stats_for(
        &self,
        player_id: &PlayerId,
        game_id: &GameId,
    ) -> Result<Option<PlayerGameStatistics>, StatsLookupError>;
}

/// One week of normalized statistics, keyed by (player, game).
///
/// Records that fail normalization are kept as errors under their key so
/// only the picks that reference them fail.
#[derive(Debug, Clone, Default)]
pub struct WeekStatsTable {
    records: HashMap<StatKey, Result<PlayerGameStatistics, NormalizationError>>,
    skipped: usize,
}

impl WeekStatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a provider batch
    pub fn from_provider_lines(lines: &[SportsDataIoStatLine]) -> Self {
        let normalizer = SportsDataIoNormalizer::new();
        let mut table = Self::new();

        for line in lines {
            match normalizer.normalize(line) {
                Ok((key, stats)) => table.insert(key, stats),
                Err(error) => match (line.player_id, line.game_key.as_deref()) {
                    (Some(player_id), Some(game_key)) if !game_key.trim().is_empty() => {
                        let key = StatKey::new(
                            PlayerId::new(player_id.to_string()),
                            GameId::new(game_key),
                        );
                        warn!(key = %key, %error, "Stat line failed normalization");
                        table.records.insert(key, Err(error));
                    }
                    _ => {
                        warn!(%error, "Skipping stat line without a usable key");
                        table.skipped += 1;
                    }
                },
            }
        }

        debug!(records = table.records.len(), skipped = table.skipped, "Built week stats table");
        table
    }

    pub fn insert(&mut self, key: StatKey, stats: PlayerGameStatistics) {
        self.records.insert(key, Ok(stats));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lines dropped because they carried no player id or game key
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl StatsLookup for WeekStatsTable {
    fn stats_for(
        &self,
        player_id: &PlayerId,
        game_id: &GameId,
    ) -> Result<Option<PlayerGameStatistics>, StatsLookupError> {
        let key = StatKey::new(player_id.clone(), game_id.clone());
        match self.records.get(&key) {
            None => Ok(None),
            Some(Ok(stats)) => Ok(Some(*stats)),
            Some(Err(source)) => Err(StatsLookupError::Malformed {
                player_id: player_id.clone(),
                game_id: game_id.clone(),
                source: source.clone(),
            }),
        }
    }
}

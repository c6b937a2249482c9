//! Statistics provider collaborator

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::models::{Season, Week};
use crate::normalizer::SportsDataIoStatLine;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Source of raw per-player, per-game statistics.
///
/// May return partial lines for games still in progress. A week the provider
/// has no record of at all is `ProviderError::WeekNotAvailable`.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    async fn fetch_week(
        &self,
        season: Season,
        week: Week,
    ) -> Result<Vec<SportsDataIoStatLine>, ProviderError>;
}

/// SportsDataIO `PlayerGameStatsByWeek` client
pub struct SportsDataIoProvider {
    config: ProviderConfig,
    client: Client,
    api_key: String,
}

impl SportsDataIoProvider {
    /// Create a provider, reading the API key from the configured variable
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config.api_key()?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: ProviderConfig, api_key: String) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;

        Ok(Self { config, client, api_key })
    }

    fn week_url(&self, season: Season, week: Week) -> String {
        format!(
            "{}/stats/json/PlayerGameStatsByWeek/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.season_segment(season),
            week
        )
    }
}

#[async_trait]
impl StatsProvider for SportsDataIoProvider {
    async fn fetch_week(
        &self,
        season: Season,
        week: Week,
    ) -> Result<Vec<SportsDataIoStatLine>, ProviderError> {
        let url = self.week_url(season, week);
        info!(season, week, "Fetching player game stats from {}", url);

        let response = self.client.get(&url).query(&[("key", &self.api_key)]).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::WeekNotAvailable { season, week });
        }
        if !status.is_success() {
            return Err(ProviderError::Status { status: status.as_u16(), endpoint: url });
        }

        let lines: Vec<SportsDataIoStatLine> = response.json().await?;

        info!(season, week, "Fetched {} player game stat lines", lines.len());
        Ok(lines)
    }
}

/// In-memory provider serving fixture stat lines
#[derive(Default)]
pub struct InMemoryStatsProvider {
    weeks: RwLock<HashMap<(Season, Week), Vec<SportsDataIoStatLine>>>,
}

impl InMemoryStatsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every line for a week
    pub async fn set_week(&self, season: Season, week: Week, lines: Vec<SportsDataIoStatLine>) {
        self.weeks.write().await.insert((season, week), lines);
    }

    /// Insert or correct the line for one player-game
    pub async fn upsert_line(&self, season: Season, week: Week, line: SportsDataIoStatLine) {
        let mut weeks = self.weeks.write().await;
        let lines = weeks.entry((season, week)).or_default();
        match lines
            .iter_mut()
            .find(|l| l.player_id == line.player_id && l.game_key == line.game_key)
        {
            Some(existing) => *existing = line,
            None => lines.push(line),
        }
    }

    /// Forget a week entirely
    pub async fn remove_week(&self, season: Season, week: Week) {
        self.weeks.write().await.remove(&(season, week));
    }

    /// Load a week from a JSON array of provider records
    pub async fn load_week_json(
        &self,
        season: Season,
        week: Week,
        json: &str,
    ) -> Result<usize, ProviderError> {
        let lines: Vec<SportsDataIoStatLine> = serde_json::from_str(json)?;
        let count = lines.len();
        self.set_week(season, week, lines).await;
        debug!(season, week, count, "Loaded fixture stat lines");
        Ok(count)
    }
}

#[async_trait]
impl StatsProvider for InMemoryStatsProvider {
    async fn fetch_week(
        &self,
        season: Season,
        week: Week,
    ) -> Result<Vec<SportsDataIoStatLine>, ProviderError> {
        self.weeks
            .read()
            .await
            .get(&(season, week))
            .cloned()
            .ok_or(ProviderError::WeekNotAvailable { season, week })
    }
}

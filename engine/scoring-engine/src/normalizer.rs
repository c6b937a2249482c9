//! Provider-specific stat lines to canonical statistics

use crate::error::NormalizationError;
use crate::models::{GameId, PlayerGameStatistics, PlayerId, StatKey};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// SportsDataIO `PlayerGameStatsByWeek` record.
///
/// Only the fields the scoring formula needs are mapped; everything else in
/// the payload is ignored. Numeric fields arrive as JSON floats and may be
/// null for games that have not kicked off.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SportsDataIoStatLine {
    #[serde(rename = "PlayerID")]
    pub player_id: Option<i64>,

    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Position", default)]
    pub position: String,

    #[serde(rename = "Team", default)]
    pub team: String,

    #[serde(rename = "GameKey")]
    pub game_key: Option<String>,

    #[serde(rename = "Week")]
    pub week: Option<i32>,

    #[serde(rename = "IsGameOver")]
    pub is_game_over: Option<bool>,

    #[serde(rename = "PassingYards")]
    pub passing_yards: Option<f64>,

    #[serde(rename = "PassingTouchdowns")]
    pub passing_touchdowns: Option<f64>,

    #[serde(rename = "PassingInterceptions")]
    pub passing_interceptions: Option<f64>,

    #[serde(rename = "RushingYards")]
    pub rushing_yards: Option<f64>,

    #[serde(rename = "RushingTouchdowns")]
    pub rushing_touchdowns: Option<f64>,

    #[serde(rename = "ReceivingYards")]
    pub receiving_yards: Option<f64>,

    #[serde(rename = "ReceivingTouchdowns")]
    pub receiving_touchdowns: Option<f64>,

    #[serde(rename = "Receptions")]
    pub receptions: Option<f64>,

    #[serde(rename = "FumblesLost")]
    pub fumbles_lost: Option<f64>,

    #[serde(rename = "TwoPointConversionPasses")]
    pub two_point_conversion_passes: Option<f64>,

    #[serde(rename = "TwoPointConversionRuns")]
    pub two_point_conversion_runs: Option<f64>,

    #[serde(rename = "TwoPointConversionReceptions")]
    pub two_point_conversion_receptions: Option<f64>,

    #[serde(rename = "FumbleReturnTouchdowns")]
    pub fumble_return_touchdowns: Option<f64>,
}

/// Adapter from a provider record shape to [`PlayerGameStatistics`]
pub trait StatsNormalizer {
    type Raw;

    /// Canonical key and statistics for one provider record
    fn normalize(
        &self,
        raw: &Self::Raw,
    ) -> Result<(StatKey, PlayerGameStatistics), NormalizationError>;
}

/// Normalizer for SportsDataIO stat lines
#[derive(Debug, Clone, Copy, Default)]
pub struct SportsDataIoNormalizer;

impl SportsDataIoNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl StatsNormalizer for SportsDataIoNormalizer {
    type Raw = SportsDataIoStatLine;

    fn normalize(
        &self,
        raw: &SportsDataIoStatLine,
    ) -> Result<(StatKey, PlayerGameStatistics), NormalizationError> {
        let player_id = raw
            .player_id
            .map(|id| PlayerId::new(id.to_string()))
            .ok_or_else(|| NormalizationError::MissingPlayerId { name: raw.name.clone() })?;

        let game_id = raw
            .game_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .map(GameId::new)
            .ok_or_else(|| NormalizationError::MissingGameKey {
                player_id: player_id.to_string(),
            })?;

        let yards = |field: &'static str, value: Option<f64>| yards_value(&player_id, field, value);
        let count = |field: &'static str, value: Option<f64>| count_value(&player_id, field, value);

        let two_point_conversions = [
            count("TwoPointConversionPasses", raw.two_point_conversion_passes)?,
            count("TwoPointConversionRuns", raw.two_point_conversion_runs)?,
            count("TwoPointConversionReceptions", raw.two_point_conversion_receptions)?,
        ]
        .into_iter()
        .try_fold(0u32, u32::checked_add)
        .ok_or_else(|| NormalizationError::Overflow {
            player_id: player_id.to_string(),
            field: "TwoPointConversions",
        })?;

        let stats = PlayerGameStatistics {
            passing_yards: yards("PassingYards", raw.passing_yards)?,
            passing_touchdowns: count("PassingTouchdowns", raw.passing_touchdowns)?,
            interceptions: count("PassingInterceptions", raw.passing_interceptions)?,
            rushing_yards: yards("RushingYards", raw.rushing_yards)?,
            rushing_touchdowns: count("RushingTouchdowns", raw.rushing_touchdowns)?,
            receiving_yards: yards("ReceivingYards", raw.receiving_yards)?,
            receiving_touchdowns: count("ReceivingTouchdowns", raw.receiving_touchdowns)?,
            receptions: count("Receptions", raw.receptions)?,
            fumbles_lost: count("FumblesLost", raw.fumbles_lost)?,
            two_point_conversions,
            offensive_fumble_recovery_touchdowns: count(
                "FumbleReturnTouchdowns",
                raw.fumble_return_touchdowns,
            )?,
        };

        Ok((StatKey::new(player_id, game_id), stats))
    }
}

fn finite(
    player_id: &PlayerId,
    field: &'static str,
    value: Option<f64>,
) -> Result<f64, NormalizationError> {
    match value {
        None => Ok(0.0),
        Some(v) if v.is_finite() => Ok(v.round()),
        Some(_) => {
            Err(NormalizationError::NonFiniteValue { player_id: player_id.to_string(), field })
        }
    }
}

fn yards_value(
    player_id: &PlayerId,
    field: &'static str,
    value: Option<f64>,
) -> Result<i32, NormalizationError> {
    let v = finite(player_id, field, value)?;
    Ok(v.clamp(i32::MIN as f64, i32::MAX as f64) as i32)
}

fn count_value(
    player_id: &PlayerId,
    field: &'static str,
    value: Option<f64>,
) -> Result<u32, NormalizationError> {
    let v = finite(player_id, field, value)?;
    if v < 0.0 {
        warn!(player_id = %player_id, field, value = v, "Negative count clamped to zero");
        return Ok(0);
    }
    Ok(v.min(u32::MAX as f64) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(json: serde_json::Value) -> SportsDataIoStatLine {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_normalize_full_line() {
        let raw = line(serde_json::json!({
            "PlayerID": 19801,
            "Name": "Josh Allen",
            "Position": "QB",
            "Team": "BUF",
            "GameKey": "202510104",
            "Week": 4,
            "PassingYards": 320.0,
            "PassingTouchdowns": 2.0,
            "PassingInterceptions": 1.0,
            "RushingYards": 41.0,
            "RushingTouchdowns": 1.0,
            "TwoPointConversionRuns": 1.0,
            "FantasyPointsPPR": 31.9
        }));

        let (key, stats) = SportsDataIoNormalizer::new().normalize(&raw).unwrap();
        assert_eq!(key.player_id, PlayerId::new("19801"));
        assert_eq!(key.game_id, GameId::new("202510104"));
        assert_eq!(stats.passing_yards, 320);
        assert_eq!(stats.passing_touchdowns, 2);
        assert_eq!(stats.interceptions, 1);
        assert_eq!(stats.rushing_yards, 41);
        assert_eq!(stats.rushing_touchdowns, 1);
        assert_eq!(stats.two_point_conversions, 1);
        assert_eq!(stats.receptions, 0);
    }

    #[test]
    fn test_absent_values_are_zero() {
        let raw = line(serde_json::json!({
            "PlayerID": 1,
            "GameKey": "g1",
            "PassingYards": null
        }));
        let (_, stats) = SportsDataIoNormalizer::new().normalize(&raw).unwrap();
        assert!(stats.is_zero());
    }

    #[test]
    fn test_negative_yards_kept_negative_counts_clamped() {
        let raw = line(serde_json::json!({
            "PlayerID": 2,
            "GameKey": "g1",
            "RushingYards": -4.0,
            "Receptions": -1.0
        }));
        let (_, stats) = SportsDataIoNormalizer::new().normalize(&raw).unwrap();
        assert_eq!(stats.rushing_yards, -4);
        assert_eq!(stats.receptions, 0);
    }

    #[test]
    fn test_missing_keys_rejected() {
        let normalizer = SportsDataIoNormalizer::new();

        let no_player = line(serde_json::json!({ "Name": "Unknown", "GameKey": "g1" }));
        assert_eq!(
            normalizer.normalize(&no_player).unwrap_err(),
            NormalizationError::MissingPlayerId { name: "Unknown".to_string() }
        );

        let no_game = line(serde_json::json!({ "PlayerID": 7, "GameKey": "  " }));
        assert_eq!(
            normalizer.normalize(&no_game).unwrap_err(),
            NormalizationError::MissingGameKey { player_id: "7".to_string() }
        );
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let raw = SportsDataIoStatLine {
            player_id: Some(3),
            game_key: Some("g1".to_string()),
            receiving_yards: Some(f64::NAN),
            ..Default::default()
        };
        assert!(matches!(
            SportsDataIoNormalizer::new().normalize(&raw),
            Err(NormalizationError::NonFiniteValue { field: "ReceivingYards", .. })
        ));
    }

    #[test]
    fn test_two_point_total_overflow_rejected() {
        let raw = SportsDataIoStatLine {
            player_id: Some(3),
            game_key: Some("g1".to_string()),
            two_point_conversion_passes: Some(4.0e9),
            two_point_conversion_runs: Some(4.0e9),
            ..Default::default()
        };
        assert_eq!(
            SportsDataIoNormalizer::new().normalize(&raw).unwrap_err(),
            NormalizationError::Overflow {
                player_id: "3".to_string(),
                field: "TwoPointConversions"
            }
        );
    }
}

use pick_ledger::LeagueRules;
use serde::{Deserialize, Serialize};
use standings::DoublePickPolicy;

/// League-level settings: pick rules plus the double-pick adjustment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    #[serde(flatten)]
    pub rules: LeagueRules,

    pub double_pick_policy: DoublePickPolicy,
}

/// Backfill tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackfillConfig {
    /// Members rescored concurrently within one week
    pub max_concurrent_members: usize,

    /// Leave weekly scores with a recorded payout untouched
    pub respect_payout_freeze: bool,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self { max_concurrent_members: 8, respect_payout_freeze: true }
    }
}

impl BackfillConfig {
    /// Worker count, never below one
    pub fn workers(&self) -> usize {
        self.max_concurrent_members.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pick_ledger::Position;

    #[test]
    fn test_league_config_flattens_rules() {
        let config: LeagueConfig = serde_json::from_str(
            r#"{"max_players_per_team": 2, "double_pick_positions": ["RB"], "double_pick_policy": "best_of_pair"}"#,
        )
        .unwrap();
        assert_eq!(config.rules.max_players_per_team, Some(2));
        assert!(config.rules.allows_double_pick(Position::RunningBack));
        assert_eq!(config.double_pick_policy, DoublePickPolicy::BestOfPair);
    }

    #[test]
    fn test_backfill_defaults() {
        let config = BackfillConfig::default();
        assert_eq!(config.workers(), 8);
        assert!(config.respect_payout_freeze);
        assert_eq!(BackfillConfig { max_concurrent_members: 0, ..config }.workers(), 1);
    }
}

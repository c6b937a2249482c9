//! Service configuration management

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use league_coordinator::{BackfillConfig, LeagueConfig};
use scoring_engine::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix of environment overrides, e.g. `PICKEM_BACKFILL__MAX_CONCURRENT_MEMBERS`
pub const ENV_PREFIX: &str = "PICKEM";

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Pick rules and double-pick policy
    pub league: LeagueConfig,

    /// Backfill worker pool and payout freeze
    pub backfill: BackfillConfig,

    /// SportsDataIO client settings
    pub provider: ProviderConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// JSON snapshot holding picks, usage, scores and standings
    pub data_file: PathBuf,

    /// JSON roster and game schedule; needed by `submit` and `lock`
    pub schedule_file: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    pub level: String,

    /// Log format (pretty, compact, json)
    pub format: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            league: LeagueConfig::default(),
            backfill: BackfillConfig::default(),
            provider: ProviderConfig::default(),
            logging: LoggingConfig::default(),
            data_file: PathBuf::from("./data/pickem.json"),
            schedule_file: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl ServiceConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => bail!("Invalid log level: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" | "json" => {}
            _ => bail!("Invalid log format: {}", self.logging.format),
        }

        if self.backfill.max_concurrent_members == 0 {
            bail!("backfill.max_concurrent_members must be at least 1");
        }

        if self.data_file.as_os_str().is_empty() {
            bail!("data_file must not be empty");
        }

        if self.provider.timeout_secs == 0 {
            bail!("provider.timeout_secs must be at least 1");
        }

        Ok(())
    }
}

/// Load configuration: defaults, then the TOML file if given, then
/// `PICKEM_` environment variables (`__` separates nested keys)
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let defaults =
        Config::try_from(&ServiceConfig::default()).context("Failed to encode default config")?;
    let mut builder = Config::builder().add_source(defaults);

    if let Some(path) = path {
        tracing::debug!("Loading configuration from file: {:?}", path);
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX).prefix_separator("_").separator("__").try_parsing(true),
    );

    let config: ServiceConfig = builder
        .build()
        .context("Failed to read configuration sources")?
        .try_deserialize()
        .context("Failed to decode configuration")?;

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pick_ledger::Position;
    use standings::DoublePickPolicy;
    use std::io::Write;

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.backfill.workers(), 8);
        assert!(config.schedule_file.is_none());
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(config.league.rules.allow_cross_position_reuse);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = write_toml(
            r#"
data_file = "/tmp/league.json"

[league]
max_players_per_team = 2
double_pick_positions = ["RB"]
double_pick_policy = "best_of_pair"

[backfill]
max_concurrent_members = 3
respect_payout_freeze = false

[logging]
format = "json"
"#,
        );

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.data_file, PathBuf::from("/tmp/league.json"));
        assert_eq!(config.league.rules.max_players_per_team, Some(2));
        assert!(config.league.rules.allows_double_pick(Position::RunningBack));
        assert_eq!(config.league.double_pick_policy, DoublePickPolicy::BestOfPair);
        assert_eq!(config.backfill.workers(), 3);
        assert!(!config.backfill.respect_payout_freeze);
        assert_eq!(config.logging.format, "json");
        // untouched keys keep their defaults
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.provider.season_type, "REG");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_toml("[logging]\nlevel = \"loud\"\n");
        assert!(load_config(Some(file.path())).is_err());

        let config = ServiceConfig {
            backfill: BackfillConfig { max_concurrent_members: 0, ..Default::default() },
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ServiceConfig {
            logging: LoggingConfig { format: "xml".to_string(), ..Default::default() },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
    }
}

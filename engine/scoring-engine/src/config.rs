use serde::{Deserialize, Serialize};

/// Configuration for the SportsDataIO statistics provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API base URL
    pub base_url: String,

    /// Environment variable holding the live stats API key
    pub api_key_env: String,

    /// Season type suffix appended to the season year (e.g. "REG")
    pub season_type: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.sportsdata.io/v3/nfl".to_string(),
            api_key_env: "SPORTS_DATA_IO_LIVE_STATS_KEY".to_string(),
            season_type: "REG".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    /// Get the live stats API key from the environment
    pub fn api_key(&self) -> Result<String, crate::ProviderError> {
        std::env::var(&self.api_key_env).map_err(|_| {
            crate::ProviderError::InvalidConfig(format!(
                "SportsDataIO API key not found in {}",
                self.api_key_env
            ))
        })
    }

    /// Season path segment, e.g. `2025REG`
    pub fn season_segment(&self, season: u16) -> String {
        format!("{}{}", season, self.season_type)
    }
}

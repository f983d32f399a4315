//! Environment configuration

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_COLLABORATOR_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_SUMMARY_MODEL: &str = "gpt-4o";
const DEFAULT_DRUG_SEARCH_URL: &str = "https://www.pmda.go.jp/PmdaSearch/iyakuSearch/GeneralList";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

/// Bot configuration, read once at startup
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Secret used to verify webhook signatures
    pub channel_secret: String,
    /// Token for the reply API. Replies are logged and dropped when unset.
    pub channel_access_token: Option<String>,
    pub google_maps_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub summary_model: String,
    /// Replace the plain facility list with a generated recommendation
    pub facility_summary: bool,
    pub drug_search_url: String,
    pub port: u16,
    pub db_path: String,
    /// Upper bound on any single collaborator call
    pub collaborator_timeout: Duration,
}

/// Load a `.env` file from the working directory or its parents, if any.
/// Variables already set in the environment win.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` uses the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let channel_secret =
            non_empty("LINE_CHANNEL_SECRET").ok_or(ConfigError::Missing("LINE_CHANNEL_SECRET"))?;

        let db_path = non_empty("CLINIC_BOT_DB_PATH").unwrap_or_else(|| {
            let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
            format!("{home}/.clinic-bot/history.db")
        });

        let port = non_empty("CLINIC_BOT_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let collaborator_timeout = non_empty("COLLABORATOR_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map_or(DEFAULT_COLLABORATOR_TIMEOUT, Duration::from_secs);

        let facility_summary = non_empty("FACILITY_SUMMARY")
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        Ok(Self {
            channel_secret,
            channel_access_token: non_empty("LINE_CHANNEL_ACCESS_TOKEN"),
            google_maps_api_key: non_empty("GOOGLE_MAPS_API_KEY"),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            summary_model: non_empty("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_SUMMARY_MODEL.to_string()),
            facility_summary,
            drug_search_url: non_empty("DRUG_SEARCH_URL")
                .unwrap_or_else(|| DEFAULT_DRUG_SEARCH_URL.to_string()),
            port,
            db_path,
            collaborator_timeout,
        })
    }
}

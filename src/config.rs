//! Environment-derived configuration.
//!
//! Three variables are required (`NOTION_API_KEY`, `NOTION_DATABASE_ID`,
//! `SLACK_WEBHOOK_URL`); loading collects *every* missing name before
//! failing so the operator sees the full list at once. Everything else
//! has a sensible default.

use crate::error::{BriefError, Result};
use std::path::PathBuf;

/// Required: Notion integration token (bearer auth).
pub const ENV_NOTION_API_KEY: &str = "NOTION_API_KEY";
/// Required: ID of the Notion database to query.
pub const ENV_NOTION_DATABASE_ID: &str = "NOTION_DATABASE_ID";
/// Required: Slack incoming-webhook URL.
pub const ENV_SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";

/// Optional: Notion API base URL override (used by tests against a mock).
pub const ENV_NOTION_BASE_URL: &str = "NOTION_BASE_URL";
/// Optional: hour (0-23, local) at which the evening period begins.
pub const ENV_EVENING_HOUR: &str = "TASKBRIEF_EVENING_HOUR";
/// Optional: UTC offset in hours for the civil time zone.
pub const ENV_UTC_OFFSET: &str = "TASKBRIEF_UTC_OFFSET";
/// Optional: outbound HTTP timeout in seconds.
pub const ENV_HTTP_TIMEOUT: &str = "TASKBRIEF_HTTP_TIMEOUT_SECS";
/// Optional: send-state file path override.
pub const ENV_STATE_PATH: &str = "TASKBRIEF_STATE_PATH";

/// Hour at which the evening period begins when unconfigured.
///
/// Historical deployments disagreed on this boundary (12 in one entry
/// point, 15 in the other), so it is configuration rather than a
/// constant baked into the period logic.
pub const DEFAULT_EVENING_HOUR: u32 = 15;

/// Default civil time zone, expressed as hours east of UTC (JST).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

/// Default outbound HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration for the digest pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Notion integration token.
    pub notion_api_key: String,
    /// Notion database ID.
    pub notion_database_id: String,
    /// Slack incoming-webhook URL.
    pub slack_webhook_url: String,
    /// Notion API base URL (no trailing slash).
    pub notion_base_url: String,
    /// Hour (0-23, local time) at which the evening period begins.
    pub evening_hour: u32,
    /// Civil time zone as hours east of UTC.
    pub utc_offset_hours: i32,
    /// Outbound HTTP request timeout in seconds.
    pub timeout_seconds: u64,
    /// Path of the send-state marker file.
    pub state_path: PathBuf,
}

impl Config {
    /// Load configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`BriefError::Config`] naming every missing required
    /// variable, or an invalid optional value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// The seam exists so tests can exercise missing-variable handling
    /// without mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |name: &str| -> String {
            match lookup(name).filter(|v| !v.trim().is_empty()) {
                Some(v) => v,
                None => {
                    missing.push(name.to_owned());
                    String::new()
                }
            }
        };

        let notion_api_key = required(ENV_NOTION_API_KEY);
        let notion_database_id = required(ENV_NOTION_DATABASE_ID);
        let slack_webhook_url = required(ENV_SLACK_WEBHOOK_URL);

        if !missing.is_empty() {
            return Err(BriefError::Config(missing));
        }

        let config = Self {
            notion_api_key,
            notion_database_id,
            slack_webhook_url,
            notion_base_url: lookup(ENV_NOTION_BASE_URL)
                .map(|u| u.trim_end_matches('/').to_owned())
                .unwrap_or_else(|| "https://api.notion.com".to_owned()),
            evening_hour: parse_or(&lookup, ENV_EVENING_HOUR, DEFAULT_EVENING_HOUR)?,
            utc_offset_hours: parse_or(&lookup, ENV_UTC_OFFSET, DEFAULT_UTC_OFFSET_HOURS)?,
            timeout_seconds: parse_or(&lookup, ENV_HTTP_TIMEOUT, DEFAULT_TIMEOUT_SECS)?,
            state_path: lookup(ENV_STATE_PATH)
                .map(PathBuf::from)
                .or_else(default_state_path)
                .unwrap_or_else(|| PathBuf::from("taskbrief-sent.json")),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates numeric ranges, returning an error if any field is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.evening_hour > 23 {
            return Err(BriefError::Config(vec![format!(
                "{ENV_EVENING_HOUR} must be 0-23"
            )]));
        }
        if !(-23..=23).contains(&self.utc_offset_hours) {
            return Err(BriefError::Config(vec![format!(
                "{ENV_UTC_OFFSET} must be between -23 and 23"
            )]));
        }
        if self.timeout_seconds == 0 {
            return Err(BriefError::Config(vec![format!(
                "{ENV_HTTP_TIMEOUT} must be greater than 0"
            )]));
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| BriefError::Config(vec![format!("{name} has invalid value '{raw}'")])),
        None => Ok(default),
    }
}

/// Default send-state path (`~/.local/state/taskbrief/sent.json` on Linux).
fn default_state_path() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|d| d.join("taskbrief").join("sent.json"))
}

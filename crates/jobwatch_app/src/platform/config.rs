//! Process configuration, read once from the environment at startup.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use jobwatch_engine::{RunSettings, TimeWindow, DEFAULT_QUERY, DEFAULT_STATE_FILE};
use jobwatch_logging::mask_secret;
use thiserror::Error;

pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const NTFY_TOPIC: &str = "NTFY_TOPIC";
pub const GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
pub const QUERY: &str = "JOBWATCH_QUERY";
pub const WINDOW: &str = "JOBWATCH_WINDOW";
pub const STATE_FILE: &str = "JOBWATCH_STATE_FILE";
pub const FETCH_DELAY_MS: &str = "JOBWATCH_FETCH_DELAY_MS";
pub const LOG_FILE: &str = "JOBWATCH_LOG_FILE";

const DEFAULT_FETCH_DELAY_MS: u64 = 1_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("{key} has invalid value {value:?}: expected {expected}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Clone)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub ntfy_topic: String,
    /// `owner/name` of the hosting repository; may be empty.
    pub repository: String,
    pub query: String,
    pub window: TimeWindow,
    pub state_file: PathBuf,
    pub fetch_delay: Duration,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    /// Reads the process environment, after loading `.env` when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let gemini_api_key = require(GEMINI_API_KEY)?;
        let ntfy_topic = require(NTFY_TOPIC)?;

        let window = match get(WINDOW) {
            None => TimeWindow::default(),
            Some(value) => parse_window(&value).ok_or(ConfigError::Invalid {
                key: WINDOW,
                value,
                expected: "day, week or month",
            })?,
        };

        let fetch_delay = match get(FETCH_DELAY_MS) {
            None => Duration::from_millis(DEFAULT_FETCH_DELAY_MS),
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::Invalid {
                    key: FETCH_DELAY_MS,
                    value,
                    expected: "a whole number of milliseconds",
                })?,
        };

        Ok(Self {
            gemini_api_key,
            ntfy_topic,
            repository: get(GITHUB_REPOSITORY).unwrap_or_default(),
            query: get(QUERY).unwrap_or_else(|| DEFAULT_QUERY.to_string()),
            window,
            state_file: get(STATE_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
            fetch_delay,
            log_file: get(LOG_FILE).map(PathBuf::from),
        })
    }

    /// Page shown when a run found nothing: the repository's workflow runs.
    pub fn dashboard_link(&self) -> String {
        format!("https://github.com/{}/actions", self.repository)
    }

    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            query: self.query.clone(),
            window: self.window,
            fetch_delay: self.fetch_delay,
            dashboard_link: self.dashboard_link(),
        }
    }
}

// Credentials stay masked wherever the config is logged.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("gemini_api_key", &mask_secret(&self.gemini_api_key))
            .field("ntfy_topic", &mask_secret(&self.ntfy_topic))
            .field("repository", &self.repository)
            .field("query", &self.query)
            .field("window", &self.window)
            .field("state_file", &self.state_file)
            .field("fetch_delay", &self.fetch_delay)
            .field("log_file", &self.log_file)
            .finish()
    }
}

fn parse_window(value: &str) -> Option<TimeWindow> {
    match value.trim().to_ascii_lowercase().as_str() {
        "day" | "d" => Some(TimeWindow::PastDay),
        "week" | "w" => Some(TimeWindow::PastWeek),
        "month" | "m" => Some(TimeWindow::PastMonth),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [(GEMINI_API_KEY, "AIzaSyExampleKey"), (NTFY_TOPIC, "fresher-jobs")];

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let config = config_from(&REQUIRED).unwrap();
        assert_eq!(config.repository, "");
        assert_eq!(config.dashboard_link(), "https://github.com//actions");
        assert_eq!(config.query, DEFAULT_QUERY);
        assert_eq!(config.window, TimeWindow::PastWeek);
        assert_eq!(config.state_file, PathBuf::from("processed_jobs.json"));
        assert_eq!(config.fetch_delay, Duration::from_secs(1));
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn missing_or_blank_credentials_are_rejected() {
        assert_eq!(
            config_from(&[(NTFY_TOPIC, "t")]).unwrap_err(),
            ConfigError::Missing(GEMINI_API_KEY)
        );
        assert_eq!(
            config_from(&[(GEMINI_API_KEY, "k"), (NTFY_TOPIC, "  ")]).unwrap_err(),
            ConfigError::Missing(NTFY_TOPIC)
        );
    }

    #[test]
    fn overrides_are_applied() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            (GITHUB_REPOSITORY, "acme/jobs"),
            (QUERY, "graduate developer Pune"),
            (WINDOW, "Month"),
            (STATE_FILE, "state/seen.json"),
            (FETCH_DELAY_MS, "0"),
            (LOG_FILE, "jobwatch.log"),
        ]);
        let config = config_from(&pairs).unwrap();

        assert_eq!(config.dashboard_link(), "https://github.com/acme/jobs/actions");
        let settings = config.run_settings();
        assert_eq!(settings.query, "graduate developer Pune");
        assert_eq!(settings.window, TimeWindow::PastMonth);
        assert_eq!(settings.fetch_delay, Duration::ZERO);
        assert_eq!(settings.dashboard_link, "https://github.com/acme/jobs/actions");
        assert_eq!(config.state_file, PathBuf::from("state/seen.json"));
        assert_eq!(config.log_file, Some(PathBuf::from("jobwatch.log")));
    }

    #[test]
    fn invalid_window_and_delay_are_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push((WINDOW, "fortnight"));
        assert!(matches!(
            config_from(&pairs).unwrap_err(),
            ConfigError::Invalid { key: WINDOW, .. }
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push((FETCH_DELAY_MS, "-5"));
        assert!(matches!(
            config_from(&pairs).unwrap_err(),
            ConfigError::Invalid { key: FETCH_DELAY_MS, .. }
        ));
    }

    #[test]
    fn debug_output_masks_credentials() {
        let rendered = format!("{:?}", config_from(&REQUIRED).unwrap());
        assert!(!rendered.contains("AIzaSyExampleKey"));
        assert!(!rendered.contains("fresher-jobs"));
        assert!(rendered.contains("AIza****"));
    }
}

//! Startup configuration from the environment and stored settings.

use std::time::Duration;

use simplelog::LevelFilter;

use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_API_URL: &str = "TRIMTOOL_API_URL";
pub const ENV_TIMEOUT: &str = "TRIMTOOL_TIMEOUT_SECS";
pub const ENV_LOG: &str = "TRIMTOOL_LOG";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
    /// Whether `api_url` came from the environment rather than settings.
    pub api_url_from_env: bool,
}

impl Config {
    /// Resolve against the process environment.
    pub fn from_env(stored_url: Option<String>) -> Result<Self, AppError> {
        Self::resolve(|name| std::env::var(name).ok(), stored_url)
    }

    /// Precedence: environment, then the stored URL, then the default.
    pub fn resolve(
        env: impl Fn(&str) -> Option<String>,
        stored_url: Option<String>,
    ) -> Result<Self, AppError> {
        let env_url = env(ENV_API_URL).filter(|v| !v.trim().is_empty());
        let api_url_from_env = env_url.is_some();
        let raw_url = env_url
            .or(stored_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = trimtool_lib::validate_base_url(&raw_url)
            .map_err(|e| AppError::Config(e.to_string()))?;

        let timeout = match env(ENV_TIMEOUT) {
            None => DEFAULT_TIMEOUT,
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    AppError::Config(format!("{} must be a positive number of seconds, got {:?}", ENV_TIMEOUT, raw))
                })?,
        };

        Ok(Self {
            api_url,
            timeout,
            api_url_from_env,
        })
    }
}

/// Log level from `TRIMTOOL_LOG`; unknown values fall back to `Info`.
pub fn log_level() -> LevelFilter {
    parse_log_level(std::env::var(ENV_LOG).ok().as_deref())
}

fn parse_log_level(raw: Option<&str>) -> LevelFilter {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("off") => LevelFilter::Off,
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::resolve(env(&[]), None).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(!config.api_url_from_env);
    }

    #[test]
    fn test_env_overrides_stored_url() {
        let stored = Some("http://stored:9000".to_string());
        let config = Config::resolve(env(&[]), stored.clone()).unwrap();
        assert_eq!(config.api_url, "http://stored:9000");

        let config = Config::resolve(
            env(&[(ENV_API_URL, "https://trims.internal/"), (ENV_TIMEOUT, "5")]),
            stored,
        )
        .unwrap();
        assert_eq!(config.api_url, "https://trims.internal");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.api_url_from_env);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        assert!(matches!(
            Config::resolve(env(&[(ENV_API_URL, "ftp://nope")]), None),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            Config::resolve(env(&[(ENV_TIMEOUT, "0")]), None),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            Config::resolve(env(&[(ENV_TIMEOUT, "soon")]), None),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_log_level() {
        assert_eq!(parse_log_level(None), LevelFilter::Info);
        assert_eq!(parse_log_level(Some("DEBUG")), LevelFilter::Debug);
        assert_eq!(parse_log_level(Some("warn")), LevelFilter::Warn);
        assert_eq!(parse_log_level(Some("loud")), LevelFilter::Info);
    }
}

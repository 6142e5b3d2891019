use anyhow::{Context, Result};
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the analysis service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }
}

impl ServiceSettings {
    pub const BASE_URL_ENV: &'static str = "ARTICLE_RISK_BASE_URL";
    pub const TIMEOUT_ENV: &'static str = "ARTICLE_RISK_TIMEOUT";
    pub const USER_AGENT_ENV: &'static str = "ARTICLE_RISK_USER_AGENT";

    /// Load settings from environment variables.
    ///
    /// * `ARTICLE_RISK_BASE_URL`   — Service origin (default: `http://localhost:8000`).
    /// * `ARTICLE_RISK_TIMEOUT`    — Request timeout such as `30s` or `2m` (default: 30s).
    /// * `ARTICLE_RISK_USER_AGENT` — Optional User-Agent override.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Override fields of `self` with any of the variables above that are set.
    pub fn with_env(self) -> Result<Self> {
        self.overlay(&std::env::vars().collect())
    }

    #[cfg(test)]
    fn from_map(vars: HashMap<String, String>) -> Result<Self> {
        Self::default().overlay(&vars)
    }

    fn overlay(mut self, vars: &HashMap<String, String>) -> Result<Self> {
        let non_blank = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(base_url) = non_blank(Self::BASE_URL_ENV) {
            self.base_url = base_url;
        }
        if let Some(raw) = non_blank(Self::TIMEOUT_ENV) {
            self.timeout = parse_timeout(&raw)
                .with_context(|| format!("invalid {} value `{raw}`", Self::TIMEOUT_ENV))?;
        }
        if let Some(user_agent) = non_blank(Self::USER_AGENT_ENV) {
            self.user_agent = Some(user_agent);
        }
        Ok(self)
    }

    /// Full URL of the analyze endpoint for these settings.
    pub fn analyze_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            super::ANALYZE_PATH
        )
    }
}

/// Parse a humantime duration (`30s`, `1m 30s`) or a bare number of seconds.
pub fn parse_timeout(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    Ok(humantime::parse_duration(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_unset() {
        let settings = ServiceSettings::from_map(HashMap::new()).expect("defaults load");
        assert_eq!(settings, ServiceSettings::default());
        assert_eq!(
            settings.analyze_url(),
            "http://localhost:8000/api/v1/analyze"
        );
    }

    #[test]
    fn reads_overrides() {
        let settings = ServiceSettings::from_map(vars(&[
            (ServiceSettings::BASE_URL_ENV, "https://news.example/"),
            (ServiceSettings::TIMEOUT_ENV, "1m 30s"),
            (ServiceSettings::USER_AGENT_ENV, "newsroom/2"),
        ]))
        .expect("settings load");
        assert_eq!(settings.analyze_url(), "https://news.example/api/v1/analyze");
        assert_eq!(settings.timeout, Duration::from_secs(90));
        assert_eq!(settings.user_agent.as_deref(), Some("newsroom/2"));
    }

    #[test]
    fn bare_seconds_are_accepted() {
        let settings =
            ServiceSettings::from_map(vars(&[(ServiceSettings::TIMEOUT_ENV, "45")])).unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(45));
    }

    #[test]
    fn environment_overrides_only_what_is_set() {
        let base = ServiceSettings {
            base_url: "https://from-file.example".into(),
            timeout: Duration::from_secs(5),
            user_agent: None,
        };
        let settings = base
            .overlay(&vars(&[(ServiceSettings::TIMEOUT_ENV, "10s")]))
            .unwrap();
        assert_eq!(settings.base_url, "https://from-file.example");
        assert_eq!(settings.timeout, Duration::from_secs(10));
    }

    #[test]
    fn rejects_garbage_timeout() {
        let err = ServiceSettings::from_map(vars(&[(ServiceSettings::TIMEOUT_ENV, "soon")]))
            .expect_err("invalid timeout should error");
        assert!(err.to_string().contains(ServiceSettings::TIMEOUT_ENV));
    }
}

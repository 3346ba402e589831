// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser configuration

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, DEFAULT_USER_AGENT};

/// Statuses retried as transient by default
pub const DEFAULT_RETRY_STATUSES: &[u16] = &[408, 429, 500, 502, 503, 504];

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Site root; relative targets and `/` patterns are resolved against it
    pub base_url: Option<Url>,
    /// User agent string
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Accept invalid TLS certificates
    pub ignore_https_errors: bool,
    /// Proxy URL
    pub proxy: Option<String>,
    /// Attempts per request for transient failures, first one included
    pub max_attempts: u32,
    /// HTTP statuses treated as transient
    pub retry_statuses: Vec<u16>,
    /// Pause between two attempts
    pub retry_delay: Duration,
    /// Cookie jar persisted as JSON between runs
    pub cookie_file: Option<PathBuf>,
    /// Where unmatched (or all) responses are written
    pub responses_dir: Option<PathBuf>,
    /// Save every response, not only unmatched ones
    pub save_responses: bool,
    /// Default headers
    pub default_headers: Vec<(String, String)>,
    /// How long a dumped session state stays loadable
    pub state_duration: Option<Duration>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            ignore_https_errors: false,
            proxy: None,
            max_attempts: 3,
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
            retry_delay: Duration::from_millis(500),
            cookie_file: None,
            responses_dir: None,
            save_responses: false,
            default_headers: vec![],
            state_duration: None,
        }
    }
}

impl BrowserConfig {
    /// Create a new browser config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the site root
    pub fn base_url(mut self, base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;
        self.base_url = Some(url);
        Ok(self)
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ignore HTTPS errors
    pub fn ignore_https_errors(mut self, ignore: bool) -> Self {
        self.ignore_https_errors = ignore;
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set the attempt bound for transient failures (at least 1)
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Replace the set of transient statuses
    pub fn retry_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retry_statuses = statuses.into_iter().collect();
        self
    }

    /// Set the pause between attempts
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Persist cookies to this file
    pub fn cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_file = Some(path.into());
        self
    }

    /// Save diagnostics responses into this directory
    pub fn responses_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.responses_dir = Some(path.into());
        self
    }

    /// Save every response, not only unmatched ones
    pub fn save_responses(mut self, save: bool) -> Self {
        self.save_responses = save;
        self
    }

    /// Expire dumped session states after this duration
    pub fn state_duration(mut self, duration: Duration) -> Self {
        self.state_duration = Some(duration);
        self
    }

    /// Add default header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Whether a status should be retried
    pub fn is_retry_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Settings for the reqwest transport
    pub fn http_config(&self) -> Result<HttpClientConfig> {
        let mut http = HttpClientConfig {
            user_agent: self.user_agent.clone(),
            timeout: self.timeout,
            accept_invalid_certs: self.ignore_https_errors,
            proxy: self.proxy.clone(),
            ..Default::default()
        };

        for (name, value) in &self.default_headers {
            let name = reqwest::header::HeaderName::try_from(name.as_str())
                .map_err(|e| Error::Config(format!("Invalid header name '{}': {}", name, e)))?;
            let value = reqwest::header::HeaderValue::try_from(value.as_str())
                .map_err(|e| Error::Config(format!("Invalid header value: {}", e)))?;
            http.default_headers.insert(name, value);
        }

        Ok(http)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_config() {
        let config = BrowserConfig::new()
            .user_agent("Custom Agent")
            .timeout(Duration::from_secs(60))
            .max_attempts(0);

        assert_eq!(config.state_duration, None);
        let config = config.state_duration(Duration::from_secs(600));
        assert_eq!(config.state_duration, Some(Duration::from_secs(600)));
        assert_eq!(config.user_agent, "Custom Agent");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_attempts, 1);
    }

    #[test]
    fn test_retry_statuses() {
        let config = BrowserConfig::default();
        assert!(config.is_retry_status(503));
        assert!(!config.is_retry_status(404));

        let config = config.retry_statuses([500]);
        assert!(!config.is_retry_status(503));
    }

    #[test]
    fn test_base_url_and_headers() {
        assert!(matches!(BrowserConfig::new().base_url("not a url"), Err(Error::Config(_))));

        let http = BrowserConfig::new()
            .base_url("https://bank.test")
            .unwrap()
            .header("x-app", "pagewalk")
            .http_config()
            .unwrap();
        assert_eq!(http.default_headers.get("x-app").unwrap(), "pagewalk");
        assert!(http.default_headers.contains_key("accept"));

        let bad = BrowserConfig::new().header("bad header", "x").http_config();
        assert!(matches!(bad, Err(Error::Config(_))));
    }
}

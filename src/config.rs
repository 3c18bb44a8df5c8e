use anyhow::{Context, Result};
use std::time::Duration;

use crate::view::DEFAULT_PAGE_SIZE;

pub const DEFAULT_OBWATCH_URL: &str = "http://localhost:62601";
/// Short refreshes still show the loading indicator this long to avoid flicker.
pub const DEFAULT_MIN_LOADING: Duration = Duration::from_millis(250);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub obwatch_url: String,
    pub request_timeout: Duration,
    pub page_size: usize,
    pub min_loading_duration: Duration,
    /// Extra attempts for the snapshot fetch.
    pub retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            obwatch_url: DEFAULT_OBWATCH_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
            min_loading_duration: DEFAULT_MIN_LOADING,
            retries: 2,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

impl Config {
    pub fn new(obwatch_url: &str) -> Self {
        Self {
            obwatch_url: obwatch_url.to_string(),
            ..Default::default()
        }
    }

    /// Defaults overridden by `OBWATCH_URL`, `OBWATCH_TIMEOUT_SECS`,
    /// `ORDERBOOK_PAGE_SIZE`, `ORDERBOOK_MIN_LOADING_MS` and `OBWATCH_RETRIES`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("OBWATCH_URL") {
            config.obwatch_url = url;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "OBWATCH_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(size) = parse_var::<usize, _>(&lookup, "ORDERBOOK_PAGE_SIZE")? {
            config.page_size = size;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "ORDERBOOK_MIN_LOADING_MS")? {
            config.min_loading_duration = Duration::from_millis(ms);
        }
        if let Some(retries) = parse_var::<u32, _>(&lookup, "OBWATCH_RETRIES")? {
            config.retries = retries;
        }
        Ok(config)
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_min_loading_duration(mut self, duration: Duration) -> Self {
        self.min_loading_duration = duration;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32, base_delay: Duration) -> Self {
        self.retries = retries;
        self.retry_base_delay = base_delay;
        self
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("invalid value for {}: '{}'", key, raw)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.page_size, 25);
        assert_eq!(config.min_loading_duration, Duration::from_millis(250));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("OBWATCH_URL", "http://10.0.0.2:62601/"),
            ("ORDERBOOK_PAGE_SIZE", "50"),
            ("ORDERBOOK_MIN_LOADING_MS", "0"),
            ("OBWATCH_RETRIES", "5"),
        ]))
        .unwrap();
        assert_eq!(config.obwatch_url, "http://10.0.0.2:62601/");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.min_loading_duration, Duration::ZERO);
        assert_eq!(config.retries, 5);
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let err = Config::from_lookup(lookup(&[("ORDERBOOK_PAGE_SIZE", "lots")])).unwrap_err();
        assert!(err.to_string().contains("ORDERBOOK_PAGE_SIZE"));
    }
}

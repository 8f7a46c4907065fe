//! Client configuration loaded from `.env`/environment.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2_000);

const MIN_POLL_INTERVAL_MS: u64 = 100;
const MAX_POLL_INTERVAL_MS: u64 = 60_000;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub api_base_url: String,
    pub poll_interval: Duration,
    /// `None` leaves reqwest's defaults in place.
    pub request_timeout: Option<Duration>,
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: None,
            data_dir: None,
        }
    }
}

fn normalize_api_base(base_url: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    if base.is_empty() {
        return DEFAULT_API_BASE_URL.to_string();
    }
    base.to_string()
}

fn parse_u64(raw: Option<String>) -> Option<u64> {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
}

/// Build a config from an arbitrary key lookup.
///
/// Reads:
/// - `DASHBOARD_API_URL` (fallback: `API_BASE_URL`)
/// - `DASHBOARD_POLL_INTERVAL_MS`
/// - `DASHBOARD_HTTP_TIMEOUT_MS` (`0` means no explicit timeout)
/// - `DASHBOARD_DATA_DIR`
pub fn config_from_lookup<F>(lookup: F) -> ClientConfig
where
    F: Fn(&str) -> Option<String>,
{
    let api_base_url = lookup("DASHBOARD_API_URL")
        .or_else(|| lookup("API_BASE_URL"))
        .map(|v| normalize_api_base(&v))
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

    let poll_interval = parse_u64(lookup("DASHBOARD_POLL_INTERVAL_MS"))
        .map(|ms| Duration::from_millis(ms.clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS)))
        .unwrap_or(DEFAULT_POLL_INTERVAL);

    let request_timeout = parse_u64(lookup("DASHBOARD_HTTP_TIMEOUT_MS"))
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis);

    let data_dir = lookup("DASHBOARD_DATA_DIR")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);

    ClientConfig {
        api_base_url,
        poll_interval,
        request_timeout,
        data_dir,
    }
}

pub fn load_client_config() -> ClientConfig {
    let _ = dotenvy::dotenv();
    config_from_lookup(|key| std::env::var(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = config_from_lookup(lookup(&[]));
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert!(config.request_timeout.is_none());
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_normalize_api_base() {
        assert_eq!(normalize_api_base(" http://api.local/v1/ "), "http://api.local/v1");
        assert_eq!(normalize_api_base("   "), DEFAULT_API_BASE_URL);

        let config = config_from_lookup(lookup(&[("API_BASE_URL", "http://fallback:9000/")]));
        assert_eq!(config.api_base_url, "http://fallback:9000");

        let config = config_from_lookup(lookup(&[
            ("DASHBOARD_API_URL", "http://primary"),
            ("API_BASE_URL", "http://fallback"),
        ]));
        assert_eq!(config.api_base_url, "http://primary");
    }

    #[test]
    fn test_intervals_and_timeout() {
        let config = config_from_lookup(lookup(&[
            ("DASHBOARD_POLL_INTERVAL_MS", "5"),
            ("DASHBOARD_HTTP_TIMEOUT_MS", "1500"),
        ]));
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.request_timeout, Some(Duration::from_millis(1500)));

        let config = config_from_lookup(lookup(&[
            ("DASHBOARD_POLL_INTERVAL_MS", "abc"),
            ("DASHBOARD_HTTP_TIMEOUT_MS", "0"),
        ]));
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert!(config.request_timeout.is_none());
    }
}

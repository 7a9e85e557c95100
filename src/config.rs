use std::path::PathBuf;
use std::time::Duration;

use crate::network::{Connection, NetworkPolicy};

const DEFAULT_API_URL: &str = "http://falkor-cda.bastian.globo.com";
const DEFAULT_FEED_ID: &str = "b904b430-123a-4f93-8cf4-5365adf97892";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub feed_id: String,
    pub database_path: PathBuf,
    pub log_file: PathBuf,
    /// Rows read from the cache per paged-list step.
    pub page_size: usize,
    pub fetch_timeout: Duration,
    pub network: NetworkPolicy,
}

impl Settings {
    /// Read settings from `LIVESCROLL_*` environment variables.  `api_url`,
    /// when given, wins over `LIVESCROLL_API_URL`.
    pub fn from_env(api_url: Option<String>) -> Self {
        let mut settings = Self::from_lookup(|key| std::env::var(key).ok());
        if let Some(url) = api_url {
            settings.api_url = url;
        }
        settings
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup("LIVESCROLL_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let feed_id = lookup("LIVESCROLL_FEED_ID").unwrap_or_else(|| DEFAULT_FEED_ID.to_string());
        let database_path = lookup("LIVESCROLL_DATABASE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("livescroll-news.db"));
        let log_file = lookup("LIVESCROLL_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("livescroll-news.log"));
        let page_size = lookup("LIVESCROLL_PAGE_SIZE")
            .and_then(|v| v.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(10);
        let fetch_timeout = lookup("LIVESCROLL_FETCH_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(15));
        let connection = lookup("LIVESCROLL_CONNECTION")
            .and_then(|v| v.parse().ok())
            .unwrap_or(Connection::Wifi);
        let allow_metered = lookup("LIVESCROLL_ALLOW_METERED")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Self {
            api_url,
            feed_id,
            database_path,
            log_file,
            page_size,
            fetch_timeout,
            network: NetworkPolicy {
                connection,
                allow_metered,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let s = settings(&[]);
        assert_eq!(s.api_url, DEFAULT_API_URL);
        assert_eq!(s.feed_id, DEFAULT_FEED_ID);
        assert_eq!(s.page_size, 10);
        assert_eq!(s.fetch_timeout, Duration::from_secs(15));
        assert_eq!(s.network, NetworkPolicy::default());
    }

    #[test]
    fn reads_overrides() {
        let s = settings(&[
            ("LIVESCROLL_API_URL", "http://localhost:8080"),
            ("LIVESCROLL_PAGE_SIZE", "25"),
            ("LIVESCROLL_FETCH_TIMEOUT_SECS", "3"),
            ("LIVESCROLL_CONNECTION", "mobile"),
            ("LIVESCROLL_ALLOW_METERED", "true"),
            ("LIVESCROLL_DATABASE", "/tmp/news.db"),
        ]);
        assert_eq!(s.api_url, "http://localhost:8080");
        assert_eq!(s.page_size, 25);
        assert_eq!(s.fetch_timeout, Duration::from_secs(3));
        assert_eq!(s.network.connection, Connection::Mobile);
        assert!(s.network.allow_metered);
        assert_eq!(s.database_path, PathBuf::from("/tmp/news.db"));
    }

    #[test]
    fn invalid_values_fall_back() {
        let s = settings(&[
            ("LIVESCROLL_PAGE_SIZE", "0"),
            ("LIVESCROLL_FETCH_TIMEOUT_SECS", "soon"),
            ("LIVESCROLL_CONNECTION", "satellite"),
            ("LIVESCROLL_ALLOW_METERED", "maybe"),
        ]);
        assert_eq!(s.page_size, 10);
        assert_eq!(s.fetch_timeout, Duration::from_secs(15));
        assert_eq!(s.network.connection, Connection::Wifi);
        assert!(!s.network.allow_metered);
    }
}

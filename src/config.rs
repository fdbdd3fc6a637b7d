//! Configuration module for npofeed.

use serde::Deserialize;
use std::path::Path;

use crate::broadcast::ChannelProgramme;
use crate::{FeedError, Result};

/// Remote GraphQL API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// GraphQL endpoint URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Records requested per page.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    /// Client library name announced in the request extensions.
    #[serde(default = "default_client_name")]
    pub client_name: String,
    /// Client library version announced in the request extensions.
    #[serde(default = "default_client_version")]
    pub client_version: String,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Upper bound on pages walked during a cold start.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_api_url() -> String {
    "https://android-luister.api.nporadio.nl/graphql".to_string()
}

fn default_page_limit() -> u32 {
    10
}

fn default_client_name() -> String {
    "apollo-kotlin".to_string()
}

fn default_client_version() -> String {
    "4.3.3".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_total_timeout() -> u64 {
    30
}

fn default_max_pages() -> u32 {
    500
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_limit: default_page_limit(),
            client_name: default_client_name(),
            client_version: default_client_version(),
            connect_timeout_secs: default_connect_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_pages: default_max_pages(),
        }
    }
}

/// Broadcast cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Root directory of the cache.
    #[serde(default = "default_cache_path")]
    pub path: String,
    /// Namespace directory below the root.
    #[serde(default = "default_cache_namespace")]
    pub namespace: String,
}

fn default_cache_path() -> String {
    "storage".to_string()
}

fn default_cache_namespace() -> String {
    "npo-radio".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            namespace: default_cache_namespace(),
        }
    }
}

/// Feed rendering configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Value of the channel `<language>` element.
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "nl-NL".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

/// Web server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Whether the feed server is enabled.
    #[serde(default = "default_web_enabled")]
    pub enabled: bool,
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// Public base URL, used as site root and for self links.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_web_enabled() -> bool {
    true
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    8080
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: default_web_enabled(),
            host: default_web_host(),
            port: default_web_port(),
            base_url: default_base_url(),
        }
    }
}

/// A channel/programme pair refreshed even before it has a cache entry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SeedConfig {
    /// Channel key, e.g. `npo-3fm`.
    pub channel: String,
    /// Programme key, e.g. `3voor12-radio`.
    pub programme: String,
}

/// Background updater configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdaterConfig {
    /// Whether the background updater runs while serving.
    #[serde(default = "default_updater_enabled")]
    pub enabled: bool,
    /// Interval between refresh runs in seconds.
    #[serde(default = "default_updater_interval")]
    pub interval_secs: u64,
    /// Pairs to refresh in addition to those already cached.
    #[serde(default)]
    pub seeds: Vec<SeedConfig>,
}

fn default_updater_enabled() -> bool {
    true
}

fn default_updater_interval() -> u64 {
    3600 // 1 hour
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            enabled: default_updater_enabled(),
            interval_secs: default_updater_interval(),
            seeds: vec![],
        }
    }
}

impl UpdaterConfig {
    /// Seeds as cache keys.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Validation`] naming the first invalid seed.
    pub fn seed_keys(&self) -> Result<Vec<ChannelProgramme>> {
        self.seeds
            .iter()
            .map(|seed| ChannelProgramme::new(seed.channel.as_str(), seed.programme.as_str()))
            .collect()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/npofeed.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Remote API configuration.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Feed rendering configuration.
    #[serde(default)]
    pub feed: FeedConfig,
    /// Web server configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Background updater configuration.
    #[serde(default)]
    pub updater: UpdaterConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FeedError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FeedError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `NPOFEED_API_URL`: Override the GraphQL endpoint
    /// - `NPOFEED_CACHE_PATH`: Override the cache root directory
    pub fn apply_env_overrides(&mut self) {
        if let Ok(api_url) = std::env::var("NPOFEED_API_URL") {
            if !api_url.is_empty() {
                self.remote.api_url = api_url;
            }
        }
        if let Ok(cache_path) = std::env::var("NPOFEED_CACHE_PATH") {
            if !cache_path.is_empty() {
                self.cache.path = cache_path;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.remote.page_limit == 0 {
            return Err(FeedError::Validation(
                "remote.page_limit must be at least 1".to_string(),
            ));
        }
        if self.remote.max_pages == 0 {
            return Err(FeedError::Validation(
                "remote.max_pages must be at least 1".to_string(),
            ));
        }
        url::Url::parse(&self.remote.api_url)
            .map_err(|e| FeedError::Validation(format!("remote.api_url is invalid: {e}")))?;
        let base = url::Url::parse(&self.web.base_url)
            .map_err(|e| FeedError::Validation(format!("web.base_url is invalid: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(FeedError::Validation(
                "web.base_url must be an absolute http(s) URL".to_string(),
            ));
        }
        self.updater
            .seed_keys()
            .map_err(|e| FeedError::Validation(format!("updater.seeds: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(
            config.remote.api_url,
            "https://android-luister.api.nporadio.nl/graphql"
        );
        assert_eq!(config.remote.page_limit, 10);
        assert_eq!(config.remote.client_name, "apollo-kotlin");
        assert_eq!(config.remote.client_version, "4.3.3");
        assert_eq!(config.remote.connect_timeout_secs, 10);
        assert_eq!(config.remote.total_timeout_secs, 30);
        assert_eq!(config.remote.max_pages, 500);

        assert_eq!(config.cache.path, "storage");
        assert_eq!(config.cache.namespace, "npo-radio");

        assert_eq!(config.feed.language, "nl-NL");

        assert!(config.web.enabled);
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.web.base_url, "http://localhost:8080");

        assert!(config.updater.enabled);
        assert_eq!(config.updater.interval_secs, 3600);
        assert!(config.updater.seeds.is_empty());

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/npofeed.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[remote]
api_url = "https://api.example.com/graphql"
page_limit = 25
client_name = "custom-client"
client_version = "1.0.0"
connect_timeout_secs = 5
total_timeout_secs = 15
max_pages = 40

[cache]
path = "/var/lib/npofeed"
namespace = "radio"

[feed]
language = "en-GB"

[web]
enabled = false
host = "127.0.0.1"
port = 3000
base_url = "https://feeds.example.com"

[updater]
enabled = false
interval_secs = 600

[[updater.seeds]]
channel = "npo-3fm"
programme = "3voor12-radio"

[[updater.seeds]]
channel = "npo-radio-2"
programme = "spijkers-met-koppen"

[logging]
level = "debug"
file = "custom/logs/app.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.remote.api_url, "https://api.example.com/graphql");
        assert_eq!(config.remote.page_limit, 25);
        assert_eq!(config.remote.client_name, "custom-client");
        assert_eq!(config.remote.client_version, "1.0.0");
        assert_eq!(config.remote.connect_timeout_secs, 5);
        assert_eq!(config.remote.total_timeout_secs, 15);
        assert_eq!(config.remote.max_pages, 40);

        assert_eq!(config.cache.path, "/var/lib/npofeed");
        assert_eq!(config.cache.namespace, "radio");

        assert_eq!(config.feed.language, "en-GB");

        assert!(!config.web.enabled);
        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.web.port, 3000);
        assert_eq!(config.web.base_url, "https://feeds.example.com");

        assert!(!config.updater.enabled);
        assert_eq!(config.updater.interval_secs, 600);
        assert_eq!(config.updater.seeds.len(), 2);
        assert_eq!(
            config.updater.seeds[0],
            SeedConfig {
                channel: "npo-3fm".to_string(),
                programme: "3voor12-radio".to_string(),
            }
        );
        assert_eq!(config.updater.seeds[1].programme, "spijkers-met-koppen");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[web]
port = 3000

[cache]
path = "data"
"#;

        let config = Config::parse(toml).unwrap();

        // Specified values
        assert_eq!(config.web.port, 3000);
        assert_eq!(config.cache.path, "data");

        // Default values
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.cache.namespace, "npo-radio");
        assert_eq!(config.remote.page_limit, 10);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.web.port, 8080);
        assert_eq!(config.cache.path, "storage");
        assert_eq!(config.feed.language, "nl-NL");
    }

    #[test]
    fn test_parse_invalid_config() {
        let toml = "this is not valid toml [[[";
        let result = Config::parse(toml);

        assert!(result.is_err());
        if let Err(FeedError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");

        assert!(result.is_err());
        assert!(matches!(result, Err(FeedError::Io(_))));
    }

    #[test]
    fn test_apply_env_overrides() {
        let original_api = std::env::var("NPOFEED_API_URL").ok();
        let original_cache = std::env::var("NPOFEED_CACHE_PATH").ok();

        std::env::set_var("NPOFEED_API_URL", "http://127.0.0.1:9999/graphql");
        std::env::set_var("NPOFEED_CACHE_PATH", "");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.remote.api_url, "http://127.0.0.1:9999/graphql");
        // Empty values never override
        assert_eq!(config.cache.path, "storage");

        match original_api {
            Some(val) => std::env::set_var("NPOFEED_API_URL", val),
            None => std::env::remove_var("NPOFEED_API_URL"),
        }
        match original_cache {
            Some(val) => std::env::set_var("NPOFEED_CACHE_PATH", val),
            None => std::env::remove_var("NPOFEED_CACHE_PATH"),
        }
    }

    #[test]
    fn test_validate_default() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_page_limit() {
        let mut config = Config::default();
        config.remote.page_limit = 0;

        let result = config.validate();
        assert!(matches!(result, Err(FeedError::Validation(msg)) if msg.contains("page_limit")));
    }

    #[test]
    fn test_validate_zero_max_pages() {
        let mut config = Config::default();
        config.remote.max_pages = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_relative_base_url() {
        let mut config = Config::default();
        config.web.base_url = "/feeds".to_string();

        let result = config.validate();
        assert!(matches!(result, Err(FeedError::Validation(msg)) if msg.contains("base_url")));
    }

    #[test]
    fn test_validate_invalid_api_url() {
        let mut config = Config::default();
        config.remote.api_url = "not a url".to_string();

        let result = config.validate();
        assert!(matches!(result, Err(FeedError::Validation(msg)) if msg.contains("api_url")));
    }

    #[test]
    fn test_seed_keys() {
        let config = Config::parse(
            r#"
[[updater.seeds]]
channel = "npo-3fm"
programme = "3voor12-radio"
"#,
        )
        .unwrap();

        let keys = config.updater.seed_keys().unwrap();
        assert_eq!(
            keys,
            vec![ChannelProgramme::new("npo-3fm", "3voor12-radio").unwrap()]
        );
    }

    #[test]
    fn test_validate_invalid_seed() {
        let mut config = Config::default();
        config.updater.seeds.push(SeedConfig {
            channel: "npo-3fm".to_string(),
            programme: "../escape".to_string(),
        });

        let result = config.validate();
        assert!(matches!(result, Err(FeedError::Validation(msg)) if msg.contains("updater.seeds")));
    }
}

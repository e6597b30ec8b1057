//! Configuration file parser for ~/.config/blog-notifier/config.toml.
//!
//! Every key is optional when parsing; a missing file yields
//! `Config::default()`. The two endpoints are only required once the file is
//! turned into [`Settings`]. Unknown keys are accepted but logged.
use chrono::Weekday;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::util::validate_endpoint;

/// Environment variable that overrides `webhook_url` from the config file.
pub const WEBHOOK_ENV_VAR: &str = "BLOG_NOTIFIER_WEBHOOK_URL";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Missing required setting `{0}`")]
    Missing(&'static str),

    #[error("Invalid URL in `{key}`: {reason}")]
    InvalidUrl { key: &'static str, reason: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Raw configuration as written in the TOML file.
///
/// `webhook_url` is masked in `Debug` output; webhook URLs embed their own
/// credentials.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listing page to scrape; also the base for article URLs.
    pub listing_url: Option<String>,

    /// Chat webhook receiving `{"text": ...}` posts.
    pub webhook_url: Option<String>,

    /// SQLite database file. Relative paths resolve against the config directory.
    pub database_path: Option<PathBuf>,

    /// Removed from each listing href before it is joined onto `listing_url`.
    pub article_path_prefix: String,

    /// Weekdays on which the listing is not fetched.
    pub quiet_days: Vec<Weekday>,

    /// Upper bound on webhook posts per run.
    pub max_notifications_per_run: usize,

    /// Keep going after a failed post instead of ending the run.
    pub continue_on_failure: bool,

    /// Per-request HTTP timeout in seconds. 0 disables the timeout.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listing_url: None,
            webhook_url: None,
            database_path: None,
            article_path_prefix: "/articles/".to_string(),
            quiet_days: vec![Weekday::Fri],
            max_notifications_per_run: 3,
            continue_on_failure: false,
            request_timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("listing_url", &self.listing_url)
            .field("webhook_url", &self.webhook_url.as_ref().map(|_| "[REDACTED]"))
            .field("database_path", &self.database_path)
            .field("article_path_prefix", &self.article_path_prefix)
            .field("quiet_days", &self.quiet_days)
            .field("max_notifications_per_run", &self.max_notifications_per_run)
            .field("continue_on_failure", &self.continue_on_failure)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Validated settings for one run.
#[derive(Debug)]
pub struct Settings {
    pub listing_url: Url,
    pub webhook_url: SecretString,
    pub article_path_prefix: String,
    pub quiet_days: Vec<Weekday>,
    pub max_notifications_per_run: usize,
    pub continue_on_failure: bool,
    pub request_timeout: Option<Duration>,
}

impl Settings {
    /// Whether the fetch pass is skipped on `day`.
    pub fn is_quiet_day(&self, day: Weekday) -> bool {
        self.quiet_days.contains(&day)
    }

    /// Shared HTTP client for the listing GET and the webhook POSTs.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 8] = [
        "listing_url",
        "webhook_url",
        "database_path",
        "article_path_prefix",
        "quiet_days",
        "max_notifications_per_run",
        "continue_on_failure",
        "request_timeout_secs",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Database file location: `database_path` if set, else `blog.db`,
    /// relative paths resolved against `config_dir`.
    pub fn database_path(&self, config_dir: &Path) -> PathBuf {
        let path = self
            .database_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("blog.db"));
        if path.is_absolute() {
            path
        } else {
            config_dir.join(path)
        }
    }

    /// Validate into [`Settings`], reading the webhook override from the environment.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let env_webhook = std::env::var(WEBHOOK_ENV_VAR).ok();
        self.settings_with_webhook_override(env_webhook)
    }

    /// Validate into [`Settings`]. A non-blank `webhook_override` wins over the file.
    pub fn settings_with_webhook_override(
        &self,
        webhook_override: Option<String>,
    ) -> Result<Settings, ConfigError> {
        let listing_raw = non_blank(self.listing_url.as_deref()).ok_or(ConfigError::Missing("listing_url"))?;
        let listing_url = validate_endpoint(listing_raw).map_err(|e| ConfigError::InvalidUrl {
            key: "listing_url",
            reason: e.to_string(),
        })?;

        let webhook_raw = non_blank(webhook_override.as_deref())
            .or_else(|| non_blank(self.webhook_url.as_deref()))
            .ok_or(ConfigError::Missing("webhook_url"))?;
        // The URL itself stays out of the error message.
        let webhook_url = validate_endpoint(webhook_raw).map_err(|e| ConfigError::InvalidUrl {
            key: "webhook_url",
            reason: match e {
                crate::util::UrlValidationError::InvalidUrl(_) => "unparseable URL".to_string(),
                other => other.to_string(),
            },
        })?;

        let request_timeout =
            (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs));

        Ok(Settings {
            listing_url,
            webhook_url: SecretString::from(String::from(webhook_url)),
            article_path_prefix: self.article_path_prefix.clone(),
            quiet_days: self.quiet_days.clone(),
            max_notifications_per_run: self.max_notifications_per_run,
            continue_on_failure: self.continue_on_failure,
            request_timeout,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ============================================================================
// Tests
// ============================================================================

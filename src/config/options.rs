// src/config/options.rs
use std::path::PathBuf;
use std::time::Duration;

use super::consts::*;
use crate::core::backoff::RetryPolicy;
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOptions {
    pub legacy: PathBuf,
    pub modern: PathBuf,
    pub out: PathBuf,
    /// Columns that must exist in both sources.
    pub key_columns: Vec<String>,
}

impl MergeOptions {
    pub fn new(legacy: impl Into<PathBuf>, modern: impl Into<PathBuf>) -> Self {
        Self {
            legacy: legacy.into(),
            modern: modern.into(),
            out: PathBuf::from(MERGED_FILE),
            key_columns: vec![s!(SCDB_CITE_COL)],
        }
    }
}

#[derive(Clone, Debug)]
pub struct CrawlOptions {
    pub out: PathBuf,
    pub api_url: String,
    pub pageviews_url: String,
    pub user_agent: String,
    pub templates: Vec<String>,
    pub content_batch: usize,
    pub workers: usize,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub pause: Duration,
    /// First month requested from the pageview API, (year, month).
    pub window_start: (i32, u8),
    /// First month the pageview API reports reliably.
    pub reliable_from: (i32, u8),
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            out: PathBuf::from(WIKI_CASES_FILE),
            api_url: s!(API_URL),
            pageviews_url: s!(PAGEVIEWS_URL),
            user_agent: s!(USER_AGENT),
            templates: INFOBOX_TEMPLATES.iter().map(|t| s!(*t)).collect(),
            content_batch: CONTENT_BATCH,
            workers: WORKERS,
            timeout: Duration::from_secs(TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            pause: Duration::from_millis(REQUEST_PAUSE_MS),
            window_start: WINDOW_START,
            reliable_from: RELIABLE_FROM,
        }
    }
}

impl CrawlOptions {
    /// Pick up `WIKI_USER_AGENT` if set.
    pub fn with_env_user_agent(mut self) -> Self {
        if let Ok(ua) = std::env::var(USER_AGENT_ENV) {
            let ua = ua.trim();
            if !ua.is_empty() {
                self.user_agent = s!(ua);
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidOption(s!("workers must be at least 1")));
        }
        if self.content_batch == 0 || self.content_batch > 50 {
            return Err(ConfigError::InvalidOption(s!("content batch must be within 1..=50")));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidOption(s!("max attempts must be at least 1")));
        }
        if self.templates.is_empty() {
            return Err(ConfigError::InvalidOption(s!("at least one infobox template is required")));
        }
        let (_, m) = self.window_start;
        if !(1..=12).contains(&m) {
            return Err(ConfigError::InvalidOption(format!("window start month {m} is not 1..=12")));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchOptions {
    pub scdb: PathBuf,
    pub wiki: PathBuf,
    pub matched_out: PathBuf,
    pub unmatched_out: PathBuf,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            scdb: PathBuf::from(MERGED_FILE),
            wiki: PathBuf::from(WIKI_CASES_FILE),
            matched_out: PathBuf::from(MATCHED_FILE),
            unmatched_out: PathBuf::from(UNMATCHED_FILE),
        }
    }
}

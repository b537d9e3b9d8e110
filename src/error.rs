// src/error.rs
//
// Error taxonomy, one enum per concern.
// Fatal: ConfigError, TableError, MergeError, MatchError, CrawlError::Discovery.
// Recoverable: FetchError (retried, then downgraded per page).

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing credential {0} (set it in the environment or a .env file)")]
    MissingCredential(&'static str),

    #[error("Invalid credential {0}: value is blank or contains control characters")]
    InvalidCredential(&'static str),

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} is neither UTF-8 nor Windows-1252 text", .0.display())]
    Encoding(PathBuf),

    #[error("{} has no header row", .0.display())]
    Empty(PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Malformed input {}: required column '{column}' is missing", path.display())]
    MalformedInput { path: PathBuf, column: String },
}

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Schema error in {}: missing column(s) {}", path.display(), missing.join(", "))]
    Schema { path: PathBuf, missing: Vec<String> },
}

/// Failure of a single remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Rate limited (HTTP 429)")]
    RateLimited,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Retryable: 5xx, 429, timeouts, connection trouble.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(_) | FetchError::Timeout | FetchError::RateLimited => true,
            FetchError::Status(code) => *code >= 500,
            FetchError::Decode(_) | FetchError::InvalidUrl(_) => false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Page discovery failed: {0}")]
    Discovery(#[source] FetchError),

    #[error(transparent)]
    Table(#[from] TableError),
}

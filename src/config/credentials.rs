// src/config/credentials.rs
//
// OAuth 1.0a secrets for the wiki APIs. Built once at startup and handed
// to the HTTP client; there is no process-wide copy.

use std::fmt;

use crate::error::ConfigError;

pub const CONSUMER_KEY_VAR: &str = "WIKI_OAUTH_CONSUMER_KEY";
pub const CONSUMER_SECRET_VAR: &str = "WIKI_OAUTH_CONSUMER_SECRET";
pub const ACCESS_TOKEN_VAR: &str = "WIKI_OAUTH_ACCESS_TOKEN";
pub const ACCESS_SECRET_VAR: &str = "WIKI_OAUTH_ACCESS_SECRET";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl Credentials {
    /// Read from the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded credentials file {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("Ignoring unreadable .env file: {e}"),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any key → value lookup (environment, config map, test fixture).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| -> Result<String, ConfigError> {
            let value = lookup(name).ok_or(ConfigError::MissingCredential(name))?;
            let value = value.trim();
            if value.is_empty() || value.chars().any(char::is_control) {
                return Err(ConfigError::InvalidCredential(name));
            }
            Ok(s!(value))
        };

        Ok(Self {
            consumer_key: get(CONSUMER_KEY_VAR)?,
            consumer_secret: get(CONSUMER_SECRET_VAR)?,
            access_token: get(ACCESS_TOKEN_VAR)?,
            access_secret: get(ACCESS_SECRET_VAR)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("access_secret", &"<redacted>")
            .finish()
    }
}

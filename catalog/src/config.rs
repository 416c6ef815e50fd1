use crate::users::Role;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

const DAY_SECS: u64 = 24 * 60 * 60;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Upstream URL must use http or https: {0}")]
    InvalidUpstreamScheme(String),

    #[error("Upstream timeouts must be greater than 0")]
    InvalidTimeout,

    #[error("Cache TTL must be greater than 0")]
    InvalidTtl,

    #[error("Duplicate user id: {0}")]
    DuplicateUser(u64),

    #[error("Empty API token for user {0}")]
    EmptyToken(u64),

    #[error("API token of user {0} is already assigned to another user")]
    DuplicateToken(u64),
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// The upstream Star Wars API.
#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Upstream {
    /// Base URL, e.g. `https://swapi.dev/api/`. Resource paths are joined onto it.
    pub url: Url,
    /// Deadline for a whole request, response body included.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl Upstream {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !matches!(self.url.scheme(), "http" | "https") {
            return Err(ValidationError::InvalidUpstreamScheme(self.url.to_string()));
        }
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

fn default_ttl_secs() -> u64 {
    DAY_SECS
}

fn default_max_capacity() -> u64 {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: default_ttl_secs(),
            max_capacity: default_max_capacity(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// A registered user. Accounts are provisioned here rather than through the API.
#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct UserConfig {
    pub id: u64,
    pub email: String,
    pub nick_name: String,
    /// ID of the upstream person assigned to the user as their hero.
    pub external_id: u64,
    #[serde(default)]
    pub role: Role,
    pub api_token: String,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    pub upstream: Upstream,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.upstream.validate()?;

        if self.cache.ttl_secs == 0 {
            return Err(ValidationError::InvalidTtl);
        }

        let mut user_ids = HashSet::new();
        let mut tokens = HashSet::new();
        for user in &self.users {
            if !user_ids.insert(user.id) {
                return Err(ValidationError::DuplicateUser(user.id));
            }
            let token = user.api_token.trim();
            if token.is_empty() {
                return Err(ValidationError::EmptyToken(user.id));
            }
            if !tokens.insert(token) {
                return Err(ValidationError::DuplicateToken(user.id));
            }
        }

        Ok(())
    }
}

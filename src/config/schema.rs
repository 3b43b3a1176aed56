//! Configuration schema definitions

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable holding the cookie encryption secret
pub const COOKIE_KEY_ENV: &str = "COOKIE_KEY";
/// Environment variable holding the bearer token signing secret
pub const TOKEN_SECRET_ENV: &str = "TOKEN_SECRET";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub token: TokenConfig,
}

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Secret the cookie encryption key is derived from
    #[serde(default)]
    pub cookie_key: Option<String>,

    /// Only send the cookie over HTTPS
    #[serde(default)]
    pub secure: bool,

    #[serde(default = "default_max_age")]
    pub max_age_secs: i64,
}

fn default_cookie_name() -> String {
    crate::session::SESSION_COOKIE_NAME.to_string()
}

fn default_max_age() -> i64 {
    86400 * 30
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            cookie_key: None,
            secure: false,
            max_age_secs: default_max_age(),
        }
    }
}

/// Bearer token verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// HS256 shared secret
    #[serde(default)]
    pub secret: Option<String>,

    /// Required `iss` claim
    #[serde(default)]
    pub issuer: Option<String>,

    /// Required `aud` claim
    #[serde(default)]
    pub audience: Option<String>,

    /// Clock skew tolerated when checking `exp`
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,

    /// Lifetime of tokens minted by `vanpool token`
    #[serde(default = "default_ttl")]
    pub ttl_secs: i64,
}

fn default_leeway() -> u64 {
    60
}

fn default_ttl() -> i64 {
    3600
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: None,
            issuer: None,
            audience: None,
            leeway_secs: default_leeway(),
            ttl_secs: default_ttl(),
        }
    }
}

fn is_unset(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

impl Config {
    /// Check the configuration is safe to serve with
    pub fn validate(&self) -> Result<()> {
        if is_unset(&self.session.cookie_key) {
            return Err(Error::Config(format!(
                "{} must be set to encrypt session cookies",
                COOKIE_KEY_ENV
            )));
        }
        if is_unset(&self.token.secret) {
            return Err(Error::Config(format!(
                "{} must be set to verify bearer tokens",
                TOKEN_SECRET_ENV
            )));
        }
        if self.session.cookie_name.is_empty() {
            return Err(Error::Config("session.cookie_name cannot be empty".to_string()));
        }
        if self.session.max_age_secs <= 0 {
            return Err(Error::Config("session.max_age_secs must be positive".to_string()));
        }

        if let Some(key) = &self.session.cookie_key {
            if key.len() < 32 {
                tracing::warn!(
                    "{} is shorter than 32 bytes; use a longer random secret in production",
                    COOKIE_KEY_ENV
                );
            }
        }
        Ok(())
    }
}

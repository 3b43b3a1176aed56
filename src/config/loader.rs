//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::{Config, COOKIE_KEY_ENV, TOKEN_SECRET_ENV};

pub const CONFIG_FILENAME: &str = "vanpool.toml";

/// Load configuration from vanpool.toml (if any) and the environment
pub fn load_config() -> Result<Config> {
    let config = match find_config_file()? {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            load_config_from_path(&path)?
        }
        None => {
            tracing::debug!("No {} found, using defaults", CONFIG_FILENAME);
            Config::default()
        }
    };
    Ok(apply_env_overrides(config, |name| env::var(name).ok()))
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    let content = interpolate_env_vars(&content);
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<Option<PathBuf>> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(Some(config_path));
        }

        if !current.pop() {
            return Ok(None);
        }
    }
}

/// Secrets from the environment win over the file
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(COOKIE_KEY_ENV).filter(|v| !v.is_empty()) {
        config.session.cookie_key = Some(key);
    }
    if let Some(secret) = lookup(TOKEN_SECRET_ENV).filter(|v| !v.is_empty()) {
        config.token.secret = Some(secret);
    }
    config
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    // This regex is a compile-time constant, panicking is acceptable here
    // as it indicates a programming error in the codebase, not a runtime issue
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Generate a default configuration file content
pub fn default_config_content() -> &'static str {
    r#"# Vanpool Configuration

[server]
host = "0.0.0.0"
port = 3000

[session]
cookie_name = "vanpool_user"
# Secret used to encrypt the session cookie. Prefer the COOKIE_KEY
# environment variable; the server refuses to start without one.
# cookie_key = "${COOKIE_KEY}"
secure = false
max_age_secs = 2592000  # 30 days

[token]
# HS256 secret bearer tokens are verified with (or TOKEN_SECRET)
# secret = "${TOKEN_SECRET}"
# issuer = "https://auth.example.com"
# audience = "vanpool"
leeway_secs = 60
ttl_secs = 3600
"#
}

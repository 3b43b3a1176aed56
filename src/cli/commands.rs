//! CLI command implementations

use anyhow::Result;
use std::fs;

use crate::auth::{create_token, Rider};
use crate::cli::{error, info, success, warn};
use crate::config::{self, load_config};

/// Initialize a new vanpool.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = std::path::Path::new(config::loader::CONFIG_FILENAME);

    if config_path.exists() {
        warn("vanpool.toml already exists");
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success("Created vanpool.toml");
    info("Set COOKIE_KEY and TOKEN_SECRET (or add them to .env) and run 'vanpool serve'");

    Ok(())
}

/// Start the HTTP API server
pub async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = load_config()?;

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!("Starting server at http://{}:{}", host, port));

    if let Err(e) = crate::api::run_server(config, &host, port).await {
        error(&format!("Server failed: {}", e));
        return Err(e.into());
    }
    Ok(())
}

/// Mint a token the server will accept
pub async fn token(
    subject: &str,
    name: Option<String>,
    email: Option<String>,
    ttl: Option<i64>,
) -> Result<()> {
    let config = load_config()?;

    let mut rider = Rider::new(subject);
    if let Some(name) = name {
        rider = rider.with_name(name);
    }
    if let Some(email) = email {
        rider = rider.with_email(email);
    }

    let ttl = ttl.unwrap_or(config.token.ttl_secs);
    let token = create_token(&rider, &config.token, ttl)?;
    println!("{}", token);
    Ok(())
}

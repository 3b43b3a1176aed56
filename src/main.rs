use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vanpool::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up COOKIE_KEY / TOKEN_SECRET from a local .env
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vanpool=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => cli::commands::init().await,
        Commands::Serve { host, port } => cli::commands::serve(host, port).await,
        Commands::Token {
            subject,
            name,
            email,
            ttl,
        } => cli::commands::token(&subject, name, email, ttl).await,
    }
}

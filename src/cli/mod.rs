//! CLI interface for Vanpool

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vanpool")]
#[command(version)]
#[command(about = "Session service for the vanpool web app", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default vanpool.toml configuration file
    Init,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host from the config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to server.port from the config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print a signed bearer token for local testing
    Token {
        /// Rider id to put in the `sub` claim
        #[arg(short, long)]
        subject: String,

        /// Rider display name
        #[arg(short, long)]
        name: Option<String>,

        /// Rider email
        #[arg(short, long)]
        email: Option<String>,

        /// Token lifetime in seconds (defaults to token.ttl_secs)
        #[arg(long)]
        ttl: Option<i64>,
    },
}

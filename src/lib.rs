//! Vanpool - cookie-backed sessions for the vanpool web app
//!
//! Every request passing through [`session::session_middleware`] carries a
//! session with an anti-forgery `state` token, an `authenticated` flag and
//! the current [`auth::Rider`]. Handlers read them through the typed
//! [`session::SessionContext`] extractor.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod session;

pub use auth::Rider;
pub use config::Config;
pub use error::Error;
pub use session::SessionContext;

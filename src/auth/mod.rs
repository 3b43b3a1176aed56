//! Rider identity, bearer tokens and state tokens

pub mod jwt;
pub mod models;
pub mod state;

pub use jwt::{create_token, Claims, TokenVerifier};
pub use models::Rider;
pub use state::{RandomStateGenerator, StateGenerator};

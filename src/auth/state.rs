//! Anti-forgery state tokens

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::Rng;

use crate::error::Result;

/// Number of random bytes in a state token
pub const STATE_BYTES: usize = 32;

/// Produces the opaque `state` value bound to a new session.
pub trait StateGenerator: Send + Sync {
    fn generate(&self) -> Result<String>;
}

/// Cryptographically random, URL-safe state tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomStateGenerator;

impl StateGenerator for RandomStateGenerator {
    fn generate(&self) -> Result<String> {
        let random_bytes: [u8; STATE_BYTES] = rand::rng().random();
        Ok(URL_SAFE_NO_PAD.encode(random_bytes))
    }
}

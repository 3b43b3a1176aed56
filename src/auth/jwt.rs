//! JWT token handling

use crate::auth::models::Rider;
use crate::config::TokenConfig;
use crate::error::{Error, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (rider ID)
    pub sub: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl Claims {
    /// Create claims for a rider, valid for `ttl_secs`
    pub fn for_rider(rider: &Rider, config: &TokenConfig, ttl_secs: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: rider.id.clone(),
            name: Some(rider.name.clone()).filter(|n| !n.is_empty()),
            email: Some(rider.email.clone()).filter(|e| !e.is_empty()),
            iat: now,
            exp: now + ttl_secs,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
        }
    }

    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() > self.exp
    }
}

fn secret(config: &TokenConfig) -> Result<&str> {
    config
        .secret
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Config("TOKEN_SECRET must be set".to_string()))
}

/// Create a signed HS256 token for a rider
pub fn create_token(rider: &Rider, config: &TokenConfig, ttl_secs: i64) -> Result<String> {
    if rider.is_anonymous() {
        return Err(Error::Other("Cannot issue a token without a subject".to_string()));
    }
    let claims = Claims::for_rider(rider, config, ttl_secs);
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret(config)?.as_bytes()),
    )
    .map_err(|e| Error::Other(format!("Failed to create token: {}", e)))
}

/// Verifies bearer tokens before they are trusted as a session identity.
///
/// Signature, expiry and, when configured, issuer and audience are always
/// checked.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn from_config(config: &TokenConfig) -> Result<Self> {
        let key = DecodingKey::from_secret(secret(config)?.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        if let Some(audience) = &config.audience {
            validation.set_audience(&[audience]);
        }

        Ok(Self { key, validation })
    }

    /// Validate and decode a token
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let claims = decode::<Claims>(token, &self.key, &self.validation)?.claims;
        if claims.sub.is_empty() {
            return Err(Error::Unauthorized("token has no subject".to_string()));
        }
        Ok(claims)
    }
}

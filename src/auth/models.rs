//! Rider model

use serde::{Deserialize, Serialize};

use crate::auth::jwt::Claims;

/// The application's user profile, kept in the session under `self`.
///
/// Empty fields are omitted when serialized, so the anonymous placeholder
/// renders as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rider {
    /// Subject identifier from the token (`sub`)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Display name
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Contact email
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
}

impl Rider {
    /// Create a rider with the given subject id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// The placeholder stored for sessions without a signed-in rider
    pub fn is_anonymous(&self) -> bool {
        self.id.is_empty()
    }
}

impl From<&Claims> for Rider {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.sub.clone(),
            name: claims.name.clone().unwrap_or_default(),
            email: claims.email.clone().unwrap_or_default(),
        }
    }
}

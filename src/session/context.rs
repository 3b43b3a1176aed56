//! Typed per-request view of the session

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use tokio::sync::Mutex;

use crate::auth::Rider;
use crate::error::{Error, Result};
use crate::session::record::SessionRecord;

/// Session values made available to handlers by the session middleware.
///
/// Use it as an extractor:
///
/// ```no_run
/// use vanpool::session::SessionContext;
///
/// async fn greet(session: SessionContext) -> String {
///     if session.is_authenticated() {
///         format!("Hello, {}", session.rider.name)
///     } else {
///         "Hello, stranger".to_string()
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub rider: Rider,
    pub authenticated: bool,
    pub state: String,
}

impl SessionContext {
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or(Error::SessionMissing)
    }
}

/// Shared access to the request's session record.
///
/// Changes made through the handle are persisted by the session middleware
/// once the handler returns.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    record: Arc<Mutex<SessionRecord>>,
}

impl SessionHandle {
    pub fn new(record: SessionRecord) -> Self {
        Self {
            record: Arc::new(Mutex::new(record)),
        }
    }

    /// Apply a change to the record
    pub async fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SessionRecord) -> Result<T>,
    {
        let mut record = self.record.lock().await;
        f(&mut record)
    }

    /// A copy of the record as it is now
    pub async fn snapshot(&self) -> SessionRecord {
        self.record.lock().await.clone()
    }
}

impl<S> FromRequestParts<S> for SessionHandle
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionHandle>()
            .cloned()
            .ok_or(Error::SessionMissing)
    }
}

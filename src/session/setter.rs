//! Store a rider in the session from a bearer token

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::auth::{Rider, TokenVerifier};
use crate::error::{Error, Result};
use crate::session::context::SessionHandle;

/// Extract the bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::Unauthorized("missing bearer token".to_string()))
}

/// Verify `token` and store the rider it names in the request's session.
///
/// The session middleware persists the change after the handler returns.
/// On a rejected token the session is left untouched.
pub async fn set_session(
    session: &SessionHandle,
    verifier: &TokenVerifier,
    token: &str,
) -> Result<Rider> {
    let claims = verifier.verify(token).inspect_err(|e| {
        tracing::warn!("Rejected session token: {}", e);
    })?;

    let rider = Rider::from(&claims);
    session
        .update(|record| {
            record.set_rider(&rider)?;
            record.set_authenticated(true);
            Ok(())
        })
        .await?;

    tracing::info!(rider = %rider.id, "Rider signed in");
    Ok(rider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::session::record::SessionRecord;
    use axum::http::HeaderValue;

    fn token_config() -> TokenConfig {
        TokenConfig {
            secret: Some("setter-secret".to_string()),
            ..TokenConfig::default()
        }
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_bearer_token() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(Error::Unauthorized(_))
        ));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_err());
    }

    #[tokio::test]
    async fn test_set_session_keeps_state() {
        let mut record = SessionRecord::new();
        record.set_state("state-1");
        record.set_authenticated(false);
        record.mark_clean();
        let session = SessionHandle::new(record);

        let token = crate::auth::create_token(&Rider::new("rider-1"), &token_config(), 60).unwrap();
        let verifier = TokenVerifier::from_config(&token_config()).unwrap();
        set_session(&session, &verifier, &token).await.unwrap();

        let record = session.snapshot().await;
        assert_eq!(record.state(), Some("state-1"));
        assert_eq!(record.authenticated(), Some(true));
        assert_eq!(record.rider().unwrap().id, "rider-1");
        assert!(record.is_dirty());
    }

    #[tokio::test]
    async fn test_rejected_token_leaves_record_clean() {
        let session = SessionHandle::new(SessionRecord::new());
        let verifier = TokenVerifier::from_config(&token_config()).unwrap();

        assert!(set_session(&session, &verifier, "bad.token.value").await.is_err());
        assert!(!session.snapshot().await.is_dirty());
    }
}

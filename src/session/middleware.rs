//! Session middleware

use axum::{
    extract::{Request, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::SharedState;
use crate::auth::{Rider, StateGenerator};
use crate::error::{Error, Result};
use crate::session::context::{SessionContext, SessionHandle};
use crate::session::record::SessionRecord;

/// Ensure `state`, `authenticated` and `self` are present and well typed,
/// returning the typed view of the result.
///
/// A rider with a subject always marks the session authenticated; the
/// anonymous placeholder never does.
pub fn ensure_session(
    record: &mut SessionRecord,
    states: &dyn StateGenerator,
) -> Result<SessionContext> {
    let state = match record.state() {
        Some(state) => state.to_string(),
        None => {
            tracing::debug!("No state in session, generating one");
            let state = states.generate().inspect_err(|e| {
                tracing::error!("Failed to create session state: {}", e);
            })?;
            record.set_state(state.clone());
            state
        }
    };

    if record.authenticated().is_none() {
        tracing::debug!("Session has no authenticated flag, marking as not authenticated");
        record.set_authenticated(false);
    }

    let rider = match record.rider() {
        Some(rider) => rider,
        None => {
            tracing::debug!("No rider in session, storing anonymous placeholder");
            let rider = Rider::default();
            record.set_rider(&rider)?;
            rider
        }
    };
    let authenticated = !rider.is_anonymous();
    record.set_authenticated(authenticated);

    Ok(SessionContext {
        rider,
        authenticated,
        state,
    })
}

/// Load or start the session for every request and expose it to handlers as
/// a [`SessionContext`] and a [`SessionHandle`].
///
/// Install with `axum::middleware::from_fn_with_state`.
pub async fn session_middleware(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let store = state.store.as_ref();

    let mut record = match store.load(req.headers()) {
        Ok(record) => record,
        Err(err @ Error::SessionDecode(_)) => {
            // Drop the unreadable cookie so the next request starts fresh
            let mut response = err.into_response();
            store.clear(response.headers_mut())?;
            return Ok(response);
        }
        Err(err) => return Err(err),
    };

    let context = ensure_session(&mut record, state.states.as_ref())?;

    let mut session_cookies = HeaderMap::new();
    if record.is_dirty() {
        tracing::debug!(
            authenticated = context.authenticated,
            "Saving session {}",
            store.cookie_name()
        );
        store.save(&mut record, &mut session_cookies)?;
    }

    let handle = SessionHandle::new(record);
    req.extensions_mut().insert(context);
    req.extensions_mut().insert(handle.clone());
    let mut response = next.run(req).await;

    // Persist whatever the handler changed on the same session
    handle
        .update(|record| {
            if record.is_dirty() {
                tracing::debug!("Handler changed the session, saving again");
                store.save(record, &mut session_cookies)?;
            }
            Ok(())
        })
        .await?;

    prepend_cookies(response.headers_mut(), &session_cookies);
    Ok(response)
}

/// Session cookies go ahead of any the handler set; among ours the latest
/// save comes last.
fn prepend_cookies(headers: &mut HeaderMap, session_cookies: &HeaderMap) {
    if session_cookies.is_empty() {
        return;
    }
    let downstream: Vec<HeaderValue> = headers.get_all(SET_COOKIE).iter().cloned().collect();
    headers.remove(SET_COOKIE);
    for value in session_cookies.get_all(SET_COOKIE).iter().chain(downstream.iter()) {
        headers.append(SET_COOKIE, value.clone());
    }
}

//! API route handlers

use axum::{
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use super::server::SharedState;
use crate::auth::Rider;
use crate::error::Result;
use crate::session::{bearer_token, set_session, SessionContext, SessionHandle};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

// Health check

pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok("healthy"))
}

// Session routes

/// Sign the caller in with `Authorization: Bearer <token>`
pub async fn create_session(
    State(state): State<SharedState>,
    session: SessionHandle,
    headers: HeaderMap,
) -> Result<Json<Rider>> {
    let token = bearer_token(&headers)?;
    let rider = set_session(&session, &state.tokens, token).await?;
    Ok(Json(rider))
}

/// The rider in the current session; `{}` when nobody is signed in
pub async fn current_user(session: SessionContext) -> Json<Rider> {
    tracing::debug!(
        authenticated = session.authenticated,
        "Responding with session rider"
    );
    Json(session.rider)
}

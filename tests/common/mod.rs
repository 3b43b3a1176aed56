//! Shared helpers for driving the router in-process

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use std::sync::Arc;
use tower::ServiceExt;

use vanpool::api::{create_router, AppState};
use vanpool::config::Config;

pub const TOKEN_SECRET: &str = "integration-token-secret";

pub fn test_config(cookie_key: &str) -> Config {
    let mut config = Config::default();
    config.session.cookie_key = Some(cookie_key.to_string());
    config.token.secret = Some(TOKEN_SECRET.to_string());
    config
}

pub fn test_state(cookie_key: &str) -> AppState {
    AppState::from_config(test_config(cookie_key)).expect("Failed to build app state")
}

pub fn app(state: AppState) -> Router {
    create_router(Arc::new(state))
}

/// Send a request, optionally with a session cookie and bearer token
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    bearer: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder.body(Body::empty()).expect("Failed to build request");
    app.clone().oneshot(request).await.expect("Router is infallible")
}

/// All Set-Cookie values on a response
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().expect("set-cookie is ascii").to_string())
        .collect()
}

/// The `name=value` pair a browser would send back, taking the last write
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    set_cookies(response)
        .last()
        .and_then(|c| c.split(';').next().map(str::to_string))
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is JSON")
}

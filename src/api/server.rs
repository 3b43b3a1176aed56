//! HTTP API server

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::{RandomStateGenerator, StateGenerator, TokenVerifier};
use crate::config::Config;
use crate::error::Result;
use crate::session::{session_middleware, CookieStore, SessionStore};

use super::routes;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn SessionStore>,
    pub tokens: TokenVerifier,
    pub states: Arc<dyn StateGenerator>,
}

impl AppState {
    /// Build the production state: encrypted cookie sessions and random state tokens
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let store = CookieStore::new(&config.session)?;
        let tokens = TokenVerifier::from_config(&config.token)?;

        Ok(Self {
            config,
            store: Arc::new(store),
            tokens,
            states: Arc::new(RandomStateGenerator),
        })
    }

    /// Swap the session store, e.g. for an in-memory one in tests
    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_state_generator(mut self, states: Arc<dyn StateGenerator>) -> Self {
        self.states = states;
        self
    }
}

pub type SharedState = Arc<AppState>;

/// Run the HTTP API server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState::from_config(config)?);

    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/session", post(routes::create_session))
        .route("/api/user", get(routes::current_user))
        // Everything above runs inside a session
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .route("/api/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

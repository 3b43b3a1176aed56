//! Cookie-backed sessions

pub mod context;
pub mod middleware;
pub mod record;
pub mod setter;
pub mod store;

pub use context::{SessionContext, SessionHandle};
pub use middleware::{ensure_session, session_middleware};
pub use record::SessionRecord;
pub use setter::{bearer_token, set_session};
pub use store::{CookieStore, MemoryStore, SessionStore};

/// Cookie holding the session
pub const SESSION_COOKIE_NAME: &str = "vanpool_user";

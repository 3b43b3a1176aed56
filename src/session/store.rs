//! Session storage backends

use std::collections::HashMap;
use std::sync::RwLock;

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use axum_extra::extract::cookie::{Cookie, CookieJar, Key, PrivateCookieJar, SameSite};
use sha2::{Digest, Sha512};

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::session::record::SessionRecord;

/// Loads and persists session records for a request/response pair.
pub trait SessionStore: Send + Sync {
    /// Load the record for a request. A request without a session yields an
    /// empty record.
    fn load(&self, headers: &HeaderMap) -> Result<SessionRecord>;

    /// Persist a record, appending any `Set-Cookie` headers to `response`.
    ///
    /// Saving the same record again within one request updates the session
    /// it was first saved under. The record is clean afterwards.
    fn save(&self, record: &mut SessionRecord, response: &mut HeaderMap) -> Result<()>;

    /// Instruct the client to drop its session cookie.
    fn clear(&self, response: &mut HeaderMap) -> Result<()>;

    fn cookie_name(&self) -> &str;
}

/// Derive a 64-byte cookie key from a secret of any length
pub fn derive_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

fn removal_cookie(name: &str) -> Result<HeaderValue> {
    let cookie = Cookie::build((name.to_string(), ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    HeaderValue::from_str(&cookie.to_string()).map_err(|e| Error::SessionStore(e.to_string()))
}

/// Stateless store: the whole record lives in an encrypted cookie.
#[derive(Clone)]
pub struct CookieStore {
    key: Key,
    cookie_name: String,
    secure: bool,
    max_age_secs: i64,
}

impl CookieStore {
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let secret = config
            .cookie_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("COOKIE_KEY must be set".to_string()))?;

        Ok(Self {
            key: derive_key(secret),
            cookie_name: config.cookie_name.clone(),
            secure: config.secure,
            max_age_secs: config.max_age_secs,
        })
    }
}

impl SessionStore for CookieStore {
    fn load(&self, headers: &HeaderMap) -> Result<SessionRecord> {
        if CookieJar::from_headers(headers).get(&self.cookie_name).is_none() {
            return Ok(SessionRecord::new());
        }

        let jar = PrivateCookieJar::from_headers(headers, self.key.clone());
        let cookie = jar.get(&self.cookie_name).ok_or_else(|| {
            Error::SessionDecode("cookie failed authentication".to_string())
        })?;
        SessionRecord::decode(cookie.value())
    }

    fn save(&self, record: &mut SessionRecord, response: &mut HeaderMap) -> Result<()> {
        let cookie = Cookie::build((self.cookie_name.clone(), record.encode()?))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.max_age_secs))
            .build();

        let jar = PrivateCookieJar::new(self.key.clone()).add(cookie);
        let encrypted = jar.into_response();
        for value in encrypted.headers().get_all(SET_COOKIE) {
            response.append(SET_COOKIE, value.clone());
        }
        record.mark_clean();
        Ok(())
    }

    fn clear(&self, response: &mut HeaderMap) -> Result<()> {
        response.append(SET_COOKIE, removal_cookie(&self.cookie_name)?);
        Ok(())
    }

    fn cookie_name(&self) -> &str {
        &self.cookie_name
    }
}

/// In-process store keyed by a random session id cookie
pub struct MemoryStore {
    cookie_name: String,
    records: RwLock<HashMap<String, SessionRecord>>,
}

impl MemoryStore {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            records: RwLock::new(HashMap::new()),
        }
    }

    fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        CookieJar::from_headers(headers)
            .get(&self.cookie_name)
            .map(|c| c.value().to_string())
    }

    /// Number of stored sessions
    pub fn session_count(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, headers: &HeaderMap) -> Result<SessionRecord> {
        let Some(id) = self.session_id(headers) else {
            return Ok(SessionRecord::new());
        };
        let records = self
            .records
            .read()
            .map_err(|e| Error::SessionStore(e.to_string()))?;
        match records.get(&id) {
            Some(record) => Ok(record.clone()),
            // Unknown or expired id: start over under a fresh one
            None => Ok(SessionRecord::new()),
        }
    }

    fn save(&self, record: &mut SessionRecord, response: &mut HeaderMap) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| Error::SessionStore(e.to_string()))?;

        let id = match record.session_id() {
            Some(id) => id.to_string(),
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                let cookie = Cookie::build((self.cookie_name.clone(), id.clone()))
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .build();
                let value = HeaderValue::from_str(&cookie.to_string())
                    .map_err(|e| Error::SessionStore(e.to_string()))?;
                response.append(SET_COOKIE, value);
                record.set_session_id(id.clone());
                id
            }
        };

        record.mark_clean();
        records.insert(id, record.clone());
        Ok(())
    }

    fn clear(&self, response: &mut HeaderMap) -> Result<()> {
        response.append(SET_COOKIE, removal_cookie(&self.cookie_name)?);
        Ok(())
    }

    fn cookie_name(&self) -> &str {
        &self.cookie_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Rider;
    use axum::http::header::COOKIE;

    fn config(secret: &str) -> SessionConfig {
        SessionConfig {
            cookie_key: Some(secret.to_string()),
            ..SessionConfig::default()
        }
    }

    /// Turn the response's Set-Cookie into the Cookie header a browser would send
    fn echo_cookie(response: &HeaderMap) -> HeaderMap {
        let set_cookie = response
            .get(SET_COOKIE)
            .expect("response sets a cookie")
            .to_str()
            .expect("set-cookie is ascii");
        let pair = set_cookie.split(';').next().unwrap_or_default();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(pair).unwrap());
        headers
    }

    fn sample_record() -> SessionRecord {
        let mut record = SessionRecord::new();
        record.set_state("state-token");
        record.set_authenticated(true);
        record.set_rider(&Rider::new("rider-1").with_name("Alice")).unwrap();
        record
    }

    #[test]
    fn test_cookie_store_requires_key() {
        assert!(CookieStore::new(&SessionConfig::default()).is_err());
        assert!(CookieStore::new(&config("")).is_err());
    }

    #[test]
    fn test_cookie_store_without_cookie_is_empty() {
        let store = CookieStore::new(&config("secret123")).unwrap();
        let record = store.load(&HeaderMap::new()).unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_cookie_store_round_trip() {
        let store = CookieStore::new(&config("secret123")).unwrap();
        let mut response = HeaderMap::new();
        store.save(&mut sample_record(), &mut response).unwrap();

        let set_cookie = response.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with("vanpool_user="));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(!set_cookie.contains("Alice"), "cookie value must be encrypted");

        let loaded = store.load(&echo_cookie(&response)).unwrap();
        assert_eq!(loaded.state(), Some("state-token"));
        assert_eq!(loaded.authenticated(), Some(true));
        assert_eq!(loaded.rider().unwrap().name, "Alice");
    }

    #[test]
    fn test_cookie_readable_by_second_instance_with_same_key() {
        let writer = CookieStore::new(&config("secret123")).unwrap();
        let reader = CookieStore::new(&config("secret123")).unwrap();

        let mut response = HeaderMap::new();
        writer.save(&mut sample_record(), &mut response).unwrap();

        let loaded = reader.load(&echo_cookie(&response)).unwrap();
        assert_eq!(loaded.rider().unwrap().id, "rider-1");
    }

    #[test]
    fn test_cookie_rejected_under_different_key() {
        let writer = CookieStore::new(&config("secret123")).unwrap();
        let reader = CookieStore::new(&config("another-secret")).unwrap();

        let mut response = HeaderMap::new();
        writer.save(&mut sample_record(), &mut response).unwrap();

        let result = reader.load(&echo_cookie(&response));
        assert!(matches!(result, Err(Error::SessionDecode(_))));
    }

    #[test]
    fn test_tampered_cookie_is_rejected() {
        let store = CookieStore::new(&config("secret123")).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("vanpool_user=eyJzdGF0ZSI6IngifQ"));
        assert!(matches!(store.load(&headers), Err(Error::SessionDecode(_))));
    }

    #[test]
    fn test_clear_expires_cookie() {
        let store = CookieStore::new(&config("secret123")).unwrap();
        let mut response = HeaderMap::new();
        store.clear(&mut response).unwrap();
        let set_cookie = response.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with("vanpool_user=;"));
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new("vanpool_user");
        let mut response = HeaderMap::new();
        store.save(&mut sample_record(), &mut response).unwrap();
        assert_eq!(store.session_count(), 1);

        let request = echo_cookie(&response);
        let mut loaded = store.load(&request).unwrap();
        assert_eq!(loaded.state(), Some("state-token"));

        // Saving again under the same id neither re-issues the cookie nor adds a session
        let mut response = HeaderMap::new();
        store.save(&mut loaded, &mut response).unwrap();
        assert!(response.get(SET_COOKIE).is_none());
        assert_eq!(store.session_count(), 1);
    }

    #[test]
    fn test_memory_store_second_save_in_one_request_reuses_id() {
        let store = MemoryStore::new("vanpool_user");
        let mut record = SessionRecord::new();
        record.set_state("s");

        let mut response = HeaderMap::new();
        store.save(&mut record, &mut response).unwrap();
        record.set_rider(&Rider::new("rider-1")).unwrap();
        store.save(&mut record, &mut response).unwrap();

        assert_eq!(response.get_all(SET_COOKIE).iter().count(), 1);
        assert_eq!(store.session_count(), 1);

        let loaded = store.load(&echo_cookie(&response)).unwrap();
        assert_eq!(loaded.state(), Some("s"));
        assert_eq!(loaded.rider().unwrap().id, "rider-1");
    }

    #[test]
    fn test_save_leaves_record_clean() {
        let store = CookieStore::new(&config("secret123")).unwrap();
        let mut record = sample_record();
        assert!(record.is_dirty());
        store.save(&mut record, &mut HeaderMap::new()).unwrap();
        assert!(!record.is_dirty());
    }

    #[test]
    fn test_memory_store_unknown_id_is_empty() {
        let store = MemoryStore::new("vanpool_user");
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("vanpool_user=unknown"));
        assert!(store.load(&headers).unwrap().is_empty());
    }
}

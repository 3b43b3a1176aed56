//! Session record persisted inside the session cookie

use serde_json::{Map, Value};

use crate::auth::Rider;
use crate::error::{Error, Result};

pub const STATE_KEY: &str = "state";
pub const AUTHENTICATED_KEY: &str = "authenticated";
pub const SELF_KEY: &str = "self";

/// Key/value data carried by a session.
///
/// Values are kept untyped so a cookie written by an older build, or one
/// holding a value of the wrong type, is read as "absent" rather than
/// failing the whole record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRecord {
    values: Map<String, Value>,
    dirty: bool,
    session_id: Option<String>,
}

impl SessionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a record from its serialized form
    pub fn decode(data: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(data) {
            Ok(Value::Object(values)) => Ok(Self {
                values,
                ..Self::default()
            }),
            Ok(other) => Err(Error::SessionDecode(format!(
                "expected an object, found {}",
                other
            ))),
            Err(e) => Err(Error::SessionDecode(e.to_string())),
        }
    }

    /// Serialize the record for storage
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.values)?)
    }

    pub fn state(&self) -> Option<&str> {
        self.values.get(STATE_KEY).and_then(Value::as_str)
    }

    pub fn authenticated(&self) -> Option<bool> {
        self.values.get(AUTHENTICATED_KEY).and_then(Value::as_bool)
    }

    /// The stored rider, or `None` if absent or not a rider
    pub fn rider(&self) -> Option<Rider> {
        self.values
            .get(SELF_KEY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn set_state(&mut self, state: impl Into<String>) {
        self.set(STATE_KEY, Value::String(state.into()));
    }

    pub fn set_authenticated(&mut self, authenticated: bool) {
        self.set(AUTHENTICATED_KEY, Value::Bool(authenticated));
    }

    pub fn set_rider(&mut self, rider: &Rider) -> Result<()> {
        let value = serde_json::to_value(rider)?;
        self.set(SELF_KEY, value);
        Ok(())
    }

    /// Raw value access for keys owned by other parts of the app
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.set(key, value);
    }

    fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if self.values.get(&key) != Some(&value) {
            self.values.insert(key, value);
            self.dirty = true;
        }
    }

    /// Whether the record changed since it was loaded
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Id a server-side store keeps this record under; not part of the
    /// serialized form
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn set_session_id(&mut self, id: impl Into<String>) {
        self.session_id = Some(id.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

//! In-memory session representation.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw session values keyed by name.
pub type SessionData = Map<String, Value>;

/// A session loaded for one request.
///
/// `id` is empty for sessions that have never been committed or that are not
/// backed by a server-side store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: String,
    data: SessionData,
}

impl Session {
    pub fn new(id: impl Into<String>, data: SessionData) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The raw data, flash slots included, as a store would persist it.
    pub fn data(&self) -> &SessionData {
        &self.data
    }

    pub fn has(&self, name: &str) -> bool {
        self.data.contains_key(name) || self.data.contains_key(&flash_key(name))
    }

    /// Returns the value stored under `name`.
    ///
    /// A flashed value is removed by this call, so it is only ever returned once.
    pub fn get(&mut self, name: &str) -> Option<Value> {
        if let Some(value) = self.data.get(name) {
            return Some(value.clone());
        }
        let value = self.data.remove(&flash_key(name));
        if value.is_some() {
            log::trace!("Consumed flash value {name}");
        }
        value
    }

    /// Like [`Session::get`], deserializing into `T`.
    pub fn get_as<T: DeserializeOwned>(&mut self, name: &str) -> Result<Option<T>, crate::Error> {
        match self.get(name) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.data.insert(name.to_string(), value);
    }

    /// Sets a value that is removed after the next `get` of the same name.
    pub fn flash(&mut self, name: &str, value: Value) {
        self.data.insert(flash_key(name), value);
    }

    pub fn unset(&mut self, name: &str) {
        self.data.remove(name);
    }
}

fn flash_key(name: &str) -> String {
    format!("__flash_{name}__")
}

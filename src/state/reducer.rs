//! State snapshot owner.

use super::operations::{merge, resolve};
use serde_json::{Map, Value};

/// Owns the current state snapshot and the copy taken before the last merge.
///
/// Nothing hands out references into the live snapshot except for the
/// crate-internal dispatch path; reads from outside always get deep copies.
#[derive(Debug, Default)]
pub struct StateReducer {
    state: Map<String, Value>,
    previous: Map<String, Value>,
}

impl StateReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a data delta into the state.
    pub fn apply(&mut self, delta: &Map<String, Value>) {
        self.previous = self.state.clone();
        merge(&mut self.state, delta);
    }

    /// Deep copy of the current state.
    pub fn get_state(&self) -> Value {
        Value::Object(self.state.clone())
    }

    /// Deep copy of the state as it was before the last merge.
    pub fn previous_state(&self) -> Value {
        Value::Object(self.previous.clone())
    }

    /// Deep copy of the value at a dot path in the current state.
    pub fn get_state_at(&self, path: &str) -> Option<Value> {
        resolve(&self.state, path).cloned()
    }

    pub(crate) fn current(&self) -> &Map<String, Value> {
        &self.state
    }

    pub(crate) fn previous(&self) -> &Map<String, Value> {
        &self.previous
    }
}

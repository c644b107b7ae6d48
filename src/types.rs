//! Core types for the data layer.

use crate::error::HandlerResult;
use crate::listeners::Notification;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Deletion sentinel inside a data payload.
///
/// Merging a key whose value is `DELETE` removes that key from the state
/// instead of storing it, at any depth.
pub const DELETE: Value = Value::Null;

/// Reserved event identities.
pub mod events {
    /// Fired for any entry that changes the state.
    pub const CHANGE: &str = "datalayer:change";
    /// Fired for any committed event, alongside the event's own name.
    pub const EVENT: &str = "datalayer:event";
    /// Fired once after the initial replay.
    pub const READY: &str = "datalayer:ready";
}

/// Classified type of an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemType {
    Data,
    Event,
    ListenerOn,
    ListenerOff,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemType::Data => "data",
            ItemType::Event => "event",
            ItemType::ListenerOn => "listenerOn",
            ItemType::ListenerOff => "listenerOff",
        };
        f.write_str(name)
    }
}

/// Temporal scope of a listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerScope {
    /// Entries already in the log.
    Past,
    /// Entries appended after registration.
    #[default]
    Future,
    /// Both.
    All,
}

impl ListenerScope {
    /// Accepted spellings, in the order they are documented.
    pub const VALUES: [&'static str; 3] = ["past", "future", "all"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListenerScope::Past => "past",
            ListenerScope::Future => "future",
            ListenerScope::All => "all",
        }
    }
}

impl FromStr for ListenerScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "past" => Ok(ListenerScope::Past),
            "future" => Ok(ListenerScope::Future),
            "all" => Ok(ListenerScope::All),
            other => Err(format!("unknown listener scope: {other}")),
        }
    }
}

type HandlerFn = dyn Fn(&Notification<'_>) -> HandlerResult + Send + Sync;

/// Callback attached to a listener.
///
/// Cloning is cheap and keeps the identity: two handlers are the same
/// handler only if one was cloned from the other.
#[derive(Clone)]
pub struct Handler(Arc<HandlerFn>);

impl Handler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Notification<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Handler(Arc::new(f))
    }

    /// Identity comparison.
    pub fn same(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn call(&self, notification: &Notification<'_>) -> HandlerResult {
        (self.0)(notification)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Arc::as_ptr(&self.0))
    }
}

/// A value stored under one key of an entry.
#[derive(Clone, Debug)]
pub enum Field {
    Value(Value),
    Handler(Handler),
}

impl Field {
    /// Truthiness as seen by the shape checker.
    pub(crate) fn is_truthy(&self) -> bool {
        match self {
            Field::Handler(_) => true,
            Field::Value(Value::Null) => false,
            Field::Value(Value::Bool(b)) => *b,
            Field::Value(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
            Field::Value(Value::String(s)) => !s.is_empty(),
            Field::Value(_) => true,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Field::Value(v) => Some(v),
            Field::Handler(_) => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            Field::Handler(h) => Some(h),
            Field::Value(_) => None,
        }
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Field::Value(value)
    }
}

impl From<Handler> for Field {
    fn from(handler: Handler) -> Self {
        Field::Handler(handler)
    }
}

/// One unit pushed to the data layer.
///
/// Entries are untyped key/field maps; their type is derived from their
/// shape when they are classified.
#[derive(Clone, Debug, Default)]
pub struct Entry {
    fields: BTreeMap<String, Field>,
    /// Payload of a non-object entry, until a key is set on it.
    scalar: Option<Value>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an entry from a JSON payload.
    ///
    /// Non-object payloads are kept for diagnostics but never match a shape.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self {
                fields: map.into_iter().map(|(k, v)| (k, Field::Value(v))).collect(),
                scalar: None,
            },
            other => Self {
                fields: BTreeMap::new(),
                scalar: Some(other),
            },
        }
    }

    /// `{ data }`
    pub fn data(data: Value) -> Self {
        Self::new().with("data", data)
    }

    /// `{ event }`
    pub fn event(name: impl Into<String>) -> Self {
        Self::new().with("event", Value::String(name.into()))
    }

    /// `{ on, handler }`
    pub fn on(event: impl Into<String>, handler: Handler) -> Self {
        Self::new()
            .with("on", Value::String(event.into()))
            .with("handler", handler)
    }

    /// `{ off }`
    pub fn off(event: impl Into<String>) -> Self {
        Self::new().with("off", Value::String(event.into()))
    }

    /// Set a key. A non-object payload is discarded.
    pub fn with(mut self, key: impl Into<String>, field: impl Into<Field>) -> Self {
        self.scalar = None;
        self.fields.insert(key.into(), field.into());
        self
    }

    /// Set the `scope` key.
    pub fn scope(self, scope: ListenerScope) -> Self {
        self.with("scope", Value::String(scope.as_str().to_string()))
    }

    /// Set the `path` key.
    pub fn path(self, path: impl Into<String>) -> Self {
        self.with("path", Value::String(path.into()))
    }

    /// Set the `handler` key.
    pub fn handler(self, handler: Handler) -> Self {
        self.with("handler", handler)
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// JSON rendering used in diagnostics. Handlers are omitted.
    pub fn to_json(&self) -> Value {
        if let Some(scalar) = &self.scalar {
            return scalar.clone();
        }
        let map: Map<String, Value> = self
            .fields
            .iter()
            .filter_map(|(k, f)| f.as_value().map(|v| (k.clone(), v.clone())))
            .collect();
        Value::Object(map)
    }
}

impl From<Value> for Entry {
    fn from(value: Value) -> Self {
        Entry::from_json(value)
    }
}

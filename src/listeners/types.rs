//! Listener types.

use crate::items::{Item, ListenerOffConfig, ListenerOnConfig};
use crate::state::touches;
use crate::types::{Handler, ListenerScope};
use serde_json::{Map, Value};

/// A registered observer.
#[derive(Clone, Debug)]
pub struct Listener {
    /// Event identity to listen to.
    pub event: String,
    /// Optional dot path the item's data has to touch.
    pub path: Option<String>,
    pub scope: ListenerScope,
    pub handler: Handler,
}

impl Listener {
    pub fn new(event: impl Into<String>, handler: Handler) -> Self {
        Self {
            event: event.into(),
            path: None,
            scope: ListenerScope::default(),
            handler,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_scope(mut self, scope: ListenerScope) -> Self {
        self.scope = scope;
        self
    }

    /// Check if this listener wants an item.
    pub fn matches(&self, item: &Item) -> bool {
        if !item.identities().contains(&self.event.as_str()) {
            return false;
        }
        match (&self.path, item.data()) {
            (Some(path), Some(data)) => touches(data, path),
            _ => true,
        }
    }
}

impl From<&ListenerOnConfig> for Listener {
    fn from(config: &ListenerOnConfig) -> Self {
        Self {
            event: config.on.clone(),
            path: config.path.clone(),
            scope: config.scope,
            handler: config.handler.clone(),
        }
    }
}

/// Selects listeners to remove.
///
/// Unset fields match anything.
#[derive(Clone, Debug, Default)]
pub struct ListenerRequest {
    pub event: Option<String>,
    pub path: Option<String>,
    pub handler: Option<Handler>,
}

impl ListenerRequest {
    pub fn matches(&self, listener: &Listener) -> bool {
        if let Some(ref event) = self.event {
            if *event != listener.event {
                return false;
            }
        }
        if let Some(ref handler) = self.handler {
            if !handler.same(&listener.handler) {
                return false;
            }
        }
        if let Some(ref path) = self.path {
            if listener.path.as_ref() != Some(path) {
                return false;
            }
        }
        true
    }
}

impl From<&ListenerOffConfig> for ListenerRequest {
    fn from(config: &ListenerOffConfig) -> Self {
        Self {
            event: Some(config.off.clone()),
            path: config.path.clone(),
            handler: config.handler.clone(),
        }
    }
}

/// Snapshots around the merge that produced the item being dispatched.
#[derive(Clone, Copy, Debug)]
pub struct StateView<'a> {
    pub previous: &'a Map<String, Value>,
    pub current: &'a Map<String, Value>,
}

/// Values at a listener's path before and after a live merge.
#[derive(Clone, Debug, PartialEq)]
pub struct PathChange {
    pub before: Option<Value>,
    pub after: Option<Value>,
}

/// What a handler receives.
#[derive(Debug)]
pub struct Notification<'a> {
    pub item: &'a Item,
    /// Identity the listener was registered under.
    pub event: &'a str,
    /// The listener's path filter.
    pub path: Option<&'a str>,
    /// Value at `path` inside the item's data.
    pub value: Option<&'a Value>,
    /// Set for live data-bearing items when a path filter is used.
    pub change: Option<PathChange>,
    /// State before and after this item for live dispatch. `None` for past
    /// replay and the ready notification.
    pub state: Option<StateView<'a>>,
}

impl Notification<'_> {
    /// Data payload of the item, if any.
    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.item.data()
    }

    /// Name of the event for event items.
    pub fn event_name(&self) -> Option<&str> {
        self.item.event_name()
    }
}

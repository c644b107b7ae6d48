//! Listener registry and dispatch.

use crate::diagnostics::Diagnostics;
use crate::error::{DataLayerError, Result};
use crate::items::Item;
use crate::state::resolve;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use super::types::{Listener, ListenerRequest, Notification, PathChange, StateView};

/// Stores listeners in registration order and delivers items to them.
#[derive(Debug)]
pub struct ListenerRegistry {
    listeners: Vec<Listener>,
    diagnostics: Diagnostics,
}

impl ListenerRegistry {
    pub fn new(diagnostics: Diagnostics) -> Self {
        Self {
            listeners: Vec::new(),
            diagnostics,
        }
    }

    /// Store a listener. Duplicates are kept and fire independently.
    pub fn register(&mut self, listener: Listener) {
        tracing::debug!(event = %listener.event, path = ?listener.path, "registering listener");
        self.listeners.push(listener);
    }

    /// Remove every listener matching the request. Returns how many were removed.
    pub fn unregister(&mut self, request: &ListenerRequest) -> usize {
        let before = self.listeners.len();
        self.listeners.retain(|listener| !request.matches(listener));
        let removed = before - self.listeners.len();
        tracing::debug!(event = ?request.event, removed, "unregistered listeners");
        removed
    }

    /// Listeners that want this item, in registration order.
    pub fn matching(&self, item: &Item) -> Vec<&Listener> {
        self.listeners
            .iter()
            .filter(|listener| listener.matches(item))
            .collect()
    }

    /// Deliver an item to every matching listener.
    ///
    /// Handler failures are reported and do not stop delivery to the rest.
    pub fn trigger(&self, item: &Item, state: Option<StateView<'_>>) {
        let matching = self.matching(item);
        tracing::debug!(
            item_type = ?item.item_type(),
            listeners = matching.len(),
            "dispatching item"
        );
        for listener in matching {
            self.deliver(listener, item, state);
        }
    }

    /// Deliver an item to one listener, if it matches.
    pub fn trigger_one(&self, listener: &Listener, item: &Item) {
        if listener.matches(item) {
            self.deliver(listener, item, None);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn deliver(&self, listener: &Listener, item: &Item, state: Option<StateView<'_>>) {
        if let Err(error) = invoke(listener, item, state) {
            self.diagnostics.report(error);
        }
    }
}

fn invoke(listener: &Listener, item: &Item, state: Option<StateView<'_>>) -> Result<()> {
    let path = listener.path.as_deref();
    let value = match (path, item.data()) {
        (Some(p), Some(data)) => resolve(data, p),
        _ => None,
    };
    let change = match (path, state, item.data()) {
        (Some(p), Some(view), Some(_)) => Some(PathChange {
            before: resolve(view.previous, p).cloned(),
            after: resolve(view.current, p).cloned(),
        }),
        _ => None,
    };
    let notification = Notification {
        item,
        event: &listener.event,
        path,
        value,
        change,
        state,
    };

    match catch_unwind(AssertUnwindSafe(|| listener.handler.call(&notification))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(DataLayerError::HandlerFailed {
            event: listener.event.clone(),
            message: e.to_string(),
        }),
        Err(payload) => Err(DataLayerError::HandlerPanicked {
            event: listener.event.clone(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

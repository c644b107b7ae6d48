//! Thread-safe handle to a data layer.

use crate::error::DataLayerError;
use crate::manager::{DataLayer, DataLayerConfig};
use crate::types::Entry;
use crossbeam_channel::Receiver;
use parking_lot::{Mutex, ReentrantMutex};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::Arc;

struct Inner {
    layer: ReentrantMutex<RefCell<DataLayer>>,
    /// Batches pushed from handlers while a push was being processed.
    pending: Mutex<VecDeque<Vec<Entry>>>,
    diagnostics: Receiver<DataLayerError>,
}

/// Cloneable handle shared by several producers.
///
/// Pushes from different threads are serialized. A handler may push through
/// the handle while its own push is being dispatched: the nested batch is
/// queued and processed right after the outer batch, and the nested call
/// returns `None`.
#[derive(Clone)]
pub struct SharedDataLayer {
    inner: Arc<Inner>,
}

impl SharedDataLayer {
    pub fn new(config: DataLayerConfig) -> Self {
        Self::from_layer(DataLayer::new(config))
    }

    pub fn from_layer(layer: DataLayer) -> Self {
        let diagnostics = layer.diagnostics();
        Self {
            inner: Arc::new(Inner {
                layer: ReentrantMutex::new(RefCell::new(layer)),
                pending: Mutex::new(VecDeque::new()),
                diagnostics,
            }),
        }
    }

    /// Push entries. See [`DataLayer::push`].
    pub fn push<I>(&self, entries: I) -> Option<usize>
    where
        I: IntoIterator<Item = Entry>,
    {
        let entries: Vec<Entry> = entries.into_iter().collect();
        let guard = self.inner.layer.lock();
        let Ok(mut layer) = guard.try_borrow_mut() else {
            tracing::debug!(count = entries.len(), "queueing nested push");
            self.inner.pending.lock().push_back(entries);
            return None;
        };

        let result = layer.push(entries);
        loop {
            let next = self.inner.pending.lock().pop_front();
            match next {
                Some(batch) => {
                    layer.push(batch);
                }
                None => break,
            }
        }
        result
    }

    /// Run `f` against the data layer.
    ///
    /// Returns `None` when called from a handler during a push on this handle.
    pub fn with<R>(&self, f: impl FnOnce(&DataLayer) -> R) -> Option<R> {
        let guard = self.inner.layer.lock();
        let layer = guard.try_borrow().ok()?;
        Some(f(&*layer))
    }

    /// Deep copy of the current state. `None` from inside a handler.
    pub fn get_state(&self) -> Option<Value> {
        self.with(DataLayer::get_state)
    }

    /// Copies of the retained entries. `None` from inside a handler.
    pub fn entries(&self) -> Option<Vec<Entry>> {
        self.with(|layer| layer.entries().to_vec())
    }

    pub fn diagnostics(&self) -> Receiver<DataLayerError> {
        self.inner.diagnostics.clone()
    }
}

impl std::fmt::Debug for SharedDataLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedDataLayer").finish_non_exhaustive()
    }
}

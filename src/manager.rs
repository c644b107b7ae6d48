//! The data layer manager tying classification, state and listeners together.

use crate::diagnostics::{Diagnostics, DEFAULT_DIAGNOSTICS_BUFFER};
use crate::error::DataLayerError;
use crate::items::{Item, ItemConfig};
use crate::listeners::{Listener, ListenerRegistry, ListenerRequest, StateView};
use crate::state::StateReducer;
use crate::types::{Entry, ListenerScope};
use crossbeam_channel::Receiver;
use serde_json::Value;

/// Data layer configuration.
#[derive(Clone, Debug)]
pub struct DataLayerConfig {
    /// Entries already in the log before the manager attaches.
    pub data_layer: Option<Vec<Entry>>,

    /// Max buffered diagnostics before new ones are dropped.
    /// Default: 1000
    pub diagnostics_buffer: usize,
}

impl Default for DataLayerConfig {
    fn default() -> Self {
        Self {
            data_layer: None,
            diagnostics_buffer: DEFAULT_DIAGNOSTICS_BUFFER,
        }
    }
}

impl DataLayerConfig {
    /// Configuration replaying the given entries.
    pub fn with_entries(entries: Vec<Entry>) -> Self {
        Self {
            data_layer: Some(entries),
            ..Default::default()
        }
    }

    /// Read a configuration object of the form `{ "dataLayer": [...] }`.
    ///
    /// A missing or non-array `dataLayer` yields an empty log.
    pub fn from_json(config: &Value) -> Self {
        let entries = match config.get("dataLayer") {
            Some(Value::Array(items)) => items.iter().cloned().map(Entry::from_json).collect(),
            Some(other) => {
                tracing::debug!(found = %other, "dataLayer is not an array, starting empty");
                Vec::new()
            }
            None => Vec::new(),
        };
        Self::with_entries(entries)
    }
}

/// The data layer.
///
/// Owns the log of retained data and event entries, the merged state and
/// the listener registry. Every entry goes through the same pipeline:
/// classify, then fold into the state and dispatch (data, event), resolve
/// against history and register (listener on), or unregister (listener off).
/// Listener entries and invalid entries never stay in the log.
///
/// # Example
///
/// ```ignore
/// use datalayer::{DataLayer, DataLayerConfig, Entry, Handler};
///
/// let mut layer = DataLayer::new(DataLayerConfig::default());
/// layer.push([
///     Entry::data(json!({"page": {"title": "Home"}})),
///     Entry::on("click", Handler::new(|n| {
///         println!("{:?}", n.item.entry());
///         Ok(())
///     })),
///     Entry::event("click"),
/// ]);
/// assert_eq!(layer.get_state(), json!({"page": {"title": "Home"}}));
/// ```
#[derive(Debug)]
pub struct DataLayer {
    /// Retained entries, in log order.
    log: Vec<Entry>,

    state: StateReducer,

    listeners: ListenerRegistry,

    diagnostics: Diagnostics,
}

impl DataLayer {
    /// Attach to the configured log, replay it and fire the ready event.
    pub fn new(config: DataLayerConfig) -> Self {
        let diagnostics = Diagnostics::new(config.diagnostics_buffer);
        let mut layer = Self {
            log: config.data_layer.unwrap_or_default(),
            state: StateReducer::new(),
            listeners: ListenerRegistry::new(diagnostics.clone()),
            diagnostics,
        };

        layer.process_existing();
        layer.listeners.trigger(&Item::ready(), None);

        layer
    }

    // --- Log Operations ---

    /// Push entries to the data layer.
    ///
    /// Entries are processed left to right before any of them is added to
    /// the log. Returns the new log length, or `None` if none of the
    /// entries was retained.
    pub fn push<I>(&mut self, entries: I) -> Option<usize>
    where
        I: IntoIterator<Item = Entry>,
    {
        let mut retained = Vec::new();
        for entry in entries {
            let item = Item::new(entry, None);
            self.process_item(&item);
            if item.is_retained() {
                retained.push(item.into_entry());
            }
        }

        if retained.is_empty() {
            return None;
        }
        self.log.extend(retained);
        Some(self.log.len())
    }

    /// Push a single entry.
    pub fn push_one(&mut self, entry: Entry) -> Option<usize> {
        self.push(std::iter::once(entry))
    }

    /// Retained entries, in log order.
    pub fn entries(&self) -> &[Entry] {
        &self.log
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    // --- State Operations ---

    /// Deep copy of the current state.
    pub fn get_state(&self) -> Value {
        self.state.get_state()
    }

    /// Deep copy of the value at a dot path in the current state.
    pub fn get_state_at(&self, path: &str) -> Option<Value> {
        self.state.get_state_at(path)
    }

    /// Deep copy of the state before the last merge.
    pub fn previous_state(&self) -> Value {
        self.state.previous_state()
    }

    // --- Listeners & Diagnostics ---

    /// Number of registered future/all listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Receiver for invalid items and handler failures.
    pub fn diagnostics(&self) -> Receiver<DataLayerError> {
        self.diagnostics.subscribe()
    }

    // --- Processing ---

    /// Process the entries present at attach time, dropping the ones that
    /// must not stay in the log.
    fn process_existing(&mut self) {
        let total = self.log.len();
        let mut i = 0;
        while i < self.log.len() {
            let item = Item::new(self.log[i].clone(), Some(i));
            self.process_item(&item);
            if item.is_retained() {
                i += 1;
            } else {
                self.log.remove(i);
            }
        }
        tracing::debug!(total, retained = self.log.len(), "replayed existing entries");
    }

    fn process_item(&mut self, item: &Item) {
        let Some(config) = item.config() else {
            self.diagnostics.report(DataLayerError::InvalidItem(
                item.entry().to_json().to_string(),
            ));
            return;
        };

        match config {
            ItemConfig::Data(c) => {
                self.state.apply(&c.data);
                self.dispatch(item);
            }
            ItemConfig::Event(c) => {
                if let Some(ref data) = c.data {
                    self.state.apply(data);
                }
                self.dispatch(item);
            }
            ItemConfig::ListenerOn(c) => {
                let listener = Listener::from(c);
                match listener.scope {
                    ListenerScope::Past => {
                        self.replay_to(&listener, item.index());
                    }
                    ListenerScope::Future => {
                        self.listeners.register(listener);
                    }
                    ListenerScope::All => {
                        self.replay_to(&listener, item.index());
                        self.listeners.register(listener);
                    }
                }
            }
            ItemConfig::ListenerOff(c) => {
                self.listeners.unregister(&ListenerRequest::from(c));
            }
        }
    }

    fn dispatch(&self, item: &Item) {
        let current = self.state.current();
        // Items without data leave the state as it was.
        let previous = match item.data() {
            Some(_) => self.state.previous(),
            None => current,
        };
        let view = StateView { previous, current };
        self.listeners.trigger(item, Some(view));
    }

    /// Deliver the entries before `index` to a single listener.
    fn replay_to(&self, listener: &Listener, index: Option<usize>) {
        let history = self.entries_before(index);
        tracing::debug!(event = %listener.event, entries = history.len(), "replaying history");
        for entry in history {
            let past = Item::new(entry.clone(), None);
            self.listeners.trigger_one(listener, &past);
        }
    }

    /// Entries before a position; all entries for a live push, none for a
    /// position past the end.
    fn entries_before(&self, index: Option<usize>) -> &[Entry] {
        match index {
            None => &self.log,
            Some(i) if i < self.log.len() => &self.log[..i],
            Some(_) => &[],
        }
    }
}

//! Classified items.

use super::classifier::classify;
use crate::types::{events, Entry, Field, Handler, ItemType, ListenerScope};
use serde_json::{Map, Value};

/// `{ data }`
#[derive(Clone, Debug)]
pub struct DataConfig {
    pub data: Map<String, Value>,
}

/// `{ event, info?, data? }`
#[derive(Clone, Debug)]
pub struct EventConfig {
    pub event: String,
    pub info: Option<Map<String, Value>>,
    pub data: Option<Map<String, Value>>,
}

/// `{ on, handler, scope?, path? }`
#[derive(Clone, Debug)]
pub struct ListenerOnConfig {
    pub on: String,
    pub handler: Handler,
    pub scope: ListenerScope,
    pub path: Option<String>,
}

/// `{ off, handler?, scope?, path? }`
#[derive(Clone, Debug)]
pub struct ListenerOffConfig {
    pub off: String,
    pub handler: Option<Handler>,
    pub scope: Option<ListenerScope>,
    pub path: Option<String>,
}

/// Typed view of a valid entry. Falsy optional keys are normalized away.
#[derive(Clone, Debug)]
pub enum ItemConfig {
    Data(DataConfig),
    Event(EventConfig),
    ListenerOn(ListenerOnConfig),
    ListenerOff(ListenerOffConfig),
}

impl ItemConfig {
    pub fn item_type(&self) -> ItemType {
        match self {
            ItemConfig::Data(_) => ItemType::Data,
            ItemConfig::Event(_) => ItemType::Event,
            ItemConfig::ListenerOn(_) => ItemType::ListenerOn,
            ItemConfig::ListenerOff(_) => ItemType::ListenerOff,
        }
    }

    fn build(item_type: ItemType, entry: &Entry) -> Option<Self> {
        let config = match item_type {
            ItemType::Data => ItemConfig::Data(DataConfig {
                data: object(entry, "data")?,
            }),
            ItemType::Event => ItemConfig::Event(EventConfig {
                event: string(entry, "event")?,
                info: object(entry, "info"),
                data: object(entry, "data"),
            }),
            ItemType::ListenerOn => ItemConfig::ListenerOn(ListenerOnConfig {
                on: string(entry, "on")?,
                handler: handler(entry)?,
                scope: scope(entry).unwrap_or_default(),
                path: string(entry, "path"),
            }),
            ItemType::ListenerOff => ItemConfig::ListenerOff(ListenerOffConfig {
                off: string(entry, "off")?,
                handler: handler(entry),
                scope: scope(entry),
                path: string(entry, "path"),
            }),
        };
        Some(config)
    }
}

fn truthy<'a>(entry: &'a Entry, key: &str) -> Option<&'a Field> {
    entry.get(key).filter(|f| f.is_truthy())
}

fn object(entry: &Entry, key: &str) -> Option<Map<String, Value>> {
    truthy(entry, key)?.as_value()?.as_object().cloned()
}

fn string(entry: &Entry, key: &str) -> Option<String> {
    truthy(entry, key)?
        .as_value()?
        .as_str()
        .map(str::to_string)
}

fn handler(entry: &Entry) -> Option<Handler> {
    truthy(entry, "handler")?.as_handler().cloned()
}

fn scope(entry: &Entry) -> Option<ListenerScope> {
    string(entry, "scope")?.parse().ok()
}

/// An entry together with its classification.
#[derive(Clone, Debug)]
pub struct Item {
    entry: Entry,
    config: Option<ItemConfig>,
    index: Option<usize>,
    ready: bool,
}

impl Item {
    /// Classify an entry. `index` is its position in the log during the
    /// initial replay, `None` for entries pushed later.
    pub fn new(entry: Entry, index: Option<usize>) -> Self {
        let config = classify(&entry).and_then(|t| ItemConfig::build(t, &entry));
        Self {
            entry,
            config,
            index,
            ready: false,
        }
    }

    /// The readiness pseudo-item.
    pub(crate) fn ready() -> Self {
        let mut item = Self::new(Entry::event(events::READY), None);
        item.ready = true;
        item
    }

    /// The raw entry as it was pushed.
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn into_entry(self) -> Entry {
        self.entry
    }

    /// Typed configuration, `None` when the entry is invalid.
    pub fn config(&self) -> Option<&ItemConfig> {
        self.config.as_ref()
    }

    pub fn item_type(&self) -> Option<ItemType> {
        self.config.as_ref().map(ItemConfig::item_type)
    }

    pub fn is_valid(&self) -> bool {
        self.config.is_some()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Whether this item belongs in the retained log.
    pub fn is_retained(&self) -> bool {
        matches!(self.item_type(), Some(ItemType::Data | ItemType::Event))
    }

    /// Data payload carried by a data or event item.
    pub fn data(&self) -> Option<&Map<String, Value>> {
        match self.config.as_ref()? {
            ItemConfig::Data(c) => Some(&c.data),
            ItemConfig::Event(c) => c.data.as_ref(),
            _ => None,
        }
    }

    /// Event name of an event item.
    pub fn event_name(&self) -> Option<&str> {
        match self.config.as_ref()? {
            ItemConfig::Event(c) => Some(&c.event),
            _ => None,
        }
    }

    /// Event identities this item is delivered under.
    pub fn identities(&self) -> Vec<&str> {
        if self.ready {
            return vec![events::READY];
        }
        match self.config.as_ref() {
            Some(ItemConfig::Data(_)) => vec![events::CHANGE],
            Some(ItemConfig::Event(c)) => {
                let mut ids = vec![events::EVENT, c.event.as_str()];
                if c.data.is_some() {
                    ids.push(events::CHANGE);
                }
                ids
            }
            _ => Vec::new(),
        }
    }
}

//! # Data Layer
//!
//! An append-only log of typed entries that derives a merged state snapshot
//! and ordered notifications to listeners.
//!
//! ## Core Concepts
//!
//! - **Entries**: untyped key maps, classified by shape into data, event,
//!   listener-on and listener-off items
//! - **State**: data payloads folded in log order; `null` deletes a key
//! - **Listeners**: observers bound to an event identity, scoped to past
//!   entries, future entries, or both
//! - **Log**: only data and event entries are retained
//!
//! ## Example
//!
//! ```ignore
//! use datalayer::{events, DataLayer, DataLayerConfig, Entry, Handler, ListenerScope};
//!
//! let mut layer = DataLayer::new(DataLayerConfig::with_entries(vec![
//!     Entry::data(json!({"page": {"title": "Home"}})),
//! ]));
//!
//! // Receive the entry already in the log, and everything after it
//! layer.push([Entry::on(events::CHANGE, Handler::new(|n| {
//!     println!("changed: {:?}", n.data());
//!     Ok(())
//! }))
//! .scope(ListenerScope::All)]);
//!
//! layer.push([Entry::data(json!({"page": {"title": null}}))]);
//! assert_eq!(layer.get_state(), json!({"page": {}}));
//! ```

pub mod diagnostics;
pub mod error;
pub mod items;
pub mod listeners;
pub mod manager;
pub mod shared;
pub mod state;
pub mod types;

// Re-exports
pub use diagnostics::Diagnostics;
pub use error::{DataLayerError, HandlerError, HandlerResult, Result};
pub use items::{
    classify, DataConfig, EventConfig, Item, ItemConfig, ListenerOffConfig, ListenerOnConfig,
};
pub use listeners::{
    Listener, ListenerRegistry, ListenerRequest, Notification, PathChange, StateView,
};
pub use manager::{DataLayer, DataLayerConfig};
pub use shared::SharedDataLayer;
pub use state::{merge, StateReducer};
pub use types::*;

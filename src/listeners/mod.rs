//! Listener registration and dispatch.
//!
//! Listeners are bound to an event identity, optionally narrowed by a dot
//! path into the item's data. Built-in identities:
//! - `datalayer:change` for every item that carries data
//! - `datalayer:event` for every event, next to the event's own name
//! - `datalayer:ready` once, after the initial replay
//!
//! # Example
//!
//! ```ignore
//! let mut registry = ListenerRegistry::new(Diagnostics::default());
//! registry.register(Listener::new("click", Handler::new(|n| {
//!     println!("clicked: {:?}", n.item.entry());
//!     Ok(())
//! })));
//! registry.trigger(&Item::new(Entry::event("click"), None), None);
//! ```

mod registry;
mod types;

pub use registry::ListenerRegistry;
pub use types::{Listener, ListenerRequest, Notification, PathChange, StateView};

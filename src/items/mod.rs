//! Entry classification.
//!
//! Entries are matched against four fixed shapes (data, event, listener-on,
//! listener-off); entries matching none are invalid and are never processed.

mod classifier;
mod item;

pub use classifier::classify;
pub use item::{
    DataConfig, EventConfig, Item, ItemConfig, ListenerOffConfig, ListenerOnConfig,
};

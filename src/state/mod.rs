//! State management.
//!
//! The state is a JSON object folded from every data payload in log order,
//! with `null` acting as a deletion marker at any depth.

mod operations;
mod reducer;

pub use operations::{merge, resolve, touches};
pub use reducer::StateReducer;

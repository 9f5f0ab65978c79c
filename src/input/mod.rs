//! Input collaborator: what conditions are evaluated against.
//!
//! - [`InputSource`]: per-tick key, button, mouse and clock state
//! - [`InputSnapshot`]: a plain value implementation for scripts and tests
//! - [`KeyTable`]: symbolic names for keys and buttons, resolved at parse time

mod keys;
mod source;

pub use keys::KeyTable;
pub use source::{InputSnapshot, InputSource};

//! Core types shared by the query language and the scheduler.
//!
//! Values, sides and turn state, deterministic RNG and configuration.
//! Nothing here knows about query text or phases.

pub mod config;
pub mod rng;
pub mod side;
pub mod value;

pub use config::{BoardConfig, EngineConfig, PieceConfig, SideConfig};
pub use rng::GameRng;
pub use side::{SideId, TurnState};
pub use value::{Attributes, Value};

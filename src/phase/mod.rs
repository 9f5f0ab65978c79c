//! Phases and their scheduler.
//!
//! A [`Phase`] wraps a parsed query with run-state: remaining budget,
//! whether the last unit was spent, and per-activation fire tracking.
//! The [`PhaseScheduler`] owns the ordered phase list and advances it.
//!
//! Completion is reported as a value, never unwound:
//!
//! ```
//! use phaseboard::board::{BoardState, Window};
//! use phaseboard::core::{BoardConfig, EngineConfig};
//! use phaseboard::input::InputSnapshot;
//! use phaseboard::phase::{Phase, TickOutcome};
//! use phaseboard::query::parse_query;
//!
//! let spec = parse_query("1 T TIME 0 -> WINDOW.title = \"go\"", &EngineConfig::default()).unwrap();
//! let mut phase = Phase::from_spec(spec);
//! phase.init_phase();
//!
//! let mut board = BoardState::new(&BoardConfig::default());
//! let mut window = Window::default();
//! let input = InputSnapshot::new();
//!
//! assert_eq!(phase.tick(&mut board, &mut window, &input), TickOutcome::Fired);
//! assert_eq!(phase.tick(&mut board, &mut window, &input), TickOutcome::Completed);
//! assert_eq!(window.title, "go");
//! ```

mod machine;
mod memory;
mod scheduler;

pub use machine::{Phase, PhaseStatus};
pub use memory::PhaseMemory;
pub use scheduler::PhaseScheduler;

use serde::{Deserialize, Serialize};

/// Result of evaluating the current phase for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickOutcome {
    /// Conditions did not hold, or the phase may not fire again yet.
    Skipped,
    /// The effect ran.
    Fired,
    /// The phase is done; the scheduler moves on.
    Completed,
}

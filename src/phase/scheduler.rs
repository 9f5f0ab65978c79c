//! Board-level phase sequencing.

use tracing::{info, warn};

use crate::board::{BoardState, Window};
use crate::core::TurnState;
use crate::input::InputSource;

use super::machine::Phase;
use super::TickOutcome;

/// Ordered phase list with a current index.
///
/// The first phase added is armed immediately. When the current phase
/// completes, the next one is armed; wrapping past the last phase rotates
/// the turn to the next registered side.
#[derive(Clone, Debug, Default)]
pub struct PhaseScheduler {
    phases: Vec<Phase>,
    current: usize,
}

impl PhaseScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a phase.
    pub fn add(&mut self, mut phase: Phase) {
        if self.phases.is_empty() {
            phase.init_phase();
        }
        self.phases.push(phase);
    }

    /// Number of phases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// No phases registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Index of the current phase.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The current phase, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Phase> {
        self.phases.get(self.current)
    }

    /// All phases in registration order.
    #[must_use]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Run one tick of the current phase.
    ///
    /// Null phases are stepped over first. A `Completed` outcome advances
    /// to the next phase before returning.
    pub fn execute(
        &mut self,
        board: &mut BoardState,
        window: &mut Window,
        input: &dyn InputSource,
    ) -> TickOutcome {
        if self.phases.iter().all(Phase::is_null) {
            return TickOutcome::Skipped;
        }

        while self.phases[self.current].is_null() {
            self.end_phase(&mut board.turns);
        }

        let outcome = self.phases[self.current].tick(board, window, input);
        if outcome == TickOutcome::Completed {
            self.end_phase(&mut board.turns);
        }
        outcome
    }

    /// Advance to the next phase, rotating the turn on wrap-around.
    pub fn end_phase(&mut self, turns: &mut TurnState) {
        if self.phases.is_empty() {
            return;
        }

        self.phases[self.current].deactivate();
        self.current += 1;

        if self.current >= self.phases.len() {
            self.current = 0;
            match turns.rotate() {
                Some(side) => info!(
                    turn = %side,
                    turn_number = turns.turn_number(),
                    "turn rotated"
                ),
                None => warn!("phase list wrapped with no sides registered"),
            }
        }

        self.phases[self.current].init_phase();
        info!(phase = self.current, "phase advanced");
    }
}

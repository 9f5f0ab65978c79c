//! The phase state machine.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::board::{BoardState, Window};
use crate::core::config::DEFAULT_MAX_LOOP_ITERATIONS;
use crate::input::InputSource;
use crate::query::effect::{run_program, EffectContext, Flow};
use crate::query::{Budget, ConditionGroup, EffectProgram, PhaseSpec};

use super::memory::PhaseMemory;
use super::TickOutcome;

/// Where a phase is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseStatus {
    /// Not the scheduler's current phase.
    Pending,
    /// Current phase with budget left.
    Armed,
    /// Current phase, budget spent; completes on its next trigger.
    Exhausted,
}

/// One stage of a turn: conditions, an effect, and a fire budget.
///
/// ## Tick evaluation
///
/// 1. Null phase, or conditions not met: `Skipped`. A tick with the
///    conditions unmet also ends the current hold.
/// 2. Budget already spent (or configured as 0): `Completed`, the effect
///    does not run.
/// 3. Non-repeatable and already fired during the current hold: `Skipped`.
/// 4. Otherwise one unit is consumed and the effect runs: `Fired`, or
///    `Completed` if the effect executed `END`.
///
/// A budget of `n` therefore fires exactly `n` times; the next trigger
/// completes the phase. A non-repeatable phase spends one unit per hold,
/// so its conditions must go false between fires.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Phase {
    conditions: ConditionGroup,
    program: EffectProgram,
    budget: Budget,
    repeatable: bool,
    remaining: Budget,
    last_iteration_reached: bool,
    fires: u32,
    held: bool,
    active: bool,
    null: bool,
    loop_limit: u32,
    memory: PhaseMemory,
}

impl Phase {
    /// Create a phase from structured parts.
    #[must_use]
    pub fn new(
        conditions: ConditionGroup,
        program: EffectProgram,
        budget: Budget,
        repeatable: bool,
    ) -> Self {
        Self {
            conditions,
            program,
            budget,
            repeatable,
            remaining: budget,
            last_iteration_reached: false,
            fires: 0,
            held: false,
            active: false,
            null: false,
            loop_limit: DEFAULT_MAX_LOOP_ITERATIONS,
            memory: PhaseMemory::default(),
        }
    }

    /// Create a phase from a parsed query.
    #[must_use]
    pub fn from_spec(spec: PhaseSpec) -> Self {
        Self::new(spec.conditions, spec.program, spec.budget, spec.repeatable)
    }

    /// The inert phase: no conditions, no effect, zero budget.
    ///
    /// Never fires. The scheduler steps over it.
    #[must_use]
    pub fn null() -> Self {
        Self {
            null: true,
            ..Self::new(
                ConditionGroup::never(),
                EffectProgram::empty(),
                Budget::Limited(0),
                false,
            )
        }
    }

    /// Set the per-loop iteration cap for the effect program.
    #[must_use]
    pub fn with_loop_limit(mut self, limit: u32) -> Self {
        self.loop_limit = limit;
        self
    }

    /// Is this the null phase?
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.null
    }

    /// Is this the scheduler's current phase?
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Configured budget.
    #[must_use]
    pub fn budget(&self) -> Budget {
        self.budget
    }

    /// Budget left in this activation.
    #[must_use]
    pub fn remaining(&self) -> Budget {
        self.remaining
    }

    /// May fire more than once per activation.
    #[must_use]
    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    /// Did the last fire spend the final unit?
    #[must_use]
    pub fn last_iteration_reached(&self) -> bool {
        self.last_iteration_reached
    }

    /// Fires since the phase was last armed.
    #[must_use]
    pub fn fires(&self) -> u32 {
        self.fires
    }

    /// Trigger conditions.
    #[must_use]
    pub fn conditions(&self) -> &ConditionGroup {
        &self.conditions
    }

    /// Effect program.
    #[must_use]
    pub fn program(&self) -> &EffectProgram {
        &self.program
    }

    /// `THIS` attributes.
    #[must_use]
    pub fn memory(&self) -> &PhaseMemory {
        &self.memory
    }

    /// Lifecycle state.
    #[must_use]
    pub fn status(&self) -> PhaseStatus {
        if !self.active {
            PhaseStatus::Pending
        } else if self.remaining == Budget::Limited(0) {
            PhaseStatus::Exhausted
        } else {
            PhaseStatus::Armed
        }
    }

    /// Arm the phase: restore the budget and clear per-activation state.
    ///
    /// `THIS` attributes are kept.
    pub fn init_phase(&mut self) {
        self.remaining = self.budget;
        self.last_iteration_reached = false;
        self.fires = 0;
        self.held = false;
        self.active = true;
        self.memory.record(self.remaining.limit(), 0);
    }

    /// Mark the phase as no longer current.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Evaluate one tick.
    pub fn tick(
        &mut self,
        board: &mut BoardState,
        window: &mut Window,
        input: &dyn InputSource,
    ) -> TickOutcome {
        if self.null {
            return TickOutcome::Skipped;
        }
        if !self.conditions.is_met(input) {
            self.held = false;
            return TickOutcome::Skipped;
        }

        if self.remaining == Budget::Limited(0) {
            debug!(budget = %self.budget, "phase budget spent, completing");
            return TickOutcome::Completed;
        }

        if !self.repeatable && self.held {
            return TickOutcome::Skipped;
        }

        if let Budget::Limited(n) = &mut self.remaining {
            *n -= 1;
            if *n == 0 {
                self.last_iteration_reached = true;
            }
        }
        self.fires += 1;
        self.held = true;
        self.memory.record(self.remaining.limit(), self.fires);

        debug!(
            fires = self.fires,
            remaining = %self.remaining,
            last = self.last_iteration_reached,
            "phase fired"
        );

        let mut ctx = EffectContext {
            board,
            window,
            this: &mut self.memory,
            input,
            max_loop_iterations: self.loop_limit,
        };
        match run_program(&self.program, &mut ctx) {
            Ok(Flow::EndPhase) => {
                debug!("effect ended the phase");
                TickOutcome::Completed
            }
            Ok(Flow::Continue) => TickOutcome::Fired,
            Err(error) => {
                warn!(%error, "effect program failed");
                TickOutcome::Fired
            }
        }
    }
}

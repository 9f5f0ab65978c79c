//! # phaseboard
//!
//! A turn-phase engine for grid board games, driven by a small query
//! language.
//!
//! A game is a board of pieces plus an ordered list of phases. Each phase
//! is one query:
//!
//! ```text
//! [count] [repeatable] CONDITION [&& | || CONDITION]... -> effect
//! ```
//!
//! Every tick the board evaluates the current phase against the input
//! state. When its conditions hold the effect program runs; when its
//! budget is spent or the effect says `END`, the next phase takes over.
//! Wrapping past the last phase passes the turn to the next side.
//!
//! ## Design Principles
//!
//! 1. **Parse once**: queries are read into conditions and an effect AST
//!    when the phase is added. Ticks never touch query text.
//!
//! 2. **Degrade, don't abort**: a query that names a piece or attribute the
//!    board does not have becomes the null phase, which is skipped.
//!
//! 3. **Outcomes are values**: phase completion is a [`phase::TickOutcome`],
//!    not an unwinding signal.
//!
//! ## Modules
//!
//! - `core`: values, sides and turn order, RNG, configuration
//! - `input`: key tables and input sources
//! - `board`: pieces, window, board state and the [`Board`] itself
//! - `query`: the query reader and the effect language
//! - `phase`: the phase state machine and scheduler
//! - `error`: error types
//! - `logging`: subscriber setup for binaries

pub mod board;
pub mod core;
pub mod error;
pub mod input;
pub mod logging;
pub mod phase;
pub mod query;

// Re-export commonly used types
pub use crate::core::{
    Attributes, BoardConfig, EngineConfig, GameRng, PieceConfig, SideConfig, SideId, TurnState,
    Value,
};

pub use crate::input::{InputSnapshot, InputSource, KeyTable};

pub use crate::board::{Board, BoardState, Direction, Piece, Scriptable, Window};

pub use crate::query::{
    parse_query, read_header, read_input, read_output, read_repeatability, resolve,
    split_query_blocks, Budget, Combinator, Condition, ConditionGroup, ConditionKind,
    EffectProgram, PhaseSpec,
};

pub use crate::phase::{Phase, PhaseScheduler, PhaseStatus, TickOutcome};

pub use crate::error::{BoardError, ConfigError, EvalError, QueryError, UnresolvedReference};

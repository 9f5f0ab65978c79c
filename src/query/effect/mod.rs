//! The effect language.
//!
//! The body after `->` is a small indentation-based imperative language,
//! parsed once into an [`EffectProgram`] and run on every fire.
//!
//! ## Example
//!
//! ```text
//! PEACE[0].move(UP)
//! if PEACE[0].row == 0:
//!     END
//! ```
//!
//! ## Targets
//!
//! - `BOARD`: geometry, turn, directions (`BOARD.UP`), `BOARD.end_phase()`
//! - `PIECE[i]` (alias `PEACE[i]`, `BOARD.pieces[i]`): row, column, side,
//!   custom attributes, `move(step)`, `place(row, column)`
//! - `WINDOW`: title, width, height, custom attributes
//! - `THIS`: per-phase memory that survives between fires
//!
//! `END` stops the program and completes the phase.

mod ast;
mod interpreter;
mod lexer;
mod parser;

pub use ast::{BinaryOp, Builtin, EffectProgram, Expr, Stmt, TargetRef, UnaryOp};
pub use interpreter::{run_program, EffectContext, Flow};
pub use parser::parse_program;

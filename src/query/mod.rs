//! The phase query language.
//!
//! A query is one line (or block) of text describing a phase:
//!
//! ```text
//! 2 T KEY f || MOUSE 2 -> PEACE[0].move(DOWN)
//! ```
//!
//! - `header`: repeat count and repeatability flag
//! - `condition`: trigger conditions and their evaluation
//! - `effect`: the effect language (lexer, parser, interpreter)
//! - `reader`: whole-query parsing and phase-file splitting
//! - `resolve`: setup-time checks against a board

mod condition;
pub mod effect;
mod header;
mod reader;
mod resolve;

pub use condition::{read_input, Combinator, Condition, ConditionGroup, ConditionKind, Rect};
pub use effect::EffectProgram;
pub use header::{read_header, read_repeatability, Budget};
pub use reader::{parse_query, read_output, split_query_blocks, PhaseSpec, BLOCK_SEPARATOR};
pub use resolve::resolve;

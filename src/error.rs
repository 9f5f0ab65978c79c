//! Error types for `phaseboard`.
//!
//! Errors are split by when they can happen:
//!
//! - [`QueryError`]: malformed query text, raised when a phase is added
//! - [`UnresolvedReference`]: a query names board state that does not
//!   exist; the phase degrades to the null phase instead of failing
//! - [`EvalError`]: an effect program failed while running; logged, never
//!   propagated out of a tick
//! - [`BoardError`]: misuse of the board API
//! - [`ConfigError`]: loading configuration or phase files

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Parse-time Errors
// ============================================================================

/// Malformed phase query.
///
/// Every variant carries the offending query text so the report can be
/// shown to the author as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// No `->` separates conditions from the effect body.
    #[error("missing `->` in query {query:?}")]
    MissingArrow {
        /// Offending query text
        query: String,
    },

    /// A condition term did not split into a kind and a value.
    #[error("malformed condition {term:?} in query {query:?}: expected `KIND VALUE`")]
    MalformedCondition {
        /// The condition term
        term: String,
        /// Offending query text
        query: String,
    },

    /// A condition term used an unknown kind keyword.
    #[error("unknown condition kind {kind:?} in query {query:?}")]
    UnknownConditionKind {
        /// The kind keyword as written
        kind: String,
        /// Offending query text
        query: String,
    },

    /// A `KEY` condition named a key missing from the key table.
    #[error("unknown key name {name:?} in query {query:?}")]
    UnknownKey {
        /// The key name as written
        name: String,
        /// Offending query text
        query: String,
    },

    /// A `MOUSE` condition named an unknown button.
    #[error("unknown mouse button {name:?} in query {query:?}")]
    UnknownButton {
        /// The button name as written
        name: String,
        /// Offending query text
        query: String,
    },

    /// A condition value has the wrong shape for its kind.
    #[error("invalid value {value:?} for {kind} condition in query {query:?}: {reason}")]
    InvalidConditionValue {
        /// Condition kind keyword
        kind: &'static str,
        /// The value as written
        value: String,
        /// What was expected
        reason: &'static str,
        /// Offending query text
        query: String,
    },

    /// `&&` and `||` were mixed in a single condition group.
    #[error("condition group mixes `&&` and `||` in query {query:?}")]
    MixedCombinators {
        /// Offending query text
        query: String,
    },

    /// The effect body is missing or empty.
    #[error("malformed effect in query {query:?}: {reason}")]
    MalformedEffect {
        /// What is wrong with the body
        reason: String,
        /// Offending query text
        query: String,
    },

    /// The effect body has a syntax error.
    #[error("syntax error on effect line {line}: {message}")]
    Syntax {
        /// 1-based line within the effect body
        line: usize,
        /// Description of the problem
        message: String,
    },
}

/// Result type for query parsing.
pub type QueryResult<T> = Result<T, QueryError>;

// ============================================================================
// Setup-time Resolution
// ============================================================================

/// A symbolic reference that cannot be resolved against the board.
///
/// Not fatal: the phase that contains it is registered as the null phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnresolvedReference {
    /// `PIECE[i]` with `i` outside the registered pieces.
    #[error("piece index {index} out of range ({count} pieces registered)")]
    Piece {
        /// Referenced index
        index: i64,
        /// Number of registered pieces
        count: usize,
    },

    /// `BOARD.<attr>` that the board does not expose.
    #[error("board has no attribute `{0}`")]
    BoardAttribute(String),

    /// `WINDOW.<attr>` that the window does not expose.
    #[error("window has no attribute `{0}`")]
    WindowAttribute(String),
}

// ============================================================================
// Run-time Errors
// ============================================================================

/// Failure while executing an effect program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Attribute does not exist on the target.
    #[error("{target} has no attribute `{attr}`")]
    UnknownAttribute {
        /// Target description (`BOARD`, `PIECE[0]`, ...)
        target: String,
        /// Attribute name
        attr: String,
    },

    /// Attribute exists but cannot be assigned.
    #[error("attribute `{attr}` of {target} is read-only")]
    ReadOnlyAttribute {
        /// Target description
        target: String,
        /// Attribute name
        attr: String,
    },

    /// Method does not exist on the target.
    #[error("{target} has no method `{method}`")]
    UnknownMethod {
        /// Target description
        target: String,
        /// Method name
        method: String,
    },

    /// Wrong number of arguments.
    #[error("`{name}` expects {expected} argument(s), got {got}")]
    Arity {
        /// Method or builtin name
        name: String,
        /// Expected count
        expected: usize,
        /// Provided count
        got: usize,
    },

    /// Operand or argument of the wrong type.
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: &'static str,
        /// Actual type name
        got: &'static str,
    },

    /// Unsupported operand combination for an operator.
    #[error("unsupported operands for `{op}`: {lhs} and {rhs}")]
    UnsupportedOperands {
        /// Operator symbol
        op: &'static str,
        /// Left operand type
        lhs: &'static str,
        /// Right operand type
        rhs: &'static str,
    },

    /// Local variable read before assignment.
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),

    /// Piece index out of range at run time.
    #[error("piece index {index} out of range ({count} pieces)")]
    PieceOutOfRange {
        /// Referenced index
        index: i64,
        /// Number of pieces
        count: usize,
    },

    /// Assigned side is not registered on the board.
    #[error("side {0} is not registered")]
    UnknownSide(i64),

    /// Integer division or modulo by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Arithmetic overflow.
    #[error("integer overflow in `{0}`")]
    Overflow(&'static str),

    /// A `for` loop exceeded the configured iteration cap.
    #[error("loop of {requested} iterations exceeds the limit of {limit}")]
    LoopLimit {
        /// Requested iteration count
        requested: i64,
        /// Configured cap
        limit: u32,
    },
}

/// Result type for effect evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

// ============================================================================
// Board and Configuration Errors
// ============================================================================

/// Misuse of the board API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// Pieces for this side were already added.
    #[error("side {side} already registered (registered: {registered:?})")]
    SideAlreadyRegistered {
        /// The side being registered again
        side: u8,
        /// All registered sides
        registered: Vec<u8>,
    },

    /// The selected cell is outside the board.
    #[error("position ({x}, {y}) is outside the board")]
    OutOfBounds {
        /// Pixel x
        x: i64,
        /// Pixel y
        y: i64,
    },

    /// The selected cell holds no piece.
    #[error("no piece at row {row}, column {column}")]
    EmptyCell {
        /// Cell row
        row: i64,
        /// Cell column
        column: i64,
    },

    /// The selected piece belongs to a side whose turn it is not.
    #[error("piece {index} belongs to side {side}, not the side to move")]
    OpponentPiece {
        /// Piece index
        index: usize,
        /// Owning side
        side: u8,
    },
}

/// Failure loading configuration or phase files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON could not be parsed.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// A phase query in the file is malformed.
    #[error("phase {index} in {path}: {source}")]
    Query {
        /// File path
        path: PathBuf,
        /// 0-based block index
        index: usize,
        /// Underlying error
        #[source]
        source: QueryError,
    },

    /// Board setup described by the file is invalid.
    #[error(transparent)]
    Board(#[from] BoardError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_mentions_query() {
        let err = QueryError::MissingArrow {
            query: "2 T KEY k".to_string(),
        };
        assert_eq!(err.to_string(), "missing `->` in query \"2 T KEY k\"");
    }

    #[test]
    fn unresolved_piece_display() {
        let err = UnresolvedReference::Piece { index: 9, count: 2 };
        assert_eq!(err.to_string(), "piece index 9 out of range (2 pieces registered)");
    }

    #[test]
    fn eval_error_display() {
        let err = EvalError::UnknownAttribute {
            target: "PIECE[0]".to_string(),
            attr: "hp".to_string(),
        };
        assert_eq!(err.to_string(), "PIECE[0] has no attribute `hp`");
    }

    #[test]
    fn config_error_wraps_board_error() {
        let err: ConfigError = BoardError::SideAlreadyRegistered {
            side: 1,
            registered: vec![0, 1],
        }
        .into();
        assert!(err.to_string().contains("side 1 already registered"));
    }
}

//! Board state: geometry, pieces, turn and RNG.
//!
//! This is everything an effect program can touch through `BOARD` and
//! `PIECE[i]`. The phase list lives next to it in [`Board`](super::Board)
//! so the scheduler can borrow the state mutably while it runs a phase.

use serde::{Deserialize, Serialize};

use crate::core::{BoardConfig, GameRng, SideId, TurnState, Value};
use crate::error::{EvalError, EvalResult};

use super::host::{self, Scriptable};
use super::piece::Piece;

/// Attributes readable through `BOARD.<attr>`.
pub const BOARD_ATTRIBUTES: &[&str] = &[
    "rows",
    "columns",
    "cell_width",
    "cell_height",
    "top",
    "left",
    "width",
    "height",
    "turn",
    "turn_number",
    "piece_count",
    "UP",
    "DOWN",
    "LEFT",
    "RIGHT",
];

/// Board-relative unit step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards row 0.
    Up,
    /// Towards the last row.
    Down,
    /// Towards column 0.
    Left,
    /// Towards the last column.
    Right,
}

impl Direction {
    /// Parse an upper-case direction keyword.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "UP" => Some(Self::Up),
            "DOWN" => Some(Self::Down),
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            _ => None,
        }
    }

    /// `(row, column)` step.
    #[must_use]
    pub const fn step(self) -> (i64, i64) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }
}

/// Grid geometry plus everything effect programs mutate.
#[derive(Clone, Debug)]
pub struct BoardState {
    rows: i64,
    columns: i64,
    cell_width: i64,
    cell_height: i64,
    top: i64,
    left: i64,
    pieces: Vec<Piece>,
    /// Registered sides and the side to move.
    pub turns: TurnState,
    /// RNG behind the `rand` builtin.
    pub rng: GameRng,
}

impl BoardState {
    /// Create an empty board from its configuration (pieces are not added).
    #[must_use]
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            rows: config.rows,
            columns: config.columns,
            cell_width: config.cell_width,
            cell_height: config.cell_height,
            top: config.origin.0,
            left: config.origin.1,
            pieces: Vec::new(),
            turns: TurnState::new(),
            rng: GameRng::new(config.seed),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> i64 {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn columns(&self) -> i64 {
        self.columns
    }

    /// Pieces in registration order.
    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Piece by registration index.
    #[must_use]
    pub fn piece(&self, index: usize) -> Option<&Piece> {
        self.pieces.get(index)
    }

    /// Resolve a script index to a piece, failing with an [`EvalError`].
    pub fn piece_mut_checked(&mut self, index: i64) -> EvalResult<&mut Piece> {
        let count = self.pieces.len();
        usize::try_from(index)
            .ok()
            .and_then(|i| self.pieces.get_mut(i))
            .ok_or(EvalError::PieceOutOfRange { index, count })
    }

    /// Resolve a script index to a piece, failing with an [`EvalError`].
    pub fn piece_checked(&self, index: i64) -> EvalResult<&Piece> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.pieces.get(i))
            .ok_or(EvalError::PieceOutOfRange {
                index,
                count: self.pieces.len(),
            })
    }

    /// Side whose turn it is.
    #[must_use]
    pub fn turn(&self) -> Option<SideId> {
        self.turns.turn()
    }

    /// Total board width in pixels, saturating at the `i64` limits.
    #[must_use]
    pub fn width(&self) -> i64 {
        self.columns.saturating_mul(self.cell_width)
    }

    /// Total board height in pixels, saturating at the `i64` limits.
    #[must_use]
    pub fn height(&self) -> i64 {
        self.rows.saturating_mul(self.cell_height)
    }

    /// Is `(row, column)` on the grid?
    #[must_use]
    pub fn in_bounds(&self, row: i64, column: i64) -> bool {
        (0..self.rows).contains(&row) && (0..self.columns).contains(&column)
    }

    /// Index of the first piece at `(row, column)`.
    #[must_use]
    pub fn piece_at(&self, row: i64, column: i64) -> Option<usize> {
        self.pieces
            .iter()
            .position(|p| p.row() == row && p.column() == column)
    }

    /// Convert a pixel position to a `(row, column)` cell.
    ///
    /// Returns `None` outside the board.
    #[must_use]
    pub fn cell_at(&self, x: i64, y: i64) -> Option<(i64, i64)> {
        if self.cell_width <= 0 || self.cell_height <= 0 {
            return None;
        }
        let row = y.checked_sub(self.top)?.div_euclid(self.cell_height);
        let column = x.checked_sub(self.left)?.div_euclid(self.cell_width);
        self.in_bounds(row, column).then_some((row, column))
    }

    pub(crate) fn push_piece(&mut self, mut piece: Piece, side: SideId) {
        piece.register(self.pieces.len(), side);
        self.pieces.push(piece);
    }
}

impl Scriptable for BoardState {
    fn label(&self) -> String {
        "BOARD".to_string()
    }

    fn has_attr(&self, attr: &str) -> bool {
        BOARD_ATTRIBUTES.contains(&attr)
    }

    fn get_attr(&self, attr: &str) -> EvalResult<Value> {
        let value = match attr {
            "rows" => Value::Int(self.rows),
            "columns" => Value::Int(self.columns),
            "cell_width" => Value::Int(self.cell_width),
            "cell_height" => Value::Int(self.cell_height),
            "top" => Value::Int(self.top),
            "left" => Value::Int(self.left),
            "width" => Value::Int(self.width()),
            "height" => Value::Int(self.height()),
            "turn" => self.turn().map(|s| i64::from(s.raw())).into(),
            "turn_number" => Value::Int(i64::from(self.turns.turn_number())),
            "piece_count" => Value::Int(self.pieces.len() as i64),
            _ => match Direction::from_keyword(attr) {
                Some(direction) => direction.step().into(),
                None => return Err(host::unknown_attr(self, attr)),
            },
        };
        Ok(value)
    }

    fn set_attr(&mut self, attr: &str, value: Value) -> EvalResult<()> {
        match attr {
            "turn" => {
                let raw = host::expect_int(&value)?;
                let side = u8::try_from(raw)
                    .map(SideId::new)
                    .map_err(|_| EvalError::UnknownSide(raw))?;
                if self.turns.set_turn(side) {
                    Ok(())
                } else {
                    Err(EvalError::UnknownSide(raw))
                }
            }
            _ if self.has_attr(attr) => Err(host::read_only(self, attr)),
            _ => Err(host::unknown_attr(self, attr)),
        }
    }

    fn call_method(&mut self, method: &str, args: &[Value]) -> EvalResult<Value> {
        match method {
            "piece_at" => {
                host::check_arity(method, 2, args)?;
                let (row, column) = (host::expect_int(&args[0])?, host::expect_int(&args[1])?);
                Ok(self.piece_at(row, column).map(|i| i as i64).into())
            }
            "in_bounds" => {
                host::check_arity(method, 2, args)?;
                let (row, column) = (host::expect_int(&args[0])?, host::expect_int(&args[1])?);
                Ok(Value::Bool(self.in_bounds(row, column)))
            }
            _ => Err(host::unknown_method(self, method)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> BoardState {
        let config = BoardConfig::new(8, 6).with_cell_size(100, 80).with_origin(10, 20);
        let mut state = BoardState::new(&config);
        state.turns.register(SideId::new(0));
        state.turns.register(SideId::new(1));
        state.push_piece(Piece::new(4, 0), SideId::new(0));
        state.push_piece(Piece::new(0, 5), SideId::new(1));
        state
    }

    #[test]
    fn test_geometry() {
        let state = board();
        assert_eq!(state.width(), 600);
        assert_eq!(state.height(), 640);
        assert!(state.in_bounds(7, 5));
        assert!(!state.in_bounds(8, 0));
        assert!(!state.in_bounds(0, -1));
    }

    #[test]
    fn test_cell_at() {
        let state = board();
        // origin is (top = 10, left = 20)
        assert_eq!(state.cell_at(20, 10), Some((0, 0)));
        assert_eq!(state.cell_at(119, 89), Some((0, 0)));
        assert_eq!(state.cell_at(120, 90), Some((1, 1)));
        assert_eq!(state.cell_at(19, 10), None);
        assert_eq!(state.cell_at(20 + 600, 10), None);
    }

    #[test]
    fn test_extreme_geometry_does_not_overflow() {
        let config = BoardConfig::new(i64::MAX, 3)
            .with_cell_size(i64::MAX, 2)
            .with_origin(i64::MIN, i64::MAX);
        let state = BoardState::new(&config);
        assert_eq!(state.width(), i64::MAX);
        assert_eq!(state.height(), i64::MAX);

        assert_eq!(state.cell_at(i64::MAX, i64::MIN), Some((0, 0)));
        assert_eq!(state.cell_at(i64::MIN, i64::MIN), None);
        assert_eq!(state.cell_at(i64::MAX, i64::MAX), None);
    }

    #[test]
    fn test_piece_lookup() {
        let state = board();
        assert_eq!(state.piece_at(4, 0), Some(0));
        assert_eq!(state.piece_at(0, 5), Some(1));
        assert_eq!(state.piece_at(3, 3), None);
        assert_eq!(state.piece(1).map(Piece::index), Some(1));
        assert!(state.piece_checked(2).is_err());
        assert!(state.piece_checked(-1).is_err());
    }

    #[test]
    fn test_script_attributes() {
        let state = board();
        assert_eq!(state.get_attr("rows"), Ok(Value::Int(8)));
        assert_eq!(state.get_attr("turn"), Ok(Value::Int(0)));
        assert_eq!(state.get_attr("piece_count"), Ok(Value::Int(2)));
        assert_eq!(state.get_attr("UP"), Ok(Value::Pair(-1, 0)));
        assert_eq!(state.get_attr("RIGHT"), Ok(Value::Pair(0, 1)));
        assert!(state.get_attr("pieces").is_err());
        assert!(state.has_attr("turn_number"));
    }

    #[test]
    fn test_set_turn() {
        let mut state = board();
        state.set_attr("turn", Value::Int(1)).unwrap();
        assert_eq!(state.turn(), Some(SideId::new(1)));

        assert_eq!(state.set_attr("turn", Value::Int(7)), Err(EvalError::UnknownSide(7)));
        assert_eq!(state.set_attr("turn", Value::Int(-1)), Err(EvalError::UnknownSide(-1)));
        assert!(matches!(
            state.set_attr("rows", Value::Int(3)),
            Err(EvalError::ReadOnlyAttribute { .. })
        ));
    }

    #[test]
    fn test_script_methods() {
        let mut state = board();
        assert_eq!(
            state.call_method("piece_at", &[Value::Int(0), Value::Int(5)]),
            Ok(Value::Int(1))
        );
        assert_eq!(
            state.call_method("piece_at", &[Value::Int(1), Value::Int(1)]),
            Ok(Value::None)
        );
        assert_eq!(
            state.call_method("in_bounds", &[Value::Int(9), Value::Int(1)]),
            Ok(Value::Bool(false))
        );
    }

    #[test]
    fn test_direction_steps() {
        assert_eq!(Direction::from_keyword("UP").map(Direction::step), Some((-1, 0)));
        assert_eq!(Direction::Down.step(), (1, 0));
        assert_eq!(Direction::Left.step(), (0, -1));
        assert_eq!(Direction::from_keyword("up"), None);
    }
}

//! Pieces on the grid.

use serde::{Deserialize, Serialize};

use crate::core::{Attributes, SideId, Value};
use crate::error::{EvalError, EvalResult};

use super::host::{self, Scriptable};

/// A piece at a grid cell, owned by a side.
///
/// Effect programs address pieces by registration index (`PIECE[i]`).
/// Besides position and side, a piece carries free-form custom
/// attributes that games use for their own state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    index: usize,
    row: i64,
    column: i64,
    side: Option<SideId>,
    /// Game-defined attributes.
    pub attributes: Attributes,
}

impl Piece {
    /// Create an unregistered piece at a cell.
    #[must_use]
    pub fn new(row: i64, column: i64) -> Self {
        Self {
            index: 0,
            row,
            column,
            side: None,
            attributes: Attributes::default(),
        }
    }

    /// Attach a custom attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Registration index on the board.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current row.
    #[must_use]
    pub fn row(&self) -> i64 {
        self.row
    }

    /// Current column.
    #[must_use]
    pub fn column(&self) -> i64 {
        self.column
    }

    /// Owning side, once registered.
    #[must_use]
    pub fn side(&self) -> Option<SideId> {
        self.side
    }

    /// Move by a `(row, column)` step.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Overflow`] if either coordinate would leave the
    /// `i64` range; the piece is left where it was.
    pub fn step(&mut self, (d_row, d_column): (i64, i64)) -> EvalResult<()> {
        let row = self.row.checked_add(d_row);
        let column = self.column.checked_add(d_column);
        let (Some(row), Some(column)) = (row, column) else {
            return Err(EvalError::Overflow("move"));
        };
        self.row = row;
        self.column = column;
        Ok(())
    }

    /// Move to an absolute cell.
    pub fn place(&mut self, row: i64, column: i64) {
        self.row = row;
        self.column = column;
    }

    pub(crate) fn register(&mut self, index: usize, side: SideId) {
        self.index = index;
        self.side = Some(side);
    }
}

impl Scriptable for Piece {
    fn label(&self) -> String {
        format!("PIECE[{}]", self.index)
    }

    fn has_attr(&self, attr: &str) -> bool {
        matches!(attr, "row" | "column" | "side" | "index") || self.attributes.contains_key(attr)
    }

    fn get_attr(&self, attr: &str) -> EvalResult<Value> {
        match attr {
            "row" => Ok(Value::Int(self.row)),
            "column" => Ok(Value::Int(self.column)),
            "side" => Ok(self.side.map(|s| i64::from(s.raw())).into()),
            "index" => Ok(Value::Int(self.index as i64)),
            _ => self
                .attributes
                .get(attr)
                .cloned()
                .ok_or_else(|| host::unknown_attr(self, attr)),
        }
    }

    fn set_attr(&mut self, attr: &str, value: Value) -> EvalResult<()> {
        match attr {
            "row" => self.row = host::expect_int(&value)?,
            "column" => self.column = host::expect_int(&value)?,
            "side" | "index" => return Err(host::read_only(self, attr)),
            _ => {
                self.attributes.insert(attr.to_string(), value);
            }
        }
        Ok(())
    }

    fn call_method(&mut self, method: &str, args: &[Value]) -> EvalResult<Value> {
        match method {
            "move" => {
                host::check_arity(method, 1, args)?;
                self.step(host::expect_pair(&args[0])?)?;
                Ok(Value::None)
            }
            "place" => {
                host::check_arity(method, 2, args)?;
                self.place(host::expect_int(&args[0])?, host::expect_int(&args[1])?);
                Ok(Value::None)
            }
            _ => Err(host::unknown_method(self, method)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_and_place() {
        let mut piece = Piece::new(4, 0);
        piece.step((-1, 0)).unwrap();
        assert_eq!((piece.row(), piece.column()), (3, 0));

        piece.place(7, 7);
        assert_eq!((piece.row(), piece.column()), (7, 7));
    }

    #[test]
    fn test_step_overflow_leaves_piece() {
        let mut piece = Piece::new(i64::MAX, 0);
        assert_eq!(piece.step((1, 0)), Err(EvalError::Overflow("move")));
        assert_eq!((piece.row(), piece.column()), (i64::MAX, 0));

        let mut piece = Piece::new(0, i64::MIN);
        assert!(matches!(
            piece.call_method("move", &[Value::Pair(-1, -1)]),
            Err(EvalError::Overflow("move"))
        ));
        assert_eq!((piece.row(), piece.column()), (0, i64::MIN));
    }

    #[test]
    fn test_script_attributes() {
        let mut piece = Piece::new(2, 3).with_attribute("hp", 5i64);
        piece.register(1, SideId::new(0));

        assert_eq!(piece.get_attr("row"), Ok(Value::Int(2)));
        assert_eq!(piece.get_attr("side"), Ok(Value::Int(0)));
        assert_eq!(piece.get_attr("index"), Ok(Value::Int(1)));
        assert_eq!(piece.get_attr("hp"), Ok(Value::Int(5)));
        assert!(piece.has_attr("hp"));
        assert!(!piece.has_attr("mana"));

        piece.set_attr("column", Value::Int(6)).unwrap();
        piece.set_attr("mana", Value::Int(2)).unwrap();
        assert_eq!(piece.column(), 6);
        assert_eq!(piece.get_attr("mana"), Ok(Value::Int(2)));

        assert_eq!(
            piece.set_attr("side", Value::Int(1)),
            Err(EvalError::ReadOnlyAttribute {
                target: "PIECE[1]".to_string(),
                attr: "side".to_string()
            })
        );
    }

    #[test]
    fn test_script_methods() {
        let mut piece = Piece::new(4, 4);
        piece.call_method("move", &[Value::Pair(1, -1)]).unwrap();
        assert_eq!((piece.row(), piece.column()), (5, 3));

        piece
            .call_method("place", &[Value::Int(0), Value::Int(1)])
            .unwrap();
        assert_eq!((piece.row(), piece.column()), (0, 1));

        assert!(matches!(
            piece.call_method("move", &[Value::Int(1)]),
            Err(EvalError::TypeMismatch { .. })
        ));
        assert!(matches!(
            piece.call_method("jump", &[]),
            Err(EvalError::UnknownMethod { .. })
        ));
    }

    #[test]
    fn test_unregistered_side_is_none() {
        let piece = Piece::new(0, 0);
        assert_eq!(piece.get_attr("side"), Ok(Value::None));
    }
}

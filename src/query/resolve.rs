//! Setup-time reference checks.
//!
//! A query is resolved once, when its phase is added to a board. Literal
//! piece indices and `BOARD`/`WINDOW` attribute reads are checked against
//! the live hosts; anything dynamic (computed indices, `THIS`) is left to
//! run time.

use rustc_hash::FxHashSet;

use crate::board::{BoardState, Scriptable, Window};
use crate::error::UnresolvedReference;

use super::effect::{Expr, TargetRef};
use super::reader::PhaseSpec;

/// Check that a parsed query only names things the board has.
///
/// Window attributes assigned anywhere in the same program count as
/// present, so `WINDOW.score = 0` followed by `WINDOW.score += 1` resolves.
///
/// # Errors
///
/// The first [`UnresolvedReference`] found, in program order.
pub fn resolve(
    spec: &PhaseSpec,
    board: &BoardState,
    window: &Window,
) -> Result<(), UnresolvedReference> {
    let mut assigned_window = FxHashSet::default();
    let mut first_error = None;

    spec.program.visit_assignments(&mut |target, attr| {
        if *target == TargetRef::Window {
            assigned_window.insert(attr.to_string());
        }
        if first_error.is_none() {
            first_error = check_piece(target, board).err();
        }
    });

    spec.program.visit_exprs(&mut |expr| {
        if first_error.is_some() {
            return;
        }
        let outcome = match expr {
            Expr::GetAttr { target, attr } => check_piece(target, board).and_then(|()| match target {
                TargetRef::Board if !board.has_attr(attr) => {
                    Err(UnresolvedReference::BoardAttribute(attr.clone()))
                }
                TargetRef::Window if !window.has_attr(attr) && !assigned_window.contains(attr) => {
                    Err(UnresolvedReference::WindowAttribute(attr.clone()))
                }
                _ => Ok(()),
            }),
            Expr::CallMethod { target, .. } => check_piece(target, board),
            _ => Ok(()),
        };
        first_error = outcome.err();
    });

    first_error.map_or(Ok(()), Err)
}

fn check_piece(target: &TargetRef, board: &BoardState) -> Result<(), UnresolvedReference> {
    match target.literal_piece_index() {
        Some(index) if board.piece_checked(index).is_err() => Err(UnresolvedReference::Piece {
            index,
            count: board.pieces().len(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Piece;
    use crate::core::{BoardConfig, EngineConfig, SideId};
    use crate::query::parse_query;

    fn board() -> BoardState {
        let mut state = BoardState::new(&BoardConfig::new(8, 8));
        state.turns.register(SideId::new(0));
        state.push_piece(Piece::new(4, 0), SideId::new(0));
        state.push_piece(Piece::new(3, 3), SideId::new(0));
        state
    }

    fn check(query: &str) -> Result<(), UnresolvedReference> {
        let spec = parse_query(query, &EngineConfig::default()).unwrap();
        resolve(&spec, &board(), &Window::default())
    }

    #[test]
    fn test_valid_references() {
        assert!(check("KEY k -> PEACE[1].move(UP)").is_ok());
        assert!(check("KEY k -> if BOARD.rows > PIECE[0].row: WINDOW.title = \"x\"").is_ok());
        assert!(check("KEY k -> for i in range(9): PIECE[i].move(UP)").is_ok());
    }

    #[test]
    fn test_piece_out_of_range() {
        assert_eq!(
            check("2 T KEY k -> PIECE[9].move(UP)"),
            Err(UnresolvedReference::Piece { index: 9, count: 2 })
        );
        assert_eq!(
            check("KEY k -> if True:\n    PIECE[-1].row = 0"),
            Err(UnresolvedReference::Piece { index: -1, count: 2 })
        );
    }

    #[test]
    fn test_unknown_host_attributes() {
        assert_eq!(
            check("KEY k -> x = BOARD.depth"),
            Err(UnresolvedReference::BoardAttribute("depth".into()))
        );
        assert_eq!(
            check("KEY k -> x = WINDOW.score"),
            Err(UnresolvedReference::WindowAttribute("score".into()))
        );
    }

    #[test]
    fn test_window_attribute_assigned_in_program() {
        assert!(check("KEY k -> WINDOW.score = 0\nWINDOW.score += 1").is_ok());
    }
}

//! The board and the objects effect programs act on.
//!
//! - [`Board`]: board state plus its phase scheduler; the entry point for games
//! - [`BoardState`]: geometry, pieces, turn and RNG (`BOARD`, `PIECE[i]`)
//! - [`Window`]: attributes of the rendering surface (`WINDOW`)
//! - [`Scriptable`]: the attribute/method resolver every host implements

mod game_board;
pub(crate) mod host;
mod piece;
mod state;
mod window;

pub use game_board::Board;
pub use host::Scriptable;
pub use piece::Piece;
pub use state::{BoardState, Direction, BOARD_ATTRIBUTES};
pub use window::Window;

//! The board: state plus its phase scheduler.

use std::path::Path;

use tracing::{info, warn};

use crate::core::{BoardConfig, EngineConfig, SideId};
use crate::error::{BoardError, ConfigError, QueryError, QueryResult};
use crate::input::InputSource;
use crate::phase::{Phase, PhaseScheduler, TickOutcome};
use crate::query::{parse_query, resolve, split_query_blocks};

use super::piece::Piece;
use super::state::BoardState;
use super::window::Window;

/// A grid board driven by phase queries.
///
/// ## Example
///
/// ```
/// use phaseboard::board::{Board, Piece, Window};
/// use phaseboard::core::{BoardConfig, SideId};
/// use phaseboard::input::InputSnapshot;
///
/// let mut board = Board::new(&BoardConfig::new(8, 8));
/// board.add_pieces(SideId::new(0), [Piece::new(4, 0)]).unwrap();
///
/// let mut window = Window::default();
/// board.add_phase("2 T KEY k -> PEACE[0].move(UP)", &window).unwrap();
///
/// let k = InputSnapshot::new().with_key(i64::from(b'k'));
/// board.execute(&mut window, &k);
/// assert_eq!(board.pieces()[0].row(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct Board {
    state: BoardState,
    phases: PhaseScheduler,
    engine: EngineConfig,
}

impl Board {
    /// Create an empty board with the default engine settings.
    ///
    /// Sides listed in `config` are not registered; use
    /// [`Board::from_config`] for that.
    #[must_use]
    pub fn new(config: &BoardConfig) -> Self {
        Self::with_engine(config, EngineConfig::default())
    }

    /// Create an empty board with explicit engine settings.
    #[must_use]
    pub fn with_engine(config: &BoardConfig, engine: EngineConfig) -> Self {
        Self {
            state: BoardState::new(config),
            phases: PhaseScheduler::new(),
            engine,
        }
    }

    /// Create a board and register every side and piece in `config`.
    ///
    /// # Errors
    ///
    /// [`BoardError::SideAlreadyRegistered`] if a side appears twice.
    pub fn from_config(config: &BoardConfig, engine: EngineConfig) -> Result<Self, BoardError> {
        let mut board = Self::with_engine(config, engine);
        for side in &config.sides {
            let pieces = side.pieces.iter().map(|p| {
                let mut piece = Piece::new(p.row, p.column);
                piece.attributes = p.attributes.clone();
                piece
            });
            board.add_pieces(side.side, pieces)?;
        }
        Ok(board)
    }

    /// Board state.
    #[must_use]
    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Mutable board state.
    pub fn state_mut(&mut self) -> &mut BoardState {
        &mut self.state
    }

    /// Engine settings.
    #[must_use]
    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Pieces in registration order.
    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        self.state.pieces()
    }

    /// Side whose turn it is.
    #[must_use]
    pub fn turn(&self) -> Option<SideId> {
        self.state.turn()
    }

    /// Registered sides.
    #[must_use]
    pub fn sides(&self) -> &[SideId] {
        self.state.turns.sides()
    }

    /// The phase list.
    #[must_use]
    pub fn phases(&self) -> &PhaseScheduler {
        &self.phases
    }

    /// Index of the current phase.
    #[must_use]
    pub fn current_phase_index(&self) -> usize {
        self.phases.current_index()
    }

    /// Register a side with its pieces.
    ///
    /// The first registered side takes the turn.
    ///
    /// # Errors
    ///
    /// [`BoardError::SideAlreadyRegistered`] if `side` already has pieces.
    pub fn add_pieces(
        &mut self,
        side: SideId,
        pieces: impl IntoIterator<Item = Piece>,
    ) -> Result<(), BoardError> {
        if !self.state.turns.register(side) {
            return Err(BoardError::SideAlreadyRegistered {
                side: side.raw(),
                registered: self.sides().iter().map(|s| s.raw()).collect(),
            });
        }
        let before = self.state.pieces().len();
        for piece in pieces {
            self.state.push_piece(piece, side);
        }
        info!(
            %side,
            pieces = self.state.pieces().len() - before,
            "side registered"
        );
        Ok(())
    }

    /// Parse a query and append it as a phase.
    ///
    /// A query that names pieces or attributes the board does not have is
    /// added as the null phase, with a warning.
    ///
    /// # Errors
    ///
    /// Any [`QueryError`]; nothing is added in that case.
    pub fn add_phase(&mut self, query: &str, window: &Window) -> QueryResult<()> {
        let spec = parse_query(query, &self.engine)?;
        let phase = match resolve(&spec, &self.state, window) {
            Ok(()) => Phase::from_spec(spec).with_loop_limit(self.engine.max_loop_iterations),
            Err(reference) => {
                warn!(
                    query = query.trim(),
                    %reference,
                    "unresolved reference, registering null phase"
                );
                Phase::null()
            }
        };
        self.phases.add(phase);
        Ok(())
    }

    /// Append an already-built phase.
    pub fn push_phase(&mut self, phase: Phase) {
        self.phases.add(phase);
    }

    /// Add every query of a `----`-separated phase file.
    ///
    /// Returns the number of phases added. Stops at the first malformed
    /// query; phases before it stay added.
    ///
    /// # Errors
    ///
    /// The failing query's index and [`QueryError`].
    pub fn add_phases_from_str(
        &mut self,
        text: &str,
        window: &Window,
    ) -> Result<usize, (usize, QueryError)> {
        let blocks = split_query_blocks(text);
        for (index, block) in blocks.iter().enumerate() {
            self.add_phase(block, window).map_err(|e| (index, e))?;
        }
        Ok(blocks.len())
    }

    /// Load a phase file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Query`] for a malformed query.
    pub fn load_phases(&mut self, path: impl AsRef<Path>, window: &Window) -> Result<usize, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_phases_from_str(&text, window)
            .map_err(|(index, source)| ConfigError::Query {
                path: path.to_path_buf(),
                index,
                source,
            })
    }

    /// Run one tick of the current phase.
    pub fn execute(&mut self, window: &mut Window, input: &dyn InputSource) -> TickOutcome {
        self.phases.execute(&mut self.state, window, input)
    }

    /// Force the current phase to end.
    pub fn end_phase(&mut self) {
        self.phases.end_phase(&mut self.state.turns);
    }

    /// Cell under a pixel position.
    #[must_use]
    pub fn cell_at(&self, x: i64, y: i64) -> Option<(i64, i64)> {
        self.state.cell_at(x, y)
    }

    /// Pick the piece under a pixel position for the side to move.
    ///
    /// # Errors
    ///
    /// [`BoardError::OutOfBounds`] off the board, [`BoardError::EmptyCell`]
    /// with no piece there, [`BoardError::OpponentPiece`] when the piece
    /// belongs to another side.
    pub fn select_piece(&self, x: i64, y: i64) -> Result<&Piece, BoardError> {
        let (row, column) = self.cell_at(x, y).ok_or(BoardError::OutOfBounds { x, y })?;
        let index = self
            .state
            .piece_at(row, column)
            .ok_or(BoardError::EmptyCell { row, column })?;
        let piece = &self.state.pieces()[index];
        match piece.side() {
            Some(side) if Some(side) == self.turn() => Ok(piece),
            side => Err(BoardError::OpponentPiece {
                index,
                side: side.map_or(0, SideId::raw),
            }),
        }
    }
}

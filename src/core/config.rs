//! Board and engine configuration.
//!
//! Games configure the engine at startup by providing:
//! - `BoardConfig`: grid geometry, RNG seed, and the initial pieces per side
//! - `EngineConfig`: how queries are read and how effects are bounded
//!
//! Both deserialize from JSON so a board can be described in a file.

use serde::{Deserialize, Serialize};

use crate::input::KeyTable;

use super::{Attributes, SideId};

/// Default cap on iterations of a single `for` loop in an effect.
pub const DEFAULT_MAX_LOOP_ITERATIONS: u32 = 10_000;

/// Initial placement of one piece.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceConfig {
    /// Starting row.
    pub row: i64,
    /// Starting column.
    pub column: i64,
    /// Custom attributes.
    #[serde(default)]
    pub attributes: Attributes,
}

impl PieceConfig {
    /// Create a piece placement without custom attributes.
    #[must_use]
    pub fn at(row: i64, column: i64) -> Self {
        Self {
            row,
            column,
            attributes: Attributes::default(),
        }
    }
}

/// One side and its pieces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideConfig {
    /// Side identifier.
    pub side: SideId,
    /// Pieces belonging to the side, in registration order.
    #[serde(default)]
    pub pieces: Vec<PieceConfig>,
}

/// Board geometry and initial contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Number of rows.
    pub rows: i64,
    /// Number of columns.
    pub columns: i64,
    /// Cell width in pixels.
    pub cell_width: i64,
    /// Cell height in pixels.
    pub cell_height: i64,
    /// Pixel position of the top-left corner, `(top, left)`.
    pub origin: (i64, i64),
    /// Seed for the board RNG.
    pub seed: u64,
    /// Sides in registration order.
    pub sides: Vec<SideConfig>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: 8,
            columns: 8,
            cell_width: 100,
            cell_height: 100,
            origin: (0, 0),
            seed: 0,
            sides: Vec::new(),
        }
    }
}

impl BoardConfig {
    /// Create a configuration for a `rows` x `columns` grid.
    #[must_use]
    pub fn new(rows: i64, columns: i64) -> Self {
        Self {
            rows,
            columns,
            ..Self::default()
        }
    }

    /// Set the cell size in pixels.
    #[must_use]
    pub fn with_cell_size(mut self, width: i64, height: i64) -> Self {
        self.cell_width = width;
        self.cell_height = height;
        self
    }

    /// Set the pixel origin `(top, left)`.
    #[must_use]
    pub fn with_origin(mut self, top: i64, left: i64) -> Self {
        self.origin = (top, left);
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Add a side with its pieces.
    #[must_use]
    pub fn with_side(mut self, side: SideId, pieces: impl IntoIterator<Item = PieceConfig>) -> Self {
        self.sides.push(SideConfig {
            side,
            pieces: pieces.into_iter().collect(),
        });
        self
    }
}

/// Query-reading and execution settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Symbolic key and button names.
    pub keys: KeyTable,
    /// Repeatability assumed when a query's flag is missing or malformed.
    pub default_repeatable: bool,
    /// Upper bound on iterations of one `for` loop.
    pub max_loop_iterations: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            keys: KeyTable::default(),
            default_repeatable: true,
            max_loop_iterations: DEFAULT_MAX_LOOP_ITERATIONS,
        }
    }
}

impl EngineConfig {
    /// Replace the key table.
    #[must_use]
    pub fn with_keys(mut self, keys: KeyTable) -> Self {
        self.keys = keys;
        self
    }

    /// Set the loop iteration cap.
    #[must_use]
    pub fn with_max_loop_iterations(mut self, limit: u32) -> Self {
        self.max_loop_iterations = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_config_builder() {
        let config = BoardConfig::new(6, 7)
            .with_cell_size(50, 40)
            .with_origin(10, 20)
            .with_seed(99)
            .with_side(SideId::new(0), [PieceConfig::at(5, 0), PieceConfig::at(5, 1)])
            .with_side(SideId::new(1), [PieceConfig::at(0, 0)]);

        assert_eq!(config.rows, 6);
        assert_eq!(config.columns, 7);
        assert_eq!(config.cell_width, 50);
        assert_eq!(config.cell_height, 40);
        assert_eq!(config.origin, (10, 20));
        assert_eq!(config.seed, 99);
        assert_eq!(config.sides.len(), 2);
        assert_eq!(config.sides[0].pieces.len(), 2);
    }

    #[test]
    fn test_board_config_json_defaults() {
        let json = r#"{ "rows": 3, "sides": [ { "side": 1, "pieces": [ { "row": 2, "column": 0 } ] } ] }"#;
        let config: BoardConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.rows, 3);
        assert_eq!(config.columns, 8);
        assert_eq!(config.cell_width, 100);
        assert_eq!(config.sides[0].side, SideId::new(1));
        assert_eq!(config.sides[0].pieces[0], PieceConfig::at(2, 0));
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert!(config.default_repeatable);
        assert_eq!(config.max_loop_iterations, DEFAULT_MAX_LOOP_ITERATIONS);
        assert_eq!(config.keys.key("k"), Some(107));

        let capped = EngineConfig::default().with_max_loop_iterations(3);
        assert_eq!(capped.max_loop_iterations, 3);
    }
}

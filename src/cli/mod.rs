//! CLI command implementations for phaseboard.

pub(crate) mod check;
pub(crate) mod run;

mod output;

use std::path::Path;

use clap::ValueEnum;
use phaseboard::board::{Board, Window};
use phaseboard::core::{BoardConfig, EngineConfig};
use phaseboard::error::{BoardError, ConfigError};
use serde::Deserialize;
use thiserror::Error;

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Contents of a board setup file.
///
/// Every section is optional; missing sections take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Setup {
    /// Geometry, seed and initial pieces.
    pub(crate) board: BoardConfig,
    /// Key table and execution limits.
    pub(crate) engine: EngineConfig,
    /// Initial window attributes.
    pub(crate) window: Window,
}

impl Setup {
    /// Read a setup file, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build the board described by the setup, without phases.
    pub(crate) fn board(&self) -> Result<Board, BoardError> {
        Board::from_config(&self.board, self.engine.clone())
    }
}

/// CLI error type.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Setup, phase or script file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The setup describes an invalid board.
    #[error(transparent)]
    Board(#[from] BoardError),

    /// Report serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Writing output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Anything else, already formatted for the user.
    #[error("{0}")]
    Message(String),
}

impl CliError {
    /// Create a plain message error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

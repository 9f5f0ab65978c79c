//! Headless scripted simulation.

use std::path::{Path, PathBuf};

use phaseboard::error::ConfigError;
use phaseboard::input::{InputSnapshot, KeyTable};
use serde::Deserialize;
use tracing::debug;

use super::output::{format_text, RunReport, TickCounts};
use super::{CliError, OutputFormat, Setup};

/// A key or button, by code or by name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum InputName {
    /// Raw code or index.
    Code(i64),
    /// Name resolved through the key table.
    Name(String),
}

/// One scripted input frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct Frame {
    /// Keys held down.
    pub(crate) keys: Vec<InputName>,
    /// Mouse buttons held down.
    pub(crate) buttons: Vec<InputName>,
    /// Mouse position; keeps the previous position when absent.
    pub(crate) mouse: Option<(i64, i64)>,
    /// Clock in ms; keeps the previous value when absent.
    pub(crate) ticks: Option<u64>,
    /// Number of ticks this frame is held for.
    pub(crate) repeat: Option<u32>,
}

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the setup, phase or script file cannot be loaded,
/// or a frame names an unknown key or button.
pub(crate) fn execute(
    board: Option<PathBuf>,
    phases: PathBuf,
    script: PathBuf,
    format: OutputFormat,
) -> Result<(), CliError> {
    let setup = Setup::load(board.as_deref())?;
    let frames = load_script(&script)?;
    let report = simulate(&setup, &phases, &frames)?;

    match format {
        OutputFormat::Text => print!("{}", format_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn load_script(path: &Path) -> Result<Vec<Frame>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let frames = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(frames)
}

/// Run every frame against a board built from `setup`.
pub(super) fn simulate(setup: &Setup, phases: &Path, frames: &[Frame]) -> Result<RunReport, CliError> {
    let mut board = setup.board()?;
    let mut window = setup.window.clone();
    board.load_phases(phases, &window)?;

    let keys = board.engine().keys.clone();
    let mut counts = TickCounts::default();
    let mut input = InputSnapshot::new();

    for (index, frame) in frames.iter().enumerate() {
        input = snapshot(frame, &keys, &input)
            .map_err(|e| CliError::new(format!("frame {index}: {e}")))?;
        for _ in 0..frame.repeat.unwrap_or(1) {
            let outcome = board.execute(&mut window, &input);
            debug!(frame = index, ?outcome, phase = board.current_phase_index(), "tick");
            counts.record(outcome);
        }
    }

    Ok(RunReport::new(&board, &window, counts))
}

fn snapshot(frame: &Frame, keys: &KeyTable, previous: &InputSnapshot) -> Result<InputSnapshot, String> {
    let mut input = InputSnapshot::new()
        .with_mouse(previous.mouse.0, previous.mouse.1)
        .at_tick(frame.ticks.unwrap_or(previous.ticks));
    if let Some((x, y)) = frame.mouse {
        input = input.with_mouse(x, y);
    }

    for key in &frame.keys {
        let code = match key {
            InputName::Code(code) => *code,
            InputName::Name(name) => keys
                .key(name)
                .ok_or_else(|| format!("unknown key name {name:?}"))?,
        };
        input = input.with_key(code);
    }

    for button in &frame.buttons {
        let index = match button {
            InputName::Code(code) => {
                usize::try_from(*code).map_err(|_| format!("invalid button index {code}"))?
            }
            InputName::Name(name) => keys
                .button(name)
                .ok_or_else(|| format!("unknown mouse button {name:?}"))?,
        };
        input = input.with_button(index);
    }

    Ok(input)
}

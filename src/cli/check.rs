//! Phase file validation command implementation.

use std::path::{Path, PathBuf};

use phaseboard::board::Board;

use super::{CliError, Setup};

/// Execute the check command.
///
/// Every file is loaded against a fresh board built from the setup, so
/// piece indices and attributes are resolved the same way `run` would.
///
/// # Errors
///
/// Returns an error if the setup cannot be loaded or any file fails.
pub(crate) fn execute(files: Vec<PathBuf>, board: Option<PathBuf>) -> Result<(), CliError> {
    let setup = Setup::load(board.as_deref())?;

    let mut failed = 0usize;
    for file in &files {
        let mut board = setup.board()?;
        match check_file(&mut board, &setup, file) {
            Ok(summary) => {
                print_check(&file.display().to_string(), true);
                println!("      {summary}");
            }
            Err(e) => {
                print_check(&file.display().to_string(), false);
                println!("      {e}");
                failed += 1;
            }
        }
    }

    println!();
    if failed > 0 {
        return Err(CliError::new(format!(
            "{failed} of {} file(s) failed validation",
            files.len()
        )));
    }
    println!("All {} file(s) valid", files.len());
    Ok(())
}

fn check_file(board: &mut Board, setup: &Setup, file: &Path) -> Result<String, CliError> {
    let added = board.load_phases(file, &setup.window)?;
    let null: Vec<String> = board
        .phases()
        .phases()
        .iter()
        .enumerate()
        .filter(|(_, phase)| phase.is_null())
        .map(|(i, _)| i.to_string())
        .collect();

    if null.is_empty() {
        Ok(format!("{added} phase(s)"))
    } else {
        Ok(format!(
            "{added} phase(s), unresolved references in phase(s) {}",
            null.join(", ")
        ))
    }
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}

//! Output formatting utilities for CLI.

use phaseboard::board::{Board, Window};
use phaseboard::core::Attributes;
use phaseboard::phase::TickOutcome;
use serde::Serialize;

/// Tick outcomes over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub(super) struct TickCounts {
    pub(super) skipped: u64,
    pub(super) fired: u64,
    pub(super) completed: u64,
}

impl TickCounts {
    pub(super) fn record(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Skipped => self.skipped += 1,
            TickOutcome::Fired => self.fired += 1,
            TickOutcome::Completed => self.completed += 1,
        }
    }

    fn total(self) -> u64 {
        self.skipped + self.fired + self.completed
    }
}

/// JSON-serializable piece.
#[derive(Debug, Serialize)]
pub(super) struct JsonPiece {
    pub(super) index: usize,
    pub(super) side: Option<u8>,
    pub(super) row: i64,
    pub(super) column: i64,
    pub(super) attributes: Attributes,
}

/// Final board after a scripted run.
#[derive(Debug, Serialize)]
pub(super) struct RunReport {
    pub(super) ticks: TickCounts,
    /// Side to move, null when no side is registered.
    pub(super) turn: Option<u8>,
    pub(super) turn_number: u32,
    pub(super) current_phase: usize,
    pub(super) phase_count: usize,
    pub(super) pieces: Vec<JsonPiece>,
    pub(super) window: Window,
}

impl RunReport {
    pub(super) fn new(board: &Board, window: &Window, ticks: TickCounts) -> Self {
        Self {
            ticks,
            turn: board.turn().map(|side| side.raw()),
            turn_number: board.state().turns.turn_number(),
            current_phase: board.current_phase_index(),
            phase_count: board.phases().len(),
            pieces: board
                .pieces()
                .iter()
                .map(|piece| JsonPiece {
                    index: piece.index(),
                    side: piece.side().map(|side| side.raw()),
                    row: piece.row(),
                    column: piece.column(),
                    attributes: piece.attributes.clone(),
                })
                .collect(),
            window: window.clone(),
        }
    }
}

/// Format a run report as human-readable text.
pub(super) fn format_text(report: &RunReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Ticks: {} ({} fired, {} completed, {} skipped)\n",
        report.ticks.total(),
        report.ticks.fired,
        report.ticks.completed,
        report.ticks.skipped
    ));
    match report.turn {
        Some(side) => output.push_str(&format!(
            "Turn: side {side} (turn {})\n",
            report.turn_number
        )),
        None => output.push_str("Turn: none\n"),
    }
    output.push_str(&format!(
        "Phase: {} of {}\n",
        report.current_phase, report.phase_count
    ));

    output.push_str("Pieces:\n");
    for piece in &report.pieces {
        let side = piece
            .side
            .map_or_else(|| "-".to_string(), |side| side.to_string());
        output.push_str(&format!(
            "  [{}] side {side} at ({}, {})",
            piece.index, piece.row, piece.column
        ));
        let mut names: Vec<&String> = piece.attributes.keys().collect();
        names.sort();
        for name in names {
            output.push_str(&format!(" {name}={}", piece.attributes[name]));
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "Window: {:?} {}x{}\n",
        report.window.title, report.window.width, report.window.height
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use phaseboard::board::Piece;
    use phaseboard::core::{BoardConfig, SideId};

    #[test]
    fn test_format_text() {
        let mut board = Board::new(&BoardConfig::new(4, 4));
        board
            .add_pieces(SideId::new(0), [Piece::new(1, 2).with_attribute("hp", 3)])
            .unwrap();
        let mut ticks = TickCounts::default();
        ticks.record(TickOutcome::Fired);
        ticks.record(TickOutcome::Skipped);

        let report = RunReport::new(&board, &Window::new("demo", 10, 20), ticks);
        let text = format_text(&report);
        assert!(text.contains("Ticks: 2 (1 fired, 0 completed, 1 skipped)"));
        assert!(text.contains("Turn: side 0 (turn 1)"));
        assert!(text.contains("[0] side 0 at (1, 2) hp=3"));
        assert!(text.contains("Window: \"demo\" 10x20"));
    }
}

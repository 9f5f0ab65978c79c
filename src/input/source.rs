//! Per-tick input state consumed by condition evaluation.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Live input state for one tick.
///
/// Implemented by whatever polls the window library; conditions read it
/// fresh every tick and never cache results.
pub trait InputSource {
    /// Is the key with this code held down?
    fn is_key_pressed(&self, code: i64) -> bool;

    /// Is the mouse button with this index held down?
    fn is_button_pressed(&self, button: usize) -> bool;

    /// Current mouse position in window pixels.
    fn mouse_position(&self) -> (i64, i64);

    /// Monotonic milliseconds since start.
    fn ticks(&self) -> u64;
}

/// A plain snapshot of input state.
///
/// Used for headless simulation, recorded scripts and tests.
///
/// ```
/// use phaseboard::input::{InputSnapshot, InputSource};
///
/// let input = InputSnapshot::new().with_key(107).with_mouse(10, 20).at_tick(500);
/// assert!(input.is_key_pressed(107));
/// assert_eq!(input.mouse_position(), (10, 20));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Pressed key codes.
    pub keys: FxHashSet<i64>,
    /// Pressed mouse-button indices.
    pub buttons: FxHashSet<usize>,
    /// Mouse position.
    pub mouse: (i64, i64),
    /// Milliseconds since start.
    pub ticks: u64,
}

impl InputSnapshot {
    /// Create an idle snapshot (nothing pressed, tick 0).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as pressed.
    #[must_use]
    pub fn with_key(mut self, code: i64) -> Self {
        self.keys.insert(code);
        self
    }

    /// Mark a mouse button as pressed.
    #[must_use]
    pub fn with_button(mut self, button: usize) -> Self {
        self.buttons.insert(button);
        self
    }

    /// Set the mouse position.
    #[must_use]
    pub fn with_mouse(mut self, x: i64, y: i64) -> Self {
        self.mouse = (x, y);
        self
    }

    /// Set the tick counter.
    #[must_use]
    pub fn at_tick(mut self, ticks: u64) -> Self {
        self.ticks = ticks;
        self
    }
}

impl InputSource for InputSnapshot {
    fn is_key_pressed(&self, code: i64) -> bool {
        self.keys.contains(&code)
    }

    fn is_button_pressed(&self, button: usize) -> bool {
        self.buttons.contains(&button)
    }

    fn mouse_position(&self) -> (i64, i64) {
        self.mouse
    }

    fn ticks(&self) -> u64 {
        self.ticks
    }
}

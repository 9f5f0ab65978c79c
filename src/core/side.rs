//! Sides and turn rotation.
//!
//! ## SideId
//!
//! Opaque identifier for a side (player) on the board. Sides are
//! registered when their pieces are added; the engine never assumes a
//! fixed number of them.
//!
//! ## TurnState
//!
//! The ordered list of registered sides plus the side whose turn it is.
//! Rotation is round-robin over registration order.

use serde::{Deserialize, Serialize};

/// Side (player) identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SideId(pub u8);

impl SideId {
    /// Create a new side ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw side value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for SideId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Side {}", self.0)
    }
}

/// Registered sides and the active turn.
///
/// Invariant: `turn` is either `None` (nothing registered yet) or one of
/// `sides`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    sides: Vec<SideId>,
    turn: Option<SideId>,
    /// Completed rotations plus one (starts at 1).
    turn_number: u32,
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnState {
    /// Create an empty turn state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sides: Vec::new(),
            turn: None,
            turn_number: 1,
        }
    }

    /// Register a side. The first registered side takes the turn.
    ///
    /// Returns `false` if the side was already registered.
    pub fn register(&mut self, side: SideId) -> bool {
        if self.sides.contains(&side) {
            return false;
        }
        self.sides.push(side);
        if self.turn.is_none() {
            self.turn = Some(side);
        }
        true
    }

    /// Registered sides in registration order.
    #[must_use]
    pub fn sides(&self) -> &[SideId] {
        &self.sides
    }

    /// Side whose turn it is.
    #[must_use]
    pub fn turn(&self) -> Option<SideId> {
        self.turn
    }

    /// Current turn number.
    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// Check if a side is registered.
    #[must_use]
    pub fn is_registered(&self, side: SideId) -> bool {
        self.sides.contains(&side)
    }

    /// Hand the turn to a registered side.
    ///
    /// Returns `false` (and changes nothing) for an unregistered side.
    pub fn set_turn(&mut self, side: SideId) -> bool {
        if !self.is_registered(side) {
            return false;
        }
        self.turn = Some(side);
        true
    }

    /// Advance to the next side in registration order.
    ///
    /// Returns the new side, or `None` if no side is registered.
    pub fn rotate(&mut self) -> Option<SideId> {
        let current = self.turn?;
        let position = self.sides.iter().position(|&s| s == current)?;
        let next = self.sides[(position + 1) % self.sides.len()];
        self.turn = Some(next);
        self.turn_number += 1;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_id_basics() {
        let side = SideId::new(3);
        assert_eq!(side.raw(), 3);
        assert_eq!(format!("{}", side), "Side 3");
    }

    #[test]
    fn test_first_registered_side_takes_turn() {
        let mut turns = TurnState::new();
        assert_eq!(turns.turn(), None);

        assert!(turns.register(SideId::new(5)));
        assert!(turns.register(SideId::new(2)));

        assert_eq!(turns.turn(), Some(SideId::new(5)));
        assert_eq!(turns.sides(), &[SideId::new(5), SideId::new(2)]);
    }

    #[test]
    fn test_register_twice() {
        let mut turns = TurnState::new();
        assert!(turns.register(SideId::new(0)));
        assert!(!turns.register(SideId::new(0)));
        assert_eq!(turns.sides().len(), 1);
    }

    #[test]
    fn test_rotation_uses_registration_order() {
        let mut turns = TurnState::new();
        turns.register(SideId::new(7));
        turns.register(SideId::new(1));
        turns.register(SideId::new(4));

        assert_eq!(turns.rotate(), Some(SideId::new(1)));
        assert_eq!(turns.rotate(), Some(SideId::new(4)));
        assert_eq!(turns.rotate(), Some(SideId::new(7)));
        assert_eq!(turns.turn_number(), 4);
    }

    #[test]
    fn test_rotate_without_sides() {
        let mut turns = TurnState::new();
        assert_eq!(turns.rotate(), None);
        assert_eq!(turns.turn_number(), 1);
    }

    #[test]
    fn test_set_turn_requires_registration() {
        let mut turns = TurnState::new();
        turns.register(SideId::new(0));
        turns.register(SideId::new(1));

        assert!(turns.set_turn(SideId::new(1)));
        assert_eq!(turns.turn(), Some(SideId::new(1)));

        assert!(!turns.set_turn(SideId::new(9)));
        assert_eq!(turns.turn(), Some(SideId::new(1)));
    }
}

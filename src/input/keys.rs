//! Symbolic key and mouse-button names.
//!
//! Queries may name keys (`KEY k`, `KEY space`) and buttons
//! (`MOUSE LEFT`) instead of numeric codes. The [`KeyTable`] resolves
//! those names once, when the query is parsed; an unknown name is a
//! configuration error, never a per-tick failure.
//!
//! Default codes follow the SDL keycode layout used by most 2D windowing
//! libraries: printable keys map to their ASCII value, special keys to
//! `0x4000_0000 | scancode`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Keycode of the first SDL scancode-based key.
const SCANCODE_MASK: i64 = 1 << 30;

/// Name tables for keys and mouse buttons.
///
/// Lookups are case-insensitive: names are stored lowercased.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTable {
    keys: FxHashMap<String, i64>,
    buttons: FxHashMap<String, usize>,
}

impl KeyTable {
    /// Create an empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            keys: FxHashMap::default(),
            buttons: FxHashMap::default(),
        }
    }

    /// Add or replace a key name.
    #[must_use]
    pub fn with_key(mut self, name: &str, code: i64) -> Self {
        self.insert_key(name, code);
        self
    }

    /// Add or replace a mouse-button name.
    #[must_use]
    pub fn with_button(mut self, name: &str, index: usize) -> Self {
        self.buttons.insert(name.to_ascii_lowercase(), index);
        self
    }

    /// Add or replace a key name in place.
    pub fn insert_key(&mut self, name: &str, code: i64) {
        self.keys.insert(name.to_ascii_lowercase(), code);
    }

    /// Resolve a key name to its code.
    #[must_use]
    pub fn key(&self, name: &str) -> Option<i64> {
        self.keys.get(&name.to_ascii_lowercase()).copied()
    }

    /// Resolve a mouse-button name to its index.
    #[must_use]
    pub fn button(&self, name: &str) -> Option<usize> {
        self.buttons.get(&name.to_ascii_lowercase()).copied()
    }

    /// Number of named keys.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

impl Default for KeyTable {
    fn default() -> Self {
        let mut table = Self::empty()
            .with_button("left", 0)
            .with_button("middle", 1)
            .with_button("right", 2);

        for c in ('a'..='z').chain('0'..='9') {
            table.insert_key(&c.to_string(), i64::from(u32::from(c)));
        }

        for (name, code) in [
            ("backspace", 8),
            ("tab", 9),
            ("return", 13),
            ("enter", 13),
            ("escape", 27),
            ("space", 32),
            ("delete", 127),
        ] {
            table.insert_key(name, code);
        }

        for (name, scancode) in [
            ("right", 79),
            ("left", 80),
            ("down", 81),
            ("up", 82),
            ("lctrl", 224),
            ("lshift", 225),
            ("lalt", 226),
            ("rctrl", 228),
            ("rshift", 229),
            ("ralt", 230),
        ] {
            table.insert_key(name, SCANCODE_MASK | scancode);
        }

        for n in 1..=12 {
            table.insert_key(&format!("f{n}"), SCANCODE_MASK | (57 + n));
        }

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_and_digits() {
        let table = KeyTable::default();
        assert_eq!(table.key("k"), Some(107));
        assert_eq!(table.key("K"), Some(107));
        assert_eq!(table.key("0"), Some(48));
    }

    #[test]
    fn test_special_keys() {
        let table = KeyTable::default();
        assert_eq!(table.key("space"), Some(32));
        assert_eq!(table.key("SPACE"), Some(32));
        assert_eq!(table.key("up"), Some(1_073_741_906));
        assert_eq!(table.key("f1"), Some(1_073_741_882));
        assert_eq!(table.key("f12"), Some(1_073_741_893));
        assert_eq!(table.key("nonsense"), None);
    }

    #[test]
    fn test_buttons() {
        let table = KeyTable::default();
        assert_eq!(table.button("LEFT"), Some(0));
        assert_eq!(table.button("middle"), Some(1));
        assert_eq!(table.button("Right"), Some(2));
        assert_eq!(table.button("x1"), None);
    }

    #[test]
    fn test_custom_entries() {
        let table = KeyTable::empty()
            .with_key("Jump", 1000)
            .with_button("thumb", 4);
        assert_eq!(table.key("jump"), Some(1000));
        assert_eq!(table.button("THUMB"), Some(4));
        assert_eq!(table.key_count(), 1);
    }

    #[test]
    fn test_serialization() {
        let table = KeyTable::empty().with_key("a", 97);
        let json = serde_json::to_string(&table).unwrap();
        let back: KeyTable = serde_json::from_str(&json).unwrap();
        assert_eq!(table, back);
    }
}

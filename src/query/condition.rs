//! Trigger conditions.
//!
//! The condition section of a query sits between the header and `->`:
//!
//! ```text
//! 2 T KEY f || MOUSE 2 -> PEACE[0].move(DOWN)
//!     ^^^^^^^^^^^^^^^^
//! ```
//!
//! Terms are `KIND VALUE` pairs joined by `&&` (all must hold) or `||`
//! (any may hold). A group mixing both is rejected. Symbolic key and
//! button names are resolved through the [`KeyTable`] here, once, so
//! evaluation only compares codes.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{QueryError, QueryResult};
use crate::input::{InputSource, KeyTable};

use super::header::{next_token, split_header};

/// Condition kind keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    /// `KEY`: a key is held.
    Key,
    /// `MOUSE`: a mouse button is held.
    Mouse,
    /// `MOUSE_POS`: the pointer is inside a rectangle.
    MousePos,
    /// `TIME`: at least this many ticks have elapsed.
    Time,
    /// `TE_LESS_THAN`: fewer than this many ticks have elapsed.
    TimeElapsedLessThan,
}

impl ConditionKind {
    /// Parse a kind keyword (case-insensitive).
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "KEY" => Some(Self::Key),
            "MOUSE" => Some(Self::Mouse),
            "MOUSE_POS" => Some(Self::MousePos),
            "TIME" => Some(Self::Time),
            "TE_LESS_THAN" | "TIME_ELAPSED_LESS_THAN" => Some(Self::TimeElapsedLessThan),
            _ => None,
        }
    }

    /// Canonical keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Key => "KEY",
            Self::Mouse => "MOUSE",
            Self::MousePos => "MOUSE_POS",
            Self::Time => "TIME",
            Self::TimeElapsedLessThan => "TE_LESS_THAN",
        }
    }
}

/// Screen rectangle, half-open on the right and bottom edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: i64,
    /// Top edge.
    pub y: i64,
    /// Width.
    pub width: i64,
    /// Height.
    pub height: i64,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self { x, y, width, height }
    }

    /// Is the point inside?
    #[must_use]
    pub fn contains(&self, (px, py): (i64, i64)) -> bool {
        // An offset that overflows is further than any width can reach
        let within = |p: i64, origin: i64, extent: i64| {
            p.checked_sub(origin)
                .is_some_and(|offset| offset >= 0 && offset < extent)
        };
        within(px, self.x, self.width) && within(py, self.y, self.height)
    }
}

/// One resolved condition term.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// Key code is held.
    Key(i64),
    /// Mouse button index is held.
    Mouse(usize),
    /// Pointer is inside the rectangle.
    MousePos(Rect),
    /// `ticks >= n`.
    Time(u64),
    /// `ticks < n`.
    TimeElapsedLessThan(u64),
}

impl Condition {
    /// Kind keyword of this term.
    #[must_use]
    pub fn kind(&self) -> ConditionKind {
        match self {
            Self::Key(_) => ConditionKind::Key,
            Self::Mouse(_) => ConditionKind::Mouse,
            Self::MousePos(_) => ConditionKind::MousePos,
            Self::Time(_) => ConditionKind::Time,
            Self::TimeElapsedLessThan(_) => ConditionKind::TimeElapsedLessThan,
        }
    }

    /// Does the term hold for this input?
    #[must_use]
    pub fn is_met(&self, input: &dyn InputSource) -> bool {
        match self {
            Self::Key(code) => input.is_key_pressed(*code),
            Self::Mouse(button) => input.is_button_pressed(*button),
            Self::MousePos(rect) => rect.contains(input.mouse_position()),
            Self::Time(ticks) => input.ticks() >= *ticks,
            Self::TimeElapsedLessThan(ticks) => input.ticks() < *ticks,
        }
    }
}

/// How the terms of a group combine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Combinator {
    /// `&&`: every term must hold.
    All,
    /// `||`: at least one term must hold.
    Any,
}

/// Parsed condition section of a query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionGroup {
    /// Terms in source order.
    pub conditions: SmallVec<[Condition; 4]>,
    /// How the terms combine.
    pub combinator: Combinator,
}

impl ConditionGroup {
    /// A group that holds when every term holds.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self {
            conditions: conditions.into_iter().collect(),
            combinator: Combinator::All,
        }
    }

    /// A group that holds when any term holds.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self {
            conditions: conditions.into_iter().collect(),
            combinator: Combinator::Any,
        }
    }

    /// A group that never holds.
    #[must_use]
    pub fn never() -> Self {
        Self::any([])
    }

    /// Number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// No terms at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate against this tick's input. An empty group never holds.
    #[must_use]
    pub fn is_met(&self, input: &dyn InputSource) -> bool {
        if self.conditions.is_empty() {
            return false;
        }
        match self.combinator {
            Combinator::All => self.conditions.iter().all(|c| c.is_met(input)),
            Combinator::Any => self.conditions.iter().any(|c| c.is_met(input)),
        }
    }
}

fn invalid(kind: ConditionKind, value: &str, reason: &'static str, query: &str) -> QueryError {
    QueryError::InvalidConditionValue {
        kind: kind.keyword(),
        value: value.to_string(),
        reason,
        query: query.to_string(),
    }
}

fn parse_ticks(kind: ConditionKind, value: &str, query: &str) -> QueryResult<u64> {
    value
        .parse::<u64>()
        .map_err(|_| invalid(kind, value, "expected a non-negative tick count", query))
}

fn parse_rect(value: &str, query: &str) -> QueryResult<Rect> {
    let inner = value.trim();
    let inner = inner
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(inner);
    let parts: Vec<i64> = inner
        .split(',')
        .map(|p| p.trim().parse::<i64>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid(ConditionKind::MousePos, value, "expected (x, y, w, h)", query))?;
    match parts[..] {
        [x, y, width, height] if width >= 0 && height >= 0 => Ok(Rect::new(x, y, width, height)),
        _ => Err(invalid(
            ConditionKind::MousePos,
            value,
            "expected (x, y, w, h) with non-negative size",
            query,
        )),
    }
}

/// Parse one `KIND VALUE` term.
fn parse_condition(term: &str, keys: &KeyTable, query: &str) -> QueryResult<Condition> {
    let malformed = || QueryError::MalformedCondition {
        term: term.to_string(),
        query: query.to_string(),
    };

    let (word, rest) = next_token(term).ok_or_else(malformed)?;
    let kind = ConditionKind::from_keyword(word).ok_or_else(|| QueryError::UnknownConditionKind {
        kind: word.to_string(),
        query: query.to_string(),
    })?;
    let value = rest.trim();
    if value.is_empty() {
        return Err(malformed());
    }
    if kind != ConditionKind::MousePos && value.contains(char::is_whitespace) {
        return Err(malformed());
    }

    match kind {
        ConditionKind::Key => match value.parse::<i64>() {
            Ok(code) => Ok(Condition::Key(code)),
            Err(_) => keys
                .key(value)
                .map(Condition::Key)
                .ok_or_else(|| QueryError::UnknownKey {
                    name: value.to_string(),
                    query: query.to_string(),
                }),
        },
        ConditionKind::Mouse => match value.parse::<i64>() {
            Ok(index) => usize::try_from(index)
                .map(Condition::Mouse)
                .map_err(|_| invalid(kind, value, "expected a button index or name", query)),
            Err(_) => keys
                .button(value)
                .map(Condition::Mouse)
                .ok_or_else(|| QueryError::UnknownButton {
                    name: value.to_string(),
                    query: query.to_string(),
                }),
        },
        ConditionKind::MousePos => parse_rect(value, query).map(Condition::MousePos),
        ConditionKind::Time => parse_ticks(kind, value, query).map(Condition::Time),
        ConditionKind::TimeElapsedLessThan => {
            parse_ticks(kind, value, query).map(Condition::TimeElapsedLessThan)
        }
    }
}

/// Read the condition section of a query.
///
/// Splits on `&&` when present, otherwise on `||`. A single term is an
/// `Any` group of one.
///
/// # Errors
///
/// Fails when there is no `->`, when `&&` and `||` are mixed, or when a
/// term is malformed or names an unknown kind, key or button.
pub fn read_input(query: &str, keys: &KeyTable) -> QueryResult<ConditionGroup> {
    let (head, _) = query.split_once("->").ok_or_else(|| QueryError::MissingArrow {
        query: query.to_string(),
    })?;
    let text = split_header(head).rest.trim();

    let (combinator, separator) = if text.contains("&&") {
        if text.contains("||") {
            return Err(QueryError::MixedCombinators {
                query: query.to_string(),
            });
        }
        (Combinator::All, "&&")
    } else {
        (Combinator::Any, "||")
    };

    let conditions = text
        .split(separator)
        .map(|term| parse_condition(term.trim(), keys, query))
        .collect::<QueryResult<SmallVec<[Condition; 4]>>>()?;

    Ok(ConditionGroup {
        conditions,
        combinator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputSnapshot;

    fn keys() -> KeyTable {
        KeyTable::default()
    }

    #[test]
    fn test_rect_contains_near_i64_limits() {
        let far = Rect::new(i64::MAX - 7, 0, 100, 10);
        assert!(far.contains((i64::MAX - 6, 5)));
        assert!(far.contains((i64::MAX, 9)));
        assert!(!far.contains((i64::MAX, 10)));
        assert!(!far.contains((i64::MIN, 5)));

        let low = Rect::new(i64::MIN, i64::MIN, i64::MAX, 1);
        assert!(low.contains((i64::MIN, i64::MIN)));
        assert!(!low.contains((i64::MAX, i64::MIN)));
        assert!(!low.contains((i64::MIN, i64::MAX)));
    }

    #[test]
    fn test_single_key() {
        let group = read_input("2 T KEY k -> END", &keys()).unwrap();
        assert_eq!(group.combinator, Combinator::Any);
        assert_eq!(group.conditions.as_slice(), &[Condition::Key(i64::from(b'k'))]);
    }

    #[test]
    fn test_or_group() {
        let group = read_input("2 T KEY f || MOUSE 2 -> END", &keys()).unwrap();
        assert_eq!(group.combinator, Combinator::Any);
        assert_eq!(
            group.conditions.as_slice(),
            &[Condition::Key(i64::from(b'f')), Condition::Mouse(2)]
        );
    }

    #[test]
    fn test_and_group() {
        let group = read_input("KEY 97 && TIME 10 && TE_LESS_THAN 20 -> END", &keys()).unwrap();
        assert_eq!(group.combinator, Combinator::All);
        assert_eq!(
            group.conditions.as_slice(),
            &[
                Condition::Key(97),
                Condition::Time(10),
                Condition::TimeElapsedLessThan(20)
            ]
        );
    }

    #[test]
    fn test_mixed_combinators_rejected() {
        let err = read_input("KEY a && KEY b || KEY c -> END", &keys()).unwrap_err();
        assert!(matches!(err, QueryError::MixedCombinators { .. }));
    }

    #[test]
    fn test_missing_arrow() {
        let err = read_input("2 T KEY k", &keys()).unwrap_err();
        assert!(matches!(err, QueryError::MissingArrow { .. }));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            read_input("1 T KEY -> END", &keys()),
            Err(QueryError::MalformedCondition { .. })
        ));
        assert!(matches!(
            read_input("1 T JOYSTICK 1 -> END", &keys()),
            Err(QueryError::UnknownConditionKind { .. })
        ));
        assert!(matches!(
            read_input("1 T KEY hyperspace -> END", &keys()),
            Err(QueryError::UnknownKey { .. })
        ));
        assert!(matches!(
            read_input("1 T MOUSE thumb -> END", &keys()),
            Err(QueryError::UnknownButton { .. })
        ));
        assert!(matches!(
            read_input("1 T TIME soon -> END", &keys()),
            Err(QueryError::InvalidConditionValue { kind: "TIME", .. })
        ));
        assert!(matches!(
            read_input("1 T KEY a b -> END", &keys()),
            Err(QueryError::MalformedCondition { .. })
        ));
        assert!(matches!(
            read_input("1 T -> END", &keys()),
            Err(QueryError::MalformedCondition { .. })
        ));
    }

    #[test]
    fn test_mouse_names_and_rect() {
        let group = read_input("MOUSE left || MOUSE_POS (10, 20, 30, 40) -> END", &keys()).unwrap();
        assert_eq!(
            group.conditions.as_slice(),
            &[Condition::Mouse(0), Condition::MousePos(Rect::new(10, 20, 30, 40))]
        );
    }

    #[test]
    fn test_rect_contains_half_open() {
        let rect = Rect::new(10, 20, 30, 40);
        assert!(rect.contains((10, 20)));
        assert!(rect.contains((39, 59)));
        assert!(!rect.contains((40, 20)));
        assert!(!rect.contains((10, 60)));
    }

    #[test]
    fn test_group_evaluation() {
        let k = i64::from(b'k');
        let f = i64::from(b'f');
        let and = ConditionGroup::all([Condition::Key(k), Condition::Key(f)]);
        let or = ConditionGroup::any([Condition::Key(k), Condition::Key(f)]);

        let only_k = InputSnapshot::new().with_key(k);
        let both = InputSnapshot::new().with_key(k).with_key(f);
        let none = InputSnapshot::new();

        assert!(!and.is_met(&only_k));
        assert!(and.is_met(&both));
        assert!(or.is_met(&only_k));
        assert!(!or.is_met(&none));
    }

    #[test]
    fn test_time_conditions() {
        let early = InputSnapshot::new().at_tick(5);
        let late = InputSnapshot::new().at_tick(10);
        assert!(!Condition::Time(10).is_met(&early));
        assert!(Condition::Time(10).is_met(&late));
        assert!(Condition::TimeElapsedLessThan(10).is_met(&early));
        assert!(!Condition::TimeElapsedLessThan(10).is_met(&late));
    }

    #[test]
    fn test_empty_group_never_holds() {
        let input = InputSnapshot::new().with_key(1);
        assert!(!ConditionGroup::never().is_met(&input));
        assert!(!ConditionGroup::all([]).is_met(&input));
    }

    #[test]
    fn test_kind_keywords() {
        assert_eq!(ConditionKind::from_keyword("mouse_pos"), Some(ConditionKind::MousePos));
        assert_eq!(ConditionKind::TimeElapsedLessThan.keyword(), "TE_LESS_THAN");
        assert_eq!(Condition::Mouse(1).kind(), ConditionKind::Mouse);
        assert_eq!(ConditionKind::from_keyword("CLICK"), None);
    }
}

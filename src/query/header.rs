//! Query header: repeat count and repeatability flag.
//!
//! A query starts with an optional header, `<count> <flag>`:
//!
//! ```text
//! 2 T KEY k -> PEACE[0].move(UP)
//! ^ ^
//! | repeatable flag (f/F/t/T)
//! repeat count (absent or non-numeric: unlimited)
//! ```
//!
//! Reading the header never fails. Anything unexpected falls back to
//! "unlimited" and "repeatable", with a warning for a malformed flag.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::condition::ConditionKind;

/// How many times a phase may fire before it completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Budget {
    /// At most this many fires.
    Limited(u32),
    /// No limit; the phase only completes through `END`.
    Unlimited,
}

impl Budget {
    /// Remaining fires, `None` when unlimited.
    #[must_use]
    pub fn limit(self) -> Option<u32> {
        match self {
            Budget::Limited(n) => Some(n),
            Budget::Unlimited => None,
        }
    }
}

impl std::fmt::Display for Budget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Budget::Limited(n) => write!(f, "{n}"),
            Budget::Unlimited => write!(f, "unlimited"),
        }
    }
}

/// Repeatability flag as written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Flag {
    /// `t`/`T` or `f`/`F`.
    Given(bool),
    /// Header present but no recognisable flag.
    Malformed(Option<String>),
    /// No header at all (query starts with a condition kind).
    Absent,
}

/// Parsed header plus the text that follows it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Header<'q> {
    pub budget: Budget,
    pub flag: Flag,
    /// Remaining text (conditions and beyond).
    pub rest: &'q str,
}

impl Header<'_> {
    /// Resolve the flag, warning when it had to be defaulted.
    pub(crate) fn repeatable_or(&self, default: bool, query: &str) -> bool {
        match &self.flag {
            Flag::Given(value) => *value,
            Flag::Absent => default,
            Flag::Malformed(token) => {
                warn!(
                    query = query.trim(),
                    token = token.as_deref().unwrap_or(""),
                    default,
                    "malformed repeatability flag, using default"
                );
                default
            }
        }
    }
}

/// Split off the first whitespace-delimited token.
pub(crate) fn next_token(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    Some((&text[..end], &text[end..]))
}

fn parse_count(token: &str) -> Budget {
    match token.parse::<i64>() {
        Ok(n) if n < 0 => {
            warn!(count = n, "negative repeat count, phase will complete on first trigger");
            Budget::Limited(0)
        }
        Ok(n) => Budget::Limited(u32::try_from(n).unwrap_or(u32::MAX)),
        Err(_) => {
            debug!(token, "non-numeric repeat count, phase is unlimited");
            Budget::Unlimited
        }
    }
}

fn parse_flag(token: &str) -> Option<bool> {
    match token {
        "t" | "T" => Some(true),
        "f" | "F" => Some(false),
        _ => None,
    }
}

/// Split the header from the condition text.
pub(crate) fn split_header(query: &str) -> Header<'_> {
    let Some((first, after_first)) = next_token(query) else {
        return Header {
            budget: Budget::Unlimited,
            flag: Flag::Absent,
            rest: query,
        };
    };

    if ConditionKind::from_keyword(first).is_some() {
        return Header {
            budget: Budget::Unlimited,
            flag: Flag::Absent,
            rest: query,
        };
    }

    let budget = parse_count(first);

    match next_token(after_first) {
        Some((second, after_second)) => match parse_flag(second) {
            Some(value) => Header {
                budget,
                flag: Flag::Given(value),
                rest: after_second,
            },
            // A condition kind in the flag slot belongs to the conditions
            None if ConditionKind::from_keyword(second).is_some() => Header {
                budget,
                flag: Flag::Malformed(None),
                rest: after_first,
            },
            None => Header {
                budget,
                flag: Flag::Malformed(Some(second.to_string())),
                rest: after_second,
            },
        },
        None => Header {
            budget,
            flag: Flag::Malformed(None),
            rest: after_first,
        },
    }
}

/// Read the repeat count.
///
/// Returns [`Budget::Unlimited`] when the first token is not an integer.
/// Never fails.
#[must_use]
pub fn read_header(query: &str) -> Budget {
    split_header(query).budget
}

/// Read the repeatability flag.
///
/// `t`/`T` is repeatable, `f`/`F` is not. A malformed flag logs a warning
/// and counts as repeatable.
#[must_use]
pub fn read_repeatability(query: &str) -> bool {
    split_header(query).repeatable_or(true, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_and_flag() {
        assert_eq!(read_header("2 T KEY k -> END"), Budget::Limited(2));
        assert!(read_repeatability("2 T KEY k -> END"));
        assert!(!read_repeatability("2 f KEY k -> END"));
        assert!(!read_repeatability("2 F KEY k -> END"));
    }

    #[test]
    fn test_non_numeric_count_is_unlimited() {
        assert_eq!(read_header("mm F KEY k -> END"), Budget::Unlimited);
        assert!(!read_repeatability("mm F KEY k -> END"));
    }

    #[test]
    fn test_negative_count() {
        assert_eq!(read_header("-3 T KEY k -> END"), Budget::Limited(0));
    }

    #[test]
    fn test_huge_count_saturates() {
        assert_eq!(read_header("99999999999 T KEY k -> END"), Budget::Limited(u32::MAX));
    }

    #[test]
    fn test_malformed_flag_defaults_to_repeatable() {
        assert!(read_repeatability("3 x KEY k -> END"));
        let header = split_header("3 x KEY k -> END");
        assert_eq!(header.flag, Flag::Malformed(Some("x".to_string())));
        assert_eq!(header.rest.trim(), "KEY k -> END");
    }

    #[test]
    fn test_missing_flag_keeps_condition() {
        let header = split_header("3 KEY k -> END");
        assert_eq!(header.budget, Budget::Limited(3));
        assert_eq!(header.flag, Flag::Malformed(None));
        assert_eq!(header.rest.trim(), "KEY k -> END");
    }

    #[test]
    fn test_no_header() {
        let header = split_header("KEY k -> END");
        assert_eq!(header.budget, Budget::Unlimited);
        assert_eq!(header.flag, Flag::Absent);
        assert_eq!(header.rest, "KEY k -> END");
        assert!(read_repeatability("key k -> END"));
    }

    #[test]
    fn test_multiline_header() {
        let query = "\n3\nF\nKEY k\n-> END";
        assert_eq!(read_header(query), Budget::Limited(3));
        assert!(!read_repeatability(query));
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(read_header(""), Budget::Unlimited);
        assert!(read_repeatability("   "));
    }

    #[test]
    fn test_next_token() {
        assert_eq!(next_token("  ab cd"), Some(("ab", " cd")));
        assert_eq!(next_token("ab"), Some(("ab", "")));
        assert_eq!(next_token("   "), None);
    }

    #[test]
    fn test_budget_display() {
        assert_eq!(Budget::Limited(4).to_string(), "4");
        assert_eq!(Budget::Unlimited.to_string(), "unlimited");
        assert_eq!(Budget::Unlimited.limit(), None);
    }
}

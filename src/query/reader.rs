//! Whole-query parsing.
//!
//! A query is `HEADER CONDITIONS -> BODY`. The pieces are read
//! independently by [`read_header`](super::read_header),
//! [`read_repeatability`](super::read_repeatability), [`read_input`] and
//! [`read_output`]; [`parse_query`] runs all four and returns a
//! [`PhaseSpec`].

use serde::{Deserialize, Serialize};

use crate::core::EngineConfig;
use crate::error::{QueryError, QueryResult};

use super::condition::{read_input, ConditionGroup};
use super::effect::{parse_program, EffectProgram};
use super::header::{split_header, Budget};

/// Separator line between queries in a phase file.
pub const BLOCK_SEPARATOR: &str = "----";

/// Everything a query describes, before it is bound to a board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSpec {
    /// Trigger conditions.
    pub conditions: ConditionGroup,
    /// Effect body.
    pub program: EffectProgram,
    /// Fire budget.
    pub budget: Budget,
    /// May fire more than once per activation.
    pub repeatable: bool,
}

fn leading_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Line the body up when it starts on the arrow line.
///
/// `KEY k -> a()\n    b()` reads as two statements at the same level.
/// When the arrow line opens a block (`-> if x:`), the following lines
/// are its suite and keep their indentation.
fn normalize_body(body: &str) -> String {
    let mut lines = body.lines();
    let first = lines.next().unwrap_or_default().trim();
    if first.is_empty() {
        return body.to_string();
    }

    let rest: Vec<&str> = lines.collect();
    let mut out = String::from(first);
    if first.ends_with(':') {
        for line in rest {
            out.push('\n');
            out.push_str(line);
        }
        return out;
    }

    let base = rest
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| leading_width(l))
        .min()
        .unwrap_or(0);
    for line in rest {
        out.push('\n');
        out.extend(line.chars().skip(base.min(leading_width(line))));
    }
    out
}

/// Read and parse the effect body after `->`.
///
/// # Errors
///
/// [`QueryError::MalformedEffect`] when there is no `->`,
/// [`QueryError::Syntax`] when the body does not parse.
pub fn read_output(query: &str) -> QueryResult<EffectProgram> {
    let (_, body) = query
        .split_once("->")
        .ok_or_else(|| QueryError::MalformedEffect {
            reason: "no `->` before the effect body".to_string(),
            query: query.to_string(),
        })?;
    parse_program(&normalize_body(body))
}

/// Parse a full query.
///
/// # Errors
///
/// Any [`QueryError`] from the condition or effect readers.
pub fn parse_query(query: &str, config: &EngineConfig) -> QueryResult<PhaseSpec> {
    let conditions = read_input(query, &config.keys)?;
    let program = read_output(query)?;

    let head = query.split_once("->").map_or(query, |(head, _)| head);
    let header = split_header(head);

    Ok(PhaseSpec {
        conditions,
        program,
        budget: header.budget,
        repeatable: header.repeatable_or(config.default_repeatable, query),
    })
}

/// Split a phase file into queries.
///
/// Queries are separated by lines starting with `----`. Blank blocks are
/// dropped.
#[must_use]
pub fn split_query_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.trim_start().starts_with(BLOCK_SEPARATOR) {
            if !current.trim().is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            current.clear();
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.trim().is_empty() {
        blocks.push(current);
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Direction;
    use crate::query::condition::Condition;
    use crate::query::effect::{Expr, Stmt, TargetRef};

    #[test]
    fn test_parse_query() {
        let spec = parse_query("2 T KEY k -> PEACE[0].move(UP)", &EngineConfig::default()).unwrap();
        assert_eq!(spec.budget, Budget::Limited(2));
        assert!(spec.repeatable);
        assert_eq!(
            spec.conditions.conditions.as_slice(),
            &[Condition::Key(i64::from(b'k'))]
        );
        assert_eq!(
            spec.program.statements,
            vec![Stmt::Eval(Expr::CallMethod {
                target: TargetRef::Piece(Box::new(Expr::int(0))),
                method: "move".into(),
                args: vec![Expr::Direction(Direction::Up)],
            })]
        );
    }

    #[test]
    fn test_body_on_arrow_line_with_following_lines() {
        let query = "mm F KEY k -> PEACE[0].move(UP)\nif PEACE[0].row == 0: \n    END";
        let spec = parse_query(query, &EngineConfig::default()).unwrap();
        assert_eq!(spec.budget, Budget::Unlimited);
        assert!(!spec.repeatable);
        assert_eq!(spec.program.statements.len(), 2);
    }

    #[test]
    fn test_indented_continuation_lines() {
        let query = "KEY k -> PIECE[0].move(UP)\n    PIECE[1].move(UP)\n    if x:\n        END";
        let program = read_output(query).unwrap();
        assert_eq!(program.statements.len(), 3);
    }

    #[test]
    fn test_block_opened_on_arrow_line() {
        let program = read_output("KEY k -> if BOARD.turn == 0:\n    END").unwrap();
        assert!(matches!(program.statements.as_slice(), [Stmt::If { .. }]));
    }

    #[test]
    fn test_body_on_following_lines() {
        let program = read_output("1 T KEY k ->\n    x = 1\n    WINDOW.x = x\n").unwrap();
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn test_read_output_requires_arrow() {
        assert!(matches!(
            read_output("2 T KEY k"),
            Err(QueryError::MalformedEffect { .. })
        ));
    }

    #[test]
    fn test_parse_query_missing_arrow() {
        assert!(matches!(
            parse_query("2 T KEY k", &EngineConfig::default()),
            Err(QueryError::MissingArrow { .. })
        ));
    }

    #[test]
    fn test_default_repeatable_from_config() {
        let config = EngineConfig {
            default_repeatable: false,
            ..EngineConfig::default()
        };
        assert!(!parse_query("3 KEY k -> END", &config).unwrap().repeatable);
        assert!(parse_query("3 T KEY k -> END", &config).unwrap().repeatable);
    }

    #[test]
    fn test_empty_body_is_allowed() {
        let spec = parse_query("1 T KEY space ->", &EngineConfig::default()).unwrap();
        assert!(spec.program.is_empty());
    }

    #[test]
    fn test_split_query_blocks() {
        let text = "2 T KEY k -> END\n----\n\n---- trailing comment\n1 F MOUSE 0 ->\n    END\n";
        let blocks = split_query_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].trim(), "2 T KEY k -> END");
        assert!(blocks[1].starts_with("1 F MOUSE 0 ->"));
    }

    #[test]
    fn test_spec_serializes() {
        let spec = parse_query("KEY a && TIME 5 -> THIS.n = 1", &EngineConfig::default()).unwrap();
        let json = serde_json::to_string(&spec).unwrap();
        let back: PhaseSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, back);
    }
}

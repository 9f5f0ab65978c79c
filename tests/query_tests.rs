//! Query language integration tests.
//!
//! Header reading, phase files on disk, and effect programs running
//! against a full board.

use std::io::Write;

use phaseboard::board::{Board, Window};
use phaseboard::core::{BoardConfig, EngineConfig, PieceConfig, SideId};
use phaseboard::error::{ConfigError, QueryError};
use phaseboard::input::{InputSnapshot, KeyTable};
use phaseboard::phase::TickOutcome;
use phaseboard::query::{
    parse_query, read_header, read_input, read_repeatability, split_query_blocks, Budget,
    Combinator, ConditionKind,
};
use proptest::prelude::*;

const K: i64 = b'k' as i64;

fn board(config: BoardConfig, engine: EngineConfig) -> Board {
    let config = config
        .with_side(SideId::new(0), [PieceConfig::at(4, 0), PieceConfig::at(4, 1)])
        .with_side(SideId::new(1), [PieceConfig::at(0, 7)]);
    Board::from_config(&config, engine).unwrap()
}

fn pressed() -> InputSnapshot {
    InputSnapshot::new().with_key(K)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_numeric_header(count in 0u32..100_000, flag in prop::sample::select(vec!["t", "T", "f", "F"])) {
        let query = format!("{count} {flag} KEY k -> END");
        prop_assert_eq!(read_header(&query), Budget::Limited(count));
        prop_assert_eq!(read_repeatability(&query), flag.eq_ignore_ascii_case("t"));
    }

    #[test]
    fn prop_word_header_is_unlimited(word in "[a-z]{1,8}") {
        prop_assume!(ConditionKind::from_keyword(&word).is_none());
        let query = format!("{word} F KEY k -> END");
        prop_assert_eq!(read_header(&query), Budget::Unlimited);
        prop_assert!(!read_repeatability(&query));
    }

    #[test]
    fn prop_header_never_panics(query in "\\PC{0,40}") {
        let _ = read_header(&query);
        let _ = read_repeatability(&query);
    }
}

#[test]
fn test_header_variants() {
    assert_eq!(read_header("KEY k -> END"), Budget::Unlimited);
    assert!(read_repeatability("KEY k -> END"));
    assert_eq!(read_header("-3 T KEY k -> END"), Budget::Limited(0));
    assert!(read_repeatability("2 x KEY k -> END"));
    assert!(read_repeatability("2 KEY k -> END"));
}

#[test]
fn test_condition_errors_name_the_problem() {
    let keys = KeyTable::default();
    assert!(matches!(
        read_input("KEY nosuchkey -> END", &keys),
        Err(QueryError::UnknownKey { name, .. }) if name == "nosuchkey"
    ));
    assert!(matches!(
        read_input("JUMP 3 -> END", &keys),
        Err(QueryError::UnknownConditionKind { .. })
    ));
    assert!(matches!(
        read_input("KEY k && KEY f || KEY g -> END", &keys),
        Err(QueryError::MixedCombinators { .. })
    ));
    assert!(matches!(
        read_input("MOUSE_POS (1, 2, 3) -> END", &keys),
        Err(QueryError::InvalidConditionValue { .. })
    ));

    let group = read_input("key SPACE || Time 5 -> END", &keys).unwrap();
    assert_eq!(group.combinator, Combinator::Any);
    assert_eq!(group.len(), 2);
}

#[test]
fn test_effect_syntax_error() {
    let err = parse_query("KEY k -> PIECE[0].move(UP", &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, QueryError::Syntax { line: 1, .. }));
}

#[test]
fn test_deeply_nested_effect_is_syntax_error() {
    let query = format!("KEY k -> x = {}1{}", "(".repeat(50_000), ")".repeat(50_000));
    let err = parse_query(&query, &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, QueryError::Syntax { line: 1, .. }));
}

#[test]
fn test_load_phase_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "1 T KEY k -> PEACE[0].move(UP)\n\
         ----\n\
         \n\
         ----\n\
         1 T KEY k ->\n    \
             for i in range(BOARD.piece_count):\n        \
                 PIECE[i].move(DOWN)\n"
    )
    .unwrap();

    let mut board = board(BoardConfig::new(8, 8), EngineConfig::default());
    let mut window = Window::default();
    assert_eq!(board.load_phases(file.path(), &window).unwrap(), 2);

    // Phase 0: one move up, then complete
    assert_eq!(board.execute(&mut window, &pressed()), TickOutcome::Fired);
    assert_eq!(board.execute(&mut window, &pressed()), TickOutcome::Completed);
    // Phase 1: every piece steps down
    assert_eq!(board.execute(&mut window, &pressed()), TickOutcome::Fired);

    let rows: Vec<i64> = board.pieces().iter().map(|p| p.row()).collect();
    assert_eq!(rows, vec![4, 5, 1]);
}

#[test]
fn test_load_phase_file_errors() {
    let mut board = board(BoardConfig::new(8, 8), EngineConfig::default());
    let window = Window::default();

    let missing = board.load_phases("/nonexistent/phases.txt", &window);
    assert!(matches!(missing, Err(ConfigError::Io { .. })));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "KEY k -> END\n----\nKEY k PIECE[0].move(UP)\n").unwrap();
    match board.load_phases(file.path(), &window) {
        Err(ConfigError::Query { index, source, .. }) => {
            assert_eq!(index, 1);
            assert!(matches!(source, QueryError::MissingArrow { .. }));
        }
        other => panic!("expected query error, got {other:?}"),
    }
}

#[test]
fn test_split_ignores_blank_blocks() {
    let blocks = split_query_blocks("----\nKEY k -> END\n------\n   \n----\nKEY f -> END");
    assert_eq!(blocks.len(), 2);
    assert!(blocks[1].starts_with("KEY f"));
}

#[test]
fn test_rand_is_seeded() {
    let query = "KEY k -> PEACE[0].row = rand(0, 1000)";
    let rolls = |seed: u64| {
        let mut board = board(BoardConfig::new(8, 8).with_seed(seed), EngineConfig::default());
        let mut window = Window::default();
        board.add_phase(query, &window).unwrap();
        (0..5)
            .map(|_| {
                board.execute(&mut window, &pressed());
                board.pieces()[0].row()
            })
            .collect::<Vec<_>>()
    };

    let a = rolls(7);
    assert_eq!(a, rolls(7));
    assert!(a.iter().all(|row| (0..=1000).contains(row)));
}

#[test]
fn test_loop_limit_from_engine_config() {
    let engine = EngineConfig::default().with_max_loop_iterations(3);
    let mut board = board(BoardConfig::new(8, 8), engine);
    let mut window = Window::default();
    board
        .add_phase("KEY k -> for i in range(4): PEACE[0].move(UP)", &window)
        .unwrap();

    assert_eq!(board.execute(&mut window, &pressed()), TickOutcome::Fired);
    assert_eq!(board.pieces()[0].row(), 4);
}

#[test]
fn test_board_turn_assignment() {
    let mut board = board(BoardConfig::new(8, 8), EngineConfig::default());
    let mut window = Window::default();
    board
        .add_phase(
            "KEY k ->\n    if BOARD.turn == 0:\n        BOARD.turn = 1\n    elif BOARD.turn == 1:\n        BOARD.turn = 0",
            &window,
        )
        .unwrap();

    board.execute(&mut window, &pressed());
    assert_eq!(board.turn(), Some(SideId::new(1)));
    board.execute(&mut window, &pressed());
    assert_eq!(board.turn(), Some(SideId::new(0)));
}

#[test]
fn test_unknown_window_attribute_is_unresolved() {
    let mut board = board(BoardConfig::new(8, 8), EngineConfig::default());
    let mut window = Window::default();
    board
        .add_phase("KEY k -> WINDOW.title = WINDOW.subtitle", &window)
        .unwrap();
    assert!(board.phases().phases()[0].is_null());

    let window_with_subtitle = Window::default().with_attribute("subtitle", "two");
    board
        .add_phase("KEY k -> WINDOW.title = WINDOW.subtitle", &window_with_subtitle)
        .unwrap();
    assert!(!board.phases().phases()[1].is_null());

    window = window_with_subtitle;
    assert_eq!(board.execute(&mut window, &pressed()), TickOutcome::Fired);
    assert_eq!(window.title, "two");
}

use block_hopper_core::{BlockSet, CellCoord};
use block_hopper_system_grid_parser::{parse_grid, GridBounds, ParseError, ROW_DELIMITER};
use proptest::prelude::*;

const BOUNDS: GridBounds = GridBounds::new(2, 9, 23);

#[test]
fn parses_columns_into_row_sets() {
    let blocks = parse_grid([("0", "2,3"), ("7", "4")], BOUNDS).expect("valid tokens");

    assert_eq!(
        blocks,
        BlockSet::from_columns([(0, vec![2, 3]), (7, vec![4])]),
    );
}

#[test]
fn duplicate_rows_collapse_silently() {
    let blocks = parse_grid([("5", "3,3,4,3")], BOUNDS).expect("duplicates are not errors");

    assert_eq!(blocks.cell_count(), 2);
    assert!(blocks.contains(CellCoord::new(5, 3)));
    assert!(blocks.contains(CellCoord::new(5, 4)));
}

#[test]
fn repeated_column_tokens_merge() {
    let blocks = parse_grid([("5", "3"), ("5", "4")], BOUNDS).expect("valid tokens");

    assert_eq!(blocks, BlockSet::from_columns([(5, vec![3, 4])]));
}

#[test]
fn no_tokens_yield_an_empty_set() {
    let tokens: Vec<(String, String)> = Vec::new();
    let blocks = parse_grid(tokens, BOUNDS).expect("empty input is valid");

    assert!(blocks.is_empty());
}

#[test]
fn malformed_column_is_rejected() {
    let result = parse_grid([("three", "4")], BOUNDS);

    assert_eq!(
        result,
        Err(ParseError::InvalidColumn {
            token: "three".to_owned(),
        }),
    );
}

#[test]
fn column_past_right_edge_is_rejected() {
    let result = parse_grid([("24", "4")], BOUNDS);

    assert!(matches!(
        result,
        Err(ParseError::ColumnOutOfBounds { column: 24, .. })
    ));
}

#[test]
fn malformed_row_is_rejected() {
    let result = parse_grid([("1", "4;5")], BOUNDS);

    assert!(matches!(result, Err(ParseError::InvalidRow { column: 1, .. })));
}

#[test]
fn row_inside_floor_band_is_rejected() {
    let result = parse_grid([("1", "1,2")], BOUNDS);

    assert_eq!(
        result,
        Err(ParseError::RowOutOfBounds {
            column: 1,
            row: 1,
            min: 2,
            max: 9,
        }),
    );
}

#[test]
fn row_above_top_is_rejected() {
    let result = parse_grid([("1", "10")], BOUNDS);

    assert!(matches!(
        result,
        Err(ParseError::RowOutOfBounds { row: 10, .. })
    ));
}

#[test]
fn first_failure_wins() {
    let result = parse_grid([("x", "4"), ("1", "99")], BOUNDS);

    assert!(matches!(result, Err(ParseError::InvalidColumn { .. })));
}

proptest! {
    #[test]
    fn reparsing_serialized_output_is_stable(
        columns in proptest::collection::vec(
            (0u32..=23, proptest::collection::vec(2u32..=9, 1..6)),
            0..8,
        ),
    ) {
        let separator = ROW_DELIMITER.to_string();
        let tokens: Vec<(String, String)> = columns
            .iter()
            .map(|(column, rows)| {
                let rows = rows
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(separator.as_str());
                (column.to_string(), rows)
            })
            .collect();

        let first = parse_grid(tokens, BOUNDS).expect("generated tokens are in bounds");
        let second = parse_grid(first.to_tokens(ROW_DELIMITER), BOUNDS)
            .expect("re-serialized tokens are in bounds");

        prop_assert_eq!(first, second);
    }
}

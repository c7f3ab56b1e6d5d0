#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure parser that turns per-column row tokens into a [`BlockSet`].

use block_hopper_core::{BlockSet, CellCoord};

/// Delimiter separating the rows listed for a single column.
pub const ROW_DELIMITER: char = ',';

/// Inclusive bounds every parsed cell must respect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridBounds {
    /// Smallest permitted row; rows below it belong to the floor band.
    pub base_rows: u32,
    /// Largest permitted row.
    pub max_row: u32,
    /// Largest permitted column.
    pub max_column: u32,
}

impl GridBounds {
    /// Creates a new set of bounds.
    #[must_use]
    pub const fn new(base_rows: u32, max_row: u32, max_column: u32) -> Self {
        Self {
            base_rows,
            max_row,
            max_column,
        }
    }
}

/// Reasons a column token or row token is refused.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The column token is not an integer.
    #[error("column `{token}` is not an integer")]
    InvalidColumn {
        /// Offending token.
        token: String,
    },
    /// The column lies outside the grid.
    #[error("column {column} is outside 0..={max_column}")]
    ColumnOutOfBounds {
        /// Parsed column value.
        column: i64,
        /// Largest permitted column.
        max_column: u32,
    },
    /// A row token is not an integer.
    #[error("row `{token}` in column {column} is not an integer")]
    InvalidRow {
        /// Column whose rows were being parsed.
        column: u32,
        /// Offending token.
        token: String,
    },
    /// A row lies outside the permitted band.
    #[error("row {row} in column {column} is outside {min}..={max}")]
    RowOutOfBounds {
        /// Column whose rows were being parsed.
        column: u32,
        /// Parsed row value.
        row: i64,
        /// Smallest permitted row.
        min: u32,
        /// Largest permitted row.
        max: u32,
    },
}

/// Parses a decimal integer token, tolerating surrounding whitespace and a sign.
#[must_use]
pub fn parse_integer(token: &str) -> Option<i64> {
    token.trim().parse::<i64>().ok()
}

/// Parses `(column, rows)` token pairs into a block set.
///
/// Each `rows` token lists row indices separated by [`ROW_DELIMITER`]. Repeated
/// rows, and repeated columns, are merged rather than reported. The first
/// malformed or out-of-range token aborts parsing.
pub fn parse_grid<I, C, R>(tokens: I, bounds: GridBounds) -> Result<BlockSet, ParseError>
where
    I: IntoIterator<Item = (C, R)>,
    C: AsRef<str>,
    R: AsRef<str>,
{
    let mut blocks = BlockSet::new();
    for (column_token, rows_token) in tokens {
        let column = parse_column(column_token.as_ref(), bounds)?;
        for row_token in rows_token.as_ref().split(ROW_DELIMITER) {
            let row = parse_row(column, row_token, bounds)?;
            let _ = blocks.insert(CellCoord::new(column, row));
        }
    }
    Ok(blocks)
}

fn parse_column(token: &str, bounds: GridBounds) -> Result<u32, ParseError> {
    let column = parse_integer(token).ok_or_else(|| ParseError::InvalidColumn {
        token: token.to_owned(),
    })?;
    u32::try_from(column)
        .ok()
        .filter(|column| *column <= bounds.max_column)
        .ok_or(ParseError::ColumnOutOfBounds {
            column,
            max_column: bounds.max_column,
        })
}

fn parse_row(column: u32, token: &str, bounds: GridBounds) -> Result<u32, ParseError> {
    let row = parse_integer(token).ok_or_else(|| ParseError::InvalidRow {
        column,
        token: token.to_owned(),
    })?;
    u32::try_from(row)
        .ok()
        .filter(|row| (bounds.base_rows..=bounds.max_row).contains(row))
        .ok_or(ParseError::RowOutOfBounds {
            column,
            row,
            min: bounds.base_rows,
            max: bounds.max_row,
        })
}

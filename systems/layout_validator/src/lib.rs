#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure validator that turns a submitted level layout into a [`NormalizedLevel`].
//!
//! Checks run in a fixed order and the first failure is returned:
//!
//! 1. `base_rows` must be an integer within `0..=max_row`;
//! 2. static then movable blocks are parsed with `base_rows` as the lowest row;
//! 3. no movable block may share a cell with a static block, and every movable
//!    block above the floor band must rest on another block;
//! 4. the two-cell door must lie on the grid and clear of every block;
//! 5. the player must lie on the grid, clear of every block, and grounded.
//!
//! Level name uniqueness is the caller's concern and is checked before any of
//! the above.

use std::fmt;

use block_hopper_core::{
    BlockKind, BlockSet, CellCoord, Door, GridConstraints, LevelName, NormalizedLevel,
    PixelPoint, PlayerStart, RenderingConstants,
};
use block_hopper_system_grid_parser::{parse_grid, parse_integer, GridBounds, ParseError};

/// Row and column tokens for a single-position entity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawPosition {
    /// Row token.
    pub row: String,
    /// Column token.
    pub column: String,
}

impl RawPosition {
    /// Creates a raw position from the provided tokens.
    #[must_use]
    pub fn new(row: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            row: row.into(),
            column: column.into(),
        }
    }
}

/// Layout exactly as submitted, before any token has been interpreted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutInput {
    /// Height of the floor band.
    pub base_rows: String,
    /// `(column, rows)` token pairs describing static blocks.
    pub static_blocks: Vec<(String, String)>,
    /// `(column, rows)` token pairs describing movable blocks.
    pub move_blocks: Vec<(String, String)>,
    /// Lower cell of the door.
    pub door: RawPosition,
    /// Player start cell.
    pub player: RawPosition,
}

/// Scalar input fields that must hold a single integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    /// Height of the floor band.
    BaseRows,
    /// Door row.
    DoorRow,
    /// Door column.
    DoorColumn,
    /// Player row.
    PlayerRow,
    /// Player column.
    PlayerColumn,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BaseRows => "base rows",
            Self::DoorRow => "door row",
            Self::DoorColumn => "door column",
            Self::PlayerRow => "player row",
            Self::PlayerColumn => "player column",
        };
        f.write_str(name)
    }
}

/// Coarse classification of validation failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A token could not be interpreted.
    Parse,
    /// A position lies outside the grid.
    OutOfBounds,
    /// A movable block shares a cell with a static block.
    Collision,
    /// A movable block hovers without support.
    UnsupportedBlock,
    /// The door overlaps a block.
    DoorCollision,
    /// The player overlaps a block.
    PlayerCollision,
    /// The player does not start on solid ground.
    UngroundedPlayer,
    /// The level name is already taken.
    DuplicateLevelName,
}

/// Reasons a layout is rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The level name is reserved or already used by the same owner.
    #[error("{name} is already a level")]
    DuplicateLevelName {
        /// Name that collided.
        name: LevelName,
    },
    /// A scalar field did not hold an integer.
    #[error("{field} `{token}` is not an integer")]
    InvalidInteger {
        /// Field that failed to parse.
        field: Field,
        /// Offending token.
        token: String,
    },
    /// The floor band height lies outside the grid.
    #[error("{base_rows} is invalid for rows at bottom of screen (expected 0..={max_row})")]
    BaseRowsOutOfBounds {
        /// Parsed floor band height.
        base_rows: i64,
        /// Largest permitted row.
        max_row: u32,
    },
    /// A block set could not be parsed.
    #[error("{kind} blocks invalid: {source}")]
    InvalidBlocks {
        /// Kind of block set that failed.
        kind: BlockKind,
        /// Underlying parse failure.
        #[source]
        source: ParseError,
    },
    /// A movable block occupies the same cell as a static block.
    #[error("movable and static blocks can't occupy the same place ({cell})")]
    Collision {
        /// Shared cell.
        cell: CellCoord,
    },
    /// A movable block above the floor band has nothing beneath it.
    #[error("movable block at {cell} can't hover")]
    UnsupportedBlock {
        /// Hovering block.
        cell: CellCoord,
    },
    /// The door lies outside the grid or lacks headroom for its upper cell.
    #[error("door out of bounds (row {row}, column {column})")]
    DoorOutOfBounds {
        /// Requested door row.
        row: i64,
        /// Requested door column.
        column: i64,
    },
    /// The door overlaps a block.
    #[error("door conflicts with {kind} blocks at {cell}")]
    DoorCollision {
        /// Kind of block overlapped.
        kind: BlockKind,
        /// Overlapped cell.
        cell: CellCoord,
    },
    /// The player start lies outside the grid.
    #[error("player out of bounds (row {row}, column {column})")]
    PlayerOutOfBounds {
        /// Requested player row.
        row: i64,
        /// Requested player column.
        column: i64,
    },
    /// A stored player start does not map onto a grid cell.
    #[error("player start {point} does not align with the grid")]
    UnalignedPlayerStart {
        /// Stored pixel position.
        point: PixelPoint,
    },
    /// The player overlaps a block.
    #[error("player conflicts with {kind} blocks at {cell}")]
    PlayerCollision {
        /// Kind of block overlapped.
        kind: BlockKind,
        /// Overlapped cell.
        cell: CellCoord,
    },
    /// The player has no block beneath and is not on the floor band.
    #[error("player must start grounded ({cell})")]
    UngroundedPlayer {
        /// Player cell.
        cell: CellCoord,
    },
}

impl ValidationError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateLevelName { .. } => ErrorKind::DuplicateLevelName,
            Self::InvalidInteger { .. } | Self::InvalidBlocks { .. } => ErrorKind::Parse,
            Self::BaseRowsOutOfBounds { .. }
            | Self::DoorOutOfBounds { .. }
            | Self::PlayerOutOfBounds { .. }
            | Self::UnalignedPlayerStart { .. } => ErrorKind::OutOfBounds,
            Self::Collision { .. } => ErrorKind::Collision,
            Self::UnsupportedBlock { .. } => ErrorKind::UnsupportedBlock,
            Self::DoorCollision { .. } => ErrorKind::DoorCollision,
            Self::PlayerCollision { .. } => ErrorKind::PlayerCollision,
            Self::UngroundedPlayer { .. } => ErrorKind::UngroundedPlayer,
        }
    }
}

/// Validates a submitted layout against the grid implied by `rendering`.
pub fn validate_layout(
    input: &LayoutInput,
    rendering: &RenderingConstants,
) -> Result<NormalizedLevel, ValidationError> {
    let constraints = rendering.grid_constraints();
    let base_rows = parse_base_rows(&input.base_rows, constraints)?;

    let bounds = GridBounds::new(base_rows, constraints.max_row, constraints.max_column);
    let static_blocks = parse_blocks(&input.static_blocks, bounds, BlockKind::Static)?;
    let move_blocks = parse_blocks(&input.move_blocks, bounds, BlockKind::Movable)?;

    let layout = Layout {
        base_rows,
        static_blocks: &static_blocks,
        move_blocks: &move_blocks,
        constraints,
    };
    layout.check_blocks()?;

    let door = layout.check_door(
        parse_field(&input.door.row, Field::DoorRow)?,
        parse_field(&input.door.column, Field::DoorColumn)?,
    )?;
    let player = layout.check_player(
        parse_field(&input.player.row, Field::PlayerRow)?,
        parse_field(&input.player.column, Field::PlayerColumn)?,
    )?;

    Ok(NormalizedLevel {
        base_rows,
        player_start: constraints.pixel_position(player.cell()),
        static_blocks,
        move_blocks,
        door,
        rendering: *rendering,
    })
}

/// Re-checks an already normalized level, e.g. one loaded from seed data or
/// imported from a transfer string.
pub fn validate_level(level: &NormalizedLevel) -> Result<(), ValidationError> {
    let constraints = level.rendering.grid_constraints();
    if level.base_rows > constraints.max_row {
        return Err(ValidationError::BaseRowsOutOfBounds {
            base_rows: i64::from(level.base_rows),
            max_row: constraints.max_row,
        });
    }

    let bounds = GridBounds::new(level.base_rows, constraints.max_row, constraints.max_column);
    check_block_bounds(&level.static_blocks, bounds, BlockKind::Static)?;
    check_block_bounds(&level.move_blocks, bounds, BlockKind::Movable)?;

    let layout = Layout {
        base_rows: level.base_rows,
        static_blocks: &level.static_blocks,
        move_blocks: &level.move_blocks,
        constraints,
    };
    layout.check_blocks()?;
    let _ = layout.check_door(i64::from(level.door.row), i64::from(level.door.column))?;

    let player = constraints.cell_from_pixels(level.player_start).ok_or(
        ValidationError::UnalignedPlayerStart {
            point: level.player_start,
        },
    )?;
    let _ = layout.check_player(i64::from(player.row()), i64::from(player.column()))?;
    Ok(())
}

struct Layout<'a> {
    base_rows: u32,
    static_blocks: &'a BlockSet,
    move_blocks: &'a BlockSet,
    constraints: GridConstraints,
}

impl Layout<'_> {
    /// Collision pass over every column first, then the support pass.
    fn check_blocks(&self) -> Result<(), ValidationError> {
        for cell in self.move_blocks.cells() {
            if self.static_blocks.contains(cell) {
                return Err(ValidationError::Collision { cell });
            }
        }

        for (column, rows) in self.move_blocks.iter() {
            let destination = self.static_blocks.rows(column);
            for &row in rows {
                // rows at base_rows rest on the floor band
                if row <= self.base_rows {
                    continue;
                }
                let below = row - 1;
                let supported = rows.contains(&below)
                    || destination.is_some_and(|static_rows| static_rows.contains(&below));
                if !supported {
                    return Err(ValidationError::UnsupportedBlock {
                        cell: CellCoord::new(column, row),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_door(&self, row: i64, column: i64) -> Result<Door, ValidationError> {
        let top_row = i64::from(self.constraints.max_row) - 1;
        let door = self
            .cell_within(row, column, top_row)
            .map(|cell| Door::new(cell.row(), cell.column()))
            .ok_or(ValidationError::DoorOutOfBounds { row, column })?;

        for (kind, blocks) in self.block_sets() {
            if let Some(cell) = door.cells().into_iter().find(|cell| blocks.contains(*cell)) {
                return Err(ValidationError::DoorCollision { kind, cell });
            }
        }
        Ok(door)
    }

    fn check_player(&self, row: i64, column: i64) -> Result<PlayerStart, ValidationError> {
        let cell = self
            .cell_within(row, column, i64::from(self.constraints.max_row))
            .ok_or(ValidationError::PlayerOutOfBounds { row, column })?;

        // the door never blocks the player
        for (kind, blocks) in self.block_sets() {
            if blocks.contains(cell) {
                return Err(ValidationError::PlayerCollision { kind, cell });
            }
        }

        if cell.row() != self.base_rows {
            let grounded = cell.below().is_some_and(|below| {
                self.static_blocks.contains(below) || self.move_blocks.contains(below)
            });
            if !grounded {
                return Err(ValidationError::UngroundedPlayer { cell });
            }
        }
        Ok(PlayerStart::new(cell.row(), cell.column()))
    }

    fn block_sets(&self) -> [(BlockKind, &BlockSet); 2] {
        [
            (BlockKind::Static, self.static_blocks),
            (BlockKind::Movable, self.move_blocks),
        ]
    }

    fn cell_within(&self, row: i64, column: i64, top_row: i64) -> Option<CellCoord> {
        let row_ok = row >= i64::from(self.base_rows) && row <= top_row;
        let column_ok = column >= 0 && column <= i64::from(self.constraints.max_column);
        if !(row_ok && column_ok) {
            return None;
        }
        Some(CellCoord::new(
            u32::try_from(column).ok()?,
            u32::try_from(row).ok()?,
        ))
    }
}

fn parse_field(token: &str, field: Field) -> Result<i64, ValidationError> {
    parse_integer(token).ok_or_else(|| ValidationError::InvalidInteger {
        field,
        token: token.to_owned(),
    })
}

fn parse_base_rows(token: &str, constraints: GridConstraints) -> Result<u32, ValidationError> {
    let base_rows = parse_field(token, Field::BaseRows)?;
    u32::try_from(base_rows)
        .ok()
        .filter(|rows| *rows <= constraints.max_row)
        .ok_or(ValidationError::BaseRowsOutOfBounds {
            base_rows,
            max_row: constraints.max_row,
        })
}

fn parse_blocks(
    tokens: &[(String, String)],
    bounds: GridBounds,
    kind: BlockKind,
) -> Result<BlockSet, ValidationError> {
    parse_grid(tokens.iter().map(|(column, rows)| (column, rows)), bounds)
        .map_err(|source| ValidationError::InvalidBlocks { kind, source })
}

fn check_block_bounds(
    blocks: &BlockSet,
    bounds: GridBounds,
    kind: BlockKind,
) -> Result<(), ValidationError> {
    for cell in blocks.cells() {
        let error = if cell.column() > bounds.max_column {
            ParseError::ColumnOutOfBounds {
                column: i64::from(cell.column()),
                max_column: bounds.max_column,
            }
        } else if cell.row() < bounds.base_rows || cell.row() > bounds.max_row {
            ParseError::RowOutOfBounds {
                column: cell.column(),
                row: i64::from(cell.row()),
                min: bounds.base_rows,
                max: bounds.max_row,
            }
        } else {
            continue;
        };
        return Err(ValidationError::InvalidBlocks {
            kind,
            source: error,
        });
    }
    Ok(())
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Block Hopper level services.
//!
//! This crate defines the value types that describe a level layout and the
//! message surface that connects adapters, the authoritative level store, and
//! pure systems. Systems validate raw input and respond with [`Command`]
//! values, the world executes those commands via its `apply` entry point, and
//! then broadcasts [`Event`] values describing what happened.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::{Deserialize, Serialize};

/// Names of the levels that ship with the game. User levels may not reuse them.
pub const BUILT_IN_LEVEL_NAMES: [&str; 5] = ["1", "2", "3", "4", "5"];

/// Name of the only built-in level that can be played without purchasing the level pack.
pub const FREE_LEVEL_NAME: &str = "1";

/// Commands that express all permissible level store mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that a validated level record be persisted.
    StoreLevel {
        /// Record to persist.
        record: LevelRecord,
    },
}

/// Events broadcast by the level store after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a level record was persisted.
    LevelStored {
        /// Identifier assigned to the record by the store.
        id: LevelId,
        /// Name of the stored level.
        level: LevelName,
        /// Actor that owns the level, `None` for built-in levels.
        owner: Option<ActorId>,
    },
    /// Reports that a record was refused because its name is already taken.
    LevelStoreRejected {
        /// Name of the refused level.
        level: LevelName,
        /// Actor that attempted the store.
        owner: Option<ActorId>,
    },
}

/// Distinguishes the two kinds of blocks a level may contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Blocks fixed in place for the duration of the level.
    Static,
    /// Blocks the player may pick up and carry.
    Movable,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => f.write_str("static"),
            Self::Movable => f.write_str("movable"),
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Row indices grow upward from the floor band toward the top of the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Cell directly beneath this one, if the row is not already zero.
    #[must_use]
    pub const fn below(&self) -> Option<Self> {
        match self.row.checked_sub(1) {
            Some(row) => Some(Self::new(self.column, row)),
            None => None,
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column {}, row {}", self.column, self.row)
    }
}

/// Mapping from column to the set of rows occupied by one kind of block.
///
/// Rows within a column are unique and kept in ascending order; the order in
/// which they were supplied is not preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockSet {
    columns: BTreeMap<u32, BTreeSet<u32>>,
}

impl BlockSet {
    /// Creates an empty block set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a block set from `(column, rows)` pairs, collapsing duplicates.
    #[must_use]
    pub fn from_columns<I, R>(columns: I) -> Self
    where
        I: IntoIterator<Item = (u32, R)>,
        R: IntoIterator<Item = u32>,
    {
        let mut set = Self::new();
        for (column, rows) in columns {
            for row in rows {
                let _ = set.insert(CellCoord::new(column, row));
            }
        }
        set
    }

    /// Marks the provided cell as occupied. Returns `false` when it already was.
    pub fn insert(&mut self, cell: CellCoord) -> bool {
        self.columns
            .entry(cell.column())
            .or_default()
            .insert(cell.row())
    }

    /// Reports whether the provided cell is occupied.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.columns
            .get(&cell.column())
            .is_some_and(|rows| rows.contains(&cell.row()))
    }

    /// Rows occupied within the provided column, if the column has any blocks.
    #[must_use]
    pub fn rows(&self, column: u32) -> Option<&BTreeSet<u32>> {
        self.columns.get(&column)
    }

    /// Iterates over the occupied columns in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &BTreeSet<u32>)> {
        self.columns.iter().map(|(column, rows)| (*column, rows))
    }

    /// Iterates over every occupied cell, column-major.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.iter()
            .flat_map(|(column, rows)| rows.iter().map(move |row| CellCoord::new(column, *row)))
    }

    /// Reports whether the set contains no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.columns.values().map(BTreeSet::len).sum()
    }

    /// Re-serializes the set into `(column, rows)` token pairs.
    #[must_use]
    pub fn to_tokens(&self, delimiter: char) -> Vec<(String, String)> {
        let separator = delimiter.to_string();
        self.iter()
            .map(|(column, rows)| {
                let rows = rows
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(separator.as_str());
                (column.to_string(), rows)
            })
            .collect()
    }
}

/// Exit door occupying two vertically stacked cells starting at `row`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Door {
    /// Lower of the two rows covered by the door.
    pub row: u32,
    /// Column containing the door.
    pub column: u32,
}

impl Door {
    /// Creates a new door anchored at the provided lower cell.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Both cells covered by the door, lower first.
    #[must_use]
    pub const fn cells(&self) -> [CellCoord; 2] {
        [
            CellCoord::new(self.column, self.row),
            CellCoord::new(self.column, self.row + 1),
        ]
    }
}

/// Cell in which the player appears when the level begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerStart {
    /// Row containing the player.
    pub row: u32,
    /// Column containing the player.
    pub column: u32,
}

impl PlayerStart {
    /// Creates a new player start position.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Cell occupied by the player.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        CellCoord::new(self.column, self.row)
    }
}

/// Position on the canvas in pixels, measured from the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Horizontal offset in pixels.
    pub x: i64,
    /// Vertical offset in pixels.
    pub y: i64,
}

impl PixelPoint {
    /// Creates a new pixel position.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for PixelPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Bounds and conversion factors applied while validating a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConstraints {
    /// Largest permitted column index.
    pub max_column: u32,
    /// Largest permitted row index.
    pub max_row: u32,
    /// Side length of a single cell in pixels.
    pub entity_size: u32,
    /// Number of rows visible on the canvas.
    pub canvas_height_blocks: u32,
}

impl GridConstraints {
    /// Converts a cell into the pixel position of its top-left corner.
    #[must_use]
    pub fn pixel_position(&self, cell: CellCoord) -> PixelPoint {
        let size = i64::from(self.entity_size);
        let rows_above = i64::from(self.canvas_height_blocks) - i64::from(cell.row()) - 1;
        PixelPoint::new(i64::from(cell.column()) * size, size * rows_above)
    }

    /// Converts a pixel position back into the cell it anchors.
    ///
    /// Returns `None` when the point is not aligned to the cell grid or lies
    /// outside the canvas.
    #[must_use]
    pub fn cell_from_pixels(&self, point: PixelPoint) -> Option<CellCoord> {
        let size = i64::from(self.entity_size);
        if size == 0 || point.x < 0 || point.y < 0 || point.x % size != 0 || point.y % size != 0 {
            return None;
        }
        let column = u32::try_from(point.x / size).ok()?;
        let row = i64::from(self.canvas_height_blocks) - point.y / size - 1;
        let row = u32::try_from(row).ok()?;
        Some(CellCoord::new(column, row))
    }
}

impl Default for GridConstraints {
    fn default() -> Self {
        RenderingConstants::default().grid_constraints()
    }
}

/// Fixed constants the game client uses to draw and animate a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderingConstants {
    /// Side length of a single cell in pixels.
    pub entity_size: u32,
    /// Number of columns visible on the canvas.
    pub canvas_width_blocks: u32,
    /// Number of rows visible on the canvas.
    pub canvas_height_blocks: u32,
    /// Distance in pixels an entity moves per animation step.
    pub step_size: u32,
}

impl RenderingConstants {
    /// Derives the validation bounds implied by the canvas dimensions.
    #[must_use]
    pub const fn grid_constraints(&self) -> GridConstraints {
        GridConstraints {
            max_column: self.canvas_width_blocks.saturating_sub(1),
            max_row: self.canvas_height_blocks.saturating_sub(1),
            entity_size: self.entity_size,
            canvas_height_blocks: self.canvas_height_blocks,
        }
    }
}

impl Default for RenderingConstants {
    fn default() -> Self {
        Self {
            entity_size: 64,
            canvas_width_blocks: 24,
            canvas_height_blocks: 10,
            step_size: 10,
        }
    }
}

/// Human-readable level name; unique per owner.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelName(String);

impl LevelName {
    /// Creates a level name from the provided text.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrows the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reports whether the name belongs to a level shipped with the game.
    #[must_use]
    pub fn is_built_in(&self) -> bool {
        BUILT_IN_LEVEL_NAMES.contains(&self.0.as_str())
    }
}

impl fmt::Display for LevelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of the actor issuing a request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Wraps the identity supplied by the authentication layer.
    #[must_use]
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    /// Borrows the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier assigned to a stored level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(u64);

impl LevelId {
    /// Creates a new level identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Validated layout in the shape the level store persists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedLevel {
    /// Number of solid rows forming the floor band.
    pub base_rows: u32,
    /// Blocks fixed in place.
    pub static_blocks: BlockSet,
    /// Blocks the player may carry.
    pub move_blocks: BlockSet,
    /// Exit door.
    pub door: Door,
    /// Player start in pixel units.
    pub player_start: PixelPoint,
    /// Constants used by the client to draw the level.
    pub rendering: RenderingConstants,
}

/// Complete level record as held by the level store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRecord {
    /// Name of the level.
    pub level: LevelName,
    /// Level unlocked after completing this one.
    pub next_level: Option<LevelName>,
    /// Actor that built the level; `None` for built-in levels.
    pub owner: Option<ActorId>,
    /// Validated layout.
    pub layout: NormalizedLevel,
}

/// Items an actor has purchased, as reported by the purchase service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entitlements {
    /// Unlocks built-in levels beyond the free one.
    pub levels: bool,
    /// Unlocks the alternative player sprite.
    pub sprite: bool,
    /// Unlocks the level builder.
    pub builder: bool,
}

impl Entitlements {
    /// Creates an entitlement set with explicit flags.
    #[must_use]
    pub const fn new(levels: bool, sprite: bool, builder: bool) -> Self {
        Self {
            levels,
            sprite,
            builder,
        }
    }
}

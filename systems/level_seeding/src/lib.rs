#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Built-in levels shipped with the game and the commands that seed them.

use block_hopper_core::{
    BlockSet, Command, Door, LevelName, LevelRecord, NormalizedLevel, PixelPoint,
    RenderingConstants,
};

struct Blueprint {
    name: &'static str,
    next_level: Option<&'static str>,
    base_rows: u32,
    static_blocks: &'static [(u32, &'static [u32])],
    move_blocks: &'static [(u32, &'static [u32])],
    door: Door,
    player_start: PixelPoint,
}

const BLUEPRINTS: [Blueprint; 5] = [
    Blueprint {
        name: "1",
        next_level: Some("2"),
        base_rows: 4,
        static_blocks: &[(7, &[4, 5]), (13, &[4]), (17, &[4, 5])],
        move_blocks: &[(2, &[4]), (10, &[4])],
        door: Door::new(4, 23),
        player_start: PixelPoint::new(256, 320),
    },
    Blueprint {
        name: "2",
        next_level: Some("3"),
        base_rows: 4,
        static_blocks: &[(12, &[4, 5]), (23, &[4, 5, 6])],
        move_blocks: &[(0, &[4, 5]), (3, &[4]), (22, &[4])],
        door: Door::new(7, 23),
        player_start: PixelPoint::new(256, 320),
    },
    Blueprint {
        name: "3",
        next_level: Some("4"),
        base_rows: 3,
        static_blocks: &[
            (0, &[3, 4]),
            (1, &[3, 4]),
            (2, &[3, 4]),
            (3, &[3, 4]),
            (4, &[3, 4]),
            (5, &[3, 4]),
            (11, &[3, 4]),
            (12, &[3, 4]),
            (13, &[3, 4]),
            (14, &[3, 4]),
            (15, &[3, 4]),
            (16, &[3, 4]),
            (17, &[3, 4]),
            (18, &[3, 4]),
            (19, &[3, 4]),
            (20, &[3, 4]),
            (21, &[3, 4]),
            (22, &[3, 4]),
            (23, &[3, 4]),
        ],
        move_blocks: &[(0, &[5])],
        door: Door::new(5, 23),
        player_start: PixelPoint::new(256, 256),
    },
    Blueprint {
        name: "4",
        next_level: Some("5"),
        base_rows: 2,
        static_blocks: &[
            (0, &[2, 3]),
            (1, &[2, 3]),
            (2, &[2, 3]),
            (3, &[2, 3]),
            (4, &[2, 3]),
            (5, &[2, 3]),
            (6, &[2, 3]),
            (7, &[2, 3]),
            (8, &[2, 3]),
            (9, &[6]),
            (10, &[6]),
            (11, &[6]),
            (12, &[6]),
            (13, &[6]),
            (14, &[6]),
            (15, &[6]),
            (16, &[2, 3]),
            (17, &[2, 3]),
            (18, &[2, 3]),
            (19, &[2, 3]),
            (20, &[2, 3]),
            (21, &[2, 3]),
            (22, &[2, 3]),
            (23, &[2, 3]),
        ],
        move_blocks: &[(0, &[4]), (21, &[4]), (22, &[4, 5]), (23, &[4, 5])],
        door: Door::new(7, 12),
        player_start: PixelPoint::new(256, 320),
    },
    Blueprint {
        name: "5",
        next_level: None,
        base_rows: 2,
        static_blocks: &[(0, &[4]), (1, &[2]), (17, &[2, 3, 4, 5])],
        move_blocks: &[(0, &[5]), (14, &[2]), (15, &[2, 3]), (16, &[2, 3])],
        door: Door::new(2, 22),
        player_start: PixelPoint::new(320, 448),
    },
];

impl Blueprint {
    fn record(&self) -> LevelRecord {
        LevelRecord {
            level: LevelName::new(self.name),
            next_level: self.next_level.map(LevelName::new),
            owner: None,
            layout: NormalizedLevel {
                base_rows: self.base_rows,
                static_blocks: block_set(self.static_blocks),
                move_blocks: block_set(self.move_blocks),
                door: self.door,
                player_start: self.player_start,
                rendering: RenderingConstants::default(),
            },
        }
    }
}

fn block_set(columns: &[(u32, &[u32])]) -> BlockSet {
    BlockSet::from_columns(
        columns
            .iter()
            .map(|(column, rows)| (*column, rows.iter().copied())),
    )
}

/// Records for every built-in level, in play order.
#[must_use]
pub fn built_in_levels() -> Vec<LevelRecord> {
    BLUEPRINTS.iter().map(Blueprint::record).collect()
}

/// Commands that store every built-in level.
#[must_use]
pub fn seed_commands() -> Vec<Command> {
    built_in_levels()
        .into_iter()
        .map(|record| Command::StoreLevel { record })
        .collect()
}

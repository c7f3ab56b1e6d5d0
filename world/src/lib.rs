#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level store for Block Hopper.
//!
//! The store only changes through [`apply`]; everything else reads it through
//! the [`query`] module.

use block_hopper_core::{ActorId, Command, Event, LevelId, LevelName, LevelRecord};
use tracing::{debug, warn};

/// In-memory store holding every level known to the game.
#[derive(Debug, Default)]
pub struct World {
    levels: Vec<StoredLevel>,
    next_id: u64,
}

#[derive(Debug)]
struct StoredLevel {
    id: LevelId,
    record: LevelRecord,
}

impl World {
    /// Creates an empty level store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, level: &LevelName, owner: Option<&ActorId>) -> Option<&StoredLevel> {
        self.levels
            .iter()
            .find(|stored| &stored.record.level == level && stored.record.owner.as_ref() == owner)
    }

    fn allocate_id(&mut self) -> LevelId {
        let id = LevelId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StoreLevel { record } => {
            if world.find(&record.level, record.owner.as_ref()).is_some() {
                warn!(level = %record.level, "refusing to overwrite existing level");
                out_events.push(Event::LevelStoreRejected {
                    level: record.level,
                    owner: record.owner,
                });
                return;
            }

            let id = world.allocate_id();
            debug!(level = %record.level, id = id.get(), "level stored");
            out_events.push(Event::LevelStored {
                id,
                level: record.level.clone(),
                owner: record.owner.clone(),
            });
            world.levels.push(StoredLevel { id, record });
        }
    }
}

/// Query functions that provide read-only access to the level store.
pub mod query {
    use block_hopper_core::{
        ActorId, Entitlements, LevelId, LevelName, LevelRecord, BUILT_IN_LEVEL_NAMES,
        FREE_LEVEL_NAME,
    };

    use super::World;

    /// Reports whether `owner` already stored a level called `level`.
    #[must_use]
    pub fn level_exists(world: &World, level: &LevelName, owner: &ActorId) -> bool {
        world.find(level, Some(owner)).is_some()
    }

    /// Reports whether the name belongs to a built-in level.
    #[must_use]
    pub fn is_reserved_name(level: &LevelName) -> bool {
        level.is_built_in()
    }

    /// Retrieves the record stored under the provided identifier.
    #[must_use]
    pub fn level(world: &World, id: LevelId) -> Option<&LevelRecord> {
        world
            .levels
            .iter()
            .find(|stored| stored.id == id)
            .map(|stored| &stored.record)
    }

    /// Retrieves the record matching both name and owner exactly.
    #[must_use]
    pub fn find_level<'world>(
        world: &'world World,
        level: &LevelName,
        owner: Option<&ActorId>,
    ) -> Option<(LevelId, &'world LevelRecord)> {
        world
            .find(level, owner)
            .map(|stored| (stored.id, &stored.record))
    }

    /// Names of the levels built by `owner`, in creation order.
    #[must_use]
    pub fn levels_owned_by<'world>(world: &'world World, owner: &ActorId) -> Vec<&'world LevelName> {
        world
            .levels
            .iter()
            .filter(|stored| stored.record.owner.as_ref() == Some(owner))
            .map(|stored| &stored.record.level)
            .collect()
    }

    /// Number of stored levels.
    #[must_use]
    pub fn level_count(world: &World) -> usize {
        world.levels.len()
    }

    /// Built-in level names the entitlements unlock.
    #[must_use]
    pub fn unlocked_levels(entitlements: Entitlements) -> Vec<&'static str> {
        if entitlements.levels {
            BUILT_IN_LEVEL_NAMES.to_vec()
        } else {
            vec![FREE_LEVEL_NAME]
        }
    }

    /// Resolves the level `actor` asked to play and the presentation it gets.
    pub fn play_level<'world>(
        world: &'world World,
        level: &LevelName,
        actor: &ActorId,
        entitlements: Entitlements,
    ) -> Result<PlaySession<'world>, AccessError> {
        let sprite = if entitlements.sprite {
            PlayerSprite::TranslateRobot
        } else {
            PlayerSprite::Android
        };

        if let Some(built_in) = world.find(level, None) {
            let free = level.as_str() == FREE_LEVEL_NAME;
            if !entitlements.levels && !free {
                return Err(AccessError::Locked {
                    level: level.clone(),
                });
            }
            let next_level = if entitlements.levels {
                built_in.record.next_level.as_ref()
            } else {
                None
            };
            return Ok(PlaySession {
                id: built_in.id,
                record: &built_in.record,
                next_level,
                sprite,
            });
        }

        if let Some(owned) = world.find(level, Some(actor)) {
            return Ok(PlaySession {
                id: owned.id,
                record: &owned.record,
                next_level: owned.record.next_level.as_ref(),
                sprite,
            });
        }

        if world.levels.iter().any(|stored| &stored.record.level == level) {
            Err(AccessError::NotOwner {
                level: level.clone(),
            })
        } else {
            Err(AccessError::NotFound {
                level: level.clone(),
            })
        }
    }

    /// Everything the client needs to start a level.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PlaySession<'world> {
        /// Identifier of the level being played.
        pub id: LevelId,
        /// Stored record.
        pub record: &'world LevelRecord,
        /// Level offered after completion, if any is unlocked.
        pub next_level: Option<&'world LevelName>,
        /// Sprite used to draw the player.
        pub sprite: PlayerSprite,
    }

    /// Artwork used for the player character.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub enum PlayerSprite {
        /// Default artwork.
        Android,
        /// Purchased artwork.
        TranslateRobot,
    }

    impl PlayerSprite {
        /// Asset name the client loads for this sprite.
        #[must_use]
        pub const fn asset_name(&self) -> &'static str {
            match self {
                Self::Android => "android-64",
                Self::TranslateRobot => "translate_robot-lb64",
            }
        }
    }

    /// Reasons a level cannot be played.
    #[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
    pub enum AccessError {
        /// No level with that name exists.
        #[error("level {level} not found")]
        NotFound {
            /// Requested name.
            level: LevelName,
        },
        /// The built-in level requires the level pack.
        #[error("you don't have access to level {level}")]
        Locked {
            /// Requested name.
            level: LevelName,
        },
        /// The level belongs to another actor.
        #[error("level {level} belongs to another player")]
        NotOwner {
            /// Requested name.
            level: LevelName,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use block_hopper_core::{
        BlockSet, Door, Entitlements, NormalizedLevel, PixelPoint, RenderingConstants,
    };
    use query::{AccessError, PlayerSprite};

    fn record(level: &str, next_level: Option<&str>, owner: Option<&str>) -> LevelRecord {
        LevelRecord {
            level: LevelName::new(level),
            next_level: next_level.map(LevelName::new),
            owner: owner.map(ActorId::new),
            layout: NormalizedLevel {
                base_rows: 2,
                static_blocks: BlockSet::new(),
                move_blocks: BlockSet::new(),
                door: Door::new(2, 23),
                player_start: PixelPoint::new(0, 448),
                rendering: RenderingConstants::default(),
            },
        }
    }

    fn store(world: &mut World, record: LevelRecord) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::StoreLevel { record }, &mut events);
        events
    }

    fn seeded_world() -> World {
        let mut world = World::new();
        let _ = store(&mut world, record("1", Some("2"), None));
        let _ = store(&mut world, record("2", None, None));
        let _ = store(&mut world, record("castle", None, Some("ada")));
        world
    }

    #[test]
    fn store_assigns_sequential_ids() {
        let mut world = World::new();
        let first = store(&mut world, record("a", None, Some("ada")));
        let second = store(&mut world, record("b", None, Some("ada")));

        assert_eq!(
            first,
            vec![Event::LevelStored {
                id: LevelId::new(0),
                level: LevelName::new("a"),
                owner: Some(ActorId::new("ada")),
            }]
        );
        assert!(matches!(
            second.as_slice(),
            [Event::LevelStored { id, .. }] if *id == LevelId::new(1)
        ));
        assert_eq!(query::level_count(&world), 2);
    }

    #[test]
    fn store_refuses_duplicate_name_for_same_owner() {
        let mut world = World::new();
        let _ = store(&mut world, record("a", None, Some("ada")));
        let events = store(&mut world, record("a", None, Some("ada")));

        assert_eq!(
            events,
            vec![Event::LevelStoreRejected {
                level: LevelName::new("a"),
                owner: Some(ActorId::new("ada")),
            }]
        );
        assert_eq!(query::level_count(&world), 1);
    }

    #[test]
    fn same_name_is_allowed_for_different_owners() {
        let mut world = World::new();
        let _ = store(&mut world, record("a", None, Some("ada")));
        let _ = store(&mut world, record("a", None, Some("bob")));

        assert!(query::level_exists(&world, &LevelName::new("a"), &ActorId::new("bob")));
        assert!(!query::level_exists(&world, &LevelName::new("a"), &ActorId::new("cy")));
        assert_eq!(query::level_count(&world), 2);
    }

    #[test]
    fn owned_levels_are_listed_in_creation_order() {
        let mut world = seeded_world();
        let _ = store(&mut world, record("dungeon", None, Some("ada")));
        let owner = ActorId::new("ada");

        let names: Vec<&str> = query::levels_owned_by(&world, &owner)
            .into_iter()
            .map(LevelName::as_str)
            .collect();
        assert_eq!(names, vec!["castle", "dungeon"]);
    }

    #[test]
    fn free_level_hides_next_level_without_level_pack() {
        let world = seeded_world();
        let session = query::play_level(
            &world,
            &LevelName::new("1"),
            &ActorId::new("bob"),
            Entitlements::default(),
        )
        .expect("level one is free");

        assert_eq!(session.next_level, None);
        assert_eq!(session.sprite, PlayerSprite::Android);
    }

    #[test]
    fn level_pack_unlocks_chain_and_locked_levels() {
        let world = seeded_world();
        let entitlements = Entitlements::new(true, true, false);
        let session = query::play_level(&world, &LevelName::new("1"), &ActorId::new("bob"), entitlements)
            .expect("level one is playable");

        assert_eq!(session.next_level, Some(&LevelName::new("2")));
        assert_eq!(session.sprite.asset_name(), "translate_robot-lb64");
        assert!(query::play_level(&world, &LevelName::new("2"), &ActorId::new("bob"), entitlements).is_ok());
    }

    #[test]
    fn paid_built_in_level_is_locked_without_level_pack() {
        let world = seeded_world();
        let result = query::play_level(
            &world,
            &LevelName::new("2"),
            &ActorId::new("bob"),
            Entitlements::default(),
        );

        assert_eq!(
            result,
            Err(AccessError::Locked {
                level: LevelName::new("2"),
            })
        );
    }

    #[test]
    fn user_levels_are_private_to_their_owner() {
        let world = seeded_world();
        let name = LevelName::new("castle");

        assert!(query::play_level(&world, &name, &ActorId::new("ada"), Entitlements::default()).is_ok());
        assert_eq!(
            query::play_level(&world, &name, &ActorId::new("bob"), Entitlements::default()),
            Err(AccessError::NotOwner { level: name.clone() })
        );
        assert_eq!(
            query::play_level(&world, &LevelName::new("moat"), &ActorId::new("ada"), Entitlements::default()),
            Err(AccessError::NotFound {
                level: LevelName::new("moat"),
            })
        );
    }

    #[test]
    fn unlocked_levels_follow_level_pack() {
        assert_eq!(query::unlocked_levels(Entitlements::default()), vec!["1"]);
        assert_eq!(
            query::unlocked_levels(Entitlements::new(true, false, false)),
            vec!["1", "2", "3", "4", "5"]
        );
    }
}

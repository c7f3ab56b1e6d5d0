#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure level-builder system that turns a submitted form into a store command.

use std::collections::HashMap;

use block_hopper_core::{ActorId, Command, Entitlements, LevelName, LevelRecord, RenderingConstants};
use block_hopper_system_layout_validator::{
    validate_layout, LayoutInput, RawPosition, ValidationError,
};
use tracing::{debug, info};

/// Form key prefix for static block columns.
pub const STATIC_FIELD_PREFIX: &str = "static";
/// Form key prefix for movable block columns.
pub const MOVABLE_FIELD_PREFIX: &str = "moveable";

/// Level-builder form decoded from its submitted fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildForm {
    /// Requested level name.
    pub level: String,
    /// Layout tokens.
    pub layout: LayoutInput,
}

impl BuildForm {
    /// Decodes submitted `(key, value)` pairs.
    ///
    /// Block columns are read positionally: `static_column0`/`static_rows0`,
    /// then index 1, and so on until the `*_column{i}` key is absent. Later
    /// duplicates of a key replace earlier ones. Missing scalar fields decode as
    /// empty tokens and fail validation.
    #[must_use]
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields: HashMap<String, String> = fields
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        let mut take = |key: &str| fields.remove(key).unwrap_or_default();

        let level = take("level");
        let base_rows = take("base_rows");
        let door = RawPosition::new(take("door_row"), take("door_column"));
        let player = RawPosition::new(take("player_row"), take("player_column"));
        let static_blocks = positional_columns(&mut fields, STATIC_FIELD_PREFIX);
        let move_blocks = positional_columns(&mut fields, MOVABLE_FIELD_PREFIX);

        Self {
            level,
            layout: LayoutInput {
                base_rows,
                static_blocks,
                move_blocks,
                door,
                player,
            },
        }
    }
}

fn positional_columns(fields: &mut HashMap<String, String>, prefix: &str) -> Vec<(String, String)> {
    let mut columns = Vec::new();
    for index in 0.. {
        let Some(column) = fields.remove(&format!("{prefix}_column{index}")) else {
            break;
        };
        let rows = fields
            .remove(&format!("{prefix}_rows{index}"))
            .unwrap_or_default();
        columns.push((column, rows));
    }
    columns
}

/// Form submitted by an authenticated actor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildRequest {
    /// Actor submitting the level.
    pub actor: ActorId,
    /// Submitted form.
    pub form: BuildForm,
}

/// Reasons a build request is refused.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// The actor has not purchased the level builder.
    #[error("you don't have access to the level builder")]
    AccessDenied,
    /// The form did not name the level.
    #[error("level name is missing")]
    MissingLevelName,
    /// The layout or its name failed validation.
    #[error(transparent)]
    Rejected(#[from] ValidationError),
}

/// Level-builder system that validates forms and emits store commands.
#[derive(Clone, Debug, Default)]
pub struct LevelBuilder {
    rendering: RenderingConstants,
}

impl LevelBuilder {
    /// Creates a builder producing levels for the provided canvas.
    #[must_use]
    pub const fn new(rendering: RenderingConstants) -> Self {
        Self { rendering }
    }

    /// Validates the request and, on success, emits a [`Command::StoreLevel`].
    ///
    /// The `level_exists` closure should mirror the semantics of the world's
    /// `query::level_exists` helper.
    pub fn handle<F>(
        &self,
        request: &BuildRequest,
        entitlements: Entitlements,
        level_exists: F,
        out: &mut Vec<Command>,
    ) -> Result<LevelName, BuildError>
    where
        F: FnMut(&LevelName, &ActorId) -> bool,
    {
        match self.build(request, entitlements, level_exists) {
            Ok(record) => {
                info!(level = %record.level, owner = %request.actor, "level accepted");
                let name = record.level.clone();
                out.push(Command::StoreLevel { record });
                Ok(name)
            }
            Err(error) => {
                debug!(owner = %request.actor, %error, "level rejected");
                Err(error)
            }
        }
    }

    fn build<F>(
        &self,
        request: &BuildRequest,
        entitlements: Entitlements,
        mut level_exists: F,
    ) -> Result<LevelRecord, BuildError>
    where
        F: FnMut(&LevelName, &ActorId) -> bool,
    {
        if !entitlements.builder {
            return Err(BuildError::AccessDenied);
        }

        let name = request.form.level.trim();
        if name.is_empty() {
            return Err(BuildError::MissingLevelName);
        }
        let name = LevelName::new(name);
        if name.is_built_in() || level_exists(&name, &request.actor) {
            return Err(ValidationError::DuplicateLevelName { name }.into());
        }

        let layout = validate_layout(&request.form.layout, &self.rendering)?;
        Ok(LevelRecord {
            level: name,
            next_level: None,
            owner: Some(request.actor.clone()),
            layout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_scan_stops_at_first_missing_column() {
        let form = BuildForm::from_fields([
            ("static_column0", "1"),
            ("static_rows0", "2,3"),
            ("static_column2", "5"),
            ("static_rows2", "2"),
        ]);

        assert_eq!(
            form.layout.static_blocks,
            vec![("1".to_owned(), "2,3".to_owned())]
        );
    }

    #[test]
    fn missing_rows_decode_as_empty_token() {
        let form = BuildForm::from_fields([("moveable_column0", "4")]);

        assert_eq!(
            form.layout.move_blocks,
            vec![("4".to_owned(), String::new())]
        );
    }

    #[test]
    fn scalar_fields_are_read_by_name() {
        let form = BuildForm::from_fields([
            ("level", "castle"),
            ("base_rows", "2"),
            ("door_row", "7"),
            ("door_column", "12"),
            ("player_row", "2"),
            ("player_column", "5"),
        ]);

        assert_eq!(form.level, "castle");
        assert_eq!(form.layout.base_rows, "2");
        assert_eq!(form.layout.door, RawPosition::new("7", "12"));
        assert_eq!(form.layout.player, RawPosition::new("2", "5"));
        assert!(form.layout.static_blocks.is_empty());
    }
}

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use block_hopper_system_level_builder::BuildForm;

/// Reads a level-builder form stored as a flat TOML table.
///
/// Keys follow the builder form (`level`, `base_rows`, `static_column0`,
/// `static_rows0`, ...); values may be strings or integers.
pub(crate) fn read_form(path: &Path) -> Result<BuildForm> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout at {}", path.display()))?;
    parse_form(&contents).with_context(|| format!("invalid layout file {}", path.display()))
}

fn parse_form(contents: &str) -> Result<BuildForm> {
    let table: toml::Table = toml::from_str(contents).context("failed to parse layout toml")?;
    let mut fields = Vec::with_capacity(table.len());
    for (key, value) in table {
        let value = match value {
            toml::Value::String(text) => text,
            toml::Value::Integer(number) => number.to_string(),
            other => bail!("field `{key}` must be a string or integer, found {}", other.type_str()),
        };
        fields.push((key, value));
    }
    Ok(BuildForm::from_fields(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use block_hopper_system_layout_validator::RawPosition;

    #[test]
    fn integers_and_strings_become_tokens() {
        let form = parse_form(
            r#"
            level = "tower"
            base_rows = 2
            static_column0 = 0
            static_rows0 = "2,3"
            door_row = 7
            door_column = 12
            player_row = 2
            player_column = 5
            "#,
        )
        .expect("layout parses");

        assert_eq!(form.level, "tower");
        assert_eq!(form.layout.base_rows, "2");
        assert_eq!(
            form.layout.static_blocks,
            vec![("0".to_owned(), "2,3".to_owned())]
        );
        assert_eq!(form.layout.door, RawPosition::new("7", "12"));
    }

    #[test]
    fn nested_values_are_rejected() {
        let error = parse_form("door = { row = 7 }").expect_err("tables are not tokens");
        assert!(error.to_string().contains("door"));
    }
}

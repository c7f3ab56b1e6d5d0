use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use block_hopper_core::RenderingConstants;
use serde::Deserialize;

/// Configuration file consulted when `--config` is not supplied.
const DEFAULT_CONFIG_PATH: &str = "block-hopper.toml";

/// Settings read from the optional TOML configuration file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CliConfig {
    rendering: RenderingConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RenderingConfig {
    entity_size: u32,
    canvas_width_blocks: u32,
    canvas_height_blocks: u32,
    step_size: u32,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        let defaults = RenderingConstants::default();
        Self {
            entity_size: defaults.entity_size,
            canvas_width_blocks: defaults.canvas_width_blocks,
            canvas_height_blocks: defaults.canvas_height_blocks,
            step_size: defaults.step_size,
        }
    }
}

impl CliConfig {
    /// Loads the configuration from `path`, or from the default location.
    ///
    /// An explicitly requested file must exist; a missing default file yields
    /// the built-in defaults.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse configuration toml")?;
        let rendering = config.rendering;
        if rendering.entity_size == 0 {
            bail!("rendering.entity_size must be positive");
        }
        if rendering.canvas_width_blocks == 0 || rendering.canvas_height_blocks == 0 {
            bail!("rendering canvas dimensions must be positive");
        }
        Ok(config)
    }

    /// Rendering constants applied to newly built levels.
    #[must_use]
    pub(crate) fn rendering(&self) -> RenderingConstants {
        RenderingConstants {
            entity_size: self.rendering.entity_size,
            canvas_width_blocks: self.rendering.canvas_width_blocks,
            canvas_height_blocks: self.rendering.canvas_height_blocks,
            step_size: self.rendering.step_size,
        }
    }
}

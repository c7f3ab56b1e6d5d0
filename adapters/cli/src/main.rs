#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the Block Hopper level services.

mod config;
mod layout_file;
mod layout_transfer;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use block_hopper_core::{ActorId, Entitlements, Event, LevelId, LevelName, LevelRecord};
use block_hopper_system_layout_validator::validate_level;
use block_hopper_system_level_builder::{BuildRequest, LevelBuilder};
use block_hopper_system_level_seeding::seed_commands;
use block_hopper_world::{self as world, query, World};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

#[derive(Debug, Parser)]
#[command(name = "block-hopper", version, about = "Validate and inspect Block Hopper levels")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Validates a level-builder form and prints the stored record.
    Validate {
        /// TOML file holding the builder form fields.
        path: PathBuf,
        /// Identity of the player submitting the level.
        #[arg(long, default_value = "local")]
        actor: String,
        /// Print a transfer string instead of JSON.
        #[arg(long)]
        export: bool,
    },
    /// Prints the built-in levels as JSON.
    Seed,
    /// Prints the transfer string for a built-in level.
    Export {
        /// Name of the built-in level.
        name: String,
    },
    /// Decodes and re-validates a transfer string.
    Import {
        /// Transfer string produced by `export`.
        payload: String,
    },
    /// Resolves what a player receives when starting a built-in level.
    Play {
        /// Name of the level to play.
        name: String,
        /// Identity of the player.
        #[arg(long, default_value = "local")]
        actor: String,
        /// The player purchased the level pack.
        #[arg(long)]
        levels: bool,
        /// The player purchased the alternative sprite.
        #[arg(long)]
        sprite: bool,
    },
}

#[derive(Debug, Serialize)]
struct PlayReport<'a> {
    id: u64,
    record: &'a LevelRecord,
    next_level: Option<&'a LevelName>,
    sprite: &'static str,
}

/// Entry point for the Block Hopper command-line interface.
fn main() {
    init_tracing();
    if let Err(err) = run(Cli::parse()) {
        error!(error = %format!("{err:#}"), "command failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let mut world = seeded_world()?;

    match cli.command {
        CliCommand::Validate {
            path,
            actor,
            export,
        } => {
            let request = BuildRequest {
                actor: ActorId::new(actor),
                form: layout_file::read_form(&path)?,
            };
            let id = build_level(&mut world, &config, &request)?;
            let record = query::level(&world, id).context("stored level is missing")?;
            if export {
                println!("{}", layout_transfer::encode(record)?);
            } else {
                print_json(record)?;
            }
        }
        CliCommand::Seed => {
            let records: Vec<&LevelRecord> = built_in_records(&world).collect();
            print_json(&records)?;
        }
        CliCommand::Export { name } => {
            let name = LevelName::new(name);
            let (_, record) = query::find_level(&world, &name, None)
                .with_context(|| format!("no built-in level named {name}"))?;
            println!("{}", layout_transfer::encode(record)?);
        }
        CliCommand::Import { payload } => {
            let record = layout_transfer::decode(&payload)?;
            validate_level(&record.layout)
                .with_context(|| format!("imported level {} is invalid", record.level))?;
            info!(level = %record.level, "level imported");
            print_json(&record)?;
        }
        CliCommand::Play {
            name,
            actor,
            levels,
            sprite,
        } => {
            let entitlements = Entitlements::new(levels, sprite, false);
            let session = query::play_level(
                &world,
                &LevelName::new(name),
                &ActorId::new(actor),
                entitlements,
            )?;
            print_json(&PlayReport {
                id: session.id.get(),
                record: session.record,
                next_level: session.next_level,
                sprite: session.sprite.asset_name(),
            })?;
        }
    }
    Ok(())
}

fn seeded_world() -> Result<World> {
    let mut world = World::new();
    let mut events = Vec::new();
    for command in seed_commands() {
        world::apply(&mut world, command, &mut events);
    }
    if let Some(Event::LevelStoreRejected { level, .. }) = events
        .iter()
        .find(|event| matches!(event, Event::LevelStoreRejected { .. }))
    {
        bail!("built-in level {level} could not be seeded");
    }
    Ok(world)
}

fn build_level(world: &mut World, config: &CliConfig, request: &BuildRequest) -> Result<LevelId> {
    let builder = LevelBuilder::new(config.rendering());
    let entitlements = Entitlements::new(false, false, true);
    let mut commands = Vec::new();
    let _ = builder
        .handle(
            request,
            entitlements,
            |name, owner| query::level_exists(world, name, owner),
            &mut commands,
        )
        .context("level rejected")?;

    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    match events.as_slice() {
        [Event::LevelStored { id, .. }] => Ok(*id),
        [Event::LevelStoreRejected { level, .. }] => bail!("level {level} already exists"),
        other => bail!("unexpected store outcome: {other:?}"),
    }
}

fn built_in_records(world: &World) -> impl Iterator<Item = &LevelRecord> + '_ {
    query::unlocked_levels(Entitlements::new(true, false, false))
        .into_iter()
        .filter_map(move |name| {
            query::find_level(world, &LevelName::new(name), None).map(|(_, record)| record)
        })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialise output")?;
    println!("{json}");
    Ok(())
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for authoring, inspecting and materializing blockgrid levels.

mod config;
mod edit_op;
mod level_transfer;
mod report;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use blockgrid_core::{Command, Event, LevelId, LevelResource, DEFAULT_GRID_DIMENSIONS};
use blockgrid_grid::GridModel;
use blockgrid_system_builder::mapper;
use blockgrid_system_materializer::{Materializer, Step};
use blockgrid_system_pool::ObjectPool;
use blockgrid_world::{apply, query, Session};
use clap::{Parser, Subcommand};
use glam::Vec2;

use crate::{config::EngineConfig, edit_op::EditOp};

#[derive(Debug, Parser)]
#[command(
    name = "blockgrid",
    version,
    about = "Author, inspect and materialize block grid levels"
)]
struct Cli {
    /// TOML file overriding the engine defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Prints a summary and an ASCII map of a level.
    Inspect {
        /// Level JSON file.
        level: PathBuf,
    },
    /// Applies edit operations to a level and writes the result.
    Edit {
        /// Level JSON file.
        level: PathBuf,
        /// Operations: place:X,Y:KIND:#RRGGBBAA, replace:..., remove:X,Y, undo, redo.
        #[arg(required = true)]
        ops: Vec<EditOp>,
        /// Destination for the edited level; stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Drives an incremental materialization pass and reports pool usage.
    Materialize {
        /// Level JSON file.
        level: PathBuf,
    },
    /// Prints the transfer string of a level.
    Encode {
        /// Level JSON file.
        level: PathBuf,
    },
    /// Converts a transfer string back into level JSON.
    Decode {
        /// Transfer string produced by `encode`.
        value: String,
        /// Destination for the decoded level; stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Maps a pointer position onto a grid cell.
    Locate {
        /// Pointer position as X,Y screen units.
        #[arg(value_parser = parse_point, allow_hyphen_values = true)]
        pointer: Vec2,
        /// Scroll offset of the editing area as X,Y.
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        scroll: Option<Vec2>,
        /// Level whose bounds and blocks are checked.
        #[arg(long)]
        level: Option<PathBuf>,
    },
}

/// Entry point for the blockgrid command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = EngineConfig::load(cli.config.as_deref())?;

    match cli.command {
        CliCommand::Inspect { level } => inspect(&config, &level),
        CliCommand::Edit { level, ops, output } => edit(&config, &level, ops, output.as_deref()),
        CliCommand::Materialize { level } => materialize(&config, &level),
        CliCommand::Encode { level } => encode(&level),
        CliCommand::Decode { value, output } => decode(&value, output.as_deref()),
        CliCommand::Locate {
            pointer,
            scroll,
            level,
        } => locate(
            &config,
            pointer,
            scroll.unwrap_or(Vec2::ZERO),
            level.as_deref(),
        ),
    }
}

fn inspect(config: &EngineConfig, path: &Path) -> Result<()> {
    let (session, level) = open_session(config, path)?;
    let summary = query::level(&session, level).context("imported level is missing")?;
    let grid = query::grid(&session, level).context("imported level is missing")?;

    println!("{}", report::summary(summary.name(), grid));
    print!("{}", report::ascii_map(grid));
    Ok(())
}

fn edit(config: &EngineConfig, path: &Path, ops: Vec<EditOp>, output: Option<&Path>) -> Result<()> {
    let (mut session, level) = open_session(config, path)?;

    let mut events = Vec::new();
    for op in ops {
        apply(&mut session, op.into_command(), &mut events);
    }
    for event in &events {
        eprintln!("{}", report::describe(event));
    }

    let resource = query::export_level(&session, level).context("edited level is missing")?;
    write_level(&resource, output)
}

fn materialize(config: &EngineConfig, path: &Path) -> Result<()> {
    let (session, level) = open_session(config, path)?;
    let grid = query::grid(&session, level).context("imported level is missing")?;

    let mut pool = ObjectPool::new(config.pool());
    let mut materializer = Materializer::new(config.materializer());
    let mut events = Vec::new();
    let mut ticks = 0usize;
    let mut yields = 0usize;

    materializer.begin(level, grid, &mut pool);
    loop {
        ticks += 1;
        let step = materializer
            .advance(
                &mut pool,
                |handle, object| {
                    log::trace!(
                        "slot {} holds {:?} at {}",
                        handle.slot(),
                        object.tag(),
                        object.position()
                    );
                },
                &mut events,
            )
            .with_context(|| format!("failed to materialize {}", path.display()))?;
        match step {
            Step::Yielded { .. } => yields += 1,
            Step::Complete { .. } | Step::Idle => break,
        }
    }

    for event in &events {
        println!("{}", report::describe(event));
    }
    println!("ticks: {ticks}, yields: {yields}");
    println!(
        "pool: {} live, {} available, capacity {}, {} expansions",
        pool.checked_out(),
        pool.available(),
        pool.capacity(),
        pool.expansions()
    );
    let solid = pool.active_objects().filter(|object| object.is_solid()).count();
    println!("solid objects: {solid}");
    Ok(())
}

fn encode(path: &Path) -> Result<()> {
    let resource = read_level(path)?;
    let _ = GridModel::from_resource(&resource)
        .with_context(|| format!("invalid level in {}", path.display()))?;
    let encoded = level_transfer::encode(&resource).context("failed to encode level")?;
    println!("{encoded}");
    Ok(())
}

fn decode(value: &str, output: Option<&Path>) -> Result<()> {
    let resource = level_transfer::decode(value).context("failed to decode transfer string")?;
    write_level(&resource, output)
}

fn locate(config: &EngineConfig, pointer: Vec2, scroll: Vec2, path: Option<&Path>) -> Result<()> {
    let mapper = config.mapper()?;
    let grid = match path {
        Some(path) => {
            let resource = read_level(path)?;
            GridModel::from_resource(&resource)
                .with_context(|| format!("invalid level in {}", path.display()))?
        }
        None => GridModel::new(DEFAULT_GRID_DIMENSIONS),
    };
    let dimensions = grid.dimensions();
    let Some(coord) = mapper.cell_beneath(pointer, scroll) else {
        println!("pointer {pointer} does not map to a cell");
        return Ok(());
    };

    if !mapper::is_valid(coord, dimensions) {
        println!("{coord} lies outside the {dimensions} grid");
        return Ok(());
    }
    match grid.occupant(coord) {
        Some(occupant) => println!(
            "{coord} holds a {} {} block",
            occupant.color, occupant.kind
        ),
        None => println!("{coord} is empty"),
    }
    Ok(())
}

fn open_session(config: &EngineConfig, path: &Path) -> Result<(Session, LevelId)> {
    let resource = read_level(path)?;
    let mut session = Session::new(config.history());
    let mut events = Vec::new();
    apply(&mut session, Command::ImportLevel { resource }, &mut events);

    for event in events {
        match event {
            Event::CommandRejected { reason } => {
                bail!("could not load {}: {reason}", path.display())
            }
            Event::LevelCreated { level, name, .. } => {
                log::info!("loaded '{name}' from {}", path.display());
                return Ok((session, level));
            }
            _ => {}
        }
    }
    bail!("loading {} produced no level", path.display())
}

fn read_level(path: &Path) -> Result<LevelResource> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file at {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse level json in {}", path.display()))
}

fn write_level(resource: &LevelResource, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(resource).context("failed to serialise level")?;
    match output {
        Some(path) => fs::write(path, json + "\n")
            .with_context(|| format!("failed to write level file at {}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn parse_point(value: &str) -> Result<Vec2, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but found '{value}'"))?;
    let parse = |component: &str| {
        component
            .trim()
            .parse::<f32>()
            .map_err(|error| format!("invalid component '{component}': {error}"))
            .and_then(|parsed| {
                if parsed.is_finite() {
                    Ok(parsed)
                } else {
                    Err(format!("component '{component}' must be finite"))
                }
            })
    };
    Ok(Vec2::new(parse(x)?, parse(y)?))
}

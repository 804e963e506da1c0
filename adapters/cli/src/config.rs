//! Engine configuration loaded from an optional TOML file.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use blockgrid_system_builder::mapper::{self, CoordinateMapper};
use blockgrid_system_history as history;
use blockgrid_system_materializer as materializer;
use blockgrid_system_pool as pool;
use glam::{Vec2, Vec3};
use serde::Deserialize;

/// Tunables for every engine system. Missing keys fall back to the defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct EngineConfig {
    history: HistorySection,
    pool: PoolSection,
    materializer: MaterializerSection,
    editor: EditorSection,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct HistorySection {
    capacity: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            capacity: history::DEFAULT_CAPACITY,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PoolSection {
    initial_size: usize,
    expand_by: usize,
    max_size: Option<usize>,
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            initial_size: pool::DEFAULT_INITIAL_SIZE,
            expand_by: pool::DEFAULT_EXPAND_BY,
            max_size: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MaterializerSection {
    blocks_per_step: usize,
    origin: [f32; 3],
}

impl Default for MaterializerSection {
    fn default() -> Self {
        Self {
            blocks_per_step: materializer::DEFAULT_BLOCKS_PER_STEP,
            origin: [0.0; 3],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct EditorSection {
    cell_size: f32,
    grid_offset: [f32; 2],
}

impl Default for EditorSection {
    fn default() -> Self {
        Self {
            cell_size: mapper::DEFAULT_CELL_SIZE,
            grid_offset: mapper::DEFAULT_GRID_OFFSET.to_array(),
        }
    }
}

impl EngineConfig {
    /// Reads the configuration at `path`, or returns the defaults when absent.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("invalid config file at {}", path.display()))?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config toml contents")
    }

    /// History configuration for every level in the session.
    pub(crate) fn history(&self) -> history::Config {
        history::Config::new(self.history.capacity)
    }

    /// Object pool configuration.
    pub(crate) fn pool(&self) -> pool::Config {
        let config = pool::Config::new(self.pool.initial_size, self.pool.expand_by);
        match self.pool.max_size {
            Some(max_size) => config.with_max_size(max_size),
            None => config,
        }
    }

    /// Materializer configuration.
    pub(crate) fn materializer(&self) -> materializer::Config {
        materializer::Config::new(self.materializer.blocks_per_step)
            .with_origin(Vec3::from_array(self.materializer.origin))
    }

    /// Pointer mapper for the editing surface.
    pub(crate) fn mapper(&self) -> Result<CoordinateMapper> {
        CoordinateMapper::new(
            Vec2::from_array(self.editor.grid_offset),
            self.editor.cell_size,
        )
        .context("invalid [editor] settings")
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-budgeted conversion of a finished grid into pooled runtime objects.
//!
//! The host scheduler drives a pass by calling [`Materializer::advance`] once
//! per tick. Every call places at most `blocks_per_step` blocks and then yields;
//! the first call that finds nothing left reports completion and emits
//! [`Event::LevelMaterialized`]. A level with `K` blocks therefore yields
//! exactly `ceil(K / blocks_per_step)` times before completing.

use std::collections::VecDeque;

use blockgrid_core::{CellCoord, Event, LevelId, Occupant};
use blockgrid_grid::GridModel;
use blockgrid_system_pool::{BlockHandle, BlockObject, ObjectPool, PoolError};
use glam::Vec3;
use thiserror::Error;

/// Number of blocks placed per scheduling tick by default.
pub const DEFAULT_BLOCKS_PER_STEP: usize = 10;

/// Configuration parameters required to construct the materializer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    blocks_per_step: usize,
    origin: Vec3,
}

impl Config {
    /// Creates a configuration placing `blocks_per_step` blocks per tick (at least one).
    #[must_use]
    pub const fn new(blocks_per_step: usize) -> Self {
        Self {
            blocks_per_step: if blocks_per_step == 0 {
                1
            } else {
                blocks_per_step
            },
            origin: Vec3::ZERO,
        }
    }

    /// Offsets every placed object by the container's world position.
    #[must_use]
    pub const fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    /// Per-tick placement budget.
    #[must_use]
    pub const fn blocks_per_step(&self) -> usize {
        self.blocks_per_step
    }

    /// World position of cell `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> Vec3 {
        self.origin
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKS_PER_STEP)
    }
}

/// Maps a grid cell onto the ground plane: `origin + (x, 0, y)`.
#[must_use]
pub fn world_position(origin: Vec3, coord: CellCoord) -> Vec3 {
    origin + Vec3::new(coord.x() as f32, 0.0, coord.y() as f32)
}

/// Outcome of a single [`Materializer::advance`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// No pass is running.
    Idle,
    /// Blocks were placed; call again on the next tick.
    Yielded {
        /// Number of blocks placed during this tick.
        placed: usize,
    },
    /// The pass finished during this tick.
    Complete {
        /// Level that finished materializing.
        level: LevelId,
        /// Number of blocks placed over the whole pass.
        total: usize,
    },
}

impl Step {
    /// Reports whether the host can stop driving the materializer.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        !matches!(self, Self::Yielded { .. })
    }
}

/// Fatal failure of a materialization pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MaterializeError {
    /// The pool could not supply an object; the remaining blocks were skipped.
    #[error("materializing {level} aborted after {placed} blocks with {remaining} remaining")]
    Aborted {
        /// Level being materialized.
        level: LevelId,
        /// Blocks placed before the failure. They stay live.
        placed: usize,
        /// Blocks that were not placed.
        remaining: usize,
        /// Pool failure that ended the pass.
        #[source]
        source: PoolError,
    },
}

#[derive(Debug)]
struct Pass {
    level: LevelId,
    pending: VecDeque<(CellCoord, Occupant)>,
    placed: usize,
}

/// Incremental materialization driver.
#[derive(Debug, Default)]
pub struct Materializer {
    config: Config,
    live: Vec<BlockHandle>,
    batch_start: usize,
    pass: Option<Pass>,
}

impl Materializer {
    /// Creates an idle materializer using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            live: Vec::new(),
            batch_start: 0,
            pass: None,
        }
    }

    /// Returns the previous level's objects to the pool and queues `grid`.
    ///
    /// Any pass still running is abandoned.
    pub fn begin(&mut self, level: LevelId, grid: &GridModel, pool: &mut ObjectPool) {
        let returned = self.clear(pool);
        let pending: VecDeque<_> = grid.iter().collect();
        log::info!(
            "materializing {level}: {} blocks queued, {returned} objects returned to the pool",
            pending.len()
        );
        self.pass = Some(Pass {
            level,
            pending,
            placed: 0,
        });
    }

    /// Places up to one budget of blocks, invoking `on_placed` for each.
    ///
    /// Emits [`Event::LevelMaterialized`] exactly once, on the call that
    /// completes the pass. A pool failure aborts the pass and is reported once;
    /// objects placed so far stay live.
    pub fn advance<F>(
        &mut self,
        pool: &mut ObjectPool,
        mut on_placed: F,
        out: &mut Vec<Event>,
    ) -> Result<Step, MaterializeError>
    where
        F: FnMut(&BlockHandle, &BlockObject),
    {
        let Some(pass) = self.pass.as_mut() else {
            return Ok(Step::Idle);
        };

        self.batch_start = self.live.len();
        let mut placed = 0;
        while placed < self.config.blocks_per_step {
            let Some((coord, occupant)) = pass.pending.pop_front() else {
                break;
            };

            let handle = match pool.acquire() {
                Ok(handle) => handle,
                Err(source) => {
                    let error = MaterializeError::Aborted {
                        level: pass.level,
                        placed: pass.placed,
                        remaining: pass.pending.len() + 1,
                        source,
                    };
                    log::error!("{error}");
                    self.pass = None;
                    return Err(error);
                }
            };

            pool.get_mut(&handle)
                .place(world_position(self.config.origin, coord), occupant);
            on_placed(&handle, pool.get(&handle));
            self.live.push(handle);
            pass.placed += 1;
            placed += 1;
        }

        if placed > 0 {
            log::debug!(
                "materialized {placed} blocks of {}; {} pending",
                pass.level,
                pass.pending.len()
            );
            return Ok(Step::Yielded { placed });
        }

        let level = pass.level;
        let total = pass.placed;
        self.pass = None;
        log::info!("materialized {level} with {total} blocks");
        out.push(Event::LevelMaterialized {
            level,
            blocks: total,
        });
        Ok(Step::Complete { level, total })
    }

    /// Stops the running pass and releases the objects placed on its last tick.
    ///
    /// Objects from earlier ticks stay live. Returns the number released.
    pub fn cancel(&mut self, pool: &mut ObjectPool) -> usize {
        let Some(pass) = self.pass.take() else {
            return 0;
        };

        let start = self.batch_start.min(self.live.len());
        let released = self.live.len() - start;
        for handle in self.live.drain(start..) {
            pool.release(handle);
        }
        self.batch_start = self.live.len();
        log::info!(
            "cancelled materializing {}; released {released} objects from the last batch",
            pass.level
        );
        released
    }

    /// Abandons any pass and returns every live object to the pool.
    pub fn clear(&mut self, pool: &mut ObjectPool) -> usize {
        self.pass = None;
        self.batch_start = 0;
        let returned = self.live.len();
        for handle in self.live.drain(..) {
            pool.release(handle);
        }
        returned
    }

    /// Reports whether a pass is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.pass.is_some()
    }

    /// Level of the running pass, if any.
    #[must_use]
    pub fn level(&self) -> Option<LevelId> {
        self.pass.as_ref().map(|pass| pass.level)
    }

    /// Number of blocks still queued in the running pass.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pass.as_ref().map_or(0, |pass| pass.pending.len())
    }

    /// Handles of every object materialized and not yet returned.
    #[must_use]
    pub fn live_handles(&self) -> &[BlockHandle] {
        &self.live
    }

    /// Configuration the materializer was built with.
    #[must_use]
    pub const fn config(&self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_raises_zero_budget() {
        assert_eq!(Config::new(0).blocks_per_step(), 1);
    }

    #[test]
    fn world_position_lies_on_ground_plane() {
        let origin = Vec3::new(10.0, 2.0, -4.0);
        assert_eq!(
            world_position(origin, CellCoord::new(3, 5)),
            Vec3::new(13.0, 2.0, 1.0)
        );
    }

    #[test]
    fn idle_materializer_reports_idle() {
        let mut materializer = Materializer::default();
        let mut pool = ObjectPool::default();
        let mut events = Vec::new();

        let step = materializer
            .advance(&mut pool, |_, _| {}, &mut events)
            .expect("idle advance");

        assert_eq!(step, Step::Idle);
        assert!(step.is_done());
        assert!(events.is_empty());
    }
}

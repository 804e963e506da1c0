#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reusable runtime block objects.
//!
//! The pool owns every [`BlockObject`] in an arena and hands out move-only
//! [`BlockHandle`] tokens. A handle is either queued as available inside the
//! pool or held by exactly one caller; [`ObjectPool::release`] consumes the
//! handle, so releasing it twice does not compile.

use std::collections::VecDeque;

use blockgrid_core::{BlockColor, BlockKind, Occupant};
use glam::Vec3;
use thiserror::Error;

/// Number of inactive objects created when the pool is constructed.
pub const DEFAULT_INITIAL_SIZE: usize = 100;
/// Number of objects synthesized whenever the pool runs dry.
pub const DEFAULT_EXPAND_BY: usize = 10;

/// Configuration parameters required to construct the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    initial_size: usize,
    expand_by: usize,
    max_size: Option<usize>,
}

impl Config {
    /// Creates an unbounded configuration. `expand_by` is raised to at least one.
    #[must_use]
    pub const fn new(initial_size: usize, expand_by: usize) -> Self {
        Self {
            initial_size,
            expand_by: if expand_by == 0 { 1 } else { expand_by },
            max_size: None,
        }
    }

    /// Caps the total number of objects the pool may ever create.
    #[must_use]
    pub const fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Number of objects created up front.
    #[must_use]
    pub const fn initial_size(&self) -> usize {
        self.initial_size
    }

    /// Number of objects created per expansion.
    #[must_use]
    pub const fn expand_by(&self) -> usize {
        self.expand_by
    }

    /// Upper bound on created objects, if any.
    #[must_use]
    pub const fn max_size(&self) -> Option<usize> {
        self.max_size
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_SIZE, DEFAULT_EXPAND_BY)
    }
}

/// Reasons the pool cannot hand out another object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Every object is checked out and the configured maximum has been reached.
    #[error("object pool exhausted at {capacity} objects")]
    Exhausted {
        /// Number of objects the pool owns.
        capacity: usize,
    },
}

/// Runtime representation of a materialized block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockObject {
    active: bool,
    position: Vec3,
    occupant: Option<Occupant>,
}

impl BlockObject {
    /// Reports whether the object is checked out of the pool.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// World-space position of the object.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Block data the object currently represents.
    #[must_use]
    pub const fn occupant(&self) -> Option<Occupant> {
        self.occupant
    }

    /// Behavioural category of the represented block.
    #[must_use]
    pub fn kind(&self) -> Option<BlockKind> {
        self.occupant.map(|occupant| occupant.kind)
    }

    /// Color applied to the object's material.
    #[must_use]
    pub fn color(&self) -> Option<BlockColor> {
        self.occupant.map(|occupant| occupant.color)
    }

    /// Tag derived from the block kind.
    #[must_use]
    pub fn tag(&self) -> Option<&'static str> {
        self.kind().map(BlockKind::tag)
    }

    /// Reports whether the object collides instead of acting as a trigger.
    #[must_use]
    pub fn is_solid(&self) -> bool {
        self.kind().is_some_and(BlockKind::is_solid)
    }

    /// Positions the object and assigns the block it represents.
    pub fn place(&mut self, position: Vec3, occupant: Occupant) {
        self.position = position;
        self.occupant = Some(occupant);
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.position = Vec3::ZERO;
        self.occupant = None;
    }
}

/// Move-only token for an object checked out of an [`ObjectPool`].
#[must_use = "dropping a handle leaks its object until the pool is rebuilt"]
#[derive(Debug, PartialEq, Eq)]
pub struct BlockHandle {
    slot: usize,
}

impl BlockHandle {
    /// Arena slot of the object.
    #[must_use]
    pub const fn slot(&self) -> usize {
        self.slot
    }
}

/// Arena of runtime objects with a FIFO queue of inactive slots.
#[derive(Debug)]
pub struct ObjectPool {
    config: Config,
    objects: Vec<BlockObject>,
    available: VecDeque<usize>,
    checked_out: usize,
    expansions: u64,
}

impl Default for ObjectPool {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl ObjectPool {
    /// Creates a pool warmed up with `initial_size` inactive objects.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let warm_up = config
            .max_size()
            .map_or(config.initial_size(), |max| config.initial_size().min(max));
        let mut pool = Self {
            config,
            objects: Vec::with_capacity(warm_up),
            available: VecDeque::with_capacity(warm_up),
            checked_out: 0,
            expansions: 0,
        };
        pool.grow(warm_up);
        pool
    }

    /// Checks out an inactive object, expanding the pool when none is queued.
    ///
    /// Only fails when a `max_size` was configured and has been reached.
    pub fn acquire(&mut self) -> Result<BlockHandle, PoolError> {
        if self.available.is_empty() {
            self.expand()?;
        }

        let slot = self.available.pop_front().ok_or(PoolError::Exhausted {
            capacity: self.objects.len(),
        })?;
        self.objects[slot].active = true;
        self.checked_out += 1;
        Ok(BlockHandle { slot })
    }

    /// Deactivates the object and queues it for reuse.
    pub fn release(&mut self, handle: BlockHandle) {
        let object = &mut self.objects[handle.slot];
        debug_assert!(
            object.active,
            "released slot {} which is not checked out",
            handle.slot
        );
        object.deactivate();
        self.checked_out = self.checked_out.saturating_sub(1);
        self.available.push_back(handle.slot);
    }

    /// Object behind a checked-out handle.
    #[must_use]
    pub fn get(&self, handle: &BlockHandle) -> &BlockObject {
        &self.objects[handle.slot]
    }

    /// Mutable object behind a checked-out handle.
    pub fn get_mut(&mut self, handle: &BlockHandle) -> &mut BlockObject {
        &mut self.objects[handle.slot]
    }

    /// Iterates every checked-out object.
    pub fn active_objects(&self) -> impl Iterator<Item = &BlockObject> {
        self.objects.iter().filter(|object| object.active)
    }

    /// Number of inactive objects queued for reuse.
    #[must_use]
    pub fn available(&self) -> usize {
        self.available.len()
    }

    /// Number of objects currently held by callers.
    #[must_use]
    pub const fn checked_out(&self) -> usize {
        self.checked_out
    }

    /// Total number of objects the pool owns.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.objects.len()
    }

    /// Number of times the pool synthesized a new batch after warm-up.
    #[must_use]
    pub const fn expansions(&self) -> u64 {
        self.expansions
    }

    /// Configuration the pool was built with.
    #[must_use]
    pub const fn config(&self) -> Config {
        self.config
    }

    fn expand(&mut self) -> Result<(), PoolError> {
        let room = self
            .config
            .max_size()
            .map_or(usize::MAX, |max| max.saturating_sub(self.objects.len()));
        let amount = self.config.expand_by().min(room);
        if amount == 0 {
            return Err(PoolError::Exhausted {
                capacity: self.objects.len(),
            });
        }

        self.grow(amount);
        self.expansions += 1;
        log::debug!(
            "object pool expanded by {amount} to {} objects",
            self.objects.len()
        );
        Ok(())
    }

    fn grow(&mut self, amount: usize) {
        for _ in 0..amount {
            self.available.push_back(self.objects.len());
            self.objects.push(BlockObject::default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_raises_zero_expansion() {
        assert_eq!(Config::new(0, 0).expand_by(), 1);
    }

    #[test]
    fn released_objects_are_reset() {
        let mut pool = ObjectPool::new(Config::new(1, 1));
        let handle = pool.acquire().expect("acquire");
        pool.get_mut(&handle).place(
            Vec3::new(3.0, 0.0, 4.0),
            Occupant::new(BlockColor::RED, BlockKind::Obstacle),
        );
        let slot = handle.slot();

        pool.release(handle);

        assert_eq!(pool.objects[slot], BlockObject::default());
    }

    #[test]
    fn available_queue_is_fifo() {
        let mut pool = ObjectPool::new(Config::new(3, 1));
        let first = pool.acquire().expect("acquire");
        assert_eq!(first.slot(), 0);
        pool.release(first);

        let next = pool.acquire().expect("acquire");
        assert_eq!(next.slot(), 1, "released slot goes to the back of the queue");
        pool.release(next);
    }
}

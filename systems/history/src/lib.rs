#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Linear undo/redo over full grid snapshots.
//!
//! Editors call [`History::record`] before every mutation so the undo stack
//! holds the pre-edit state. Both stacks are bounded; pushing past capacity
//! silently discards the oldest entry, so history older than `capacity` edits
//! is no longer reachable. Recording clears the redo stack.

use std::collections::VecDeque;

use blockgrid_grid::{GridModel, Snapshot};

/// Number of snapshots each stack retains by default.
pub const DEFAULT_CAPACITY: usize = 50;

/// Configuration parameters required to construct the history system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    capacity: usize,
}

impl Config {
    /// Creates a configuration retaining at most `capacity` snapshots per stack.
    ///
    /// A capacity of zero disables history entirely.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Maximum number of snapshots retained per stack.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[derive(Debug)]
struct BoundedStack {
    entries: VecDeque<Snapshot>,
    capacity: usize,
}

impl BoundedStack {
    fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    /// Pushes onto the top, evicting from the bottom once over capacity.
    fn push(&mut self, snapshot: Snapshot) -> usize {
        self.entries.push_back(snapshot);
        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            let _ = self.entries.pop_front();
            evicted += 1;
        }
        evicted
    }

    fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop_back()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bounded undo and redo stacks of grid snapshots.
#[derive(Debug)]
pub struct History {
    undo: BoundedStack,
    redo: BoundedStack,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl History {
    /// Creates an empty history using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            undo: BoundedStack::new(config.capacity()),
            redo: BoundedStack::new(config.capacity()),
        }
    }

    /// Captures the grid's current state as the next undo target.
    ///
    /// Must run before the mutation it guards. Clears the redo stack.
    pub fn record(&mut self, grid: &GridModel) {
        self.redo.clear();
        let evicted = self.undo.push(grid.snapshot());
        if evicted > 0 {
            log::debug!("undo history full; discarded {evicted} oldest snapshot(s)");
        }
    }

    /// Restores the most recent undo snapshot into `grid`.
    ///
    /// Returns `false` without touching the grid when nothing can be undone.
    pub fn undo(&mut self, grid: &mut GridModel) -> bool {
        Self::step(&mut self.undo, &mut self.redo, grid)
    }

    /// Reapplies the most recently undone snapshot into `grid`.
    ///
    /// Returns `false` without touching the grid when nothing can be redone.
    pub fn redo(&mut self, grid: &mut GridModel) -> bool {
        Self::step(&mut self.redo, &mut self.undo, grid)
    }

    fn step(from: &mut BoundedStack, to: &mut BoundedStack, grid: &mut GridModel) -> bool {
        let Some(target) = from.pop() else {
            return false;
        };
        let _ = to.push(grid.snapshot());
        grid.restore(target);
        true
    }

    /// Reports whether [`History::undo`] would change the grid.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Reports whether [`History::redo`] would change the grid.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of snapshots available to undo.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Number of snapshots available to redo.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Discards both stacks.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

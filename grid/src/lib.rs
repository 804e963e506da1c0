#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid storage for blockgrid levels.
//!
//! A [`GridModel`] owns the dimensions of a level and a sparse mapping from
//! cell to [`Occupant`]. Every stored key lies inside the dimensions. A
//! [`Snapshot`] is the one and only way to copy grid state out and back in.

use std::collections::{btree_map::Entry, BTreeMap};

use blockgrid_core::{
    BlockRecord, CellCoord, GridDimensions, LevelResource, LevelResourceError, Occupant,
    Placement, PlacementError, PlacementMode,
};

/// Sparse grid of occupied cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridModel {
    dimensions: GridDimensions,
    occupants: BTreeMap<CellCoord, Occupant>,
}

impl GridModel {
    /// Creates an empty grid with the provided dimensions.
    #[must_use]
    pub fn new(dimensions: GridDimensions) -> Self {
        Self {
            dimensions,
            occupants: BTreeMap::new(),
        }
    }

    /// Builds a grid from a persisted level, validating every block.
    pub fn from_resource(resource: &LevelResource) -> Result<Self, LevelResourceError> {
        let dimensions = resource.dimensions;
        let mut grid = Self::new(dimensions);
        for block in &resource.blocks {
            if !dimensions.contains(block.position) {
                return Err(LevelResourceError::BlockOutOfBounds(block.position));
            }
            match grid.occupants.entry(block.position) {
                Entry::Occupied(_) => {
                    return Err(LevelResourceError::DuplicatePosition(block.position));
                }
                Entry::Vacant(slot) => {
                    let _ = slot.insert(block.occupant());
                }
            }
        }

        log::debug!(
            "loaded level '{}' ({dimensions}) with {} blocks",
            resource.name,
            grid.len()
        );
        Ok(grid)
    }

    /// Writes the grid out as a persisted level with blocks in row-major order.
    #[must_use]
    pub fn to_resource(&self, name: &str) -> LevelResource {
        LevelResource {
            name: name.to_owned(),
            dimensions: self.dimensions,
            blocks: self
                .iter()
                .map(|(position, occupant)| BlockRecord {
                    position,
                    color: occupant.color,
                    kind: occupant.kind,
                })
                .collect(),
        }
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Returns the occupant stored at `coord`, if any.
    #[must_use]
    pub fn occupant(&self, coord: CellCoord) -> Option<Occupant> {
        self.occupants.get(&coord).copied()
    }

    /// Reports whether `coord` holds an occupant.
    #[must_use]
    pub fn is_occupied(&self, coord: CellCoord) -> bool {
        self.occupants.contains_key(&coord)
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    /// Reports whether no cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    /// Iterates occupied cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Occupant)> + '_ {
        self.occupants
            .iter()
            .map(|(coord, occupant)| (*coord, *occupant))
    }

    /// Determines what [`GridModel::try_place`] would do without mutating the grid.
    pub fn check_placement(
        &self,
        coord: CellCoord,
        occupant: Occupant,
        mode: PlacementMode,
    ) -> Result<Placement, PlacementError> {
        if !self.dimensions.contains(coord) {
            return Err(PlacementError::OutOfBounds);
        }

        match self.occupants.get(&coord) {
            None => Ok(Placement::Inserted),
            Some(existing) if *existing == occupant => Ok(Placement::Unchanged),
            Some(existing) => match mode {
                PlacementMode::Insert => Err(PlacementError::CellOccupied),
                PlacementMode::Overwrite => Ok(Placement::Replaced {
                    previous: *existing,
                }),
            },
        }
    }

    /// Stores `occupant` at `coord`, or reports why it cannot.
    ///
    /// A different occupant is only replaced under [`PlacementMode::Overwrite`].
    /// The grid is left untouched on error.
    pub fn try_place(
        &mut self,
        coord: CellCoord,
        occupant: Occupant,
        mode: PlacementMode,
    ) -> Result<Placement, PlacementError> {
        let placement = self.check_placement(coord, occupant, mode)?;
        if placement.is_change() {
            let _ = self.occupants.insert(coord, occupant);
        }
        Ok(placement)
    }

    /// Clears `coord`, returning the removed occupant. Empty cells are a no-op.
    pub fn remove(&mut self, coord: CellCoord) -> Option<Occupant> {
        self.occupants.remove(&coord)
    }

    /// Captures a deep copy of the grid.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            dimensions: self.dimensions,
            occupants: self.iter().collect(),
        }
    }

    /// Replaces dimensions and occupants wholesale with the snapshot's contents.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.dimensions = snapshot.dimensions;
        self.occupants = snapshot.occupants.into_iter().collect();
    }
}

/// Immutable copy of grid state captured at a point in time.
///
/// Snapshots are only produced by [`GridModel::snapshot`], so their contents
/// always satisfy the grid bounds invariant.
#[derive(Debug, PartialEq, Eq)]
pub struct Snapshot {
    dimensions: GridDimensions,
    occupants: Vec<(CellCoord, Occupant)>,
}

impl Snapshot {
    /// Dimensions captured by the snapshot.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Occupied cells in row-major order.
    #[must_use]
    pub fn occupants(&self) -> &[(CellCoord, Occupant)] {
        &self.occupants
    }

    /// Number of occupied cells captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    /// Reports whether the snapshot captured an empty grid.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockgrid_core::{BlockColor, BlockKind};

    fn grid(width: u32, height: u32) -> GridModel {
        GridModel::new(GridDimensions::new(width, height).expect("dimensions"))
    }

    const RED_NORMAL: Occupant = Occupant::new(BlockColor::RED, BlockKind::Normal);
    const BLUE_OBSTACLE: Occupant = Occupant::new(BlockColor::BLUE, BlockKind::Obstacle);

    #[test]
    fn place_into_empty_cell_inserts() {
        let mut grid = grid(20, 20);
        let coord = CellCoord::new(5, 5);

        assert_eq!(
            grid.try_place(coord, RED_NORMAL, PlacementMode::Insert),
            Ok(Placement::Inserted)
        );
        assert_eq!(grid.occupant(coord), Some(RED_NORMAL));
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn place_over_different_occupant_requires_overwrite() {
        let mut grid = grid(20, 20);
        let coord = CellCoord::new(5, 5);
        let _ = grid
            .try_place(coord, RED_NORMAL, PlacementMode::Insert)
            .expect("first placement");

        assert_eq!(
            grid.try_place(coord, BLUE_OBSTACLE, PlacementMode::Insert),
            Err(PlacementError::CellOccupied)
        );
        assert_eq!(grid.occupant(coord), Some(RED_NORMAL));

        assert_eq!(
            grid.try_place(coord, BLUE_OBSTACLE, PlacementMode::Overwrite),
            Ok(Placement::Replaced {
                previous: RED_NORMAL
            })
        );
        assert_eq!(grid.occupant(coord), Some(BLUE_OBSTACLE));
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn placing_identical_occupant_is_unchanged() {
        let mut grid = grid(4, 4);
        let coord = CellCoord::new(1, 2);
        let _ = grid
            .try_place(coord, RED_NORMAL, PlacementMode::Insert)
            .expect("first placement");

        assert_eq!(
            grid.try_place(coord, RED_NORMAL, PlacementMode::Insert),
            Ok(Placement::Unchanged)
        );
    }

    #[test]
    fn out_of_bounds_wins_over_occupancy() {
        let grid = grid(3, 3);
        assert_eq!(
            grid.check_placement(CellCoord::new(3, 0), RED_NORMAL, PlacementMode::Overwrite),
            Err(PlacementError::OutOfBounds)
        );
        assert_eq!(
            grid.check_placement(CellCoord::new(0, -1), RED_NORMAL, PlacementMode::Insert),
            Err(PlacementError::OutOfBounds)
        );
    }

    #[test]
    fn remove_clears_and_ignores_empty_cells() {
        let mut grid = grid(4, 4);
        let coord = CellCoord::new(0, 3);
        let _ = grid
            .try_place(coord, BLUE_OBSTACLE, PlacementMode::Insert)
            .expect("placement");

        assert_eq!(grid.remove(coord), Some(BLUE_OBSTACLE));
        assert_eq!(grid.remove(coord), None);
        assert!(grid.is_empty());
    }

    #[test]
    fn restore_replaces_rather_than_merges() {
        let mut grid = grid(4, 4);
        let _ = grid
            .try_place(CellCoord::new(0, 0), RED_NORMAL, PlacementMode::Insert)
            .expect("placement");
        let snapshot = grid.snapshot();

        let _ = grid
            .try_place(CellCoord::new(3, 3), BLUE_OBSTACLE, PlacementMode::Insert)
            .expect("placement");
        grid.restore(snapshot);

        assert_eq!(grid.len(), 1);
        assert_eq!(grid.occupant(CellCoord::new(0, 0)), Some(RED_NORMAL));
        assert!(!grid.is_occupied(CellCoord::new(3, 3)));
    }

    #[test]
    fn restore_replaces_dimensions() {
        let small = grid(2, 2);
        let snapshot = small.snapshot();
        let mut large = grid(30, 30);

        large.restore(snapshot);

        assert_eq!(large.dimensions(), small.dimensions());
    }

    #[test]
    fn snapshot_is_independent_of_later_edits() {
        let mut grid = grid(4, 4);
        let snapshot = grid.snapshot();
        let _ = grid
            .try_place(CellCoord::new(1, 1), RED_NORMAL, PlacementMode::Insert)
            .expect("placement");

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.dimensions(), grid.dimensions());
    }
}

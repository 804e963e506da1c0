//! Pointer-to-cell mapping for the authoring grid.
//!
//! Everything here is pure: callers supply the viewport geometry and receive
//! grid coordinates, without any windowing context.

use blockgrid_core::{CellCoord, GridDimensions};
use glam::Vec2;
use thiserror::Error;

/// Side length of a drawn cell in screen units.
pub const DEFAULT_CELL_SIZE: f32 = 25.0;
/// Screen position of the grid's top-left corner inside the editing area.
pub const DEFAULT_GRID_OFFSET: Vec2 = Vec2::new(50.0, 80.0);

/// Maps a pointer position to the cell beneath it.
///
/// Computes `floor((pointer - viewport_origin + scroll_offset) / cell_size)`
/// per axis. Flooring keeps positions left of or above the origin on negative
/// cells instead of collapsing them onto row or column zero. Results beyond
/// the `i32` range saturate and a NaN axis maps to zero; use [`cell_beneath`]
/// when the pointer is not known to be finite.
#[must_use]
pub fn screen_to_grid(
    pointer: Vec2,
    viewport_origin: Vec2,
    scroll_offset: Vec2,
    cell_size: f32,
) -> CellCoord {
    let cells = ((pointer - viewport_origin + scroll_offset) / cell_size).floor();
    CellCoord::new(cells.x as i32, cells.y as i32)
}

/// Like [`screen_to_grid`], but returns `None` when the pointer does not land
/// on a representable cell (a NaN or infinite axis, or one beyond `i32`).
#[must_use]
pub fn cell_beneath(
    pointer: Vec2,
    viewport_origin: Vec2,
    scroll_offset: Vec2,
    cell_size: f32,
) -> Option<CellCoord> {
    let cells = ((pointer - viewport_origin + scroll_offset) / cell_size).floor();
    let fits =
        |value: f32| value.is_finite() && value >= i32::MIN as f32 && value < i32::MAX as f32;
    (fits(cells.x) && fits(cells.y)).then(|| CellCoord::new(cells.x as i32, cells.y as i32))
}

/// Reports whether `coord` addresses a cell inside `dimensions`.
#[must_use]
pub const fn is_valid(coord: CellCoord, dimensions: GridDimensions) -> bool {
    dimensions.contains(coord)
}

/// Reasons a mapper cannot be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum MapperError {
    /// The cell size was zero, negative, or not finite.
    #[error("cell size {0} must be positive and finite")]
    InvalidCellSize(f32),
}

/// Viewport geometry shared by every mapping on one editing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapper {
    viewport_origin: Vec2,
    cell_size: f32,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self {
            viewport_origin: DEFAULT_GRID_OFFSET,
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

impl CoordinateMapper {
    /// Creates a mapper for a grid drawn at `viewport_origin` with square cells.
    pub fn new(viewport_origin: Vec2, cell_size: f32) -> Result<Self, MapperError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(MapperError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            viewport_origin,
            cell_size,
        })
    }

    /// Screen position of the grid's top-left corner before scrolling.
    #[must_use]
    pub const fn viewport_origin(&self) -> Vec2 {
        self.viewport_origin
    }

    /// Side length of a drawn cell.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Candidate cell beneath `pointer`; may lie outside the grid.
    #[must_use]
    pub fn screen_to_grid(&self, pointer: Vec2, scroll_offset: Vec2) -> CellCoord {
        screen_to_grid(pointer, self.viewport_origin, scroll_offset, self.cell_size)
    }

    /// Representable cell beneath `pointer`; `None` for non-finite pointers.
    #[must_use]
    pub fn cell_beneath(&self, pointer: Vec2, scroll_offset: Vec2) -> Option<CellCoord> {
        cell_beneath(pointer, self.viewport_origin, scroll_offset, self.cell_size)
    }

    /// Cell beneath `pointer` when it lies inside `dimensions`.
    #[must_use]
    pub fn locate(
        &self,
        pointer: Vec2,
        scroll_offset: Vec2,
        dimensions: GridDimensions,
    ) -> Option<CellCoord> {
        self.cell_beneath(pointer, scroll_offset)
            .filter(|coord| is_valid(*coord, dimensions))
    }

    /// Screen position of the top-left corner of `coord`.
    #[must_use]
    pub fn cell_origin(&self, coord: CellCoord, scroll_offset: Vec2) -> Vec2 {
        self.viewport_origin - scroll_offset
            + Vec2::new(coord.x() as f32, coord.y() as f32) * self.cell_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_pointer_inside_first_cells() {
        let coord = screen_to_grid(
            Vec2::new(120.0, 130.0),
            Vec2::new(50.0, 80.0),
            Vec2::ZERO,
            25.0,
        );
        assert_eq!(coord, CellCoord::new(2, 2));
    }

    #[test]
    fn floors_positions_before_origin() {
        let coord = screen_to_grid(
            Vec2::new(40.0, 79.0),
            Vec2::new(50.0, 80.0),
            Vec2::ZERO,
            25.0,
        );
        assert_eq!(coord, CellCoord::new(-1, -1));
    }

    #[test]
    fn scroll_offset_shifts_mapping() {
        let coord = screen_to_grid(
            Vec2::new(60.0, 90.0),
            Vec2::new(50.0, 80.0),
            Vec2::new(50.0, 100.0),
            25.0,
        );
        assert_eq!(coord, CellCoord::new(2, 4));
    }

    #[test]
    fn rejects_degenerate_cell_sizes() {
        assert_eq!(
            CoordinateMapper::new(Vec2::ZERO, 0.0),
            Err(MapperError::InvalidCellSize(0.0))
        );
        assert!(CoordinateMapper::new(Vec2::ZERO, -3.0).is_err());
        assert!(CoordinateMapper::new(Vec2::ZERO, f32::NAN).is_err());
    }

    #[test]
    fn locate_filters_out_of_bounds_cells() {
        let mapper = CoordinateMapper::default();
        let dimensions = GridDimensions::new(4, 4).expect("dimensions");

        assert_eq!(
            mapper.locate(Vec2::new(51.0, 81.0), Vec2::ZERO, dimensions),
            Some(CellCoord::new(0, 0))
        );
        assert_eq!(
            mapper.locate(Vec2::new(150.0, 81.0), Vec2::ZERO, dimensions),
            None
        );
    }

    #[test]
    fn non_finite_pointers_map_to_no_cell() {
        let mapper = CoordinateMapper::default();
        let dimensions = GridDimensions::new(4, 4).expect("dimensions");

        for pointer in [
            Vec2::new(f32::NAN, f32::NAN),
            Vec2::new(f32::NAN, 81.0),
            Vec2::new(51.0, f32::INFINITY),
            Vec2::new(f32::NEG_INFINITY, 81.0),
        ] {
            assert_eq!(mapper.cell_beneath(pointer, Vec2::ZERO), None);
            assert_eq!(mapper.locate(pointer, Vec2::ZERO, dimensions), None);
        }
        assert_eq!(
            mapper.locate(Vec2::new(51.0, 81.0), Vec2::splat(f32::NAN), dimensions),
            None,
            "a NaN scroll offset poisons the mapping too"
        );
    }

    #[test]
    fn pointers_beyond_i32_cells_are_not_saturated() {
        let mapper = CoordinateMapper::default();
        let huge = GridDimensions::new(u32::MAX, u32::MAX).expect("dimensions");

        assert_eq!(
            mapper.locate(Vec2::new(1.0e12, 81.0), Vec2::ZERO, huge),
            None
        );
        assert_eq!(
            mapper.locate(Vec2::new(51.0, 81.0), Vec2::ZERO, huge),
            Some(CellCoord::new(0, 0))
        );
    }

    #[test]
    fn cell_origin_inverts_mapping() {
        let mapper = CoordinateMapper::default();
        let scroll = Vec2::new(10.0, 35.0);
        let coord = CellCoord::new(3, 7);

        let corner = mapper.cell_origin(coord, scroll);

        assert_eq!(mapper.screen_to_grid(corner, scroll), coord);
        assert_eq!(
            mapper.screen_to_grid(corner + Vec2::splat(24.0), scroll),
            coord
        );
    }
}

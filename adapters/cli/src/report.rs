//! Plain-text rendering of levels and session events.

use std::fmt::Write as _;

use blockgrid_core::{BlockKind, CellCoord, Event};
use blockgrid_grid::GridModel;

const EMPTY_GLYPH: char = '.';
const NORMAL_GLYPH: char = 'o';
const OBSTACLE_GLYPH: char = '#';

/// Largest number of columns or rows drawn by [`ascii_map`].
pub(crate) const MAX_MAP_SIDE: u16 = 256;

/// Draws the grid row by row: `.` empty, `o` collectible, `#` obstacle.
///
/// Grids wider or taller than [`MAX_MAP_SIDE`] are cropped to their top-left
/// corner and followed by a note naming the drawn area.
pub(crate) fn ascii_map(grid: &GridModel) -> String {
    let dimensions = grid.dimensions();
    let columns = dimensions.width().min(u32::from(MAX_MAP_SIDE));
    let rows = dimensions.height().min(u32::from(MAX_MAP_SIDE));
    let mut map = String::with_capacity((columns as usize + 1) * rows as usize);

    // Both sides are capped at MAX_MAP_SIDE, so they fit in i32.
    for y in 0..rows as i32 {
        for x in 0..columns as i32 {
            let coord = CellCoord::new(x, y);
            let glyph = match grid.occupant(coord).map(|occupant| occupant.kind) {
                None => EMPTY_GLYPH,
                Some(BlockKind::Normal) => NORMAL_GLYPH,
                Some(BlockKind::Obstacle) => OBSTACLE_GLYPH,
            };
            map.push(glyph);
        }
        map.push('\n');
    }
    if columns < dimensions.width() || rows < dimensions.height() {
        let _ = writeln!(map, "(map cropped to {columns}x{rows} of {dimensions})");
    }
    map
}

/// One-line summary of a level's contents.
pub(crate) fn summary(name: &str, grid: &GridModel) -> String {
    let obstacles = grid
        .iter()
        .filter(|(_, occupant)| occupant.kind.is_solid())
        .count();
    let mut line = format!("{name}: {} grid", grid.dimensions());
    let _ = write!(
        line,
        ", {} blocks ({obstacles} obstacles, {} collectibles)",
        grid.len(),
        grid.len() - obstacles
    );
    line
}

/// Human-readable description of a session event.
pub(crate) fn describe(event: &Event) -> String {
    match event {
        Event::LevelCreated {
            level,
            name,
            dimensions,
        } => format!("created {level} '{name}' ({dimensions})"),
        Event::LevelSelected { level, dimensions } => {
            format!("selected {level} ({dimensions})")
        }
        Event::LevelRenamed { level, name } => format!("renamed {level} to '{name}'"),
        Event::LevelDeleted { level } => format!("deleted {level}"),
        Event::BlockPlaced {
            coord,
            occupant,
            replaced,
            ..
        } => match replaced {
            Some(previous) => format!(
                "replaced {} {} with {} {} at {coord}",
                previous.kind, previous.color, occupant.kind, occupant.color
            ),
            None => format!("placed {} {} at {coord}", occupant.kind, occupant.color),
        },
        Event::PlacementRejected { coord, reason } => {
            format!("rejected placement at {coord}: {reason}")
        }
        Event::BlockRemoved {
            coord, occupant, ..
        } => format!("removed {} {} at {coord}", occupant.kind, occupant.color),
        Event::HistoryRestored {
            direction,
            dimensions,
            ..
        } => format!("{direction:?} restored a {dimensions} grid").to_lowercase(),
        Event::CommandRejected { reason } => format!("rejected: {reason}"),
        Event::LevelMaterialized { level, blocks } => {
            format!("materialized {level} with {blocks} blocks")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockgrid_core::{BlockColor, GridDimensions, Occupant, PlacementMode};

    fn grid() -> GridModel {
        let mut grid = GridModel::new(GridDimensions::new(3, 2).expect("dimensions"));
        let _ = grid
            .try_place(
                CellCoord::new(0, 0),
                Occupant::new(BlockColor::RED, BlockKind::Obstacle),
                PlacementMode::Insert,
            )
            .expect("placement");
        let _ = grid
            .try_place(
                CellCoord::new(2, 1),
                Occupant::new(BlockColor::GREEN, BlockKind::Normal),
                PlacementMode::Insert,
            )
            .expect("placement");
        grid
    }

    #[test]
    fn ascii_map_draws_rows_top_down() {
        assert_eq!(ascii_map(&grid()), "#..\n..o\n");
    }

    #[test]
    fn ascii_map_crops_oversized_grids() {
        let dimensions = GridDimensions::new(4_000_000_000, 4_000_000_000).expect("dimensions");
        let mut grid = GridModel::new(dimensions);
        let _ = grid
            .try_place(
                CellCoord::new(1, 0),
                Occupant::new(BlockColor::RED, BlockKind::Obstacle),
                PlacementMode::Insert,
            )
            .expect("placement");

        let map = ascii_map(&grid);
        let lines: Vec<&str> = map.lines().collect();

        assert_eq!(lines.len(), usize::from(MAX_MAP_SIDE) + 1);
        assert!(lines[0].starts_with(".#."));
        assert!(lines[..usize::from(MAX_MAP_SIDE)]
            .iter()
            .all(|line| line.len() == usize::from(MAX_MAP_SIDE)));
        assert_eq!(
            lines[usize::from(MAX_MAP_SIDE)],
            "(map cropped to 256x256 of 4000000000x4000000000)"
        );
    }

    #[test]
    fn ascii_map_crops_only_the_long_side() {
        let grid = GridModel::new(GridDimensions::new(2, 1000).expect("dimensions"));
        let map = ascii_map(&grid);

        assert_eq!(map.lines().filter(|line| *line == "..").count(), 256);
        assert!(map.ends_with("(map cropped to 2x256 of 2x1000)\n"));
    }

    #[test]
    fn summary_counts_kinds() {
        assert_eq!(
            summary("Demo", &grid()),
            "Demo: 3x2 grid, 2 blocks (1 obstacles, 1 collectibles)"
        );
    }

    #[test]
    fn describes_placements() {
        let event = Event::BlockPlaced {
            level: blockgrid_core::LevelId::new(1),
            coord: CellCoord::new(4, 2),
            occupant: Occupant::new(BlockColor::BLUE, BlockKind::Normal),
            replaced: None,
        };
        assert_eq!(describe(&event), "placed normal #0000FFFF at (4, 2)");
    }
}

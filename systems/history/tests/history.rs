use blockgrid_core::{
    BlockColor, BlockKind, CellCoord, GridDimensions, Occupant, Placement, PlacementMode,
};
use blockgrid_grid::GridModel;
use blockgrid_system_history::{Config, History, DEFAULT_CAPACITY};

const RED_NORMAL: Occupant = Occupant::new(BlockColor::RED, BlockKind::Normal);
const BLUE_OBSTACLE: Occupant = Occupant::new(BlockColor::BLUE, BlockKind::Obstacle);

fn grid_20x20() -> GridModel {
    GridModel::new(GridDimensions::new(20, 20).expect("dimensions"))
}

fn recorded_place(
    history: &mut History,
    grid: &mut GridModel,
    coord: CellCoord,
    occupant: Occupant,
    mode: PlacementMode,
) -> Placement {
    history.record(grid);
    grid.try_place(coord, occupant, mode)
        .expect("placement succeeds")
}

#[test]
fn undo_on_empty_history_is_noop() {
    let mut history = History::default();
    let mut grid = grid_20x20();

    assert!(!history.undo(&mut grid), "nothing recorded, nothing to undo");
    assert!(!history.redo(&mut grid), "nothing undone, nothing to redo");
    assert!(grid.is_empty());
}

#[test]
fn undo_restores_pre_place_state_and_redo_reinstates_it() {
    let mut history = History::default();
    let mut grid = grid_20x20();
    let before = grid.clone();
    let coord = CellCoord::new(7, 3);

    let _ = recorded_place(&mut history, &mut grid, coord, RED_NORMAL, PlacementMode::Insert);
    let after = grid.clone();

    assert!(history.undo(&mut grid));
    assert_eq!(grid, before, "undo must restore the exact pre-place grid");
    assert!(history.can_redo());

    assert!(history.redo(&mut grid));
    assert_eq!(grid, after, "redo must reinstate the placement");
    assert!(!history.can_redo());
}

#[test]
fn overwrite_then_double_undo_walks_back_to_empty() {
    let mut history = History::default();
    let mut grid = grid_20x20();
    let coord = CellCoord::new(5, 5);

    let _ = recorded_place(&mut history, &mut grid, coord, RED_NORMAL, PlacementMode::Insert);
    let replaced = recorded_place(
        &mut history,
        &mut grid,
        coord,
        BLUE_OBSTACLE,
        PlacementMode::Overwrite,
    );
    assert_eq!(
        replaced,
        Placement::Replaced {
            previous: RED_NORMAL
        }
    );

    assert!(history.undo(&mut grid));
    assert_eq!(grid.occupant(coord), Some(RED_NORMAL));

    assert!(history.undo(&mut grid));
    assert_eq!(grid.occupant(coord), None);
    assert!(!history.can_undo());
}

#[test]
fn recording_clears_redo() {
    let mut history = History::default();
    let mut grid = grid_20x20();

    let _ = recorded_place(
        &mut history,
        &mut grid,
        CellCoord::new(1, 1),
        RED_NORMAL,
        PlacementMode::Insert,
    );
    assert!(history.undo(&mut grid));
    assert_eq!(history.redo_depth(), 1);

    let _ = recorded_place(
        &mut history,
        &mut grid,
        CellCoord::new(2, 2),
        RED_NORMAL,
        PlacementMode::Insert,
    );

    assert_eq!(history.redo_depth(), 0, "linear history discards the redo branch");
    assert!(!history.redo(&mut grid));
}

#[test]
fn capacity_overflow_discards_oldest_snapshot() {
    let capacity = 5;
    let mut history = History::new(Config::new(capacity));
    let mut grid = grid_20x20();

    for x in 0..=capacity as i32 {
        let _ = recorded_place(
            &mut history,
            &mut grid,
            CellCoord::new(x, 0),
            RED_NORMAL,
            PlacementMode::Insert,
        );
    }
    assert_eq!(history.undo_depth(), capacity);

    let mut undone = 0;
    while history.undo(&mut grid) {
        undone += 1;
    }
    assert_eq!(undone, capacity);
    assert_eq!(
        grid.len(),
        1,
        "the first placement can no longer be undone once its snapshot was evicted"
    );
    assert_eq!(grid.occupant(CellCoord::new(0, 0)), Some(RED_NORMAL));
}

#[test]
fn default_capacity_is_fifty() {
    let mut history = History::default();
    let mut grid = grid_20x20();

    for index in 0..(DEFAULT_CAPACITY as i32 + 10) {
        let _ = recorded_place(
            &mut history,
            &mut grid,
            CellCoord::new(index % 20, index / 20),
            RED_NORMAL,
            PlacementMode::Insert,
        );
    }

    assert_eq!(history.undo_depth(), DEFAULT_CAPACITY);
}

#[test]
fn redo_stack_is_bounded_too() {
    let capacity = 3;
    let mut history = History::new(Config::new(capacity));
    let mut grid = grid_20x20();

    for x in 0..capacity as i32 {
        let _ = recorded_place(
            &mut history,
            &mut grid,
            CellCoord::new(x, 0),
            RED_NORMAL,
            PlacementMode::Insert,
        );
    }
    while history.undo(&mut grid) {}

    assert_eq!(history.redo_depth(), capacity);
    let mut redone = 0;
    while history.redo(&mut grid) {
        redone += 1;
    }
    assert_eq!(redone, capacity);
    assert_eq!(grid.len(), capacity);
}

#[test]
fn undo_restores_dimensions_with_occupants() {
    let mut history = History::default();
    let mut grid = grid_20x20();
    history.record(&grid);

    grid.restore(
        GridModel::new(GridDimensions::new(8, 6).expect("dimensions")).snapshot(),
    );
    assert!(history.undo(&mut grid));

    assert_eq!(grid.dimensions(), GridDimensions::new(20, 20).expect("dimensions"));
}

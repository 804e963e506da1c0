#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure authoring system that turns pointer input into block edit commands.

pub mod mapper;

use blockgrid_core::{
    BlockColor, BlockKind, CellCoord, Command, Event, GridDimensions, LevelId, Occupant,
    PlacementMode,
};
use glam::Vec2;

use crate::mapper::CoordinateMapper;

/// Block template offered in the preset palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preset {
    /// Color applied to placed blocks.
    pub color: BlockColor,
    /// Kind applied to placed blocks.
    pub kind: BlockKind,
}

impl Preset {
    /// Creates a new preset.
    #[must_use]
    pub const fn new(color: BlockColor, kind: BlockKind) -> Self {
        Self { color, kind }
    }

    /// Occupant written when the preset is dropped.
    #[must_use]
    pub const fn occupant(&self) -> Occupant {
        Occupant::new(self.color, self.kind)
    }
}

/// Palette shown by default: one red obstacle and three collectibles.
pub const DEFAULT_PRESETS: [Preset; 4] = [
    Preset::new(BlockColor::RED, BlockKind::Obstacle),
    Preset::new(BlockColor::GREEN, BlockKind::Normal),
    Preset::new(BlockColor::BLUE, BlockKind::Normal),
    Preset::new(BlockColor::YELLOW, BlockKind::Normal),
];

/// Input gathered by the adapter for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BuilderInput {
    /// The pointer pressed on a palette entry.
    BeginDrag {
        /// Index into the palette.
        preset: usize,
    },
    /// The pointer was released while dragging.
    Drop {
        /// Pointer position in screen units.
        pointer: Vec2,
    },
    /// The drag ended without a drop.
    CancelDrag,
    /// Secondary click requesting removal of the block beneath the pointer.
    RemoveAt {
        /// Pointer position in screen units.
        pointer: Vec2,
    },
    /// The editing area scrolled.
    Scroll {
        /// Scroll offset of the editing area.
        offset: Vec2,
    },
    /// Undo was requested.
    Undo,
    /// Redo was requested.
    Redo,
}

/// Authoring system that translates palette drags and clicks into commands.
#[derive(Clone, Debug)]
pub struct Builder {
    mapper: CoordinateMapper,
    presets: Vec<Preset>,
    dragging: Option<Preset>,
    scroll: Vec2,
    active: Option<(LevelId, GridDimensions)>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new(CoordinateMapper::default())
    }
}

impl Builder {
    /// Creates a builder with the default palette.
    #[must_use]
    pub fn new(mapper: CoordinateMapper) -> Self {
        Self::with_presets(mapper, DEFAULT_PRESETS.to_vec())
    }

    /// Creates a builder with a custom palette.
    #[must_use]
    pub fn with_presets(mapper: CoordinateMapper, presets: Vec<Preset>) -> Self {
        Self {
            mapper,
            presets,
            dragging: None,
            scroll: Vec2::ZERO,
            active: None,
        }
    }

    /// Consumes session events and frame input to emit edit commands.
    ///
    /// Edits are only emitted while a level is active. Drops and removals
    /// outside the grid are ignored without emitting anything.
    pub fn handle(&mut self, events: &[Event], inputs: &[BuilderInput], out: &mut Vec<Command>) {
        for event in events {
            self.observe(event);
        }

        for input in inputs {
            match *input {
                BuilderInput::BeginDrag { preset } => {
                    self.dragging = self.presets.get(preset).copied();
                }
                BuilderInput::CancelDrag => self.dragging = None,
                BuilderInput::Scroll { offset } => self.scroll = offset,
                BuilderInput::Drop { pointer } => {
                    let Some(preset) = self.dragging.take() else {
                        continue;
                    };
                    match self.locate(pointer) {
                        Some(coord) => out.push(Command::PlaceBlock {
                            coord,
                            occupant: preset.occupant(),
                            mode: PlacementMode::Insert,
                        }),
                        None => log::debug!("ignored drop at {pointer} outside the grid"),
                    }
                }
                BuilderInput::RemoveAt { pointer } => {
                    if let Some(coord) = self.locate(pointer) {
                        out.push(Command::RemoveBlock { coord });
                    }
                }
                BuilderInput::Undo if self.active.is_some() => out.push(Command::Undo),
                BuilderInput::Redo if self.active.is_some() => out.push(Command::Redo),
                BuilderInput::Undo | BuilderInput::Redo => {}
            }
        }
    }

    fn observe(&mut self, event: &Event) {
        match *event {
            Event::LevelSelected { level, dimensions } => {
                self.active = Some((level, dimensions));
            }
            Event::HistoryRestored {
                level, dimensions, ..
            } => {
                if let Some((active, active_dimensions)) = self.active.as_mut() {
                    if *active == level {
                        *active_dimensions = dimensions;
                    }
                }
            }
            Event::LevelDeleted { level } => {
                if self.active.is_some_and(|(active, _)| active == level) {
                    self.active = None;
                }
            }
            _ => {}
        }
    }

    fn locate(&self, pointer: Vec2) -> Option<CellCoord> {
        let (_, dimensions) = self.active?;
        self.mapper.locate(pointer, self.scroll, dimensions)
    }

    /// Preset currently being dragged, if any.
    #[must_use]
    pub const fn dragging(&self) -> Option<Preset> {
        self.dragging
    }

    /// Palette offered to the user.
    #[must_use]
    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    /// Scroll offset of the editing area.
    #[must_use]
    pub const fn scroll(&self) -> Vec2 {
        self.scroll
    }

    /// Dimensions of the active level's grid, if a level is active.
    #[must_use]
    pub fn active_dimensions(&self) -> Option<GridDimensions> {
        self.active.map(|(_, dimensions)| dimensions)
    }

    /// Mapper used to convert pointer positions.
    #[must_use]
    pub const fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }
}

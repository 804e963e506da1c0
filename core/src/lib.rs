#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the blockgrid engine.
//!
//! This crate defines the value types and message surface that connect the
//! authoring session, the runtime systems, and adapters. Adapters submit
//! [`Command`] values describing desired edits, the authoring session executes
//! them via its `apply` entry point, and then reports [`Event`] values that
//! adapters and systems react to. Level data crosses the storage boundary as a
//! [`LevelResource`].

use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name assigned to freshly created levels when the caller does not supply one.
pub const DEFAULT_LEVEL_NAME: &str = "New Level";

/// Dimensions assigned to freshly created levels.
pub const DEFAULT_GRID_DIMENSIONS: GridDimensions = GridDimensions {
    width: 20,
    height: 20,
};

/// Integer address of a single grid cell.
///
/// Coordinates are signed so that pointer positions left of or above the grid
/// origin map to representable (but invalid) cells. Cells order row-major:
/// first by `y`, then by `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    x: i32,
    y: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }
}

impl Ord for CellCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for CellCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height of a level grid measured in cells. Both are positive.
///
/// Deserialization enforces the same rule as [`GridDimensions::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGridDimensions")]
pub struct GridDimensions {
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
struct RawGridDimensions {
    width: u32,
    height: u32,
}

impl TryFrom<RawGridDimensions> for GridDimensions {
    type Error = LevelResourceError;

    fn try_from(raw: RawGridDimensions) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.height).ok_or(LevelResourceError::InvalidDimensions {
            width: raw.width,
            height: raw.height,
        })
    }
}

impl GridDimensions {
    /// Creates a dimension pair, returning `None` when either side is zero.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            None
        } else {
            Some(Self { width, height })
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether `coord` satisfies `0 <= x < width` and `0 <= y < height`.
    #[must_use]
    pub const fn contains(&self, coord: CellCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
    }

    /// Total number of addressable cells.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for GridDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Four-channel color applied to a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockColor {
    red: u8,
    green: u8,
    blue: u8,
    alpha: u8,
}

impl BlockColor {
    /// Opaque white.
    pub const WHITE: Self = Self::from_rgb(0xff, 0xff, 0xff);
    /// Opaque red.
    pub const RED: Self = Self::from_rgb(0xff, 0x00, 0x00);
    /// Opaque green.
    pub const GREEN: Self = Self::from_rgb(0x00, 0xff, 0x00);
    /// Opaque blue.
    pub const BLUE: Self = Self::from_rgb(0x00, 0x00, 0xff);
    /// Opaque yellow.
    pub const YELLOW: Self = Self::from_rgb(0xff, 0xeb, 0x04);

    /// Creates a color from byte RGBA components.
    #[must_use]
    pub const fn from_rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba(red, green, blue, 0xff)
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Alpha component of the color.
    #[must_use]
    pub const fn alpha(&self) -> u8 {
        self.alpha
    }
}

impl fmt::Display for BlockColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02X}{:02X}{:02X}{:02X}",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

/// Reasons a color string could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseColorError {
    /// The string did not start with `#`.
    #[error("color '{0}' must start with '#'")]
    MissingHash(String),
    /// The string was neither `#RRGGBB` nor `#RRGGBBAA`.
    #[error("color '{0}' must have six or eight hex digits")]
    InvalidLength(String),
    /// A channel contained a non-hex digit.
    #[error("color '{0}' contains an invalid hex digit")]
    InvalidDigit(String),
}

impl FromStr for BlockColor {
    type Err = ParseColorError;

    /// Parses `#RRGGBB` or `#RRGGBBAA`; six-digit colors are opaque.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix('#')
            .ok_or_else(|| ParseColorError::MissingHash(trimmed.to_owned()))?;
        if !digits.is_ascii() || (digits.len() != 6 && digits.len() != 8) {
            return Err(ParseColorError::InvalidLength(trimmed.to_owned()));
        }

        let channel = |index: usize| {
            u8::from_str_radix(&digits[index..index + 2], 16)
                .map_err(|_| ParseColorError::InvalidDigit(trimmed.to_owned()))
        };
        let alpha = if digits.len() == 8 { channel(6)? } else { 0xff };
        Ok(Self::from_rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}

/// Behavioural category of a block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Collectible block the player can pick up.
    #[default]
    Normal,
    /// Solid block that blocks movement.
    Obstacle,
}

impl BlockKind {
    /// Tag applied to runtime objects of this kind.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Normal => "Collectible",
            Self::Obstacle => "Obstacle",
        }
    }

    /// Reports whether runtime objects of this kind collide instead of acting as triggers.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Self::Obstacle)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Obstacle => write!(f, "obstacle"),
        }
    }
}

/// Block data stored at an occupied cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occupant {
    /// Color applied to the block.
    pub color: BlockColor,
    /// Behavioural category of the block.
    pub kind: BlockKind,
}

impl Occupant {
    /// Creates a new occupant.
    #[must_use]
    pub const fn new(color: BlockColor, kind: BlockKind) -> Self {
        Self { color, kind }
    }
}

/// Whether a placement may replace an existing, different occupant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementMode {
    /// Reject the placement when the cell holds a different occupant.
    #[default]
    Insert,
    /// Replace whatever occupies the cell.
    Overwrite,
}

/// Reasons a block placement may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The coordinate lies outside the grid.
    #[error("cell lies outside the grid")]
    OutOfBounds,
    /// The cell already holds a different occupant and overwriting was not requested.
    #[error("cell is already occupied")]
    CellOccupied,
}

/// Successful placement outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    /// The cell was empty and now holds the occupant.
    Inserted,
    /// The cell held a different occupant, which was replaced.
    Replaced {
        /// Occupant held before the placement.
        previous: Occupant,
    },
    /// The cell already held an identical occupant.
    Unchanged,
}

impl Placement {
    /// Reports whether the placement altered the grid.
    #[must_use]
    pub const fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Identifier allocated to a level by the authoring session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(u32);

impl LevelId {
    /// Creates a new level identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level #{}", self.0)
    }
}

/// Direction of a history traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HistoryDirection {
    /// Stepped back to an earlier state.
    Undo,
    /// Stepped forward to a previously undone state.
    Redo,
}

/// Persisted representation of a single block.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRecord {
    /// Cell the block occupies.
    pub position: CellCoord,
    /// Color applied to the block.
    pub color: BlockColor,
    /// Behavioural category of the block.
    pub kind: BlockKind,
}

impl BlockRecord {
    /// Occupant described by the record.
    #[must_use]
    pub const fn occupant(&self) -> Occupant {
        Occupant::new(self.color, self.kind)
    }
}

/// Named level as exchanged with storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelResource {
    /// Display name of the level.
    pub name: String,
    /// Grid dimensions of the level.
    pub dimensions: GridDimensions,
    /// Blocks placed in the level. Positions never repeat.
    pub blocks: Vec<BlockRecord>,
}

/// Reasons a persisted level cannot be turned into a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum LevelResourceError {
    /// One of the dimensions was zero.
    #[error("level dimensions {width}x{height} must both be positive")]
    InvalidDimensions {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
    /// A block lies outside the declared dimensions.
    #[error("block at {0} lies outside the grid")]
    BlockOutOfBounds(CellCoord),
    /// Two blocks share a position.
    #[error("more than one block occupies {0}")]
    DuplicatePosition(CellCoord),
}

/// Reasons an authoring command may be rejected by the session.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The command edits the active level but none is selected.
    #[error("no level is active")]
    NoActiveLevel,
    /// No level with the provided identifier exists.
    #[error("{0} does not exist")]
    UnknownLevel(LevelId),
    /// The requested name was empty after trimming.
    #[error("level names must not be empty")]
    EmptyName,
    /// Another level already uses the requested name.
    #[error("a level named '{0}' already exists")]
    NameTaken(String),
    /// The imported resource failed validation.
    #[error("invalid level resource: {0}")]
    InvalidResource(#[from] LevelResourceError),
}

/// Commands that express all permissible authoring mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Creates an empty level and makes it active.
    CreateLevel {
        /// Requested name; a unique default is chosen when absent.
        name: Option<String>,
        /// Dimensions of the new grid.
        dimensions: GridDimensions,
    },
    /// Adds a level loaded from storage and makes it active.
    ImportLevel {
        /// Persisted level contents.
        resource: LevelResource,
    },
    /// Makes an existing level active for editing.
    SelectLevel {
        /// Level to activate.
        level: LevelId,
    },
    /// Renames an existing level.
    RenameLevel {
        /// Level to rename.
        level: LevelId,
        /// Requested new name.
        name: String,
    },
    /// Removes a level from the catalog.
    DeleteLevel {
        /// Level to delete.
        level: LevelId,
    },
    /// Places a block in the active level.
    PlaceBlock {
        /// Target cell.
        coord: CellCoord,
        /// Block data to store.
        occupant: Occupant,
        /// Whether a different occupant may be replaced.
        mode: PlacementMode,
    },
    /// Clears a cell in the active level.
    RemoveBlock {
        /// Cell to clear.
        coord: CellCoord,
    },
    /// Steps the active level's history back.
    Undo,
    /// Steps the active level's history forward.
    Redo,
}

/// Events reported by the authoring session and runtime systems.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A level was added to the catalog.
    LevelCreated {
        /// Identifier allocated to the level.
        level: LevelId,
        /// Name assigned to the level.
        name: String,
        /// Dimensions of the level grid.
        dimensions: GridDimensions,
    },
    /// A level became active for editing.
    LevelSelected {
        /// Level that became active.
        level: LevelId,
        /// Dimensions of the level grid.
        dimensions: GridDimensions,
    },
    /// A level received a new name.
    LevelRenamed {
        /// Renamed level.
        level: LevelId,
        /// Name after renaming.
        name: String,
    },
    /// A level was removed from the catalog.
    LevelDeleted {
        /// Deleted level.
        level: LevelId,
    },
    /// A block was written to a cell.
    BlockPlaced {
        /// Level that was edited.
        level: LevelId,
        /// Cell that received the block.
        coord: CellCoord,
        /// Block data now stored at the cell.
        occupant: Occupant,
        /// Occupant that was replaced, if any.
        replaced: Option<Occupant>,
    },
    /// A placement request failed validation.
    PlacementRejected {
        /// Cell provided in the request.
        coord: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// A block was removed from a cell.
    BlockRemoved {
        /// Level that was edited.
        level: LevelId,
        /// Cell that was cleared.
        coord: CellCoord,
        /// Block data that was removed.
        occupant: Occupant,
    },
    /// The active level's grid was replaced by a history snapshot.
    HistoryRestored {
        /// Level whose grid was restored.
        level: LevelId,
        /// Direction of the traversal.
        direction: HistoryDirection,
        /// Dimensions of the restored grid.
        dimensions: GridDimensions,
    },
    /// A catalog or history command was rejected.
    CommandRejected {
        /// Specific reason the command failed.
        reason: LevelError,
    },
    /// Every block of a level has been materialized into runtime objects.
    LevelMaterialized {
        /// Level that finished materializing.
        level: LevelId,
        /// Number of runtime objects placed.
        blocks: usize,
    },
}

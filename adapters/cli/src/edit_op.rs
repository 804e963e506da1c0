//! Textual edit operations accepted by the `edit` subcommand.

use std::str::FromStr;

use blockgrid_core::{
    BlockColor, BlockKind, CellCoord, Command, Occupant, ParseColorError, PlacementMode,
};
use thiserror::Error;

/// Single authoring step parsed from the command line.
///
/// Forms: `place:X,Y:KIND:#RRGGBBAA`, `replace:X,Y:KIND:#RRGGBBAA`,
/// `remove:X,Y`, `undo`, `redo`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EditOp {
    /// Places a block, optionally overwriting a different occupant.
    Place {
        coord: CellCoord,
        occupant: Occupant,
        mode: PlacementMode,
    },
    /// Clears a cell.
    Remove { coord: CellCoord },
    /// Steps history back.
    Undo,
    /// Steps history forward.
    Redo,
}

impl EditOp {
    /// Command submitted to the session for this operation.
    pub(crate) fn into_command(self) -> Command {
        match self {
            Self::Place {
                coord,
                occupant,
                mode,
            } => Command::PlaceBlock {
                coord,
                occupant,
                mode,
            },
            Self::Remove { coord } => Command::RemoveBlock { coord },
            Self::Undo => Command::Undo,
            Self::Redo => Command::Redo,
        }
    }
}

/// Errors raised while parsing an [`EditOp`].
#[derive(Debug, PartialEq, Eq, Error)]
pub(crate) enum EditOpError {
    /// The operation name was not recognised.
    #[error("unknown edit operation '{0}'")]
    UnknownOperation(String),
    /// The operation had too few or too many fields.
    #[error("edit operation '{0}' has the wrong number of fields")]
    FieldCount(String),
    /// A coordinate was not of the form `X,Y`.
    #[error("could not parse cell coordinate '{0}'")]
    InvalidCoordinate(String),
    /// The block kind was not recognised.
    #[error("unknown block kind '{0}'; expected normal or obstacle")]
    InvalidKind(String),
    /// The color was malformed.
    #[error(transparent)]
    InvalidColor(#[from] ParseColorError),
}

impl FromStr for EditOp {
    type Err = EditOpError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = value.trim().split(':').collect();
        let field_count = || EditOpError::FieldCount(value.to_owned());

        match fields.as_slice() {
            ["undo"] => Ok(Self::Undo),
            ["redo"] => Ok(Self::Redo),
            ["remove", coord] => Ok(Self::Remove {
                coord: parse_coord(coord)?,
            }),
            [op @ ("place" | "replace"), coord, kind, color] => Ok(Self::Place {
                coord: parse_coord(coord)?,
                occupant: Occupant::new(color.parse::<BlockColor>()?, parse_kind(kind)?),
                mode: if *op == "replace" {
                    PlacementMode::Overwrite
                } else {
                    PlacementMode::Insert
                },
            }),
            ["undo" | "redo" | "remove" | "place" | "replace", ..] => Err(field_count()),
            [op, ..] => Err(EditOpError::UnknownOperation((*op).to_owned())),
            [] => Err(field_count()),
        }
    }
}

/// Parses an `X,Y` pair into a cell coordinate.
fn parse_coord(value: &str) -> Result<CellCoord, EditOpError> {
    let invalid = || EditOpError::InvalidCoordinate(value.to_owned());
    let (x, y) = value.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse().map_err(|_| invalid())?;
    let y = y.trim().parse().map_err(|_| invalid())?;
    Ok(CellCoord::new(x, y))
}

fn parse_kind(value: &str) -> Result<BlockKind, EditOpError> {
    match value.to_ascii_lowercase().as_str() {
        "normal" | "collectible" => Ok(BlockKind::Normal),
        "obstacle" => Ok(BlockKind::Obstacle),
        _ => Err(EditOpError::InvalidKind(value.to_owned())),
    }
}

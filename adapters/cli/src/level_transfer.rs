//! Single-line transfer strings for sharing levels through the clipboard.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use blockgrid_core::{BlockRecord, GridDimensions, LevelResource, LevelResourceError};
use blockgrid_grid::GridModel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const TRANSFER_DOMAIN: &str = "level";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded level payload.
pub(crate) const TRANSFER_HEADER: &str = "level:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

#[derive(Serialize)]
struct PayloadRef<'a> {
    name: &'a str,
    blocks: &'a [BlockRecord],
}

#[derive(Deserialize)]
struct Payload {
    name: String,
    blocks: Vec<BlockRecord>,
}

/// Errors that can occur while encoding or decoding level transfer strings.
#[derive(Debug, Error)]
pub(crate) enum LevelTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("transfer string was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded level.
    #[error("transfer string is missing the prefix")]
    MissingPrefix,
    /// The encoded level did not contain a version segment.
    #[error("transfer string is missing the version")]
    MissingVersion,
    /// The encoded level did not include grid dimensions.
    #[error("transfer string is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded level did not include the payload segment.
    #[error("transfer string is missing the payload")]
    MissingPayload,
    /// The encoded level used an unexpected prefix segment.
    #[error("transfer prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded level used an unsupported version identifier.
    #[error("transfer version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded level.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode level payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not process level payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The decoded blocks do not fit the declared grid.
    #[error("decoded level is inconsistent: {0}")]
    InvalidLevel(#[from] LevelResourceError),
}

/// Encodes a level into a single-line string suitable for clipboard transfer.
pub(crate) fn encode(resource: &LevelResource) -> Result<String, LevelTransferError> {
    let payload = PayloadRef {
        name: &resource.name,
        blocks: &resource.blocks,
    };
    let json = serde_json::to_vec(&payload).map_err(LevelTransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{TRANSFER_HEADER}:{}:{encoded}",
        resource.dimensions
    ))
}

/// Decodes a level from the provided string representation.
///
/// The decoded blocks are validated against the declared dimensions.
pub(crate) fn decode(value: &str) -> Result<LevelResource, LevelTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LevelTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(LevelTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(LevelTransferError::MissingVersion)?;
    let dimensions = parts.next().ok_or(LevelTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(LevelTransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(LevelTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(LevelTransferError::UnsupportedVersion(version.to_owned()));
    }

    let dimensions = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(LevelTransferError::InvalidEncoding)?;
    let decoded: Payload =
        serde_json::from_slice(&bytes).map_err(LevelTransferError::InvalidPayload)?;

    let resource = LevelResource {
        name: decoded.name,
        dimensions,
        blocks: decoded.blocks,
    };
    let _ = GridModel::from_resource(&resource)?;
    Ok(resource)
}

fn parse_dimensions(dimensions: &str) -> Result<GridDimensions, LevelTransferError> {
    let invalid = || LevelTransferError::InvalidDimensions(dimensions.to_owned());
    let (width, height) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;

    GridDimensions::new(width, height).ok_or_else(invalid)
}

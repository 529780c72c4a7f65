//! Error types shared by the composer
//!
//! Failures fall in two groups:
//! - Per-object: a single descriptor cannot be spawned or saved. These are
//!   logged and skipped, the surrounding batch keeps going.
//! - Per-document: the map file cannot be read or parsed. These abort the
//!   whole load and leave an empty map behind.

use thiserror::Error;
use crate::editor::ObjectId;
use crate::room::RoomType;

/// Everything that can go wrong while composing, saving or loading a map.
#[derive(Debug, Error)]
pub enum MapEditorError {
    /// The room graph has no instance of the requested room type
    #[error("no room of type {0:?} exists in the current facility")]
    NoMatchingRoom(RoomType),

    /// A live object has no room context to be saved against
    #[error("object {0:?} has no room to be saved against")]
    MissingDescriptorReference(ObjectId),

    /// No document exists for the map name
    #[error("map document not found: {0}")]
    DocumentNotFound(String),

    /// The document could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Filesystem failure while reading or writing a document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Map names become file names, so they are restricted
    #[error("invalid map name: {0:?}")]
    InvalidMapName(String),

    /// The object is not (or no longer) registered
    #[error("object {0:?} is not registered")]
    UnknownObject(ObjectId),

    /// The edit does not apply to this kind of object
    #[error("{operation} is not supported by {kind} {object:?}")]
    Unsupported {
        object: ObjectId,
        kind: &'static str,
        operation: &'static str,
    },
}

impl MapEditorError {
    /// Short message suitable for showing to an operator
    pub fn operator_message(&self) -> String {
        match self {
            MapEditorError::NoMatchingRoom(room_type) => {
                format!("There is no {} room on this map", room_type.display_name())
            }
            MapEditorError::MissingDescriptorReference(_) => {
                "This object is outside of every room and can't be saved".to_string()
            }
            MapEditorError::DocumentNotFound(name) => format!("Map \"{}\" does not exist", name),
            MapEditorError::Serialization(_) => "The map file is corrupted".to_string(),
            MapEditorError::Io(_) => "Couldn't access the map file".to_string(),
            MapEditorError::InvalidMapName(name) => format!("\"{}\" is not a valid map name", name),
            MapEditorError::UnknownObject(_) => "This object doesn't exist anymore".to_string(),
            MapEditorError::Unsupported { kind, operation, .. } => format!("{} can't use {}", kind, operation),
        }
    }

    /// Whether this error only affects a single object
    pub fn is_isolated(&self) -> bool {
        matches!(
            self,
            MapEditorError::NoMatchingRoom(_)
                | MapEditorError::MissingDescriptorReference(_)
                | MapEditorError::UnknownObject(_)
                | MapEditorError::Unsupported { .. }
        )
    }
}

impl From<ron::error::SpannedError> for MapEditorError {
    fn from(e: ron::error::SpannedError) -> Self {
        MapEditorError::Serialization(e.to_string())
    }
}

impl From<ron::Error> for MapEditorError {
    fn from(e: ron::Error) -> Self {
        MapEditorError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MapEditorError>;

//! Map composer: room-relative map layouts for a procedurally assembled facility
//!
//! A map is a `Schematic`: lists of descriptors whose poses are relative to
//! a room type. Loading resolves every descriptor against a concrete room of
//! the live facility; saving walks the live objects and turns them back into
//! room-relative descriptors.
//!
//! - `schematic`: descriptor model, document codec and the map store
//! - `transform`: room-relative <-> world pose resolution
//! - `room`: the room graph the composer places against
//! - `scene`: the actor framework live objects are instantiated in
//! - `editor`: registry, selections, spawning, persistence and tools
//! - `teleport`: teleporter pair cooldown and prop animation

pub mod config;
pub mod editor;
pub mod error;
pub mod room;
pub mod scene;
pub mod schematic;
pub mod teleport;
pub mod transform;

pub use config::{ConfigError, MapEditorConfig};
pub use editor::{MapEditor, ObjectId, OperatorId, ToolMode};
pub use error::{MapEditorError, Result};
pub use schematic::{Descriptor, MapStore, PlaceableKind, Schematic};

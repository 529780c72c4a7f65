//! Editor events
//!
//! The editor never calls into the host directly. Anything the host may want
//! to react to (operator hints, spawned and deleted objects, teleports, load
//! completion) is queued here and drained by the host after each call.

use std::time::Duration;
use glam::Vec3;
use super::registry::ObjectId;
use super::selection::OperatorId;
use crate::scene::ActorHandle;
use crate::schematic::PlaceableKind;

/// Pending notifications of one kind, oldest first.
///
/// The editor only appends; the host reads or takes them between calls.
/// Nothing is dropped on its own, so a host that never drains keeps growing it.
#[derive(Debug)]
pub struct EventQueue<T> {
    pending: Vec<T>,
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self { pending: Vec::new() }
    }
}

impl<T> EventQueue<T> {
    pub(crate) fn send(&mut self, event: T) {
        self.pending.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.pending.iter()
    }

    /// Hand every pending notification to the caller, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.pending.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Default time a hint stays on screen
pub const HINT_DURATION: Duration = Duration::from_secs(5);

/// Text shown to a single operator. An empty text clears the current hint.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorHint {
    pub operator: OperatorId,
    pub text: String,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectSpawned {
    pub object: ObjectId,
    /// `None` for editor-only objects (indicators, teleport endpoints)
    pub kind: Option<PlaceableKind>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectDeleted {
    pub object: ObjectId,
}

/// A traveler went through a teleporter pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeleportEvent {
    pub controller: ObjectId,
    pub traveler: ActorHandle,
    pub from: Vec3,
    pub to: Vec3,
}

/// A deferred spawn pass finished
#[derive(Debug, Clone, PartialEq)]
pub struct MapLoaded {
    pub name: String,
    pub spawned: usize,
    pub failed: usize,
}

/// Every notification queue of the editor. The host drains them after each
/// editor call (or `clear`s what it does not care about).
#[derive(Debug, Default)]
pub struct EditorEvents {
    pub hints: EventQueue<OperatorHint>,
    pub spawned: EventQueue<ObjectSpawned>,
    pub deleted: EventQueue<ObjectDeleted>,
    pub teleported: EventQueue<TeleportEvent>,
    pub map_loaded: EventQueue<MapLoaded>,
}

impl EditorEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hint(&mut self, operator: OperatorId, text: impl Into<String>, duration: Duration) {
        self.hints.send(OperatorHint { operator, text: text.into(), duration });
    }

    /// Notifications waiting across every queue
    pub fn pending(&self) -> usize {
        self.hints.len() + self.spawned.len() + self.deleted.len() + self.teleported.len() + self.map_loaded.len()
    }

    pub fn clear(&mut self) {
        self.hints.clear();
        self.spawned.clear();
        self.deleted.clear();
        self.teleported.clear();
        self.map_loaded.clear();
    }
}

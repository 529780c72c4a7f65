//! Per-operator selection and deletion
//!
//! Every operator has at most one selected object. Selections are plain ids
//! and are invalidated whenever the object they point at is removed, by
//! whoever removes it.

use std::collections::HashMap;
use std::fmt::Write;
use std::time::Duration;
use tracing::debug;
use super::events::HINT_DURATION;
use super::registry::{ObjectId, PlacedKind};
use super::MapEditor;
use crate::error::{MapEditorError, Result};
use crate::room::RoomGraph;
use crate::scene::ActorFramework;

/// Shown when a selection is dropped
pub const UNSELECTED_HINT: &str = "Object have been unselected";

/// How long the empty hint that clears the screen after a delete stays up
const CLEAR_HINT_DURATION: Duration = Duration::from_millis(100);

/// Identity of an operator issuing editor commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperatorId(pub u32);

/// Selected object of every operator
#[derive(Debug, Default)]
pub struct Selections {
    by_operator: HashMap<OperatorId, ObjectId>,
}

impl Selections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, operator: OperatorId) -> Option<ObjectId> {
        self.by_operator.get(&operator).copied()
    }

    /// Record a selection, replacing any previous one
    pub fn set(&mut self, operator: OperatorId, object: ObjectId) {
        self.by_operator.insert(operator, object);
    }

    pub fn remove(&mut self, operator: OperatorId) -> Option<ObjectId> {
        self.by_operator.remove(&operator)
    }

    /// Drop every selection pointing at one of `removed`.
    /// Returns the operators that lost their selection.
    pub fn invalidate(&mut self, removed: &[ObjectId]) -> Vec<OperatorId> {
        let mut lost: Vec<OperatorId> = self
            .by_operator
            .iter()
            .filter(|(_, object)| removed.contains(object))
            .map(|(operator, _)| *operator)
            .collect();
        lost.sort();
        for operator in &lost {
            self.by_operator.remove(operator);
        }
        lost
    }

    pub fn clear(&mut self) {
        self.by_operator.clear();
    }

    pub fn len(&self) -> usize {
        self.by_operator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_operator.is_empty()
    }
}

impl<R: RoomGraph, A: ActorFramework> MapEditor<R, A> {
    /// Selected object of an operator, if it is still registered
    pub fn selected(&self, operator: OperatorId) -> Option<ObjectId> {
        self.selections.get(operator).filter(|id| self.registry.contains(*id))
    }

    /// Select an object, or drop the selection with `None` (or an object
    /// that is not registered). Returns whether something is selected now.
    pub fn select(&mut self, operator: OperatorId, object: Option<ObjectId>) -> bool {
        match object.filter(|id| self.registry.contains(*id)) {
            Some(id) => {
                let hint = self.object_hint(id);
                self.events.hint(operator, hint, HINT_DURATION);
                self.selections.set(operator, id);
                true
            }
            None => {
                if self.selections.remove(operator).is_some() {
                    self.events.hint(operator, UNSELECTED_HINT, HINT_DURATION);
                }
                false
            }
        }
    }

    /// Delete an object on behalf of an operator.
    ///
    /// Teleporter pairs go as a whole whichever part is deleted, spawn
    /// points take their indicator with them. Returns every removed id.
    pub fn delete(&mut self, operator: OperatorId, id: ObjectId) -> Result<Vec<ObjectId>> {
        if !self.registry.contains(id) {
            return Err(MapEditorError::UnknownObject(id));
        }
        if self.selections.get(operator) == Some(id) {
            self.selections.remove(operator);
            self.events.hint(operator, "", CLEAR_HINT_DURATION);
        }

        let cascade = self.cascade_of(id);
        let removed = self.teardown(&cascade);
        debug!(%id, removed = removed.len(), "deleted object");
        Ok(removed)
    }

    /// Multi-line description of an object for operator hints
    pub fn object_hint(&self, id: ObjectId) -> String {
        let Some(object) = self.registry.get(id) else {
            return String::new();
        };
        let mut hint = String::from(object.kind.name());

        if let Some(pose) = self.actors.pose(id) {
            let p = object.logical_pose(pose).position;
            let _ = write!(hint, "\nPosition: {:.2}, {:.2}, {:.2}", p.x, p.y, p.z);
        }
        if let Some(room) = object.spawn_room.and_then(|room| self.rooms.room(room)) {
            let _ = write!(hint, "\nRoom: {}", room.room_type.display_name());
        }

        match &object.kind {
            PlacedKind::Door { descriptor, .. } => {
                let _ = write!(hint, "\nType: {:?}\nLocked: {}", descriptor.door_type, descriptor.is_locked);
            }
            PlacedKind::ItemSpawnPoint { descriptor, .. } => {
                let _ = write!(hint, "\nItem: {}\nChance: {}%", descriptor.item, descriptor.spawn_chance);
            }
            PlacedKind::PlayerSpawnPoint { descriptor, .. } => {
                let _ = write!(hint, "\nRole: {}", descriptor.role.label());
            }
            PlacedKind::RagdollSpawnPoint { descriptor, .. } => {
                let _ = write!(hint, "\nRole: {}\nDeath reason: {}", descriptor.role.label(), descriptor.death_reason);
            }
            PlacedKind::ShootingTarget { descriptor, .. } => {
                let _ = write!(hint, "\nType: {:?}", descriptor.target_type);
            }
            PlacedKind::LightController { descriptor } => {
                let _ = write!(hint, "\nRooms: {}", descriptor.room_type.display_name());
            }
            PlacedKind::TeleportController(teleport) => {
                let _ = write!(
                    hint,
                    "\nCooldown: {}s\nBoth ways: {}",
                    teleport.cooldown, teleport.bidirectional
                );
            }
            PlacedKind::WorkStation { .. }
            | PlacedKind::TeleportEndpoint { .. }
            | PlacedKind::Indicator { .. } => {}
        }
        hint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::test_support::*;
    use crate::room::RoomType;
    use crate::scene::{ActorHandle, SceneWorld};
    use crate::schematic::*;

    fn door(editor: &mut TestEditor) -> ObjectId {
        editor
            .spawn(Descriptor::Door(DoorDescriptor {
                room_type: RoomType::HczArmory,
                ..DoorDescriptor::default()
            }))
            .unwrap()
    }

    fn last_hint(editor: &TestEditor) -> String {
        editor.events.hints.iter().last().map(|h| h.text.clone()).unwrap_or_default()
    }

    #[test]
    fn test_select_and_unselect() {
        let (_dir, mut editor) = editor();
        let op = OperatorId(1);
        let id = door(&mut editor);

        assert!(editor.select(op, Some(id)));
        assert_eq!(editor.selected(op), Some(id));
        assert!(last_hint(&editor).starts_with("Door"));

        assert!(!editor.select(op, None));
        assert_eq!(editor.selected(op), None);
        assert_eq!(last_hint(&editor), UNSELECTED_HINT);

        // Nothing selected: no hint
        editor.events.clear();
        editor.select(op, None);
        assert!(editor.events.hints.is_empty());
    }

    #[test]
    fn test_selecting_unregistered_object_clears() {
        let (_dir, mut editor) = editor();
        let op = OperatorId(1);
        let id = door(&mut editor);
        editor.select(op, Some(id));

        assert!(!editor.select(op, Some(ActorHandle::new(999, 0))));
        assert_eq!(editor.selected(op), None);
        assert_eq!(last_hint(&editor), UNSELECTED_HINT);
    }

    #[test]
    fn test_delete_invalidates_every_selection() {
        let (_dir, mut editor) = editor();
        let (a, b) = (OperatorId(1), OperatorId(2));
        let id = door(&mut editor);
        let other = door(&mut editor);
        editor.select(a, Some(id));
        editor.select(b, Some(id));

        let removed = editor.delete(a, id).unwrap();
        assert_eq!(removed, vec![id]);
        assert_eq!(last_hint(&editor), "");
        assert_eq!(editor.selected(a), None);
        assert_eq!(editor.selected(b), None);
        assert!(editor.selections().is_empty());
        assert!(!editor.registry().contains(id));
        assert!(editor.registry().contains(other));

        assert!(matches!(editor.delete(a, id), Err(MapEditorError::UnknownObject(_))));
    }

    #[test]
    fn test_registry_matches_live_actors() {
        let (_dir, mut editor) = editor();
        let op = OperatorId(7);
        let ids: Vec<_> = (0..5).map(|_| door(&mut editor)).collect();
        editor.delete(op, ids[1]).unwrap();
        editor.delete(op, ids[3]).unwrap();
        let newer = door(&mut editor);

        // Reused slots don't resurrect deleted ids
        assert!(!editor.registry().contains(ids[1]));
        assert_eq!(editor.registry().ids(), &[ids[0], ids[2], ids[4], newer]);
        for id in editor.registry().ids() {
            assert!(editor.actors().exists(*id));
        }
        let world: &SceneWorld = editor.actors();
        assert_eq!(world.actor_count() as usize, editor.registry().len());
    }

    #[test]
    fn test_invalidate_reports_operators() {
        let mut selections = Selections::new();
        let id = ActorHandle::new(0, 0);
        selections.set(OperatorId(2), id);
        selections.set(OperatorId(1), id);
        selections.set(OperatorId(3), ActorHandle::new(1, 0));

        assert_eq!(selections.invalidate(&[id]), vec![OperatorId(1), OperatorId(2)]);
        assert_eq!(selections.len(), 1);
    }
}

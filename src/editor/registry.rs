//! Object registry
//!
//! The single authoritative set of live placed objects:
//! - Ordered by insertion (save order follows it)
//! - Duplicate-free, keyed by the generational handle of the primary actor
//! - Only the spawn engine inserts, only delete and reload remove
//!
//! Each entry carries a `PlacedKind`, a closed tag over everything the
//! editor can place, with the live state that kind needs.

use glam::{Quat, Vec3};
use crate::room::{Room, RoomId, RoomType};
use crate::scene::{ActorHandle, HandleMap};
use crate::schematic::*;
use crate::teleport::{EndpointRole, TeleportController};
use crate::transform::{euler_to_quat, local_rotation, quat_to_euler, same_orientation, Pose, RandomAxes};

/// Identity of a live placed object: the handle of its primary actor
pub type ObjectId = ActorHandle;

/// Spawn points sit slightly above their logical position so their proxy
/// does not clip into the floor
pub mod clip_offset {
    pub const ITEM_SPAWN_POINT: f32 = 0.1;
    pub const PLAYER_SPAWN_POINT: f32 = 0.25;
    pub const RAGDOLL_SPAWN_POINT: f32 = 1.5;
}

/// Hinge of a door relative to its origin
pub const DOOR_PIVOT: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Stand of a shooting target relative to its origin
pub const TARGET_PIVOT: Vec3 = Vec3::new(0.0, 0.5, 0.0);

/// Rotation helper kept next to the instantiated transform.
///
/// Holds the rotation as authored, randomize sentinels included, so that a
/// save can tell which axes were rolled at spawn, and the room-local angles
/// they were rolled to. Rotating around `pivot` shifts the actor origin; the
/// logical position stays put.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectRotation {
    pub authored: Vec3,
    /// Room-local Euler degrees `authored` resolved to, sentinels rolled
    pub rolled: Vec3,
    pub pivot: Vec3,
}

impl ObjectRotation {
    pub fn new(authored: Vec3, rolled: Vec3) -> Self {
        Self { authored, rolled, pivot: Vec3::ZERO }
    }

    pub fn pivoted(authored: Vec3, rolled: Vec3, pivot: Vec3) -> Self {
        Self { authored, rolled, pivot }
    }

    /// Replace the rotation with fixed angles, dropping every sentinel
    pub fn fix(&mut self, euler: Vec3) {
        self.authored = euler;
        self.rolled = euler;
    }

    /// Axes that carried the randomize sentinel
    pub fn random_axes(&self) -> RandomAxes {
        RandomAxes::of(self.authored)
    }

    /// Room-local Euler degrees to persist for a world rotation.
    ///
    /// While the object still faces the way it was spawned the authored
    /// angles come back verbatim. Otherwise the rotation is decomposed, which
    /// can pick a different but equivalent triple, and sentinels are put back.
    pub fn local_euler(&self, world: Quat, room: &Room) -> Vec3 {
        let local = local_rotation(world, room);
        if same_orientation(local, euler_to_quat(self.rolled)) {
            return self.authored;
        }
        self.random_axes().restore(quat_to_euler(local))
    }

    /// Actor origin for a logical position and world rotation
    pub fn actor_position(&self, position: Vec3, rotation: Quat) -> Vec3 {
        position + self.pivot - rotation * self.pivot
    }

    /// Logical position for an actor origin and world rotation
    pub fn logical_position(&self, actor_position: Vec3, rotation: Quat) -> Vec3 {
        actor_position - self.pivot + rotation * self.pivot
    }
}

/// Room-relative placement written back into a descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPlacement {
    pub position: Vec3,
    /// Euler degrees, randomize sentinels restored
    pub rotation: Vec3,
    pub scale: Vec3,
    pub room_type: RoomType,
}

/// Kind-specific live state of a placed object
#[derive(Debug, Clone, PartialEq)]
pub enum PlacedKind {
    Door { descriptor: DoorDescriptor, rotation: ObjectRotation },
    WorkStation { descriptor: WorkStationDescriptor, rotation: ObjectRotation },
    ItemSpawnPoint {
        descriptor: ItemSpawnPointDescriptor,
        rotation: ObjectRotation,
        indicator: Option<ObjectId>,
    },
    PlayerSpawnPoint { descriptor: PlayerSpawnPointDescriptor, indicator: Option<ObjectId> },
    RagdollSpawnPoint {
        descriptor: RagdollSpawnPointDescriptor,
        rotation: ObjectRotation,
        indicator: Option<ObjectId>,
    },
    ShootingTarget { descriptor: ShootingTargetDescriptor, rotation: ObjectRotation },
    LightController { descriptor: LightControllerDescriptor },
    TeleportController(TeleportController),
    /// One side of a teleporter pair; `controller` is a lookup key, not ownership
    TeleportEndpoint { controller: ObjectId, role: EndpointRole },
    /// Editor-only proxy of a spawn point
    Indicator { attached: ObjectId },
}

impl PlacedKind {
    /// Persisted kind, `None` for editor-only objects
    pub fn placeable(&self) -> Option<PlaceableKind> {
        match self {
            PlacedKind::Door { .. } => Some(PlaceableKind::Door),
            PlacedKind::WorkStation { .. } => Some(PlaceableKind::WorkStation),
            PlacedKind::ItemSpawnPoint { .. } => Some(PlaceableKind::ItemSpawnPoint),
            PlacedKind::PlayerSpawnPoint { .. } => Some(PlaceableKind::PlayerSpawnPoint),
            PlacedKind::RagdollSpawnPoint { .. } => Some(PlaceableKind::RagdollSpawnPoint),
            PlacedKind::ShootingTarget { .. } => Some(PlaceableKind::ShootingTarget),
            PlacedKind::LightController { .. } => Some(PlaceableKind::LightController),
            PlacedKind::TeleportController(_) => Some(PlaceableKind::Teleport),
            PlacedKind::TeleportEndpoint { .. } | PlacedKind::Indicator { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlacedKind::TeleportEndpoint { role, .. } => match role {
                EndpointRole::Entrance => "Teleport Entrance",
                EndpointRole::Exit => "Teleport Exit",
            },
            PlacedKind::Indicator { .. } => "Indicator",
            other => other.placeable().map(|k| k.display_name()).unwrap_or("Object"),
        }
    }

    /// Vertical offset between the logical position and the actor
    pub fn clip_offset(&self) -> f32 {
        match self {
            PlacedKind::ItemSpawnPoint { .. } => clip_offset::ITEM_SPAWN_POINT,
            PlacedKind::PlayerSpawnPoint { .. } => clip_offset::PLAYER_SPAWN_POINT,
            PlacedKind::RagdollSpawnPoint { .. } => clip_offset::RAGDOLL_SPAWN_POINT,
            _ => 0.0,
        }
    }

    pub fn rotation(&self) -> Option<&ObjectRotation> {
        match self {
            PlacedKind::Door { rotation, .. }
            | PlacedKind::WorkStation { rotation, .. }
            | PlacedKind::ItemSpawnPoint { rotation, .. }
            | PlacedKind::RagdollSpawnPoint { rotation, .. }
            | PlacedKind::ShootingTarget { rotation, .. } => Some(rotation),
            _ => None,
        }
    }

    pub fn rotation_mut(&mut self) -> Option<&mut ObjectRotation> {
        match self {
            PlacedKind::Door { rotation, .. }
            | PlacedKind::WorkStation { rotation, .. }
            | PlacedKind::ItemSpawnPoint { rotation, .. }
            | PlacedKind::RagdollSpawnPoint { rotation, .. }
            | PlacedKind::ShootingTarget { rotation, .. } => Some(rotation),
            _ => None,
        }
    }

    /// Whether this kind can carry an indicator
    pub fn supports_indicator(&self) -> bool {
        matches!(
            self,
            PlacedKind::ItemSpawnPoint { .. }
                | PlacedKind::PlayerSpawnPoint { .. }
                | PlacedKind::RagdollSpawnPoint { .. }
        )
    }

    pub fn indicator(&self) -> Option<ObjectId> {
        match self {
            PlacedKind::ItemSpawnPoint { indicator, .. }
            | PlacedKind::PlayerSpawnPoint { indicator, .. }
            | PlacedKind::RagdollSpawnPoint { indicator, .. } => *indicator,
            _ => None,
        }
    }

    pub fn set_indicator(&mut self, value: Option<ObjectId>) {
        match self {
            PlacedKind::ItemSpawnPoint { indicator, .. }
            | PlacedKind::PlayerSpawnPoint { indicator, .. }
            | PlacedKind::RagdollSpawnPoint { indicator, .. } => *indicator = value,
            _ => {}
        }
    }

    /// Descriptor of a room-placed object at a new placement, keeping every
    /// other field. `None` for controllers and editor-only kinds.
    pub fn descriptor_at(&self, at: LocalPlacement) -> Option<Descriptor> {
        let LocalPlacement { position, rotation, scale, room_type } = at;
        let descriptor = match self {
            PlacedKind::Door { descriptor, .. } => Descriptor::Door(DoorDescriptor {
                position,
                rotation,
                scale,
                room_type,
                ..descriptor.clone()
            }),
            PlacedKind::WorkStation { descriptor, .. } => Descriptor::WorkStation(WorkStationDescriptor {
                position,
                rotation,
                scale,
                room_type,
                ..descriptor.clone()
            }),
            PlacedKind::ItemSpawnPoint { descriptor, .. } => Descriptor::ItemSpawnPoint(ItemSpawnPointDescriptor {
                position,
                rotation,
                room_type,
                ..descriptor.clone()
            }),
            PlacedKind::PlayerSpawnPoint { descriptor, .. } => {
                Descriptor::PlayerSpawnPoint(PlayerSpawnPointDescriptor { position, room_type, ..descriptor.clone() })
            }
            PlacedKind::RagdollSpawnPoint { descriptor, .. } => {
                Descriptor::RagdollSpawnPoint(RagdollSpawnPointDescriptor {
                    position,
                    rotation,
                    room_type,
                    ..descriptor.clone()
                })
            }
            PlacedKind::ShootingTarget { descriptor, .. } => Descriptor::ShootingTarget(ShootingTargetDescriptor {
                position,
                rotation,
                scale,
                room_type,
                ..descriptor.clone()
            }),
            PlacedKind::LightController { .. }
            | PlacedKind::TeleportController(_)
            | PlacedKind::TeleportEndpoint { .. }
            | PlacedKind::Indicator { .. } => return None,
        };
        Some(descriptor)
    }

    /// Whether the scale of the actor is part of the persisted state
    pub fn is_scalable(&self) -> bool {
        matches!(
            self,
            PlacedKind::Door { .. }
                | PlacedKind::WorkStation { .. }
                | PlacedKind::ShootingTarget { .. }
                | PlacedKind::TeleportEndpoint { .. }
        )
    }
}

/// A live placed object
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedObject {
    pub kind: PlacedKind,
    /// Room the object was spawned against, if any
    pub spawn_room: Option<RoomId>,
}

impl PlacedObject {
    pub fn new(kind: PlacedKind, spawn_room: Option<RoomId>) -> Self {
        Self { kind, spawn_room }
    }

    /// Actor pose for a logical pose
    pub fn actor_pose(&self, logical: Pose) -> Pose {
        let mut position = logical.position + Vec3::Y * self.kind.clip_offset();
        if let Some(rotation) = self.kind.rotation() {
            position = rotation.actor_position(position, logical.rotation);
        }
        Pose { position, ..logical }
    }

    /// Logical pose for an actor pose (inverse of `actor_pose`)
    pub fn logical_pose(&self, actor: Pose) -> Pose {
        let mut position = actor.position;
        if let Some(rotation) = self.kind.rotation() {
            position = rotation.logical_position(position, actor.rotation);
        }
        position -= Vec3::Y * self.kind.clip_offset();
        Pose { position, ..actor }
    }
}

/// Ordered registry of live placed objects
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    order: Vec<ObjectId>,
    objects: HandleMap<PlacedObject>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object. Returns false if the id is already registered.
    pub fn insert(&mut self, id: ObjectId, object: PlacedObject) -> bool {
        if self.objects.contains(id) {
            return false;
        }
        self.objects.insert(id, object);
        self.order.push(id);
        true
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<PlacedObject> {
        let object = self.objects.remove(id)?;
        self.order.retain(|&other| other != id);
        Some(object)
    }

    pub fn get(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut PlacedObject> {
        self.objects.get_mut(id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains(id)
    }

    /// Registered ids in insertion order
    pub fn ids(&self) -> &[ObjectId] {
        &self.order
    }

    /// Objects in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &PlacedObject)> {
        self.order
            .iter()
            .filter_map(|&id| self.objects.get(id).map(|object| (id, object)))
    }

    /// Remove everything, returning the objects in insertion order
    pub fn drain(&mut self) -> Vec<(ObjectId, PlacedObject)> {
        let order = std::mem::take(&mut self.order);
        let drained = order
            .into_iter()
            .filter_map(|id| self.objects.remove(id).map(|object| (id, object)))
            .collect();
        self.objects.clear();
        drained
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of registered objects of a persisted kind
    pub fn count_of(&self, kind: PlaceableKind) -> usize {
        self.iter().filter(|(_, o)| o.kind.placeable() == Some(kind)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{euler_to_quat, RANDOM_ROTATION};

    fn door() -> PlacedObject {
        PlacedObject::new(
            PlacedKind::Door {
                descriptor: DoorDescriptor::default(),
                rotation: ObjectRotation::pivoted(Vec3::ZERO, Vec3::ZERO, DOOR_PIVOT),
            },
            Some(1),
        )
    }

    #[test]
    fn test_insert_is_ordered_and_unique() {
        let mut registry = ObjectRegistry::new();
        let a = ActorHandle::new(4, 0);
        let b = ActorHandle::new(1, 0);

        assert!(registry.insert(a, door()));
        assert!(registry.insert(b, door()));
        assert!(!registry.insert(a, door()));

        assert_eq!(registry.ids(), &[a, b]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.count_of(PlaceableKind::Door), 2);
    }

    #[test]
    fn test_stale_ids_miss() {
        let mut registry = ObjectRegistry::new();
        let id = ActorHandle::new(0, 1);
        registry.insert(id, door());

        let stale = ActorHandle::new(0, 0);
        assert!(!registry.contains(stale));
        assert!(registry.remove(stale).is_none());
        assert!(registry.remove(id).is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_drain_keeps_order() {
        let mut registry = ObjectRegistry::new();
        let ids = [ActorHandle::new(2, 0), ActorHandle::new(0, 0), ActorHandle::new(1, 0)];
        for id in ids {
            registry.insert(id, door());
        }
        let drained: Vec<_> = registry.drain().into_iter().map(|(id, _)| id).collect();
        assert_eq!(drained, ids.to_vec());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_actor_pose_round_trip() {
        let object = door();
        let logical = Pose::new(
            Vec3::new(3.0, 0.0, -2.0),
            euler_to_quat(Vec3::new(90.0, 0.0, 0.0)),
            Vec3::ONE,
        );
        let actor = object.actor_pose(logical);
        assert!(actor.position.distance(logical.position) > 0.1);
        assert!(object.logical_pose(actor).position.distance(logical.position) < 1e-4);

        let spawn_point = PlacedObject::new(
            PlacedKind::PlayerSpawnPoint { descriptor: Default::default(), indicator: None },
            None,
        );
        let actor = spawn_point.actor_pose(Pose::from_position(Vec3::ZERO));
        assert_eq!(actor.position, Vec3::new(0.0, clip_offset::PLAYER_SPAWN_POINT, 0.0));
        assert_eq!(spawn_point.logical_pose(actor).position, Vec3::ZERO);
    }

    #[test]
    fn test_descriptor_at_keeps_kind_fields() {
        let object = PlacedObject::new(
            PlacedKind::Door {
                descriptor: DoorDescriptor { is_locked: true, health: 80.0, ..DoorDescriptor::default() },
                rotation: ObjectRotation::pivoted(Vec3::ZERO, Vec3::ZERO, DOOR_PIVOT),
            },
            None,
        );
        let at = LocalPlacement {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::new(0.0, 90.0, 0.0),
            scale: Vec3::splat(2.0),
            room_type: RoomType::LczCafe,
        };
        let Some(Descriptor::Door(door)) = object.kind.descriptor_at(at) else {
            panic!("expected a door");
        };
        assert!(door.is_locked);
        assert_eq!(door.health, 80.0);
        assert_eq!(door.position, at.position);
        assert_eq!(door.room_type, RoomType::LczCafe);

        let indicator = PlacedKind::Indicator { attached: ActorHandle::new(0, 0) };
        assert!(indicator.descriptor_at(at).is_none());
    }

    #[test]
    fn test_random_axes_come_from_authored_rotation() {
        let rotation = ObjectRotation::new(Vec3::new(0.0, RANDOM_ROTATION, 0.0), Vec3::new(0.0, 75.0, 0.0));
        let axes = rotation.random_axes();
        assert!(!axes.x && axes.y && !axes.z);
    }

    #[test]
    fn test_local_euler_keeps_authored_angles_until_rotated() {
        let room = Room::new(3, RoomType::HczArmory, Vec3::new(0.0, -100.0, 40.0)).with_yaw(180.0);
        // Pitch past 90 decomposes into a different triple
        let rolled = Vec3::new(150.0, 30.0, 0.0);
        let mut rotation = ObjectRotation::new(Vec3::new(RANDOM_ROTATION, 30.0, 0.0), rolled);
        let world = room.rotation * euler_to_quat(rolled);
        assert_eq!(rotation.local_euler(world, &room), Vec3::new(RANDOM_ROTATION, 30.0, 0.0));

        // Turned away from the spawn orientation: decomposed, sentinel restored
        let turned = room.rotation * euler_to_quat(Vec3::new(10.0, 30.0, 0.0));
        let saved = rotation.local_euler(turned, &room);
        assert_eq!(saved.x, RANDOM_ROTATION);
        assert!((saved.y - 30.0).abs() < 1e-2 && saved.z.abs() < 1e-2);

        rotation.fix(Vec3::new(0.0, 90.0, 0.0));
        assert!(!rotation.random_axes().any());
        assert_eq!(rotation.rolled, Vec3::new(0.0, 90.0, 0.0));
    }
}

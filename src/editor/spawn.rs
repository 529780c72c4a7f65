//! Spawn engine
//!
//! Turns descriptors into live objects:
//! 1. Pick a room of the descriptor's room type, uniformly at random
//! 2. Resolve the room-local pose to a world pose
//! 3. Instantiate the actor and attach kind-specific live state
//! 4. Make it network visible and register it
//!
//! Light and teleport controllers are instantiated at the graph origin and
//! place their own children. A teleporter pair is fully wired before its
//! controller id is returned.

use glam::{Quat, Vec3};
use rand::Rng;
use tracing::debug;
use super::events::ObjectSpawned;
use super::registry::*;
use super::MapEditor;
use crate::error::{MapEditorError, Result};
use crate::room::{Room, RoomGraph, RoomId, RoomType};
use crate::scene::{ActorFramework, ActorHandle, ActorTemplate};
use crate::schematic::*;
use crate::teleport::{EndpointRole, TeleportController, PROP_DROP, PROP_SCALE, RESTING_SPIN_SPEED};
use crate::transform::{resolve_position, resolve_rotation, Pose};

/// Where a spawn resolves its room-local pose
#[derive(Debug, Clone)]
pub(super) struct Placement {
    pub room: Room,
    /// `None` when the object does not belong to any room
    pub room_id: Option<RoomId>,
}

impl Placement {
    pub fn in_room(room: Room) -> Self {
        let room_id = Some(room.id);
        Self { room, room_id }
    }

    /// Outside every room: coordinates are taken as world coordinates
    pub fn free_standing() -> Self {
        Self {
            room: Room::new(RoomId::MAX, RoomType::Surface, Vec3::ZERO),
            room_id: None,
        }
    }
}

impl<R: RoomGraph, A: ActorFramework> MapEditor<R, A> {
    /// Spawn any descriptor against a random room of its type
    pub fn spawn(&mut self, descriptor: Descriptor) -> Result<ObjectId> {
        match descriptor {
            Descriptor::LightController(d) => self.spawn_light_controller(d),
            Descriptor::Teleport(d) => self.spawn_teleport(d),
            other => {
                let placement = self.random_room(other.room_type())?;
                self.place(other, placement)
            }
        }
    }

    pub fn spawn_door(&mut self, descriptor: DoorDescriptor) -> Result<ObjectId> {
        self.spawn(Descriptor::Door(descriptor))
    }

    pub fn spawn_work_station(&mut self, descriptor: WorkStationDescriptor) -> Result<ObjectId> {
        self.spawn(Descriptor::WorkStation(descriptor))
    }

    pub fn spawn_item_spawn_point(&mut self, descriptor: ItemSpawnPointDescriptor) -> Result<ObjectId> {
        self.spawn(Descriptor::ItemSpawnPoint(descriptor))
    }

    pub fn spawn_player_spawn_point(&mut self, descriptor: PlayerSpawnPointDescriptor) -> Result<ObjectId> {
        self.spawn(Descriptor::PlayerSpawnPoint(descriptor))
    }

    pub fn spawn_ragdoll_spawn_point(&mut self, descriptor: RagdollSpawnPointDescriptor) -> Result<ObjectId> {
        self.spawn(Descriptor::RagdollSpawnPoint(descriptor))
    }

    pub fn spawn_shooting_target(&mut self, descriptor: ShootingTargetDescriptor) -> Result<ObjectId> {
        self.spawn(Descriptor::ShootingTarget(descriptor))
    }

    /// Light controllers tint every room of their type and never fail
    pub fn spawn_light_controller(&mut self, descriptor: LightControllerDescriptor) -> Result<ObjectId> {
        let affected = self.rooms.rooms_of_type(descriptor.room_type).len();
        let pose = Pose::from_position(self.rooms.origin());
        let handle = self.actors.instantiate(ActorTemplate::LightController, pose);
        debug!(room_type = ?descriptor.room_type, rooms = affected, "light controller applied");
        let object = PlacedObject::new(PlacedKind::LightController { descriptor }, None);
        self.register(handle, object);
        Ok(handle)
    }

    /// Spawn a teleporter pair, each endpoint in a random room of its own type
    pub fn spawn_teleport(&mut self, descriptor: TeleportDescriptor) -> Result<ObjectId> {
        // Both rooms are picked before anything is instantiated, so a
        // missing room type leaves nothing behind
        let entrance = self.random_room(descriptor.entrance.room_type)?;
        let exit = self.random_room(descriptor.exit.room_type)?;
        Ok(self.place_teleport(&descriptor, entrance, exit))
    }

    /// A uniformly random room of a type
    pub(super) fn random_room(&mut self, room_type: RoomType) -> Result<Placement> {
        let candidates = self.rooms.rooms_of_type(room_type);
        if candidates.is_empty() {
            return Err(MapEditorError::NoMatchingRoom(room_type));
        }
        let index = self.rng.gen_range(0..candidates.len());
        Ok(Placement::in_room(candidates[index].clone()))
    }

    /// Spawn a descriptor against a chosen room
    pub(super) fn place(&mut self, descriptor: Descriptor, placement: Placement) -> Result<ObjectId> {
        let room = &placement.room;
        let (kind, template, position, rotation, scale) = match descriptor {
            Descriptor::Door(d) => {
                let resolved = resolve_rotation(d.rotation, room, &mut self.rng);
                let position = resolve_position(d.position, room);
                let template = ActorTemplate::Door(d.door_type);
                let scale = d.scale;
                let rotation = ObjectRotation::pivoted(d.rotation, resolved.euler, DOOR_PIVOT);
                (PlacedKind::Door { descriptor: d, rotation }, template, position, resolved.rotation, scale)
            }
            Descriptor::WorkStation(d) => {
                let resolved = resolve_rotation(d.rotation, room, &mut self.rng);
                let position = resolve_position(d.position, room);
                let scale = d.scale;
                let rotation = ObjectRotation::new(d.rotation, resolved.euler);
                (
                    PlacedKind::WorkStation { descriptor: d, rotation },
                    ActorTemplate::WorkStation,
                    position,
                    resolved.rotation,
                    scale,
                )
            }
            Descriptor::ItemSpawnPoint(d) => {
                let resolved = resolve_rotation(d.rotation, room, &mut self.rng);
                let position = resolve_position(d.position, room);
                let rotation = ObjectRotation::new(d.rotation, resolved.euler);
                (
                    PlacedKind::ItemSpawnPoint { descriptor: d, rotation, indicator: None },
                    ActorTemplate::ItemSpawnPoint,
                    position,
                    resolved.rotation,
                    Vec3::ONE,
                )
            }
            Descriptor::PlayerSpawnPoint(d) => {
                let position = resolve_position(d.position, room);
                let template = ActorTemplate::PlayerSpawnPoint(d.role);
                (
                    PlacedKind::PlayerSpawnPoint { descriptor: d, indicator: None },
                    template,
                    position,
                    Quat::IDENTITY,
                    Vec3::ONE,
                )
            }
            Descriptor::RagdollSpawnPoint(d) => {
                let resolved = resolve_rotation(d.rotation, room, &mut self.rng);
                let position = resolve_position(d.position, room);
                let template = ActorTemplate::RagdollSpawnPoint(d.role);
                let rotation = ObjectRotation::new(d.rotation, resolved.euler);
                (
                    PlacedKind::RagdollSpawnPoint { descriptor: d, rotation, indicator: None },
                    template,
                    position,
                    resolved.rotation,
                    Vec3::ONE,
                )
            }
            Descriptor::ShootingTarget(d) => {
                let resolved = resolve_rotation(d.rotation, room, &mut self.rng);
                let position = resolve_position(d.position, room);
                let template = ActorTemplate::ShootingTarget(d.target_type);
                let scale = d.scale;
                let rotation = ObjectRotation::pivoted(d.rotation, resolved.euler, TARGET_PIVOT);
                (PlacedKind::ShootingTarget { descriptor: d, rotation }, template, position, resolved.rotation, scale)
            }
            Descriptor::LightController(d) => return self.spawn_light_controller(d),
            Descriptor::Teleport(d) => {
                return Ok(self.place_teleport(&d, placement.clone(), placement));
            }
        };

        let object = PlacedObject::new(kind, placement.room_id);
        let pose = object.actor_pose(Pose::new(position, rotation, scale));
        let handle = self.actors.instantiate(template, pose);
        debug!(%handle, kind = object.kind.name(), room = ?placement.room.room_type, "spawned object");
        self.register(handle, object);
        Ok(handle)
    }

    /// Instantiate and wire a teleporter pair
    pub(super) fn place_teleport(&mut self, descriptor: &TeleportDescriptor, entrance: Placement, exit: Placement) -> ObjectId {
        let controller_pose = Pose::from_position(self.rooms.origin());
        let controller = self.actors.instantiate(ActorTemplate::TeleportController, controller_pose);

        let entrance_actor = self.place_endpoint(&descriptor.entrance, &entrance.room);
        let exit_actor = self.place_endpoint(&descriptor.exit, &exit.room);

        let mut teleport = TeleportController::new(
            entrance_actor,
            exit_actor,
            descriptor.cooldown,
            descriptor.bidirectional,
            descriptor.visible,
        );
        if descriptor.visible {
            teleport.entrance_prop = Some(self.spawn_prop(entrance_actor));
            teleport.exit_prop = Some(self.spawn_prop(exit_actor));
        }

        debug!(%controller, cooldown = descriptor.cooldown, bidirectional = descriptor.bidirectional, "spawned teleporter");
        self.register(controller, PlacedObject::new(PlacedKind::TeleportController(teleport), None));
        for (actor, role, placement) in [
            (entrance_actor, EndpointRole::Entrance, entrance),
            (exit_actor, EndpointRole::Exit, exit),
        ] {
            let endpoint = PlacedKind::TeleportEndpoint { controller, role };
            self.register(actor, PlacedObject::new(endpoint, placement.room_id));
        }
        controller
    }

    fn place_endpoint(&mut self, endpoint: &EndpointDescriptor, room: &Room) -> ActorHandle {
        let position = resolve_position(endpoint.position, room);
        let pose = Pose::new(position, Quat::IDENTITY, endpoint.scale);
        self.actors.instantiate(ActorTemplate::TeleportEndpoint, pose)
    }

    /// Decorative prop hovering over an endpoint
    fn spawn_prop(&mut self, endpoint: ActorHandle) -> ActorHandle {
        let position = self.actors.position(endpoint).unwrap_or(Vec3::ZERO) + PROP_DROP;
        let pose = Pose::new(position, Quat::IDENTITY, Vec3::splat(PROP_SCALE));
        let prop = self.actors.instantiate(ActorTemplate::SpinningProp, pose);
        self.actors.set_spin_speed(prop, RESTING_SPIN_SPEED);
        self.actors.set_network_visible(prop, true);
        prop
    }

    /// Replicate and register a freshly instantiated object
    pub(super) fn register(&mut self, handle: ObjectId, object: PlacedObject) {
        self.actors.set_network_visible(handle, true);
        let kind = object.kind.placeable();
        self.registry.insert(handle, object);
        self.events.spawned.send(ObjectSpawned { object: handle, kind });
    }
}

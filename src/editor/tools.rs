//! Operator tools
//!
//! Direct edits on the live map: spawning default objects where an operator
//! points, duplicating, moving, rotating, scaling, and spawn point
//! indicators. Coordinates are world space; the room an object ends up
//! belonging to is the one containing it.

use glam::Vec3;
use tracing::debug;
use super::registry::{LocalPlacement, ObjectId, PlacedKind, PlacedObject};
use super::spawn::Placement;
use super::MapEditor;
use crate::error::{MapEditorError, Result};
use crate::room::{RoomGraph, RoomType};
use crate::scene::{ActorFramework, ActorTemplate};
use crate::schematic::*;
use crate::teleport::PROP_DROP;
use crate::transform::{euler_to_quat, normalize_degrees, relative_position, relative_rotation, Pose};

/// Light controllers hover slightly above the floor they were placed on
const LIGHT_CONTROLLER_LIFT: f32 = 0.25;
/// Teleporter entrances float one unit above the hit point
const TELEPORTER_LIFT: f32 = 1.0;

/// What a spawn tool creates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolMode {
    Door(DoorType),
    WorkStation,
    ItemSpawnPoint,
    PlayerSpawnPoint,
    RagdollSpawnPoint,
    ShootingTarget(TargetType),
    LightController,
    Teleporter,
}

impl ToolMode {
    pub fn name(&self) -> &'static str {
        match self {
            ToolMode::Door(DoorType::LightContainment) => "LCZ Door",
            ToolMode::Door(DoorType::HeavyContainment) => "HCZ Door",
            ToolMode::Door(DoorType::Entrance) => "EZ Door",
            ToolMode::WorkStation => "Work Station",
            ToolMode::ItemSpawnPoint => "Item Spawn Point",
            ToolMode::PlayerSpawnPoint => "Player Spawn Point",
            ToolMode::RagdollSpawnPoint => "Ragdoll Spawn Point",
            ToolMode::ShootingTarget(TargetType::Sport) => "Sport Shooting Target",
            ToolMode::ShootingTarget(TargetType::ClassD) => "D-Boy Shooting Target",
            ToolMode::ShootingTarget(TargetType::Binary) => "Binary Shooting Target",
            ToolMode::LightController => "Light Controller",
            ToolMode::Teleporter => "Teleporter",
        }
    }

    /// Default descriptor of this mode at a room-relative position
    fn descriptor(&self, position: Vec3, room_type: RoomType, teleport_cooldown: f32) -> Descriptor {
        match *self {
            ToolMode::Door(door_type) => Descriptor::Door(DoorDescriptor {
                door_type,
                position,
                room_type,
                ..DoorDescriptor::default()
            }),
            ToolMode::WorkStation => Descriptor::WorkStation(WorkStationDescriptor {
                position,
                room_type,
                ..WorkStationDescriptor::default()
            }),
            ToolMode::ItemSpawnPoint => Descriptor::ItemSpawnPoint(ItemSpawnPointDescriptor {
                position,
                room_type,
                ..ItemSpawnPointDescriptor::default()
            }),
            ToolMode::PlayerSpawnPoint => Descriptor::PlayerSpawnPoint(PlayerSpawnPointDescriptor {
                position,
                room_type,
                ..PlayerSpawnPointDescriptor::default()
            }),
            ToolMode::RagdollSpawnPoint => Descriptor::RagdollSpawnPoint(RagdollSpawnPointDescriptor {
                position,
                room_type,
                ..RagdollSpawnPointDescriptor::default()
            }),
            ToolMode::ShootingTarget(target_type) => Descriptor::ShootingTarget(ShootingTargetDescriptor {
                target_type,
                position,
                room_type,
                ..ShootingTargetDescriptor::default()
            }),
            ToolMode::LightController => Descriptor::LightController(LightControllerDescriptor {
                room_type,
                ..LightControllerDescriptor::default()
            }),
            ToolMode::Teleporter => {
                let defaults = TeleportDescriptor::default();
                let offset = defaults.exit.position - defaults.entrance.position;
                Descriptor::Teleport(TeleportDescriptor {
                    entrance: EndpointDescriptor { position, room_type, ..defaults.entrance },
                    exit: EndpointDescriptor { position: position + offset, room_type, ..defaults.exit },
                    cooldown: teleport_cooldown,
                    ..defaults
                })
            }
        }
    }
}

fn unsupported(id: ObjectId, kind: &PlacedKind, operation: &'static str) -> MapEditorError {
    MapEditorError::Unsupported { object: id, kind: kind.name(), operation }
}

impl<R: RoomGraph, A: ActorFramework> MapEditor<R, A> {
    /// The room containing a world point, or a free-standing placement
    fn placement_at(&self, world: Vec3) -> Placement {
        match self.rooms.find_parent_room(world) {
            Some(room) => Placement::in_room(room.clone()),
            None => Placement::free_standing(),
        }
    }

    /// Spawn a default object of `mode` at a world position, facing the way
    /// the room containing it faces
    pub fn spawn_at(&mut self, mode: ToolMode, world_position: Vec3) -> Result<ObjectId> {
        let placement = self.placement_at(world_position);
        let room_type = placement.room.room_type;
        let cooldown = self.config.default_teleport_cooldown;

        let id = match mode {
            ToolMode::LightController => {
                let descriptor = mode.descriptor(Vec3::ZERO, room_type, cooldown);
                let id = self.spawn(descriptor)?;
                self.actors.set_position(id, world_position + Vec3::Y * LIGHT_CONTROLLER_LIFT);
                id
            }
            ToolMode::Teleporter => {
                let local = relative_position(world_position + Vec3::Y * TELEPORTER_LIFT, &placement.room);
                match mode.descriptor(local, room_type, cooldown) {
                    Descriptor::Teleport(descriptor) => {
                        self.place_teleport(&descriptor, placement.clone(), placement)
                    }
                    other => self.place(other, placement)?,
                }
            }
            _ => {
                let local = relative_position(world_position, &placement.room);
                self.place(mode.descriptor(local, room_type, cooldown), placement)?
            }
        };
        debug!(%id, tool = mode.name(), "tool spawned object");
        Ok(id)
    }

    /// Copy an object to a new world position. Duplicating any part of a
    /// teleporter pair copies the whole pair, keeping the exit offset.
    pub fn duplicate(&mut self, id: ObjectId, world_position: Vec3) -> Result<ObjectId> {
        let object = self.registry.get(id).ok_or(MapEditorError::UnknownObject(id))?;
        let copy = match &object.kind {
            PlacedKind::TeleportEndpoint { controller, .. } => return self.duplicate(*controller, world_position),
            PlacedKind::Indicator { attached } => return self.duplicate(*attached, world_position),
            PlacedKind::LightController { descriptor } => {
                let descriptor = descriptor.clone();
                let copy = self.spawn_light_controller(descriptor)?;
                self.actors.set_position(copy, world_position);
                return Ok(copy);
            }
            PlacedKind::TeleportController(teleport) => {
                let (entrance, exit) = (teleport.entrance, teleport.exit);
                let descriptor = TeleportDescriptor {
                    cooldown: teleport.cooldown,
                    bidirectional: teleport.bidirectional,
                    visible: teleport.visible,
                    ..TeleportDescriptor::default()
                };
                return self.duplicate_teleport(descriptor, entrance, exit, world_position);
            }
            kind => {
                let pose = self.actors.pose(id).ok_or(MapEditorError::UnknownObject(id))?;
                let placement = self.placement_at(world_position);
                let at = LocalPlacement {
                    position: relative_position(world_position, &placement.room),
                    rotation: match kind.rotation() {
                        Some(helper) => helper.local_euler(pose.rotation, &placement.room),
                        None => relative_rotation(pose.rotation, &placement.room),
                    },
                    scale: pose.scale,
                    room_type: placement.room.room_type,
                };
                let descriptor = kind.descriptor_at(at).ok_or(MapEditorError::UnknownObject(id))?;
                self.place(descriptor, placement)?
            }
        };
        debug!(source = %id, %copy, "duplicated object");
        Ok(copy)
    }

    fn duplicate_teleport(
        &mut self,
        mut descriptor: TeleportDescriptor,
        entrance: ObjectId,
        exit: ObjectId,
        world_position: Vec3,
    ) -> Result<ObjectId> {
        let entrance_pose = self.actors.pose(entrance).ok_or(MapEditorError::UnknownObject(entrance))?;
        let exit_pose = self.actors.pose(exit).ok_or(MapEditorError::UnknownObject(exit))?;
        let exit_position = world_position + (exit_pose.position - entrance_pose.position);

        let entrance_placement = self.placement_at(world_position);
        let exit_placement = self.placement_at(exit_position);
        descriptor.entrance = EndpointDescriptor {
            position: relative_position(world_position, &entrance_placement.room),
            scale: entrance_pose.scale,
            room_type: entrance_placement.room.room_type,
        };
        descriptor.exit = EndpointDescriptor {
            position: relative_position(exit_position, &exit_placement.room),
            scale: exit_pose.scale,
            room_type: exit_placement.room.room_type,
        };
        Ok(self.place_teleport(&descriptor, entrance_placement, exit_placement))
    }

    /// Show a proxy for a spawn point, or move its existing one back onto it
    pub fn spawn_indicator(&mut self, id: ObjectId) -> Result<ObjectId> {
        let object = self.registry.get(id).ok_or(MapEditorError::UnknownObject(id))?;
        if !object.kind.supports_indicator() {
            return Err(unsupported(id, &object.kind, "an indicator"));
        }
        let existing = object.kind.indicator().filter(|indicator| self.registry.contains(*indicator));
        let pose = self.actors.pose(id).ok_or(MapEditorError::UnknownObject(id))?;

        if let Some(indicator) = existing {
            self.actors.set_pose(indicator, pose);
            return Ok(indicator);
        }
        let indicator = self.actors.instantiate(ActorTemplate::Indicator, pose);
        self.register(indicator, PlacedObject::new(PlacedKind::Indicator { attached: id }, None));
        if let Some(target) = self.registry.get_mut(id) {
            target.kind.set_indicator(Some(indicator));
        }
        debug!(%id, %indicator, "indicator spawned");
        Ok(indicator)
    }

    /// Move an object so its logical position lands on `world_position`.
    /// Props and indicators follow.
    pub fn translate(&mut self, id: ObjectId, world_position: Vec3) -> Result<()> {
        let object = self.registry.get(id).ok_or(MapEditorError::UnknownObject(id))?;
        if matches!(object.kind, PlacedKind::Indicator { .. } | PlacedKind::TeleportController(_)) {
            return Err(unsupported(id, &object.kind, "moving"));
        }
        let pose = self.actors.pose(id).ok_or(MapEditorError::UnknownObject(id))?;
        let logical = Pose { position: world_position, ..object.logical_pose(pose) };
        let actor = object.actor_pose(logical);
        let indicator = object.kind.indicator();
        let prop = match object.kind {
            PlacedKind::TeleportEndpoint { controller, role } => match self.registry.get(controller) {
                Some(PlacedObject { kind: PlacedKind::TeleportController(teleport), .. }) => teleport.prop(role),
                _ => None,
            },
            _ => None,
        };

        self.actors.set_pose(id, actor);
        if let Some(prop) = prop {
            self.actors.set_position(prop, actor.position + PROP_DROP);
        }
        if indicator.is_some() {
            self.spawn_indicator(id)?;
        }
        Ok(())
    }

    /// Set the world rotation of an object from Euler degrees. The rotation
    /// becomes fixed: axes that were randomized are no longer rolled on load.
    pub fn rotate(&mut self, id: ObjectId, euler: Vec3) -> Result<()> {
        let object = self.registry.get_mut(id).ok_or(MapEditorError::UnknownObject(id))?;
        if object.kind.rotation().is_none() {
            return Err(unsupported(id, &object.kind, "rotating"));
        }
        let pose = self.actors.pose(id).ok_or(MapEditorError::UnknownObject(id))?;
        let logical = object.logical_pose(pose);
        let euler = Vec3::new(normalize_degrees(euler.x), normalize_degrees(euler.y), normalize_degrees(euler.z));
        if let Some(helper) = object.kind.rotation_mut() {
            helper.fix(euler);
        }

        let actor = object.actor_pose(Pose { rotation: euler_to_quat(euler), ..logical });
        let indicator = object.kind.indicator();
        self.actors.set_pose(id, actor);
        if indicator.is_some() {
            self.spawn_indicator(id)?;
        }
        Ok(())
    }

    /// Set the scale of a scalable object
    pub fn set_scale(&mut self, id: ObjectId, scale: Vec3) -> Result<()> {
        let object = self.registry.get(id).ok_or(MapEditorError::UnknownObject(id))?;
        if !object.kind.is_scalable() {
            return Err(unsupported(id, &object.kind, "scaling"));
        }
        let pose = self.actors.pose(id).ok_or(MapEditorError::UnknownObject(id))?;
        self.actors.set_pose(id, Pose { scale, ..pose });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::test_support::*;
    use crate::editor::OperatorId;
    use glam::Quat;
    use crate::teleport::EndpointRole;

    fn close(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn test_spawn_at_faces_parent_room() {
        let (_dir, mut editor) = editor();
        // Class-D room rotated by 90 degrees at (40, 0, 0)
        let id = editor.spawn_at(ToolMode::WorkStation, Vec3::new(42.0, 0.0, 1.0)).unwrap();
        let pose = editor.actors().pose(id).unwrap();
        assert!(close(pose.position, Vec3::new(42.0, 0.0, 1.0)));
        assert!(pose.rotation.angle_between(Quat::from_rotation_y(90f32.to_radians())) < 1e-3);
        assert_eq!(editor.registry().get(id).unwrap().spawn_room, Some(2));
    }

    #[test]
    fn test_spawn_points_are_lifted_by_clip_offset() {
        let (_dir, mut editor) = editor();
        let hit = Vec3::new(1.0, 0.0, 1.0);
        for (mode, lift) in [
            (ToolMode::ItemSpawnPoint, 0.1),
            (ToolMode::PlayerSpawnPoint, 0.25),
            (ToolMode::RagdollSpawnPoint, 1.5),
        ] {
            let id = editor.spawn_at(mode, hit).unwrap();
            let position = editor.actors().position(id).unwrap();
            assert!(close(position, hit + Vec3::Y * lift), "{:?}: {:?}", mode, position);
        }
    }

    #[test]
    fn test_spawn_light_and_teleporter() {
        let (_dir, mut editor) = editor();
        let hit = Vec3::new(0.0, 0.0, 2.0);
        let light = editor.spawn_at(ToolMode::LightController, hit).unwrap();
        assert!(close(editor.actors().position(light).unwrap(), hit + Vec3::Y * 0.25));
        match &editor.registry().get(light).unwrap().kind {
            PlacedKind::LightController { descriptor } => assert_eq!(descriptor.room_type, RoomType::LczClassDSpawn),
            other => panic!("unexpected {:?}", other),
        }

        let controller = editor.spawn_at(ToolMode::Teleporter, hit).unwrap();
        let PlacedKind::TeleportController(teleport) = &editor.registry().get(controller).unwrap().kind else {
            panic!("expected a teleport controller");
        };
        assert_eq!(teleport.cooldown, editor.config().default_teleport_cooldown);
        let entrance = editor.actors().position(teleport.endpoint(EndpointRole::Entrance)).unwrap();
        assert!(close(entrance, hit + Vec3::Y));
    }

    #[test]
    fn test_spawn_outside_rooms_is_free_standing() {
        let (_dir, mut editor) = editor();
        let hit = Vec3::new(500.0, 3.0, -500.0);
        let id = editor.spawn_at(ToolMode::ShootingTarget(TargetType::Binary), hit).unwrap();
        let object = editor.registry().get(id).unwrap();
        let logical = object.logical_pose(editor.actors().pose(id).unwrap());
        assert_eq!(object.spawn_room, None);
        assert!(logical.rotation.angle_between(Quat::IDENTITY) < 1e-3);
        assert!(close(logical.position, hit));
    }

    #[test]
    fn test_duplicate_keeps_fields_and_rotation() {
        let (_dir, mut editor) = editor();
        let source = editor
            .spawn_door(DoorDescriptor {
                door_type: DoorType::Entrance,
                rotation: Vec3::new(0.0, 30.0, 0.0),
                room_type: RoomType::LczClassDSpawn,
                is_locked: true,
                ..DoorDescriptor::default()
            })
            .unwrap();
        let source_rotation = editor.actors().pose(source).unwrap().rotation;

        let target = Vec3::new(3.0, 0.0, -3.0);
        let copy = editor.duplicate(source, target).unwrap();
        assert_ne!(copy, source);
        let object = editor.registry().get(copy).unwrap();
        let pose = editor.actors().pose(copy).unwrap();
        assert!(close(object.logical_pose(pose).position, target));
        assert!(pose.rotation.angle_between(source_rotation) < 1e-3);
        match &object.kind {
            PlacedKind::Door { descriptor, .. } => {
                assert!(descriptor.is_locked);
                assert_eq!(descriptor.door_type, DoorType::Entrance);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_rerolls_only_random_axes() {
        let authored = Vec3::new(crate::transform::RANDOM_ROTATION, 30.0, 0.0);
        for seed in 0..10 {
            let (_dir, mut editor) = seeded_editor(layout(), seed);
            let source = editor
                .spawn_door(DoorDescriptor { rotation: authored, room_type: RoomType::HczArmory, ..DoorDescriptor::default() })
                .unwrap();
            let copy = editor.duplicate(source, Vec3::new(1.0, -100.0, 41.0)).unwrap();
            let rotation = editor.registry().get(copy).unwrap().kind.rotation().unwrap();
            assert_eq!(rotation.authored, authored, "seed {seed}");
        }
    }

    #[test]
    fn test_duplicate_teleport_pair() {
        let (_dir, mut editor) = editor();
        let controller = editor.spawn_at(ToolMode::Teleporter, Vec3::new(0.0, 0.0, 0.0)).unwrap();
        let PlacedKind::TeleportController(teleport) = &editor.registry().get(controller).unwrap().kind else {
            panic!("expected a teleport controller");
        };
        let exit = teleport.exit;

        let copy = editor.duplicate(exit, Vec3::new(1.0, 1.0, -4.0)).unwrap();
        let PlacedKind::TeleportController(copied) = &editor.registry().get(copy).unwrap().kind else {
            panic!("expected a teleport controller");
        };
        let entrance = editor.actors().position(copied.entrance).unwrap();
        let exit = editor.actors().position(copied.exit).unwrap();
        assert!(close(entrance, Vec3::new(1.0, 1.0, -4.0)));
        assert!(close(exit - entrance, Vec3::new(0.0, 0.0, 5.0)));
        assert_eq!(editor.registry().count_of(PlaceableKind::Teleport), 2);
    }

    #[test]
    fn test_indicator_spawns_once_and_follows() {
        let (_dir, mut editor) = editor();
        let point = editor.spawn_at(ToolMode::PlayerSpawnPoint, Vec3::new(1.0, 0.0, 1.0)).unwrap();
        let indicator = editor.spawn_indicator(point).unwrap();
        assert_eq!(editor.spawn_indicator(point).unwrap(), indicator);
        assert_eq!(editor.actors().template(indicator), Some(ActorTemplate::Indicator));

        editor.translate(point, Vec3::new(2.0, 0.0, 2.0)).unwrap();
        let moved = editor.actors().position(point).unwrap();
        assert!(close(editor.actors().position(indicator).unwrap(), moved));

        // Deleting the spawn point takes the indicator with it
        let removed = editor.delete(OperatorId(1), point).unwrap();
        assert_eq!(removed, vec![point, indicator]);
        assert!(!editor.actors().exists(indicator));
    }

    #[test]
    fn test_indicator_requires_spawn_point() {
        let (_dir, mut editor) = editor();
        let target = editor.spawn_at(ToolMode::ShootingTarget(TargetType::Sport), Vec3::ZERO).unwrap();
        let err = editor.spawn_indicator(target).unwrap_err();
        assert!(matches!(err, MapEditorError::Unsupported { .. }));
        assert_eq!(editor.registry().len(), 1);
    }

    #[test]
    fn test_deleting_indicator_unlinks_target() {
        let (_dir, mut editor) = editor();
        let point = editor.spawn_at(ToolMode::ItemSpawnPoint, Vec3::ZERO).unwrap();
        let indicator = editor.spawn_indicator(point).unwrap();
        editor.delete(OperatorId(1), indicator).unwrap();
        assert_eq!(editor.registry().get(point).unwrap().kind.indicator(), None);
        assert_ne!(editor.spawn_indicator(point).unwrap(), indicator);
    }

    #[test]
    fn test_rotate_fixes_random_axes() {
        let (_dir, mut editor) = editor();
        let item = editor
            .spawn_item_spawn_point(ItemSpawnPointDescriptor {
                rotation: Vec3::new(0.0, -1.0, 0.0),
                room_type: RoomType::LczClassDSpawn,
                ..ItemSpawnPointDescriptor::default()
            })
            .unwrap();
        let before = editor.registry().get(item).unwrap().logical_pose(editor.actors().pose(item).unwrap());

        editor.rotate(item, Vec3::new(0.0, 45.0, 0.0)).unwrap();
        let object = editor.registry().get(item).unwrap();
        assert!(!object.kind.rotation().unwrap().random_axes().any());
        let after = object.logical_pose(editor.actors().pose(item).unwrap());
        assert!(close(before.position, after.position));
        assert!(after.rotation.angle_between(Quat::from_rotation_y(45f32.to_radians())) < 1e-3);
    }

    #[test]
    fn test_door_rotates_around_hinge() {
        let (_dir, mut editor) = editor();
        let door = editor.spawn_at(ToolMode::Door(DoorType::LightContainment), Vec3::new(2.0, 0.0, 2.0)).unwrap();
        editor.rotate(door, Vec3::new(90.0, 0.0, 0.0)).unwrap();
        let object = editor.registry().get(door).unwrap();
        let pose = editor.actors().pose(door).unwrap();
        assert!(close(object.logical_pose(pose).position, Vec3::new(2.0, 0.0, 2.0)));
        assert!(!close(pose.position, Vec3::new(2.0, 0.0, 2.0)));
    }

    #[test]
    fn test_scale_only_scalable_kinds() {
        let (_dir, mut editor) = editor();
        let target = editor.spawn_at(ToolMode::ShootingTarget(TargetType::ClassD), Vec3::ZERO).unwrap();
        editor.set_scale(target, Vec3::splat(3.0)).unwrap();
        assert_eq!(editor.actors().pose(target).unwrap().scale, Vec3::splat(3.0));

        let point = editor.spawn_at(ToolMode::RagdollSpawnPoint, Vec3::ZERO).unwrap();
        assert!(editor.set_scale(point, Vec3::splat(3.0)).is_err());
        let light = editor.spawn_at(ToolMode::LightController, Vec3::ZERO).unwrap();
        assert!(editor.rotate(light, Vec3::ZERO).is_err());
    }

    #[test]
    fn test_moved_endpoint_carries_its_prop() {
        let (_dir, mut editor) = editor();
        let controller = editor.spawn_at(ToolMode::Teleporter, Vec3::ZERO).unwrap();
        let PlacedKind::TeleportController(teleport) = &editor.registry().get(controller).unwrap().kind else {
            panic!("expected a teleport controller");
        };
        let (entrance, prop) = (teleport.entrance, teleport.entrance_prop.unwrap());

        editor.translate(entrance, Vec3::new(3.0, 2.0, 1.0)).unwrap();
        assert!(close(editor.actors().position(prop).unwrap(), Vec3::new(3.0, 1.0, 1.0)));
        assert!(editor.translate(controller, Vec3::ZERO).is_err());
    }
}

//! Schematic model - the persisted, room-relative description of a map
//!
//! A `Schematic` is a named bag of descriptor lists, one per placeable kind.
//! List order is load order; apart from player spawn points going first it
//! carries no meaning.

mod descriptor;
pub mod io;
mod store;

pub use descriptor::*;
pub use store::MapStore;

use serde::{Deserialize, Serialize};
use crate::room::RoomType;

/// Every kind of object a map can place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceableKind {
    Door,
    WorkStation,
    ItemSpawnPoint,
    PlayerSpawnPoint,
    RagdollSpawnPoint,
    ShootingTarget,
    LightController,
    Teleport,
}

impl PlaceableKind {
    /// Order in which a map is spawned. Player spawn points must be in place
    /// before the environment tears its default spawn points down.
    pub const LOAD_ORDER: [PlaceableKind; 8] = [
        PlaceableKind::PlayerSpawnPoint,
        PlaceableKind::Door,
        PlaceableKind::WorkStation,
        PlaceableKind::ItemSpawnPoint,
        PlaceableKind::RagdollSpawnPoint,
        PlaceableKind::ShootingTarget,
        PlaceableKind::LightController,
        PlaceableKind::Teleport,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            PlaceableKind::Door => "Door",
            PlaceableKind::WorkStation => "WorkStation",
            PlaceableKind::ItemSpawnPoint => "ItemSpawnPoint",
            PlaceableKind::PlayerSpawnPoint => "PlayerSpawnPoint",
            PlaceableKind::RagdollSpawnPoint => "RagdollSpawnPoint",
            PlaceableKind::ShootingTarget => "ShootingTarget",
            PlaceableKind::LightController => "LightController",
            PlaceableKind::Teleport => "Teleporter",
        }
    }
}

/// A full map layout
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Schematic {
    pub name: String,
    pub doors: Vec<DoorDescriptor>,
    pub work_stations: Vec<WorkStationDescriptor>,
    pub item_spawn_points: Vec<ItemSpawnPointDescriptor>,
    pub player_spawn_points: Vec<PlayerSpawnPointDescriptor>,
    pub ragdoll_spawn_points: Vec<RagdollSpawnPointDescriptor>,
    pub shooting_targets: Vec<ShootingTargetDescriptor>,
    pub light_controllers: Vec<LightControllerDescriptor>,
    pub teleports: Vec<TeleportDescriptor>,
}

impl Schematic {
    /// Create an empty schematic
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Empty every descriptor list, keeping the name
    pub fn cleanup_all(&mut self) {
        self.doors.clear();
        self.work_stations.clear();
        self.item_spawn_points.clear();
        self.player_spawn_points.clear();
        self.ragdoll_spawn_points.clear();
        self.shooting_targets.clear();
        self.light_controllers.clear();
        self.teleports.clear();
    }

    /// Number of descriptors of one kind
    pub fn count(&self, kind: PlaceableKind) -> usize {
        match kind {
            PlaceableKind::Door => self.doors.len(),
            PlaceableKind::WorkStation => self.work_stations.len(),
            PlaceableKind::ItemSpawnPoint => self.item_spawn_points.len(),
            PlaceableKind::PlayerSpawnPoint => self.player_spawn_points.len(),
            PlaceableKind::RagdollSpawnPoint => self.ragdoll_spawn_points.len(),
            PlaceableKind::ShootingTarget => self.shooting_targets.len(),
            PlaceableKind::LightController => self.light_controllers.len(),
            PlaceableKind::Teleport => self.teleports.len(),
        }
    }

    /// Total number of descriptors
    pub fn len(&self) -> usize {
        PlaceableKind::LOAD_ORDER.iter().map(|kind| self.count(*kind)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One descriptor of any kind
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    Door(DoorDescriptor),
    WorkStation(WorkStationDescriptor),
    ItemSpawnPoint(ItemSpawnPointDescriptor),
    PlayerSpawnPoint(PlayerSpawnPointDescriptor),
    RagdollSpawnPoint(RagdollSpawnPointDescriptor),
    ShootingTarget(ShootingTargetDescriptor),
    LightController(LightControllerDescriptor),
    Teleport(TeleportDescriptor),
}

impl Descriptor {
    pub fn kind(&self) -> PlaceableKind {
        match self {
            Descriptor::Door(_) => PlaceableKind::Door,
            Descriptor::WorkStation(_) => PlaceableKind::WorkStation,
            Descriptor::ItemSpawnPoint(_) => PlaceableKind::ItemSpawnPoint,
            Descriptor::PlayerSpawnPoint(_) => PlaceableKind::PlayerSpawnPoint,
            Descriptor::RagdollSpawnPoint(_) => PlaceableKind::RagdollSpawnPoint,
            Descriptor::ShootingTarget(_) => PlaceableKind::ShootingTarget,
            Descriptor::LightController(_) => PlaceableKind::LightController,
            Descriptor::Teleport(_) => PlaceableKind::Teleport,
        }
    }

    /// Room type the descriptor is authored against. Teleports report
    /// their entrance's room type.
    pub fn room_type(&self) -> RoomType {
        match self {
            Descriptor::Door(d) => d.room_type,
            Descriptor::WorkStation(d) => d.room_type,
            Descriptor::ItemSpawnPoint(d) => d.room_type,
            Descriptor::PlayerSpawnPoint(d) => d.room_type,
            Descriptor::RagdollSpawnPoint(d) => d.room_type,
            Descriptor::ShootingTarget(d) => d.room_type,
            Descriptor::LightController(d) => d.room_type,
            Descriptor::Teleport(d) => d.entrance.room_type,
        }
    }
}

impl Schematic {
    /// Append a descriptor to the list of its kind
    pub fn push(&mut self, descriptor: Descriptor) {
        match descriptor {
            Descriptor::Door(d) => self.doors.push(d),
            Descriptor::WorkStation(d) => self.work_stations.push(d),
            Descriptor::ItemSpawnPoint(d) => self.item_spawn_points.push(d),
            Descriptor::PlayerSpawnPoint(d) => self.player_spawn_points.push(d),
            Descriptor::RagdollSpawnPoint(d) => self.ragdoll_spawn_points.push(d),
            Descriptor::ShootingTarget(d) => self.shooting_targets.push(d),
            Descriptor::LightController(d) => self.light_controllers.push(d),
            Descriptor::Teleport(d) => self.teleports.push(d),
        }
    }

    /// Descriptors of one kind, in list order
    pub fn descriptors_of(&self, kind: PlaceableKind) -> Vec<Descriptor> {
        match kind {
            PlaceableKind::Door => self.doors.iter().cloned().map(Descriptor::Door).collect(),
            PlaceableKind::WorkStation => {
                self.work_stations.iter().cloned().map(Descriptor::WorkStation).collect()
            }
            PlaceableKind::ItemSpawnPoint => {
                self.item_spawn_points.iter().cloned().map(Descriptor::ItemSpawnPoint).collect()
            }
            PlaceableKind::PlayerSpawnPoint => {
                self.player_spawn_points.iter().cloned().map(Descriptor::PlayerSpawnPoint).collect()
            }
            PlaceableKind::RagdollSpawnPoint => {
                self.ragdoll_spawn_points.iter().cloned().map(Descriptor::RagdollSpawnPoint).collect()
            }
            PlaceableKind::ShootingTarget => {
                self.shooting_targets.iter().cloned().map(Descriptor::ShootingTarget).collect()
            }
            PlaceableKind::LightController => {
                self.light_controllers.iter().cloned().map(Descriptor::LightController).collect()
            }
            PlaceableKind::Teleport => self.teleports.iter().cloned().map(Descriptor::Teleport).collect(),
        }
    }

    /// Every descriptor, in load order
    pub fn descriptors(&self) -> Vec<Descriptor> {
        PlaceableKind::LOAD_ORDER
            .iter()
            .flat_map(|kind| self.descriptors_of(*kind))
            .collect()
    }
}

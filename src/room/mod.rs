//! Room graph - the procedurally-assembled facility that placed objects hang off
//!
//! Every placed object is authored relative to a room *type*, not a concrete
//! room instance. At spawn time one instance of that type is picked and the
//! object's room-local pose is pushed through that room's transform.
//!
//! The geometry provider itself lives outside this crate. `RoomGraph` is the
//! narrow interface we need from it; `FacilityLayout` is an in-memory
//! implementation used by the binary and the tests.

mod layout;

pub use layout::FacilityLayout;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Identifier of a concrete room instance inside a room graph
pub type RoomId = usize;

/// Room types a descriptor can target.
///
/// `Surface` is special: coordinates authored against it are already world
/// coordinates and are never transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoomType {
    #[default]
    Unknown,
    Surface,
    LczClassDSpawn,
    LczArmory,
    LczCafe,
    LczToilets,
    LczPlants,
    HczArmory,
    HczServers,
    HczNuke,
    HczTesla,
    EzGateA,
    EzGateB,
    EzIntercom,
    EzPcs,
}

impl RoomType {
    /// Short name shown in operator hints
    pub fn display_name(&self) -> &'static str {
        match self {
            RoomType::Unknown => "Unknown",
            RoomType::Surface => "Surface",
            RoomType::LczClassDSpawn => "LCZ Class-D Spawn",
            RoomType::LczArmory => "LCZ Armory",
            RoomType::LczCafe => "LCZ Cafe",
            RoomType::LczToilets => "LCZ Toilets",
            RoomType::LczPlants => "LCZ Plants",
            RoomType::HczArmory => "HCZ Armory",
            RoomType::HczServers => "HCZ Servers",
            RoomType::HczNuke => "HCZ Nuke",
            RoomType::HczTesla => "HCZ Tesla",
            RoomType::EzGateA => "EZ Gate A",
            RoomType::EzGateB => "EZ Gate B",
            RoomType::EzIntercom => "EZ Intercom",
            RoomType::EzPcs => "EZ PCs",
        }
    }

    pub fn is_surface(self) -> bool {
        self == RoomType::Surface
    }
}

/// A concrete room instance with its world placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub room_type: RoomType,
    /// World position of the room origin
    pub position: Vec3,
    /// World orientation of the room
    pub rotation: Quat,
    /// Half size of the room volume (room-local), used for parent-room lookup
    pub half_extents: Vec3,
}

impl Room {
    /// Create an axis-aligned room at a position
    pub fn new(id: RoomId, room_type: RoomType, position: Vec3) -> Self {
        Self {
            id,
            room_type,
            position,
            rotation: Quat::IDENTITY,
            half_extents: Vec3::new(10.0, 5.0, 10.0),
        }
    }

    /// Set the room's yaw in degrees
    pub fn with_yaw(mut self, degrees: f32) -> Self {
        self.rotation = Quat::from_rotation_y(degrees.to_radians());
        self
    }

    /// Set the room's half extents
    pub fn with_half_extents(mut self, half_extents: Vec3) -> Self {
        self.half_extents = half_extents;
        self
    }

    /// Transform a room-local point into world space
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Transform a world point into this room's local space
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    /// Check if a world point is inside the room volume
    pub fn contains_point(&self, world: Vec3) -> bool {
        let local = self.inverse_transform_point(world);
        local.x.abs() <= self.half_extents.x
            && local.y.abs() <= self.half_extents.y
            && local.z.abs() <= self.half_extents.z
    }
}

/// What the composer needs from the environment's room graph.
pub trait RoomGraph {
    /// The graph may still be assembling when a map load is requested
    fn is_ready(&self) -> bool;

    /// Every room instance, in a stable order
    fn rooms(&self) -> &[Room];

    /// All room instances of a type
    fn rooms_of_type(&self, room_type: RoomType) -> Vec<&Room> {
        self.rooms()
            .iter()
            .filter(|room| room.room_type == room_type)
            .collect()
    }

    /// Look up a room instance by id
    fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms().iter().find(|room| room.id == id)
    }

    /// Room whose volume contains `point`. Interior rooms win over the surface.
    fn find_parent_room(&self, point: Vec3) -> Option<&Room> {
        let mut surface = None;
        for room in self.rooms() {
            if !room.contains_point(point) {
                continue;
            }
            if room.room_type.is_surface() {
                surface.get_or_insert(room);
            } else {
                return Some(room);
            }
        }
        surface
    }

    /// World origin of the graph; controllers that place their own children
    /// are instantiated here.
    fn origin(&self) -> Vec3 {
        Vec3::ZERO
    }
}

//! Placeable descriptors
//!
//! Pure value data, one struct per placeable kind. Everything is
//! room-relative: positions and rotations are expressed in the local frame of
//! a room of `room_type`, scales are plain multipliers.
//!
//! Rotation axes are Euler degrees. An axis holding `RANDOM_ROTATION` (-1) is
//! rolled on every spawn.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use crate::room::RoomType;

fn default_true() -> bool {
    true
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

// =============================================================================
// Kind-specific enums
// =============================================================================

/// Door prefab variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoorType {
    #[default]
    LightContainment,
    HeavyContainment,
    Entrance,
}

/// Shooting target prefab variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetType {
    #[default]
    Sport,
    ClassD,
    Binary,
}

/// Role / team tag used by player and ragdoll spawn points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    ClassD,
    Scientist,
    FacilityGuard,
    NtfPrivate,
    ChaosRifleman,
    Scp049,
    Scp096,
    Scp106,
    #[default]
    Scp173,
    Scp939,
    Tutorial,
}

impl Role {
    /// Spawn point tag the environment looks up when spawning this role
    pub fn spawn_point_tag(&self) -> &'static str {
        match self {
            Role::ClassD => "SP_CDP",
            Role::Scientist => "SP_RSC",
            Role::FacilityGuard => "SP_GUARD",
            Role::NtfPrivate => "SP_MTF",
            Role::ChaosRifleman => "SP_CI",
            Role::Scp049 => "SP_049",
            Role::Scp096 => "SCP_096",
            Role::Scp106 => "SP_106",
            Role::Scp173 => "SP_173",
            Role::Scp939 => "SCP_939",
            Role::Tutorial => "TUT Spawn",
        }
    }

    /// Short label for indicators and hints
    pub fn label(&self) -> &'static str {
        match self {
            Role::NtfPrivate => "MTF",
            Role::Scp939 => "SCP939",
            Role::ClassD => "ClassD",
            Role::Scientist => "Scientist",
            Role::FacilityGuard => "FacilityGuard",
            Role::ChaosRifleman => "ChaosRifleman",
            Role::Scp049 => "Scp049",
            Role::Scp096 => "Scp096",
            Role::Scp106 => "Scp106",
            Role::Scp173 => "Scp173",
            Role::Tutorial => "Tutorial",
        }
    }
}

// =============================================================================
// Descriptors
// =============================================================================

/// A door of one of the three zone variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorDescriptor {
    pub door_type: DoorType,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub room_type: RoomType,
    pub is_open: bool,
    pub is_locked: bool,
    pub health: f32,
    pub open_on_warhead_activation: bool,
}

impl Default for DoorDescriptor {
    fn default() -> Self {
        Self {
            door_type: DoorType::default(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: default_scale(),
            room_type: RoomType::default(),
            is_open: false,
            is_locked: false,
            health: 150.0,
            open_on_warhead_activation: false,
        }
    }
}

/// A weapon work station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkStationDescriptor {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub room_type: RoomType,
    pub is_interactable: bool,
}

impl Default for WorkStationDescriptor {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: default_scale(),
            room_type: RoomType::default(),
            is_interactable: default_true(),
        }
    }
}

/// A location where items are spawned when the round starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemSpawnPointDescriptor {
    /// Item identifier (built-in item name or custom item name)
    pub item: String,
    pub attachments_code: i32,
    pub position: Vec3,
    pub rotation: Vec3,
    pub room_type: RoomType,
    /// Percent chance (0-100) for every item
    pub spawn_chance: u8,
    pub number_of_items: u32,
    pub use_gravity: bool,
}

impl Default for ItemSpawnPointDescriptor {
    fn default() -> Self {
        Self {
            item: "KeycardJanitor".to_string(),
            attachments_code: -1,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            room_type: RoomType::default(),
            spawn_chance: 100,
            number_of_items: 1,
            use_gravity: default_true(),
        }
    }
}

/// A location where players of a role spawn. Always spawned unrotated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSpawnPointDescriptor {
    pub role: Role,
    pub position: Vec3,
    pub room_type: RoomType,
}

/// A location where a decorative ragdoll is spawned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagdollSpawnPointDescriptor {
    pub name: String,
    pub role: Role,
    pub death_reason: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub room_type: RoomType,
}

impl Default for RagdollSpawnPointDescriptor {
    fn default() -> Self {
        Self {
            name: String::new(),
            role: Role::ClassD,
            death_reason: "Unknown".to_string(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            room_type: RoomType::default(),
        }
    }
}

/// A practice shooting target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootingTargetDescriptor {
    pub target_type: TargetType,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub room_type: RoomType,
    pub is_functional: bool,
}

impl Default for ShootingTargetDescriptor {
    fn default() -> Self {
        Self {
            target_type: TargetType::default(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: default_scale(),
            room_type: RoomType::default(),
            is_functional: default_true(),
        }
    }
}

/// Overrides the light color of every room of a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightControllerDescriptor {
    pub room_type: RoomType,
    /// RGBA, each channel in 0..=1
    pub color: [f32; 4],
    /// Hue shift speed; 0 disables shifting
    pub shift_speed: f32,
    /// Only tint the warhead alarm lights
    pub only_warhead_light: bool,
}

impl Default for LightControllerDescriptor {
    fn default() -> Self {
        Self {
            room_type: RoomType::default(),
            color: [1.0, 1.0, 1.0, 1.0],
            shift_speed: 0.0,
            only_warhead_light: false,
        }
    }
}

/// One side of a teleporter pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointDescriptor {
    pub position: Vec3,
    pub scale: Vec3,
    pub room_type: RoomType,
}

impl Default for EndpointDescriptor {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: default_scale(),
            room_type: RoomType::default(),
        }
    }
}

/// A linked entrance/exit teleporter pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleportDescriptor {
    pub entrance: EndpointDescriptor,
    pub exit: EndpointDescriptor,
    /// Seconds between two uses of the pair
    pub cooldown: f32,
    /// Whether the exit also teleports back to the entrance
    pub bidirectional: bool,
    /// Whether the endpoints show a spinning marker
    pub visible: bool,
}

impl Default for TeleportDescriptor {
    fn default() -> Self {
        Self {
            entrance: EndpointDescriptor::default(),
            exit: EndpointDescriptor {
                position: Vec3::new(0.0, 0.0, 5.0),
                ..EndpointDescriptor::default()
            },
            cooldown: 10.0,
            bidirectional: false,
            visible: default_true(),
        }
    }
}

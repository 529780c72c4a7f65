//! Scene - the live actor side of the composer
//!
//! Placed objects are represented by actors owned by an actor framework.
//! The composer only ever talks to it through `ActorFramework`:
//! - `instantiate` a template at a pose, `destroy` it again
//! - read and write poses
//! - replicate to clients (`set_network_visible`)
//! - drive decorative spin props
//! - ask whether an actor is a traveler (a player that can be teleported)
//!
//! `SceneWorld` is the in-memory framework used by the binary and tests.

mod handle;
mod storage;
mod world;

pub use handle::{ActorHandle, HandleAllocator};
pub use storage::HandleMap;
pub use world::SceneWorld;

use glam::Vec3;
use crate::schematic::{DoorType, Role, TargetType};
use crate::transform::Pose;

/// Prefab an actor is instantiated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorTemplate {
    Door(DoorType),
    WorkStation,
    ItemSpawnPoint,
    PlayerSpawnPoint(Role),
    RagdollSpawnPoint(Role),
    ShootingTarget(TargetType),
    LightController,
    TeleportController,
    /// Trigger volume of one side of a teleporter pair
    TeleportEndpoint,
    /// Decorative spinning marker above a teleporter endpoint
    SpinningProp,
    /// Editor-only proxy showing where a spawn point is
    Indicator,
    /// A player-controlled body
    Traveler,
}

impl ActorTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            ActorTemplate::Door(DoorType::LightContainment) => "LCZ Door",
            ActorTemplate::Door(DoorType::HeavyContainment) => "HCZ Door",
            ActorTemplate::Door(DoorType::Entrance) => "EZ Door",
            ActorTemplate::WorkStation => "Work Station",
            ActorTemplate::ItemSpawnPoint => "Item Spawn Point",
            ActorTemplate::PlayerSpawnPoint(_) => "Player Spawn Point",
            ActorTemplate::RagdollSpawnPoint(_) => "Ragdoll Spawn Point",
            ActorTemplate::ShootingTarget(TargetType::Sport) => "Sport Target",
            ActorTemplate::ShootingTarget(TargetType::ClassD) => "Class-D Target",
            ActorTemplate::ShootingTarget(TargetType::Binary) => "Binary Target",
            ActorTemplate::LightController => "Light Controller",
            ActorTemplate::TeleportController => "Teleport Controller",
            ActorTemplate::TeleportEndpoint => "Teleporter",
            ActorTemplate::SpinningProp => "Coin",
            ActorTemplate::Indicator => "Indicator",
            ActorTemplate::Traveler => "Player",
        }
    }
}

/// Seam to the engine that owns live actors.
pub trait ActorFramework {
    /// Create an actor from a template at a pose
    fn instantiate(&mut self, template: ActorTemplate, pose: Pose) -> ActorHandle;

    /// Destroy an actor. Returns false if it was already gone.
    fn destroy(&mut self, handle: ActorHandle) -> bool;

    fn exists(&self, handle: ActorHandle) -> bool;

    fn pose(&self, handle: ActorHandle) -> Option<Pose>;

    fn set_pose(&mut self, handle: ActorHandle, pose: Pose);

    fn position(&self, handle: ActorHandle) -> Option<Vec3> {
        self.pose(handle).map(|pose| pose.position)
    }

    /// Move an actor, keeping its rotation and scale
    fn set_position(&mut self, handle: ActorHandle, position: Vec3) {
        if let Some(pose) = self.pose(handle) {
            self.set_pose(handle, Pose { position, ..pose });
        }
    }

    /// Replicate (or stop replicating) an actor to connected clients
    fn set_network_visible(&mut self, handle: ActorHandle, visible: bool);

    /// Spin speed of a decorative prop, in degrees per second
    fn set_spin_speed(&mut self, handle: ActorHandle, speed: f32);

    fn spin_speed(&self, handle: ActorHandle) -> Option<f32>;

    /// Whether the actor can be moved by a teleporter
    fn is_traveler(&self, handle: ActorHandle) -> bool;
}

//! In-memory actor framework
//!
//! `SceneWorld` keeps every actor's template, pose and replication state in
//! handle-keyed sparse storage. Data is stored in typed fields rather than a
//! map of type ids; the set of actor properties is known up front.

use tracing::trace;
use super::handle::{ActorHandle, HandleAllocator};
use super::storage::HandleMap;
use super::{ActorFramework, ActorTemplate};
use crate::transform::Pose;
use glam::Vec3;

#[derive(Debug, Default)]
pub struct SceneWorld {
    actors: HandleAllocator,

    /// Prefab every actor was created from
    pub templates: HandleMap<ActorTemplate>,

    /// World pose
    pub poses: HandleMap<Pose>,

    /// Replicated to clients
    pub network_visible: HandleMap<bool>,

    /// Spin speed of decorative props
    pub spin_speeds: HandleMap<f32>,
}

impl SceneWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a player body that teleporters can move
    pub fn spawn_traveler(&mut self, position: Vec3) -> ActorHandle {
        self.instantiate(ActorTemplate::Traveler, Pose::from_position(position))
    }

    pub fn template(&self, handle: ActorHandle) -> Option<ActorTemplate> {
        self.templates.get(handle).copied()
    }

    pub fn is_network_visible(&self, handle: ActorHandle) -> bool {
        self.network_visible.get(handle).copied().unwrap_or(false)
    }

    /// Number of live actors
    pub fn actor_count(&self) -> u32 {
        self.actors.alive_count()
    }

    /// Live actors created from a template
    pub fn actors_of(&self, template: ActorTemplate) -> Vec<ActorHandle> {
        self.templates
            .iter()
            .filter(|(_, t)| **t == template)
            .map(|(handle, _)| handle)
            .collect()
    }
}

impl ActorFramework for SceneWorld {
    fn instantiate(&mut self, template: ActorTemplate, pose: Pose) -> ActorHandle {
        let handle = self.actors.allocate();
        self.templates.insert(handle, template);
        self.poses.insert(handle, pose);
        self.network_visible.insert(handle, false);
        trace!(%handle, template = template.name(), "instantiated actor");
        handle
    }

    fn destroy(&mut self, handle: ActorHandle) -> bool {
        if !self.actors.free(handle) {
            return false; // Already dead
        }
        self.templates.remove(handle);
        self.poses.remove(handle);
        self.network_visible.remove(handle);
        self.spin_speeds.remove(handle);
        trace!(%handle, "destroyed actor");
        true
    }

    fn exists(&self, handle: ActorHandle) -> bool {
        self.actors.is_alive(handle)
    }

    fn pose(&self, handle: ActorHandle) -> Option<Pose> {
        self.poses.get(handle).copied()
    }

    fn set_pose(&mut self, handle: ActorHandle, pose: Pose) {
        if let Some(current) = self.poses.get_mut(handle) {
            *current = pose;
        }
    }

    fn set_network_visible(&mut self, handle: ActorHandle, visible: bool) {
        if self.exists(handle) {
            self.network_visible.insert(handle, visible);
        }
    }

    fn set_spin_speed(&mut self, handle: ActorHandle, speed: f32) {
        if self.exists(handle) {
            self.spin_speeds.insert(handle, speed);
        }
    }

    fn spin_speed(&self, handle: ActorHandle) -> Option<f32> {
        self.spin_speeds.get(handle).copied()
    }

    fn is_traveler(&self, handle: ActorHandle) -> bool {
        self.template(handle) == Some(ActorTemplate::Traveler)
    }
}

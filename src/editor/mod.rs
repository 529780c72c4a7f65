//! Map editor
//!
//! `MapEditor` owns everything a live map needs:
//! - the room graph and the actor framework it composes against
//! - the object registry and per-operator selections
//! - the map store and the live-reload watch flag
//! - the simulation clock and its deferred actions
//! - outgoing events for the host
//!
//! The editor is single-threaded and `&mut`-driven. Time only moves in
//! `advance`, which runs every deferred action that has come due.

pub mod events;
mod persist;
pub mod registry;
pub mod scheduler;
mod selection;
mod spawn;
mod teleporting;
mod tools;

pub use events::{EditorEvents, EventQueue, OperatorHint, TeleportEvent, HINT_DURATION};
pub use persist::{LoadFailure, LoadReport, SaveReport};
pub use registry::{ObjectId, ObjectRegistry, ObjectRotation, PlacedKind, PlacedObject};
pub use scheduler::{DeferredAction, Scheduler, TaskId};
pub use selection::{OperatorId, Selections};
pub use tools::ToolMode;

use std::time::Duration;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;
use crate::config::MapEditorConfig;
use crate::room::RoomGraph;
use crate::scene::ActorFramework;
use crate::schematic::{MapStore, Schematic};
use crate::teleport::SpinStep;

/// A map waiting for its deferred spawn pass
#[derive(Debug)]
struct PendingLoad {
    generation: u64,
    schematic: Schematic,
    /// The pass came due before the room graph was ready
    parked: bool,
}

/// Pending restore of the watch flag after a save
#[derive(Debug, Clone, Copy)]
struct WatcherGuard {
    task: TaskId,
    restore_to: bool,
}

pub struct MapEditor<R: RoomGraph, A: ActorFramework> {
    config: MapEditorConfig,
    rooms: R,
    actors: A,
    rng: StdRng,
    store: MapStore,

    registry: ObjectRegistry,
    selections: Selections,
    scheduler: Scheduler,

    /// Outgoing events. Nothing drains them but the host, after every call
    pub events: EditorEvents,

    current_map: Option<String>,
    load_generation: u64,
    pending_load: Option<PendingLoad>,
    last_load: Option<LoadReport>,
    watcher_guard: Option<WatcherGuard>,
}

impl<R: RoomGraph, A: ActorFramework> MapEditor<R, A> {
    /// Create an editor with an entropy-seeded random source
    pub fn new(config: MapEditorConfig, rooms: R, actors: A) -> Self {
        Self::with_rng(config, rooms, actors, StdRng::from_entropy())
    }

    /// Create an editor with a caller-provided random source
    pub fn with_rng(config: MapEditorConfig, rooms: R, actors: A, rng: StdRng) -> Self {
        let store = MapStore::new(config.maps_dir.clone())
            .with_compression(config.compress_documents)
            .with_file_watcher(config.enable_file_watcher);
        Self {
            config,
            rooms,
            actors,
            rng,
            store,
            registry: ObjectRegistry::new(),
            selections: Selections::new(),
            scheduler: Scheduler::new(),
            events: EditorEvents::new(),
            current_map: None,
            load_generation: 0,
            pending_load: None,
            last_load: None,
            watcher_guard: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &MapEditorConfig {
        &self.config
    }

    pub fn rooms(&self) -> &R {
        &self.rooms
    }

    /// Mutable room graph; call `rooms_ready` once it has been assembled
    pub fn rooms_mut(&mut self) -> &mut R {
        &mut self.rooms
    }

    pub fn actors(&self) -> &A {
        &self.actors
    }

    pub fn actors_mut(&mut self) -> &mut A {
        &mut self.actors
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn store(&self) -> &MapStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MapStore {
        &mut self.store
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Current simulation time
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Name of the map currently loaded (or being loaded)
    pub fn current_map(&self) -> Option<&str> {
        self.current_map.as_deref()
    }

    /// Whether a load is waiting for its spawn pass
    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Report of the last completed spawn pass
    pub fn last_load_report(&self) -> Option<&LoadReport> {
        self.last_load.as_ref()
    }

    // =========================================================================
    // Clock
    // =========================================================================

    /// Advance the simulation clock, running every deferred action that
    /// comes due on the way, including ones scheduled while doing so.
    pub fn advance(&mut self, dt: Duration) {
        let target = self.scheduler.now().saturating_add(dt);
        while let Some(task) = self.scheduler.pop_due(target) {
            self.run_deferred(task.action);
        }
        self.scheduler.advance_to(target);
    }

    fn run_deferred(&mut self, action: DeferredAction) {
        match action {
            DeferredAction::SpawnPass { generation } => self.run_spawn_pass(generation),
            DeferredAction::SpinStep(step) => self.run_spin_step(step),
            DeferredAction::RestoreWatcher { enabled } => {
                self.watcher_guard = None;
                self.store.set_file_watcher_enabled(enabled);
                debug!(enabled, "file watcher restored");
            }
        }
    }

    fn run_spin_step(&mut self, step: SpinStep) {
        let next = match self.registry.get_mut(step.controller) {
            Some(PlacedObject { kind: PlacedKind::TeleportController(teleport), .. }) => {
                teleport
                    .apply_spin_step(step, &mut self.actors)
                    .map(|next| (next, teleport.step_interval()))
            }
            _ => None,
        };
        if let Some((next, interval)) = next {
            self.scheduler.after(interval, DeferredAction::SpinStep(next));
        }
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Ids removed together with `id`: a whole teleporter pair, or an
    /// object and its indicator.
    fn cascade_of(&self, id: ObjectId) -> Vec<ObjectId> {
        let Some(object) = self.registry.get(id) else {
            return Vec::new();
        };
        match &object.kind {
            PlacedKind::TeleportEndpoint { controller, .. } if self.registry.contains(*controller) => {
                self.cascade_of(*controller)
            }
            PlacedKind::TeleportController(teleport) => vec![id, teleport.entrance, teleport.exit],
            kind => {
                let mut ids = vec![id];
                ids.extend(kind.indicator());
                ids
            }
        }
    }

    /// Unregister and destroy objects, with their props. Returns the ids
    /// that were actually removed.
    fn teardown(&mut self, ids: &[ObjectId]) -> Vec<ObjectId> {
        let mut removed = Vec::with_capacity(ids.len());
        for &id in ids {
            let Some(object) = self.registry.remove(id) else {
                continue;
            };
            match object.kind {
                PlacedKind::TeleportController(mut teleport) => {
                    teleport.cancel_animation();
                    for (_, prop) in teleport.props() {
                        self.actors.destroy(prop);
                    }
                    self.scheduler.cancel_where(|action| {
                        matches!(action, DeferredAction::SpinStep(step) if step.controller == id)
                    });
                }
                PlacedKind::Indicator { attached } => {
                    if let Some(target) = self.registry.get_mut(attached) {
                        target.kind.set_indicator(None);
                    }
                }
                _ => {}
            }
            self.actors.destroy(id);
            self.events.deleted.send(events::ObjectDeleted { object: id });
            removed.push(id);
        }
        self.selections.invalidate(&removed);
        removed
    }

    /// Destroy every placed object and forget all selections
    fn clear_objects(&mut self) {
        let ids = self.registry.ids().to_vec();
        let removed = self.teardown(&ids);
        self.selections.clear();
        if !removed.is_empty() {
            debug!(count = removed.len(), "cleared placed objects");
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::room::{FacilityLayout, Room, RoomType};
    use crate::scene::SceneWorld;
    use glam::Vec3;
    use tempfile::TempDir;

    pub type TestEditor = MapEditor<FacilityLayout, SceneWorld>;

    /// A ready facility with one surface, two class-D rooms (one rotated)
    /// and one room of each other type used by the tests
    pub fn layout() -> FacilityLayout {
        let mut layout = FacilityLayout::new();
        layout.add_room(
            Room::new(0, RoomType::Surface, Vec3::new(0.0, 1000.0, 0.0))
                .with_half_extents(Vec3::new(200.0, 50.0, 200.0)),
        );
        layout.add_room(Room::new(0, RoomType::LczClassDSpawn, Vec3::new(0.0, 0.0, 0.0)));
        layout.add_room(Room::new(0, RoomType::LczClassDSpawn, Vec3::new(40.0, 0.0, 0.0)).with_yaw(90.0));
        layout.add_room(Room::new(0, RoomType::HczArmory, Vec3::new(0.0, -100.0, 40.0)).with_yaw(180.0));
        layout.add_room(Room::new(0, RoomType::EzPcs, Vec3::new(80.0, 0.0, 80.0)).with_yaw(270.0));
        layout.set_ready(true);
        layout
    }

    pub fn editor() -> (TempDir, TestEditor) {
        editor_with(layout())
    }

    pub fn editor_with(layout: FacilityLayout) -> (TempDir, TestEditor) {
        seeded_editor(layout, 42)
    }

    pub fn seeded_editor(layout: FacilityLayout, seed: u64) -> (TempDir, TestEditor) {
        let dir = TempDir::new().unwrap();
        let config = MapEditorConfig {
            maps_dir: dir.path().join("maps"),
            ..MapEditorConfig::default()
        };
        let editor = MapEditor::with_rng(config, layout, SceneWorld::new(), StdRng::seed_from_u64(seed));
        (dir, editor)
    }

    /// Run every pending deferred action
    pub fn settle(editor: &mut TestEditor) {
        editor.advance(Duration::from_secs(60));
    }
}

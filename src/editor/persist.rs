//! Save and load
//!
//! Load clears the registry right away and spawns the new map in a deferred
//! pass, in a fixed order: player spawn points first (the environment drops
//! its default spawn points once custom ones exist), then doors, work
//! stations, item spawn points, ragdoll spawn points, shooting targets,
//! light controllers and teleporters. A failing descriptor is logged and
//! skipped.
//!
//! Save walks the registry and turns every persisted object back into a
//! room-relative descriptor against the room it currently stands in.

use std::path::PathBuf;
use tracing::{debug, info, warn};
use super::events::MapLoaded;
use super::registry::{LocalPlacement, ObjectId, PlacedKind, PlacedObject};
use super::scheduler::DeferredAction;
use super::{MapEditor, PendingLoad, WatcherGuard};
use crate::error::{MapEditorError, Result};
use crate::room::{Room, RoomGraph};
use crate::scene::{ActorFramework, ActorHandle};
use crate::schematic::*;
use crate::transform::{relative_position, relative_rotation, Pose};

/// A descriptor that could not be spawned
#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    pub kind: PlaceableKind,
    /// Position in the list of its kind
    pub index: usize,
    pub message: String,
}

/// Outcome of a spawn pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub map: String,
    /// Spawned objects per kind, in load order
    pub spawned: Vec<(PlaceableKind, usize)>,
    pub failed: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn spawned_of(&self, kind: PlaceableKind) -> usize {
        self.spawned.iter().find(|(k, _)| *k == kind).map(|(_, n)| *n).unwrap_or(0)
    }

    pub fn total_spawned(&self) -> usize {
        self.spawned.iter().map(|(_, n)| n).sum()
    }
}

/// Outcome of a save
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveReport {
    pub path: PathBuf,
    /// Saved descriptors per kind
    pub saved: Vec<(PlaceableKind, usize)>,
    /// Objects that could not be described
    pub skipped: Vec<ObjectId>,
}

impl SaveReport {
    pub fn saved_of(&self, kind: PlaceableKind) -> usize {
        self.saved.iter().find(|(k, _)| *k == kind).map(|(_, n)| *n).unwrap_or(0)
    }

    pub fn total_saved(&self) -> usize {
        self.saved.iter().map(|(_, n)| n).sum()
    }
}

impl<R: RoomGraph, A: ActorFramework> MapEditor<R, A> {
    // =========================================================================
    // Load
    // =========================================================================

    /// Replace the current map.
    ///
    /// Every placed object is destroyed immediately. With `Some`, the new map
    /// is spawned `load_delay` later, or once the room graph is ready if it
    /// is not by then. A newer load supersedes a pending one.
    pub fn load(&mut self, schematic: Option<Schematic>) {
        self.clear_objects();
        self.load_generation += 1;
        self.pending_load = None;
        self.scheduler
            .cancel_where(|action| matches!(action, DeferredAction::SpawnPass { .. }));

        let Some(schematic) = schematic else {
            self.current_map = None;
            debug!("loaded empty map");
            return;
        };
        debug!(map = %schematic.name, objects = schematic.len(), "scheduling spawn pass");
        self.current_map = Some(schematic.name.clone());
        let generation = self.load_generation;
        self.pending_load = Some(PendingLoad { generation, schematic, parked: false });
        self.scheduler.after(self.config.load_delay(), DeferredAction::SpawnPass { generation });
    }

    /// Clear the current map, then load the document of `name`.
    ///
    /// A missing document is an empty map. An unreadable document is an
    /// error and leaves the map empty.
    pub fn load_by_name(&mut self, name: &str) -> Result<()> {
        self.load(None);
        self.current_map = Some(name.to_string());
        match self.store.get_by_name(name)? {
            Some(schematic) => self.load(Some(schematic)),
            None => debug!(map = name, "no document, map stays empty"),
        }
        Ok(())
    }

    /// Read the document of a map without loading it
    pub fn get_by_name(&self, name: &str) -> Result<Option<Schematic>> {
        self.store.get_by_name(name)
    }

    /// The room graph finished assembling. Runs a parked spawn pass.
    pub fn rooms_ready(&mut self) {
        let parked = match &self.pending_load {
            Some(pending) if pending.parked => Some(pending.generation),
            _ => None,
        };
        if let Some(generation) = parked {
            self.run_spawn_pass(generation);
        }
    }

    /// A map document changed on disk. Reloads it if it is the current map
    /// and the watcher is on. Returns whether a reload happened.
    pub fn on_document_changed(&mut self, name: &str) -> Result<bool> {
        if !self.store.file_watcher_enabled() || self.current_map.as_deref() != Some(name) {
            return Ok(false);
        }
        info!(map = name, "map document changed, reloading");
        self.load_by_name(name)?;
        Ok(true)
    }

    pub(super) fn run_spawn_pass(&mut self, generation: u64) {
        match &mut self.pending_load {
            Some(pending) if pending.generation == generation => {
                if !self.rooms.is_ready() {
                    debug!(generation, "room graph not ready, parking spawn pass");
                    pending.parked = true;
                    return;
                }
            }
            _ => {
                debug!(generation, "stale spawn pass");
                return;
            }
        }
        let Some(pending) = self.pending_load.take() else {
            return;
        };

        let schematic = pending.schematic;
        let mut report = LoadReport { map: schematic.name.clone(), ..LoadReport::default() };
        for kind in PlaceableKind::LOAD_ORDER {
            let mut spawned = 0;
            for (index, descriptor) in schematic.descriptors_of(kind).into_iter().enumerate() {
                match self.spawn(descriptor) {
                    Ok(id) => {
                        debug!(%id, kind = kind.display_name(), "spawned");
                        spawned += 1;
                    }
                    Err(e) => {
                        warn!(kind = kind.display_name(), index, "failed to spawn: {}", e);
                        report.failed.push(LoadFailure { kind, index, message: e.to_string() });
                    }
                }
            }
            report.spawned.push((kind, spawned));
        }

        info!(
            map = %report.map,
            spawned = report.total_spawned(),
            failed = report.failed.len(),
            "map loaded"
        );
        self.events.map_loaded.send(MapLoaded {
            name: report.map.clone(),
            spawned: report.total_spawned(),
            failed: report.failed.len(),
        });
        self.last_load = Some(report);
    }

    // =========================================================================
    // Save
    // =========================================================================

    /// Write every persisted object to the document of `name`.
    ///
    /// The file watcher is turned off for the write and restored
    /// `watcher_guard` later, so the editor does not reload its own save.
    pub fn save(&mut self, name: &str) -> Result<SaveReport> {
        let mut schematic = match self.store.get_by_name(name) {
            Ok(Some(mut existing)) => {
                existing.cleanup_all();
                existing
            }
            Ok(None) => Schematic::new(name),
            Err(e @ MapEditorError::InvalidMapName(_)) => return Err(e),
            Err(e) => {
                warn!(map = name, "existing document unreadable, replacing it: {}", e);
                Schematic::new(name)
            }
        };
        schematic.name = name.to_string();

        let mut report = SaveReport::default();
        for (id, object) in self.registry.iter() {
            let Some(kind) = object.kind.placeable() else {
                continue;
            };
            match self.describe(id, object) {
                Ok(descriptor) => {
                    schematic.push(descriptor);
                    match report.saved.iter_mut().find(|(k, _)| *k == kind) {
                        Some((_, count)) => *count += 1,
                        None => report.saved.push((kind, 1)),
                    }
                }
                Err(e) => {
                    warn!(%id, kind = kind.display_name(), "skipping object: {}", e);
                    report.skipped.push(id);
                }
            }
        }

        self.guard_watcher();
        report.path = self.store.write(&schematic)?;
        info!(map = name, saved = report.total_saved(), skipped = report.skipped.len(), "map saved");
        Ok(report)
    }

    /// Turn the watcher off and schedule its restore. Overlapping saves keep
    /// the value from before the first one.
    fn guard_watcher(&mut self) {
        let restore_to = match self.watcher_guard.take() {
            Some(guard) => {
                self.scheduler.cancel(guard.task);
                guard.restore_to
            }
            None => self.store.file_watcher_enabled(),
        };
        self.store.set_file_watcher_enabled(false);
        let task = self
            .scheduler
            .after(self.config.watcher_guard(), DeferredAction::RestoreWatcher { enabled: restore_to });
        self.watcher_guard = Some(WatcherGuard { task, restore_to });
    }

    /// Room an object is saved against: its spawn room while it still stands
    /// in it, else whichever room it stands in now, else its spawn room.
    fn save_room(&self, id: ObjectId, spawn_room: Option<usize>, position: glam::Vec3) -> Result<Room> {
        let spawn = spawn_room.and_then(|room| self.rooms.room(room));
        if let Some(room) = spawn {
            if room.contains_point(position) {
                return Ok(room.clone());
            }
        }
        self.rooms
            .find_parent_room(position)
            .or(spawn)
            .cloned()
            .ok_or(MapEditorError::MissingDescriptorReference(id))
    }

    fn logical_pose(&self, id: ObjectId, object: &PlacedObject) -> Result<Pose> {
        let pose = self.actors.pose(id).ok_or(MapEditorError::UnknownObject(id))?;
        Ok(object.logical_pose(pose))
    }

    fn describe_endpoint(&self, actor: ActorHandle) -> Result<EndpointDescriptor> {
        let object = self.registry.get(actor).ok_or(MapEditorError::UnknownObject(actor))?;
        let pose = self.logical_pose(actor, object)?;
        let room = self.save_room(actor, object.spawn_room, pose.position)?;
        Ok(EndpointDescriptor {
            position: relative_position(pose.position, &room),
            scale: pose.scale,
            room_type: room.room_type,
        })
    }

    /// Re-derive the descriptor of a persisted object from its live state
    fn describe(&self, id: ObjectId, object: &PlacedObject) -> Result<Descriptor> {
        match &object.kind {
            PlacedKind::LightController { descriptor } => {
                return Ok(Descriptor::LightController(descriptor.clone()));
            }
            PlacedKind::TeleportController(teleport) => {
                return Ok(Descriptor::Teleport(TeleportDescriptor {
                    entrance: self.describe_endpoint(teleport.entrance)?,
                    exit: self.describe_endpoint(teleport.exit)?,
                    cooldown: teleport.cooldown,
                    bidirectional: teleport.bidirectional,
                    visible: teleport.visible,
                }));
            }
            _ => {}
        }

        let pose = self.logical_pose(id, object)?;
        let room = self.save_room(id, object.spawn_room, pose.position)?;
        let at = LocalPlacement {
            position: relative_position(pose.position, &room),
            rotation: match object.kind.rotation() {
                Some(helper) => helper.local_euler(pose.rotation, &room),
                None => relative_rotation(pose.rotation, &room),
            },
            scale: pose.scale,
            room_type: room.room_type,
        };
        object.kind.descriptor_at(at).ok_or(MapEditorError::UnknownObject(id))
    }
}

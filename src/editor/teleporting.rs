//! Overlap handling for teleporter endpoints
//!
//! The host reports "actor X overlaps trigger Y" every time its physics
//! notices. Almost all of those are ignored; see `TeleportController` for
//! the firing rules.

use tracing::debug;
use super::events::TeleportEvent;
use super::registry::{ObjectId, PlacedKind, PlacedObject};
use super::scheduler::DeferredAction;
use super::MapEditor;
use crate::room::RoomGraph;
use crate::scene::{ActorFramework, ActorHandle};
use crate::teleport::TeleportState;

impl<R: RoomGraph, A: ActorFramework> MapEditor<R, A> {
    /// An actor overlaps a trigger. Returns the teleport, if one happened.
    pub fn on_overlap(&mut self, trigger: ObjectId, other: ActorHandle) -> Option<TeleportEvent> {
        let PlacedKind::TeleportEndpoint { controller, role } = self.registry.get(trigger)?.kind else {
            return None;
        };
        if !self.actors.is_traveler(other) {
            return None;
        }
        let now = self.scheduler.now();
        let from = self.actors.position(other)?;

        let Some(PlacedObject { kind: PlacedKind::TeleportController(teleport), .. }) =
            self.registry.get_mut(controller)
        else {
            return None;
        };
        let destination = teleport.try_teleport(role, now)?;
        let target = teleport.endpoint(destination);
        let to = match self.actors.position(target) {
            Some(position) => position,
            None => {
                debug!(%controller, "teleport destination is gone");
                return None;
            }
        };

        self.actors.set_position(other, to);
        let steps = teleport.on_teleported(controller);
        let interval = teleport.step_interval();

        // The first step runs right away, the rest are paced by the scheduler
        for step in steps {
            if let Some(next) = teleport.apply_spin_step(step, &mut self.actors) {
                self.scheduler.after(interval, DeferredAction::SpinStep(next));
            }
        }

        let event = TeleportEvent { controller, traveler: other, from, to };
        debug!(%controller, traveler = %other, ?role, "teleported");
        self.events.teleported.send(event);
        Some(event)
    }

    /// Logical state of a teleporter pair, by controller or endpoint id
    pub fn teleport_state(&self, id: ObjectId) -> Option<TeleportState> {
        let controller = match &self.registry.get(id)?.kind {
            PlacedKind::TeleportEndpoint { controller, .. } => *controller,
            _ => id,
        };
        match &self.registry.get(controller)?.kind {
            PlacedKind::TeleportController(teleport) => Some(teleport.state(self.scheduler.now())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::test_support::*;
    use crate::editor::OperatorId;
    use crate::room::RoomType;
    use crate::schematic::{EndpointDescriptor, TeleportDescriptor};
    use crate::teleport::{TeleportController, RESTING_SPIN_SPEED};
    use glam::Vec3;
    use std::time::Duration;

    fn teleporter(editor: &mut TestEditor, bidirectional: bool, visible: bool) -> (ObjectId, TeleportController) {
        let id = editor
            .spawn_teleport(TeleportDescriptor {
                entrance: EndpointDescriptor { room_type: RoomType::HczArmory, ..Default::default() },
                exit: EndpointDescriptor { room_type: RoomType::EzPcs, ..Default::default() },
                cooldown: 2.0,
                bidirectional,
                visible,
            })
            .unwrap();
        match &editor.registry().get(id).unwrap().kind {
            PlacedKind::TeleportController(teleport) => (id, teleport.clone()),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_traveler_is_moved_to_exit() {
        let (_dir, mut editor) = editor();
        let (controller, pair) = teleporter(&mut editor, false, false);
        let player = editor.actors_mut().spawn_traveler(Vec3::new(0.0, -100.0, 40.0));

        let event = editor.on_overlap(pair.entrance, player).unwrap();
        let exit = editor.actors().position(pair.exit).unwrap();
        assert_eq!(event.controller, controller);
        assert_eq!(event.to, exit);
        assert_eq!(editor.actors().position(player), Some(exit));
        assert_eq!(editor.events.teleported.len(), 1);
    }

    #[test]
    fn test_cooldown_at_1_9_and_2_1_seconds() {
        let (_dir, mut editor) = editor();
        let (controller, pair) = teleporter(&mut editor, true, false);
        let player = editor.actors_mut().spawn_traveler(Vec3::ZERO);

        assert!(editor.on_overlap(pair.entrance, player).is_some());
        assert_eq!(editor.teleport_state(controller), Some(TeleportState::OnCooldown));

        editor.advance(ms(1900));
        assert!(editor.on_overlap(pair.exit, player).is_none());

        editor.advance(ms(200));
        assert_eq!(editor.teleport_state(pair.exit), Some(TeleportState::Idle));
        let event = editor.on_overlap(pair.exit, player).unwrap();
        assert_eq!(event.to, editor.actors().position(pair.entrance).unwrap());
    }

    #[test]
    fn test_one_way_pair_ignores_exit_overlap() {
        let (_dir, mut editor) = editor();
        let (_, pair) = teleporter(&mut editor, false, false);
        let player = editor.actors_mut().spawn_traveler(Vec3::ZERO);

        for _ in 0..3 {
            assert!(editor.on_overlap(pair.exit, player).is_none());
            editor.advance(Duration::from_secs(5));
        }
        assert_eq!(editor.actors().position(player), Some(Vec3::ZERO));
    }

    #[test]
    fn test_non_travelers_and_other_triggers_are_ignored() {
        let (_dir, mut editor) = editor();
        let (controller, pair) = teleporter(&mut editor, true, true);
        let prop = pair.entrance_prop.unwrap();

        assert!(editor.on_overlap(pair.entrance, prop).is_none());
        let player = editor.actors_mut().spawn_traveler(Vec3::ZERO);
        assert!(editor.on_overlap(controller, player).is_none());
        assert!(editor.on_overlap(player, player).is_none());
    }

    #[test]
    fn test_animation_runs_through_scheduler() {
        let (_dir, mut editor) = editor();
        let (controller, pair) = teleporter(&mut editor, false, true);
        let player = editor.actors_mut().spawn_traveler(Vec3::ZERO);
        let prop = pair.exit_prop.unwrap();

        editor.on_overlap(pair.entrance, player).unwrap();
        assert_eq!(editor.teleport_state(controller), Some(TeleportState::Animating));
        assert!((editor.actors().spin_speed(prop).unwrap() - 192.0).abs() < 1e-3);

        // Halfway through the first phase (one step every 40ms)
        editor.advance(ms(500));
        let speed = editor.actors().spin_speed(prop).unwrap();
        assert!(speed < 100.0, "speed {}", speed);

        editor.advance(ms(1500));
        assert!((editor.actors().spin_speed(prop).unwrap() - RESTING_SPIN_SPEED).abs() < 1e-3);
        assert_eq!(editor.teleport_state(controller), Some(TeleportState::OnCooldown));
        assert!(editor.scheduler().is_empty());
    }

    #[test]
    fn test_deleting_pair_mid_animation_cancels_steps() {
        let (_dir, mut editor) = editor();
        let (controller, pair) = teleporter(&mut editor, false, true);
        let player = editor.actors_mut().spawn_traveler(Vec3::ZERO);
        editor.on_overlap(pair.entrance, player).unwrap();
        editor.advance(ms(100));
        assert!(!editor.scheduler().is_empty());

        let removed = editor.delete(OperatorId(1), pair.exit).unwrap();
        assert_eq!(removed, vec![controller, pair.entrance, pair.exit]);
        assert!(editor.scheduler().is_empty());
        for actor in [pair.entrance_prop.unwrap(), pair.exit_prop.unwrap(), pair.entrance, pair.exit, controller] {
            assert!(!editor.actors().exists(actor));
        }
        editor.advance(Duration::from_secs(5));
        assert!(editor.actors().exists(player));
    }
}

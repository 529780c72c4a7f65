//! Teleporter pairs
//!
//! A `TeleportController` owns two endpoint actors (entrance and exit) and
//! gates travel between them with a cooldown:
//! - Overlap at the entrance always counts; overlap at the exit only counts
//!   for bidirectional pairs
//! - A pair fires when it was never used, or when strictly more than the
//!   cooldown has elapsed since it last fired
//! - Firing relocates the traveler to the other endpoint and restarts the
//!   cooldown
//!
//! Visible pairs carry a spinning prop above each endpoint. After a
//! teleport the props slow to a halt over the first half of the cooldown and
//! spin back up over the second half. The animation is a chain of
//! `SpinStep`s, one step every `cooldown / 50`, and never gates travel.

use std::time::Duration;
use glam::Vec3;
use crate::scene::{ActorFramework, ActorHandle};

/// Angular speed of an idle prop, degrees per second
pub const RESTING_SPIN_SPEED: f32 = 200.0;

/// Steps in each half of the cooldown animation
pub const SPIN_STEPS_PER_PHASE: u32 = 25;

/// Steps in the whole animation
pub const SPIN_STEPS: u32 = SPIN_STEPS_PER_PHASE * 2;

/// Uniform scale of the spinning prop
pub const PROP_SCALE: f32 = 10.0;

/// Props hover this far below their endpoint
pub const PROP_DROP: Vec3 = Vec3::new(0.0, -1.0, 0.0);

/// Which side of a pair an endpoint is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointRole {
    Entrance,
    Exit,
}

impl EndpointRole {
    pub fn other(self) -> Self {
        match self {
            EndpointRole::Entrance => EndpointRole::Exit,
            EndpointRole::Exit => EndpointRole::Entrance,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EndpointRole::Entrance => "Entrance",
            EndpointRole::Exit => "Exit",
        }
    }
}

/// Logical state of a pair at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeleportState {
    /// Ready to fire
    Idle,
    /// Fired recently, overlaps are ignored
    OnCooldown,
    /// On cooldown with the props running their slow-down animation
    Animating,
}

/// One pending step of a prop's cooldown animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinStep {
    /// Controller object that owns the prop
    pub controller: ActorHandle,
    pub endpoint: EndpointRole,
    pub prop: ActorHandle,
    /// Zero-based index of this step
    pub step_index: u32,
    /// Steps left including this one
    pub remaining: u32,
    /// Animation generation the chain belongs to
    pub generation: u32,
}

impl SpinStep {
    /// Prop speed once this step has been applied
    ///
    /// The first half subtracts `resting / 25` per step down to zero, the
    /// second half adds it back up to `resting`.
    pub fn speed(&self) -> f32 {
        let delta = RESTING_SPIN_SPEED / SPIN_STEPS_PER_PHASE as f32;
        if self.step_index < SPIN_STEPS_PER_PHASE {
            RESTING_SPIN_SPEED - delta * (self.step_index + 1) as f32
        } else {
            delta * (self.step_index + 1 - SPIN_STEPS_PER_PHASE) as f32
        }
    }

    /// The step after this one, if any
    pub fn next(&self) -> Option<SpinStep> {
        if self.remaining <= 1 {
            return None;
        }
        Some(SpinStep {
            step_index: self.step_index + 1,
            remaining: self.remaining - 1,
            ..*self
        })
    }
}

/// Live state of a teleporter pair
#[derive(Debug, Clone, PartialEq)]
pub struct TeleportController {
    pub entrance: ActorHandle,
    pub exit: ActorHandle,
    pub entrance_prop: Option<ActorHandle>,
    pub exit_prop: Option<ActorHandle>,
    /// Seconds between two uses
    pub cooldown: f32,
    pub bidirectional: bool,
    pub visible: bool,
    last_used: Option<Duration>,
    animation_generation: u32,
    animating: bool,
}

impl TeleportController {
    pub fn new(entrance: ActorHandle, exit: ActorHandle, cooldown: f32, bidirectional: bool, visible: bool) -> Self {
        Self {
            entrance,
            exit,
            entrance_prop: None,
            exit_prop: None,
            cooldown,
            bidirectional,
            visible,
            last_used: None,
            animation_generation: 0,
            animating: false,
        }
    }

    pub fn endpoint(&self, role: EndpointRole) -> ActorHandle {
        match role {
            EndpointRole::Entrance => self.entrance,
            EndpointRole::Exit => self.exit,
        }
    }

    pub fn prop(&self, role: EndpointRole) -> Option<ActorHandle> {
        match role {
            EndpointRole::Entrance => self.entrance_prop,
            EndpointRole::Exit => self.exit_prop,
        }
    }

    pub fn props(&self) -> impl Iterator<Item = (EndpointRole, ActorHandle)> + '_ {
        [
            (EndpointRole::Entrance, self.entrance_prop),
            (EndpointRole::Exit, self.exit_prop),
        ]
        .into_iter()
        .filter_map(|(role, prop)| prop.map(|p| (role, p)))
    }

    /// Role of an endpoint actor within this pair
    pub fn role_of(&self, actor: ActorHandle) -> Option<EndpointRole> {
        if actor == self.entrance {
            Some(EndpointRole::Entrance)
        } else if actor == self.exit {
            Some(EndpointRole::Exit)
        } else {
            None
        }
    }

    pub fn cooldown_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.cooldown.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// Delay between two animation steps
    pub fn step_interval(&self) -> Duration {
        self.cooldown_duration() / SPIN_STEPS
    }

    pub fn last_used(&self) -> Option<Duration> {
        self.last_used
    }

    /// Whether an overlap at this endpoint may ever fire
    pub fn accepts(&self, role: EndpointRole) -> bool {
        role == EndpointRole::Entrance || self.bidirectional
    }

    /// Whether the cooldown has run out at `now`
    pub fn is_ready(&self, now: Duration) -> bool {
        match self.last_used {
            None => true,
            Some(last) => now.saturating_sub(last) > self.cooldown_duration(),
        }
    }

    pub fn state(&self, now: Duration) -> TeleportState {
        if self.is_ready(now) {
            TeleportState::Idle
        } else if self.animating {
            TeleportState::Animating
        } else {
            TeleportState::OnCooldown
        }
    }

    /// Handle an overlap by a traveler at one endpoint.
    ///
    /// Returns the destination endpoint and restarts the cooldown when the
    /// pair fires. The caller is responsible for checking the overlapping
    /// actor is a traveler.
    pub fn try_teleport(&mut self, from: EndpointRole, now: Duration) -> Option<EndpointRole> {
        if !self.accepts(from) || !self.is_ready(now) {
            return None;
        }
        self.last_used = Some(now);
        Some(from.other())
    }

    /// Start the cooldown animation after a teleport.
    ///
    /// Returns the first step of every prop's chain. Any chain still running
    /// from an earlier teleport is superseded.
    pub fn on_teleported(&mut self, controller: ActorHandle) -> Vec<SpinStep> {
        self.animation_generation = self.animation_generation.wrapping_add(1);
        if !self.visible {
            self.animating = false;
            return Vec::new();
        }
        let generation = self.animation_generation;
        let steps: Vec<SpinStep> = self
            .props()
            .map(|(endpoint, prop)| SpinStep {
                controller,
                endpoint,
                prop,
                step_index: 0,
                remaining: SPIN_STEPS,
                generation,
            })
            .collect();
        self.animating = !steps.is_empty();
        steps
    }

    /// Stop any running animation chain
    pub fn cancel_animation(&mut self) {
        self.animation_generation = self.animation_generation.wrapping_add(1);
        self.animating = false;
    }

    /// Apply one animation step to its prop.
    ///
    /// Returns the next step of the chain, or `None` when the chain is
    /// finished or has been cancelled (stale generation, prop gone).
    pub fn apply_spin_step<A: ActorFramework>(&mut self, step: SpinStep, actors: &mut A) -> Option<SpinStep> {
        if step.generation != self.animation_generation {
            return None;
        }
        if self.prop(step.endpoint) != Some(step.prop) || !actors.exists(step.prop) {
            return None;
        }
        actors.set_spin_speed(step.prop, step.speed());

        let next = step.next();
        if next.is_none() {
            self.animating = false;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ActorTemplate, SceneWorld};
    use crate::transform::Pose;

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    fn pair(world: &mut SceneWorld, bidirectional: bool, visible: bool) -> (ActorHandle, TeleportController) {
        let controller = world.instantiate(ActorTemplate::TeleportController, Pose::IDENTITY);
        let entrance = world.instantiate(ActorTemplate::TeleportEndpoint, Pose::IDENTITY);
        let exit = world.instantiate(ActorTemplate::TeleportEndpoint, Pose::IDENTITY);
        let mut teleport = TeleportController::new(entrance, exit, 2.0, bidirectional, visible);
        if visible {
            let a = world.instantiate(ActorTemplate::SpinningProp, Pose::IDENTITY);
            let b = world.instantiate(ActorTemplate::SpinningProp, Pose::IDENTITY);
            world.set_spin_speed(a, RESTING_SPIN_SPEED);
            world.set_spin_speed(b, RESTING_SPIN_SPEED);
            teleport.entrance_prop = Some(a);
            teleport.exit_prop = Some(b);
        }
        (controller, teleport)
    }

    #[test]
    fn test_cooldown_window() {
        let mut world = SceneWorld::new();
        let (_, mut teleport) = pair(&mut world, true, false);
        let t0 = secs(5.0);

        assert_eq!(teleport.state(t0), TeleportState::Idle);
        assert_eq!(teleport.try_teleport(EndpointRole::Entrance, t0), Some(EndpointRole::Exit));
        assert_eq!(teleport.state(t0 + secs(1.0)), TeleportState::OnCooldown);

        assert_eq!(teleport.try_teleport(EndpointRole::Entrance, t0 + secs(1.9)), None);
        assert_eq!(teleport.last_used(), Some(t0));

        let t1 = t0 + secs(2.1);
        assert_eq!(teleport.try_teleport(EndpointRole::Exit, t1), Some(EndpointRole::Entrance));
        assert_eq!(teleport.last_used(), Some(t1));
    }

    #[test]
    fn test_huge_cooldown_saturates() {
        let mut world = SceneWorld::new();
        let (_, mut teleport) = pair(&mut world, false, false);
        teleport.cooldown = 1.0e20;
        assert_eq!(teleport.cooldown_duration(), Duration::MAX);
        assert_eq!(teleport.step_interval(), Duration::MAX / SPIN_STEPS);

        assert_eq!(teleport.try_teleport(EndpointRole::Entrance, secs(1.0)), Some(EndpointRole::Exit));
        assert_eq!(teleport.try_teleport(EndpointRole::Entrance, secs(1.0e6)), None);
    }

    #[test]
    fn test_exactly_at_cooldown_does_not_fire() {
        let mut world = SceneWorld::new();
        let (_, mut teleport) = pair(&mut world, false, false);
        teleport.try_teleport(EndpointRole::Entrance, secs(0.0));
        assert_eq!(teleport.try_teleport(EndpointRole::Entrance, secs(2.0)), None);
    }

    #[test]
    fn test_one_way_pair_ignores_exit() {
        let mut world = SceneWorld::new();
        let (_, mut teleport) = pair(&mut world, false, false);

        assert!(!teleport.accepts(EndpointRole::Exit));
        assert_eq!(teleport.try_teleport(EndpointRole::Exit, secs(0.0)), None);
        assert_eq!(teleport.try_teleport(EndpointRole::Exit, secs(100.0)), None);
        assert_eq!(teleport.last_used(), None);
    }

    #[test]
    fn test_spin_speeds_ramp_down_then_up() {
        let step = |i| SpinStep {
            controller: ActorHandle::NULL,
            endpoint: EndpointRole::Entrance,
            prop: ActorHandle::NULL,
            step_index: i,
            remaining: SPIN_STEPS - i,
            generation: 0,
        };
        assert!((step(0).speed() - 192.0).abs() < 1e-3);
        assert!(step(24).speed().abs() < 1e-3);
        assert!((step(25).speed() - 8.0).abs() < 1e-3);
        assert!((step(49).speed() - RESTING_SPIN_SPEED).abs() < 1e-3);
        assert!(step(49).next().is_none());
        assert_eq!(step(10).next().map(|s| s.step_index), Some(11));
    }

    #[test]
    fn test_animation_chain_runs_to_completion() {
        let mut world = SceneWorld::new();
        let (controller, mut teleport) = pair(&mut world, false, true);
        teleport.try_teleport(EndpointRole::Entrance, secs(0.0));

        let mut chains = teleport.on_teleported(controller);
        assert_eq!(chains.len(), 2);
        assert_eq!(teleport.state(secs(0.5)), TeleportState::Animating);
        assert_eq!(teleport.step_interval(), Duration::from_millis(40));

        let mut applied = 0;
        while let Some(step) = chains.pop() {
            if let Some(next) = teleport.apply_spin_step(step, &mut world) {
                chains.push(next);
            }
            applied += 1;
        }
        assert_eq!(applied, SPIN_STEPS * 2);
        assert_eq!(teleport.state(secs(0.5)), TeleportState::OnCooldown);
        let prop = teleport.entrance_prop.unwrap();
        assert!((world.spin_speed(prop).unwrap() - RESTING_SPIN_SPEED).abs() < 1e-3);
    }

    #[test]
    fn test_stale_or_orphaned_steps_stop() {
        let mut world = SceneWorld::new();
        let (controller, mut teleport) = pair(&mut world, false, true);
        let first = teleport.on_teleported(controller);

        // A newer teleport supersedes the old chain
        teleport.on_teleported(controller);
        assert_eq!(teleport.apply_spin_step(first[0], &mut world), None);

        // A destroyed prop ends the chain
        let current = teleport.on_teleported(controller);
        world.destroy(current[0].prop);
        assert_eq!(teleport.apply_spin_step(current[0], &mut world), None);
        assert!(teleport.apply_spin_step(current[1], &mut world).is_some());

        teleport.cancel_animation();
        assert_eq!(teleport.apply_spin_step(current[1], &mut world), None);
    }

    #[test]
    fn test_invisible_pair_has_no_animation() {
        let mut world = SceneWorld::new();
        let (controller, mut teleport) = pair(&mut world, true, false);
        teleport.try_teleport(EndpointRole::Entrance, secs(0.0));
        assert!(teleport.on_teleported(controller).is_empty());
        assert_eq!(teleport.state(secs(1.0)), TeleportState::OnCooldown);
    }
}

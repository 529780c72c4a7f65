//! Transform Resolver
//!
//! Descriptors store poses relative to a room *type*. This module converts
//! them to world space against a concrete room instance and back again:
//! - Position: `room.transform_point(local)`, untouched on the surface
//! - Rotation: Euler degrees (Y, then X, then Z), pre-multiplied by the room
//!   rotation, untouched on the surface
//!
//! A rotation axis holding `RANDOM_ROTATION` is rolled uniformly in
//! `[0, 360)` before the room transform is applied. Rolling happens once per
//! spawn; the rolled value is what the live object carries afterwards.

use glam::{EulerRot, Quat, Vec3};
use rand::Rng;
use crate::room::Room;

/// Sentinel meaning "pick this axis at random on every spawn"
pub const RANDOM_ROTATION: f32 = -1.0;

/// Angles closer than this to a full turn are folded back to zero
const FULL_TURN_EPSILON: f32 = 1e-3;

/// Quaternion dot products this close to one count as the same orientation
const ORIENTATION_EPSILON: f32 = 1e-5;

/// Full world pose of an actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self { position, rotation, scale }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Self::IDENTITY }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Check whether an axis value is the randomize sentinel
pub fn is_random_axis(value: f32) -> bool {
    value == RANDOM_ROTATION
}

/// Which axes of an authored rotation carried the randomize sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomAxes {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl RandomAxes {
    /// Inspect an authored rotation
    pub fn of(rotation: Vec3) -> Self {
        Self {
            x: is_random_axis(rotation.x),
            y: is_random_axis(rotation.y),
            z: is_random_axis(rotation.z),
        }
    }

    pub fn any(&self) -> bool {
        self.x || self.y || self.z
    }

    /// Put the sentinel back on the randomized axes of a resolved rotation
    pub fn restore(&self, resolved: Vec3) -> Vec3 {
        Vec3::new(
            if self.x { RANDOM_ROTATION } else { resolved.x },
            if self.y { RANDOM_ROTATION } else { resolved.y },
            if self.z { RANDOM_ROTATION } else { resolved.z },
        )
    }
}

/// Result of resolving an authored rotation against a room
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRotation {
    /// Room-local Euler angles with every sentinel rolled
    pub euler: Vec3,
    /// World rotation
    pub rotation: Quat,
}

/// Roll every sentinel axis, leave fixed axes untouched.
pub fn resolve_euler<R: Rng>(rotation: Vec3, rng: &mut R) -> Vec3 {
    let mut roll = |value: f32| {
        if is_random_axis(value) {
            rng.gen_range(0.0..360.0)
        } else {
            value
        }
    };
    Vec3::new(roll(rotation.x), roll(rotation.y), roll(rotation.z))
}

/// Euler degrees (applied Z, then X, then Y) to a quaternion
pub fn euler_to_quat(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        degrees.y.to_radians(),
        degrees.x.to_radians(),
        degrees.z.to_radians(),
    )
}

/// Quaternion to Euler degrees, each axis normalized to `[0, 360)`
pub fn quat_to_euler(rotation: Quat) -> Vec3 {
    let (y, x, z) = rotation.to_euler(EulerRot::YXZ);
    Vec3::new(
        normalize_degrees(x.to_degrees()),
        normalize_degrees(y.to_degrees()),
        normalize_degrees(z.to_degrees()),
    )
}

/// Wrap an angle into `[0, 360)`
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 - FULL_TURN_EPSILON || wrapped < FULL_TURN_EPSILON {
        0.0
    } else {
        wrapped
    }
}

/// Room-local position to world position
pub fn resolve_position(local: Vec3, room: &Room) -> Vec3 {
    if room.room_type.is_surface() {
        local
    } else {
        room.transform_point(local)
    }
}

/// Room-local rotation (possibly with sentinels) to world rotation
pub fn resolve_rotation<R: Rng>(local: Vec3, room: &Room, rng: &mut R) -> ResolvedRotation {
    let euler = resolve_euler(local, rng);
    let rotation = if room.room_type.is_surface() {
        euler_to_quat(euler)
    } else {
        room.rotation * euler_to_quat(euler)
    };
    ResolvedRotation { euler, rotation }
}

/// World position back to room-local (inverse of `resolve_position`)
pub fn relative_position(world: Vec3, room: &Room) -> Vec3 {
    if room.room_type.is_surface() {
        world
    } else {
        room.inverse_transform_point(world)
    }
}

/// World rotation back to a room-local rotation
pub fn local_rotation(world: Quat, room: &Room) -> Quat {
    if room.room_type.is_surface() {
        world
    } else {
        room.rotation.inverse() * world
    }
}

/// World rotation back to room-local Euler degrees (inverse of `resolve_rotation`)
pub fn relative_rotation(world: Quat, room: &Room) -> Vec3 {
    quat_to_euler(local_rotation(world, room))
}

/// Whether two rotations face the same way, either quaternion sign
pub fn same_orientation(a: Quat, b: Quat) -> bool {
    a.dot(b).abs() > 1.0 - ORIENTATION_EPSILON
}

//! Physics - collaborator interface for vehicle motion
//!
//! The core never integrates gravity or resolves collisions itself; it
//! issues commands through [`PhysicsBody`] and reads the resulting pose
//! back. A real engine body (Rapier, PhysX bindings, ...) implements the
//! trait on its handle; [`KinematicBody`] is a minimal stand-in for
//! headless runs and tests.

use glam::{Quat, Vec3};

/// Motion primitives exposed by the physics collaborator.
///
/// Position and rotation deltas are applied kinematically (the engine moves
/// the body, sweeping collisions as it sees fit); impulses and velocity
/// writes go through the dynamic state.
pub trait PhysicsBody {
    fn position(&self) -> Vec3;
    fn orientation(&self) -> Quat;
    fn linear_velocity(&self) -> Vec3;

    /// Apply an instantaneous velocity change.
    fn apply_impulse(&mut self, impulse: Vec3);

    /// Translate the body by `delta` in world space.
    fn move_position_by(&mut self, delta: Vec3);

    /// Rotate the body by `delta` (applied on the right of the current
    /// orientation).
    fn move_rotation_by(&mut self, delta: Quat);

    fn set_linear_velocity(&mut self, velocity: Vec3);
    fn set_angular_velocity(&mut self, velocity: Vec3);
}

/// Store-only [`PhysicsBody`] with no integration of its own.
///
/// Impulses accumulate into the stored linear velocity; movement commands
/// mutate the pose directly. Nothing moves between commands.
#[derive(Debug, Clone)]
pub struct KinematicBody {
    position: Vec3,
    orientation: Quat,
    linear_velocity: Vec3,
    angular_velocity: Vec3,
}

impl KinematicBody {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }

    /// Current angular velocity (not part of the collaborator interface,
    /// which only writes it).
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }
}

impl Default for KinematicBody {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

impl PhysicsBody for KinematicBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn orientation(&self) -> Quat {
        self.orientation
    }

    fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    fn apply_impulse(&mut self, impulse: Vec3) {
        self.linear_velocity += impulse;
    }

    fn move_position_by(&mut self, delta: Vec3) {
        self.position += delta;
    }

    fn move_rotation_by(&mut self, delta: Quat) {
        self.orientation = (self.orientation * delta).normalize();
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linear_velocity = velocity;
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.angular_velocity = velocity;
    }
}

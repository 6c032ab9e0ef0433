//! Vehicle - locomotion, charge/drift/dash and the goal maneuver
//!
//! Owns one vehicle's motion state and converts per-frame control intent
//! plus internal charge/boost state into motion commands for the physics
//! collaborator. Knows nothing about race rules; the race state machine
//! gates it through the control-enable flag.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::physics::PhysicsBody;
use crate::presentation::{Cue, PresentationSink};
use crate::tasks::Span;

/// Vehicle tuning, immutable for the vehicle's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleConfig {
    /// Base forward speed (units/s).
    pub speed: f32,
    /// Base yaw rate (degrees/s).
    pub rotation_speed: f32,
    /// Upward impulse magnitude for a jump.
    pub jump_force: f32,
    /// Speed factor while charging without steering (heavy braking).
    pub charge_speed_multiplier_straight: f32,
    /// Speed factor while drift-charging (mild braking).
    pub charge_speed_multiplier_drift: f32,
    /// Yaw rate factor while drift-charging.
    pub charge_rotation_multiplier: f32,
    /// Charge cap (seconds of accumulated drift).
    pub max_charge_time: f32,
    /// Extra speed granted by a fully charged dash.
    pub boost_force: f32,
    /// Seconds the dash holds full strength.
    pub boost_duration: f32,
    /// Lerp rate of the post-dash slowdown.
    pub boost_decay_rate: f32,
    /// Steer magnitude below which the vehicle counts as going straight.
    pub steer_threshold: f32,
    /// Engine pitch at standstill.
    pub min_engine_pitch: f32,
    /// Engine pitch at top speed.
    pub max_engine_pitch: f32,
    /// Duration of the scripted finish maneuver.
    pub goal_maneuver_secs: f32,
    /// Yaw swept by the finish maneuver (degrees).
    pub goal_turn_degrees: f32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            speed: 10.0,
            rotation_speed: 120.0,
            jump_force: 5.0,
            charge_speed_multiplier_straight: 0.3,
            charge_speed_multiplier_drift: 0.8,
            charge_rotation_multiplier: 2.0,
            max_charge_time: 0.7,
            boost_force: 10.0,
            boost_duration: 0.3,
            boost_decay_rate: 2.0,
            steer_threshold: 0.1,
            min_engine_pitch: 1.0,
            max_engine_pitch: 2.0,
            goal_maneuver_secs: 0.3,
            goal_turn_degrees: -90.0,
        }
    }
}

impl VehicleConfig {
    /// Validate tuning values. Returns `Err` on out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("speed", self.speed)?;
        ConfigError::require_positive("rotation_speed", self.rotation_speed)?;
        ConfigError::require_positive("max_charge_time", self.max_charge_time)?;
        ConfigError::require_positive(
            "charge_speed_multiplier_straight",
            self.charge_speed_multiplier_straight,
        )?;
        ConfigError::require_positive(
            "charge_speed_multiplier_drift",
            self.charge_speed_multiplier_drift,
        )?;
        ConfigError::require_positive(
            "charge_rotation_multiplier",
            self.charge_rotation_multiplier,
        )?;
        ConfigError::require_positive("goal_maneuver_secs", self.goal_maneuver_secs)?;
        ConfigError::require_non_negative("jump_force", self.jump_force)?;
        ConfigError::require_non_negative("boost_force", self.boost_force)?;
        ConfigError::require_non_negative("boost_duration", self.boost_duration)?;
        ConfigError::require_non_negative("boost_decay_rate", self.boost_decay_rate)?;
        ConfigError::require_non_negative("steer_threshold", self.steer_threshold)?;
        ConfigError::require_non_negative("min_engine_pitch", self.min_engine_pitch)?;
        Ok(())
    }
}

/// Per-frame control intent, polled once per tick by the caller.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ControlIntent {
    /// Jump was pressed this frame (edge, not held).
    pub jump: bool,
    /// Steering axis in [-1, 1].
    pub steer: f32,
    /// Charge input held.
    pub charge: bool,
}

/// Scripted finish: velocity lerps to zero while the vehicle sweeps a
/// quarter turn. Advances once per frame until done; not cancellable.
#[derive(Debug, Clone)]
struct GoalManeuver {
    span: Span,
    start_velocity: Vec3,
    start_rotation: Quat,
    target_rotation: Quat,
    done: bool,
}

/// Single-vehicle motion controller.
#[derive(Debug)]
pub struct VehicleController {
    config: VehicleConfig,
    control_enabled: bool,
    is_charging: bool,
    charge_time: f32,
    full_charge_reached: bool,
    boost_velocity: f32,
    boost_timer: f32,
    engine_pitch: f32,
    /// Drive direction sign. Steering inversion below supports reverse,
    /// but intent currently always drives forward.
    drive_axis: f32,
    maneuver: Option<GoalManeuver>,
}

impl VehicleController {
    /// Create a controller with the given tuning. Fails fast on
    /// out-of-range values.
    pub fn new(config: VehicleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine_pitch = config.min_engine_pitch;
        Ok(Self {
            config,
            control_enabled: false,
            is_charging: false,
            charge_time: 0.0,
            full_charge_reached: false,
            boost_velocity: 0.0,
            boost_timer: 0.0,
            engine_pitch,
            drive_axis: 1.0,
            maneuver: None,
        })
    }

    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    pub fn control_enabled(&self) -> bool {
        self.control_enabled
    }

    /// Gate per-frame intent processing. Written only by the race state
    /// machine.
    pub fn set_control_enabled(&mut self, enabled: bool) {
        self.control_enabled = enabled;
    }

    pub fn is_charging(&self) -> bool {
        self.is_charging
    }

    pub fn charge_time(&self) -> f32 {
        self.charge_time
    }

    pub fn full_charge_reached(&self) -> bool {
        self.full_charge_reached
    }

    pub fn boost_velocity(&self) -> f32 {
        self.boost_velocity
    }

    pub fn engine_pitch(&self) -> f32 {
        self.engine_pitch
    }

    /// Whether the scripted finish has run to completion.
    pub fn goal_maneuver_done(&self) -> bool {
        self.maneuver.as_ref().is_some_and(|m| m.done)
    }

    /// Advance the vehicle by one frame.
    pub fn update(
        &mut self,
        dt: f32,
        intent: ControlIntent,
        body: &mut dyn PhysicsBody,
        sink: &mut dyn PresentationSink,
    ) {
        self.advance_maneuver(dt, body);

        if !self.control_enabled {
            // Engine winds down while the vehicle cannot be driven.
            self.engine_pitch = lerp(self.engine_pitch, 0.0, dt);
            sink.engine_pitch(self.engine_pitch);
            return;
        }

        if intent.jump {
            body.apply_impulse(Vec3::Y * self.config.jump_force);
        }

        self.handle_charge(dt, intent, sink);
        self.update_boost(dt);
        self.update_engine_pitch(body, sink);
        self.apply_motion(dt, intent, body, sink);
    }

    /// Begin the scripted finish. Invoked once by the race state machine on
    /// reaching the goal; repeat calls are ignored.
    pub fn trigger_goal_maneuver(
        &mut self,
        body: &dyn PhysicsBody,
        sink: &mut dyn PresentationSink,
    ) {
        if self.maneuver.is_some() {
            return;
        }
        sink.drive_effect(false);
        let start_rotation = body.orientation();
        self.maneuver = Some(GoalManeuver {
            span: Span::new(self.config.goal_maneuver_secs),
            start_velocity: start_rotation * Vec3::Z * self.config.speed,
            start_rotation,
            target_rotation: start_rotation
                * Quat::from_rotation_y(self.config.goal_turn_degrees.to_radians()),
            done: false,
        });
    }

    fn advance_maneuver(&mut self, dt: f32, body: &mut dyn PhysicsBody) {
        let Some(m) = self.maneuver.as_mut() else {
            return;
        };
        if m.done {
            return;
        }

        let t = m.span.advance(dt);
        let velocity = m.start_velocity.lerp(Vec3::ZERO, t);
        body.move_position_by(velocity * dt);

        let desired = m.start_rotation.slerp(m.target_rotation, t);
        let current = body.orientation();
        body.move_rotation_by(current.inverse() * desired);

        if t >= 1.0 {
            body.set_linear_velocity(Vec3::ZERO);
            body.set_angular_velocity(Vec3::ZERO);
            m.done = true;
        }
    }

    fn handle_charge(&mut self, dt: f32, intent: ControlIntent, sink: &mut dyn PresentationSink) {
        let turning = intent.steer.abs() > self.config.steer_threshold;

        if intent.charge {
            if !self.is_charging {
                sink.play_cue(Cue::ChargeStart);
                self.full_charge_reached = false;
            }
            self.is_charging = true;

            if turning {
                self.charge_time = (self.charge_time + dt).clamp(0.0, self.config.max_charge_time);

                if self.charge_time >= self.config.max_charge_time && !self.full_charge_reached {
                    sink.play_cue(Cue::ChargeFull);
                    self.full_charge_reached = true;
                    log::debug!("full charge");
                }
            }
            // The straight-line drain lives in apply_motion next to the
            // speed penalty it accompanies.

            sink.charge_pitch(1.0 + self.charge_time / self.config.max_charge_time);
        } else {
            if self.is_charging {
                sink.play_cue(Cue::ChargeEnd);

                if self.charge_time >= self.config.max_charge_time {
                    self.boost_velocity = self.config.boost_force;
                    self.boost_timer = self.config.boost_duration;
                    sink.play_cue(Cue::Dash);
                    log::debug!("dash");
                }
            }
            self.is_charging = false;
            self.charge_time = 0.0;
            self.full_charge_reached = false;
        }
    }

    fn update_boost(&mut self, dt: f32) {
        if self.boost_timer > 0.0 {
            self.boost_timer -= dt;
        } else {
            // Smooth braking back to normal speed after the dash window.
            self.boost_velocity = lerp(self.boost_velocity, 0.0, dt * self.config.boost_decay_rate);
        }
    }

    fn update_engine_pitch(&mut self, body: &dyn PhysicsBody, sink: &mut dyn PresentationSink) {
        let top_speed = self.config.speed + self.config.boost_force;
        let fraction = body.linear_velocity().length() / top_speed;
        self.engine_pitch = lerp(
            self.config.min_engine_pitch,
            self.config.max_engine_pitch,
            fraction,
        );
        sink.engine_pitch(self.engine_pitch);
    }

    fn apply_motion(
        &mut self,
        dt: f32,
        intent: ControlIntent,
        body: &mut dyn PhysicsBody,
        sink: &mut dyn PresentationSink,
    ) {
        let turning = intent.steer.abs() > self.config.steer_threshold;

        let mut current_speed = self.config.speed;
        let mut current_rot_speed = self.config.rotation_speed;

        if self.is_charging {
            if turning {
                // Drift: keep most of the speed, turn sharply, keep the charge.
                current_speed *= self.config.charge_speed_multiplier_drift;
                current_rot_speed *= self.config.charge_rotation_multiplier;
                sink.play_cue(Cue::Drift);
            } else {
                // Straight-line charging brakes hard and bleeds charge off.
                current_speed *= self.config.charge_speed_multiplier_straight;
                self.charge_time = (self.charge_time - dt).max(0.0);
            }
        }

        let forward_speed = current_speed + self.boost_velocity;
        let forward = body.orientation() * Vec3::Z;
        body.move_position_by(forward * self.drive_axis * forward_speed * dt);

        // Steering inverts when driving backward.
        let mut turn_direction = intent.steer;
        if self.drive_axis < 0.0 {
            turn_direction = -turn_direction;
        }
        let turn_degrees = turn_direction * current_rot_speed * dt;
        body.move_rotation_by(Quat::from_rotation_y(turn_degrees.to_radians()));
    }
}

/// Linear interpolation with `t` clamped to `[0, 1]`.
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Compact vehicle state for UI transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub position: Vec3,
    pub orientation: Quat,
    pub control_enabled: bool,
    pub is_charging: bool,
    pub charge_fraction: f32,
    pub boost_velocity: f32,
    pub engine_pitch: f32,
}

impl VehicleSnapshot {
    pub fn capture(vehicle: &VehicleController, body: &dyn PhysicsBody) -> Self {
        Self {
            position: body.position(),
            orientation: body.orientation(),
            control_enabled: vehicle.control_enabled,
            is_charging: vehicle.is_charging,
            charge_fraction: vehicle.charge_time / vehicle.config.max_charge_time,
            boost_velocity: vehicle.boost_velocity,
            engine_pitch: vehicle.engine_pitch,
        }
    }
}

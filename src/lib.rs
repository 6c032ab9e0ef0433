//! DriftDash - simulation core for a charge-and-dash racing mini-game
//!
//! A single-vehicle locomotion model (charge while drifting, release for a
//! dash) plus the race lifecycle around it: countdown, timing, goal/fall
//! detection and end-of-run transitions. Everything runs on a
//! single-threaded per-frame tick; multi-frame sequences (countdown stages,
//! the finish maneuver, delayed scene navigation) are cooperative tasks
//! advanced once per tick.
//!
//! Rendering, audio playback, input polling and physics integration stay
//! outside: the core reads a per-frame [`ControlIntent`], drives a
//! [`PhysicsBody`], and pushes presentation side effects through a
//! [`PresentationSink`].

pub mod error;
pub mod menu;
pub mod physics;
pub mod presentation;
pub mod race;
pub mod session;
pub mod tasks;
pub mod triggers;
pub mod vehicle;

pub use error::ConfigError;
pub use menu::TitleMenu;
pub use physics::{KinematicBody, PhysicsBody};
pub use presentation::{
    Cue, NullSink, PresentationEvent, PresentationSink, RecordingSink, SceneRequest,
};
pub use race::{format_race_time, RaceConfig, RacePhase, RaceSnapshot, RaceStateMachine};
pub use session::{RaceSession, SessionSnapshot};
pub use tasks::{Delay, Span};
pub use triggers::{FallVolume, GoalLine, TriggerEvent, PLAYER_TAG};
pub use vehicle::{ControlIntent, VehicleConfig, VehicleController, VehicleSnapshot};

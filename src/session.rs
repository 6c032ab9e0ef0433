//! Session - race wiring and the per-frame tick
//!
//! Owns the vehicle, the race state machine, the physics body handle and
//! the presentation sink, and sequences one frame of work. Trigger events
//! queued between frames are processed before the timer update of the same
//! frame, so the clock can never run past the instant of a terminating
//! event.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::physics::PhysicsBody;
use crate::presentation::{Cue, NullSink, PresentationSink};
use crate::race::{RaceConfig, RacePhase, RaceSnapshot, RaceStateMachine};
use crate::triggers::TriggerEvent;
use crate::vehicle::{ControlIntent, VehicleConfig, VehicleController, VehicleSnapshot};

/// A single race run from countdown to finish/fail.
pub struct RaceSession {
    vehicle: VehicleController,
    race: RaceStateMachine,
    body: Box<dyn PhysicsBody>,
    sink: Box<dyn PresentationSink>,
    /// Trigger events received since the last tick.
    pending: Vec<TriggerEvent>,
    started: bool,
    last_tick: Instant,
}

impl RaceSession {
    /// Create a session. A missing presentation sink is logged and replaced
    /// with a no-op one; configuration errors fail fast.
    pub fn new(
        vehicle_config: VehicleConfig,
        race_config: RaceConfig,
        body: Box<dyn PhysicsBody>,
        sink: Option<Box<dyn PresentationSink>>,
    ) -> Result<Self, ConfigError> {
        let sink = sink.unwrap_or_else(|| {
            log::warn!("no presentation sink attached; UI and audio cues are dropped");
            Box::new(NullSink)
        });

        Ok(Self {
            vehicle: VehicleController::new(vehicle_config)?,
            race: RaceStateMachine::new(race_config)?,
            body,
            sink,
            pending: Vec::new(),
            started: false,
            last_tick: Instant::now(),
        })
    }

    /// Kick off the engine loop, the drive effect and the countdown.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.sink.play_cue(Cue::EngineStart);
        self.sink.drive_effect(true);
        self.race.start(self.sink.as_mut());
        self.last_tick = Instant::now();
    }

    /// Advance one frame with an explicit delta time.
    pub fn tick(&mut self, dt: f32, intent: ControlIntent) {
        // Queued trigger events land before the timer update so the clock
        // stops at the instant of the terminating event.
        for event in std::mem::take(&mut self.pending) {
            match event {
                TriggerEvent::Goal => {
                    self.race
                        .on_goal(&mut self.vehicle, self.body.as_ref(), self.sink.as_mut())
                }
                TriggerEvent::Fall => self.race.on_fail(&mut self.vehicle, self.sink.as_mut()),
            }
        }

        self.race.update(dt, &mut self.vehicle, self.sink.as_mut());
        self.vehicle
            .update(dt, intent, self.body.as_mut(), self.sink.as_mut());
    }

    /// Advance one frame using wall-clock time since the previous call.
    pub fn advance(&mut self, intent: ControlIntent) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        self.tick(dt, intent);
    }

    /// Queue a trigger event for the next tick.
    pub fn notify(&mut self, event: TriggerEvent) {
        self.pending.push(event);
    }

    /// Goal line crossed. Safe to call repeatedly or with no active race.
    pub fn on_goal(&mut self) {
        self.notify(TriggerEvent::Goal);
    }

    /// Fall detected. Safe to call repeatedly or with no active race.
    pub fn on_fail(&mut self) {
        self.notify(TriggerEvent::Fall);
    }

    /// Retry button: click cue now, scene reload after the delay.
    pub fn request_retry(&mut self) {
        self.race.request_retry(self.sink.as_mut());
    }

    /// Title button: click cue now, title scene after the delay.
    pub fn request_title(&mut self) {
        self.race.request_title(self.sink.as_mut());
    }

    pub fn phase(&self) -> RacePhase {
        self.race.phase()
    }

    pub fn race(&self) -> &RaceStateMachine {
        &self.race
    }

    pub fn vehicle(&self) -> &VehicleController {
        &self.vehicle
    }

    pub fn body(&self) -> &dyn PhysicsBody {
        self.body.as_ref()
    }

    /// Compact session state for UI transfer.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            race: self.race.snapshot(),
            vehicle: VehicleSnapshot::capture(&self.vehicle, self.body.as_ref()),
        }
    }
}

/// Compact session state for UI transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub race: RaceSnapshot,
    pub vehicle: VehicleSnapshot,
}

//! Presentation - outward event interface
//!
//! Everything the core wants shown, played or loaded goes through
//! [`PresentationSink`]: UI text, audio cues, camera follow, scene
//! navigation. Calls are one-directional; the core never reads presentation
//! state back. Every method has a no-op default so an embedder implements
//! only what it renders.

use serde::{Deserialize, Serialize};

/// One-shot audio/effect cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    /// Engine loop starts with the session.
    EngineStart,
    /// Charge input pressed.
    ChargeStart,
    /// Charge input released.
    ChargeEnd,
    /// Charge reached the cap (once per charge cycle).
    ChargeFull,
    /// Fully charged release.
    Dash,
    /// Drift-charging tick (skid effect).
    Drift,
    Goal,
    Fail,
    /// UI button click.
    Click,
}

/// Scene navigation requests emitted after a click delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneRequest {
    /// Reload the active race scene (retry).
    ReloadCurrent,
    /// Navigate to the title scene.
    Title,
    /// Navigate from the title menu into the race scene.
    Race,
}

/// Receiver for presentation side effects.
pub trait PresentationSink {
    /// Show a countdown stage ("3", "2", "1", "Go!").
    fn countdown_text(&mut self, _text: &str) {}

    /// Hide the countdown display.
    fn countdown_cleared(&mut self) {}

    /// Update the live race timer display.
    fn timer_text(&mut self, _text: &str) {}

    /// Swap the live timer for the result view with the frozen time.
    fn show_finish_result(&mut self, _time_text: &str) {}

    /// Swap to the result view with the failure title and message.
    fn show_fail_result(&mut self, _title: &str, _message: &str) {}

    fn play_cue(&mut self, _cue: Cue) {}

    /// Engine loop pitch for the current frame.
    fn engine_pitch(&mut self, _pitch: f32) {}

    /// Charge loop pitch while charging.
    fn charge_pitch(&mut self, _pitch: f32) {}

    /// Toggle the always-on driving effect.
    fn drive_effect(&mut self, _active: bool) {}

    /// Stop the camera rig from following the vehicle.
    fn detach_camera(&mut self) {}

    fn load_scene(&mut self, _request: SceneRequest) {}
}

/// Sink used when no presentation collaborator is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {}

/// Everything a [`RecordingSink`] captures, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationEvent {
    CountdownText(String),
    CountdownCleared,
    TimerText(String),
    FinishResult(String),
    FailResult { title: String, message: String },
    Cue(Cue),
    EnginePitch(f32),
    ChargePitch(f32),
    DriveEffect(bool),
    CameraDetached,
    Scene(SceneRequest),
}

/// Sink that records every call, for headless runs and assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<PresentationEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of recorded cues of the given kind.
    pub fn cue_count(&self, cue: Cue) -> usize {
        self.events
            .iter()
            .filter(|ev| matches!(ev, PresentationEvent::Cue(c) if *c == cue))
            .count()
    }

    /// Last recorded timer text, if any.
    pub fn last_timer_text(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|ev| match ev {
            PresentationEvent::TimerText(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

impl PresentationSink for RecordingSink {
    fn countdown_text(&mut self, text: &str) {
        self.events
            .push(PresentationEvent::CountdownText(text.to_owned()));
    }

    fn countdown_cleared(&mut self) {
        self.events.push(PresentationEvent::CountdownCleared);
    }

    fn timer_text(&mut self, text: &str) {
        self.events
            .push(PresentationEvent::TimerText(text.to_owned()));
    }

    fn show_finish_result(&mut self, time_text: &str) {
        self.events
            .push(PresentationEvent::FinishResult(time_text.to_owned()));
    }

    fn show_fail_result(&mut self, title: &str, message: &str) {
        self.events.push(PresentationEvent::FailResult {
            title: title.to_owned(),
            message: message.to_owned(),
        });
    }

    fn play_cue(&mut self, cue: Cue) {
        self.events.push(PresentationEvent::Cue(cue));
    }

    fn engine_pitch(&mut self, pitch: f32) {
        self.events.push(PresentationEvent::EnginePitch(pitch));
    }

    fn charge_pitch(&mut self, pitch: f32) {
        self.events.push(PresentationEvent::ChargePitch(pitch));
    }

    fn drive_effect(&mut self, active: bool) {
        self.events.push(PresentationEvent::DriveEffect(active));
    }

    fn detach_camera(&mut self) {
        self.events.push(PresentationEvent::CameraDetached);
    }

    fn load_scene(&mut self, request: SceneRequest) {
        self.events.push(PresentationEvent::Scene(request));
    }
}

/// Shared sink handle, so one sink can serve several owners (session,
/// title menu, embedder-side inspection).
impl<S: PresentationSink> PresentationSink for std::rc::Rc<std::cell::RefCell<S>> {
    fn countdown_text(&mut self, text: &str) {
        self.borrow_mut().countdown_text(text);
    }

    fn countdown_cleared(&mut self) {
        self.borrow_mut().countdown_cleared();
    }

    fn timer_text(&mut self, text: &str) {
        self.borrow_mut().timer_text(text);
    }

    fn show_finish_result(&mut self, time_text: &str) {
        self.borrow_mut().show_finish_result(time_text);
    }

    fn show_fail_result(&mut self, title: &str, message: &str) {
        self.borrow_mut().show_fail_result(title, message);
    }

    fn play_cue(&mut self, cue: Cue) {
        self.borrow_mut().play_cue(cue);
    }

    fn engine_pitch(&mut self, pitch: f32) {
        self.borrow_mut().engine_pitch(pitch);
    }

    fn charge_pitch(&mut self, pitch: f32) {
        self.borrow_mut().charge_pitch(pitch);
    }

    fn drive_effect(&mut self, active: bool) {
        self.borrow_mut().drive_effect(active);
    }

    fn detach_camera(&mut self) {
        self.borrow_mut().detach_camera();
    }

    fn load_scene(&mut self, request: SceneRequest) {
        self.borrow_mut().load_scene(request);
    }
}

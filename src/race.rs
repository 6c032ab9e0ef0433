//! Race - lifecycle state machine, countdown and timing
//!
//! Sequences the pre-race countdown, accumulates the race timer, reacts to
//! goal/fall trigger events and drives the end-of-run presentation. The
//! vehicle is gated through its control-enable flag, which only this state
//! machine writes.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::physics::PhysicsBody;
use crate::presentation::{Cue, PresentationSink, SceneRequest};
use crate::tasks::Delay;
use crate::vehicle::VehicleController;

/// Countdown stage labels, in display order.
const COUNTDOWN_STAGES: [&str; 4] = ["3", "2", "1", "Go!"];

/// Result view text for a failed race.
const FAIL_TITLE: &str = "GameOver";
const FAIL_MESSAGE: &str = "Fell into the abyss...";

/// Race lifecycle phase.
///
/// `Countdown` is initial; `Finished` and `Failed` are terminal and only
/// reachable from `Racing`. Leaving a terminal phase takes a full reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    Countdown,
    Racing,
    Finished,
    Failed,
}

/// Race sequencing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Seconds each countdown stage is held.
    pub countdown_stage_secs: f32,
    /// Seconds after "Go!" before the countdown display is cleared.
    pub countdown_clear_secs: f32,
    /// Seconds between a navigation click and the scene request.
    pub nav_delay_secs: f32,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            countdown_stage_secs: 0.5,
            countdown_clear_secs: 0.5,
            nav_delay_secs: 0.5,
        }
    }
}

impl RaceConfig {
    /// Validate sequencing values. Returns `Err` on out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("countdown_stage_secs", self.countdown_stage_secs)?;
        ConfigError::require_non_negative("countdown_clear_secs", self.countdown_clear_secs)?;
        ConfigError::require_non_negative("nav_delay_secs", self.nav_delay_secs)?;
        Ok(())
    }
}

/// Race-wide state machine.
#[derive(Debug)]
pub struct RaceStateMachine {
    config: RaceConfig,
    phase: RacePhase,
    /// Race time in seconds. Accumulates only while `Racing`.
    elapsed: f32,
    started: bool,
    countdown_stage: usize,
    stage_remaining: f32,
    countdown_clear: Option<Delay>,
    nav_requests: Vec<(Delay, SceneRequest)>,
}

impl RaceStateMachine {
    /// Create a race in the countdown phase. Fails fast on out-of-range
    /// configuration.
    pub fn new(config: RaceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            phase: RacePhase::Countdown,
            elapsed: 0.0,
            started: false,
            countdown_stage: 0,
            stage_remaining: 0.0,
            countdown_clear: None,
            nav_requests: Vec::new(),
        })
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Current race time as `MM:SS.CC`.
    pub fn formatted_time(&self) -> String {
        format_race_time(self.elapsed)
    }

    /// Begin the countdown. Runs exactly once per race instance; repeat
    /// calls are ignored.
    pub fn start(&mut self, sink: &mut dyn PresentationSink) {
        if self.started {
            log::debug!("countdown already started");
            return;
        }
        self.started = true;
        self.stage_remaining = self.config.countdown_stage_secs;
        sink.countdown_text(COUNTDOWN_STAGES[0]);
        log::info!("countdown started");
    }

    /// Advance the race by one frame.
    pub fn update(
        &mut self,
        dt: f32,
        vehicle: &mut VehicleController,
        sink: &mut dyn PresentationSink,
    ) {
        // Lingering timed tasks first, so a task created during this tick
        // starts counting on the next one.
        self.advance_timed_tasks(dt, sink);

        match self.phase {
            RacePhase::Countdown => self.advance_countdown(dt, vehicle, sink),
            RacePhase::Racing => {
                self.elapsed += dt;
                sink.timer_text(&format_race_time(self.elapsed));
            }
            RacePhase::Finished | RacePhase::Failed => {}
        }
    }

    /// Goal line crossed. No-op unless the race is running; repeated and
    /// late triggers are expected and ignored.
    pub fn on_goal(
        &mut self,
        vehicle: &mut VehicleController,
        body: &dyn PhysicsBody,
        sink: &mut dyn PresentationSink,
    ) {
        if self.phase != RacePhase::Racing {
            return;
        }
        self.phase = RacePhase::Finished;

        sink.detach_camera();
        vehicle.set_control_enabled(false);
        vehicle.trigger_goal_maneuver(body, sink);
        sink.play_cue(Cue::Goal);
        sink.show_finish_result(&format_race_time(self.elapsed));
        log::info!("race finished in {}", format_race_time(self.elapsed));
    }

    /// Fall volume entered. No-op unless the race is running; mutually
    /// exclusive with a finish.
    pub fn on_fail(&mut self, vehicle: &mut VehicleController, sink: &mut dyn PresentationSink) {
        if self.phase != RacePhase::Racing {
            return;
        }
        self.phase = RacePhase::Failed;

        sink.detach_camera();
        vehicle.set_control_enabled(false);
        sink.play_cue(Cue::Fail);
        sink.show_fail_result(FAIL_TITLE, FAIL_MESSAGE);
        log::info!("race failed at {}", format_race_time(self.elapsed));
    }

    /// Reload the current race scene after the click cue finishes.
    pub fn request_retry(&mut self, sink: &mut dyn PresentationSink) {
        self.request_navigation(SceneRequest::ReloadCurrent, sink);
    }

    /// Navigate to the title scene after the click cue finishes.
    pub fn request_title(&mut self, sink: &mut dyn PresentationSink) {
        self.request_navigation(SceneRequest::Title, sink);
    }

    fn request_navigation(&mut self, request: SceneRequest, sink: &mut dyn PresentationSink) {
        sink.play_cue(Cue::Click);
        self.nav_requests
            .push((Delay::new(self.config.nav_delay_secs), request));
    }

    fn advance_timed_tasks(&mut self, dt: f32, sink: &mut dyn PresentationSink) {
        if let Some(clear) = self.countdown_clear.as_mut() {
            if clear.tick(dt) {
                sink.countdown_cleared();
                self.countdown_clear = None;
            }
        }

        // Fire-and-forget navigation continuations.
        self.nav_requests.retain_mut(|(delay, request)| {
            if delay.tick(dt) {
                sink.load_scene(*request);
                false
            } else {
                true
            }
        });
    }

    fn advance_countdown(
        &mut self,
        dt: f32,
        vehicle: &mut VehicleController,
        sink: &mut dyn PresentationSink,
    ) {
        if !self.started {
            return;
        }

        self.stage_remaining -= dt;
        while self.stage_remaining <= 0.0 && self.phase == RacePhase::Countdown {
            self.countdown_stage += 1;
            sink.countdown_text(COUNTDOWN_STAGES[self.countdown_stage]);

            if self.countdown_stage == COUNTDOWN_STAGES.len() - 1 {
                // "Go!": the race is on. Leftover frame time is not
                // credited to the timer.
                self.phase = RacePhase::Racing;
                vehicle.set_control_enabled(true);
                self.countdown_clear = Some(Delay::new(self.config.countdown_clear_secs));
                log::info!("race started");
            } else {
                self.stage_remaining += self.config.countdown_stage_secs;
            }
        }
    }

    /// Compact race state for UI transfer.
    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            phase: self.phase,
            elapsed_time: self.elapsed,
            timer_text: format_race_time(self.elapsed),
        }
    }
}

/// Compact race state for UI transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub phase: RacePhase,
    pub elapsed_time: f32,
    pub timer_text: String,
}

/// Format a race time as `MM:SS.CC`, two digits each, truncating to the
/// hundredth (no rounding).
pub fn format_race_time(elapsed: f32) -> String {
    let minutes = (elapsed / 60.0).floor() as u32;
    let seconds = (elapsed % 60.0).floor() as u32;
    let hundredths = ((elapsed * 100.0).floor() as u32) % 100;
    format!("{minutes:02}:{seconds:02}.{hundredths:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::KinematicBody;
    use crate::presentation::{PresentationEvent, RecordingSink};
    use crate::vehicle::VehicleConfig;
    use approx::assert_relative_eq;

    fn machine() -> RaceStateMachine {
        RaceStateMachine::new(RaceConfig::default()).unwrap()
    }

    fn test_vehicle() -> VehicleController {
        VehicleController::new(VehicleConfig::default()).unwrap()
    }

    /// Run the countdown through "Go!".
    fn race_to_racing(
        race: &mut RaceStateMachine,
        vehicle: &mut VehicleController,
        sink: &mut RecordingSink,
    ) {
        race.start(sink);
        for _ in 0..3 {
            race.update(0.5, vehicle, sink);
        }
        assert_eq!(race.phase(), RacePhase::Racing);
    }

    #[test]
    fn rejects_out_of_range_config() {
        let config = RaceConfig {
            countdown_stage_secs: 0.0,
            ..RaceConfig::default()
        };
        assert!(RaceStateMachine::new(config).is_err());

        let config = RaceConfig {
            nav_delay_secs: -0.5,
            ..RaceConfig::default()
        };
        assert!(RaceStateMachine::new(config).is_err());
    }

    #[test]
    fn formats_time_with_truncation() {
        assert_eq!(format_race_time(65.23), "01:05.23");
        assert_eq!(format_race_time(9.005), "00:09.00");
        assert_eq!(format_race_time(0.0), "00:00.00");
        assert_eq!(format_race_time(59.999), "00:59.99");
        assert_eq!(format_race_time(600.0), "10:00.00");
    }

    #[test]
    fn countdown_emits_stages_in_order_then_clears() {
        let mut race = machine();
        let mut vehicle = test_vehicle();
        let mut sink = RecordingSink::new();

        race.start(&mut sink);
        assert_eq!(race.phase(), RacePhase::Countdown);
        assert!(!vehicle.control_enabled());

        for _ in 0..3 {
            race.update(0.5, &mut vehicle, &mut sink);
        }
        let stages: Vec<&str> = sink
            .events
            .iter()
            .filter_map(|ev| match ev {
                PresentationEvent::CountdownText(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(stages, vec!["3", "2", "1", "Go!"]);
        assert_eq!(race.phase(), RacePhase::Racing);
        assert!(vehicle.control_enabled());
        assert_relative_eq!(race.elapsed(), 0.0);

        // The countdown display goes away shortly after "Go!".
        assert!(!sink.events.contains(&PresentationEvent::CountdownCleared));
        race.update(0.5, &mut vehicle, &mut sink);
        assert!(sink.events.contains(&PresentationEvent::CountdownCleared));
    }

    #[test]
    fn oversized_tick_runs_whole_countdown() {
        let mut race = machine();
        let mut vehicle = test_vehicle();
        let mut sink = RecordingSink::new();

        race.start(&mut sink);
        race.update(5.0, &mut vehicle, &mut sink);

        assert_eq!(race.phase(), RacePhase::Racing);
        assert!(vehicle.control_enabled());
        // Leftover frame time is not credited to the timer.
        assert_relative_eq!(race.elapsed(), 0.0);
    }

    #[test]
    fn start_runs_once_per_instance() {
        let mut race = machine();
        let mut sink = RecordingSink::new();

        race.start(&mut sink);
        race.start(&mut sink);
        let stage_count = sink
            .events
            .iter()
            .filter(|ev| matches!(ev, PresentationEvent::CountdownText(_)))
            .count();
        assert_eq!(stage_count, 1);
    }

    #[test]
    fn ticking_before_start_does_nothing() {
        let mut race = machine();
        let mut vehicle = test_vehicle();
        let mut sink = RecordingSink::new();

        race.update(10.0, &mut vehicle, &mut sink);
        assert_eq!(race.phase(), RacePhase::Countdown);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn timer_accumulates_only_while_racing() {
        let mut race = machine();
        let mut vehicle = test_vehicle();
        let mut sink = RecordingSink::new();
        race_to_racing(&mut race, &mut vehicle, &mut sink);

        for _ in 0..10 {
            race.update(0.1, &mut vehicle, &mut sink);
        }
        assert_relative_eq!(race.elapsed(), 1.0, epsilon = 1e-5);
        assert_eq!(sink.last_timer_text(), Some("00:01.00"));

        race.on_fail(&mut vehicle, &mut sink);
        let frozen = race.elapsed();
        for _ in 0..10 {
            race.update(0.1, &mut vehicle, &mut sink);
        }
        assert_relative_eq!(race.elapsed(), frozen);
    }

    #[test]
    fn goal_is_idempotent() {
        let mut race = machine();
        let mut vehicle = test_vehicle();
        let mut sink = RecordingSink::new();
        let body = KinematicBody::default();
        race_to_racing(&mut race, &mut vehicle, &mut sink);

        race.update(0.5, &mut vehicle, &mut sink);
        race.on_goal(&mut vehicle, &body, &mut sink);

        assert_eq!(race.phase(), RacePhase::Finished);
        assert!(!vehicle.control_enabled());
        let elapsed = race.elapsed();
        let events_len = sink.events.len();

        // A second trigger while already finished changes nothing.
        race.on_goal(&mut vehicle, &body, &mut sink);
        assert_eq!(race.phase(), RacePhase::Finished);
        assert_relative_eq!(race.elapsed(), elapsed);
        assert_eq!(sink.events.len(), events_len);
    }

    #[test]
    fn finished_and_failed_are_mutually_exclusive() {
        let mut sink = RecordingSink::new();
        let body = KinematicBody::default();

        // Goal first, then a late fall trigger.
        let mut race = machine();
        let mut vehicle = test_vehicle();
        race_to_racing(&mut race, &mut vehicle, &mut sink);
        race.on_goal(&mut vehicle, &body, &mut sink);
        race.on_fail(&mut vehicle, &mut sink);
        assert_eq!(race.phase(), RacePhase::Finished);

        // Fall first, then a late goal trigger.
        let mut race = machine();
        let mut vehicle = test_vehicle();
        race_to_racing(&mut race, &mut vehicle, &mut sink);
        race.on_fail(&mut vehicle, &mut sink);
        race.on_goal(&mut vehicle, &body, &mut sink);
        assert_eq!(race.phase(), RacePhase::Failed);
    }

    #[test]
    fn triggers_during_countdown_are_ignored() {
        let mut race = machine();
        let mut vehicle = test_vehicle();
        let mut sink = RecordingSink::new();
        let body = KinematicBody::default();

        race.start(&mut sink);
        race.on_goal(&mut vehicle, &body, &mut sink);
        race.on_fail(&mut vehicle, &mut sink);
        assert_eq!(race.phase(), RacePhase::Countdown);
    }

    #[test]
    fn goal_shows_frozen_time_and_plays_cue() {
        let mut race = machine();
        let mut vehicle = test_vehicle();
        let mut sink = RecordingSink::new();
        let body = KinematicBody::default();
        race_to_racing(&mut race, &mut vehicle, &mut sink);

        for _ in 0..13 {
            race.update(0.1, &mut vehicle, &mut sink);
        }
        race.on_goal(&mut vehicle, &body, &mut sink);

        assert_eq!(sink.cue_count(Cue::Goal), 1);
        let result = sink.events.iter().find_map(|ev| match ev {
            PresentationEvent::FinishResult(text) => Some(text.clone()),
            _ => None,
        });
        assert_eq!(result.as_deref(), Some(race.formatted_time().as_str()));
        assert!(sink.events.contains(&PresentationEvent::CameraDetached));
    }

    #[test]
    fn fail_shows_fixed_message() {
        let mut race = machine();
        let mut vehicle = test_vehicle();
        let mut sink = RecordingSink::new();
        race_to_racing(&mut race, &mut vehicle, &mut sink);

        race.on_fail(&mut vehicle, &mut sink);

        assert_eq!(sink.cue_count(Cue::Fail), 1);
        assert!(sink.events.contains(&PresentationEvent::FailResult {
            title: "GameOver".into(),
            message: "Fell into the abyss...".into(),
        }));
        assert!(sink.events.contains(&PresentationEvent::CameraDetached));
    }

    #[test]
    fn navigation_requests_fire_after_delay() {
        let mut race = machine();
        let mut vehicle = test_vehicle();
        let mut sink = RecordingSink::new();

        race.request_retry(&mut sink);
        assert_eq!(sink.cue_count(Cue::Click), 1);
        assert!(!sink
            .events
            .iter()
            .any(|ev| matches!(ev, PresentationEvent::Scene(_))));

        race.update(0.25, &mut vehicle, &mut sink);
        assert!(!sink
            .events
            .iter()
            .any(|ev| matches!(ev, PresentationEvent::Scene(_))));

        race.update(0.25, &mut vehicle, &mut sink);
        assert!(sink
            .events
            .contains(&PresentationEvent::Scene(SceneRequest::ReloadCurrent)));
    }

    #[test]
    fn title_request_targets_title_scene() {
        let mut race = machine();
        let mut vehicle = test_vehicle();
        let mut sink = RecordingSink::new();

        race.request_title(&mut sink);
        race.update(1.0, &mut vehicle, &mut sink);
        assert!(sink
            .events
            .contains(&PresentationEvent::Scene(SceneRequest::Title)));
    }

    #[test]
    fn snapshot_carries_phase_and_time() {
        let mut race = machine();
        let mut vehicle = test_vehicle();
        let mut sink = RecordingSink::new();
        race_to_racing(&mut race, &mut vehicle, &mut sink);
        race.update(0.5, &mut vehicle, &mut sink);

        let snapshot = race.snapshot();
        assert_eq!(snapshot.phase, RacePhase::Racing);
        assert_relative_eq!(snapshot.elapsed_time, 0.5);
        assert_eq!(snapshot.timer_text, "00:00.50");
    }
}

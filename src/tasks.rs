//! Tasks - cooperative per-tick timers
//!
//! The multi-frame operations in this crate (countdown stages, the goal
//! maneuver, delayed scene navigation) never block a tick. Each one stores
//! its remaining duration or progress and is advanced once per frame until
//! its condition is met. None of them are cancellable mid-flight.

/// One-shot delay that fires exactly once when its duration elapses.
#[derive(Debug, Clone)]
pub struct Delay {
    remaining: f32,
    fired: bool,
}

impl Delay {
    /// Create a delay that fires after `secs` seconds of ticking.
    pub fn new(secs: f32) -> Self {
        Self {
            remaining: secs,
            fired: false,
        }
    }

    /// Advance by `dt`. Returns `true` on the tick the delay elapses and
    /// `false` on every other tick, including all ticks after firing.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.fired {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.fired = true;
            return true;
        }
        false
    }

    /// Whether the delay has already fired.
    pub fn is_done(&self) -> bool {
        self.fired
    }
}

/// Fixed-duration progress tracker yielding a normalized `t` in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct Span {
    elapsed: f32,
    duration: f32,
}

impl Span {
    /// Create a span of `duration` seconds. A non-positive duration is
    /// complete immediately.
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration,
        }
    }

    /// Advance by `dt` and return the clamped progress.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;
        self.progress()
    }

    /// Current progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Whether the span has run to completion.
    pub fn is_done(&self) -> bool {
        self.progress() >= 1.0
    }
}

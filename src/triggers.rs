//! Triggers - goal line and fall volume detectors
//!
//! Thin, stateless translators from a world collision ("a tagged body
//! entered my volume") into a race event. The caller routes the event into
//! the race state machine, whose phase guards make repeated or raceless
//! deliveries harmless.

use serde::{Deserialize, Serialize};

/// Tag carried by the player's vehicle body.
pub const PLAYER_TAG: &str = "Player";

/// Discrete race event raised by a trigger volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerEvent {
    /// The goal line was crossed.
    Goal,
    /// The vehicle fell off the track.
    Fall,
}

/// Goal line volume.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoalLine;

impl GoalLine {
    /// A body entered the volume. Yields an event only for the player.
    pub fn entered(&self, tag: &str) -> Option<TriggerEvent> {
        (tag == PLAYER_TAG).then_some(TriggerEvent::Goal)
    }
}

/// Out-of-bounds volume below the track.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallVolume;

impl FallVolume {
    /// A body entered the volume. Yields an event only for the player.
    pub fn entered(&self, tag: &str) -> Option<TriggerEvent> {
        if tag != PLAYER_TAG {
            return None;
        }
        log::debug!("fall volume entered");
        Some(TriggerEvent::Fall)
    }
}

//! Menu - title screen controller
//!
//! Plays the click cue on the start button and requests the race scene
//! once the cue has had time to finish. Same delayed-navigation shape as
//! the retry/title buttons on the result view.

use crate::error::ConfigError;
use crate::presentation::{Cue, PresentationSink, SceneRequest};
use crate::tasks::Delay;

/// Title screen start-button handler.
#[derive(Debug)]
pub struct TitleMenu {
    nav_delay_secs: f32,
    nav: Option<Delay>,
}

impl TitleMenu {
    pub fn new(nav_delay_secs: f32) -> Result<Self, ConfigError> {
        ConfigError::require_non_negative("nav_delay_secs", nav_delay_secs)?;
        Ok(Self {
            nav_delay_secs,
            nav: None,
        })
    }

    /// Start button pressed. Repeat clicks while the transition is pending
    /// are ignored.
    pub fn start_clicked(&mut self, sink: &mut dyn PresentationSink) {
        if self.nav.is_some() {
            return;
        }
        sink.play_cue(Cue::Click);
        self.nav = Some(Delay::new(self.nav_delay_secs));
        log::info!("title menu: race requested");
    }

    /// Advance the pending transition by one frame.
    pub fn update(&mut self, dt: f32, sink: &mut dyn PresentationSink) {
        if let Some(nav) = self.nav.as_mut() {
            if nav.tick(dt) {
                sink.load_scene(SceneRequest::Race);
            }
        }
    }
}

impl Default for TitleMenu {
    fn default() -> Self {
        Self {
            nav_delay_secs: 0.5,
            nav: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::{PresentationEvent, RecordingSink};

    #[test]
    fn start_click_navigates_after_delay() {
        let mut menu = TitleMenu::default();
        let mut sink = RecordingSink::new();

        menu.start_clicked(&mut sink);
        assert_eq!(sink.cue_count(Cue::Click), 1);
        assert!(!sink
            .events
            .iter()
            .any(|ev| matches!(ev, PresentationEvent::Scene(_))));

        menu.update(0.25, &mut sink);
        menu.update(0.25, &mut sink);
        assert!(sink
            .events
            .contains(&PresentationEvent::Scene(SceneRequest::Race)));
    }

    #[test]
    fn repeat_clicks_do_not_stack() {
        let mut menu = TitleMenu::default();
        let mut sink = RecordingSink::new();

        menu.start_clicked(&mut sink);
        menu.start_clicked(&mut sink);
        assert_eq!(sink.cue_count(Cue::Click), 1);

        menu.update(1.0, &mut sink);
        let scene_count = sink
            .events
            .iter()
            .filter(|ev| matches!(ev, PresentationEvent::Scene(_)))
            .count();
        assert_eq!(scene_count, 1);
    }

    #[test]
    fn rejects_negative_delay() {
        assert!(TitleMenu::new(-1.0).is_err());
    }
}

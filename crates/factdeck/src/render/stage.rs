use web_time::Instant;

use eframe::egui;

use super::layout::{self, TextLayout, TextMeasure};
use super::transition::{ActiveTransition, Phase, LIFT_DISTANCE};

/// What to paint for the current fact on one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFrame<'a> {
    pub lines: &'a [String],
    pub font_size: f32,
    pub line_height: f32,
    pub alpha: f32,
    /// Upward displacement from the resting position, in points.
    pub lift: f32,
}

/// Holds the fact on screen and its transition. A new transition replaces the
/// old one outright, so at most one is ever in flight.
#[derive(Default)]
pub struct Stage {
    transition: Option<ActiveTransition>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_transition(&mut self, text: String, layout: TextLayout, now: Instant) {
        self.transition = Some(ActiveTransition::new(text, layout, now));
    }

    /// Lay out `text` for `viewport` and start animating it in.
    pub fn show(
        &mut self,
        text: &str,
        viewport: egui::Vec2,
        measure: &dyn TextMeasure,
        now: Instant,
    ) {
        let layout = layout::compute_layout(text, viewport.x, viewport.y, measure);
        self.begin_transition(text.to_string(), layout, now);
    }

    /// Re-wrap the current text when the viewport changed size. The animation
    /// clock keeps running.
    pub fn fit_to(&mut self, viewport: egui::Vec2, measure: &dyn TextMeasure) {
        if let Some(t) = &mut self.transition {
            if t.layout.viewport != viewport {
                t.layout = layout::compute_layout(&t.text, viewport.x, viewport.y, measure);
            }
        }
    }

    pub fn phase(&self, now: Instant) -> Phase {
        match &self.transition {
            Some(t) if !t.is_complete(now) => Phase::Animating,
            _ => Phase::Idle,
        }
    }

    #[cfg(test)]
    pub fn started_at(&self) -> Option<Instant> {
        self.transition.as_ref().map(|t| t.start)
    }

    #[cfg(test)]
    pub fn text(&self) -> Option<&str> {
        self.transition.as_ref().map(|t| t.text.as_str())
    }

    /// `None` until something has been shown.
    pub fn frame(&self, now: Instant) -> Option<TextFrame<'_>> {
        let t = self.transition.as_ref()?;
        let ease = match self.phase(now) {
            Phase::Animating => t.progress(now),
            Phase::Idle => 1.0,
        };
        Some(TextFrame {
            lines: &t.layout.lines,
            font_size: t.layout.font_size,
            line_height: t.layout.line_height,
            alpha: ease,
            lift: (1.0 - ease) * LIFT_DISTANCE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::transition::TRANSITION_DURATION;
    use std::time::Duration;

    struct FixedWidth;

    impl TextMeasure for FixedWidth {
        fn width(&self, text: &str, font_size: f32) -> f32 {
            text.chars().count() as f32 * font_size * 0.6
        }
    }

    fn viewport() -> egui::Vec2 {
        egui::vec2(400.0, 800.0)
    }

    #[test]
    fn test_empty_stage_draws_nothing() {
        let stage = Stage::new();
        let now = Instant::now();
        assert!(stage.frame(now).is_none());
        assert_eq!(stage.phase(now), Phase::Idle);
    }

    #[test]
    fn test_animates_then_rests_fully_opaque() {
        let mut stage = Stage::new();
        let start = Instant::now();
        stage.show("Sharks predate trees.", viewport(), &FixedWidth, start);

        let first = stage.frame(start).unwrap();
        assert_eq!(first.alpha, 0.0);
        assert_eq!(first.lift, LIFT_DISTANCE);
        assert_eq!(stage.phase(start), Phase::Animating);

        let mid = stage.frame(start + TRANSITION_DURATION / 2).unwrap();
        assert!(mid.alpha > 0.0 && mid.alpha < 1.0);
        assert!(mid.lift > 0.0 && mid.lift < LIFT_DISTANCE);

        let done = start + TRANSITION_DURATION + Duration::from_millis(1);
        let rest = stage.frame(done).unwrap();
        assert_eq!(rest.alpha, 1.0);
        assert_eq!(rest.lift, 0.0);
        assert_eq!(stage.phase(done), Phase::Idle);
    }

    #[test]
    fn test_second_transition_supersedes_first() {
        let mut stage = Stage::new();
        let first = Instant::now();
        stage.show("first", viewport(), &FixedWidth, first);

        let second = first + Duration::from_millis(300);
        stage.show("second", viewport(), &FixedWidth, second);

        assert_eq!(stage.started_at(), Some(second));
        assert_eq!(stage.text(), Some("second"));

        // 450ms after the first start the first animation would be finished,
        // but only 150ms of the second have elapsed.
        let at = first + TRANSITION_DURATION;
        let frame = stage.frame(at).unwrap();
        assert_eq!(frame.lines, ["second".to_string()]);
        assert!(frame.alpha < 1.0);
        assert_eq!(stage.phase(at), Phase::Animating);
    }

    #[test]
    fn test_resize_relayouts_without_restarting() {
        let mut stage = Stage::new();
        let start = Instant::now();
        stage.show("A fact that needs wrapping", viewport(), &FixedWidth, start);
        let before = stage.frame(start).unwrap().font_size;

        stage.fit_to(egui::vec2(1200.0, 1000.0), &FixedWidth);
        let after = stage.frame(start).unwrap().font_size;
        assert!(after > before);
        assert_eq!(stage.started_at(), Some(start));
    }
}

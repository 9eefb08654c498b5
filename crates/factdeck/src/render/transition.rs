use std::time::Duration;
use web_time::Instant;

use super::layout::TextLayout;

pub const TRANSITION_DURATION: Duration = Duration::from_millis(450);
/// How far above its resting place the text starts, in points.
pub const LIFT_DISTANCE: f32 = 10.0;

/// Symmetric quadratic ease-in/ease-out on `[0, 1]`.
pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Animating,
}

/// Fade-in of a freshly laid out fact, settling from slightly above.
#[derive(Debug, Clone)]
pub struct ActiveTransition {
    pub text: String,
    pub layout: TextLayout,
    pub start: Instant,
}

impl ActiveTransition {
    pub fn new(text: String, layout: TextLayout, start: Instant) -> Self {
        Self {
            text,
            layout,
            start,
        }
    }

    /// Linear fraction of the duration elapsed at `now`, clamped to `[0, 1]`.
    pub fn raw_progress(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.start).as_secs_f32();
        (elapsed / TRANSITION_DURATION.as_secs_f32()).min(1.0)
    }

    pub fn progress(&self, now: Instant) -> f32 {
        ease_in_out(self.raw_progress(now))
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= TRANSITION_DURATION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui;

    fn transition(start: Instant) -> ActiveTransition {
        let layout = TextLayout {
            lines: vec!["hello".to_string()],
            font_size: 20.0,
            line_height: 25.0,
            margin: 32.0,
            viewport: egui::vec2(400.0, 800.0),
        };
        ActiveTransition::new("hello".to_string(), layout, start)
    }

    #[test]
    fn test_ease_endpoints_and_midpoint() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(0.5), 0.5);
        assert_eq!(ease_in_out(1.0), 1.0);
    }

    #[test]
    fn test_ease_is_symmetric_and_monotonic() {
        let mut prev = 0.0;
        for i in 0..=100 {
            let t = i as f32 / 100.0;
            let e = ease_in_out(t);
            assert!(e >= prev - 1e-6);
            assert!((e + ease_in_out(1.0 - t) - 1.0).abs() < 1e-5);
            prev = e;
        }
    }

    #[test]
    fn test_progress_clamps() {
        let start = Instant::now();
        let t = transition(start);
        assert_eq!(t.raw_progress(start), 0.0);
        assert!(!t.is_complete(start + Duration::from_millis(449)));
        assert!(t.is_complete(start + TRANSITION_DURATION));
        assert_eq!(t.progress(start + Duration::from_secs(5)), 1.0);
    }

    #[test]
    fn test_clock_before_start_reads_as_zero() {
        let now = Instant::now();
        let t = transition(now + Duration::from_millis(100));
        assert_eq!(t.raw_progress(now), 0.0);
    }
}

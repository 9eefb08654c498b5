use eframe::egui::{self, Color32, FontId};

/// Margin on each side, as a fraction of the smaller viewport dimension.
const MARGIN_RATIO: f32 = 0.08;
/// Starting font size, as a fraction of the smaller viewport dimension.
const FONT_RATIO: f32 = 0.05;
const LINE_HEIGHT_RATIO: f32 = 1.25;
const FONT_STEP: f32 = 2.0;
const MIN_FONT_SIZE: f32 = 14.0;
const MAX_ATTEMPTS: usize = 40;

/// Measures the rendered width of a single line of text.
pub trait TextMeasure {
    fn width(&self, text: &str, font_size: f32) -> f32;
}

/// Measures with the painter's proportional font.
pub struct PainterMeasure<'a>(pub &'a egui::Painter);

impl TextMeasure for PainterMeasure<'_> {
    fn width(&self, text: &str, font_size: f32) -> f32 {
        self.0
            .layout_no_wrap(
                text.to_string(),
                FontId::proportional(font_size),
                Color32::WHITE,
            )
            .rect
            .width()
    }
}

/// A fact wrapped and sized for a particular viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<String>,
    pub font_size: f32,
    pub line_height: f32,
    pub margin: f32,
    /// Viewport the layout was computed for.
    pub viewport: egui::Vec2,
}

/// Greedy word wrap. A word wider than `max_width` gets a line of its own.
pub fn wrap_text(
    text: &str,
    max_width: f32,
    font_size: f32,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if measure.width(&candidate, font_size) <= max_width {
            line = candidate;
        } else {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            line = word.to_string();
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Wrap `text` to fit the viewport, shrinking the font until the block fits
/// vertically, the attempt budget runs out, or the floor size is reached.
/// At the floor the last attempt is returned even if it overflows.
pub fn compute_layout(
    text: &str,
    width: f32,
    height: f32,
    measure: &dyn TextMeasure,
) -> TextLayout {
    let smaller = width.min(height);
    let margin = smaller * MARGIN_RATIO;
    let max_width = width - margin * 2.0;
    let max_height = height - margin * 2.0;

    let mut font_size = (smaller * FONT_RATIO).floor().max(1.0);
    let mut lines;
    let mut line_height;
    let mut attempts = 0;
    loop {
        attempts += 1;
        lines = wrap_text(text, max_width, font_size, measure);
        line_height = (font_size * LINE_HEIGHT_RATIO).floor();
        let fits = lines.len() as f32 * line_height <= max_height;
        if fits || attempts >= MAX_ATTEMPTS || font_size - FONT_STEP < MIN_FONT_SIZE {
            break;
        }
        font_size -= FONT_STEP;
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    TextLayout {
        lines,
        font_size,
        line_height,
        margin,
        viewport: egui::vec2(width, height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Every character is `advance` times the font size wide.
    struct FixedWidth {
        advance: f32,
    }

    impl TextMeasure for FixedWidth {
        fn width(&self, text: &str, font_size: f32) -> f32 {
            text.chars().count() as f32 * font_size * self.advance
        }
    }

    struct CountingMeasure {
        inner: FixedWidth,
        calls: Cell<usize>,
    }

    impl TextMeasure for CountingMeasure {
        fn width(&self, text: &str, font_size: f32) -> f32 {
            self.calls.set(self.calls.get() + 1);
            self.inner.width(text, font_size)
        }
    }

    #[test]
    fn test_three_words_per_line() {
        // 400x800: margin 32, max width 336, font 20 -> 60px per char.
        // "A B C" is 300px, "A B C D" would be 420px.
        let measure = FixedWidth { advance: 3.0 };
        let layout = compute_layout("A B C D E F", 400.0, 800.0, &measure);
        assert_eq!(layout.lines, vec!["A B C", "D E F"]);
        assert_eq!(layout.font_size, 20.0);
        assert_eq!(layout.line_height, 25.0);
        assert!((layout.margin - 32.0).abs() < 0.01);
    }

    #[test]
    fn test_short_text_keeps_start_size() {
        let measure = FixedWidth { advance: 0.5 };
        let layout = compute_layout("Hello world", 1000.0, 600.0, &measure);
        assert_eq!(layout.font_size, 30.0);
        assert_eq!(layout.lines, vec!["Hello world"]);
    }

    #[test]
    fn test_shrinks_until_it_fits() {
        // 600x400 starts at 20px: 17 lines of 25px overflow the 336px budget,
        // 18px gives 15 lines of 22px.
        let measure = FixedWidth { advance: 0.6 };
        let text = "word ".repeat(150);
        let layout = compute_layout(&text, 600.0, 400.0, &measure);
        assert_eq!(layout.font_size, 18.0);
        assert_eq!(layout.lines.len(), 15);
        assert!(layout.lines.len() as f32 * layout.line_height <= 400.0 - layout.margin * 2.0);
    }

    #[test]
    fn test_overflow_at_floor_is_returned_as_is() {
        let measure = FixedWidth { advance: 0.6 };
        let text = "overflowing ".repeat(5000);
        let layout = compute_layout(&text, 800.0, 600.0, &measure);
        assert!(layout.font_size >= MIN_FONT_SIZE);
        assert!(layout.font_size < MIN_FONT_SIZE + FONT_STEP);
        assert!(layout.lines.len() as f32 * layout.line_height > 600.0 - layout.margin * 2.0);
        // Lines belong to the reported font size
        assert_eq!(
            layout.lines,
            wrap_text(&text, 800.0 - layout.margin * 2.0, layout.font_size, &measure)
        );
    }

    #[test]
    fn test_terminates_within_attempt_budget() {
        let measure = CountingMeasure {
            inner: FixedWidth { advance: 0.6 },
            calls: Cell::new(0),
        };
        let words = 3000;
        let text = "x ".repeat(words);
        // Huge viewport: start size 500, floor not reached within 40 attempts
        let layout = compute_layout(&text, 10_000.0, 10_000.0, &measure);
        assert!(!layout.lines.is_empty());
        assert_eq!(layout.font_size, 500.0 - (MAX_ATTEMPTS as f32 - 1.0) * FONT_STEP);
        assert!(measure.calls.get() <= MAX_ATTEMPTS * words);
    }

    #[test]
    fn test_always_at_least_one_line() {
        let measure = FixedWidth { advance: 0.6 };
        assert_eq!(compute_layout("x", 50.0, 50.0, &measure).lines.len(), 1);
        assert_eq!(compute_layout("   ", 400.0, 400.0, &measure).lines.len(), 1);
    }

    #[test]
    fn test_long_word_gets_its_own_line() {
        let measure = FixedWidth { advance: 1.0 };
        let lines = wrap_text("a supercalifragilistic b", 100.0, 10.0, &measure);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }
}

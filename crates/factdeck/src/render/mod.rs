pub mod layout;
pub mod stage;
pub mod transition;

use std::f32::consts::TAU;
use web_time::Instant;

use eframe::egui::{self, Align2, FontId};

use crate::theme::Theme;

use stage::{Stage, TextFrame};

pub const HINT_TEXT: &str = "tap right \u{2192} next | tap left \u{2192} previous";

const GRID_STEP: f32 = 32.0;
const GRADIENT_SEGMENTS: u32 = 64;
const HINT_TOP: f32 = 20.0;

/// Paint one complete frame. Runs every refresh whether or not a transition
/// is in flight, so the background and hint are always current.
pub fn render_frame(
    painter: &egui::Painter,
    rect: egui::Rect,
    theme: &Theme,
    stage: &Stage,
    now: Instant,
) {
    draw_background(painter, rect, theme);
    draw_hint(painter, rect, theme);
    if let Some(frame) = stage.frame(now) {
        draw_fact(painter, rect, theme, &frame);
    }
}

/// Radial gradient from the centre out to the far edge, overlaid with a faint grid.
pub fn draw_background(painter: &egui::Painter, rect: egui::Rect, theme: &Theme) {
    painter.rect_filled(rect, 0.0, theme.background_outer);

    let center = rect.center();
    let radius = rect.width().max(rect.height());
    let mut mesh = egui::Mesh::default();
    mesh.colored_vertex(center, theme.background_inner);
    for i in 0..GRADIENT_SEGMENTS {
        let angle = i as f32 / GRADIENT_SEGMENTS as f32 * TAU;
        let edge = center + egui::vec2(angle.cos(), angle.sin()) * radius;
        mesh.colored_vertex(edge, theme.background_outer);
    }
    // Triangle fan around vertex 0
    for i in 0..GRADIENT_SEGMENTS {
        let a = 1 + i;
        let b = 1 + (i + 1) % GRADIENT_SEGMENTS;
        mesh.add_triangle(0, a, b);
    }
    painter.add(egui::Shape::mesh(mesh));

    let stroke = egui::Stroke::new(1.0, theme.grid_line);
    let mut x = rect.left();
    while x < rect.right() {
        painter.line_segment(
            [egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())],
            stroke,
        );
        x += GRID_STEP;
    }
    let mut y = rect.top();
    while y < rect.bottom() {
        painter.line_segment(
            [egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)],
            stroke,
        );
        y += GRID_STEP;
    }
}

pub fn draw_hint(painter: &egui::Painter, rect: egui::Rect, theme: &Theme) {
    painter.text(
        egui::pos2(rect.center().x, rect.top() + HINT_TOP),
        Align2::CENTER_TOP,
        HINT_TEXT,
        FontId::proportional(theme.hint_size),
        theme.hint,
    );
}

/// Fact lines centred on screen, faded by `alpha` and raised by `lift`.
pub fn draw_fact(
    painter: &egui::Painter,
    rect: egui::Rect,
    theme: &Theme,
    frame: &TextFrame<'_>,
) {
    let color = Theme::with_opacity(theme.foreground, frame.alpha);
    let font = FontId::proportional(frame.font_size);
    let block_height = frame.lines.len() as f32 * frame.line_height;
    let top = rect.top() + (rect.height() - block_height) / 2.0 - frame.lift;

    for (i, line) in frame.lines.iter().enumerate() {
        let y = top + i as f32 * frame.line_height;
        painter.text(
            egui::pos2(rect.center().x, y),
            Align2::CENTER_TOP,
            line,
            font.clone(),
            color,
        );
    }
}

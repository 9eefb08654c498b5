use eframe::egui;
use std::sync::mpsc::{Receiver, TryRecvError};
use web_time::Instant;

use crate::deck::Deck;
use crate::feedback::CopyFeedback;
use crate::render::{self, layout::PainterMeasure, layout::TextMeasure, stage::Stage};
use crate::theme::Theme;

const TOAST_DURATION: f32 = 1.5;
const TOAST_FADE_START: f32 = 1.0;
const BUTTON_SIZE: egui::Vec2 = egui::vec2(150.0, 40.0);
const EDGE_MARGIN: f32 = 16.0;

/// Starts a clipboard write; its result arrives on the returned channel.
pub type CopyStarter = Box<dyn Fn(String) -> Receiver<anyhow::Result<()>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Previous,
}

/// Right half advances, left half (including the exact middle) goes back.
pub fn route_tap(x: f32, width: f32) -> Navigation {
    if x > width / 2.0 {
        Navigation::Next
    } else {
        Navigation::Previous
    }
}

/// Where the copy button sits: bottom-right corner of the viewport.
pub fn copy_button_rect(rect: egui::Rect) -> egui::Rect {
    egui::Rect::from_min_size(
        rect.right_bottom() - BUTTON_SIZE - egui::vec2(EDGE_MARGIN, EDGE_MARGIN),
        BUTTON_SIZE,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Navigate(Navigation),
    Copy,
    ToggleTheme,
}

/// Map a click to an action. Clicks on the copy button never navigate.
fn route_pointer(pos: egui::Pos2, rect: egui::Rect) -> Action {
    if copy_button_rect(rect).contains(pos) {
        Action::Copy
    } else {
        Action::Navigate(route_tap(pos.x - rect.left(), rect.width()))
    }
}

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: String) -> Self {
        Self {
            message,
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        if elapsed < TOAST_FADE_START {
            1.0
        } else if elapsed < TOAST_DURATION {
            1.0 - (elapsed - TOAST_FADE_START) / (TOAST_DURATION - TOAST_FADE_START)
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= TOAST_DURATION
    }
}

pub struct FactDeckApp {
    deck: Deck,
    stage: Stage,
    theme: Theme,
    copy: CopyFeedback,
    start_copy: CopyStarter,
    pending_copy: Option<Receiver<anyhow::Result<()>>>,
    toast: Option<Toast>,
}

impl FactDeckApp {
    pub fn new(deck: Deck, theme: Theme, start_copy: CopyStarter) -> Self {
        Self {
            deck,
            stage: Stage::new(),
            theme,
            copy: CopyFeedback::default(),
            start_copy,
            pending_copy: None,
            toast: None,
        }
    }

    /// Move through the deck and animate the new fact in.
    fn navigate(
        &mut self,
        nav: Navigation,
        viewport: egui::Vec2,
        measure: &dyn TextMeasure,
        now: Instant,
    ) {
        let fact = match nav {
            Navigation::Next => self.deck.advance(),
            Navigation::Previous => self.deck.retreat(),
        };
        tracing::debug!(position = fact.position, total = fact.total, "show fact");
        self.stage.show(fact.text, viewport, measure, now);
    }

    fn copy_current(&mut self) {
        let Some(fact) = self.deck.current() else {
            return;
        };
        let text = fact.share_text();
        if !self.copy.begin() {
            return;
        }
        self.pending_copy = Some((self.start_copy)(text));
    }

    /// Pick up a finished clipboard write and expire old feedback.
    fn poll_copy(&mut self, now: Instant) {
        if let Some(rx) = &self.pending_copy {
            let result = match rx.try_recv() {
                Ok(result) => Some(result),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => {
                    Some(Err(anyhow::anyhow!("clipboard worker exited")))
                }
            };
            if let Some(result) = result {
                if let Err(e) = &result {
                    tracing::warn!("copy failed: {e:#}");
                }
                self.copy.resolve(&result, now);
                self.pending_copy = None;
            }
        }
        self.copy.tick(now);
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        let label = if self.theme.name == "dark" {
            "Dark theme"
        } else {
            "Light theme"
        };
        self.toast = Some(Toast::new(label.to_string()));
    }

    fn apply(
        &mut self,
        action: Action,
        viewport: egui::Vec2,
        measure: &dyn TextMeasure,
        now: Instant,
    ) {
        match action {
            Action::Navigate(nav) => self.navigate(nav, viewport, measure, now),
            Action::Copy => self.copy_current(),
            Action::ToggleTheme => self.toggle_theme(),
        }
    }

    fn draw_chrome(&self, painter: &egui::Painter, rect: egui::Rect) {
        if let Some(fact) = self.deck.current() {
            painter.text(
                rect.left_bottom() + egui::vec2(EDGE_MARGIN, -EDGE_MARGIN),
                egui::Align2::LEFT_BOTTOM,
                format!("{} / {}", fact.position, fact.total),
                egui::FontId::proportional(self.theme.hint_size),
                self.theme.hint,
            );
        }

        let button = copy_button_rect(rect);
        let opacity = if self.copy.is_enabled() { 1.0 } else { 0.6 };
        painter.rect_filled(
            button,
            8.0,
            Theme::with_opacity(self.theme.button_background, opacity),
        );
        painter.text(
            button.center(),
            egui::Align2::CENTER_CENTER,
            self.copy.label(),
            egui::FontId::proportional(self.theme.button_size),
            Theme::with_opacity(self.theme.accent, opacity),
        );
    }

    fn draw_toast(&self, painter: &egui::Painter, rect: egui::Rect) {
        let Some(toast) = &self.toast else {
            return;
        };
        let opacity = toast.opacity();
        if opacity <= 0.0 {
            return;
        }
        let color = Theme::with_opacity(self.theme.foreground, opacity * 0.9);
        let background = Theme::with_opacity(self.theme.button_background, opacity * 0.9);
        let galley =
            painter.layout_no_wrap(toast.message.clone(), egui::FontId::proportional(18.0), color);
        let padding = 12.0;
        let toast_rect = egui::Rect::from_min_size(
            egui::pos2(
                rect.center().x - galley.rect.width() / 2.0 - padding,
                rect.bottom() - 120.0,
            ),
            galley.rect.size() + egui::vec2(padding, padding) * 2.0,
        );
        painter.rect_filled(toast_rect, 8.0, background);
        painter.galley(toast_rect.min + egui::vec2(padding, padding), galley, color);
    }
}

impl eframe::App for FactDeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.poll_copy(now);
        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }

        // Viewport commands go out after the input closure to avoid a lock deadlock
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();
        let mut actions: Vec<Action> = Vec::new();

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Q) {
                viewport_cmds.push(egui::ViewportCommand::Close);
                return;
            }
            if i.key_pressed(egui::Key::F) {
                viewport_cmds.push(egui::ViewportCommand::Fullscreen(
                    !i.viewport().fullscreen.unwrap_or(false),
                ));
            }
            if i.key_pressed(egui::Key::D) {
                actions.push(Action::ToggleTheme);
            }
            if i.key_pressed(egui::Key::C) && !i.modifiers.command {
                actions.push(Action::Copy);
            }
            if i.key_pressed(egui::Key::ArrowRight)
                || i.key_pressed(egui::Key::Space)
                || i.key_pressed(egui::Key::N)
            {
                actions.push(Action::Navigate(Navigation::Next));
            }
            if i.key_pressed(egui::Key::ArrowLeft) || i.key_pressed(egui::Key::P) {
                actions.push(Action::Navigate(Navigation::Previous));
            }
        });

        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::new().inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let response = ui.interact(rect, ui.id().with("deck"), egui::Sense::click());
                if response.clicked() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        actions.push(route_pointer(pos, rect));
                    }
                }

                let painter = ui.painter();
                let measure = PainterMeasure(painter);
                if self.deck.current().is_none() {
                    self.navigate(Navigation::Next, rect.size(), &measure, now);
                }
                for action in actions.drain(..) {
                    self.apply(action, rect.size(), &measure, now);
                }
                self.stage.fit_to(rect.size(), &measure);

                render::render_frame(painter, rect, &self.theme, &self.stage, now);
                self.draw_chrome(painter, rect);
                self.draw_toast(painter, rect);
            });

        ctx.request_repaint();
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn run(settings: crate::config::ViewerSettings, windowed: bool) -> anyhow::Result<()> {
    use crate::clipboard::{self, Clipboard, SystemClipboard};
    use crate::facts::{self, FactSource};
    use std::sync::Arc;

    let source = FactSource::parse(&settings.facts);
    let facts = facts::load_or_placeholder(&source);
    let deck = Deck::new(facts).avoid_boundary_repeat(settings.avoid_boundary_repeat);
    tracing::debug!(facts = deck.fact_count(), "deck ready");
    let theme = Theme::from_name(&settings.theme);

    let title = format!("factdeck \u{2014} {source}");
    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([720.0, 960.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| {
            let clipboard: Arc<dyn Clipboard> = Arc::new(SystemClipboard);
            let start_copy: CopyStarter =
                Box::new(move |text| clipboard::spawn_write(Arc::clone(&clipboard), text));
            Ok(Box::new(FactDeckApp::new(deck, theme, start_copy)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

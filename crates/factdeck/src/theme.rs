use eframe::egui::Color32;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    /// Radial gradient centre colour.
    pub background_inner: Color32,
    /// Radial gradient edge colour.
    pub background_outer: Color32,
    pub grid_line: Color32,
    pub foreground: Color32,
    pub hint: Color32,
    pub accent: Color32,
    pub button_background: Color32,
    pub hint_size: f32,
    pub button_size: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background_inner: Color32::from_rgb(0x10, 0x17, 0x26),
            background_outer: Color32::from_rgb(0x0B, 0x0F, 0x15),
            grid_line: Color32::from_white_alpha(20),
            foreground: Color32::from_rgb(0xEA, 0xF0, 0xF6),
            hint: Color32::from_rgba_unmultiplied(0xFF, 0xFF, 0xFF, 168),
            accent: Color32::from_rgb(0x52, 0x94, 0xE2),
            button_background: Color32::from_rgb(0x1C, 0x25, 0x36),
            hint_size: 14.0,
            button_size: 15.0,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background_inner: Color32::WHITE,
            background_outer: Color32::from_rgb(0xE6, 0xEA, 0xF0),
            grid_line: Color32::from_black_alpha(16),
            foreground: Color32::from_rgb(0x1A, 0x1A, 0x2E),
            hint: Color32::from_rgba_unmultiplied(0x1A, 0x1A, 0x2E, 150),
            accent: Color32::from_rgb(0x0F, 0x34, 0x60),
            button_background: Color32::from_rgb(0xF5, 0xF5, 0xF5),
            hint_size: 14.0,
            button_size: 15.0,
        }
    }

    /// Known theme by name, or `None` for anything else.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(Self::dark)
    }

    pub fn toggled(&self) -> Self {
        if self.name == "dark" {
            Self::light()
        } else {
            Self::dark()
        }
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        color.gamma_multiply(opacity.clamp(0.0, 1.0))
    }
}

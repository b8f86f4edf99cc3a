//! Application theming

use egui::{Color32, Rounding, Visuals};

/// Application theme
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub surface: Color32,
    pub primary: Color32,
    pub text: Color32,
    pub text_secondary: Color32,
    pub accent: Color32,
    /// Tag chips under thumbnails
    pub badge: Color32,
    /// Lightbox backdrop
    pub backdrop: Color32,
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(24, 24, 27),
            surface: Color32::from_rgb(39, 39, 42),
            primary: Color32::from_rgb(63, 63, 70),
            text: Color32::from_rgb(244, 244, 245),
            text_secondary: Color32::from_rgb(161, 161, 170),
            accent: Color32::from_rgb(249, 115, 22), // Orange 500
            badge: Color32::from_rgb(63, 63, 70),
            backdrop: Color32::BLACK,
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::from_rgb(250, 250, 250),
            surface: Color32::WHITE,
            primary: Color32::from_rgb(228, 228, 231),
            text: Color32::from_rgb(24, 24, 27),
            text_secondary: Color32::from_rgb(113, 113, 122),
            accent: Color32::from_rgb(249, 115, 22),
            badge: Color32::from_rgb(244, 244, 245),
            backdrop: Color32::BLACK,
        }
    }

    pub fn is_dark(&self) -> bool {
        self.name == "dark"
    }

    /// Apply theme to egui
    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        let mut visuals = if self.is_dark() {
            Visuals::dark()
        } else {
            Visuals::light()
        };

        visuals.panel_fill = self.background;
        visuals.window_fill = self.surface;
        visuals.extreme_bg_color = self.background;
        visuals.faint_bg_color = self.primary;
        visuals.window_rounding = Rounding::same(8.0);

        visuals.widgets.noninteractive.bg_fill = self.surface;
        visuals.widgets.noninteractive.fg_stroke.color = self.text;

        visuals.widgets.inactive.bg_fill = self.primary;
        visuals.widgets.inactive.fg_stroke.color = self.text;

        visuals.widgets.hovered.bg_fill = self.accent.linear_multiply(0.3);
        visuals.widgets.hovered.fg_stroke.color = self.text;

        visuals.widgets.active.bg_fill = self.accent.linear_multiply(0.5);
        visuals.widgets.active.fg_stroke.color = self.text;

        // Keyboard focus ring
        visuals.selection.bg_fill = self.accent.linear_multiply(0.3);
        visuals.selection.stroke.color = self.accent;

        style.visuals = visuals;
        ctx.set_style(style);
    }

    /// Get theme by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert!(Theme::by_name("Light").name == "light");
        assert!(Theme::by_name("dark").is_dark());
        assert!(Theme::by_name("solarized").is_dark());
    }

    #[test]
    fn test_accent_is_shared() {
        assert_eq!(Theme::dark().accent, Theme::light().accent);
    }
}

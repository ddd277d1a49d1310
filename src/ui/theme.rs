use std::fs;

use crossterm::style::Color;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub fg: String,
    pub header: String,
    pub accent: String,
    pub muted: String,
    pub correct: String,
    pub incorrect: String,
    pub bar_filled: String,
    pub bar_empty: String,
}

impl Theme {
    /// User theme file first, then the built-in palettes.
    pub fn load(name: &str) -> Option<Self> {
        if let Some(config_dir) = dirs::config_dir() {
            let user_theme_path = config_dir
                .join("shiken")
                .join("themes")
                .join(format!("{name}.toml"));
            if let Ok(content) = fs::read_to_string(&user_theme_path) {
                match toml::from_str::<Theme>(&content) {
                    Ok(theme) => return Some(theme),
                    Err(e) => tracing::warn!(path = %user_theme_path.display(), "bad theme file: {e}"),
                }
            }
        }
        Self::builtin(name)
    }

    pub fn builtin(name: &str) -> Option<Self> {
        let colors = match name {
            "light" => ThemeColors::light(),
            "dark" => ThemeColors::dark(),
            _ => return None,
        };
        Some(Self {
            name: name.to_string(),
            colors,
        })
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "light".to_string(),
            colors: ThemeColors::light(),
        }
    }
}

impl ThemeColors {
    fn light() -> Self {
        Self {
            fg: "#2c2c2c".to_string(),
            header: "#3f51b5".to_string(),
            accent: "#7c4dff".to_string(),
            muted: "#999999".to_string(),
            correct: "#2e7d32".to_string(),
            incorrect: "#c62828".to_string(),
            bar_filled: "#00897b".to_string(),
            bar_empty: "#e0e0e0".to_string(),
        }
    }

    fn dark() -> Self {
        Self {
            fg: "#cdd6f4".to_string(),
            header: "#89b4fa".to_string(),
            accent: "#cba6f7".to_string(),
            muted: "#6c7086".to_string(),
            correct: "#a6e3a1".to_string(),
            incorrect: "#f38ba8".to_string(),
            bar_filled: "#94e2d5".to_string(),
            bar_empty: "#313244".to_string(),
        }
    }

    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Color::Rgb { r, g, b };
            }
        }
        Color::Reset
    }

    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn header(&self) -> Color { Self::parse_color(&self.header) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn muted(&self) -> Color { Self::parse_color(&self.muted) }
    pub fn correct(&self) -> Color { Self::parse_color(&self.correct) }
    pub fn incorrect(&self) -> Color { Self::parse_color(&self.incorrect) }
    pub fn bar_filled(&self) -> Color { Self::parse_color(&self.bar_filled) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(&self.bar_empty) }
}

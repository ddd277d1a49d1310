use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::engine::assembler::{AssemblyOptions, DRILL_RANDOM_COUNT};
use crate::engine::classifier::FORMATION_MAX_MEAN_LEN;
use crate::engine::mode::Mode;
use crate::session::layout::PROMPT_IMAGE_PATTERN;

pub const THEMES: &[&str] = &["light", "dark"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_mode")]
    pub default_mode: String,
    #[serde(default = "default_formation_max_mean_len")]
    pub formation_max_mean_len: f64,
    #[serde(default = "default_prompt_image_pattern")]
    pub prompt_image_pattern: String,
    #[serde(default = "default_drill_random_count")]
    pub drill_random_count: usize,
}

fn default_theme() -> String {
    "light".to_string()
}
fn default_data_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shiken")
        .join("bank")
        .to_string_lossy()
        .to_string()
}
fn default_mode() -> String {
    Mode::Combined.as_str().to_string()
}
fn default_formation_max_mean_len() -> f64 {
    FORMATION_MAX_MEAN_LEN
}
fn default_prompt_image_pattern() -> String {
    PROMPT_IMAGE_PATTERN.to_string()
}
fn default_drill_random_count() -> usize {
    DRILL_RANDOM_COUNT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            data_dir: default_data_dir(),
            default_mode: default_mode(),
            formation_max_mean_len: default_formation_max_mean_len(),
            prompt_image_pattern: default_prompt_image_pattern(),
            drill_random_count: default_drill_random_count(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let mut config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shiken")
            .join("config.toml")
    }

    /// Reset values that cannot be used to their defaults.
    /// Call after deserialization to handle hand-edited or stale files.
    pub fn validate(&mut self) {
        if !THEMES.contains(&self.theme.as_str()) {
            tracing::warn!(theme = %self.theme, "unknown theme, using default");
            self.theme = default_theme();
        }
        match Mode::from_key(&self.default_mode) {
            // Store the canonical name for legacy aliases.
            Some(mode) => self.default_mode = mode.as_str().to_string(),
            None => {
                tracing::warn!(mode = %self.default_mode, "unknown default mode, using default");
                self.default_mode = default_mode();
            }
        }
        if !self.formation_max_mean_len.is_finite() || self.formation_max_mean_len <= 0.0 {
            self.formation_max_mean_len = default_formation_max_mean_len();
        }
        if Regex::new(&self.prompt_image_pattern).is_err() {
            tracing::warn!(pattern = %self.prompt_image_pattern, "invalid prompt image pattern, using default");
            self.prompt_image_pattern = default_prompt_image_pattern();
        }
        if self.drill_random_count == 0 {
            self.drill_random_count = default_drill_random_count();
        }
        if self.data_dir.trim().is_empty() {
            self.data_dir = default_data_dir();
        }
    }

    pub fn mode(&self) -> Mode {
        Mode::from_key(&self.default_mode).unwrap_or(Mode::Combined)
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn assembly_options(&self) -> AssemblyOptions {
        AssemblyOptions {
            formation_max_mean_len: self.formation_max_mean_len,
            drill_random_count: self.drill_random_count,
        }
    }

    /// Compiled prompt image pattern; falls back to the built-in one.
    pub fn prompt_pattern(&self) -> Regex {
        Regex::new(&self.prompt_image_pattern)
            .unwrap_or_else(|_| crate::session::layout::default_prompt_pattern().clone())
    }

    pub fn set_theme(&mut self, theme: &str) -> bool {
        if THEMES.contains(&theme) {
            self.theme = theme.to_string();
            true
        } else {
            false
        }
    }
}

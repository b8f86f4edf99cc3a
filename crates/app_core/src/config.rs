//! Application configuration

use crate::command::CommandId;
use crate::AppError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub viewer: ViewerConfig,
    pub gallery: GalleryConfig,
    pub keybindings: HashMap<String, Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            viewer: ViewerConfig::default(),
            gallery: GalleryConfig::default(),
            keybindings: default_keybindings(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub theme: String,
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub log_level: String,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            log_level: "info".to_string(),
            window_width: 1280,
            window_height: 720,
        }
    }
}

/// Lightbox viewer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Crossfade duration between two images
    pub crossfade_ms: u64,
    /// Horizontal drag distance (px) that pages the lightbox
    pub swipe_threshold: f32,
    /// Decoded images larger than this are downscaled before upload
    pub max_texture_size: u32,
    /// Neighbours decoded ahead on each side of the active image
    pub preload_count: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            crossfade_ms: 500,
            swipe_threshold: 50.0,
            max_texture_size: 4096,
            preload_count: 1,
        }
    }
}

impl ViewerConfig {
    pub fn crossfade_duration(&self) -> Duration {
        Duration::from_millis(self.crossfade_ms)
    }
}

/// Thumbnail grid and image source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Optional TOML catalog replacing the built-in image list
    pub catalog_path: Option<PathBuf>,
    /// Root for relative asset sources
    pub assets_dir: PathBuf,
    pub thumbnail_min_width: f32,
    pub grid_spacing: f32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            assets_dir: PathBuf::from("assets"),
            thumbnail_min_width: 240.0,
            grid_spacing: 20.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from a specific file, falling back to defaults when absent.
    ///
    /// Runs before logging is set up, so callers report the outcome.
    pub fn load_from(config_path: &Path) -> Result<Self, AppError> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), AppError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "Folio", "Folio")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}

fn default_keybindings() -> HashMap<String, Vec<String>> {
    let mut kb = HashMap::new();

    kb.insert(CommandId::LIGHTBOX_NEXT.into(), vec!["Right".into()]);
    kb.insert(CommandId::LIGHTBOX_PREV.into(), vec!["Left".into()]);
    kb.insert(CommandId::LIGHTBOX_CLOSE.into(), vec!["Escape".into()]);
    kb.insert(CommandId::APP_EXIT.into(), vec!["Ctrl+q".into()]);

    kb
}

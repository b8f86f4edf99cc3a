//! Folio - image gallery with a crossfading lightbox
//!
//! Main entry point.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;

use anyhow::Result;
use app_core::{AppConfig, AppError, Catalog};
use std::path::{Path, PathBuf};

/// How the configuration was obtained, reported once logging is up
#[derive(Debug)]
enum ConfigStatus {
    Loaded(PathBuf),
    /// No file yet; defaults are written there
    Missing(PathBuf),
    Failed(PathBuf, AppError),
}

fn main() -> Result<()> {
    // Config comes first since it carries the default log filter
    let (config, config_status) = load_config(&AppConfig::config_path());

    // Initialize logging and panic hook
    let _log_guard = app_log::init(&config.general.log_level)?;

    report_config(&config, config_status);

    // Clean up old logs (7 days)
    if let Err(e) = app_log::cleanup_old_logs(7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("Folio starting...");

    let catalog = load_catalog(&config);
    app::run(config, catalog)
}

fn load_config(path: &Path) -> (AppConfig, ConfigStatus) {
    let existed = path.exists();
    match AppConfig::load_from(path) {
        Ok(config) if existed => (config, ConfigStatus::Loaded(path.to_path_buf())),
        Ok(config) => (config, ConfigStatus::Missing(path.to_path_buf())),
        Err(e) => (AppConfig::default(), ConfigStatus::Failed(path.to_path_buf(), e)),
    }
}

fn report_config(config: &AppConfig, status: ConfigStatus) {
    match status {
        ConfigStatus::Loaded(path) => {
            tracing::info!("Configuration loaded from {:?}", path);
        }
        ConfigStatus::Missing(path) => {
            tracing::info!("Using default configuration");
            if let Err(e) = config.save_to(&path) {
                tracing::warn!("Failed to write default config to {:?}: {}", path, e);
            }
        }
        ConfigStatus::Failed(path, e) => {
            // Leave the broken file for the user to fix
            tracing::warn!("Failed to load config {:?}, using defaults: {}", path, e);
        }
    }
}

/// Catalog named in the config, or the built-in list
fn load_catalog(config: &AppConfig) -> Catalog {
    let Some(path) = &config.gallery.catalog_path else {
        return Catalog::builtin();
    };

    match Catalog::load(path) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::warn!("Failed to load catalog {:?}, using built-in images: {}", path, e);
            Catalog::builtin()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let (config, status) = load_config(&path);
        assert!(matches!(status, ConfigStatus::Missing(ref p) if p == &path));

        // First run writes the defaults; the next start loads them
        report_config(&config, status);
        assert!(path.exists());
        let (_, status) = load_config(&path);
        assert!(matches!(status, ConfigStatus::Loaded(_)));

        std::fs::write(&path, "[viewer\ncrossfade_ms = ").unwrap();
        let (config, status) = load_config(&path);
        assert!(matches!(status, ConfigStatus::Failed(_, AppError::Config(_))));
        assert_eq!(config.viewer.crossfade_ms, 500);

        // A broken file is never overwritten
        report_config(&config, status);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[viewer\ncrossfade_ms = ");
    }

    #[test]
    fn test_missing_catalog_falls_back() {
        let mut config = AppConfig::default();
        config.gallery.catalog_path = Some(PathBuf::from("/nonexistent/folio/gallery.toml"));
        assert_eq!(load_catalog(&config).len(), Catalog::builtin().len());
    }
}

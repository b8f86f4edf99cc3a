//! Structured logging setup with tracing

use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "folio.log";

/// Initialize the logging system
pub fn init_logging(default_filter: &str) -> anyhow::Result<WorkerGuard> {
    let log_dir = super::log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    #[cfg(debug_assertions)]
    {
        // Development: pretty console output + file
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .with(fmt::layer().json().with_writer(non_blocking))
            .try_init()?;
    }

    #[cfg(not(debug_assertions))]
    {
        // Release: compact console + JSON file
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact())
            .with(fmt::layer().json().with_writer(non_blocking))
            .try_init()?;
    }

    tracing::info!("Logging initialized in {:?}", log_dir);
    Ok(guard)
}

/// Clean up log files older than `days` in the application log directory
pub fn cleanup_old_logs(days: u32) -> anyhow::Result<usize> {
    let deleted = cleanup_logs_in(&super::log_dir(), days)?;
    tracing::info!("Cleaned up {} old log files", deleted);
    Ok(deleted)
}

/// Delete rotated log files in `dir` last modified more than `days` ago
pub fn cleanup_logs_in(dir: &Path, days: u32) -> anyhow::Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let threshold = SystemTime::now() - Duration::from_secs(u64::from(days) * 24 * 60 * 60);
    let mut deleted = 0;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX));
        if !is_log {
            continue;
        }

        let modified = entry.metadata().and_then(|m| m.modified());
        if matches!(modified, Ok(time) if time < threshold) && std::fs::remove_file(&path).is_ok() {
            deleted += 1;
            tracing::debug!("Deleted old log: {:?}", path);
        }
    }

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_keeps_fresh_logs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("folio.log.2026-10-01"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        assert_eq!(cleanup_logs_in(dir.path(), 7).unwrap(), 0);
        assert!(dir.path().join("folio.log.2026-10-01").exists());
    }

    #[test]
    fn test_cleanup_zero_days_removes_only_logs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("folio.log.2026-10-01"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();
        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(cleanup_logs_in(dir.path(), 0).unwrap(), 1);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_cleanup_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_logs_in(&dir.path().join("absent"), 7).unwrap(), 0);
    }
}

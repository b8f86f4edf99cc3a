//! Folio logging and crash reporting
//!
//! Console + rolling JSON file logging, log retention, and a panic hook that
//! writes a crash dump.

mod logging;
mod panic_hook;

pub use logging::{cleanup_logs_in, cleanup_old_logs, init_logging};
pub use panic_hook::init_panic_hook;
pub use tracing_appender::non_blocking::WorkerGuard;

use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the application log directory
pub fn log_dir() -> PathBuf {
    ProjectDirs::from("com", "Folio", "Folio")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialize logging and the panic hook.
///
/// `default_filter` applies when `RUST_LOG` is unset. The returned guard flushes
/// the file writer on drop and must be held until exit.
pub fn init(default_filter: &str) -> anyhow::Result<WorkerGuard> {
    let guard = init_logging(default_filter)?;
    init_panic_hook();
    Ok(guard)
}

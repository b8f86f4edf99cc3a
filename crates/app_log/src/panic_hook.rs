//! Panic hook for crash reporting

use backtrace::Backtrace;
use chrono::Local;
use std::any::Any;
use std::panic::PanicHookInfo;

/// Initialize the panic hook for crash reporting
pub fn init_panic_hook() {
    std::panic::set_hook(Box::new(panic_handler));
    tracing::debug!("Panic hook initialized");
}

fn panic_handler(info: &PanicHookInfo) {
    let thread = std::thread::current();
    let location = info
        .location()
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
        .unwrap_or_else(|| "<unknown>".to_string());

    let report = crash_report(
        thread.name().unwrap_or("<unnamed>"),
        &location,
        payload_message(info.payload()),
        &format!("{:?}", Backtrace::new()),
    );

    eprintln!("{}", report);
    tracing::error!("{}", report);

    let dump_filename = format!("folio_crash_{}.txt", Local::now().format("%Y%m%d_%H%M%S"));
    let dump_path = std::env::temp_dir().join(&dump_filename);

    match std::fs::write(&dump_path, &report) {
        Ok(()) => eprintln!("Crash dump written to {}", dump_path.display()),
        Err(e) => eprintln!("Failed to write crash dump: {}", e),
    }
}

fn payload_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<unknown>")
}

fn crash_report(thread: &str, location: &str, message: &str, backtrace: &str) -> String {
    format!(
        "=== FOLIO PANIC ===\n\
         Timestamp: {}\n\
         Thread: {}\n\
         Location: {}\n\
         Payload: {}\n\n\
         Stack Trace:\n{}",
        Local::now().to_rfc3339(),
        thread,
        location,
        message,
        backtrace
    )
}

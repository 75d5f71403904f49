use std::backtrace::{Backtrace, BacktraceStatus};
use std::panic::PanicHookInfo;

fn payload_str<'a>(panic_info: &'a PanicHookInfo<'_>) -> Option<&'a str> {
    let payload = panic_info.payload();
    if let Some(s) = payload.downcast_ref::<&str>() {
        Some(s)
    } else {
        payload.downcast_ref::<String>().map(String::as_str)
    }
}

/// Report panics through `tracing` so they reach the configured appenders,
/// falling back to stderr when no subscriber listens at `ERROR`.
pub fn tracing_panic_hook(panic_info: &PanicHookInfo) {
    let payload = payload_str(panic_info);
    let location = panic_info.location().map(ToString::to_string);
    let backtrace = Backtrace::capture();
    let backtrace =
        (backtrace.status() == BacktraceStatus::Captured).then(|| format!("\n{backtrace}"));
    let backtrace = backtrace.as_deref().unwrap_or_default();

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            panic.payload = payload,
            panic.location = location,
            "A panic occurred{backtrace}"
        );
    } else {
        match payload {
            Some(payload) => eprintln!("A panic occurred: {payload}{backtrace}"),
            None => eprintln!("A panic occurred{backtrace}"),
        }
    }
}

#![deny(missing_docs)]
//! Logging macros for the chat poller crates.
//!
//! Library code logs through `chat_*` so the facade can be swapped in one
//! place. Each macro accepts an optional `target:` like the `log` macros do.

#[doc(hidden)]
pub use log;

/// Trace-level log line, for per-request chatter.
#[macro_export]
macro_rules! chat_trace {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::log::trace!(target: $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log::trace!($($arg)+)
    };
}

/// Debug-level log line.
#[macro_export]
macro_rules! chat_debug {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::log::debug!(target: $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log::debug!($($arg)+)
    };
}

/// Info-level log line.
#[macro_export]
macro_rules! chat_info {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::log::info!(target: $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log::info!($($arg)+)
    };
}

/// Warn-level log line; used for dropped navigation and failed requests.
#[macro_export]
macro_rules! chat_warn {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::log::warn!(target: $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log::warn!($($arg)+)
    };
}

/// Error-level log line.
#[macro_export]
macro_rules! chat_error {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::log::error!(target: $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log::error!($($arg)+)
    };
}

/// Installs a terminal logger for tests. Later calls are no-ops.
///
/// The level defaults to `debug` and can be changed with `CHAT_TEST_LOG`
/// (`off`, `error`, `warn`, `info`, `debug`, `trace`).
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

    let level = std::env::var("CHAT_TEST_LOG")
        .ok()
        .and_then(|raw| raw.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Debug);

    let _ = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto);
}

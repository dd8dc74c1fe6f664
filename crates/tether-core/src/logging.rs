//! Logging facilities for Tether.
//!
//! Tether uses the `tracing` crate for instrumentation. Nothing is printed
//! unless the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("tether=debug,tether_core=info")
//!     .init();
//! ```
//!
//! Every event is emitted with one of the [`targets`] below so subsystems can
//! be filtered independently.

/// Target names for log filtering.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "tether_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "tether_core::signal";
    /// Timer system target.
    pub const TIMER: &str = "tether_core::timer";
    /// Headless document (tree, events, observers, scheduling).
    pub const DOM: &str = "tether::dom";
    /// Placement engine and re-anchor loop.
    pub const ANCHOR: &str = "tether::anchor";
    /// Monitor controllers.
    pub const CONTROLLER: &str = "tether::controller";
    /// Roving focus and selection.
    pub const ROVING: &str = "tether::roving";
    /// Interactivity checker and focus trap.
    pub const INTERACTIVITY: &str = "tether::interactivity";
    /// Configuration loading.
    pub const CONFIG: &str = "tether::config";
    /// Performance spans.
    pub const PERF: &str = "tether::perf";
}

/// A guard that keeps a tracing span entered until it is dropped.
///
/// Useful for measuring the duration of an operation in a profiler or a
/// `tracing` timing layer.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "tether::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Trace-level event on the core target.
#[macro_export]
macro_rules! tether_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "tether_core", $($arg)*)
    };
}

/// Debug-level event on the core target.
#[macro_export]
macro_rules! tether_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "tether_core", $($arg)*)
    };
}

/// Warn-level event on the core target.
#[macro_export]
macro_rules! tether_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "tether_core", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new("test_operation");
        tether_trace!("inside span");
        tether_debug!(value = 1, "inside span");
    }
}

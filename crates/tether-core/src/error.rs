//! Error types for Tether core.

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the core primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The timer ID is invalid or the timer has already fired or been stopped.
    #[error("Invalid or expired timer ID")]
    InvalidTimerId,

    /// The connection ID is invalid or has already been disconnected.
    #[error("Invalid or disconnected connection ID")]
    InvalidConnection,

    /// The signal backing a connection has been dropped.
    #[error("Signal has been dropped")]
    SignalDropped,
}

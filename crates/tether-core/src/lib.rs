//! Core systems for Tether.
//!
//! This crate provides the element-agnostic building blocks the rest of the
//! workspace is assembled from:
//!
//! - **Geometry**: [`Point`], [`Size`] and [`Rect`] in logical pixels
//! - **Signal/Slot System**: [`Signal`] with RAII [`ConnectionGuard`]s
//! - **Timers**: [`TimerManager`], one-shot timers on a virtual clock
//! - **Microtasks**: [`TaskQueue`], a FIFO of deferred work
//! - **Logging**: `tracing` targets, [`PerfSpan`] and helper macros
//!
//! # Signal Example
//!
//! ```
//! use tether_core::Signal;
//!
//! let pressed = Signal::<bool>::new();
//! let conn_id = pressed.connect(|down| println!("pressed: {}", down));
//! pressed.emit(true);
//! pressed.disconnect(conn_id);
//! ```
//!
//! # Timer Example
//!
//! ```
//! use std::time::Duration;
//! use tether_core::TimerManager;
//!
//! let mut timers = TimerManager::new();
//! timers.start_one_shot(Duration::from_millis(300), "show tooltip");
//!
//! assert!(timers.pop_due(Duration::from_millis(100)).is_none());
//! let (_, payload) = timers.pop_due(Duration::from_millis(300)).unwrap();
//! assert_eq!(payload, "show tooltip");
//! ```

mod error;
pub mod geometry;
pub mod logging;
pub mod signal;
mod task;
mod timer;

pub use error::{CoreError, Result};
pub use geometry::{Point, Rect, Size};
pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use task::{TaskId, TaskQueue};
pub use timer::{TimerId, TimerManager};

//! Monitors that translate raw platform events into component state.
//!
//! Every monitor is a [`MonitorController`] with its own [`MonitorHooks`].
//! The controller owns the observed-target set and the per-target
//! registrations; hooks only decide what to subscribe to and what to emit.
//! All monitors stop observing when their host element disconnects or when
//! they are dropped.
//!
//! | Monitor | Emits |
//! |---------|-------|
//! | [`HoverMonitor`] | [`StateChange`] after the configured delays |
//! | [`FocusMonitor`] | [`FocusChange`] with focus-visible |
//! | [`PressMonitor`] | [`PressChange`] for pointer and keyboard presses |
//! | [`ResizeMonitor`] | [`ResizeEntry`](crate::dom::ResizeEntry) |
//! | [`MutationMonitor`] | [`MutationBatch`] |
//! | [`ScrollMonitor`] | [`ScrollChange`] |

mod base;
mod focus;
mod hover;
mod mutation;
mod press;
mod resize;
mod scroll;

pub use base::{MonitorController, MonitorHooks, Registration};
pub use focus::{FocusChange, FocusHooks, FocusMonitor};
pub use hover::{HoverConfig, HoverHooks, HoverMonitor};
pub use mutation::{MutationBatch, MutationHooks, MutationMonitor};
pub use press::{PressChange, PressConfig, PressHooks, PressMonitor, PressSource};
pub use resize::{ResizeHooks, ResizeMonitor};
pub use scroll::{ScrollChange, ScrollHooks, ScrollMonitor};

use crate::dom::ElementId;

/// A boolean state of a target turned on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateChange {
    pub target: ElementId,
    pub active: bool,
}

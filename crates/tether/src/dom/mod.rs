//! The headless host document the core runs against.
//!
//! A [`Document`] is an arena of elements with the state the rest of the crate
//! reads (attributes, geometry, scroll offsets, shadow roots, slots and focus)
//! and the platform primitives it subscribes to (event listeners, resize and
//! mutation observers, timers and microtasks). Hosts drive it by feeding it
//! geometry and input events.

mod debug;
mod document;
mod element;
mod events;
mod listeners;
mod observers;
mod tree;

pub use debug::{ElementTreeDebug, TreeFormatOptions, TreeStyle};
pub use document::{Capability, Document, PlatformCapabilities, WeakDocument};
pub use element::{ElementData, ElementId, NodeKind};
pub use events::{
    Event, EventPayload, EventType, FocusData, FocusOrigin, Key, KeyData, KeyboardModifiers,
    MouseButton, PointerData, PointerType,
};
pub use listeners::{ListenerGuard, ListenerId};
pub use observers::{
    MutationKind, MutationOptions, MutationRecord, ObserverGuard, ObserverId, ResizeEntry,
};

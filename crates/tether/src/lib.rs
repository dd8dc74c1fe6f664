//! Tether - the interaction core behind Material components.
//!
//! Floating surfaces (menus, tooltips, select panels) and shared affordances
//! (ripples, state layers, focus rings) all need the same few services from
//! their host controls. This crate provides them against a headless
//! [`Document`](dom::Document):
//!
//! - [`anchor`]: viewport-aware placement with flip, shift and offset, and a
//!   re-anchor loop that follows layout changes
//! - [`controller`]: hover, focus, press, resize, mutation and scroll monitors
//!   over a dynamic set of targets
//! - [`roving`]: roving-tabindex keyboard navigation and grouped selection
//! - [`interactivity`]: focusability checks and a focus trap
//!
//! Every subscription is an RAII guard; dropping it unsubscribes.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use tether::anchor::{AnchorOptions, AnchorPosition, position_anchor};
//! use tether::dom::Document;
//! use tether_core::{Rect, Size};
//!
//! let doc = Document::new(Size::new(800.0, 600.0));
//! let button = doc.create_element("md-filled-button");
//! let menu = doc.create_element("md-menu");
//! doc.append_child(doc.root(), button).unwrap();
//! doc.append_child(doc.root(), menu).unwrap();
//! doc.set_rect(button, Rect::new(100.0, 100.0, 80.0, 40.0)).unwrap();
//! doc.set_rect(menu, Rect::new(0.0, 0.0, 120.0, 200.0)).unwrap();
//!
//! let placed = Arc::new(Mutex::new(None));
//! let sink = placed.clone();
//! let _subscription = position_anchor(
//!     &doc,
//!     menu,
//!     button,
//!     AnchorOptions::new(AnchorPosition::BottomStart),
//!     move |x, y, position| *sink.lock() = Some((x, y, position)),
//! );
//! doc.run_microtasks();
//! assert_eq!(*placed.lock(), Some((100.0, 140.0, AnchorPosition::BottomStart)));
//! ```

pub mod anchor;
pub mod capability;
pub mod config;
pub mod controller;
pub mod dom;
mod error;
pub mod interactivity;
pub mod roving;

pub use error::{Error, Result};
pub use tether_core;

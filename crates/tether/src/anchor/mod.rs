//! Anchored positioning.
//!
//! [`compute_placement`] is a pure function from anchor geometry, floating
//! size and viewport to a [`Placement`]. [`position_anchor`] runs it against
//! a [`Document`](crate::dom::Document) and keeps re-running it while layout
//! changes.
//!
//! # Example
//!
//! ```
//! use tether::anchor::{AnchorOptions, AnchorPosition, compute_placement};
//! use tether_core::{Rect, Size};
//!
//! let anchor = Rect::new(300.0, 570.0, 40.0, 20.0);
//! let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
//! let options = AnchorOptions::new(AnchorPosition::BottomStart).with_flip(true);
//!
//! let placement = compute_placement(anchor, &[], Size::new(100.0, 50.0), viewport, &options);
//! assert_eq!(placement.position, AnchorPosition::TopStart);
//! assert_eq!((placement.x, placement.y), (300.0, 520.0));
//! ```

mod auto_update;
mod inline;
mod options;
mod placement;
mod position;

pub use auto_update::{AnchorSubscription, position_anchor};
pub use inline::{group_lines, inline_anchor_rect};
pub use options::{AnchorOptions, FlipPolicy};
pub use placement::{Placement, compute_placement, to_offset_space};
pub use position::{Alignment, AnchorPosition, ParsePositionError, Side};

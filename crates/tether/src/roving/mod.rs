//! Keyboard navigation and selection for composite widgets.
//!
//! [`RovingFocusManager`] moves the keyboard cursor (the active item) and
//! keeps exactly one item in the Tab order. [`SelectionManager`] tracks the
//! committed choice separately; connect the two when selection should follow
//! focus:
//!
//! ```
//! use std::sync::Arc;
//! use tether::roving::{RovingConfig, RovingFocusManager, SelectionManager, SelectionMode};
//! use tether::dom::Document;
//! use tether_core::Size;
//!
//! let doc = Document::new(Size::new(200.0, 200.0));
//! let roving = RovingFocusManager::new(&doc, RovingConfig::default());
//! let selection = Arc::new(SelectionManager::new(SelectionMode::FollowsFocus));
//!
//! let tab = doc.create_element("md-primary-tab");
//! doc.append_child(doc.root(), tab).unwrap();
//! selection.add("tabs", tab);
//! roving.set_items(vec![tab]);
//!
//! let sink = selection.clone();
//! roving.active_changed().connect(move |&active| sink.on_active_changed(active));
//! roving.update_active_item(Some(tab));
//! assert_eq!(selection.selected("tabs"), Some(tab));
//! ```

mod manager;
mod selection;

pub use manager::{ItemsDiff, Orientation, RovingBinding, RovingConfig, RovingFocusManager};
pub use selection::{SelectionChange, SelectionManager, SelectionMode};

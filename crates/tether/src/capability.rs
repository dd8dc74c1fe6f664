//! Capability traits shared by components that focus or disable elements.

use crate::dom::{Document, ElementId, FocusOrigin};
use crate::error::Result;
use crate::interactivity;

/// Something that can receive keyboard focus.
pub trait Focusable {
    /// Move focus here. Returns `false` if focus was refused.
    fn focus(&self, origin: FocusOrigin) -> bool;

    /// Whether sequential keyboard navigation can reach this.
    fn is_focusable(&self) -> bool;

    /// Whether this, or something inside it, currently has focus.
    fn has_focus(&self) -> bool;
}

/// Something that can be disabled.
pub trait Disableable {
    /// `disabled` or `aria-disabled="true"`.
    fn is_disabled(&self) -> bool;

    fn set_disabled(&self, disabled: bool) -> Result<()>;
}

/// An element in a particular document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    doc: Document,
    id: ElementId,
}

impl ElementHandle {
    pub fn new(doc: &Document, id: ElementId) -> Self {
        Self {
            doc: doc.clone(),
            id,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }
}

impl Focusable for ElementHandle {
    fn focus(&self, origin: FocusOrigin) -> bool {
        self.doc.focus(self.id, origin)
    }

    fn is_focusable(&self) -> bool {
        interactivity::is_focusable(&self.doc, self.id, None)
    }

    fn has_focus(&self) -> bool {
        self.doc.has_focus_within(self.id)
    }
}

impl Disableable for ElementHandle {
    fn is_disabled(&self) -> bool {
        self.doc
            .with_element(self.id, |el| el.is_disabled() || el.is_aria_disabled())
            .unwrap_or(false)
    }

    fn set_disabled(&self, disabled: bool) -> Result<()> {
        self.doc.toggle_attribute(self.id, "disabled", disabled)
    }
}

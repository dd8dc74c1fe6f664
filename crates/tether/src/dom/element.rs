//! Element data stored in the document arena.

use std::collections::BTreeMap;

use slotmap::new_key_type;
use tether_core::{Point, Rect};

new_key_type! {
    /// A handle to a node in a [`Document`](super::Document).
    ///
    /// Ids stay valid after the node is removed from the tree; the node simply
    /// becomes disconnected. Every accessor treats an id from another document
    /// as unknown.
    pub struct ElementId;
}

/// The kind of a node in the document arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The document root. It also stands for the window: viewport scroll and
    /// resize events are dispatched to it.
    Root,
    /// A regular element.
    Element,
    /// A shadow root attached to a host element.
    ShadowRoot {
        /// Whether focusing the host delegates focus into the shadow tree.
        delegates_focus: bool,
    },
}

/// The state the core reads from an element.
#[derive(Debug, Clone)]
pub struct ElementData {
    pub(crate) kind: NodeKind,
    pub(crate) tag: String,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) shadow_root: Option<ElementId>,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) rect: Rect,
    pub(crate) client_rects: Vec<Rect>,
    pub(crate) scroll_offset: Point,
    pub(crate) scroll_container: bool,
    pub(crate) positioned: bool,
    pub(crate) connected: bool,
}

impl ElementData {
    pub(crate) fn new(kind: NodeKind, tag: &str) -> Self {
        Self {
            kind,
            tag: tag.to_ascii_lowercase(),
            parent: None,
            children: Vec::new(),
            shadow_root: None,
            attributes: BTreeMap::new(),
            rect: Rect::ZERO,
            client_rects: Vec::new(),
            scroll_offset: Point::ZERO,
            scroll_container: false,
            positioned: false,
            connected: false,
        }
    }

    /// The node kind.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Lowercase tag name (`"#document"` and `"#shadow-root"` for the
    /// non-element kinds).
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The light-tree parent. For a shadow root this is its host.
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Light-tree children in order.
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// The attached shadow root, if any.
    pub fn shadow_root(&self) -> Option<ElementId> {
        self.shadow_root
    }

    /// All attributes, sorted by name.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Get an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Check if an attribute is present.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Border box in viewport coordinates.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Line boxes of inline content. Falls back to the border box.
    pub fn client_rects(&self) -> Vec<Rect> {
        if self.client_rects.is_empty() {
            vec![self.rect]
        } else {
            self.client_rects.clone()
        }
    }

    /// Current scroll offset.
    pub fn scroll_offset(&self) -> Point {
        self.scroll_offset
    }

    /// Whether the element clips and scrolls its content.
    pub fn is_scroll_container(&self) -> bool {
        self.scroll_container
    }

    /// Whether the element is positioned (an offset-parent candidate).
    pub fn is_positioned(&self) -> bool {
        self.positioned
    }

    /// Whether the element is attached to the document root.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether this is a regular element (not the root or a shadow root).
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Custom elements carry a hyphen in their tag name.
    pub fn is_custom_element(&self) -> bool {
        self.is_element() && self.tag.contains('-')
    }

    /// Whether this is a `<slot>` element.
    pub fn is_slot(&self) -> bool {
        self.is_element() && self.tag == "slot"
    }

    /// The name a `<slot>` element accepts content for (empty for the
    /// default slot).
    pub fn slot_name(&self) -> &str {
        self.attribute("name").unwrap_or("")
    }

    /// The slot a light child asks to be assigned to (empty for default).
    pub fn requested_slot(&self) -> &str {
        self.attribute("slot").unwrap_or("")
    }

    /// The `disabled` attribute is present.
    pub fn is_disabled(&self) -> bool {
        self.has_attribute("disabled")
    }

    /// `aria-disabled="true"`.
    pub fn is_aria_disabled(&self) -> bool {
        self.attribute("aria-disabled") == Some("true")
    }

    /// `aria-hidden="true"`.
    pub fn is_aria_hidden(&self) -> bool {
        self.attribute("aria-hidden") == Some("true")
    }

    /// The parsed `tabindex` attribute. Unparsable values count as absent.
    pub fn tab_index(&self) -> Option<i32> {
        self.attribute("tabindex")
            .and_then(|value| value.trim().parse().ok())
    }

    /// `contenteditable` is present and not `"false"`.
    pub fn is_content_editable(&self) -> bool {
        matches!(self.attribute("contenteditable"), Some(value) if value != "false")
    }
}

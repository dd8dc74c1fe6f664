use tether_core::logging::targets;

use super::find_interactive_elements;
use crate::capability::{ElementHandle, Focusable};
use crate::dom::{Document, ElementId, Event, EventType, FocusOrigin, Key, ListenerGuard};

/// Keeps Tab and Shift+Tab inside a container.
///
/// Tabbing past the last interactive element wraps to the first, and
/// Shift+Tab before the first wraps to the last. The trap is released when
/// dropped.
pub struct FocusTrap {
    container: ElementId,
    _listener: ListenerGuard,
}

impl FocusTrap {
    /// Trap focus inside `container`.
    pub fn new(doc: &Document, container: ElementId) -> Self {
        let listener = doc.add_event_listener(container, EventType::KeyDown, move |doc, event| {
            Self::handle(doc, container, event);
        });
        tracing::debug!(target: targets::INTERACTIVITY, ?container, "focus trap installed");
        Self {
            container,
            _listener: listener,
        }
    }

    /// The trapping container.
    pub fn container(&self) -> ElementId {
        self.container
    }

    /// Focus the first interactive element. Returns `false` if there is none.
    pub fn focus_first(&self, doc: &Document) -> bool {
        Self::focus_edge(doc, self.container, false)
    }

    /// Focus the last interactive element.
    pub fn focus_last(&self, doc: &Document) -> bool {
        Self::focus_edge(doc, self.container, true)
    }

    /// Handle a key-down inside the container.
    ///
    /// Returns `true` (and prevents the default) when the key moved focus.
    /// The installed listener calls this; hosts that route keys themselves
    /// may call it directly.
    pub fn handle_key_down(&self, doc: &Document, event: &Event) -> bool {
        Self::handle(doc, self.container, event)
    }

    fn focus_edge(doc: &Document, container: ElementId, last: bool) -> bool {
        let items = find_interactive_elements(doc, container);
        let item = if last { items.last() } else { items.first() };
        item.is_some_and(|&id| ElementHandle::new(doc, id).focus(FocusOrigin::Keyboard))
    }

    fn handle(doc: &Document, container: ElementId, event: &Event) -> bool {
        let Some(data) = event.key_data() else {
            return false;
        };
        if data.key != Key::Tab || data.modifiers.any_command() || event.is_default_prevented() {
            return false;
        }
        let items = find_interactive_elements(doc, container);
        if items.is_empty() {
            event.prevent_default();
            return true;
        }

        let backwards = data.modifiers.shift;
        let current = doc
            .active_element()
            .and_then(|active| items.iter().position(|&id| doc.composed_contains(id, active)));
        let len = items.len();
        let next = match (current, backwards) {
            (Some(i), false) => (i + 1) % len,
            (Some(i), true) => (i + len - 1) % len,
            (None, false) => 0,
            (None, true) => len - 1,
        };

        tracing::trace!(target: targets::INTERACTIVITY, ?current, next, backwards, "focus trap move");
        event.prevent_default();
        ElementHandle::new(doc, items[next]).focus(FocusOrigin::Keyboard);
        true
    }
}

impl std::fmt::Debug for FocusTrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusTrap")
            .field("container", &self.container)
            .finish()
    }
}

//! Input and notification events dispatched through a [`Document`](super::Document).
//!
//! An [`Event`] carries its [`EventType`], the target element and a typed
//! payload. Events of bubbling types travel from the target up the composed
//! ancestor chain; the others are delivered to the target only.
//!
//! ```
//! use tether::dom::{Document, Event, EventType, PointerData};
//! use tether_core::{Point, Size};
//!
//! let doc = Document::new(Size::new(800.0, 600.0));
//! let button = doc.create_element("button");
//! doc.append_child(doc.root(), button).unwrap();
//!
//! let event = Event::pointer(EventType::PointerDown, button, PointerData::mouse(Point::new(4.0, 4.0)));
//! let not_cancelled = doc.dispatch_event(&event);
//! assert!(not_cancelled);
//! ```

use std::cell::Cell;

use serde::{Deserialize, Serialize};
use tether_core::Point;

use super::element::ElementId;

/// Keyboard modifiers that may be held during input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held.
    pub control: bool,
    /// The Alt key is held (Option on macOS).
    pub alt: bool,
    /// The Meta key is held (Windows key, Cmd on macOS).
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        control: false,
        alt: false,
        meta: false,
    };

    /// Control modifier only.
    pub const CTRL: Self = Self {
        shift: false,
        control: true,
        alt: false,
        meta: false,
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }

    /// Check if a modifier other than Shift is pressed.
    pub fn any_command(&self) -> bool {
        self.control || self.alt || self.meta
    }
}

/// Logical keys the core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Space,
    Tab,
    Escape,
    Backspace,
    /// Any printable character other than space.
    Character(char),
    /// A key the core has no use for.
    Unidentified,
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MouseButton {
    /// Primary button (usually left).
    Left = 0,
    /// Middle button (scroll wheel click).
    Middle = 1,
    /// Secondary button (usually right).
    Right = 2,
    /// Additional button 1 (e.g., browser back).
    Button4 = 3,
    /// Additional button 2 (e.g., browser forward).
    Button5 = 4,
}

/// The device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerType {
    #[default]
    Mouse,
    Touch,
    Pen,
}

/// Pointer event payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerData {
    /// The device type.
    pub pointer_type: PointerType,
    /// The button that changed state (meaningful for down/up).
    pub button: MouseButton,
    /// Whether this is the primary pointer of its type.
    pub is_primary: bool,
    /// Position in viewport coordinates.
    pub position: Point,
    /// Keyboard modifiers held during the event.
    pub modifiers: KeyboardModifiers,
}

impl PointerData {
    /// A primary mouse pointer with the left button.
    pub fn mouse(position: Point) -> Self {
        Self {
            pointer_type: PointerType::Mouse,
            button: MouseButton::Left,
            is_primary: true,
            position,
            modifiers: KeyboardModifiers::NONE,
        }
    }

    /// A primary touch contact.
    pub fn touch(position: Point) -> Self {
        Self {
            pointer_type: PointerType::Touch,
            ..Self::mouse(position)
        }
    }

    /// Use a different button.
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    /// Mark the pointer as (non-)primary.
    pub fn with_primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }
}

/// Keyboard event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyData {
    /// The logical key.
    pub key: Key,
    /// Keyboard modifiers held during the event.
    pub modifiers: KeyboardModifiers,
    /// Whether this is an auto-repeat event (key held down).
    pub is_repeat: bool,
}

impl KeyData {
    /// A plain, non-repeating key event.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: KeyboardModifiers::NONE,
            is_repeat: false,
        }
    }

    /// Attach modifiers.
    pub fn with_modifiers(mut self, modifiers: KeyboardModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Mark as an auto-repeat event.
    pub fn repeating(mut self) -> Self {
        self.is_repeat = true;
        self
    }
}

/// What caused a focus change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FocusOrigin {
    /// Keyboard navigation (Tab, arrows). Focus indicators should show.
    Keyboard,
    /// Pointer interaction.
    Pointer,
    /// Script called `focus()`.
    #[default]
    Programmatic,
}

/// Focus event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusData {
    /// What caused the change.
    pub origin: FocusOrigin,
    /// The element losing focus (for focus-in) or gaining it (for focus-out).
    pub related_target: Option<ElementId>,
}

/// The type of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    PointerEnter,
    PointerLeave,
    PointerDown,
    PointerUp,
    PointerCancel,
    KeyDown,
    KeyUp,
    FocusIn,
    FocusOut,
    /// The target scrolled. On the root this is a viewport scroll.
    Scroll,
    /// Dispatched to the root when the viewport size changes.
    Resize,
}

impl EventType {
    /// Whether events of this type propagate to composed ancestors.
    pub fn bubbles(self) -> bool {
        matches!(
            self,
            Self::PointerDown
                | Self::PointerUp
                | Self::PointerCancel
                | Self::KeyDown
                | Self::KeyUp
                | Self::FocusIn
                | Self::FocusOut
        )
    }
}

/// Typed event payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventPayload {
    Pointer(PointerData),
    Key(KeyData),
    Focus(FocusData),
    None,
}

/// An event being dispatched.
#[derive(Debug)]
pub struct Event {
    event_type: EventType,
    target: ElementId,
    payload: EventPayload,
    current_target: Cell<Option<ElementId>>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    /// Create an event with an explicit payload.
    pub fn new(event_type: EventType, target: ElementId, payload: EventPayload) -> Self {
        Self {
            event_type,
            target,
            payload,
            current_target: Cell::new(None),
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    /// Create a pointer event.
    pub fn pointer(event_type: EventType, target: ElementId, data: PointerData) -> Self {
        Self::new(event_type, target, EventPayload::Pointer(data))
    }

    /// Create a keyboard event.
    pub fn key(event_type: EventType, target: ElementId, data: KeyData) -> Self {
        Self::new(event_type, target, EventPayload::Key(data))
    }

    /// Create a focus event.
    pub fn focus(event_type: EventType, target: ElementId, data: FocusData) -> Self {
        Self::new(event_type, target, EventPayload::Focus(data))
    }

    /// Create a payload-less event (scroll, resize).
    pub fn plain(event_type: EventType, target: ElementId) -> Self {
        Self::new(event_type, target, EventPayload::None)
    }

    /// The event type.
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// The element the event was dispatched to.
    pub fn target(&self) -> ElementId {
        self.target
    }

    /// The element whose listener is currently running.
    pub fn current_target(&self) -> Option<ElementId> {
        self.current_target.get()
    }

    pub(crate) fn set_current_target(&self, id: Option<ElementId>) {
        self.current_target.set(id);
    }

    /// The payload.
    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// Pointer payload, if this is a pointer event.
    pub fn pointer_data(&self) -> Option<&PointerData> {
        match &self.payload {
            EventPayload::Pointer(data) => Some(data),
            _ => None,
        }
    }

    /// Key payload, if this is a keyboard event.
    pub fn key_data(&self) -> Option<&KeyData> {
        match &self.payload {
            EventPayload::Key(data) => Some(data),
            _ => None,
        }
    }

    /// Focus payload, if this is a focus event.
    pub fn focus_data(&self) -> Option<&FocusData> {
        match &self.payload {
            EventPayload::Focus(data) => Some(data),
            _ => None,
        }
    }

    /// Cancel the event's default action.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    /// Whether a listener cancelled the default action.
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Stop propagation to further ancestors. Remaining listeners on the
    /// current element still run.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    /// Whether propagation was stopped.
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

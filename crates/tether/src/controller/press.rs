//! Pointer and keyboard activation as one pressed/released stream.
//!
//! A target has a single press state. While one source (pointer or
//! keyboard) holds the press, input from the other source is ignored, and
//! only the source that started the press can end it.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tether_core::logging::targets;
use tether_core::{Point, Signal};

use super::base::{MonitorController, MonitorHooks, Registration};
use crate::dom::{Document, ElementId, Event, EventType, Key, MouseButton, PointerType};

/// Which keys activate, besides Space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressConfig {
    /// Enter presses as well as Space.
    pub enter: bool,
}

impl Default for PressConfig {
    fn default() -> Self {
        Self { enter: true }
    }
}

impl PressConfig {
    pub fn with_enter(mut self, enter: bool) -> Self {
        self.enter = enter;
        self
    }

    fn activates(&self, key: Key) -> bool {
        key == Key::Space || (self.enter && key == Key::Enter)
    }
}

/// What started a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PressSource {
    Pointer,
    Keyboard,
}

/// A press starting or ending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressChange {
    pub target: ElementId,
    pub pressed: bool,
    /// Viewport position of the press. Keyboard presses report the target's
    /// center.
    pub point: Point,
    pub source: PressSource,
    /// The press ended without activating (pointer cancel or leave, focus
    /// loss).
    pub cancelled: bool,
}

#[derive(Debug, Clone, Copy)]
struct ActivePress {
    source: PressSource,
    point: Point,
    key: Option<Key>,
}

#[derive(Default)]
struct PressShared {
    config: Mutex<PressConfig>,
    presses: Mutex<HashMap<ElementId, Option<ActivePress>>>,
    changed: Signal<PressChange>,
}

impl PressShared {
    fn begin(&self, target: ElementId, press: ActivePress) {
        {
            let mut presses = self.presses.lock();
            match presses.get_mut(&target) {
                Some(slot) if slot.is_none() => *slot = Some(press),
                _ => return,
            }
        }
        tracing::trace!(target: targets::CONTROLLER, ?target, source = ?press.source, "pressed");
        self.changed.emit(PressChange {
            target,
            pressed: true,
            point: press.point,
            source: press.source,
            cancelled: false,
        });
    }

    /// End the press of `target` if `source` holds it and `matches` agrees.
    fn end(
        &self,
        target: ElementId,
        source: PressSource,
        cancelled: bool,
        matches: impl FnOnce(&ActivePress) -> bool,
    ) {
        let ended = {
            let mut presses = self.presses.lock();
            let Some(slot) = presses.get_mut(&target) else {
                return;
            };
            let holds = slot
                .as_ref()
                .is_some_and(|press| press.source == source && matches(press));
            if holds { slot.take() } else { None }
        };
        let Some(press) = ended else {
            return;
        };
        tracing::trace!(target: targets::CONTROLLER, ?target, ?source, cancelled, "released");
        self.changed.emit(PressChange {
            target,
            pressed: false,
            point: press.point,
            source,
            cancelled,
        });
    }

    fn is_enabled(doc: &Document, target: ElementId) -> bool {
        doc.with_element(target, |el| !el.is_disabled() && !el.is_aria_disabled())
            .unwrap_or(false)
    }

    fn handle(weak: &Weak<Self>, doc: &Document, event: &Event) {
        let (Some(shared), Some(target)) = (weak.upgrade(), event.current_target()) else {
            return;
        };
        match event.event_type() {
            EventType::PointerDown => {
                let Some(data) = event.pointer_data() else {
                    return;
                };
                let primary_button = data.pointer_type != PointerType::Mouse || data.button == MouseButton::Left;
                if data.is_primary && primary_button && Self::is_enabled(doc, target) {
                    shared.begin(
                        target,
                        ActivePress {
                            source: PressSource::Pointer,
                            point: data.position,
                            key: None,
                        },
                    );
                }
            }
            EventType::PointerUp => shared.end(target, PressSource::Pointer, false, |_| true),
            EventType::PointerCancel | EventType::PointerLeave => {
                shared.end(target, PressSource::Pointer, true, |_| true);
            }
            EventType::KeyDown => {
                let Some(data) = event.key_data() else {
                    return;
                };
                let activates = shared.config.lock().activates(data.key);
                if !activates || data.is_repeat || data.modifiers.any_command() {
                    return;
                }
                if !doc.has_focus_within(target) || !Self::is_enabled(doc, target) {
                    return;
                }
                let point = doc.rect(target).map(|r| r.center()).unwrap_or(Point::ZERO);
                shared.begin(
                    target,
                    ActivePress {
                        source: PressSource::Keyboard,
                        point,
                        key: Some(data.key),
                    },
                );
            }
            EventType::KeyUp => {
                let Some(key) = event.key_data().map(|d| d.key) else {
                    return;
                };
                shared.end(target, PressSource::Keyboard, false, |press| press.key == Some(key));
            }
            EventType::FocusOut => {
                let stays_inside = event
                    .focus_data()
                    .and_then(|d| d.related_target)
                    .is_some_and(|next| doc.composed_contains(target, next));
                if !stays_inside {
                    shared.end(target, PressSource::Keyboard, true, |_| true);
                }
            }
            _ => {}
        }
    }
}

const PRESS_EVENTS: [EventType; 7] = [
    EventType::PointerDown,
    EventType::PointerUp,
    EventType::PointerCancel,
    EventType::PointerLeave,
    EventType::KeyDown,
    EventType::KeyUp,
    EventType::FocusOut,
];

/// Hooks for [`PressMonitor`].
pub struct PressHooks {
    shared: Arc<PressShared>,
}

impl MonitorHooks for PressHooks {
    fn attach(&self, doc: &Document, target: ElementId) -> Option<Registration> {
        self.shared.presses.lock().insert(target, None);
        let mut registration = Registration::new();
        for event_type in PRESS_EVENTS {
            let weak = Arc::downgrade(&self.shared);
            registration.push_listener(doc.add_event_listener(target, event_type, move |doc, event| {
                PressShared::handle(&weak, doc, event);
            }));
        }
        Some(registration)
    }

    fn detach(&self, _doc: &Document, target: ElementId, registration: Registration) {
        drop(registration);
        self.shared.presses.lock().remove(&target);
    }
}

/// Reports presses on a set of targets.
///
/// Pointer presses need the primary pointer (and, for a mouse, the primary
/// button); keyboard presses need focus on the target. Disabled targets are
/// never pressed.
pub struct PressMonitor {
    controller: MonitorController<PressHooks>,
}

impl PressMonitor {
    pub fn new(doc: &Document, host: ElementId, config: PressConfig) -> Self {
        let shared = Arc::new(PressShared::default());
        *shared.config.lock() = config;
        Self {
            controller: MonitorController::new(doc, host, PressHooks { shared }),
        }
    }

    pub fn changed(&self) -> &Signal<PressChange> {
        &self.controller.hooks().shared.changed
    }

    pub fn observe(&self, target: ElementId) -> bool {
        self.controller.observe(target)
    }

    pub fn unobserve(&self, target: ElementId) -> bool {
        self.controller.unobserve(target)
    }

    pub fn is_pressed(&self, target: ElementId) -> bool {
        self.controller
            .hooks()
            .shared
            .presses
            .lock()
            .get(&target)
            .is_some_and(Option::is_some)
    }

    pub fn set_config(&self, config: PressConfig) {
        *self.controller.hooks().shared.config.lock() = config;
    }

    pub fn controller(&self) -> &MonitorController<PressHooks> {
        &self.controller
    }
}

impl std::fmt::Debug for PressMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PressMonitor")
            .field("controller", &self.controller)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{FocusOrigin, KeyData, KeyboardModifiers, PointerData};
    use tether_core::{Rect, Size};

    struct Fixture {
        doc: Document,
        button: ElementId,
        monitor: PressMonitor,
        log: Arc<Mutex<Vec<PressChange>>>,
    }

    fn fixture(config: PressConfig) -> Fixture {
        let doc = Document::new(Size::new(400.0, 400.0));
        let button = doc.create_element("button");
        doc.append_child(doc.root(), button).unwrap();
        doc.set_rect(button, Rect::new(10.0, 20.0, 100.0, 40.0)).unwrap();
        let monitor = PressMonitor::new(&doc, button, config);
        monitor.observe(button);
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        monitor.changed().connect(move |c| sink.lock().push(*c));
        Fixture {
            doc,
            button,
            monitor,
            log,
        }
    }

    fn pointer(f: &Fixture, ty: EventType, data: PointerData) {
        f.doc.dispatch_event(&Event::pointer(ty, f.button, data));
    }

    #[test]
    fn test_space_on_focused_target_presses_at_center() {
        let f = fixture(PressConfig::default());
        f.doc.focus(f.button, FocusOrigin::Keyboard);
        f.doc.key_down(KeyData::new(Key::Space));
        assert!(f.monitor.is_pressed(f.button));
        f.doc.key_up(KeyData::new(Key::Space));

        let log = f.log.lock();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].point, Point::new(60.0, 40.0));
        assert!(log[0].pressed);
        assert_eq!(log[0].source, PressSource::Keyboard);
        assert!(!log[1].pressed && !log[1].cancelled);
    }

    #[test]
    fn test_keyboard_requires_focus_and_config() {
        let f = fixture(PressConfig::default().with_enter(false));
        f.doc.dispatch_event(&Event::key(EventType::KeyDown, f.button, KeyData::new(Key::Space)));
        f.doc.focus(f.button, FocusOrigin::Keyboard);
        f.doc.key_down(KeyData::new(Key::Enter));
        f.doc.key_down(KeyData::new(Key::Space).with_modifiers(KeyboardModifiers::CTRL));
        assert!(f.log.lock().is_empty());
    }

    #[test]
    fn test_non_primary_button_is_ignored() {
        let f = fixture(PressConfig::default());
        pointer(&f, EventType::PointerDown, PointerData::mouse(Point::new(5.0, 5.0)).with_button(MouseButton::Right));
        pointer(&f, EventType::PointerDown, PointerData::mouse(Point::new(5.0, 5.0)).with_primary(false));
        assert!(f.log.lock().is_empty());
    }

    #[test]
    fn test_pointer_press_release_and_cancel() {
        let f = fixture(PressConfig::default());
        pointer(&f, EventType::PointerDown, PointerData::mouse(Point::new(15.0, 25.0)));
        pointer(&f, EventType::PointerUp, PointerData::mouse(Point::new(15.0, 25.0)));
        pointer(&f, EventType::PointerDown, PointerData::touch(Point::new(30.0, 30.0)));
        pointer(&f, EventType::PointerLeave, PointerData::touch(Point::new(300.0, 300.0)));

        let log = f.log.lock();
        let summary: Vec<_> = log.iter().map(|c| (c.pressed, c.cancelled, c.point)).collect();
        assert_eq!(
            summary,
            vec![
                (true, false, Point::new(15.0, 25.0)),
                (false, false, Point::new(15.0, 25.0)),
                (true, false, Point::new(30.0, 30.0)),
                (false, true, Point::new(30.0, 30.0)),
            ]
        );
    }

    #[test]
    fn test_disabled_target_never_presses() {
        let f = fixture(PressConfig::default());
        f.doc.set_attribute(f.button, "aria-disabled", "true").unwrap();
        pointer(&f, EventType::PointerDown, PointerData::mouse(Point::ZERO));
        assert!(f.log.lock().is_empty());
    }

    #[test]
    fn test_sources_do_not_interleave() {
        let f = fixture(PressConfig::default());
        f.doc.focus(f.button, FocusOrigin::Keyboard);
        pointer(&f, EventType::PointerDown, PointerData::mouse(Point::ZERO));
        f.doc.key_down(KeyData::new(Key::Space));
        f.doc.key_up(KeyData::new(Key::Space));
        assert!(f.monitor.is_pressed(f.button));
        pointer(&f, EventType::PointerUp, PointerData::mouse(Point::ZERO));
        assert!(!f.monitor.is_pressed(f.button));
        assert_eq!(f.log.lock().len(), 2);
    }

    #[test]
    fn test_focus_loss_cancels_keyboard_press() {
        let f = fixture(PressConfig::default());
        let other = f.doc.create_element("button");
        f.doc.append_child(f.doc.root(), other).unwrap();
        f.doc.focus(f.button, FocusOrigin::Keyboard);
        f.doc.key_down(KeyData::new(Key::Enter));
        f.doc.focus(other, FocusOrigin::Keyboard);

        let log = f.log.lock();
        assert_eq!(log.len(), 2);
        assert!(log[1].cancelled);
    }
}

//! Focus-within tracking with focus-visible detection.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tether_core::Signal;
use tether_core::logging::targets;

use super::base::{MonitorController, MonitorHooks, Registration};
use crate::dom::{Document, ElementId, Event, EventType, FocusOrigin};

/// A change in a target's focus state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChange {
    pub target: ElementId,
    /// Focus is on the target or inside it.
    pub focused: bool,
    /// The focus came from the keyboard, so an indicator should show.
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FocusState {
    focused: bool,
    visible: bool,
}

#[derive(Default)]
struct FocusShared {
    states: Mutex<HashMap<ElementId, FocusState>>,
    changed: Signal<FocusChange>,
}

impl FocusShared {
    fn update(&self, target: ElementId, next: FocusState) {
        let changed = {
            let mut states = self.states.lock();
            let Some(state) = states.get_mut(&target) else {
                return;
            };
            std::mem::replace(state, next) != next
        };
        if changed {
            tracing::trace!(target: targets::CONTROLLER, ?target, ?next, "focus changed");
            self.changed.emit(FocusChange {
                target,
                focused: next.focused,
                visible: next.visible,
            });
        }
    }

    fn on_focus_in(weak: &Weak<Self>, event: &Event) {
        let (Some(shared), Some(target)) = (weak.upgrade(), event.current_target()) else {
            return;
        };
        let visible = event
            .focus_data()
            .is_some_and(|data| data.origin == FocusOrigin::Keyboard);
        shared.update(
            target,
            FocusState {
                focused: true,
                visible,
            },
        );
    }

    fn on_focus_out(weak: &Weak<Self>, doc: &Document, event: &Event) {
        let (Some(shared), Some(target)) = (weak.upgrade(), event.current_target()) else {
            return;
        };
        let moving_inside = event
            .focus_data()
            .and_then(|data| data.related_target)
            .is_some_and(|next| doc.composed_contains(target, next));
        if moving_inside {
            return;
        }
        shared.update(target, FocusState::default());
    }
}

/// Hooks for [`FocusMonitor`].
pub struct FocusHooks {
    shared: Arc<FocusShared>,
}

impl MonitorHooks for FocusHooks {
    fn attach(&self, doc: &Document, target: ElementId) -> Option<Registration> {
        let initial = FocusState {
            focused: doc.has_focus_within(target),
            visible: false,
        };
        self.shared.states.lock().insert(target, initial);
        let on_in = Arc::downgrade(&self.shared);
        let on_out = Arc::downgrade(&self.shared);
        Some(
            Registration::new()
                .with_listener(doc.add_event_listener(target, EventType::FocusIn, move |_, event| {
                    FocusShared::on_focus_in(&on_in, event);
                }))
                .with_listener(doc.add_event_listener(target, EventType::FocusOut, move |doc, event| {
                    FocusShared::on_focus_out(&on_out, doc, event);
                })),
        )
    }

    fn detach(&self, _doc: &Document, target: ElementId, registration: Registration) {
        drop(registration);
        self.shared.states.lock().remove(&target);
    }
}

/// Reports focus entering and leaving a set of targets.
pub struct FocusMonitor {
    controller: MonitorController<FocusHooks>,
}

impl FocusMonitor {
    pub fn new(doc: &Document, host: ElementId) -> Self {
        Self {
            controller: MonitorController::new(
                doc,
                host,
                FocusHooks {
                    shared: Arc::default(),
                },
            ),
        }
    }

    pub fn changed(&self) -> &Signal<FocusChange> {
        &self.controller.hooks().shared.changed
    }

    pub fn observe(&self, target: ElementId) -> bool {
        self.controller.observe(target)
    }

    pub fn unobserve(&self, target: ElementId) -> bool {
        self.controller.unobserve(target)
    }

    pub fn is_focused(&self, target: ElementId) -> bool {
        self.state(target).focused
    }

    pub fn is_focus_visible(&self, target: ElementId) -> bool {
        self.state(target).visible
    }

    fn state(&self, target: ElementId) -> FocusState {
        self.controller
            .hooks()
            .shared
            .states
            .lock()
            .get(&target)
            .copied()
            .unwrap_or_default()
    }

    pub fn controller(&self) -> &MonitorController<FocusHooks> {
        &self.controller
    }
}

impl std::fmt::Debug for FocusMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusMonitor")
            .field("controller", &self.controller)
            .finish()
    }
}

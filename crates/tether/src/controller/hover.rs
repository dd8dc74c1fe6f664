//! Hover tracking with start and end delays.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tether_core::logging::targets;
use tether_core::{Signal, TimerId};

use super::base::{MonitorController, MonitorHooks, Registration};
use super::StateChange;
use crate::dom::{Document, ElementId, Event, EventType, PointerType};

/// Delays applied before hover starts and ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    /// Time the pointer must stay before hover starts.
    #[serde(rename = "start_delay_ms", with = "crate::config::millis")]
    pub start_delay: Duration,
    /// Time the pointer must stay away before hover ends.
    #[serde(rename = "end_delay_ms", with = "crate::config::millis")]
    pub end_delay: Duration,
}

impl HoverConfig {
    pub fn new(start_delay: Duration, end_delay: Duration) -> Self {
        Self {
            start_delay,
            end_delay,
        }
    }

    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    pub fn with_end_delay(mut self, delay: Duration) -> Self {
        self.end_delay = delay;
        self
    }
}

#[derive(Debug, Default)]
struct TargetState {
    hovered: bool,
    pending: Option<TimerId>,
}

#[derive(Default)]
struct HoverShared {
    defaults: Mutex<HoverConfig>,
    overrides: Mutex<HashMap<ElementId, HoverConfig>>,
    states: Mutex<HashMap<ElementId, TargetState>>,
    changed: Signal<StateChange>,
}

impl HoverShared {
    fn config_for(&self, target: ElementId) -> HoverConfig {
        self.overrides
            .lock()
            .get(&target)
            .copied()
            .unwrap_or_else(|| *self.defaults.lock())
    }

    /// Replace the pending timer of `target`, cancelling the old one first.
    fn replace_pending(&self, doc: &Document, target: ElementId, next: Option<TimerId>) {
        let old = self
            .states
            .lock()
            .get_mut(&target)
            .and_then(|state| std::mem::replace(&mut state.pending, next));
        if let Some(old) = old {
            doc.clear_timeout(old);
        }
    }

    fn set_hovered(&self, target: ElementId, hovered: bool) {
        let changed = {
            let mut states = self.states.lock();
            let Some(state) = states.get_mut(&target) else {
                return;
            };
            state.pending = None;
            std::mem::replace(&mut state.hovered, hovered) != hovered
        };
        if changed {
            tracing::trace!(target: targets::CONTROLLER, ?target, hovered, "hover changed");
            self.changed.emit(StateChange {
                target,
                active: hovered,
            });
        }
    }

    fn is_hovered(&self, target: ElementId) -> bool {
        self.states.lock().get(&target).is_some_and(|s| s.hovered)
    }

    fn transition(self: &Arc<Self>, doc: &Document, target: ElementId, entering: bool) {
        self.replace_pending(doc, target, None);
        if self.is_hovered(target) == entering {
            // Entering while hovered cancels a pending end, and vice versa.
            return;
        }
        let config = self.config_for(target);
        let delay = if entering {
            config.start_delay
        } else {
            config.end_delay
        };
        if delay.is_zero() {
            self.set_hovered(target, entering);
            return;
        }
        let weak = Arc::downgrade(self);
        let timer = doc.set_timeout(delay, move |_| {
            if let Some(shared) = weak.upgrade() {
                shared.set_hovered(target, entering);
            }
        });
        self.replace_pending(doc, target, Some(timer));
    }

    fn on_pointer(weak: &Weak<Self>, doc: &Document, event: &Event, entering: bool) {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        if event
            .pointer_data()
            .is_some_and(|data| data.pointer_type == PointerType::Touch)
        {
            return;
        }
        shared.transition(doc, event.current_target().unwrap_or(event.target()), entering);
    }
}

/// Hooks for [`HoverMonitor`].
pub struct HoverHooks {
    shared: Arc<HoverShared>,
}

impl MonitorHooks for HoverHooks {
    fn attach(&self, doc: &Document, target: ElementId) -> Option<Registration> {
        self.shared.states.lock().insert(target, TargetState::default());
        let enter = Arc::downgrade(&self.shared);
        let leave = Arc::downgrade(&self.shared);
        Some(
            Registration::new()
                .with_listener(doc.add_event_listener(target, EventType::PointerEnter, move |doc, event| {
                    HoverShared::on_pointer(&enter, doc, event, true);
                }))
                .with_listener(doc.add_event_listener(target, EventType::PointerLeave, move |doc, event| {
                    HoverShared::on_pointer(&leave, doc, event, false);
                })),
        )
    }

    fn detach(&self, doc: &Document, target: ElementId, registration: Registration) {
        drop(registration);
        self.shared.overrides.lock().remove(&target);
        let state = self.shared.states.lock().remove(&target);
        if let Some(timer) = state.and_then(|s| s.pending) {
            doc.clear_timeout(timer);
        }
    }
}

/// Reports when the pointer hovers a set of targets.
///
/// Touch pointers are ignored. A pending start is cancelled if the pointer
/// leaves before the delay elapses, and a pending end is cancelled if it
/// comes back.
pub struct HoverMonitor {
    controller: MonitorController<HoverHooks>,
}

impl HoverMonitor {
    pub fn new(doc: &Document, host: ElementId, config: HoverConfig) -> Self {
        let shared = Arc::new(HoverShared::default());
        *shared.defaults.lock() = config;
        Self {
            controller: MonitorController::new(doc, host, HoverHooks { shared }),
        }
    }

    /// Emitted with `active = true` when hover starts and `false` when it
    /// ends.
    pub fn changed(&self) -> &Signal<StateChange> {
        &self.controller.hooks().shared.changed
    }

    pub fn observe(&self, target: ElementId) -> bool {
        self.controller.observe(target)
    }

    pub fn unobserve(&self, target: ElementId) -> bool {
        self.controller.unobserve(target)
    }

    /// Delays for `target` that differ from the defaults.
    ///
    /// The override is dropped when `target` stops being observed.
    pub fn set_target_config(&self, target: ElementId, config: HoverConfig) {
        self.controller.hooks().shared.overrides.lock().insert(target, config);
    }

    pub fn clear_target_config(&self, target: ElementId) {
        self.controller.hooks().shared.overrides.lock().remove(&target);
    }

    pub fn set_config(&self, config: HoverConfig) {
        *self.controller.hooks().shared.defaults.lock() = config;
    }

    pub fn config(&self) -> HoverConfig {
        *self.controller.hooks().shared.defaults.lock()
    }

    pub fn is_hovered(&self, target: ElementId) -> bool {
        self.controller.hooks().shared.is_hovered(target)
    }

    pub fn controller(&self) -> &MonitorController<HoverHooks> {
        &self.controller
    }
}

impl std::fmt::Debug for HoverMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoverMonitor")
            .field("controller", &self.controller)
            .field("config", &self.config())
            .finish()
    }
}

use std::sync::{Arc, Weak};

use tether_core::logging::targets;
use tether_core::{Point, Signal};

use super::base::{MonitorController, MonitorHooks, Registration};
use crate::dom::{Document, ElementId, Event, EventType};

/// A target scrolled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollChange {
    pub target: ElementId,
    /// The new scroll offset.
    pub offset: Point,
}

#[derive(Default)]
struct ScrollShared {
    scrolled: Signal<ScrollChange>,
}

impl ScrollShared {
    fn on_scroll(weak: &Weak<Self>, doc: &Document, event: &Event) {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let target = event.target();
        let offset = doc.scroll_offset(target).unwrap_or(Point::ZERO);
        tracing::trace!(target: targets::CONTROLLER, ?target, x = offset.x, y = offset.y, "scrolled");
        shared.scrolled.emit(ScrollChange { target, offset });
    }
}

/// Hooks for [`ScrollMonitor`].
pub struct ScrollHooks {
    shared: Arc<ScrollShared>,
}

impl MonitorHooks for ScrollHooks {
    fn attach(&self, doc: &Document, target: ElementId) -> Option<Registration> {
        let weak = Arc::downgrade(&self.shared);
        Some(Registration::new().with_listener(doc.add_event_listener(
            target,
            EventType::Scroll,
            move |doc, event| ScrollShared::on_scroll(&weak, doc, event),
        )))
    }
}

/// Reports scroll offsets of a set of targets. Observe the document root to
/// follow the viewport.
pub struct ScrollMonitor {
    controller: MonitorController<ScrollHooks>,
}

impl ScrollMonitor {
    pub fn new(doc: &Document, host: ElementId) -> Self {
        Self {
            controller: MonitorController::new(
                doc,
                host,
                ScrollHooks {
                    shared: Arc::default(),
                },
            ),
        }
    }

    pub fn scrolled(&self) -> &Signal<ScrollChange> {
        &self.controller.hooks().shared.scrolled
    }

    pub fn observe(&self, target: ElementId) -> bool {
        self.controller.observe(target)
    }

    pub fn unobserve(&self, target: ElementId) -> bool {
        self.controller.unobserve(target)
    }

    pub fn controller(&self) -> &MonitorController<ScrollHooks> {
        &self.controller
    }
}

impl std::fmt::Debug for ScrollMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollMonitor")
            .field("controller", &self.controller)
            .finish()
    }
}

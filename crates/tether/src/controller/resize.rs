use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tether_core::{Signal, TaskId};
use tether_core::logging::targets;

use super::base::{MonitorController, MonitorHooks, Registration};
use crate::dom::{Document, ElementId, ResizeEntry};
use crate::error::Error;

#[derive(Default)]
struct ResizeShared {
    live: Mutex<HashSet<ElementId>>,
    replays: Mutex<HashMap<ElementId, TaskId>>,
    resized: Signal<ResizeEntry>,
}

impl ResizeShared {
    fn deliver(&self, entries: &[ResizeEntry]) {
        for entry in entries {
            if self.live.lock().contains(&entry.target) {
                self.resized.emit(*entry);
            }
        }
    }

    fn replay(weak: Weak<Self>, doc: &Document, target: ElementId) {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        shared.replays.lock().remove(&target);
        if let Some(rect) = doc.rect(target) {
            shared.deliver(&[ResizeEntry { target, rect }]);
        }
    }
}

/// Hooks for [`ResizeMonitor`].
pub struct ResizeHooks {
    shared: Arc<ResizeShared>,
    replay_initial: bool,
}

impl MonitorHooks for ResizeHooks {
    fn attach(&self, doc: &Document, target: ElementId) -> Option<Registration> {
        let weak = Arc::downgrade(&self.shared);
        let guard = match doc.observe_resize(target, move |_, entries| {
            if let Some(shared) = weak.upgrade() {
                shared.deliver(entries);
            }
        }) {
            Ok(guard) => guard,
            Err(Error::Unsupported(capability)) => {
                doc.warn_unsupported_once(capability);
                return None;
            }
            Err(err) => {
                tracing::debug!(target: targets::CONTROLLER, %err, ?target, "resize observation failed");
                return None;
            }
        };
        self.shared.live.lock().insert(target);
        if self.replay_initial {
            let weak = Arc::downgrade(&self.shared);
            let task = doc.queue_microtask(move |doc| ResizeShared::replay(weak, doc, target));
            self.shared.replays.lock().insert(target, task);
        }
        Some(Registration::new().with_observer(guard))
    }

    fn detach(&self, doc: &Document, target: ElementId, registration: Registration) {
        drop(registration);
        self.shared.live.lock().remove(&target);
        // A replay belongs to the registration that queued it.
        let pending = self.shared.replays.lock().remove(&target);
        if let Some(task) = pending {
            doc.cancel_microtask(task);
        }
    }
}

/// Reports border-box size changes of a set of targets.
///
/// With `replay_initial`, each newly observed target also reports its current
/// size from a microtask, so consumers see one entry even if nothing ever
/// changes.
pub struct ResizeMonitor {
    controller: MonitorController<ResizeHooks>,
}

impl ResizeMonitor {
    pub fn new(doc: &Document, host: ElementId, replay_initial: bool) -> Self {
        Self {
            controller: MonitorController::new(
                doc,
                host,
                ResizeHooks {
                    shared: Arc::default(),
                    replay_initial,
                },
            ),
        }
    }

    pub fn resized(&self) -> &Signal<ResizeEntry> {
        &self.controller.hooks().shared.resized
    }

    pub fn observe(&self, target: ElementId) -> bool {
        self.controller.observe(target)
    }

    pub fn unobserve(&self, target: ElementId) -> bool {
        self.controller.unobserve(target)
    }

    pub fn controller(&self) -> &MonitorController<ResizeHooks> {
        &self.controller
    }
}

impl std::fmt::Debug for ResizeMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeMonitor")
            .field("controller", &self.controller)
            .finish()
    }
}

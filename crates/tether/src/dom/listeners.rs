//! Event listener registry.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use super::document::Document;
use super::element::ElementId;
use super::events::{Event, EventType};

new_key_type! {
    /// Identifies a registered event listener.
    pub struct ListenerId;
}

pub(crate) type Handler = Arc<dyn Fn(&Document, &Event) + Send + Sync>;

struct Listener {
    target: ElementId,
    event_type: EventType,
    handler: Handler,
}

/// All listeners of one document, in registration order.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    listeners: SlotMap<ListenerId, Listener>,
    order: Vec<ListenerId>,
}

impl ListenerRegistry {
    pub fn add(&mut self, target: ElementId, event_type: EventType, handler: Handler) -> ListenerId {
        let id = self.listeners.insert(Listener {
            target,
            event_type,
            handler,
        });
        self.order.push(id);
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        if self.listeners.remove(id).is_some() {
            self.order.retain(|&other| other != id);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(id)
    }

    /// Snapshot of the handlers registered for `target` and `event_type`.
    pub fn handlers_for(&self, target: ElementId, event_type: EventType) -> Vec<(ListenerId, Handler)> {
        self.order
            .iter()
            .filter_map(|&id| {
                let listener = self.listeners.get(id)?;
                (listener.target == target && listener.event_type == event_type)
                    .then(|| (id, listener.handler.clone()))
            })
            .collect()
    }

    /// Number of listeners on `target`, over all event types.
    pub fn count_for(&self, target: ElementId) -> usize {
        self.listeners.values().filter(|l| l.target == target).count()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

/// Removes an event listener when dropped.
///
/// Holds only a weak reference to the registry, so the guard may outlive its
/// document.
#[must_use = "the listener is removed as soon as the guard is dropped"]
pub struct ListenerGuard {
    registry: Weak<Mutex<ListenerRegistry>>,
    id: ListenerId,
}

impl ListenerGuard {
    pub(crate) fn new(registry: &Arc<Mutex<ListenerRegistry>>, id: ListenerId) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            id,
        }
    }

    /// The listener id.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.lock().contains(self.id))
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard").field("id", &self.id).finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().remove(self.id);
        }
    }
}

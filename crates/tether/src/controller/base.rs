use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tether_core::ConnectionGuard;
use tether_core::logging::targets;

use crate::dom::{Document, ElementId, ListenerGuard, ObserverGuard, WeakDocument};

/// The listeners and observers installed for one target.
///
/// Dropping the registration removes all of them.
#[derive(Debug, Default)]
pub struct Registration {
    listeners: Vec<ListenerGuard>,
    observers: Vec<ObserverGuard>,
}

impl Registration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(mut self, guard: ListenerGuard) -> Self {
        self.listeners.push(guard);
        self
    }

    pub fn with_observer(mut self, guard: ObserverGuard) -> Self {
        self.observers.push(guard);
        self
    }

    pub fn push_listener(&mut self, guard: ListenerGuard) {
        self.listeners.push(guard);
    }

    pub fn push_observer(&mut self, guard: ObserverGuard) {
        self.observers.push(guard);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

/// The per-target behaviour of a monitor.
///
/// [`MonitorController`] owns the target set and calls these hooks; concrete
/// monitors implement them instead of extending the controller.
pub trait MonitorHooks: Send + Sync + 'static {
    /// Install listeners and observers for `target`.
    ///
    /// Returning `None` means the target cannot be monitored (for example a
    /// missing platform capability); it is then not recorded as observed.
    fn attach(&self, doc: &Document, target: ElementId) -> Option<Registration>;

    /// Tear down `target`. The default drops the registration, which removes
    /// its listeners and observers. Overrides must not emit state changes.
    fn detach(&self, doc: &Document, target: ElementId, registration: Registration) {
        let _ = (doc, target);
        drop(registration);
    }
}

struct Shared<H> {
    doc: WeakDocument,
    host: ElementId,
    hooks: H,
    targets: Mutex<Vec<(ElementId, Registration)>>,
}

impl<H: MonitorHooks> Shared<H> {
    fn unobserve(&self, target: ElementId) -> bool {
        let removed = {
            let mut targets = self.targets.lock();
            targets
                .iter()
                .position(|(id, _)| *id == target)
                .map(|index| targets.remove(index))
        };
        let Some((target, registration)) = removed else {
            return false;
        };
        match self.doc.upgrade() {
            Some(doc) => self.hooks.detach(&doc, target, registration),
            None => drop(registration),
        }
        tracing::trace!(target: targets::CONTROLLER, host = ?self.host, ?target, "unobserved");
        true
    }

    fn unobserve_all(&self) {
        let drained = std::mem::take(&mut *self.targets.lock());
        if drained.is_empty() {
            return;
        }
        tracing::debug!(
            target: targets::CONTROLLER,
            host = ?self.host,
            count = drained.len(),
            "unobserving all targets"
        );
        let doc = self.doc.upgrade();
        for (target, registration) in drained {
            match &doc {
                Some(doc) => self.hooks.detach(doc, target, registration),
                None => drop(registration),
            }
        }
    }
}

/// Tracks a changing set of target elements on behalf of a host element.
///
/// Every observed target has exactly one registration. When the host is
/// disconnected from the document, or the controller is dropped, all
/// targets are unobserved.
pub struct MonitorController<H: MonitorHooks> {
    shared: Arc<Shared<H>>,
    _host_lifecycle: ConnectionGuard,
}

impl<H: MonitorHooks> MonitorController<H> {
    /// Create a controller for `host`.
    pub fn new(doc: &Document, host: ElementId, hooks: H) -> Self {
        let shared = Arc::new(Shared {
            doc: doc.downgrade(),
            host,
            hooks,
            targets: Mutex::new(Vec::new()),
        });
        let weak: Weak<Shared<H>> = Arc::downgrade(&shared);
        let host_lifecycle = doc.disconnected().connect_scoped(move |&node| {
            if node != host {
                return;
            }
            if let Some(shared) = weak.upgrade() {
                shared.unobserve_all();
            }
        });
        Self {
            shared,
            _host_lifecycle: host_lifecycle,
        }
    }

    /// Start monitoring `target`.
    ///
    /// Returns `true` if the target was newly observed. Observing a target
    /// twice is a no-op.
    pub fn observe(&self, target: ElementId) -> bool {
        if self.is_observing(target) {
            return false;
        }
        let Some(doc) = self.shared.doc.upgrade() else {
            return false;
        };
        let Some(registration) = self.shared.hooks.attach(&doc, target) else {
            tracing::trace!(target: targets::CONTROLLER, host = ?self.shared.host, ?target, "attach declined");
            return false;
        };

        let rejected = {
            let mut targets = self.shared.targets.lock();
            if targets.iter().any(|(id, _)| *id == target) {
                Some(registration)
            } else {
                targets.push((target, registration));
                None
            }
        };
        if let Some(registration) = rejected {
            // Observed re-entrantly from inside `attach`.
            self.shared.hooks.detach(&doc, target, registration);
            return false;
        }
        tracing::trace!(target: targets::CONTROLLER, host = ?self.shared.host, ?target, "observed");
        true
    }

    /// Stop monitoring `target`. Returns `false` if it was not observed.
    pub fn unobserve(&self, target: ElementId) -> bool {
        self.shared.unobserve(target)
    }

    /// Stop monitoring every target.
    pub fn unobserve_all(&self) {
        self.shared.unobserve_all();
    }

    pub fn is_observing(&self, target: ElementId) -> bool {
        self.shared.targets.lock().iter().any(|(id, _)| *id == target)
    }

    /// Observed targets in the order they were added.
    pub fn targets(&self) -> Vec<ElementId> {
        self.shared.targets.lock().iter().map(|(id, _)| *id).collect()
    }

    /// The host element whose lifetime bounds the controller.
    pub fn host(&self) -> ElementId {
        self.shared.host
    }

    /// The monitor-specific hooks.
    pub fn hooks(&self) -> &H {
        &self.shared.hooks
    }

    /// The document, if it is still alive.
    pub fn document(&self) -> Option<Document> {
        self.shared.doc.upgrade()
    }
}

impl<H: MonitorHooks> std::fmt::Debug for MonitorController<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorController")
            .field("host", &self.shared.host)
            .field("targets", &self.targets())
            .finish()
    }
}

impl<H: MonitorHooks> Drop for MonitorController<H> {
    fn drop(&mut self) {
        self.shared.unobserve_all();
    }
}

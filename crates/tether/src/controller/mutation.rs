use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tether_core::{Signal, TaskId};
use tether_core::logging::targets;

use super::base::{MonitorController, MonitorHooks, Registration};
use crate::dom::{Document, ElementId, MutationOptions, MutationRecord};
use crate::error::Error;

/// The records one observed target received in one delivery.
///
/// A replayed initial batch has no records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationBatch {
    pub target: ElementId,
    pub records: Vec<MutationRecord>,
}

#[derive(Default)]
struct MutationShared {
    live: Mutex<HashSet<ElementId>>,
    replays: Mutex<HashMap<ElementId, TaskId>>,
    mutated: Signal<MutationBatch>,
}

impl MutationShared {
    fn deliver(weak: &Weak<Self>, target: ElementId, records: Vec<MutationRecord>) {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        if shared.live.lock().contains(&target) {
            shared.mutated.emit(MutationBatch { target, records });
        }
    }

    fn replay(weak: &Weak<Self>, target: ElementId) {
        if let Some(shared) = weak.upgrade() {
            shared.replays.lock().remove(&target);
        }
        Self::deliver(weak, target, Vec::new());
    }
}

/// Hooks for [`MutationMonitor`].
pub struct MutationHooks {
    shared: Arc<MutationShared>,
    options: MutationOptions,
    replay_initial: bool,
}

impl MonitorHooks for MutationHooks {
    fn attach(&self, doc: &Document, target: ElementId) -> Option<Registration> {
        let weak = Arc::downgrade(&self.shared);
        let guard = match doc.observe_mutations(target, self.options.clone(), move |_, records| {
            MutationShared::deliver(&weak, target, records.to_vec());
        }) {
            Ok(guard) => guard,
            Err(Error::Unsupported(capability)) => {
                doc.warn_unsupported_once(capability);
                return None;
            }
            Err(err) => {
                tracing::debug!(target: targets::CONTROLLER, %err, ?target, "mutation observation failed");
                return None;
            }
        };
        self.shared.live.lock().insert(target);
        if self.replay_initial {
            let weak = Arc::downgrade(&self.shared);
            let task = doc.queue_microtask(move |_| MutationShared::replay(&weak, target));
            self.shared.replays.lock().insert(target, task);
        }
        Some(Registration::new().with_observer(guard))
    }

    fn detach(&self, doc: &Document, target: ElementId, registration: Registration) {
        drop(registration);
        self.shared.live.lock().remove(&target);
        let pending = self.shared.replays.lock().remove(&target);
        if let Some(task) = pending {
            doc.cancel_microtask(task);
        }
    }
}

/// Reports child-list and attribute changes of a set of targets.
pub struct MutationMonitor {
    controller: MonitorController<MutationHooks>,
}

impl MutationMonitor {
    pub fn new(doc: &Document, host: ElementId, options: MutationOptions, replay_initial: bool) -> Self {
        Self {
            controller: MonitorController::new(
                doc,
                host,
                MutationHooks {
                    shared: Arc::default(),
                    options,
                    replay_initial,
                },
            ),
        }
    }

    pub fn mutated(&self) -> &Signal<MutationBatch> {
        &self.controller.hooks().shared.mutated
    }

    pub fn observe(&self, target: ElementId) -> bool {
        self.controller.observe(target)
    }

    pub fn unobserve(&self, target: ElementId) -> bool {
        self.controller.unobserve(target)
    }

    pub fn controller(&self) -> &MonitorController<MutationHooks> {
        &self.controller
    }
}

impl std::fmt::Debug for MutationMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationMonitor")
            .field("controller", &self.controller)
            .field("options", &self.controller.hooks().options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::Size;

    #[test]
    fn test_batches_and_replay() {
        let doc = Document::new(Size::new(100.0, 100.0));
        let list = doc.create_element("md-list");
        doc.append_child(doc.root(), list).unwrap();

        let monitor = MutationMonitor::new(&doc, list, MutationOptions::child_list(), true);
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        monitor.mutated().connect(move |batch| sink.lock().push(batch.records.len()));
        monitor.observe(list);

        let item = doc.create_element("md-list-item");
        doc.append_child(list, item).unwrap();
        doc.remove(item).unwrap();
        doc.run_microtasks();
        assert_eq!(*log.lock(), vec![0, 2]);
    }

    #[test]
    fn test_reobserve_in_same_tick_replays_once() {
        let doc = Document::new(Size::new(100.0, 100.0));
        let list = doc.create_element("md-list");
        doc.append_child(doc.root(), list).unwrap();
        doc.run_microtasks();

        let monitor = MutationMonitor::new(&doc, list, MutationOptions::child_list(), true);
        let log = Arc::new(Mutex::new(0));
        let sink = log.clone();
        monitor.mutated().connect(move |_| *sink.lock() += 1);

        monitor.observe(list);
        monitor.unobserve(list);
        monitor.observe(list);
        doc.run_microtasks();
        assert_eq!(*log.lock(), 1);
    }

    #[test]
    fn test_attribute_filter() {
        let doc = Document::new(Size::new(100.0, 100.0));
        let item = doc.create_element("md-list-item");
        doc.append_child(doc.root(), item).unwrap();

        let options = MutationOptions::default().with_attribute_filter(["disabled"]);
        let monitor = MutationMonitor::new(&doc, item, options, false);
        let names = Arc::new(Mutex::new(Vec::new()));
        let sink = names.clone();
        monitor.mutated().connect(move |batch| {
            let mut names = sink.lock();
            for record in &batch.records {
                names.extend(record.attribute_name().map(str::to_owned));
            }
        });
        monitor.observe(item);

        doc.set_attribute(item, "class", "selected").unwrap();
        doc.set_attribute(item, "disabled", "").unwrap();
        doc.run_microtasks();
        assert_eq!(*names.lock(), vec!["disabled".to_owned()]);
    }
}

//! Resize and mutation observer registry.
//!
//! Records are collected while the document changes and delivered in batches
//! from a microtask, one callback per observer.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};
use tether_core::Rect;

use super::document::Document;
use super::element::ElementId;

new_key_type! {
    /// Identifies a registered resize or mutation observer.
    pub struct ObserverId;
}

/// A border-box size change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEntry {
    /// The observed element.
    pub target: ElementId,
    /// Its new border box.
    pub rect: Rect,
}

/// What a mutation record describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// Children were added to or removed from `target`.
    ChildList {
        added: Vec<ElementId>,
        removed: Vec<ElementId>,
    },
    /// An attribute of `target` was set or removed.
    Attributes {
        name: String,
        old_value: Option<String>,
    },
}

/// A single tree change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// The node whose children or attributes changed.
    pub target: ElementId,
    pub kind: MutationKind,
}

impl MutationRecord {
    /// The attribute name, for attribute records.
    pub fn attribute_name(&self) -> Option<&str> {
        match &self.kind {
            MutationKind::Attributes { name, .. } => Some(name),
            MutationKind::ChildList { .. } => None,
        }
    }
}

/// Which mutations an observer wants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationOptions {
    /// Report child additions and removals.
    pub child_list: bool,
    /// Report attribute changes.
    pub attributes: bool,
    /// Also report changes anywhere below the target.
    pub subtree: bool,
    /// Restrict attribute records to these names.
    pub attribute_filter: Option<Vec<String>>,
}

impl MutationOptions {
    /// Child-list changes of the target only.
    pub fn child_list() -> Self {
        Self {
            child_list: true,
            ..Default::default()
        }
    }

    /// Attribute changes of the target only.
    pub fn attributes() -> Self {
        Self {
            attributes: true,
            ..Default::default()
        }
    }

    /// Extend the observation to the whole subtree.
    pub fn with_subtree(mut self) -> Self {
        self.subtree = true;
        self
    }

    /// Only report the named attributes.
    pub fn with_attribute_filter<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = true;
        self.attribute_filter = Some(names.into_iter().map(Into::into).collect());
        self
    }

    fn wants(&self, record: &MutationRecord, is_target: bool) -> bool {
        if !is_target && !self.subtree {
            return false;
        }
        match &record.kind {
            MutationKind::ChildList { .. } => self.child_list,
            MutationKind::Attributes { name, .. } => {
                self.attributes
                    && self
                        .attribute_filter
                        .as_ref()
                        .is_none_or(|filter| filter.iter().any(|f| f == name))
            }
        }
    }
}

pub(crate) type ResizeCallback = Arc<dyn Fn(&Document, &[ResizeEntry]) + Send + Sync>;
pub(crate) type MutationCallback = Arc<dyn Fn(&Document, &[MutationRecord]) + Send + Sync>;

enum Observer {
    Resize {
        target: ElementId,
        callback: ResizeCallback,
        pending: Vec<ResizeEntry>,
    },
    Mutation {
        target: ElementId,
        options: MutationOptions,
        callback: MutationCallback,
        pending: Vec<MutationRecord>,
    },
}

/// Records taken from the registry for delivery.
pub(crate) enum Delivery {
    Resize(ObserverId, ResizeCallback, Vec<ResizeEntry>),
    Mutation(ObserverId, MutationCallback, Vec<MutationRecord>),
}

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    observers: SlotMap<ObserverId, Observer>,
    delivery_scheduled: bool,
}

impl ObserverRegistry {
    pub fn add_resize(&mut self, target: ElementId, callback: ResizeCallback) -> ObserverId {
        self.observers.insert(Observer::Resize {
            target,
            callback,
            pending: Vec::new(),
        })
    }

    pub fn add_mutation(
        &mut self,
        target: ElementId,
        options: MutationOptions,
        callback: MutationCallback,
    ) -> ObserverId {
        self.observers.insert(Observer::Mutation {
            target,
            options,
            callback,
            pending: Vec::new(),
        })
    }

    pub fn remove(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id).is_some()
    }

    pub fn contains(&self, id: ObserverId) -> bool {
        self.observers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Queue a resize entry. Returns `true` when a delivery microtask must be
    /// scheduled.
    pub fn queue_resize(&mut self, entry: ResizeEntry) -> bool {
        let mut queued = false;
        for observer in self.observers.values_mut() {
            if let Observer::Resize { target, pending, .. } = observer {
                if *target == entry.target {
                    pending.retain(|e| e.target != entry.target);
                    pending.push(entry);
                    queued = true;
                }
            }
        }
        self.schedule_if(queued)
    }

    /// Queue a mutation record for every interested observer.
    ///
    /// `ancestors` lists the record target followed by its ancestors.
    pub fn queue_mutation(&mut self, record: &MutationRecord, ancestors: &[ElementId]) -> bool {
        let mut queued = false;
        for observer in self.observers.values_mut() {
            if let Observer::Mutation {
                target,
                options,
                pending,
                ..
            } = observer
            {
                if !ancestors.contains(target) {
                    continue;
                }
                if options.wants(record, *target == record.target) {
                    pending.push(record.clone());
                    queued = true;
                }
            }
        }
        self.schedule_if(queued)
    }

    fn schedule_if(&mut self, queued: bool) -> bool {
        if queued && !self.delivery_scheduled {
            self.delivery_scheduled = true;
            true
        } else {
            false
        }
    }

    /// Take every pending batch, in observer registration order.
    pub fn take_pending(&mut self) -> Vec<Delivery> {
        self.delivery_scheduled = false;
        let mut out = Vec::new();
        for (id, observer) in self.observers.iter_mut() {
            match observer {
                Observer::Resize {
                    callback, pending, ..
                } if !pending.is_empty() => {
                    out.push(Delivery::Resize(id, callback.clone(), std::mem::take(pending)));
                }
                Observer::Mutation {
                    callback, pending, ..
                } if !pending.is_empty() => {
                    out.push(Delivery::Mutation(id, callback.clone(), std::mem::take(pending)));
                }
                _ => {}
            }
        }
        out
    }
}

/// Disconnects an observer when dropped.
#[must_use = "the observer disconnects as soon as the guard is dropped"]
pub struct ObserverGuard {
    registry: Weak<Mutex<ObserverRegistry>>,
    id: ObserverId,
}

impl ObserverGuard {
    pub(crate) fn new(registry: &Arc<Mutex<ObserverRegistry>>, id: ObserverId) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            id,
        }
    }

    /// The observer id.
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Disconnect now.
    pub fn disconnect(self) {}
}

impl std::fmt::Debug for ObserverGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverGuard").field("id", &self.id).finish()
    }
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().remove(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn element(n: u64) -> ElementId {
        ElementId::from(KeyData::from_ffi(n))
    }

    fn attr(target: ElementId, name: &str) -> MutationRecord {
        MutationRecord {
            target,
            kind: MutationKind::Attributes {
                name: name.into(),
                old_value: None,
            },
        }
    }

    #[test]
    fn test_attribute_filter() {
        let options = MutationOptions::default().with_attribute_filter(["disabled"]);
        let target = element(1);
        assert!(options.wants(&attr(target, "disabled"), true));
        assert!(!options.wants(&attr(target, "class"), true));
        assert!(!options.wants(&attr(target, "disabled"), false));
    }

    #[test]
    fn test_subtree_matching() {
        let mut registry = ObserverRegistry::default();
        let parent = element(1);
        let child = element(2);
        registry.add_mutation(parent, MutationOptions::attributes().with_subtree(), Arc::new(|_, _| {}));
        registry.add_mutation(parent, MutationOptions::attributes(), Arc::new(|_, _| {}));

        assert!(registry.queue_mutation(&attr(child, "hidden"), &[child, parent]));
        let pending = registry.take_pending();
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_delivery_scheduled_once_per_batch() {
        let mut registry = ObserverRegistry::default();
        let target = element(1);
        registry.add_resize(target, Arc::new(|_, _| {}));
        let entry = ResizeEntry {
            target,
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
        };
        assert!(registry.queue_resize(entry));
        assert!(!registry.queue_resize(ResizeEntry {
            rect: Rect::new(0.0, 0.0, 20.0, 10.0),
            ..entry
        }));

        match registry.take_pending().as_slice() {
            [Delivery::Resize(_, _, entries)] => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].rect.width(), 20.0);
            }
            _ => panic!("expected one resize batch"),
        }
        assert!(registry.queue_resize(entry));
    }
}

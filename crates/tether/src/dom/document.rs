//! The headless host document.
//!
//! [`Document`] is the service object everything else in the crate is handed:
//! it owns the element tree, dispatches events, runs observers, and provides
//! the timer and microtask queues on a virtual clock.
//!
//! # Locking
//!
//! The document is `Send + Sync` and uses `parking_lot` locks internally.
//! No lock is held while a listener, observer, timer or microtask callback
//! runs, so callbacks may freely call back into the document.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tether_core::logging::targets;
use tether_core::{Point, Rect, Signal, Size, TaskId, TaskQueue, TimerId, TimerManager};

use super::element::{ElementData, ElementId, NodeKind};
use super::events::{Event, EventType, FocusData, FocusOrigin, KeyData};
use super::listeners::{ListenerGuard, ListenerRegistry};
use super::observers::{
    Delivery, MutationKind, MutationOptions, MutationRecord, ObserverGuard, ObserverRegistry,
    ResizeEntry,
};
use super::tree::{ChildListChange, Tree};
use crate::error::{Error, Result};

/// Upper bound on microtasks run by one [`Document::run_microtasks`] call.
const MICROTASK_LIMIT: usize = 10_000;

type Job = Box<dyn FnOnce(&Document) + Send>;

/// An observation primitive a platform may lack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ResizeObserver,
    MutationObserver,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResizeObserver => f.write_str("ResizeObserver"),
            Self::MutationObserver => f.write_str("MutationObserver"),
        }
    }
}

/// Which observation primitives the host provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCapabilities {
    pub resize_observer: bool,
    pub mutation_observer: bool,
}

impl Default for PlatformCapabilities {
    fn default() -> Self {
        Self {
            resize_observer: true,
            mutation_observer: true,
        }
    }
}

impl PlatformCapabilities {
    /// A platform without any observer primitive.
    pub const NONE: Self = Self {
        resize_observer: false,
        mutation_observer: false,
    };

    /// Whether `capability` is available.
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::ResizeObserver => self.resize_observer,
            Capability::MutationObserver => self.mutation_observer,
        }
    }

    /// The same capabilities with `capability` switched off.
    pub fn without(mut self, capability: Capability) -> Self {
        match capability {
            Capability::ResizeObserver => self.resize_observer = false,
            Capability::MutationObserver => self.mutation_observer = false,
        }
        self
    }
}

struct DocumentInner {
    tree: RwLock<Tree>,
    focus: Mutex<Option<ElementId>>,
    listeners: Arc<Mutex<ListenerRegistry>>,
    observers: Arc<Mutex<ObserverRegistry>>,
    timers: Mutex<TimerManager<Job>>,
    microtasks: Mutex<TaskQueue<Job>>,
    capabilities: PlatformCapabilities,
    warned: Mutex<HashSet<Capability>>,
    connected: Signal<ElementId>,
    disconnected: Signal<ElementId>,
}

/// A shared handle to a headless document.
///
/// Cloning is cheap; all clones refer to the same document.
#[derive(Clone)]
pub struct Document {
    inner: Arc<DocumentInner>,
}

/// A non-owning reference to a [`Document`].
#[derive(Clone, Default)]
pub struct WeakDocument {
    inner: Weak<DocumentInner>,
}

impl WeakDocument {
    /// Get the document back if it is still alive.
    pub fn upgrade(&self) -> Option<Document> {
        self.inner.upgrade().map(|inner| Document { inner })
    }
}

impl fmt::Debug for WeakDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakDocument")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.inner.tree.read().len())
            .field("focus", &*self.inner.focus.lock())
            .field("listeners", &self.inner.listeners.lock().len())
            .field("observers", &self.inner.observers.lock().len())
            .field("now", &self.now())
            .finish()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Document {}

static_assertions::assert_impl_all!(Document: Send, Sync);

impl Document {
    /// Create a document with a viewport of the given size.
    pub fn new(viewport: Size) -> Self {
        Self::with_capabilities(viewport, PlatformCapabilities::default())
    }

    /// Create a document with restricted platform capabilities.
    pub fn with_capabilities(viewport: Size, capabilities: PlatformCapabilities) -> Self {
        Self {
            inner: Arc::new(DocumentInner {
                tree: RwLock::new(Tree::new(viewport)),
                focus: Mutex::new(None),
                listeners: Arc::new(Mutex::new(ListenerRegistry::default())),
                observers: Arc::new(Mutex::new(ObserverRegistry::default())),
                timers: Mutex::new(TimerManager::new()),
                microtasks: Mutex::new(TaskQueue::new()),
                capabilities,
                warned: Mutex::new(HashSet::new()),
                connected: Signal::new(),
                disconnected: Signal::new(),
            }),
        }
    }

    /// A weak handle to this document.
    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// The platform capabilities this document was created with.
    pub fn capabilities(&self) -> PlatformCapabilities {
        self.inner.capabilities
    }

    // =========================================================================
    // Tree
    // =========================================================================

    /// The document root. It also stands for the viewport.
    pub fn root(&self) -> ElementId {
        self.inner.tree.read().root()
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> ElementId {
        self.inner.tree.write().create_element(tag)
    }

    /// Append `child` as the last child of `parent`.
    pub fn append_child(&self, parent: ElementId, child: ElementId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference`, moving it if it is
    /// already in the tree.
    pub fn insert_before(
        &self,
        parent: ElementId,
        child: ElementId,
        reference: Option<ElementId>,
    ) -> Result<()> {
        let change = self.inner.tree.write().insert_before(parent, child, reference)?;
        tracing::trace!(target: targets::DOM, ?parent, ?child, "inserted");

        if let Some(old_parent) = change.old_parent {
            self.record_mutation(MutationRecord {
                target: old_parent,
                kind: MutationKind::ChildList {
                    added: Vec::new(),
                    removed: vec![child],
                },
            });
        }
        self.record_mutation(MutationRecord {
            target: parent,
            kind: MutationKind::ChildList {
                added: vec![child],
                removed: Vec::new(),
            },
        });
        self.finish_child_list_change(change);
        Ok(())
    }

    /// Detach `node` from its parent. Detaching a parentless node is a no-op.
    pub fn remove(&self, node: ElementId) -> Result<()> {
        let change = self.inner.tree.write().detach(node)?;
        let Some(old_parent) = change.old_parent else {
            return Ok(());
        };
        tracing::trace!(target: targets::DOM, ?node, ?old_parent, "removed");

        self.record_mutation(MutationRecord {
            target: old_parent,
            kind: MutationKind::ChildList {
                added: Vec::new(),
                removed: vec![node],
            },
        });
        self.finish_child_list_change(change);
        Ok(())
    }

    fn finish_child_list_change(&self, change: ChildListChange) {
        if !change.disconnected.is_empty() {
            let mut focus = self.inner.focus.lock();
            if focus.is_some_and(|f| change.disconnected.contains(&f)) {
                *focus = None;
            }
        }
        for &id in &change.disconnected {
            self.inner.disconnected.emit(id);
        }
        for &id in &change.connected {
            self.inner.connected.emit(id);
        }
    }

    /// Attach a shadow root to `host` and return it.
    pub fn attach_shadow(&self, host: ElementId, delegates_focus: bool) -> Result<ElementId> {
        let shadow = self.inner.tree.write().attach_shadow(host, delegates_focus)?;
        tracing::trace!(target: targets::DOM, ?host, delegates_focus, "attached shadow root");
        Ok(shadow)
    }

    /// Run `f` against an element's data.
    pub fn with_element<R>(&self, id: ElementId, f: impl FnOnce(&ElementData) -> R) -> Option<R> {
        self.inner.tree.read().get(id).map(f)
    }

    /// Whether `id` belongs to this document.
    pub fn contains(&self, id: ElementId) -> bool {
        self.inner.tree.read().get(id).is_some()
    }

    /// Whether `id` is attached to the root.
    pub fn is_connected(&self, id: ElementId) -> bool {
        self.with_element(id, ElementData::is_connected).unwrap_or(false)
    }

    /// The light-tree parent (the host, for a shadow root).
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.with_element(id, ElementData::parent).flatten()
    }

    /// Light-tree children.
    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.with_element(id, |e| e.children().to_vec()).unwrap_or_default()
    }

    /// The shadow root attached to `host`.
    pub fn shadow_root(&self, host: ElementId) -> Option<ElementId> {
        self.with_element(host, ElementData::shadow_root).flatten()
    }

    /// Lowercase tag name.
    pub fn tag(&self, id: ElementId) -> Option<String> {
        self.with_element(id, |e| e.tag().to_owned())
    }

    /// Parent in the composed tree.
    pub fn composed_parent(&self, id: ElementId) -> Option<ElementId> {
        self.inner.tree.read().composed_parent(id)
    }

    /// Children in the composed tree.
    pub fn composed_children(&self, id: ElementId) -> Vec<ElementId> {
        self.inner.tree.read().composed_children(id)
    }

    /// Composed ancestors, nearest first.
    pub fn composed_ancestors(&self, id: ElementId) -> Vec<ElementId> {
        self.inner.tree.read().composed_ancestors(id)
    }

    /// Whether `ancestor` is `node` or one of its composed ancestors.
    pub fn composed_contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        ancestor == node || self.composed_ancestors(node).contains(&ancestor)
    }

    /// The slot a light child of a shadow host is rendered in.
    pub fn assigned_slot(&self, id: ElementId) -> Option<ElementId> {
        self.inner.tree.read().assigned_slot(id)
    }

    /// Scroll-container composed ancestors, nearest first.
    pub fn scroll_ancestors(&self, id: ElementId) -> Vec<ElementId> {
        self.inner.tree.read().scroll_ancestors(id)
    }

    /// Nearest positioned composed ancestor, else the root.
    pub fn offset_parent(&self, id: ElementId) -> ElementId {
        self.inner.tree.read().offset_parent(id)
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Set an attribute.
    pub fn set_attribute(&self, id: ElementId, name: &str, value: &str) -> Result<()> {
        let old_value = {
            let mut tree = self.inner.tree.write();
            tree.node_mut(id)?
                .attributes
                .insert(name.to_owned(), value.to_owned())
        };
        self.record_mutation(MutationRecord {
            target: id,
            kind: MutationKind::Attributes {
                name: name.to_owned(),
                old_value,
            },
        });
        Ok(())
    }

    /// Remove an attribute. Removing an absent attribute is a no-op.
    pub fn remove_attribute(&self, id: ElementId, name: &str) -> Result<()> {
        let old_value = self.inner.tree.write().node_mut(id)?.attributes.remove(name);
        if old_value.is_some() {
            self.record_mutation(MutationRecord {
                target: id,
                kind: MutationKind::Attributes {
                    name: name.to_owned(),
                    old_value,
                },
            });
        }
        Ok(())
    }

    /// Set or remove a boolean attribute.
    pub fn toggle_attribute(&self, id: ElementId, name: &str, present: bool) -> Result<()> {
        if present {
            if self.has_attribute(id, name) {
                return Ok(());
            }
            self.set_attribute(id, name, "")
        } else {
            self.remove_attribute(id, name)
        }
    }

    /// Get an attribute value.
    pub fn attribute(&self, id: ElementId, name: &str) -> Option<String> {
        self.with_element(id, |e| e.attribute(name).map(str::to_owned))
            .flatten()
    }

    /// Check if an attribute is present.
    pub fn has_attribute(&self, id: ElementId, name: &str) -> bool {
        self.with_element(id, |e| e.has_attribute(name)).unwrap_or(false)
    }

    // =========================================================================
    // Geometry and scrolling
    // =========================================================================

    /// Set an element's border box. A size change notifies resize observers.
    pub fn set_rect(&self, id: ElementId, rect: Rect) -> Result<()> {
        let resized = {
            let mut tree = self.inner.tree.write();
            let node = tree.node_mut(id)?;
            let old = std::mem::replace(&mut node.rect, rect);
            old.width() != rect.width() || old.height() != rect.height()
        };
        if resized {
            self.record_resize(id, rect);
        }
        Ok(())
    }

    /// An element's border box in viewport coordinates.
    pub fn rect(&self, id: ElementId) -> Option<Rect> {
        self.with_element(id, ElementData::rect)
    }

    /// Set the line boxes of an inline element.
    pub fn set_client_rects(&self, id: ElementId, rects: Vec<Rect>) -> Result<()> {
        self.inner.tree.write().node_mut(id)?.client_rects = rects;
        Ok(())
    }

    /// Line boxes, falling back to the border box.
    pub fn client_rects(&self, id: ElementId) -> Vec<Rect> {
        self.with_element(id, ElementData::client_rects)
            .unwrap_or_default()
    }

    /// Mark an element as a scroll container.
    pub fn set_scroll_container(&self, id: ElementId, scrolls: bool) -> Result<()> {
        self.inner.tree.write().node_mut(id)?.scroll_container = scrolls;
        Ok(())
    }

    /// Mark an element as positioned.
    pub fn set_positioned(&self, id: ElementId, positioned: bool) -> Result<()> {
        self.inner.tree.write().node_mut(id)?.positioned = positioned;
        Ok(())
    }

    /// Scroll an element (the root for the viewport) and dispatch
    /// [`EventType::Scroll`] to it.
    pub fn scroll_to(&self, id: ElementId, offset: Point) -> Result<()> {
        self.inner.tree.write().node_mut(id)?.scroll_offset = offset;
        self.dispatch_event(&Event::plain(EventType::Scroll, id));
        Ok(())
    }

    /// Current scroll offset.
    pub fn scroll_offset(&self, id: ElementId) -> Option<Point> {
        self.with_element(id, ElementData::scroll_offset)
    }

    /// Resize the viewport and dispatch [`EventType::Resize`] to the root.
    pub fn set_viewport_size(&self, size: Size) {
        let root = self.root();
        let rect = Rect::new(0.0, 0.0, size.width, size.height);
        // The root always exists.
        let _ = self.set_rect(root, rect);
        self.dispatch_event(&Event::plain(EventType::Resize, root));
    }

    /// The viewport rectangle.
    pub fn viewport(&self) -> Rect {
        let tree = self.inner.tree.read();
        tree.get(tree.root()).map(ElementData::rect).unwrap_or(Rect::ZERO)
    }

    // =========================================================================
    // Focus and keyboard
    // =========================================================================

    /// The focused element.
    pub fn active_element(&self) -> Option<ElementId> {
        *self.inner.focus.lock()
    }

    /// Whether `id` or a composed descendant has focus.
    pub fn has_focus_within(&self, id: ElementId) -> bool {
        self.active_element()
            .is_some_and(|active| self.composed_contains(id, active))
    }

    /// Move focus to `id`.
    ///
    /// A shadow host that delegates focus forwards it to the first focusable
    /// element of its shadow tree. Returns `false` when nothing could take
    /// focus.
    pub fn focus(&self, id: ElementId, origin: FocusOrigin) -> bool {
        let Some(target) = self.resolve_focus_target(id) else {
            tracing::trace!(target: targets::DOM, ?id, "focus refused");
            return false;
        };
        let previous = {
            let mut focus = self.inner.focus.lock();
            if *focus == Some(target) {
                return true;
            }
            focus.replace(target)
        };
        tracing::trace!(target: targets::DOM, ?previous, ?target, ?origin, "focus moved");

        if let Some(previous) = previous {
            self.dispatch_event(&Event::focus(
                EventType::FocusOut,
                previous,
                FocusData {
                    origin,
                    related_target: Some(target),
                },
            ));
        }
        self.dispatch_event(&Event::focus(
            EventType::FocusIn,
            target,
            FocusData {
                origin,
                related_target: previous,
            },
        ));
        true
    }

    fn resolve_focus_target(&self, id: ElementId) -> Option<ElementId> {
        if !self.is_connected(id) {
            return None;
        }
        let delegating_shadow = self
            .with_element(id, |e| e.shadow_root())
            .flatten()
            .filter(|&shadow| {
                self.with_element(shadow, |s| {
                    matches!(s.kind(), NodeKind::ShadowRoot { delegates_focus: true })
                })
                .unwrap_or(false)
            });
        if let Some(shadow) = delegating_shadow {
            if let Some(&first) = crate::interactivity::find_interactive_elements(self, shadow).first() {
                return Some(first);
            }
        }
        crate::interactivity::is_programmatically_focusable(self, id).then_some(id)
    }

    /// Clear focus, dispatching [`EventType::FocusOut`] to the old element.
    pub fn blur(&self) {
        let Some(previous) = self.inner.focus.lock().take() else {
            return;
        };
        self.dispatch_event(&Event::focus(
            EventType::FocusOut,
            previous,
            FocusData {
                origin: FocusOrigin::Programmatic,
                related_target: None,
            },
        ));
    }

    /// Dispatch a key-down to the focused element (or the root).
    ///
    /// Returns `false` if a listener prevented the default action.
    pub fn key_down(&self, data: KeyData) -> bool {
        let target = self.active_element().unwrap_or_else(|| self.root());
        self.dispatch_event(&Event::key(EventType::KeyDown, target, data))
    }

    /// Dispatch a key-up to the focused element (or the root).
    pub fn key_up(&self, data: KeyData) -> bool {
        let target = self.active_element().unwrap_or_else(|| self.root());
        self.dispatch_event(&Event::key(EventType::KeyUp, target, data))
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Register an event listener on `target`.
    pub fn add_event_listener<F>(&self, target: ElementId, event_type: EventType, handler: F) -> ListenerGuard
    where
        F: Fn(&Document, &Event) + Send + Sync + 'static,
    {
        let id = self
            .inner
            .listeners
            .lock()
            .add(target, event_type, Arc::new(handler));
        ListenerGuard::new(&self.inner.listeners, id)
    }

    /// Number of listeners registered on `target`.
    pub fn listener_count(&self, target: ElementId) -> usize {
        self.inner.listeners.lock().count_for(target)
    }

    /// Dispatch an event to its target and, for bubbling types, along the
    /// composed ancestor chain.
    ///
    /// Returns `false` if a listener called [`Event::prevent_default`].
    #[tracing::instrument(level = "trace", target = "tether::dom", skip(self), fields(event_type = ?event.event_type()))]
    pub fn dispatch_event(&self, event: &Event) -> bool {
        let path = {
            let tree = self.inner.tree.read();
            if tree.get(event.target()).is_none() {
                return true;
            }
            let mut path = vec![event.target()];
            if event.event_type().bubbles() {
                path.extend(tree.composed_ancestors(event.target()));
            }
            path
        };

        for node in path {
            let handlers = self
                .inner
                .listeners
                .lock()
                .handlers_for(node, event.event_type());
            if handlers.is_empty() {
                continue;
            }
            event.set_current_target(Some(node));
            for (id, handler) in handlers {
                // A listener removed by an earlier one in this dispatch must not run.
                if !self.inner.listeners.lock().contains(id) {
                    continue;
                }
                handler(self, event);
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
        event.set_current_target(None);
        !event.is_default_prevented()
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Observe border-box size changes of `target`.
    pub fn observe_resize<F>(&self, target: ElementId, callback: F) -> Result<ObserverGuard>
    where
        F: Fn(&Document, &[ResizeEntry]) + Send + Sync + 'static,
    {
        self.require(Capability::ResizeObserver)?;
        let id = self
            .inner
            .observers
            .lock()
            .add_resize(target, Arc::new(callback));
        Ok(ObserverGuard::new(&self.inner.observers, id))
    }

    /// Observe child-list and attribute changes of `target`.
    pub fn observe_mutations<F>(
        &self,
        target: ElementId,
        options: MutationOptions,
        callback: F,
    ) -> Result<ObserverGuard>
    where
        F: Fn(&Document, &[MutationRecord]) + Send + Sync + 'static,
    {
        self.require(Capability::MutationObserver)?;
        let id = self
            .inner
            .observers
            .lock()
            .add_mutation(target, options, Arc::new(callback));
        Ok(ObserverGuard::new(&self.inner.observers, id))
    }

    fn require(&self, capability: Capability) -> Result<()> {
        if self.inner.capabilities.supports(capability) {
            Ok(())
        } else {
            Err(Error::Unsupported(capability))
        }
    }

    /// Log a warning about a missing capability, once per document.
    pub fn warn_unsupported_once(&self, capability: Capability) {
        if self.inner.warned.lock().insert(capability) {
            tracing::warn!(
                target: targets::DOM,
                %capability,
                "platform capability not supported; dependent updates are disabled"
            );
        }
    }

    fn record_resize(&self, target: ElementId, rect: Rect) {
        let schedule = self
            .inner
            .observers
            .lock()
            .queue_resize(ResizeEntry { target, rect });
        if schedule {
            self.queue_microtask(Self::deliver_observations);
        }
    }

    fn record_mutation(&self, record: MutationRecord) {
        let ancestors = {
            let tree = self.inner.tree.read();
            let mut chain = vec![record.target];
            let mut current = tree.get(record.target).and_then(ElementData::parent);
            while let Some(id) = current {
                chain.push(id);
                current = tree.get(id).and_then(ElementData::parent);
            }
            chain
        };
        let schedule = self
            .inner
            .observers
            .lock()
            .queue_mutation(&record, &ancestors);
        if schedule {
            self.queue_microtask(Self::deliver_observations);
        }
    }

    fn deliver_observations(&self) {
        let batches = self.inner.observers.lock().take_pending();
        for batch in batches {
            match batch {
                Delivery::Resize(id, callback, entries) => {
                    if self.inner.observers.lock().contains(id) {
                        callback(self, &entries);
                    }
                }
                Delivery::Mutation(id, callback, records) => {
                    if self.inner.observers.lock().contains(id) {
                        callback(self, &records);
                    }
                }
            }
        }
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.inner.timers.lock().now()
    }

    /// Run `callback` once `delay` has elapsed on the virtual clock.
    pub fn set_timeout<F>(&self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce(&Document) + Send + 'static,
    {
        self.inner
            .timers
            .lock()
            .start_one_shot(delay, Box::new(callback))
    }

    /// Cancel a pending timeout. Clearing an expired or unknown timer is a
    /// no-op.
    pub fn clear_timeout(&self, id: TimerId) {
        // Dropping the payload outside the lock.
        let job = self.inner.timers.lock().stop(id).ok();
        drop(job);
    }

    /// Whether a timeout is still pending.
    pub fn is_timer_active(&self, id: TimerId) -> bool {
        self.inner.timers.lock().is_active(id)
    }

    /// Number of pending timeouts.
    pub fn pending_timers(&self) -> usize {
        self.inner.timers.lock().active_count()
    }

    /// Queue a microtask.
    pub fn queue_microtask<F>(&self, callback: F) -> TaskId
    where
        F: FnOnce(&Document) + Send + 'static,
    {
        self.inner.microtasks.lock().post(Box::new(callback))
    }

    /// Drop a microtask that has not run yet.
    ///
    /// Returns `false` if it already ran or was cancelled.
    pub fn cancel_microtask(&self, id: TaskId) -> bool {
        self.inner.microtasks.lock().cancel(id)
    }

    /// Whether microtasks are waiting to run.
    pub fn has_pending_microtasks(&self) -> bool {
        self.inner.microtasks.lock().has_pending()
    }

    /// Run microtasks until the queue is empty, including microtasks queued
    /// by the ones that run. Returns how many ran.
    pub fn run_microtasks(&self) -> usize {
        let mut ran = 0;
        while ran < MICROTASK_LIMIT {
            let Some(job) = self.inner.microtasks.lock().pop() else {
                return ran;
            };
            job(self);
            ran += 1;
        }
        tracing::warn!(
            target: targets::DOM,
            limit = MICROTASK_LIMIT,
            "microtask limit reached; remaining tasks deferred"
        );
        ran
    }

    /// Advance the virtual clock, firing due timers in order and draining
    /// microtasks before and after each.
    pub fn advance_time(&self, by: Duration) {
        self.run_microtasks();
        let deadline = self.now() + by;
        loop {
            let due = self.inner.timers.lock().pop_due(deadline);
            let Some((id, job)) = due else {
                break;
            };
            tracing::trace!(target: targets::TIMER, ?id, "timer fired");
            job(self);
            self.run_microtasks();
        }
        self.inner.timers.lock().advance_to(deadline);
    }

    // =========================================================================
    // Host lifecycle
    // =========================================================================

    /// Emitted for every node that becomes attached to the root.
    pub fn connected(&self) -> &Signal<ElementId> {
        &self.inner.connected
    }

    /// Emitted for every node that becomes detached from the root.
    pub fn disconnected(&self) -> &Signal<ElementId> {
        &self.inner.disconnected
    }
}

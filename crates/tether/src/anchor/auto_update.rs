//! Keeping a floating element attached to its anchor while layout changes.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tether_core::logging::targets;
use tether_core::{PerfSpan, Point};

use super::options::AnchorOptions;
use super::placement::{Placement, compute_placement, to_offset_space};
use super::position::AnchorPosition;
use crate::dom::{
    Document, ElementId, EventType, ListenerGuard, MutationOptions, ObserverGuard, WeakDocument,
};
use crate::error::Error;

type UpdateFn = dyn Fn(f32, f32, AnchorPosition) + Send + Sync;

#[derive(Default)]
struct LoopStatus {
    scheduled: bool,
    torn_down: bool,
    last: Option<Placement>,
}

struct AnchorLoop {
    doc: WeakDocument,
    target: ElementId,
    anchor: ElementId,
    options: AnchorOptions,
    on_update: Box<UpdateFn>,
    status: Mutex<LoopStatus>,
}

impl AnchorLoop {
    /// Queue a computation unless one is already queued.
    fn schedule(self: &Arc<Self>, doc: &Document) {
        {
            let mut status = self.status.lock();
            if status.torn_down || status.scheduled {
                return;
            }
            status.scheduled = true;
        }
        let weak = Arc::downgrade(self);
        doc.queue_microtask(move |doc| {
            if let Some(this) = weak.upgrade() {
                this.run(doc);
            }
        });
    }

    fn run(&self, doc: &Document) {
        {
            let mut status = self.status.lock();
            status.scheduled = false;
            if status.torn_down {
                return;
            }
        }
        let Some(placement) = self.compute(doc) else {
            tracing::trace!(
                target: targets::ANCHOR,
                target_el = ?self.target,
                anchor = ?self.anchor,
                "skipped: element missing or disconnected"
            );
            return;
        };
        self.status.lock().last = Some(placement);
        (self.on_update)(placement.x, placement.y, placement.position);
    }

    fn compute(&self, doc: &Document) -> Option<Placement> {
        if !doc.is_connected(self.target) || !doc.is_connected(self.anchor) {
            return None;
        }
        let _perf = PerfSpan::new("anchor.compute");
        let anchor_rect = doc.rect(self.anchor)?;
        let client_rects = if self.options.inline {
            doc.client_rects(self.anchor)
        } else {
            Vec::new()
        };
        let floating = doc.rect(self.target)?.size;
        let placement = compute_placement(anchor_rect, &client_rects, floating, doc.viewport(), &self.options);

        let parent = doc.offset_parent(self.target);
        let parent_rect = doc.rect(parent)?;
        let parent_scroll = doc.scroll_offset(parent).unwrap_or(Point::ZERO);
        Some(to_offset_space(placement, parent_rect, parent_scroll))
    }
}

/// Keeps a floating element positioned against its anchor.
///
/// Dropping the subscription (or calling [`teardown`](Self::teardown))
/// removes every listener and observer it installed.
#[must_use = "anchoring stops as soon as the subscription is dropped"]
pub struct AnchorSubscription {
    state: Arc<AnchorLoop>,
    listeners: Vec<ListenerGuard>,
    observers: Vec<ObserverGuard>,
}

impl AnchorSubscription {
    /// Stop updating. Calling this more than once is a no-op.
    pub fn teardown(&mut self) {
        let was_active = {
            let mut status = self.state.status.lock();
            !std::mem::replace(&mut status.torn_down, true)
        };
        self.listeners.clear();
        self.observers.clear();
        if was_active {
            tracing::debug!(target: targets::ANCHOR, target_el = ?self.state.target, "anchor loop torn down");
        }
    }

    /// Whether [`teardown`](Self::teardown) has run.
    pub fn is_torn_down(&self) -> bool {
        self.state.status.lock().torn_down
    }

    /// The last placement delivered to the callback.
    pub fn last_placement(&self) -> Option<Placement> {
        self.state.status.lock().last
    }

    /// Schedule a recomputation, coalesced with any pending one.
    pub fn request_update(&self) {
        if let Some(doc) = self.state.doc.upgrade() {
            self.state.schedule(&doc);
        }
    }
}

impl std::fmt::Debug for AnchorSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchorSubscription")
            .field("target", &self.state.target)
            .field("anchor", &self.state.anchor)
            .field("listeners", &self.listeners.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Drop for AnchorSubscription {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Position `target` against `anchor` now and whenever layout may have
/// changed.
///
/// The first computation runs in a microtask. After that, size changes of
/// either element, scrolling of any scroll container around them or of the
/// viewport, viewport resizes and attribute changes on the anchor each
/// schedule a recomputation; triggers that arrive before it runs are
/// coalesced. `on_update` receives coordinates in the target's offset-parent
/// space.
///
/// If either element is disconnected when a computation runs, it is skipped
/// and the last delivered coordinates stand.
pub fn position_anchor<F>(
    doc: &Document,
    target: ElementId,
    anchor: ElementId,
    options: AnchorOptions,
    on_update: F,
) -> AnchorSubscription
where
    F: Fn(f32, f32, AnchorPosition) + Send + Sync + 'static,
{
    let state = Arc::new(AnchorLoop {
        doc: doc.downgrade(),
        target,
        anchor,
        options,
        on_update: Box::new(on_update),
        status: Mutex::new(LoopStatus::default()),
    });
    state.schedule(doc);

    let trigger = |weak: Weak<AnchorLoop>| {
        move |doc: &Document| {
            if let Some(state) = weak.upgrade() {
                state.schedule(doc);
            }
        }
    };

    let mut scroll_roots = vec![doc.root()];
    for id in doc
        .scroll_ancestors(anchor)
        .into_iter()
        .chain(doc.scroll_ancestors(target))
    {
        if !scroll_roots.contains(&id) {
            scroll_roots.push(id);
        }
    }

    let mut listeners = Vec::with_capacity(scroll_roots.len() + 1);
    for id in scroll_roots {
        let on_scroll = trigger(Arc::downgrade(&state));
        listeners.push(doc.add_event_listener(id, EventType::Scroll, move |doc, _| on_scroll(doc)));
    }
    let on_resize = trigger(Arc::downgrade(&state));
    listeners.push(doc.add_event_listener(doc.root(), EventType::Resize, move |doc, _| on_resize(doc)));

    let mut observers = Vec::with_capacity(3);
    for id in [anchor, target] {
        let on_size = trigger(Arc::downgrade(&state));
        match doc.observe_resize(id, move |doc, _| on_size(doc)) {
            Ok(guard) => observers.push(guard),
            Err(Error::Unsupported(capability)) => {
                doc.warn_unsupported_once(capability);
                break;
            }
            Err(err) => tracing::debug!(target: targets::ANCHOR, %err, "resize observation failed"),
        }
    }
    let on_mutation = trigger(Arc::downgrade(&state));
    match doc.observe_mutations(anchor, MutationOptions::attributes(), move |doc, _| on_mutation(doc)) {
        Ok(guard) => observers.push(guard),
        Err(Error::Unsupported(capability)) => doc.warn_unsupported_once(capability),
        Err(err) => tracing::debug!(target: targets::ANCHOR, %err, "mutation observation failed"),
    }

    tracing::debug!(
        target: targets::ANCHOR,
        target_el = ?target,
        ?anchor,
        listeners = listeners.len(),
        observers = observers.len(),
        "anchor loop started"
    );
    AnchorSubscription {
        state,
        listeners,
        observers,
    }
}

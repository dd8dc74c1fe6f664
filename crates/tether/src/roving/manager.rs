//! Roving tabindex over an ordered item list.

use std::collections::HashSet;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tether_core::Signal;
use tether_core::logging::targets;

use crate::capability::{Disableable, ElementHandle, Focusable};
use crate::dom::{Document, ElementId, Event, EventType, FocusOrigin, Key, ListenerGuard, WeakDocument};

/// Which arrow keys move the active item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Left and Right.
    Horizontal,
    /// Up and Down.
    #[default]
    Vertical,
    /// All four arrows.
    Both,
}

/// Keyboard behavior of a [`RovingFocusManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RovingConfig {
    pub orientation: Orientation,
    /// Moving past either end lands on the other end.
    pub wrap: bool,
    /// Home and End jump to the first and last enabled item.
    pub home_end: bool,
    /// Right-to-left layout; Left moves forward.
    pub rtl: bool,
}

impl Default for RovingConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            wrap: false,
            home_end: true,
            rtl: false,
        }
    }
}

impl RovingConfig {
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_home_end(mut self, home_end: bool) -> Self {
        self.home_end = home_end;
        self
    }

    pub fn with_rtl(mut self, rtl: bool) -> Self {
        self.rtl = rtl;
        self
    }

    fn motion(&self, key: Key) -> Option<Motion> {
        let horizontal = matches!(self.orientation, Orientation::Horizontal | Orientation::Both);
        let vertical = matches!(self.orientation, Orientation::Vertical | Orientation::Both);
        let (back, forward) = if self.rtl {
            (Key::ArrowRight, Key::ArrowLeft)
        } else {
            (Key::ArrowLeft, Key::ArrowRight)
        };
        match key {
            Key::ArrowUp if vertical => Some(Motion::Previous),
            Key::ArrowDown if vertical => Some(Motion::Next),
            k if horizontal && k == back => Some(Motion::Previous),
            k if horizontal && k == forward => Some(Motion::Next),
            Key::Home if self.home_end => Some(Motion::First),
            Key::End if self.home_end => Some(Motion::Last),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Motion {
    Next,
    Previous,
    First,
    Last,
}

/// Items that entered and left the list in a [`RovingFocusManager::set_items`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemsDiff {
    pub added: Vec<ElementId>,
    pub removed: Vec<ElementId>,
}

#[derive(Debug, Default)]
struct RovingState {
    items: Vec<ElementId>,
    active: Option<usize>,
}

impl RovingState {
    fn active_item(&self) -> Option<ElementId> {
        self.active.and_then(|i| self.items.get(i).copied())
    }
}

/// Tracks the keyboard cursor of a composite widget.
///
/// Exactly one item (the active one) is reachable with Tab; arrow keys move
/// the active item and focus it. The manager never picks an active item on
/// its own: when the active item leaves the list, nothing is active until the
/// caller chooses one, usually [`first_enabled_item`](Self::first_enabled_item).
///
/// ```
/// use tether::dom::{Document, KeyData, Key};
/// use tether::roving::{RovingConfig, RovingFocusManager};
/// use tether_core::Size;
///
/// let doc = Document::new(Size::new(200.0, 200.0));
/// let items: Vec<_> = (0..3)
///     .map(|_| {
///         let item = doc.create_element("button");
///         doc.append_child(doc.root(), item).unwrap();
///         item
///     })
///     .collect();
///
/// let roving = RovingFocusManager::new(&doc, RovingConfig::default());
/// roving.set_items(items.clone());
/// roving.update_active_item(roving.first_enabled_item());
/// assert_eq!(doc.attribute(items[0], "tabindex").as_deref(), Some("0"));
/// assert_eq!(doc.attribute(items[1], "tabindex").as_deref(), Some("-1"));
/// ```
pub struct RovingFocusManager {
    doc: WeakDocument,
    config: Mutex<RovingConfig>,
    state: Mutex<RovingState>,
    active_changed: Signal<Option<ElementId>>,
}

impl RovingFocusManager {
    pub fn new(doc: &Document, config: RovingConfig) -> Self {
        Self {
            doc: doc.downgrade(),
            config: Mutex::new(config),
            state: Mutex::default(),
            active_changed: Signal::new(),
        }
    }

    /// Emitted with the new active item (or `None`) whenever it changes.
    pub fn active_changed(&self) -> &Signal<Option<ElementId>> {
        &self.active_changed
    }

    pub fn config(&self) -> RovingConfig {
        *self.config.lock()
    }

    pub fn set_config(&self, config: RovingConfig) {
        *self.config.lock() = config;
    }

    pub fn items(&self) -> Vec<ElementId> {
        self.state.lock().items.clone()
    }

    pub fn active_item(&self) -> Option<ElementId> {
        self.state.lock().active_item()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.state.lock().active
    }

    /// Replace the item list.
    ///
    /// The active item survives if it is still present. Otherwise nothing is
    /// active afterwards.
    pub fn set_items(&self, items: Vec<ElementId>) -> ItemsDiff {
        let (diff, previous, active) = {
            let mut state = self.state.lock();
            let old: HashSet<ElementId> = state.items.iter().copied().collect();
            let new: HashSet<ElementId> = items.iter().copied().collect();
            let diff = ItemsDiff {
                added: items.iter().copied().filter(|i| !old.contains(i)).collect(),
                removed: state.items.iter().copied().filter(|i| !new.contains(i)).collect(),
            };
            let previous = state.active_item();
            state.active = previous.and_then(|p| items.iter().position(|&i| i == p));
            state.items = items;
            (diff, previous, state.active_item())
        };

        tracing::debug!(
            target: targets::ROVING,
            added = diff.added.len(),
            removed = diff.removed.len(),
            ?active,
            "items replaced"
        );
        self.sync_tab_indices();
        if previous != active {
            self.active_changed.emit(active);
        }
        diff
    }

    /// Make `item` the active item without moving focus.
    ///
    /// Returns `false` if `item` is not in the list.
    pub fn update_active_item(&self, item: Option<ElementId>) -> bool {
        let changed = {
            let mut state = self.state.lock();
            let index = match item {
                Some(item) => match state.items.iter().position(|&i| i == item) {
                    Some(index) => Some(index),
                    None => return false,
                },
                None => None,
            };
            std::mem::replace(&mut state.active, index) != index
        };
        if changed {
            self.sync_tab_indices();
            self.active_changed.emit(item);
        }
        true
    }

    /// The first item that is not disabled.
    pub fn first_enabled_item(&self) -> Option<ElementId> {
        let doc = self.doc.upgrade()?;
        let items = self.items();
        items.into_iter().find(|&i| !ElementHandle::new(&doc, i).is_disabled())
    }

    /// The last item that is not disabled.
    pub fn last_enabled_item(&self) -> Option<ElementId> {
        let doc = self.doc.upgrade()?;
        let items = self.items();
        items.into_iter().rev().find(|&i| !ElementHandle::new(&doc, i).is_disabled())
    }

    /// Handle a navigation key.
    ///
    /// Returns `true` when the key belongs to the configured navigation, in
    /// which case the event's default is prevented. Keys held with Ctrl, Alt
    /// or Meta are left alone.
    pub fn on_key_down(&self, event: &Event) -> bool {
        let Some(data) = event.key_data() else {
            return false;
        };
        if data.modifiers.any_command() || event.is_default_prevented() {
            return false;
        }
        let Some(motion) = self.config().motion(data.key) else {
            return false;
        };
        let Some(doc) = self.doc.upgrade() else {
            return false;
        };
        event.prevent_default();

        let (items, active) = {
            let state = self.state.lock();
            (state.items.clone(), state.active)
        };
        let Some(next) = self.resolve(&doc, &items, active, motion) else {
            tracing::trace!(target: targets::ROVING, ?motion, "no enabled item to move to");
            return true;
        };
        if Some(next) != active {
            let item = items[next];
            self.update_active_item(Some(item));
            ElementHandle::new(&doc, item).focus(FocusOrigin::Keyboard);
        }
        true
    }

    /// Route key-downs and focus changes inside `container` to this manager.
    ///
    /// Focus landing on an item (or inside one) makes it active. The binding
    /// holds only a weak reference to the manager.
    pub fn bind(self: &Arc<Self>, container: ElementId) -> Option<RovingBinding> {
        let doc = self.doc.upgrade()?;
        let on_key = Arc::downgrade(self);
        let on_focus = Arc::downgrade(self);
        Some(RovingBinding {
            _key_down: doc.add_event_listener(container, EventType::KeyDown, move |_, event| {
                if let Some(manager) = on_key.upgrade() {
                    manager.on_key_down(event);
                }
            }),
            _focus_in: doc.add_event_listener(container, EventType::FocusIn, move |doc, event| {
                Self::on_focus_in(&on_focus, doc, event);
            }),
        })
    }

    fn on_focus_in(weak: &Weak<Self>, doc: &Document, event: &Event) {
        let Some(manager) = weak.upgrade() else {
            return;
        };
        let focused = event.target();
        let item = manager
            .items()
            .into_iter()
            .find(|&item| doc.composed_contains(item, focused));
        if item.is_some() {
            manager.update_active_item(item);
        }
    }

    fn resolve(&self, doc: &Document, items: &[ElementId], active: Option<usize>, motion: Motion) -> Option<usize> {
        let len = items.len();
        if len == 0 {
            return None;
        }
        let enabled = |i: usize| !ElementHandle::new(doc, items[i]).is_disabled();
        let wrap = self.config().wrap;
        match motion {
            Motion::First => (0..len).find(|&i| enabled(i)),
            Motion::Last => (0..len).rev().find(|&i| enabled(i)),
            Motion::Next => {
                let start = active.map_or(0, |i| i + 1);
                let forward = (start..len).find(|&i| enabled(i));
                match (forward, active) {
                    (Some(i), _) => Some(i),
                    (None, Some(current)) if wrap => (0..current).find(|&i| enabled(i)),
                    _ => None,
                }
            }
            Motion::Previous => {
                let end = active.unwrap_or(len);
                let backward = (0..end).rev().find(|&i| enabled(i));
                match (backward, active) {
                    (Some(i), _) => Some(i),
                    (None, Some(current)) if wrap => (current + 1..len).rev().find(|&i| enabled(i)),
                    _ => None,
                }
            }
        }
    }

    fn sync_tab_indices(&self) {
        let Some(doc) = self.doc.upgrade() else {
            return;
        };
        let (items, active) = {
            let state = self.state.lock();
            (state.items.clone(), state.active)
        };
        for (index, &item) in items.iter().enumerate() {
            let value = if Some(index) == active { "0" } else { "-1" };
            if doc.attribute(item, "tabindex").as_deref() == Some(value) {
                continue;
            }
            if let Err(err) = doc.set_attribute(item, "tabindex", value) {
                tracing::debug!(target: targets::ROVING, %err, ?item, "failed to update tabindex");
            }
        }
    }
}

impl std::fmt::Debug for RovingFocusManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RovingFocusManager")
            .field("config", &*self.config.lock())
            .field("items", &state.items.len())
            .field("active", &state.active)
            .finish()
    }
}

/// Listeners installed by [`RovingFocusManager::bind`]; removed on drop.
#[derive(Debug)]
pub struct RovingBinding {
    _key_down: ListenerGuard,
    _focus_in: ListenerGuard,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{KeyData, KeyboardModifiers};
    use tether_core::Size;

    fn setup(count: usize, config: RovingConfig) -> (Document, ElementId, Vec<ElementId>, Arc<RovingFocusManager>) {
        let doc = Document::new(Size::new(200.0, 200.0));
        let list = doc.create_element("md-list");
        doc.append_child(doc.root(), list).unwrap();
        let items: Vec<_> = (0..count)
            .map(|_| {
                let item = doc.create_element("button");
                doc.append_child(list, item).unwrap();
                item
            })
            .collect();
        let manager = Arc::new(RovingFocusManager::new(&doc, config));
        manager.set_items(items.clone());
        (doc, list, items, manager)
    }

    fn key(doc: &Document, manager: &RovingFocusManager, key: Key) -> bool {
        let target = doc.active_element().unwrap_or_else(|| doc.root());
        manager.on_key_down(&Event::key(EventType::KeyDown, target, KeyData::new(key)))
    }

    #[test]
    fn test_removed_active_item_clears_active() {
        let (_doc, _, items, manager) = setup(4, RovingConfig::default());
        manager.update_active_item(Some(items[1]));

        let diff = manager.set_items(vec![items[0], items[2], items[3]]);
        assert_eq!(diff.removed, vec![items[1]]);
        assert!(diff.added.is_empty());
        assert_eq!(manager.active_item(), None);
        assert_eq!(manager.active_index(), None);
    }

    #[test]
    fn test_surviving_active_item_is_reindexed() {
        let (_doc, _, items, manager) = setup(3, RovingConfig::default());
        manager.update_active_item(Some(items[2]));
        manager.set_items(vec![items[2], items[1]]);
        assert_eq!(manager.active_index(), Some(0));
    }

    #[test]
    fn test_wrap() {
        let (doc, _, items, manager) = setup(3, RovingConfig::default().with_wrap(true));
        manager.update_active_item(Some(items[2]));
        assert!(key(&doc, &manager, Key::ArrowDown));
        assert_eq!(manager.active_item(), Some(items[0]));
        assert_eq!(doc.active_element(), Some(items[0]));
        assert!(key(&doc, &manager, Key::ArrowUp));
        assert_eq!(manager.active_item(), Some(items[2]));
    }

    #[test]
    fn test_no_wrap_stays_at_end() {
        let (doc, _, items, manager) = setup(3, RovingConfig::default());
        manager.update_active_item(Some(items[2]));
        assert!(key(&doc, &manager, Key::ArrowDown));
        assert_eq!(manager.active_item(), Some(items[2]));
    }

    #[test]
    fn test_skips_disabled() {
        let (doc, _, items, manager) = setup(4, RovingConfig::default().with_wrap(true));
        doc.set_attribute(items[1], "disabled", "").unwrap();
        doc.set_attribute(items[3], "aria-disabled", "true").unwrap();
        manager.update_active_item(Some(items[0]));

        key(&doc, &manager, Key::ArrowDown);
        assert_eq!(manager.active_item(), Some(items[2]));
        key(&doc, &manager, Key::ArrowDown);
        assert_eq!(manager.active_item(), Some(items[0]));
        key(&doc, &manager, Key::End);
        assert_eq!(manager.active_item(), Some(items[2]));
    }

    #[test]
    fn test_orientation_and_rtl() {
        let config = RovingConfig::default().with_orientation(Orientation::Horizontal).with_rtl(true);
        let (doc, _, items, manager) = setup(3, config);
        manager.update_active_item(Some(items[1]));

        assert!(!key(&doc, &manager, Key::ArrowDown));
        assert!(key(&doc, &manager, Key::ArrowLeft));
        assert_eq!(manager.active_item(), Some(items[2]));
        assert!(key(&doc, &manager, Key::ArrowRight));
        assert_eq!(manager.active_item(), Some(items[1]));
    }

    #[test]
    fn test_modified_keys_are_ignored() {
        let (doc, _, items, manager) = setup(3, RovingConfig::default());
        manager.update_active_item(Some(items[0]));
        let data = KeyData::new(Key::ArrowDown).with_modifiers(KeyboardModifiers::CTRL);
        let event = Event::key(EventType::KeyDown, items[0], data);
        assert!(!manager.on_key_down(&event));
        assert!(!event.is_default_prevented());
        assert_eq!(manager.active_item(), Some(items[0]));
    }

    #[test]
    fn test_roving_tabindex_and_signal() {
        let (doc, _, items, manager) = setup(3, RovingConfig::default());
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        manager.active_changed().connect(move |active| sink.lock().push(*active));

        assert!(items.iter().all(|&i| doc.attribute(i, "tabindex").as_deref() == Some("-1")));
        manager.update_active_item(Some(items[1]));
        manager.update_active_item(Some(items[1]));
        assert_eq!(doc.attribute(items[1], "tabindex").as_deref(), Some("0"));
        assert_eq!(doc.attribute(items[0], "tabindex").as_deref(), Some("-1"));

        let stranger = doc.create_element("button");
        assert!(!manager.update_active_item(Some(stranger)));
        assert_eq!(*log.lock(), vec![Some(items[1])]);
    }

    #[test]
    fn test_bind_follows_focus_and_keys() {
        let (doc, list, items, manager) = setup(3, RovingConfig::default());
        let _binding = manager.bind(list).unwrap();

        doc.focus(items[1], FocusOrigin::Pointer);
        assert_eq!(manager.active_item(), Some(items[1]));

        doc.key_down(KeyData::new(Key::ArrowDown));
        assert_eq!(manager.active_item(), Some(items[2]));
        assert_eq!(doc.active_element(), Some(items[2]));
    }
}

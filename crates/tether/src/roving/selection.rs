//! Committed selection, kept apart from the keyboard cursor.
//!
//! Tabs, segmented buttons and radio-like lists have two notions of "current":
//! the active item that arrow keys move, and the selected item that the user
//! committed to. [`SelectionManager`] tracks the second one per named group.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tether_core::Signal;
use tether_core::logging::targets;

use crate::dom::ElementId;

/// Whether moving the active item also selects it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    /// Only an explicit [`SelectionManager::select`] commits.
    #[default]
    Manual,
    /// Every active-item change commits.
    FollowsFocus,
}

/// The selection of a group changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    pub group: String,
    pub selected: Option<ElementId>,
    pub previous: Option<ElementId>,
}

#[derive(Debug, Default)]
struct Group {
    items: Vec<ElementId>,
    selected: Option<ElementId>,
}

#[derive(Debug, Default)]
struct SelectionState {
    groups: HashMap<String, Group>,
    membership: HashMap<ElementId, String>,
}

/// Exclusive selection within named groups.
///
/// Selecting an item deselects every other item of its group. An item
/// belongs to at most one group; adding it to another moves it.
pub struct SelectionManager {
    mode: Mutex<SelectionMode>,
    state: Mutex<SelectionState>,
    selection_changed: Signal<SelectionChange>,
}

impl Default for SelectionManager {
    fn default() -> Self {
        Self::new(SelectionMode::default())
    }
}

impl SelectionManager {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode: Mutex::new(mode),
            state: Mutex::default(),
            selection_changed: Signal::new(),
        }
    }

    pub fn selection_changed(&self) -> &Signal<SelectionChange> {
        &self.selection_changed
    }

    pub fn mode(&self) -> SelectionMode {
        *self.mode.lock()
    }

    pub fn set_mode(&self, mode: SelectionMode) {
        *self.mode.lock() = mode;
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Add `item` to `group`, creating the group if needed.
    pub fn add(&self, group: &str, item: ElementId) {
        self.remove(item);
        let mut state = self.state.lock();
        state.groups.entry(group.to_owned()).or_default().items.push(item);
        state.membership.insert(item, group.to_owned());
    }

    /// Remove `item` from its group. A selected item takes the group's
    /// selection with it.
    ///
    /// Returns `false` if the item was in no group.
    pub fn remove(&self, item: ElementId) -> bool {
        let change = {
            let mut state = self.state.lock();
            let Some(name) = state.membership.remove(&item) else {
                return false;
            };
            let Some(group) = state.groups.get_mut(&name) else {
                return true;
            };
            group.items.retain(|&i| i != item);
            let cleared = group.selected == Some(item);
            if cleared {
                group.selected = None;
            }
            if group.items.is_empty() {
                state.groups.remove(&name);
            }
            cleared.then(|| SelectionChange {
                group: name,
                selected: None,
                previous: Some(item),
            })
        };
        if let Some(change) = change {
            self.emit(change);
        }
        true
    }

    /// Replace the members of `group`, typically with the items of a
    /// [`RovingFocusManager`](super::RovingFocusManager) after it changed.
    pub fn set_group_items(&self, group: &str, items: &[ElementId]) {
        let stale: Vec<ElementId> = self
            .group_items(group)
            .into_iter()
            .filter(|i| !items.contains(i))
            .collect();
        for item in stale {
            self.remove(item);
        }
        for &item in items {
            if self.group_of(item).as_deref() != Some(group) {
                self.add(group, item);
            }
        }
    }

    pub fn group_of(&self, item: ElementId) -> Option<String> {
        self.state.lock().membership.get(&item).cloned()
    }

    pub fn group_items(&self, group: &str) -> Vec<ElementId> {
        self.state
            .lock()
            .groups
            .get(group)
            .map(|g| g.items.clone())
            .unwrap_or_default()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select `item`, deselecting the rest of its group.
    ///
    /// Returns `false` if the item is in no group. Selecting the already
    /// selected item is a no-op.
    pub fn select(&self, item: ElementId) -> bool {
        let change = {
            let mut state = self.state.lock();
            let Some(name) = state.membership.get(&item).cloned() else {
                return false;
            };
            let Some(group) = state.groups.get_mut(&name) else {
                return false;
            };
            let previous = group.selected.replace(item);
            (previous != Some(item)).then_some(SelectionChange {
                group: name,
                selected: Some(item),
                previous,
            })
        };
        if let Some(change) = change {
            self.emit(change);
        }
        true
    }

    /// Clear the selection of `group`.
    pub fn clear(&self, group: &str) {
        let previous = self
            .state
            .lock()
            .groups
            .get_mut(group)
            .and_then(|g| g.selected.take());
        if previous.is_some() {
            self.emit(SelectionChange {
                group: group.to_owned(),
                selected: None,
                previous,
            });
        }
    }

    pub fn selected(&self, group: &str) -> Option<ElementId> {
        self.state.lock().groups.get(group).and_then(|g| g.selected)
    }

    pub fn is_selected(&self, item: ElementId) -> bool {
        let state = self.state.lock();
        state
            .membership
            .get(&item)
            .and_then(|name| state.groups.get(name))
            .is_some_and(|g| g.selected == Some(item))
    }

    /// Feed an active-item change from a roving manager.
    ///
    /// In [`SelectionMode::FollowsFocus`] the new active item is selected.
    pub fn on_active_changed(&self, active: Option<ElementId>) {
        if self.mode() != SelectionMode::FollowsFocus {
            return;
        }
        if let Some(item) = active {
            self.select(item);
        }
    }

    fn emit(&self, change: SelectionChange) {
        tracing::debug!(
            target: targets::ROVING,
            group = %change.group,
            selected = ?change.selected,
            previous = ?change.previous,
            "selection changed"
        );
        self.selection_changed.emit(change);
    }
}

impl std::fmt::Debug for SelectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionManager")
            .field("mode", &self.mode())
            .field("groups", &self.state.lock().groups.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;
    use std::sync::Arc;

    fn id(n: u64) -> ElementId {
        ElementId::from(KeyData::from_ffi(n))
    }

    fn tabs(manager: &SelectionManager) -> Vec<ElementId> {
        let items: Vec<_> = (1..=3).map(id).collect();
        for &item in &items {
            manager.add("tabs", item);
        }
        items
    }

    #[test]
    fn test_select_is_exclusive() {
        let manager = SelectionManager::default();
        let items = tabs(&manager);
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        manager
            .selection_changed()
            .connect(move |c| sink.lock().push((c.selected, c.previous)));

        assert!(manager.select(items[0]));
        assert!(manager.select(items[2]));
        assert!(manager.select(items[2]));
        assert_eq!(manager.selected("tabs"), Some(items[2]));
        assert!(!manager.is_selected(items[0]));
        assert_eq!(
            *log.lock(),
            vec![(Some(items[0]), None), (Some(items[2]), Some(items[0]))]
        );
    }

    #[test]
    fn test_groups_are_independent() {
        let manager = SelectionManager::default();
        let items = tabs(&manager);
        manager.add("filters", id(9));
        manager.select(items[1]);
        manager.select(id(9));
        assert_eq!(manager.selected("tabs"), Some(items[1]));
        assert_eq!(manager.selected("filters"), Some(id(9)));
        assert!(!manager.select(id(42)));
    }

    #[test]
    fn test_removing_selected_clears_group() {
        let manager = SelectionManager::default();
        let items = tabs(&manager);
        manager.select(items[1]);
        manager.set_group_items("tabs", &[items[0], items[2]]);
        assert_eq!(manager.selected("tabs"), None);
        assert_eq!(manager.group_items("tabs"), vec![items[0], items[2]]);
    }

    #[test]
    fn test_follows_focus_mode() {
        let manager = SelectionManager::default();
        let items = tabs(&manager);
        manager.on_active_changed(Some(items[1]));
        assert_eq!(manager.selected("tabs"), None);

        manager.set_mode(SelectionMode::FollowsFocus);
        manager.on_active_changed(Some(items[1]));
        manager.on_active_changed(None);
        assert_eq!(manager.selected("tabs"), Some(items[1]));
    }
}

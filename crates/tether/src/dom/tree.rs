//! Arena-backed node tree with shadow roots and slot assignment.
//!
//! [`Tree`] is the lock-free core of the [`Document`](super::Document). It
//! knows nothing about listeners, observers or signals; structural operations
//! report what changed so the document can notify the outside world after it
//! has released its locks.

use slotmap::SlotMap;
use tether_core::{Rect, Size};

use super::element::{ElementData, ElementId, NodeKind};
use crate::error::{Error, Result};

/// What a structural change did to connectedness.
#[derive(Debug, Default)]
pub(crate) struct ChildListChange {
    /// The previous parent, if the node was moved.
    pub old_parent: Option<ElementId>,
    /// Nodes that became connected, in tree order.
    pub connected: Vec<ElementId>,
    /// Nodes that became disconnected, in tree order.
    pub disconnected: Vec<ElementId>,
}

/// The node arena.
#[derive(Debug)]
pub(crate) struct Tree {
    nodes: SlotMap<ElementId, ElementData>,
    root: ElementId,
}

impl Tree {
    pub fn new(viewport: Size) -> Self {
        let mut nodes = SlotMap::with_key();
        let mut root_data = ElementData::new(NodeKind::Root, "#document");
        root_data.connected = true;
        root_data.rect = Rect::new(0.0, 0.0, viewport.width, viewport.height);
        let root = nodes.insert(root_data);
        Self { nodes, root }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementData> {
        self.nodes.get(id)
    }

    pub fn node(&self, id: ElementId) -> Result<&ElementData> {
        self.nodes.get(id).ok_or(Error::UnknownElement(id))
    }

    pub fn node_mut(&mut self, id: ElementId) -> Result<&mut ElementData> {
        self.nodes.get_mut(id).ok_or(Error::UnknownElement(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn create_element(&mut self, tag: &str) -> ElementId {
        self.nodes.insert(ElementData::new(NodeKind::Element, tag))
    }

    /// Attach a shadow root to `host`.
    pub fn attach_shadow(&mut self, host: ElementId, delegates_focus: bool) -> Result<ElementId> {
        let host_data = self.node(host)?;
        if host_data.kind != NodeKind::Element {
            return Err(Error::HierarchyRequest {
                parent: host,
                child: host,
            });
        }
        if host_data.shadow_root.is_some() {
            return Err(Error::ShadowRootExists(host));
        }
        let connected = host_data.connected;

        let mut data = ElementData::new(NodeKind::ShadowRoot { delegates_focus }, "#shadow-root");
        data.parent = Some(host);
        data.connected = connected;
        let shadow = self.nodes.insert(data);
        self.node_mut(host)?.shadow_root = Some(shadow);
        Ok(shadow)
    }

    /// Insert `child` under `parent` before `reference` (or at the end).
    ///
    /// A child that already has a parent is moved.
    pub fn insert_before(
        &mut self,
        parent: ElementId,
        child: ElementId,
        reference: Option<ElementId>,
    ) -> Result<ChildListChange> {
        self.node(parent)?;
        let child_kind = self.node(child)?.kind;
        if child_kind != NodeKind::Element || self.is_inclusive_ancestor(child, parent) {
            return Err(Error::HierarchyRequest { parent, child });
        }
        if let Some(reference) = reference {
            if self.node(reference)?.parent != Some(parent) || reference == child {
                return Err(Error::HierarchyRequest { parent, child });
            }
        }

        let mut change = ChildListChange::default();
        if self.node(child)?.parent.is_some() {
            let detached = self.detach(child)?;
            change.old_parent = detached.old_parent;
            change.disconnected = detached.disconnected;
        }

        let parent_data = self.node_mut(parent)?;
        let index = reference
            .and_then(|r| parent_data.children.iter().position(|&c| c == r))
            .unwrap_or(parent_data.children.len());
        parent_data.children.insert(index, child);
        let parent_connected = parent_data.connected;
        self.node_mut(child)?.parent = Some(parent);

        if parent_connected {
            let subtree = self.subtree(child);
            for &id in &subtree {
                if let Some(data) = self.nodes.get_mut(id) {
                    data.connected = true;
                }
            }
            if change.disconnected.is_empty() {
                change.connected = subtree;
            } else {
                // A move within the connected tree is not a disconnect/connect pair.
                change.disconnected.clear();
            }
        }
        Ok(change)
    }

    /// Remove `child` from its parent.
    pub fn detach(&mut self, child: ElementId) -> Result<ChildListChange> {
        let Some(parent) = self.node(child)?.parent else {
            return Ok(ChildListChange::default());
        };
        if matches!(self.node(child)?.kind, NodeKind::ShadowRoot { .. } | NodeKind::Root) {
            return Err(Error::HierarchyRequest { parent, child });
        }

        let was_connected = self.node(child)?.connected;
        self.node_mut(parent)?.children.retain(|&c| c != child);
        self.node_mut(child)?.parent = None;

        let mut change = ChildListChange {
            old_parent: Some(parent),
            ..Default::default()
        };
        if was_connected {
            let subtree = self.subtree(child);
            for &id in &subtree {
                if let Some(data) = self.nodes.get_mut(id) {
                    data.connected = false;
                }
            }
            change.disconnected = subtree;
        }
        Ok(change)
    }

    /// `node` and all its descendants, including shadow trees, in tree order.
    pub fn subtree(&self, node: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Some(data) = self.nodes.get(id) else {
                continue;
            };
            out.push(id);
            for &child in data.children.iter().rev() {
                stack.push(child);
            }
            if let Some(shadow) = data.shadow_root {
                stack.push(shadow);
            }
        }
        out
    }

    /// Whether `ancestor` is `node` or one of its light/host ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|d| d.parent);
        }
        false
    }

    /// The shadow root `node` lives in, if any.
    pub fn containing_shadow_root(&self, node: ElementId) -> Option<ElementId> {
        let mut current = self.nodes.get(node)?.parent;
        let mut previous = node;
        while let Some(id) = current {
            let data = self.nodes.get(id)?;
            if let NodeKind::ShadowRoot { .. } = data.kind {
                return Some(id);
            }
            // Crossing from a shadow root's host means we left the tree.
            if data.shadow_root == Some(previous) {
                return None;
            }
            previous = id;
            current = data.parent;
        }
        None
    }

    /// The slot a light child of a shadow host is assigned to.
    pub fn assigned_slot(&self, node: ElementId) -> Option<ElementId> {
        let data = self.nodes.get(node)?;
        if data.kind != NodeKind::Element {
            return None;
        }
        let host = self.nodes.get(data.parent?)?;
        let shadow = host.shadow_root?;
        let wanted = data.requested_slot();
        self.find_slot(shadow, wanted)
    }

    /// First `<slot>` with `name` in a shadow tree, not descending into
    /// nested shadow trees.
    fn find_slot(&self, shadow: ElementId, name: &str) -> Option<ElementId> {
        let mut stack: Vec<ElementId> = self.nodes.get(shadow)?.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let data = self.nodes.get(id)?;
            if data.is_slot() && data.slot_name() == name {
                return Some(id);
            }
            stack.extend(data.children.iter().rev().copied());
        }
        None
    }

    /// Light children of the host assigned to `slot`, in order.
    pub fn assigned_nodes(&self, slot: ElementId) -> Vec<ElementId> {
        let Some(shadow) = self.containing_shadow_root(slot) else {
            return Vec::new();
        };
        let Some(host) = self.nodes.get(shadow).and_then(|d| d.parent) else {
            return Vec::new();
        };
        let Some(host_data) = self.nodes.get(host) else {
            return Vec::new();
        };
        host_data
            .children
            .iter()
            .copied()
            .filter(|&child| self.assigned_slot(child) == Some(slot))
            .collect()
    }

    /// Parent in the composed (flattened) tree.
    ///
    /// Slotted children report their slot, shadow roots report their host.
    /// A light child of a shadow host that no slot accepts reports its light
    /// parent.
    pub fn composed_parent(&self, node: ElementId) -> Option<ElementId> {
        let data = self.nodes.get(node)?;
        let parent = data.parent?;
        if data.kind == NodeKind::Element {
            if let Some(slot) = self.assigned_slot(node) {
                return Some(slot);
            }
        }
        Some(parent)
    }

    /// Children in the composed (flattened) tree.
    pub fn composed_children(&self, node: ElementId) -> Vec<ElementId> {
        let Some(data) = self.nodes.get(node) else {
            return Vec::new();
        };
        if let Some(shadow) = data.shadow_root {
            return self
                .nodes
                .get(shadow)
                .map(|s| s.children.clone())
                .unwrap_or_default();
        }
        if data.is_slot() && self.containing_shadow_root(node).is_some() {
            let assigned = self.assigned_nodes(node);
            if !assigned.is_empty() {
                return assigned;
            }
        }
        data.children.clone()
    }

    /// Composed ancestors from the nearest outwards, excluding `node`.
    pub fn composed_ancestors(&self, node: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut current = self.composed_parent(node);
        while let Some(id) = current {
            out.push(id);
            current = self.composed_parent(id);
        }
        out
    }

    /// Nearest positioned composed ancestor, else the root.
    pub fn offset_parent(&self, node: ElementId) -> ElementId {
        self.composed_ancestors(node)
            .into_iter()
            .find(|&id| self.nodes.get(id).is_some_and(|d| d.positioned && d.is_element()))
            .unwrap_or(self.root)
    }

    /// Composed ancestors that are scroll containers, nearest first.
    pub fn scroll_ancestors(&self, node: ElementId) -> Vec<ElementId> {
        self.composed_ancestors(node)
            .into_iter()
            .filter(|&id| self.nodes.get(id).is_some_and(|d| d.scroll_container))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Tree {
        Tree::new(Size::new(800.0, 600.0))
    }

    #[test]
    fn test_append_connects_subtree() {
        let mut t = tree();
        let parent = t.create_element("div");
        let child = t.create_element("span");
        t.insert_before(parent, child, None).unwrap();
        assert!(!t.get(child).unwrap().is_connected());

        let change = t.insert_before(t.root(), parent, None).unwrap();
        assert_eq!(change.connected, vec![parent, child]);
        assert!(t.get(child).unwrap().is_connected());
    }

    #[test]
    fn test_cycle_rejected() {
        let mut t = tree();
        let a = t.create_element("div");
        let b = t.create_element("div");
        t.insert_before(a, b, None).unwrap();
        assert!(matches!(
            t.insert_before(b, a, None),
            Err(Error::HierarchyRequest { .. })
        ));
        assert!(t.insert_before(a, a, None).is_err());
    }

    #[test]
    fn test_move_within_connected_tree_is_not_a_disconnect() {
        let mut t = tree();
        let root = t.root();
        let a = t.create_element("div");
        let b = t.create_element("div");
        let item = t.create_element("span");
        t.insert_before(root, a, None).unwrap();
        t.insert_before(root, b, None).unwrap();
        t.insert_before(a, item, None).unwrap();

        let change = t.insert_before(b, item, None).unwrap();
        assert_eq!(change.old_parent, Some(a));
        assert!(change.connected.is_empty());
        assert!(change.disconnected.is_empty());
        assert_eq!(t.get(b).unwrap().children(), &[item]);
    }

    #[test]
    fn test_detach_reports_disconnected() {
        let mut t = tree();
        let root = t.root();
        let host = t.create_element("md-menu");
        t.insert_before(root, host, None).unwrap();
        let shadow = t.attach_shadow(host, false).unwrap();
        let inner = t.create_element("div");
        t.insert_before(shadow, inner, None).unwrap();

        let change = t.detach(host).unwrap();
        assert_eq!(change.old_parent, Some(root));
        assert_eq!(change.disconnected, vec![host, shadow, inner]);
    }

    #[test]
    fn test_slot_assignment_and_composed_tree() {
        let mut t = tree();
        let host = t.create_element("md-list");
        let shadow = t.attach_shadow(host, false).unwrap();
        let wrapper = t.create_element("div");
        let default_slot = t.create_element("slot");
        let named_slot = t.create_element("slot");
        t.node_mut(named_slot).unwrap().attributes.insert("name".into(), "end".into());
        t.insert_before(shadow, wrapper, None).unwrap();
        t.insert_before(wrapper, default_slot, None).unwrap();
        t.insert_before(wrapper, named_slot, None).unwrap();

        let item = t.create_element("md-list-item");
        let trailing = t.create_element("span");
        t.node_mut(trailing).unwrap().attributes.insert("slot".into(), "end".into());
        t.insert_before(host, item, None).unwrap();
        t.insert_before(host, trailing, None).unwrap();

        assert_eq!(t.assigned_slot(item), Some(default_slot));
        assert_eq!(t.assigned_slot(trailing), Some(named_slot));
        assert_eq!(t.composed_children(host), vec![wrapper]);
        assert_eq!(t.composed_children(default_slot), vec![item]);
        assert_eq!(t.composed_parent(item), Some(default_slot));
        assert_eq!(
            t.composed_ancestors(trailing),
            vec![named_slot, wrapper, shadow, host]
        );
    }

    #[test]
    fn test_offset_parent_and_scroll_ancestors() {
        let mut t = tree();
        let root = t.root();
        let scroller = t.create_element("div");
        let positioned = t.create_element("div");
        let leaf = t.create_element("span");
        t.insert_before(root, scroller, None).unwrap();
        t.insert_before(scroller, positioned, None).unwrap();
        t.insert_before(positioned, leaf, None).unwrap();
        t.node_mut(scroller).unwrap().scroll_container = true;

        assert_eq!(t.offset_parent(leaf), root);
        t.node_mut(positioned).unwrap().positioned = true;
        assert_eq!(t.offset_parent(leaf), positioned);
        assert_eq!(t.scroll_ancestors(leaf), vec![scroller]);
    }
}

//! Deciding which elements can take keyboard focus.
//!
//! The rules follow sequential (Tab) navigation:
//!
//! - Native controls (`button`, `input`, `select`, `textarea`, links with an
//!   `href`, anything `contenteditable`) are focusable unless disabled or
//!   given a negative `tabindex`. `input type="hidden"` never is.
//! - Custom elements (a `-` in the tag) are focusable when enabled, not
//!   `aria-disabled`, not opted out with a negative `tabindex`, and their
//!   shadow root delegates focus. Without a delegating shadow root they are
//!   never a tab stop, whatever their `tabindex`.
//! - Other elements need an explicit non-negative `tabindex`.
//!
//! In every case an element that is itself `disabled` or
//! `aria-hidden="true"`, or has such an ancestor, is unfocusable.

mod focus_trap;

pub use focus_trap::FocusTrap;

use tether_core::logging::targets;

use crate::dom::{Document, ElementData, ElementId, NodeKind};

/// How an element takes part in focus navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interactivity {
    Native,
    CustomDelegating,
    Custom,
    Other,
}

#[derive(Debug, Clone, Copy)]
struct Snapshot {
    class: Interactivity,
    tab_index: Option<i32>,
    disabled: bool,
    aria_disabled: bool,
    blocks_descendants: bool,
}

fn is_native_interactive(el: &ElementData) -> bool {
    match el.tag() {
        "button" | "select" | "textarea" => true,
        "input" => !el.attribute("type").is_some_and(|t| t.eq_ignore_ascii_case("hidden")),
        "a" | "area" => el.has_attribute("href"),
        _ => el.is_content_editable(),
    }
}

fn snapshot(doc: &Document, id: ElementId) -> Option<Snapshot> {
    let (mut snap, shadow) = doc.with_element(id, |el| {
        if !el.is_element() {
            return None;
        }
        let class = if is_native_interactive(el) {
            Interactivity::Native
        } else if el.is_custom_element() {
            Interactivity::Custom
        } else {
            Interactivity::Other
        };
        Some((
            Snapshot {
                class,
                tab_index: el.tab_index(),
                disabled: el.is_disabled(),
                aria_disabled: el.is_aria_disabled(),
                blocks_descendants: blocks_descendants(el),
            },
            el.shadow_root(),
        ))
    })??;
    if snap.class == Interactivity::Custom {
        let delegates = shadow
            .and_then(|s| doc.with_element(s, |s| s.kind()))
            .is_some_and(|kind| matches!(kind, NodeKind::ShadowRoot { delegates_focus: true }));
        if delegates {
            snap.class = Interactivity::CustomDelegating;
        }
    }
    Some(snap)
}

/// `disabled` or `aria-hidden="true"`: nothing below can take focus.
fn blocks_descendants(el: &ElementData) -> bool {
    el.is_disabled() || el.is_aria_hidden()
}

fn ancestors_allow(doc: &Document, ancestors: &[ElementId]) -> bool {
    !ancestors
        .iter()
        .any(|&id| doc.with_element(id, blocks_descendants).unwrap_or(false))
}

fn snapshot_is_focusable(snap: &Snapshot) -> bool {
    if snap.blocks_descendants {
        return false;
    }
    let tab_ok = snap.tab_index.unwrap_or(0) >= 0;
    match snap.class {
        Interactivity::Native => tab_ok,
        Interactivity::CustomDelegating => !snap.aria_disabled && tab_ok,
        Interactivity::Custom => false,
        Interactivity::Other => snap.tab_index.is_some_and(|t| t >= 0),
    }
}

/// Whether `element` is reachable by sequential keyboard navigation.
///
/// `ancestors` may supply the element's composed ancestors when the caller
/// already has them; `None` computes them.
pub fn is_focusable(doc: &Document, element: ElementId, ancestors: Option<&[ElementId]>) -> bool {
    let Some(snap) = snapshot(doc, element) else {
        return false;
    };
    if !snapshot_is_focusable(&snap) {
        return false;
    }
    match ancestors {
        Some(ancestors) => ancestors_allow(doc, ancestors),
        None => ancestors_allow(doc, &doc.composed_ancestors(element)),
    }
}

/// Whether `element` accepts focus from script.
///
/// Wider than [`is_focusable`]: a negative `tabindex` still allows
/// programmatic focus, and `aria-hidden` does not prevent it.
pub fn is_programmatically_focusable(doc: &Document, element: ElementId) -> bool {
    if !doc.is_connected(element) {
        return false;
    }
    let Some(snap) = snapshot(doc, element) else {
        return false;
    };
    let own = match snap.class {
        Interactivity::Native => !snap.disabled,
        Interactivity::CustomDelegating | Interactivity::Custom => {
            snap.tab_index.is_some() && !snap.disabled
        }
        Interactivity::Other => snap.tab_index.is_some(),
    };
    own && !doc
        .composed_ancestors(element)
        .into_iter()
        .any(|id| doc.with_element(id, ElementData::is_disabled).unwrap_or(false))
}

/// Focusable elements below `root` in composed-tree order.
///
/// Slotted content is visited where it is rendered. Disabled and
/// `aria-hidden` subtrees are skipped. A focusable custom element that
/// delegates focus is one stop: its shadow tree is not entered.
pub fn find_interactive_elements(doc: &Document, root: ElementId) -> Vec<ElementId> {
    let mut found = Vec::new();
    let inclusive = std::iter::once(root).chain(doc.composed_ancestors(root));
    if !ancestors_allow(doc, &inclusive.collect::<Vec<_>>()) {
        return found;
    }

    let mut stack: Vec<ElementId> = doc.composed_children(root).into_iter().rev().collect();
    while let Some(id) = stack.pop() {
        let snap = snapshot(doc, id);
        if let Some(snap) = snap {
            if snap.blocks_descendants {
                continue;
            }
            // Ancestors were checked on the way down.
            if snapshot_is_focusable(&snap) {
                found.push(id);
                if snap.class == Interactivity::CustomDelegating {
                    continue;
                }
            }
        }
        stack.extend(doc.composed_children(id).into_iter().rev());
    }
    tracing::trace!(target: targets::INTERACTIVITY, ?root, count = found.len(), "interactive elements");
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::Size;

    fn doc() -> Document {
        Document::new(Size::new(800.0, 600.0))
    }

    fn add(doc: &Document, parent: ElementId, tag: &str, attrs: &[(&str, &str)]) -> ElementId {
        let el = doc.create_element(tag);
        for (name, value) in attrs {
            doc.set_attribute(el, name, value).unwrap();
        }
        doc.append_child(parent, el).unwrap();
        el
    }

    #[test]
    fn test_native_elements() {
        let doc = doc();
        let root = doc.root();
        let button = add(&doc, root, "button", &[]);
        let disabled = add(&doc, root, "button", &[("disabled", "")]);
        let opted_out = add(&doc, root, "button", &[("tabindex", "-1")]);
        let link = add(&doc, root, "a", &[("href", "#x")]);
        let anchor = add(&doc, root, "a", &[]);
        let hidden = add(&doc, root, "input", &[("type", "hidden")]);
        let editable = add(&doc, root, "div", &[("contenteditable", "true")]);

        assert!(is_focusable(&doc, button, None));
        assert!(!is_focusable(&doc, disabled, None));
        assert!(!is_focusable(&doc, opted_out, None));
        assert!(is_focusable(&doc, link, None));
        assert!(!is_focusable(&doc, anchor, None));
        assert!(!is_focusable(&doc, hidden, None));
        assert!(is_focusable(&doc, editable, None));
    }

    #[test]
    fn test_custom_elements() {
        let doc = doc();
        let root = doc.root();
        let delegating = add(&doc, root, "md-outlined-button", &[]);
        doc.attach_shadow(delegating, true).unwrap();
        let opted_out = add(&doc, root, "md-outlined-button", &[("tabindex", "-1")]);
        doc.attach_shadow(opted_out, true).unwrap();
        let aria_disabled = add(&doc, root, "md-chip", &[("aria-disabled", "true")]);
        doc.attach_shadow(aria_disabled, true).unwrap();
        let closed = add(&doc, root, "md-divider", &[]);
        doc.attach_shadow(closed, false).unwrap();

        assert!(is_focusable(&doc, delegating, None));
        assert!(!is_focusable(&doc, opted_out, None));
        assert!(!is_focusable(&doc, aria_disabled, None));
        assert!(!is_focusable(&doc, closed, None));
    }

    #[test]
    fn test_custom_element_without_delegation_is_not_a_tab_stop() {
        let doc = doc();
        let root = doc.root();
        let bare = add(&doc, root, "md-chip", &[("tabindex", "0")]);
        let disabled = add(&doc, root, "md-chip", &[("tabindex", "0"), ("disabled", "")]);
        let aria_disabled = add(&doc, root, "md-chip", &[("tabindex", "0"), ("aria-disabled", "true")]);
        let closed = add(&doc, root, "md-chip", &[("tabindex", "0")]);
        doc.attach_shadow(closed, false).unwrap();

        for chip in [bare, disabled, aria_disabled, closed] {
            assert!(!is_focusable(&doc, chip, None));
        }
        assert!(find_interactive_elements(&doc, root).is_empty());
        // Script can still focus the enabled ones.
        assert!(is_programmatically_focusable(&doc, bare));
        assert!(!is_programmatically_focusable(&doc, disabled));
    }

    #[test]
    fn test_own_state_matches_walk() {
        let doc = doc();
        let root = doc.root();
        let group = add(&doc, root, "div", &[("tabindex", "0"), ("disabled", "")]);
        let hidden = add(&doc, root, "button", &[("aria-hidden", "true")]);
        let tabbable = add(&doc, root, "div", &[("tabindex", "0")]);

        assert!(!is_focusable(&doc, group, None));
        assert!(!is_focusable(&doc, hidden, None));
        let found = find_interactive_elements(&doc, root);
        for el in [group, hidden, tabbable] {
            assert_eq!(found.contains(&el), is_focusable(&doc, el, None));
        }
    }

    #[test]
    fn test_tabindex_on_plain_elements() {
        let doc = doc();
        let root = doc.root();
        let plain = add(&doc, root, "div", &[]);
        let tabbable = add(&doc, root, "div", &[("tabindex", "0")]);
        let scripted = add(&doc, root, "div", &[("tabindex", "-1")]);

        assert!(!is_focusable(&doc, plain, None));
        assert!(is_focusable(&doc, tabbable, None));
        assert!(!is_focusable(&doc, scripted, None));
        assert!(is_programmatically_focusable(&doc, scripted));
        assert!(!is_programmatically_focusable(&doc, plain));
    }

    #[test]
    fn test_ancestor_state() {
        let doc = doc();
        let root = doc.root();
        let fieldset = add(&doc, root, "fieldset", &[("disabled", "")]);
        let inside = add(&doc, fieldset, "button", &[]);
        let hidden = add(&doc, root, "div", &[("aria-hidden", "true")]);
        let concealed = add(&doc, hidden, "button", &[]);

        assert!(!is_focusable(&doc, inside, None));
        assert!(!is_focusable(&doc, concealed, None));
        // Caller-supplied ancestors are trusted as given.
        assert!(is_focusable(&doc, inside, Some(&[])));
        assert!(is_programmatically_focusable(&doc, concealed));
        assert!(!is_programmatically_focusable(&doc, inside));
    }

    #[test]
    fn test_find_in_composed_order() {
        let doc = doc();
        let root = doc.root();
        let dialog = add(&doc, root, "md-dialog", &[]);
        let shadow = doc.attach_shadow(dialog, false).unwrap();
        let close = add(&doc, shadow, "button", &[]);
        let slot = add(&doc, shadow, "slot", &[]);
        let footer = add(&doc, shadow, "button", &[]);
        let _ = slot;

        let field = add(&doc, dialog, "input", &[]);
        let hidden_group = add(&doc, dialog, "div", &[("aria-hidden", "true")]);
        let _skipped = add(&doc, hidden_group, "button", &[]);
        let chip = add(&doc, dialog, "md-chip", &[]);
        let chip_shadow = doc.attach_shadow(chip, true).unwrap();
        let _chip_inner = add(&doc, chip_shadow, "button", &[]);

        assert_eq!(find_interactive_elements(&doc, dialog), vec![close, field, chip, footer]);
    }

    #[test]
    fn test_find_under_disabled_root_is_empty() {
        let doc = doc();
        let group = add(&doc, doc.root(), "div", &[("disabled", "")]);
        add(&doc, group, "button", &[]);
        assert!(find_interactive_elements(&doc, group).is_empty());
    }
}

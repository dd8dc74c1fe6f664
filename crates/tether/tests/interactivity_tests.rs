//! Tests for focusability and the focus trap.

use tether::capability::{Disableable, ElementHandle, Focusable};
use tether::dom::{Document, ElementId, FocusOrigin, Key, KeyData, KeyboardModifiers};
use tether::interactivity::{FocusTrap, find_interactive_elements, is_focusable};
use tether_core::Size;

fn add(doc: &Document, parent: ElementId, tag: &str, attrs: &[(&str, &str)]) -> ElementId {
    let el = doc.create_element(tag);
    for (name, value) in attrs {
        doc.set_attribute(el, name, value).unwrap();
    }
    doc.append_child(parent, el).unwrap();
    el
}

#[test]
fn test_disabled_button_is_never_focusable() {
    let doc = Document::new(Size::new(800.0, 600.0));
    let button = add(&doc, doc.root(), "button", &[("disabled", "")]);
    assert!(!is_focusable(&doc, button, None));
    assert!(!is_focusable(&doc, button, Some(&[])));
    assert!(!doc.focus(button, FocusOrigin::Keyboard));
}

#[test]
fn test_negative_tabindex_custom_element_is_never_focusable() {
    let doc = Document::new(Size::new(800.0, 600.0));
    let chip = add(&doc, doc.root(), "md-filter-chip", &[("tabindex", "-1")]);
    let shadow = doc.attach_shadow(chip, true).unwrap();
    add(&doc, shadow, "button", &[]);
    assert!(!is_focusable(&doc, chip, None));
    assert!(!find_interactive_elements(&doc, doc.root()).contains(&chip));
}

#[test]
fn test_explicit_ancestors_are_honoured() {
    let doc = Document::new(Size::new(800.0, 600.0));
    let panel = add(&doc, doc.root(), "div", &[]);
    let button = add(&doc, panel, "button", &[]);
    let hidden = add(&doc, doc.root(), "div", &[("aria-hidden", "true")]);

    assert!(is_focusable(&doc, button, Some(&[panel])));
    assert!(!is_focusable(&doc, button, Some(&[hidden])));
}

#[test]
fn test_composed_walk_visits_slotted_content_in_render_order() {
    let doc = Document::new(Size::new(800.0, 600.0));
    let dialog = add(&doc, doc.root(), "md-dialog", &[]);
    let shadow = doc.attach_shadow(dialog, false).unwrap();
    let close = add(&doc, shadow, "button", &[]);
    let _slot = add(&doc, shadow, "slot", &[]);
    let confirm = add(&doc, shadow, "button", &[]);

    let field = add(&doc, dialog, "input", &[]);
    let skipped = add(&doc, dialog, "input", &[("disabled", "")]);
    let checkbox = add(&doc, dialog, "md-checkbox", &[]);
    doc.attach_shadow(checkbox, true).unwrap();

    let found = find_interactive_elements(&doc, dialog);
    assert_eq!(found, vec![close, field, checkbox, confirm]);
    assert!(!found.contains(&skipped));
}

#[test]
fn test_focus_trap_wraps_tab_and_shift_tab() {
    let doc = Document::new(Size::new(800.0, 600.0));
    let _outside = add(&doc, doc.root(), "button", &[]);
    let dialog = add(&doc, doc.root(), "div", &[]);
    let first = add(&doc, dialog, "button", &[]);
    let second = add(&doc, dialog, "a", &[("href", "#more")]);

    let trap = FocusTrap::new(&doc, dialog);
    assert!(trap.focus_last(&doc));
    assert_eq!(doc.active_element(), Some(second));

    let tab = KeyData::new(Key::Tab);
    assert!(!doc.key_down(tab));
    assert_eq!(doc.active_element(), Some(first));

    let shift_tab = KeyData::new(Key::Tab).with_modifiers(KeyboardModifiers::SHIFT);
    assert!(!doc.key_down(shift_tab));
    assert_eq!(doc.active_element(), Some(second));

    drop(trap);
    assert!(doc.key_down(tab));
}

#[test]
fn test_element_handle_capabilities() {
    let doc = Document::new(Size::new(800.0, 600.0));
    let switch = add(&doc, doc.root(), "md-switch", &[]);
    let shadow = doc.attach_shadow(switch, true).unwrap();
    let input = add(&doc, shadow, "input", &[("type", "checkbox")]);

    let handle = ElementHandle::new(&doc, switch);
    assert!(handle.is_focusable());
    assert!(handle.focus(FocusOrigin::Pointer));
    assert_eq!(doc.active_element(), Some(input));
    assert!(handle.has_focus());

    handle.set_disabled(true).unwrap();
    assert!(handle.is_disabled());
    assert!(!handle.is_focusable());
}

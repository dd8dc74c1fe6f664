//! Tests for roving focus and grouped selection.

use std::sync::Arc;

use parking_lot::Mutex;
use tether::dom::{Document, ElementId, FocusOrigin, Key, KeyData};
use tether::roving::{Orientation, RovingConfig, RovingFocusManager, SelectionManager, SelectionMode};
use tether_core::Size;

struct TabBar {
    doc: Document,
    bar: ElementId,
    tabs: Vec<ElementId>,
}

fn tab_bar(count: usize) -> TabBar {
    let doc = Document::new(Size::new(800.0, 600.0));
    let bar = doc.create_element("md-tabs");
    doc.append_child(doc.root(), bar).unwrap();
    let tabs = (0..count)
        .map(|_| {
            let tab = doc.create_element("md-primary-tab");
            doc.append_child(bar, tab).unwrap();
            doc.attach_shadow(tab, true).unwrap();
            let inner = doc.create_element("button");
            let shadow = doc.shadow_root(tab).unwrap();
            doc.append_child(shadow, inner).unwrap();
            tab
        })
        .collect();
    TabBar { doc, bar, tabs }
}

#[test]
fn test_removing_the_active_item_leaves_nothing_active() {
    let TabBar { doc, tabs, .. } = tab_bar(4);
    let roving = RovingFocusManager::new(&doc, RovingConfig::default());
    roving.set_items(tabs.clone());
    roving.update_active_item(Some(tabs[1]));

    let diff = roving.set_items(vec![tabs[0], tabs[2], tabs[3]]);
    assert_eq!(diff.removed, vec![tabs[1]]);
    assert_eq!(roving.active_item(), None);
    assert_eq!(roving.first_enabled_item(), Some(tabs[0]));
}

#[test]
fn test_wrap_on_vertical_axis() {
    for (wrap, expected) in [(true, 0), (false, 2)] {
        let TabBar { doc, bar, tabs } = tab_bar(3);
        let roving = Arc::new(RovingFocusManager::new(&doc, RovingConfig::default().with_wrap(wrap)));
        roving.set_items(tabs.clone());
        let _binding = roving.bind(bar).unwrap();

        doc.focus(tabs[2], FocusOrigin::Pointer);
        assert_eq!(roving.active_item(), Some(tabs[2]));
        let handled = !doc.key_down(KeyData::new(Key::ArrowDown));
        assert!(handled);
        assert_eq!(roving.active_item(), Some(tabs[expected]), "wrap: {wrap}");
    }
}

#[test]
fn test_keyboard_navigation_focuses_inside_delegating_items() {
    let TabBar { doc, bar, tabs } = tab_bar(3);
    let config = RovingConfig::default().with_orientation(Orientation::Horizontal);
    let roving = Arc::new(RovingFocusManager::new(&doc, config));
    roving.set_items(tabs.clone());
    let _binding = roving.bind(bar).unwrap();

    doc.focus(tabs[0], FocusOrigin::Keyboard);
    doc.key_down(KeyData::new(Key::ArrowRight));
    assert_eq!(roving.active_item(), Some(tabs[1]));
    assert!(doc.has_focus_within(tabs[1]));
    assert_eq!(doc.attribute(tabs[1], "tabindex").as_deref(), Some("0"));
    assert_eq!(doc.attribute(tabs[0], "tabindex").as_deref(), Some("-1"));

    doc.key_down(KeyData::new(Key::End));
    assert!(doc.has_focus_within(tabs[2]));
    doc.key_down(KeyData::new(Key::Home));
    assert!(doc.has_focus_within(tabs[0]));
}

#[test]
fn test_never_lands_on_disabled_items() {
    let TabBar { doc, tabs, .. } = tab_bar(5);
    doc.set_attribute(tabs[1], "disabled", "").unwrap();
    doc.set_attribute(tabs[2], "aria-disabled", "true").unwrap();
    doc.set_attribute(tabs[4], "disabled", "").unwrap();
    let roving = RovingFocusManager::new(&doc, RovingConfig::default().with_wrap(true));
    roving.set_items(tabs.clone());
    roving.update_active_item(Some(tabs[0]));

    let visited = Arc::new(Mutex::new(Vec::new()));
    let sink = visited.clone();
    roving.active_changed().connect(move |active| sink.lock().extend(*active));

    for _ in 0..4 {
        let target = doc.active_element().unwrap_or(tabs[0]);
        let event = tether::dom::Event::key(tether::dom::EventType::KeyDown, target, KeyData::new(Key::ArrowDown));
        roving.on_key_down(&event);
    }
    assert_eq!(*visited.lock(), vec![tabs[3], tabs[0], tabs[3], tabs[0]]);
}

#[test]
fn test_tabs_select_on_activation_and_follow_focus() {
    let TabBar { doc, bar, tabs } = tab_bar(3);
    let roving = Arc::new(RovingFocusManager::new(
        &doc,
        RovingConfig::default().with_orientation(Orientation::Horizontal),
    ));
    let selection = Arc::new(SelectionManager::new(SelectionMode::Manual));
    for &tab in &tabs {
        selection.add("tabs", tab);
    }
    roving.set_items(tabs.clone());
    let _binding = roving.bind(bar).unwrap();
    let sink = selection.clone();
    roving.active_changed().connect(move |&active| sink.on_active_changed(active));

    selection.select(tabs[0]);
    doc.focus(tabs[0], FocusOrigin::Keyboard);
    doc.key_down(KeyData::new(Key::ArrowRight));
    // Arrowing previews without committing.
    assert_eq!(selection.selected("tabs"), Some(tabs[0]));

    selection.set_mode(SelectionMode::FollowsFocus);
    doc.key_down(KeyData::new(Key::ArrowRight));
    assert_eq!(selection.selected("tabs"), Some(tabs[2]));
    assert!(!selection.is_selected(tabs[0]));

    // The selected tab goes away.
    let diff = roving.set_items(vec![tabs[0], tabs[1]]);
    for item in diff.removed {
        selection.remove(item);
    }
    assert_eq!(selection.selected("tabs"), None);
}

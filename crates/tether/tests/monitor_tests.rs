//! Tests for the interaction monitors and their shared lifecycle.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tether::controller::{
    FocusMonitor, HoverConfig, HoverMonitor, MutationMonitor, PressConfig, PressMonitor, PressSource,
    ResizeMonitor, ScrollMonitor,
};
use tether::dom::{
    Document, ElementId, Event, EventType, FocusOrigin, Key, KeyData, MouseButton, MutationOptions,
    PointerData,
};
use tether_core::{Point, Rect, Size};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("tether=trace")
        .with_test_writer()
        .try_init();
}

/// A host component with one child target.
fn host_and_target(doc: &Document) -> (ElementId, ElementId) {
    let host = doc.create_element("md-ripple");
    let target = doc.create_element("button");
    doc.append_child(doc.root(), host).unwrap();
    doc.append_child(host, target).unwrap();
    doc.set_rect(target, Rect::new(40.0, 40.0, 120.0, 48.0)).unwrap();
    (host, target)
}

fn pointer(doc: &Document, target: ElementId, ty: EventType, data: PointerData) {
    doc.dispatch_event(&Event::pointer(ty, target, data));
}

#[test]
fn test_hover_leave_before_start_delay_never_reports() {
    init_tracing();
    let doc = Document::new(Size::new(400.0, 400.0));
    let (host, target) = host_and_target(&doc);
    let monitor = HoverMonitor::new(&doc, host, HoverConfig::default().with_start_delay(Duration::from_millis(400)));
    monitor.observe(target);
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    monitor.changed().connect(move |c| sink.lock().push(c.active));

    pointer(&doc, target, EventType::PointerEnter, PointerData::mouse(Point::new(50.0, 50.0)));
    doc.advance_time(Duration::from_millis(399));
    pointer(&doc, target, EventType::PointerLeave, PointerData::mouse(Point::new(0.0, 0.0)));
    doc.advance_time(Duration::from_secs(2));
    assert!(log.lock().is_empty());

    pointer(&doc, target, EventType::PointerEnter, PointerData::mouse(Point::new(50.0, 50.0)));
    doc.advance_time(Duration::from_millis(400));
    assert_eq!(*log.lock(), vec![true]);
}

#[test]
fn test_press_space_reports_center_and_secondary_button_is_ignored() {
    init_tracing();
    let doc = Document::new(Size::new(400.0, 400.0));
    let (host, target) = host_and_target(&doc);
    let monitor = PressMonitor::new(&doc, host, PressConfig::default());
    monitor.observe(target);
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    monitor.changed().connect(move |c| sink.lock().push(*c));

    pointer(
        &doc,
        target,
        EventType::PointerDown,
        PointerData::mouse(Point::new(60.0, 60.0)).with_button(MouseButton::Right),
    );
    assert!(log.lock().is_empty());

    assert!(doc.focus(target, FocusOrigin::Keyboard));
    doc.key_down(KeyData::new(Key::Space));
    {
        let log = log.lock();
        assert_eq!(log.len(), 1);
        assert!(log[0].pressed);
        assert_eq!(log[0].source, PressSource::Keyboard);
        assert_eq!(log[0].point, Point::new(100.0, 64.0));
    }
    doc.key_up(KeyData::new(Key::Space));
    assert!(!monitor.is_pressed(target));
}

#[test]
fn test_host_disconnect_unobserves_every_monitor() {
    let doc = Document::new(Size::new(400.0, 400.0));
    let (host, target) = host_and_target(&doc);

    let hover = HoverMonitor::new(&doc, host, HoverConfig::default());
    let focus = FocusMonitor::new(&doc, host);
    let press = PressMonitor::new(&doc, host, PressConfig::default());
    let scroll = ScrollMonitor::new(&doc, host);
    let resize = ResizeMonitor::new(&doc, host, false);
    let mutation = MutationMonitor::new(&doc, host, MutationOptions::attributes(), false);
    assert!(hover.observe(target));
    assert!(focus.observe(target));
    assert!(press.observe(target));
    assert!(scroll.observe(target));
    assert!(resize.observe(target));
    assert!(mutation.observe(target));
    assert!(doc.listener_count(target) > 0);

    doc.remove(host).unwrap();

    assert!(hover.controller().targets().is_empty());
    assert!(focus.controller().targets().is_empty());
    assert!(press.controller().targets().is_empty());
    assert!(scroll.controller().targets().is_empty());
    assert!(resize.controller().targets().is_empty());
    assert!(mutation.controller().targets().is_empty());
    assert_eq!(doc.listener_count(target), 0);
}

#[test]
fn test_observing_twice_keeps_one_listener_set() {
    let doc = Document::new(Size::new(400.0, 400.0));
    let (host, target) = host_and_target(&doc);
    let monitor = FocusMonitor::new(&doc, host);

    assert!(monitor.observe(target));
    let listeners = doc.listener_count(target);
    assert!(!monitor.observe(target));
    assert_eq!(doc.listener_count(target), listeners);

    assert!(monitor.unobserve(target));
    assert!(!monitor.unobserve(target));
    assert_eq!(doc.listener_count(target), 0);
}

#[test]
fn test_dropping_a_monitor_releases_listeners() {
    let doc = Document::new(Size::new(400.0, 400.0));
    let (host, target) = host_and_target(&doc);
    {
        let monitor = PressMonitor::new(&doc, host, PressConfig::default());
        monitor.observe(target);
        assert!(doc.listener_count(target) > 0);
    }
    assert_eq!(doc.listener_count(target), 0);
}

#[test]
fn test_one_target_many_monitors_in_a_shadow_tree() {
    let doc = Document::new(Size::new(400.0, 400.0));
    let field = doc.create_element("md-filled-text-field");
    doc.append_child(doc.root(), field).unwrap();
    let shadow = doc.attach_shadow(field, true).unwrap();
    let input = doc.create_element("input");
    doc.append_child(shadow, input).unwrap();

    let focus = FocusMonitor::new(&doc, field);
    let hover = HoverMonitor::new(&doc, field, HoverConfig::default());
    focus.observe(field);
    hover.observe(field);

    // Focus delegates into the shadow tree; focus-within holds on the host.
    assert!(doc.focus(field, FocusOrigin::Keyboard));
    assert_eq!(doc.active_element(), Some(input));
    assert!(focus.is_focused(field));
    assert!(focus.is_focus_visible(field));

    pointer(&doc, field, EventType::PointerEnter, PointerData::mouse(Point::ZERO));
    assert!(hover.is_hovered(field));
}

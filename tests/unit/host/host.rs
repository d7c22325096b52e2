use super::*;

fn container() -> Host {
    Host::new(HostSpec::Container {
        element: ElementHandle {
            id: 1,
            rect: Rect::new(100.0, 50.0, 500.0, 350.0),
        },
    })
}

fn kinds(events: &[HostEvent]) -> Vec<EventKind> {
    events.iter().map(|e| e.kind).collect()
}

#[test]
fn window_host_passes_points_through() {
    let mut host = Host::new(HostSpec::Window {
        viewport: Size::new(800.0, 600.0),
    });
    assert_eq!(host.positioning(), Positioning::Fixed);
    let ev = host.translate(RawInput::Move(Point::new(900.0, 10.0)), 0.0);
    assert_eq!(kinds(&ev), vec![EventKind::PointerEnter, EventKind::PointerMove]);
    assert_eq!(ev[1].local, Some(Point::new(900.0, 10.0)));
}

#[test]
fn container_host_translates_to_local_space() {
    let mut host = container();
    assert_eq!(host.positioning(), Positioning::Absolute);
    assert_eq!(host.size(), Size::new(400.0, 300.0));
    let ev = host.translate(RawInput::Down(Point::new(150.0, 80.0)), 5.0);
    assert_eq!(ev.len(), 1);
    assert_eq!(ev[0].local, Some(Point::new(50.0, 30.0)));
    assert_eq!(ev[0].at_ms, 5.0);
}

#[test]
fn container_host_drops_outside_pointer_input() {
    let mut host = container();
    assert!(host.translate(RawInput::Down(Point::new(10.0, 10.0)), 0.0).is_empty());
    assert!(host.translate(RawInput::Move(Point::new(10.0, 10.0)), 0.0).is_empty());
}

#[test]
fn container_host_synthesizes_enter_and_leave() {
    let mut host = container();
    let ev = host.translate(RawInput::Move(Point::new(200.0, 100.0)), 0.0);
    assert_eq!(kinds(&ev), vec![EventKind::PointerEnter, EventKind::PointerMove]);
    let ev = host.translate(RawInput::Move(Point::new(210.0, 100.0)), 1.0);
    assert_eq!(kinds(&ev), vec![EventKind::PointerMove]);
    let ev = host.translate(RawInput::Move(Point::new(5.0, 5.0)), 2.0);
    assert_eq!(kinds(&ev), vec![EventKind::PointerLeave]);
    assert!(!host.pointer_inside());
    assert!(host.translate(RawInput::Leave, 3.0).is_empty());
}

#[test]
fn container_resize_only_fires_on_change() {
    let mut host = container();
    let same = Rect::new(100.0, 50.0, 500.0, 350.0);
    assert!(host.translate(RawInput::ContainerResize(same), 0.0).is_empty());
    let ev = host.translate(
        RawInput::ContainerResize(Rect::new(0.0, 0.0, 200.0, 100.0)),
        0.0,
    );
    assert_eq!(kinds(&ev), vec![EventKind::ContainerResize]);
    assert_eq!(host.size(), Size::new(200.0, 100.0));
    assert_eq!(
        host.resize_kinds(),
        &[EventKind::WindowResize, EventKind::ContainerResize]
    );
}

#[test]
fn zero_area_container_accepts_no_points() {
    let mut host = Host::new(HostSpec::Container {
        element: ElementHandle {
            id: 2,
            rect: Rect::new(10.0, 10.0, 10.0, 10.0),
        },
    });
    assert!(host.translate(RawInput::Down(Point::new(10.0, 10.0)), 0.0).is_empty());
}

#[test]
fn listener_registry_orders_and_counts() {
    let mut host = container();
    let a = host.subscribe(EffectKind::Trail, EventKind::PointerMove);
    let _b = host.subscribe(EffectKind::Particles, EventKind::PointerMove);
    let _c = host.subscribe(EffectKind::Trail, EventKind::PointerLeave);
    assert_eq!(
        host.listeners().targets(EventKind::PointerMove),
        vec![EffectKind::Trail, EffectKind::Particles]
    );
    assert!(host.unsubscribe(a));
    assert!(!host.unsubscribe(a));
    assert_eq!(host.listeners().active(EffectKind::Trail), 1);
    let c = host.listeners().counters(EffectKind::Trail);
    assert_eq!((c.added, c.removed), (2, 1));
}

#[test]
fn cursor_style_is_scoped_per_owner() {
    let mut host = container();
    assert_eq!(host.cursor_style(), CursorStyle::Auto);
    host.suppress_cursor(EffectKind::Cursor);
    assert_eq!(host.cursor_style(), CursorStyle::None);
    host.restore_cursor(EffectKind::Cursor);
    assert_eq!(host.cursor_style(), CursorStyle::Auto);
}

use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::config::device::DeviceProfile;
use crate::host::ElementHandle;
use crate::render::cpu::CpuBackend;
use crate::render::display::LayerKind;

fn options() -> RendererOptions {
    RendererOptions {
        seed: Some(11),
        ..RendererOptions::default()
    }
}

fn window() -> HostSpec {
    HostSpec::Window {
        viewport: Size::new(800.0, 600.0),
    }
}

fn container(rect: Rect) -> HostSpec {
    HostSpec::Container {
        element: ElementHandle { id: 3, rect },
    }
}

fn everything_on() -> ConfigModel {
    let mut c = ConfigModel::default();
    c.particles.enabled = true;
    c.trail.enabled = true;
    c.click.enabled = true;
    c.cursor.kind = CursorKind::Custom;
    c
}

#[test]
fn default_config_mounts_only_the_card() {
    let r = create_effect_renderer(ConfigModel::default(), window(), options());
    let mounted: Vec<_> = EffectKind::ALL
        .into_iter()
        .filter(|&k| r.is_mounted(k))
        .collect();
    assert_eq!(mounted, vec![EffectKind::Card]);
    assert_eq!(r.cursor_style(), CursorStyle::Auto);
}

#[test]
fn toggling_an_effect_never_accumulates_registrations() {
    let mut r = create_effect_renderer(ConfigModel::default(), window(), options());
    let mut on = ConfigModel::default();
    on.particles.enabled = true;
    on.trail.enabled = true;
    let off = ConfigModel::default();

    for _ in 0..5 {
        r.update(on.clone());
        r.tick();
        assert_eq!(r.resource_stats().get(EffectKind::Trail).active_listeners, 2);
        assert_eq!(r.resource_stats().get(EffectKind::Trail).active_timers, 1);
        r.update(off.clone());
    }

    let stats = r.resource_stats();
    assert!(stats.is_balanced(), "{stats:?}");
    for kind in [EffectKind::Particles, EffectKind::Trail] {
        let s = stats.get(kind);
        assert_eq!((s.mounts, s.unmounts), (5, 5));
        assert!(s.is_released(), "{kind:?}: {s:?}");
    }
}

#[test]
fn dispose_is_idempotent_and_final() {
    let mut r = create_effect_renderer(everything_on(), window(), options());
    assert_eq!(r.cursor_style(), CursorStyle::None);
    r.dispose();
    r.dispose();
    assert!(r.is_disposed());
    assert_eq!(r.cursor_style(), CursorStyle::Auto);
    assert!(r.resource_stats().is_fully_released());

    r.update(everything_on());
    r.pointer_down(10.0, 10.0);
    r.advance(100.0);
    assert!(EffectKind::ALL.into_iter().all(|k| !r.is_mounted(k)));
    assert_eq!(r.now_ms(), 0.0);
}

#[test]
fn hidden_cursor_suppresses_native_pointer_and_trail() {
    let mut c = everything_on();
    c.cursor.kind = CursorKind::Hidden;
    let mut r = create_effect_renderer(c, window(), options());
    assert!(!r.is_mounted(EffectKind::Trail));
    assert!(r.is_mounted(EffectKind::Cursor));
    assert_eq!(r.cursor_style(), CursorStyle::None);

    r.pointer_move(100.0, 100.0);
    r.tick();
    assert_eq!(r.cursor_position(), None);

    r.update(everything_on());
    assert!(r.is_mounted(EffectKind::Trail));
    let cursor = r.resource_stats().get(EffectKind::Cursor);
    assert_eq!((cursor.mounts, cursor.unmounts), (2, 1), "kind change remounts");
}

#[test]
fn clicks_expire_through_advance() {
    let mut c = ConfigModel::default();
    c.click.enabled = true;
    let mut r = create_effect_renderer(c, window(), options());
    r.pointer_down(100.0, 100.0);
    r.advance(300.0);
    r.pointer_down(120.0, 100.0);
    assert_eq!(r.click_tokens().len(), 2);

    r.advance(301.0);
    let ids: Vec<u64> = r.click_tokens().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1]);
    r.advance(300.0);
    assert!(r.click_tokens().is_empty());
    assert_eq!(r.resource_stats().get(EffectKind::Click).active_timers, 0);
}

#[test]
fn container_host_ignores_input_outside_its_rect() {
    let mut c = everything_on();
    c.particles.enabled = false;
    let mut r = create_effect_renderer(c.clone(), container(Rect::new(100.0, 100.0, 500.0, 400.0)), options());
    r.pointer_down(50.0, 50.0);
    r.pointer_move(50.0, 50.0);
    r.tick();
    assert!(r.click_tokens().is_empty());
    assert!(r.trail_points().is_empty());

    r.pointer_down(150.0, 160.0);
    r.pointer_move(150.0, 160.0);
    r.tick();
    assert_eq!(r.click_tokens()[0].origin, Point::new(50.0, 60.0));
    assert_eq!(r.trail_points()[0].position, Point::new(50.0, 60.0));
    assert_eq!(r.cursor_position(), Some(Point::new(50.0, 60.0)));
    assert_eq!(r.positioning(), Positioning::Absolute);

    let mut w = create_effect_renderer(c, window(), options());
    w.pointer_down(50.0, 50.0);
    assert_eq!(w.click_tokens().len(), 1);
    assert_eq!(w.positioning(), Positioning::Fixed);
}

#[test]
fn drag_release_writes_back_and_notifies_once() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut r = create_effect_renderer(
        ConfigModel::default(),
        window(),
        RendererOptions {
            editable: true,
            ..options()
        },
    );
    let sink = Rc::clone(&seen);
    r.set_on_position_change(move |p| sink.borrow_mut().push(p));

    r.pointer_down(400.0, 300.0);
    assert!(r.card_state().dragging);
    r.pointer_move(600.0, 300.0);
    assert!(seen.borrow().is_empty());
    assert_eq!(r.config().card.position, CardPosition::CENTER);

    r.pointer_up(600.0, 300.0);
    assert_eq!(*seen.borrow(), vec![CardPosition::new(75.0, 50.0)]);
    assert_eq!(r.config().card.position, CardPosition::new(75.0, 50.0));
    assert_eq!(r.card_state().rect.center(), Point::new(600.0, 300.0));

    r.pointer_up(600.0, 300.0);
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn card_state_without_the_transform_uses_the_config() {
    let mut c = ConfigModel::default();
    c.card.tilt_enabled = false;
    c.card.position = CardPosition::new(25.0, 50.0);
    let r = create_effect_renderer(c, window(), options());
    assert!(!r.is_mounted(EffectKind::Card));
    let card = r.card_state();
    assert_eq!(card.rect.center(), Point::new(200.0, 300.0));
    assert_eq!(card.tilt, Tilt::FLAT);
}

#[test]
fn low_end_devices_cap_particles_and_skip_frames() {
    let mut c = ConfigModel::default();
    c.particles.enabled = true;
    c.particles.count = 200;
    let mut r = create_effect_renderer(
        c,
        window(),
        RendererOptions {
            device: DeviceProfile {
                hardware_concurrency: Some(2),
                device_memory_gb: None,
                pixel_ratio: Some(3.0),
            },
            ..options()
        },
    );
    assert_eq!(r.particles().len(), 50);
    assert_eq!(r.pixel_ratio(), 1.0);

    let before = r.particles().to_vec();
    r.tick();
    assert_eq!(r.particles(), &before[..], "odd frames are skipped");
    r.tick();
    assert_ne!(r.particles(), &before[..]);
}

#[test]
fn seeded_renderers_are_reproducible() {
    let mut c = ConfigModel::default();
    c.particles.enabled = true;
    let mut a = create_effect_renderer(c.clone(), window(), options());
    let mut b = create_effect_renderer(c, window(), options());
    a.run_frames(30);
    b.run_frames(30);
    assert_eq!(a.particles(), b.particles());
}

#[test]
fn display_list_carries_one_layer_per_visible_effect() {
    let mut r = create_effect_renderer(everything_on(), window(), options());
    r.pointer_move(200.0, 200.0);
    r.pointer_down(200.0, 200.0);
    r.tick();

    let list = r.display_list();
    for kind in [
        EffectKind::Particles,
        EffectKind::Trail,
        EffectKind::Click,
        EffectKind::Cursor,
    ] {
        assert!(list.layer(LayerKind::Effect(kind)).is_some(), "{kind:?}");
    }
    assert!(
        list.layer(LayerKind::Effect(EffectKind::Card)).is_none(),
        "card outline only while dragging"
    );
}

#[test]
fn renders_trail_dots_through_the_cpu_backend() {
    let mut c = ConfigModel::default();
    c.trail.enabled = true;
    c.card.tilt_enabled = false;
    let mut r = create_effect_renderer(c, window(), options());
    r.pointer_move(200.0, 200.0);
    r.tick();

    let mut backend = CpuBackend::default();
    let frame = r.render(&mut backend).expect("render");
    assert_eq!((frame.width, frame.height), (800, 600));
    assert!(frame.pixel(200, 200).is_some_and(|p| p[3] > 200));
    assert_eq!(frame.pixel(400, 400), Some([0, 0, 0, 0]));
}

#[test]
fn zero_area_container_idles_and_renders_empty() {
    let mut c = ConfigModel::default();
    c.particles.enabled = true;
    let mut r = create_effect_renderer(c, container(Rect::ZERO), options());
    r.run_frames(3);
    assert!(r.particles().is_empty());
    let frame = r.render(&mut CpuBackend::default()).expect("render");
    assert!(frame.is_empty());

    r.resize_container(Rect::new(0.0, 0.0, 300.0, 200.0));
    assert_eq!(r.particles().len(), 50);
    assert_eq!(r.host_size(), Size::new(300.0, 200.0));
}

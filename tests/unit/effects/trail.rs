use super::*;
use crate::effects::harness::Harness;
use crate::foundation::core::Rect;
use crate::host::RawInput;
use crate::render::display::DrawOp;
use crate::runtime::scheduler::FRAME_INTERVAL_MS;

fn params(length: u32) -> TrailParams {
    TrailParams {
        enabled: true,
        length,
        ..ConfigModel::default().trail
    }
}

fn move_and_frame(h: &mut Harness, trail: &mut PointerTrail, x: f64, y: f64) {
    h.input(trail, RawInput::Move(Point::new(x, y)));
    h.advance(trail, FRAME_INTERVAL_MS);
}

#[test]
fn trail_never_exceeds_its_length() {
    let mut h = Harness::window(800.0, 600.0);
    let mut trail = PointerTrail::new(params(5));
    h.mount(&mut trail);
    for i in 0..40 {
        move_and_frame(&mut h, &mut trail, 10.0 + f64::from(i), 20.0);
        assert!(trail.len() <= 5);
    }
    assert_eq!(trail.len(), 5);
    let xs: Vec<f64> = trail.points().map(|p| p.position.x).collect();
    assert_eq!(xs, vec![45.0, 46.0, 47.0, 48.0, 49.0]);
}

#[test]
fn moves_coalesce_to_one_point_per_frame() {
    let mut h = Harness::window(800.0, 600.0);
    let mut trail = PointerTrail::new(params(20));
    h.mount(&mut trail);
    for i in 0..10 {
        h.input(&mut trail, RawInput::Move(Point::new(f64::from(i), 0.0)));
    }
    h.advance(&mut trail, FRAME_INTERVAL_MS);
    assert_eq!(trail.len(), 1);
    assert_eq!(trail.points().next().map(|p| p.position.x), Some(9.0));
}

#[test]
fn idle_trail_melts_away() {
    let mut h = Harness::window(800.0, 600.0);
    let mut trail = PointerTrail::new(params(20));
    h.mount(&mut trail);
    for i in 0..20 {
        move_and_frame(&mut h, &mut trail, f64::from(i) * 5.0, 100.0);
    }
    assert_eq!(trail.len(), 20);

    // Past the idle threshold.
    h.advance(&mut trail, IDLE_THRESHOLD_MS + DECAY_INTERVAL_MS);
    let mut last = trail.len();
    assert!(last < 20);
    while last > 0 {
        h.advance(&mut trail, DECAY_INTERVAL_MS);
        assert!(trail.len() < last, "decay stalled at {last}");
        last = trail.len();
    }
    assert!(h.paint(&trail).is_none());
}

#[test]
fn container_host_ignores_moves_outside_its_bounds() {
    let mut h = Harness::container(Rect::new(100.0, 100.0, 300.0, 300.0));
    let mut trail = PointerTrail::new(params(20));
    h.mount(&mut trail);
    move_and_frame(&mut h, &mut trail, 50.0, 50.0);
    assert!(trail.is_empty());

    move_and_frame(&mut h, &mut trail, 150.0, 120.0);
    assert_eq!(
        trail.points().next().map(|p| p.position),
        Some(Point::new(50.0, 20.0))
    );

    let mut window = Harness::window(800.0, 600.0);
    let mut other = PointerTrail::new(params(20));
    window.mount(&mut other);
    move_and_frame(&mut window, &mut other, 50.0, 50.0);
    assert_eq!(other.len(), 1);
}

#[test]
fn leaving_the_host_clears_the_trail() {
    let mut h = Harness::container(Rect::new(0.0, 0.0, 200.0, 200.0));
    let mut trail = PointerTrail::new(params(20));
    h.mount(&mut trail);
    for i in 0..5 {
        move_and_frame(&mut h, &mut trail, 10.0 * f64::from(i), 10.0);
    }
    assert_eq!(trail.len(), 5);
    h.input(&mut trail, RawInput::Leave);
    assert!(trail.is_empty());
}

#[test]
fn zero_length_draws_nothing() {
    let mut h = Harness::window(800.0, 600.0);
    let mut trail = PointerTrail::new(params(0));
    h.mount(&mut trail);
    move_and_frame(&mut h, &mut trail, 10.0, 10.0);
    assert!(trail.is_empty());
    assert!(h.paint(&trail).is_none());
}

#[test]
fn rainbow_hue_is_captured_per_point() {
    let mut h = Harness::window(800.0, 600.0);
    let mut trail = PointerTrail::new(TrailParams {
        rainbow: true,
        ..params(10)
    });
    h.mount(&mut trail);
    for i in 0..3 {
        move_and_frame(&mut h, &mut trail, f64::from(i), 0.0);
    }
    let hues: Vec<f64> = trail.points().map(|p| p.hue).collect();
    assert_eq!(hues, vec![0.0, 12.0, 24.0]);
}

#[test]
fn fading_makes_old_points_faint() {
    let mut h = Harness::window(800.0, 600.0);
    let mut trail = PointerTrail::new(TrailParams {
        fade: true,
        ..params(4)
    });
    h.mount(&mut trail);
    for i in 0..4 {
        move_and_frame(&mut h, &mut trail, 20.0 * f64::from(i), 50.0);
    }
    let layer = h.paint(&trail).unwrap();
    let alphas: Vec<f64> = layer
        .ops
        .iter()
        .map(|op| match op {
            DrawOp::FillPath { color, .. } => color.a,
            other => panic!("unexpected op {other:?}"),
        })
        .collect();
    assert_eq!(alphas.len(), 4);
    assert!(alphas.windows(2).all(|w| w[0] < w[1]));
    assert!((alphas[3] - 1.0).abs() < 1e-9);
}

#[test]
fn unmount_cancels_the_decay_interval() {
    let mut h = Harness::window(800.0, 600.0);
    let mut trail = PointerTrail::new(params(10));
    h.mount(&mut trail);
    assert_eq!(h.scheduler.active_timers(EffectKind::Trail), 1);
    h.unmount(&mut trail);
    assert_eq!(h.scheduler.active_timers(EffectKind::Trail), 0);
    assert_eq!(h.host.listeners().active(EffectKind::Trail), 0);
}

use std::sync::Arc;

use super::*;
use crate::assets::store::PreparedImage;
use crate::effects::Fidelity;
use crate::effects::harness::Harness;
use crate::foundation::core::Rect;
use crate::host::RawInput;
use crate::render::display::DrawOp;

fn params(count: u32) -> ParticleParams {
    ParticleParams {
        count,
        ..ConfigModel::default().particles
    }
}

#[test]
fn particles_stay_within_the_wrap_margin() {
    let mut h = Harness::window(320.0, 240.0);
    let mut field = ParticleField::new(ParticleParams {
        wind: 2.0,
        sway: 3.0,
        speed: 3.0,
        ..params(80)
    });
    h.mount(&mut field);
    for _ in 0..1500 {
        h.frames(&mut field, 1);
        for p in field.particles() {
            assert!((-WRAP_MARGIN..=320.0 + WRAP_MARGIN).contains(&p.position.x), "{p:?}");
            assert!((-WRAP_MARGIN..=240.0 + WRAP_MARGIN).contains(&p.position.y), "{p:?}");
        }
    }
}

#[test]
fn falling_particles_wrap_back_to_the_top() {
    let mut h = Harness::window(800.0, 600.0);
    let mut field = ParticleField::new(ParticleParams {
        speed: 1.0,
        wind: 0.0,
        ..params(50)
    });
    h.mount(&mut field);
    assert_eq!(field.particles().len(), 50);

    h.frames(&mut field, 600);
    let wrapped = field.particles().iter().filter(|p| p.wraps > 0).count();
    assert!(wrapped > 25, "only {wrapped} of 50 wrapped");
    for p in field.particles().iter().filter(|p| p.speed >= 1.05) {
        assert!(p.wraps > 0, "fast particle never wrapped: {p:?}");
    }

    // Slowest possible flake (speed 0.5) needs (600 + 10) / 0.5 frames from the top.
    h.frames(&mut field, 640);
    assert!(field.particles().iter().all(|p| p.wraps > 0));
}

#[test]
fn seeded_runs_are_reproducible() {
    let run = || {
        let mut h = Harness::window(200.0, 200.0);
        let mut field = ParticleField::new(params(20));
        h.mount(&mut field);
        h.frames(&mut field, 50);
        field.particles().to_vec()
    };
    assert_eq!(run(), run());
}

#[test]
fn zero_area_host_idles_until_resized() {
    let mut h = Harness::container(Rect::new(10.0, 10.0, 10.0, 10.0));
    let mut field = ParticleField::new(params(40));
    h.mount(&mut field);
    assert!(field.particles().is_empty());
    assert!(!h.scheduler.has_frame_request(EffectKind::Particles));
    assert!(h.paint(&field).is_none());

    h.input(&mut field, RawInput::ContainerResize(Rect::new(10.0, 10.0, 210.0, 110.0)));
    assert_eq!(field.particles().len(), 40);
    assert!(h.scheduler.has_frame_request(EffectKind::Particles));
    assert!(
        field
            .particles()
            .iter()
            .all(|p| p.position.x <= 200.0 && p.position.y <= 100.0)
    );
}

#[test]
fn low_end_devices_cap_count_and_skip_frames() {
    let mut h = Harness::window(400.0, 400.0);
    h.fidelity = Fidelity {
        particle_cap: Some(50),
        frame_skip: 2,
    };
    let mut field = ParticleField::new(params(300));
    h.mount(&mut field);
    assert_eq!(field.particles().len(), 50);

    let before = field.particles().to_vec();
    h.frames(&mut field, 1);
    assert_eq!(field.particles(), &before[..], "odd frames are skipped");
    h.frames(&mut field, 1);
    assert_ne!(field.particles(), &before[..]);
}

#[test]
fn only_count_size_or_speed_reseed() {
    let mut h = Harness::window(300.0, 300.0);
    let mut field = ParticleField::new(params(30));
    h.mount(&mut field);
    h.frames(&mut field, 5);

    let mut config = ConfigModel::default();
    config.particles = ParticleParams {
        color: crate::config::color::Color::BLACK,
        ..params(30)
    };
    let before = field.particles().to_vec();
    assert_eq!(field.reconfigure(&config, &mut h.ctx()), Reconfigure::Applied);
    assert_eq!(field.particles(), &before[..]);

    config.particles.count = 60;
    field.reconfigure(&config, &mut h.ctx());
    assert_eq!(field.particles().len(), 60);
    assert!(field.particles().iter().all(|p| p.wraps == 0));
}

#[test]
fn missing_image_falls_back_to_circles() {
    let mut h = Harness::window(100.0, 100.0);
    let mut field = ParticleField::new(ParticleParams {
        use_image: true,
        image_ref: Some("https://cdn.example/flake.png".to_owned()),
        ..params(10)
    });
    h.mount(&mut field);
    let layer = h.paint(&field).unwrap();
    assert!(layer.ops.iter().all(|op| matches!(op, DrawOp::FillPath { .. })));

    h.assets.insert_prepared(
        "https://cdn.example/flake.png",
        PreparedImage {
            width: 1,
            height: 1,
            rgba8_premul: Arc::new(vec![255; 4]),
        },
    );
    let layer = h.paint(&field).unwrap();
    assert_eq!(layer.ops.len(), 10);
    assert!(layer.ops.iter().all(|op| matches!(op, DrawOp::Image { .. })));
}

#[test]
fn unmount_stops_the_loop_and_releases_listeners() {
    let mut h = Harness::window(100.0, 100.0);
    let mut field = ParticleField::new(params(10));
    h.mount(&mut field);
    h.frames(&mut field, 3);
    h.unmount(&mut field);

    assert!(field.particles().is_empty());
    assert!(!h.scheduler.has_frame_request(EffectKind::Particles));
    assert_eq!(h.host.listeners().active(EffectKind::Particles), 0);
    let c = h.scheduler.counters(EffectKind::Particles);
    assert_eq!(c.frames_requested, c.frames_released);
}

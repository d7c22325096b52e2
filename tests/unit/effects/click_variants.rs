use super::*;
use crate::foundation::core::EffectKind;
use crate::foundation::math::Rng64;
use crate::host::Positioning;
use crate::render::display::LayerKind;

fn layer() -> Layer {
    Layer::new(LayerKind::Effect(EffectKind::Click), 0, Positioning::Fixed)
}

#[test]
fn durations_span_the_documented_range() {
    for kind in ClickEffectKind::ANIMATED {
        let d = duration_ms(kind);
        assert!((400.0..=1500.0).contains(&d), "{kind:?}: {d}");
    }
    assert_eq!(duration_ms(ClickEffectKind::None), 0.0);
    assert!(spawn(ClickEffectKind::None, 40.0, Color::WHITE, &mut Rng64::new(1)).is_empty());
}

#[test]
fn every_variant_draws_then_finishes_within_its_duration() {
    let mut rng = Rng64::new(3);
    for kind in ClickEffectKind::ANIMATED {
        let sprites = spawn(kind, 40.0, Color::WHITE, &mut rng);
        assert!(!sprites.is_empty(), "{kind:?}");
        let d = duration_ms(kind);
        for s in &sprites {
            assert!(s.timing.end_ms() <= d + 1e-9, "{kind:?} outlives its token");
        }

        let mut mid = layer();
        for s in &sprites {
            s.paint(&mut mid, Point::new(100.0, 100.0), d * 0.3);
        }
        assert!(!mid.ops.is_empty(), "{kind:?} draws nothing mid-flight");

        let mut after = layer();
        for s in &sprites {
            s.paint(&mut after, Point::new(100.0, 100.0), d + 1.0);
        }
        assert!(after.ops.is_empty(), "{kind:?} still drawing after {d}ms");
    }
}

#[test]
fn particles_start_on_a_circle_of_half_the_size() {
    let sprites = spawn(ClickEffectKind::Particles, 40.0, Color::WHITE, &mut Rng64::new(1));
    assert_eq!(sprites.len(), 8);
    for s in &sprites {
        assert!((s.offset.from.hypot() - 20.0).abs() < 1e-9);
    }
    // First dot points straight up.
    assert!(sprites[0].offset.from.y < -19.0);
}

#[test]
fn ripple_grows_and_fades() {
    let sprites = spawn(ClickEffectKind::Ripple, 40.0, Color::WHITE, &mut Rng64::new(1));
    let ripple = &sprites[0];
    assert_eq!(ripple.shape, SpriteShape::Ring { width: 2.0 });
    assert!(ripple.scale.at(1.0) > ripple.scale.at(0.0));
    assert!(ripple.opacity.at(1.0) < ripple.opacity.at(0.0));
}

#[test]
fn lightning_bolts_reach_out_from_the_click() {
    let sprites = spawn(ClickEffectKind::Lightning, 50.0, Color::WHITE, &mut Rng64::new(9));
    assert_eq!(sprites.len(), 3);
    for s in &sprites {
        let SpriteShape::Bolt(path) = &s.shape else {
            panic!("expected bolt");
        };
        let end = path.elements().last().and_then(|el| el.end_point()).unwrap();
        assert!((end.to_vec2().hypot() - 60.0).abs() < 1e-6);
    }
}

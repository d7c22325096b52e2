use kurbo::Circle;

use super::*;

#[test]
fn transparent_and_zero_width_ops_are_skipped() {
    let mut layer = Layer::new(LayerKind::Card, 0, Positioning::Fixed);
    let c = Circle::new((0.0, 0.0), 4.0);
    layer.fill(&c, Affine::IDENTITY, Color::WHITE.with_alpha(0.0));
    layer.stroke(&c, Affine::IDENTITY, 0.0, Color::WHITE);
    assert!(layer.is_empty());
    layer.fill(&c, Affine::IDENTITY, Color::WHITE);
    assert_eq!(layer.ops.len(), 1);
}

#[test]
fn empty_layers_are_not_pushed() {
    let mut list = DisplayList::new(Size::new(10.0, 10.0));
    list.push(Layer::new(LayerKind::Gate, 5, Positioning::Fixed));
    assert!(list.layers.is_empty());
    list.push(Layer::new(LayerKind::Gate, 5, Positioning::Fixed).with_backdrop_blur(8.0, None));
    assert_eq!(list.layers.len(), 1);
}

#[test]
fn sorting_is_stable_by_z() {
    let mut list = DisplayList::new(Size::new(10.0, 10.0));
    let square = Rect::new(0.0, 0.0, 1.0, 1.0);
    for (kind, z) in [
        (LayerKind::Effect(EffectKind::Cursor), 40),
        (LayerKind::Background, 0),
        (LayerKind::Effect(EffectKind::Trail), 20),
        (LayerKind::Effect(EffectKind::Click), 20),
    ] {
        let mut l = Layer::new(kind, z, Positioning::Fixed);
        l.fill(&square, Affine::IDENTITY, Color::WHITE);
        list.push(l);
    }
    let order: Vec<LayerKind> = list.sorted_layers().iter().map(|l| l.kind).collect();
    assert_eq!(
        order,
        vec![
            LayerKind::Background,
            LayerKind::Effect(EffectKind::Trail),
            LayerKind::Effect(EffectKind::Click),
            LayerKind::Effect(EffectKind::Cursor),
        ]
    );
    assert!(list.layer(LayerKind::Card).is_none());
}

#[test]
fn centered_image_transform_maps_center() {
    let mut layer = Layer::new(LayerKind::Effect(EffectKind::Cursor), 0, Positioning::Fixed);
    let asset = crate::assets::store::AssetId::for_url("x");
    layer.image_centered(asset, Point::new(50.0, 40.0), Size::new(20.0, 10.0), 0.0, 1.0);
    let DrawOp::Image { transform, size, .. } = &layer.ops[0] else {
        panic!("expected image op");
    };
    let mapped = *transform * Point::new(size.width / 2.0, size.height / 2.0);
    assert!((mapped - Point::new(50.0, 40.0)).hypot() < 1e-9);
}

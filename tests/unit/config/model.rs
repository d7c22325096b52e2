use super::*;
use serde_json::json;

#[test]
fn empty_row_takes_product_defaults() {
    let p = ProfileConfig::from_json_str("{}").unwrap();
    assert_eq!(p, ProfileConfig::default());

    let cfg = ConfigModel::from_profile(&p);
    assert!(!cfg.particles.enabled);
    assert_eq!(cfg.particles.count, 50);
    assert_eq!(cfg.particles.opacity, 0.8);
    assert_eq!(cfg.trail.length, 20);
    assert_eq!(cfg.trail.dot_size, 10.0);
    assert!(cfg.trail.fade);
    assert_eq!(cfg.click.kind, ClickEffectKind::Ripple);
    assert_eq!(cfg.cursor.kind, CursorKind::Default);
    assert!(cfg.card.tilt_enabled);
    assert_eq!(cfg.card.tilt_intensity_degrees, 10.0);
    assert_eq!(cfg.card.position, CardPosition::CENTER);
}

#[test]
fn out_of_range_numbers_are_clamped() {
    let p: ProfileConfig = serde_json::from_value(json!({
        "snow_count": 0,
        "snow_speed": -4.0,
        "snow_wind": 9.0,
        "snow_size": 100,
        "snow_opacity": 0,
        "snow_sway": -1,
        "mouse_trail_length": 10_000,
        "mouse_trail_size": 1,
        "click_effect_size": 5000,
        "card_tilt_intensity": 90,
        "card_position_x": -30,
        "card_position_y": 130,
    }))
    .unwrap();
    let cfg = ConfigModel::from_profile(&p);
    assert_eq!(cfg.particles.count, 10);
    assert_eq!(cfg.particles.speed, 0.1);
    assert_eq!(cfg.particles.wind, 2.0);
    assert_eq!(cfg.particles.size, 5.0);
    assert_eq!(cfg.particles.opacity, 0.1);
    assert_eq!(cfg.particles.sway, 0.0);
    assert_eq!(cfg.trail.length, 50);
    assert_eq!(cfg.trail.dot_size, 2.0);
    assert_eq!(cfg.click.size, 200.0);
    assert_eq!(cfg.card.tilt_intensity_degrees, 30.0);
    assert_eq!(cfg.card.position, CardPosition { x: 10.0, y: 90.0 });
}

#[test]
fn nulls_and_garbage_degrade_to_defaults() {
    let p: ProfileConfig = serde_json::from_value(json!({
        "snow_count": null,
        "snow_speed": "2.5",
        "snow_color": "not-a-color",
        "click_effect_type": "fireworks",
        "cursor_type": "HIDDEN",
        "background_type": null,
    }))
    .unwrap();
    assert!(p.snow_count.is_nan());
    assert_eq!(p.snow_color, None);
    assert_eq!(p.click_effect_type, ClickEffectKind::Ripple);
    assert_eq!(p.cursor_type, CursorKind::Hidden);
    assert_eq!(p.background_type, BackgroundKind::Color);

    let cfg = ConfigModel::from_profile(&p);
    assert_eq!(cfg.particles.count, 50);
    assert_eq!(cfg.particles.speed, 2.5);
    assert_eq!(cfg.particles.color, Color::WHITE);
}

#[test]
fn blank_image_urls_are_treated_as_missing() {
    let p = ProfileConfig {
        snow_use_image: true,
        snow_image_url: Some("   ".to_owned()),
        cursor_image_url: Some("https://cdn.example/c.png".to_owned()),
        ..ProfileConfig::default()
    };
    let cfg = ConfigModel::from_profile(&p);
    assert!(cfg.particles.use_image);
    assert_eq!(cfg.particles.image_ref, None);
    assert_eq!(
        cfg.cursor.image_ref.as_deref(),
        Some("https://cdn.example/c.png")
    );
}

#[test]
fn sanitized_reclamps_external_configs() {
    let mut cfg = ConfigModel::default();
    cfg.particles.count = 100_000;
    cfg.particles.speed = f64::NAN;
    cfg.trail.length = 9_999;
    cfg.card.position = CardPosition { x: 0.0, y: 100.0 };
    let cfg = cfg.sanitized();
    assert_eq!(cfg.particles.count, 500);
    assert_eq!(cfg.particles.speed, 1.0);
    assert_eq!(cfg.trail.length, 50);
    assert_eq!(cfg.card.position, CardPosition { x: 10.0, y: 90.0 });
}

#[test]
fn config_json_is_camel_case() {
    let v = serde_json::to_value(ConfigModel::default()).unwrap();
    assert_eq!(v["particles"]["rotationEnabled"], json!(true));
    assert_eq!(v["trail"]["dotSize"], json!(10.0));
    assert_eq!(v["click"]["type"], json!("ripple"));
    assert_eq!(v["cursor"]["type"], json!("default"));
    assert_eq!(v["card"]["tiltIntensityDegrees"], json!(10.0));

    let back = ConfigModel::from_json_str(&v.to_string()).unwrap();
    assert_eq!(back, ConfigModel::default());
}

#[test]
fn every_variant_name_parses() {
    for kind in ClickEffectKind::ANIMATED {
        let name = serde_json::to_value(kind).unwrap();
        let parsed: ClickEffectKind = name.as_str().unwrap().parse().unwrap();
        assert_eq!(parsed, kind);
    }
    assert_eq!("none".parse::<ClickEffectKind>().unwrap(), ClickEffectKind::None);
    assert!("laser".parse::<ClickEffectKind>().is_err());
}

#[test]
fn shown_name_falls_back_to_username() {
    let mut p = ProfileConfig {
        username: "frost".to_owned(),
        ..ProfileConfig::default()
    };
    assert_eq!(p.shown_name(), "frost");
    p.display_name = Some("  ".to_owned());
    assert_eq!(p.shown_name(), "frost");
    p.display_name = Some("Frosty".to_owned());
    assert_eq!(p.shown_name(), "Frosty");
}

use std::io::Cursor;

use super::*;

fn png_1x1(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(1, 1, rgba.to_vec()).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_1x1([100, 50, 200, 128])).unwrap();
    assert_eq!((prepared.width, prepared.height), (1, 1));
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rejects_garbage() {
    let err = decode_image(b"definitely not a png").unwrap_err();
    assert!(err.to_string().contains("decode image"));
}

#[test]
fn decode_svg_rasterizes_at_scale() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2"><rect width="4" height="2" fill="#ff0000"/></svg>"##;
    let img = decode_svg(svg, 2.0).unwrap();
    assert_eq!((img.width, img.height), (8, 4));
    assert_eq!(&img.rgba8_premul[..4], &[255, 0, 0, 255]);

    assert!(decode_svg(b"<svg", 1.0).is_err());
}

#[test]
fn data_url_base64_and_percent_forms() {
    let url = format!("data:image/png;base64,{}", STANDARD.encode(b"hello"));
    let d = parse_data_url(&url).unwrap().unwrap();
    assert_eq!(d.mime, "image/png");
    assert_eq!(d.bytes, b"hello");

    let d = parse_data_url("data:image/svg+xml,%3Csvg%3E").unwrap().unwrap();
    assert_eq!(d.mime, "image/svg+xml");
    assert_eq!(d.bytes, b"<svg>");

    assert_eq!(parse_data_url("https://cdn.example/a.png").unwrap(), None);
    assert!(parse_data_url("data:image/png;base64").is_err());
}

#[test]
fn percent_encoded_payload_decodes_multibyte_escapes() {
    let d = parse_data_url("data:text/plain,ok%20%E2%9C%93").unwrap().unwrap();
    assert_eq!(d.mime, "text/plain");
    assert_eq!(d.bytes, "ok \u{2713}".as_bytes());

    let d = parse_data_url("data:,100%zz").unwrap().unwrap();
    assert_eq!(d.bytes, b"100%zz", "malformed escapes pass through");
}

#[test]
fn sniffing_prefers_svg_markers() {
    assert_eq!(ImageFormatHint::sniff("image/svg+xml", b""), ImageFormatHint::Svg);
    assert_eq!(
        ImageFormatHint::sniff("https://x/cursor.svg?v=2", b""),
        ImageFormatHint::Svg
    );
    assert_eq!(ImageFormatHint::sniff("", b"  <svg xmlns=''/>"), ImageFormatHint::Svg);
    assert_eq!(
        ImageFormatHint::sniff("https://x/flake.png", &png_1x1([0; 4])),
        ImageFormatHint::Raster
    );
}

use crate::foundation::error::{FxError, FxResult};

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over of one premultiplied pixel, with the source scaled by `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    for i in 0..3 {
        out[i] = mul_div255(u16::from(src[i]), op).saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out[3] = sa.saturating_add(mul_div255(u16::from(dst[3]), inv));
    out
}

/// Composite a whole layer buffer onto `dst`.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> FxResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(FxError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Copy `src` into `dst` wherever `mask` (a premultiplied buffer of the same size) is non-zero,
/// weighted by the mask alpha. Used to show a blurred backdrop only under a shape.
pub fn masked_replace_in_place(dst: &mut [u8], src: &[u8], mask: &[u8]) -> FxResult<()> {
    if dst.len() != src.len() || dst.len() != mask.len() || !dst.len().is_multiple_of(4) {
        return Err(FxError::render(
            "masked_replace_in_place expects equal-length rgba8 buffers",
        ));
    }
    for ((d, s), m) in dst
        .chunks_exact_mut(4)
        .zip(src.chunks_exact(4))
        .zip(mask.chunks_exact(4))
    {
        let t = u16::from(m[3]);
        if t == 0 {
            continue;
        }
        let it = 255 - t;
        for c in 0..4 {
            d[c] = mul_div255(u16::from(s[c]), t).saturating_add(mul_div255(u16::from(d[c]), it));
        }
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;

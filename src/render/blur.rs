use crate::foundation::error::{FxError, FxResult};

/// Kernel half-width ceiling; larger blurs are visually indistinguishable at our sizes.
const MAX_RADIUS: u32 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Gaussian blur of a premultiplied RGBA8 buffer with standard deviation `sigma` pixels.
///
/// Matches CSS `blur(<sigma>px)`: the kernel spans `ceil(3 * sigma)` pixels on each side and edges
/// are clamped. A non-positive sigma returns the input unchanged.
pub fn blur_rgba8_premul(src: &[u8], width: u32, height: u32, sigma: f64) -> FxResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| FxError::render("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(FxError::render(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    if !sigma.is_finite() || sigma <= 0.0 || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let radius = ((3.0 * sigma).ceil() as u32).clamp(1, MAX_RADIUS);
    let kernel = gaussian_kernel_q16(radius, sigma);
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    blur_axis(src, &mut tmp, width, height, &kernel, Axis::Horizontal);
    blur_axis(&tmp, &mut out, width, height, &kernel, Axis::Vertical);
    Ok(out)
}

/// Normalized Q16 weights for `-radius..=radius`; the rounding residue goes to the center tap.
fn gaussian_kernel_q16(radius: u32, sigma: f64) -> Vec<u32> {
    let r = radius as i32;
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let mid = weights.len() / 2;
    weights[mid] = (i64::from(weights[mid]) + (65536 - acc)).clamp(0, 65536) as u32;
    weights
}

fn blur_axis(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32], axis: Axis) {
    let radius = (k.len() / 2) as i64;
    let (w, h) = (i64::from(width), i64::from(height));
    let (len, step) = match axis {
        Axis::Horizontal => (w, 1),
        Axis::Vertical => (h, w),
    };

    for y in 0..h {
        for x in 0..w {
            let pos = if axis == Axis::Horizontal { x } else { y };
            let base = y * w + x - pos * step;
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let s = (pos + ki as i64 - radius).clamp(0, len - 1);
                let idx = ((base + s * step) as usize) * 4;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for (c, a) in acc.iter().enumerate() {
                dst[out_idx + c] = ((a + 32768) >> 16).min(255) as u8;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;

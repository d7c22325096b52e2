use std::collections::HashMap;
use std::sync::Arc;

use kurbo::{Stroke, StrokeOpts};

use crate::assets::store::{AssetId, AssetStore, PreparedImage};
use crate::config::color::Color;
use crate::foundation::core::{Affine, BezPath, Canvas};
use crate::foundation::error::{FxError, FxResult};
use crate::render::blur::blur_rgba8_premul;
use crate::render::composite::{masked_replace_in_place, over_in_place};
use crate::render::display::{DrawOp, Layer};
use crate::render::{FrameRGBA, RenderBackend};

/// CPU rasterizer built on `vello_cpu`.
///
/// Each layer is rendered into a scratch pixmap and composited over the frame, so that backdrop
/// blurs see exactly what was painted below them.
#[derive(Default)]
pub struct CpuBackend {
    ctx: Option<vello_cpu::RenderContext>,
    image_cache: HashMap<AssetId, ImagePaint>,
    frame: Option<vello_cpu::Pixmap>,
    scratch: Option<vello_cpu::Pixmap>,
}

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for CpuBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuBackend")
            .field("cached_images", &self.image_cache.len())
            .field("in_frame", &self.frame.is_some())
            .finish()
    }
}

impl CpuBackend {
    /// Backend with empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    fn frame_dims(&self) -> FxResult<(u16, u16)> {
        self.frame
            .as_ref()
            .map(|p| (p.width(), p.height()))
            .ok_or_else(|| FxError::render("no frame in progress"))
    }

    fn take_ctx(&mut self, width: u16, height: u16) -> vello_cpu::RenderContext {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx
    }

    fn take_scratch(&mut self, width: u16, height: u16) -> vello_cpu::Pixmap {
        match self.scratch.take() {
            Some(mut p) if p.width() == width && p.height() == height => {
                p.data_as_u8_slice_mut().fill(0);
                p
            }
            _ => vello_cpu::Pixmap::new(width, height),
        }
    }

    fn image_paint_for(&mut self, id: AssetId, assets: &AssetStore) -> FxResult<Option<ImagePaint>> {
        if let Some(p) = self.image_cache.get(&id) {
            return Ok(Some(p.clone()));
        }
        let Some(prepared) = assets.get(id) else {
            return Ok(None);
        };
        let paint = image_from_prepared(prepared)?;
        self.image_cache.insert(id, paint.clone());
        Ok(Some(paint))
    }

    fn draw_op(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        op: &DrawOp,
        transform: Affine,
        assets: &AssetStore,
    ) -> FxResult<()> {
        match op {
            DrawOp::FillPath {
                path,
                transform: local,
                color,
            } => {
                ctx.set_transform(affine_to_cpu(transform * *local));
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_path(&bezpath_to_cpu(path));
            }
            DrawOp::StrokePath {
                path,
                transform: local,
                width,
                color,
            } => {
                let outline = kurbo::stroke(
                    path.iter(),
                    &Stroke::new(*width),
                    &StrokeOpts::default(),
                    0.05,
                );
                ctx.set_transform(affine_to_cpu(transform * *local));
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_path(&bezpath_to_cpu(&outline));
            }
            DrawOp::Image {
                asset,
                size,
                transform: local,
                opacity,
            } => {
                let Some(img) = self.image_paint_for(*asset, assets)? else {
                    tracing::trace!(?asset, "image not resolved; skipped");
                    return Ok(());
                };
                let (w, h) = (f64::from(img.width), f64::from(img.height));
                let fit = Affine::scale_non_uniform(size.width / w, size.height / h);
                ctx.set_transform(affine_to_cpu(transform * *local * fit));
                ctx.set_paint(img.paint);
                let opacity = opacity.clamp(0.0, 1.0) as f32;
                if opacity < 1.0 {
                    ctx.push_opacity_layer(opacity);
                }
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
                if opacity < 1.0 {
                    ctx.pop_layer();
                }
            }
        }
        Ok(())
    }
}

impl RenderBackend for CpuBackend {
    fn begin_frame(&mut self, canvas: Canvas) -> FxResult<()> {
        let w: u16 = canvas
            .width
            .try_into()
            .map_err(|_| FxError::render("frame width exceeds u16"))?;
        let h: u16 = canvas
            .height
            .try_into()
            .map_err(|_| FxError::render("frame height exceeds u16"))?;
        self.frame = Some(vello_cpu::Pixmap::new(w, h));
        Ok(())
    }

    fn backdrop_blur(
        &mut self,
        sigma_px: f64,
        clip: Option<&BezPath>,
        transform: Affine,
    ) -> FxResult<()> {
        let (w, h) = self.frame_dims()?;
        let mask = match clip {
            Some(path) => {
                let mut ctx = self.take_ctx(w, h);
                let mut scratch = self.take_scratch(w, h);
                ctx.set_transform(affine_to_cpu(transform));
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
                ctx.fill_path(&bezpath_to_cpu(path));
                ctx.flush();
                ctx.render_to_pixmap(&mut scratch);
                self.ctx = Some(ctx);
                Some(scratch)
            }
            None => None,
        };

        let frame = self
            .frame
            .as_mut()
            .ok_or_else(|| FxError::render("no frame in progress"))?;
        let blurred = blur_rgba8_premul(
            frame.data_as_u8_slice(),
            u32::from(w),
            u32::from(h),
            sigma_px,
        )?;
        match &mask {
            Some(m) => masked_replace_in_place(
                frame.data_as_u8_slice_mut(),
                &blurred,
                m.data_as_u8_slice(),
            )?,
            None => frame.data_as_u8_slice_mut().copy_from_slice(&blurred),
        }
        self.scratch = mask;
        Ok(())
    }

    fn paint_layer(
        &mut self,
        layer: &Layer,
        transform: Affine,
        assets: &AssetStore,
    ) -> FxResult<()> {
        let (w, h) = self.frame_dims()?;
        let mut ctx = self.take_ctx(w, h);
        let mut scratch = self.take_scratch(w, h);

        let opacity = layer.opacity.clamp(0.0, 1.0) as f32;
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }
        let mut result = Ok(());
        for op in &layer.ops {
            result = self.draw_op(&mut ctx, op, transform, assets);
            if result.is_err() {
                break;
            }
        }
        if opacity < 1.0 {
            ctx.pop_layer();
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut scratch);
        self.ctx = Some(ctx);
        result?;

        let frame = self
            .frame
            .as_mut()
            .ok_or_else(|| FxError::render("no frame in progress"))?;
        over_in_place(frame.data_as_u8_slice_mut(), scratch.data_as_u8_slice(), 1.0)?;
        self.scratch = Some(scratch);
        Ok(())
    }

    fn finish_frame(&mut self) -> FxResult<FrameRGBA> {
        let frame = self
            .frame
            .take()
            .ok_or_else(|| FxError::render("no frame in progress"))?;
        Ok(FrameRGBA {
            width: u32::from(frame.width()),
            height: u32::from(frame.height()),
            data: frame.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn color_to_cpu(c: Color) -> vello_cpu::peniko::Color {
    let to_u8 = |x: f64| (x.clamp(0.0, 1.0) * 255.0).round() as u8;
    vello_cpu::peniko::Color::from_rgba8(to_u8(c.r), to_u8(c.g), to_u8(c.b), to_u8(c.a))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_from_prepared(img: &PreparedImage) -> FxResult<ImagePaint> {
    let w: u16 = img
        .width
        .try_into()
        .map_err(|_| FxError::render("image width exceeds u16"))?;
    let h: u16 = img
        .height
        .try_into()
        .map_err(|_| FxError::render("image height exceeds u16"))?;
    let expected = (img.width as usize)
        .saturating_mul(img.height as usize)
        .saturating_mul(4);
    if img.rgba8_premul.len() != expected {
        return Err(FxError::render("image byte len mismatch"));
    }

    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = img
        .rgba8_premul
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    let may_have_opacities = pixels.iter().any(|p| p.a != 255);
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(ImagePaint {
        paint: vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        },
        width: img.width,
        height: img.height,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;

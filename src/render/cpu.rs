use std::path::Path;

use anyhow::Context;

use crate::{
    foundation::core::{Affine, Rect, affine_to_cpu, rect_to_cpu},
    foundation::error::{ScrollSeqError, ScrollSeqResult},
    render::surface::DrawSurface,
    sequence::store::DecodedFrame,
};

/// CPU raster surface powered by `vello_cpu`.
///
/// Holds a premultiplied RGBA8 backing store sized in device pixels. Every draw is one
/// image-filled rectangle under a `pixel_ratio * translate * scale` transform.
pub struct CpuSurface {
    pixmap: vello_cpu::Pixmap,
    ctx: Option<vello_cpu::RenderContext>,
    pixel_ratio: f64,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("pixel_ratio", &self.pixel_ratio)
            .finish()
    }
}

impl Default for CpuSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuSurface {
    /// Zero-sized surface; [`DrawSurface::configure`] gives it a real size.
    pub fn new() -> Self {
        Self {
            pixmap: vello_cpu::Pixmap::new(0, 0),
            ctx: None,
            pixel_ratio: 1.0,
        }
    }

    /// Backing width in device pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    /// Backing height in device pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    /// Current CSS → device pixel scale.
    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Premultiplied pixel at device coordinates, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = ((y as usize) * (self.width() as usize) + (x as usize)) * 4;
        let d = self.data();
        Some([d[i], d[i + 1], d[i + 2], d[i + 3]])
    }

    /// Copy of the backing store with alpha un-premultiplied.
    pub fn to_rgba8_straight(&self) -> Vec<u8> {
        let mut out = self.data().to_vec();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }

    /// Write the surface as a PNG.
    pub fn save_png(&self, path: &Path) -> ScrollSeqResult<()> {
        image::save_buffer_with_format(
            path,
            &self.to_rgba8_straight(),
            self.width(),
            self.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }

    fn with_ctx_mut<R>(
        &mut self,
        f: impl FnOnce(&mut vello_cpu::RenderContext, &mut vello_cpu::Pixmap) -> R,
    ) -> R {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut ctx, &mut self.pixmap);
        self.ctx = Some(ctx);
        out
    }

    fn device_rect(&self, rect: Rect) -> Option<(usize, usize, usize, usize)> {
        let r = self.pixel_ratio;
        let (w, h) = (f64::from(self.width()), f64::from(self.height()));
        let x0 = (rect.x0 * r).floor().clamp(0.0, w);
        let y0 = (rect.y0 * r).floor().clamp(0.0, h);
        let x1 = (rect.x1 * r).ceil().clamp(0.0, w);
        let y1 = (rect.y1 * r).ceil().clamp(0.0, h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }
}

impl DrawSurface for CpuSurface {
    fn configure(&mut self, width: u32, height: u32, pixel_ratio: f64) -> ScrollSeqResult<()> {
        let w = side_u16(width, "surface width")?;
        let h = side_u16(height, "surface height")?;
        if self.pixmap.width() != w || self.pixmap.height() != h {
            self.pixmap = vello_cpu::Pixmap::new(w, h);
            self.ctx = None;
        }
        self.pixel_ratio = pixel_ratio;
        Ok(())
    }

    fn clear_rect(&mut self, rect: Rect) -> ScrollSeqResult<()> {
        let Some((x0, y0, x1, y1)) = self.device_rect(rect) else {
            return Ok(());
        };
        let stride = self.width() as usize * 4;
        let data = self.pixmap.data_as_u8_slice_mut();
        for y in y0..y1 {
            data[y * stride + x0 * 4..y * stride + x1 * 4].fill(0);
        }
        Ok(())
    }

    fn draw_frame(&mut self, frame: &DecodedFrame, dest: Rect) -> ScrollSeqResult<()> {
        if self.width() == 0 || self.height() == 0 || frame.width == 0 || frame.height == 0 {
            return Ok(());
        }
        let (fw, fh) = (f64::from(frame.width), f64::from(frame.height));
        let transform = Affine::scale(self.pixel_ratio)
            * Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(dest.width() / fw, dest.height() / fh);
        let paint = frame.paint();

        self.with_ctx_mut(|ctx, dst| {
            clear_pixmap_to_transparent(dst);
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(paint);
            ctx.fill_rect(&rect_to_cpu(Rect::new(0.0, 0.0, fw, fh)));
            ctx.flush();
            ctx.render_to_pixmap(dst);
        });
        Ok(())
    }
}

fn side_u16(v: u32, what: &str) -> ScrollSeqResult<u16> {
    u16::try_from(v).map_err(|_| ScrollSeqError::render(format!("{what} {v} exceeds u16")))
}

/// Wrap premultiplied RGBA8 bytes in a pixmap usable as an image paint.
pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> ScrollSeqResult<vello_cpu::Pixmap> {
    let w = side_u16(width, "pixmap width")?;
    let h = side_u16(height, "pixmap height")?;
    let expected = usize::from(w) * usize::from(h) * 4;
    if bytes.len() != expected {
        return Err(ScrollSeqError::render(format!(
            "pixmap expects {expected} bytes for {width}x{height}, got {}",
            bytes.len()
        )));
    }

    let translucent = bytes.chunks_exact(4).any(|px| px[3] != 255);
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        translucent,
    ))
}

fn clear_pixmap_to_transparent(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{ScrollSeqError, ScrollSeqResult};

/// Largest frame side the CPU raster path can hold.
pub(crate) const MAX_FRAME_SIDE: u32 = u16::MAX as u32;

/// A decoded frame in premultiplied RGBA8, before it is turned into a drawable pixmap.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode an encoded frame (any format `image` recognizes) into premultiplied RGBA8.
///
/// Empty images and images wider or taller than [`u16::MAX`] are rejected.
pub fn decode_image(bytes: &[u8]) -> ScrollSeqResult<PreparedImage> {
    let format = image::guess_format(bytes).context("detect frame image format")?;
    let decoded = image::load_from_memory_with_format(bytes, format)
        .with_context(|| format!("decode {format:?} frame"))?;

    let (width, height) = (decoded.width(), decoded.height());
    if width == 0 || height == 0 {
        return Err(ScrollSeqError::validation("frame has no pixels"));
    }
    if width > MAX_FRAME_SIDE || height > MAX_FRAME_SIDE {
        return Err(ScrollSeqError::validation(format!(
            "frame {width}x{height} exceeds {MAX_FRAME_SIDE} pixels per side"
        )));
    }

    let mut rgba8_premul = decoded.into_rgba8().into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        match a {
            255 => {}
            0 => px[..3].fill(0),
            _ => {
                for c in &mut px[..3] {
                    *c = ((u16::from(*c) * a + 127) / 255) as u8;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;

use crate::{
    foundation::core::{Rect, Size},
    foundation::error::ScrollSeqResult,
    layout::sampler::LayoutSample,
    render::surface::DrawSurface,
    sequence::store::DecodedFrame,
};

/// What a call to [`draw`] did to the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawOutcome {
    /// A frame was blitted into `dest`.
    Drawn {
        /// Destination rectangle in CSS pixels.
        dest: Rect,
    },
    /// The frame was not available; `dest` was cleared instead.
    Cleared {
        /// Cleared rectangle in CSS pixels.
        dest: Rect,
    },
    /// Nothing to draw into (zero-area surface).
    Skipped,
}

/// Destination rectangle that scales `intrinsic` to cover `surface`, centered.
///
/// Matches CSS `background-size: cover; background-position: center`. Returns `None` when
/// either size has no area.
pub fn cover_fit(surface: Size, intrinsic: Size) -> Option<Rect> {
    let valid = |s: Size| s.width > 0.0 && s.height > 0.0 && s.is_finite();
    if !valid(surface) || !valid(intrinsic) {
        return None;
    }

    let container_ratio = surface.width / surface.height;
    let image_ratio = intrinsic.width / intrinsic.height;

    let (dx, dy, dw, dh) = if image_ratio > container_ratio {
        // wider: match heights, crop left/right
        let dw = surface.height * image_ratio;
        ((surface.width - dw) / 2.0, 0.0, dw, surface.height)
    } else {
        // taller: match widths, crop top/bottom
        let dh = surface.width / image_ratio;
        (0.0, (surface.height - dh) / 2.0, surface.width, dh)
    };
    Some(Rect::new(dx, dy, dx + dw, dy + dh))
}

/// Cover-fit `frame` onto `surface`, or clear the destination when the frame is missing.
pub fn draw(
    surface: &mut dyn DrawSurface,
    frame: Option<&DecodedFrame>,
    layout: &LayoutSample,
    intrinsic_width: f64,
    intrinsic_height: f64,
) -> ScrollSeqResult<DrawOutcome> {
    let Some(dest) = cover_fit(
        Size::new(layout.surface_width, layout.surface_height),
        Size::new(intrinsic_width, intrinsic_height),
    ) else {
        return Ok(DrawOutcome::Skipped);
    };

    match frame {
        Some(frame) => {
            surface.draw_frame(frame, dest)?;
            Ok(DrawOutcome::Drawn { dest })
        }
        None => {
            surface.clear_rect(dest)?;
            Ok(DrawOutcome::Cleared { dest })
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;

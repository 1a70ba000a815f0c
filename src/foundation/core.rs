pub use kurbo::{Affine, Rect, Size, Vec2};

/// Rendered box of a page element, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementBox {
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
}

impl ElementBox {
    /// Build a box from a width and height.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `true` when both sides are finite and non-negative.
    pub fn is_measurable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }

    /// View as a `kurbo` size.
    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

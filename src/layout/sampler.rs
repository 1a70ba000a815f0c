use std::collections::HashMap;

use crate::{
    foundation::core::{ElementBox, Rect},
    foundation::error::LayoutError,
    sequence::config::SequenceConfig,
};

/// Page environment the engine measures on every resize.
///
/// The host resolves selectors to rendered element boxes (CSS pixels) and reports the display's
/// pixel density.
pub trait LayoutHost {
    /// Rendered box of the element matching `selector`, or `None` if it does not exist.
    fn measure(&self, selector: &str) -> Option<ElementBox>;

    /// Device pixels per CSS pixel.
    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }
}

/// One complete measurement of the surface and scroll range.
///
/// Sizes are CSS pixels; [`LayoutSample::backing_size`] gives the device-pixel backing store.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct LayoutSample {
    /// Surface width.
    pub surface_width: f64,
    /// Surface height.
    pub surface_height: f64,
    /// Device pixels per CSS pixel.
    pub pixel_ratio: f64,
    /// Scrollable range over which progress goes 0 → 1. Always >= 1.
    pub animation_distance: f64,
    /// Offsets at or below this value map to the first frame.
    pub padding_start: f64,
}

impl LayoutSample {
    /// Build a sample from raw measurements, clamping a degenerate scroll range to 1.
    pub fn new(
        surface: ElementBox,
        pixel_ratio: f64,
        scene_height: f64,
        padding_start: f64,
        padding_end: f64,
    ) -> Self {
        let mut animation_distance = scene_height - padding_end - padding_start;
        if animation_distance.is_nan() || animation_distance <= 0.0 {
            tracing::warn!(
                scene_height,
                padding_start,
                padding_end,
                "degenerate animation distance, using 1"
            );
            animation_distance = 1.0;
        }
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            tracing::warn!(pixel_ratio, "invalid device pixel ratio, using 1");
            1.0
        };
        Self {
            surface_width: surface.width,
            surface_height: surface.height,
            pixel_ratio,
            animation_distance,
            padding_start,
        }
    }

    /// Backing-store resolution in device pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.surface_width * self.pixel_ratio).floor() as u32,
            (self.surface_height * self.pixel_ratio).floor() as u32,
        )
    }

    /// Surface bounds in CSS pixels.
    pub fn surface_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.surface_width, self.surface_height)
    }

    /// `true` when there is no visible area to draw into.
    pub fn is_empty_surface(&self) -> bool {
        self.surface_width <= 0.0 || self.surface_height <= 0.0
    }
}

/// Measure the scene and surface elements named by `config`.
#[tracing::instrument(skip(host, config))]
pub fn sample(
    host: &dyn LayoutHost,
    config: &SequenceConfig,
) -> Result<LayoutSample, LayoutError> {
    let scene = measure(host, &config.scene_selector)?;
    let surface = measure(host, &config.surface_selector)?;
    Ok(LayoutSample::new(
        surface,
        host.device_pixel_ratio(),
        scene.height,
        config.padding_start,
        config.padding_end,
    ))
}

fn measure(host: &dyn LayoutHost, selector: &str) -> Result<ElementBox, LayoutError> {
    let b = host
        .measure(selector)
        .ok_or_else(|| LayoutError::MissingElement {
            selector: selector.to_string(),
        })?;
    if !b.is_measurable() {
        return Err(LayoutError::InvalidMeasurement {
            selector: selector.to_string(),
            width: b.width,
            height: b.height,
        });
    }
    Ok(b)
}

/// Layout host backed by a fixed selector → box table.
#[derive(Clone, Debug)]
pub struct StaticLayoutHost {
    boxes: HashMap<String, ElementBox>,
    pixel_ratio: f64,
}

impl Default for StaticLayoutHost {
    fn default() -> Self {
        Self {
            boxes: HashMap::new(),
            pixel_ratio: 1.0,
        }
    }
}

impl StaticLayoutHost {
    /// Empty host with a pixel ratio of 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`StaticLayoutHost::set_element`].
    pub fn with_element(mut self, selector: impl Into<String>, b: ElementBox) -> Self {
        self.set_element(selector, b);
        self
    }

    /// Builder form of [`StaticLayoutHost::set_device_pixel_ratio`].
    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    /// Insert or replace the box reported for `selector`.
    pub fn set_element(&mut self, selector: impl Into<String>, b: ElementBox) {
        self.boxes.insert(selector.into(), b);
    }

    /// Stop resolving `selector`.
    pub fn remove_element(&mut self, selector: &str) {
        self.boxes.remove(selector);
    }

    /// Change the reported pixel density.
    pub fn set_device_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }
}

impl LayoutHost for StaticLayoutHost {
    fn measure(&self, selector: &str) -> Option<ElementBox> {
        self.boxes.get(selector).copied()
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/sampler.rs"]
mod tests;

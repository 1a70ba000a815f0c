use crate::layout::sampler::LayoutSample;

/// Map a scroll offset to a slot in a sequence of `sequence_len` frames.
///
/// Offsets inside the start padding pin to the first frame and offsets past the scroll range
/// freeze on the last. Progress is linear in between. Returns `None` for an empty sequence.
pub fn frame_index(
    scroll_offset: f64,
    layout: &LayoutSample,
    sequence_len: usize,
) -> Option<usize> {
    if sequence_len == 0 {
        return None;
    }
    let index = (scroll_progress(scroll_offset, layout) * sequence_len as f64).floor();
    // `as` saturates, so NaN and negatives land on 0.
    Some((index as usize).min(sequence_len - 1))
}

/// Clamped scroll progress in `[0, 1)`.
pub fn scroll_progress(scroll_offset: f64, layout: &LayoutSample) -> f64 {
    let distance = layout.animation_distance.max(1.0);

    let mut offset = scroll_offset;
    if offset.is_nan() || offset <= layout.padding_start {
        offset = 0.0;
    }
    if offset >= distance {
        offset = distance - 1.0;
    }
    (offset / distance).max(0.0)
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/mapper.rs"]
mod tests;

use std::sync::Arc;

use crate::{
    assets::decode::PreparedImage, foundation::error::ScrollSeqResult,
    render::cpu::pixmap_from_premul_bytes,
};

/// One decoded frame, ready to blit.
///
/// The raster conversion happens once, on the loader thread, so a draw is a single paint
/// setup regardless of image size.
pub struct DecodedFrame {
    /// Decoded width in pixels.
    pub width: u32,
    /// Decoded height in pixels.
    pub height: u32,
    pub(crate) pixmap: Arc<vello_cpu::Pixmap>,
}

impl DecodedFrame {
    /// Convert a premultiplied image into a drawable frame.
    pub fn from_prepared(img: &PreparedImage) -> ScrollSeqResult<Self> {
        let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
        Ok(Self {
            width: img.width,
            height: img.height,
            pixmap: Arc::new(pixmap),
        })
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::clone(&self.pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        }
    }
}

impl std::fmt::Debug for DecodedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixmap_ptr", &Arc::as_ptr(&self.pixmap))
            .finish()
    }
}

/// Shared handle to a decoded frame. Mirrored slots share the same allocation.
pub type FrameHandle = Arc<DecodedFrame>;

/// Ordered slots of decoded frames, optionally followed by the same frames in reverse.
///
/// Slot sources are fixed at construction; only occupancy changes, and a slot never goes back
/// to empty.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    slots: Vec<Option<FrameHandle>>,
    forward_len: usize,
    concat_reverse: bool,
    occupied: usize,
}

impl FrameSequence {
    /// Empty sequence for `forward_len` sources.
    pub fn new(forward_len: usize, concat_reverse: bool) -> Self {
        let n = if concat_reverse {
            forward_len * 2
        } else {
            forward_len
        };
        Self {
            slots: vec![None; n],
            forward_len,
            concat_reverse,
            occupied: 0,
        }
    }

    /// Total slot count `N`.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// `true` when there are no slots at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of source frames (before mirroring).
    pub fn forward_len(&self) -> usize {
        self.forward_len
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    /// `true` once every slot holds a frame.
    pub fn is_complete(&self) -> bool {
        self.occupied == self.slots.len()
    }

    /// Store the frame for forward index `idx`, plus its mirror slot when reversing.
    ///
    /// Returns `false` (and stores nothing) when `idx` is not a forward index.
    pub fn set_frame(&mut self, idx: usize, handle: FrameHandle) -> bool {
        if idx >= self.forward_len {
            tracing::warn!(
                idx,
                forward_len = self.forward_len,
                "ignoring frame outside sequence"
            );
            return false;
        }
        if self.concat_reverse {
            let mirror = self.slots.len() - 1 - idx;
            self.put(mirror, Arc::clone(&handle));
        }
        self.put(idx, handle);
        true
    }

    /// Frame at slot `i`, or `None` if it has not arrived (or `i` is out of range).
    pub fn frame_at(&self, i: usize) -> Option<&FrameHandle> {
        self.slots.get(i).and_then(Option::as_ref)
    }

    /// Forward index of the URL that feeds `slot`.
    pub fn source_index(&self, slot: usize) -> Option<usize> {
        if slot < self.forward_len {
            Some(slot)
        } else if self.concat_reverse && slot < self.slots.len() {
            Some(self.slots.len() - 1 - slot)
        } else {
            None
        }
    }

    fn put(&mut self, slot: usize, handle: FrameHandle) {
        let cell = &mut self.slots[slot];
        if cell.is_none() {
            self.occupied += 1;
        }
        *cell = Some(handle);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/store.rs"]
mod tests;

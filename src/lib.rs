//! scrollseq is a scroll-synchronized image-sequence frame engine.
//!
//! As the user scrolls through a pinned region, the engine shows the frame of a preloaded image
//! sequence that matches scroll progress, scaled to cover the drawing surface without distortion.
//!
//! # Pipeline overview
//!
//! 1. **Load**: every frame URL is fetched and decoded on a worker pool; completions arrive in
//!    any order and fill [`FrameSequence`] slots (mirrored when `concat_reverse` is set).
//! 2. **Sample**: on attach and on every resize, [`sample`] measures the surface and scene
//!    elements through a [`LayoutHost`] into an immutable [`LayoutSample`].
//! 3. **Map**: [`frame_index`] turns a scroll offset into a slot, linearly and clamped.
//! 4. **Composite**: [`draw`] cover-fits the slot's frame onto a [`DrawSurface`], or clears the
//!    destination when the slot is still empty.
//!
//! [`FrameEngine`] ties these together behind an explicit event interface (`on_resize`,
//! `on_scroll`, `poll_loads`, `on_animation_frame`) so that any host can wire real event
//! sources to it. Frame arrivals between two display ticks collapse into one redraw.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded engine**: only fetch and decode leave the engine thread.
//! - **No errors from handlers**: failures are logged through `tracing` and the handler
//!   becomes a no-op.
//! - **Premultiplied RGBA8** end-to-end in the CPU surface.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod engine;
mod foundation;
mod layout;
mod mapping;
mod render;
mod sequence;

pub use assets::decode::{PreparedImage, decode_image};
pub use assets::fetch::{FrameFetcher, FsFetcher, MemoryFetcher, normalize_rel_path};
pub use engine::trigger::{EngineStats, FrameEngine};
pub use foundation::core::{Affine, ElementBox, Rect, Size, Vec2};
pub use foundation::error::{
    LayoutError, LoadError, LoadErrorKind, ScrollSeqError, ScrollSeqResult,
};
pub use layout::sampler::{LayoutHost, LayoutSample, StaticLayoutHost, sample};
pub use mapping::mapper::{frame_index, scroll_progress};
pub use render::compositor::{DrawOutcome, cover_fit, draw};
pub use render::cpu::CpuSurface;
pub use render::surface::{DrawCommand, DrawSurface, RecordingSurface};
pub use sequence::config::SequenceConfig;
pub use sequence::loader::{LoadProgress, LoadReport, Loader, load_frame};
pub use sequence::store::{DecodedFrame, FrameHandle, FrameSequence};

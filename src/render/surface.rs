use crate::{
    foundation::core::Rect, foundation::error::ScrollSeqResult, sequence::store::DecodedFrame,
};

/// Drawing target borrowed by the engine for the duration of one event.
///
/// Coordinates passed to [`DrawSurface::clear_rect`] and [`DrawSurface::draw_frame`] are CSS
/// pixels; the surface maps them to its backing store using the ratio set by the most recent
/// [`DrawSurface::configure`].
pub trait DrawSurface {
    /// Resize the backing store to `width` x `height` device pixels and reset the coordinate
    /// scale to `pixel_ratio`. Called before any draw that follows a layout change.
    fn configure(&mut self, width: u32, height: u32, pixel_ratio: f64) -> ScrollSeqResult<()>;

    /// Make `rect` transparent.
    fn clear_rect(&mut self, rect: Rect) -> ScrollSeqResult<()>;

    /// Blit `frame` stretched to `dest`.
    fn draw_frame(&mut self, frame: &DecodedFrame, dest: Rect) -> ScrollSeqResult<()>;
}

/// One call received by a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// [`DrawSurface::configure`].
    Configure {
        /// Backing width.
        width: u32,
        /// Backing height.
        height: u32,
        /// Coordinate scale.
        pixel_ratio: f64,
    },
    /// [`DrawSurface::clear_rect`].
    Clear(Rect),
    /// [`DrawSurface::draw_frame`].
    Draw {
        /// Decoded size of the frame that was drawn.
        frame_size: (u32, u32),
        /// Destination in CSS pixels.
        dest: Rect,
    },
}

/// Surface that keeps a log of calls instead of rasterizing.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded calls, oldest first.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the log, leaving it empty.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Most recent clear or draw.
    pub fn last_paint(&self) -> Option<&DrawCommand> {
        self.commands
            .iter()
            .rev()
            .find(|c| !matches!(c, DrawCommand::Configure { .. }))
    }
}

impl DrawSurface for RecordingSurface {
    fn configure(&mut self, width: u32, height: u32, pixel_ratio: f64) -> ScrollSeqResult<()> {
        self.commands.push(DrawCommand::Configure {
            width,
            height,
            pixel_ratio,
        });
        Ok(())
    }

    fn clear_rect(&mut self, rect: Rect) -> ScrollSeqResult<()> {
        self.commands.push(DrawCommand::Clear(rect));
        Ok(())
    }

    fn draw_frame(&mut self, frame: &DecodedFrame, dest: Rect) -> ScrollSeqResult<()> {
        self.commands.push(DrawCommand::Draw {
            frame_size: (frame.width, frame.height),
            dest,
        });
        Ok(())
    }
}

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    assets::fetch::FrameFetcher,
    engine::scheduler::RedrawScheduler,
    foundation::error::{ScrollSeqError, ScrollSeqResult},
    layout::sampler::{LayoutHost, LayoutSample, sample},
    mapping::mapper::frame_index,
    render::{
        compositor::{DrawOutcome, draw},
        surface::DrawSurface,
    },
    sequence::{
        config::SequenceConfig,
        loader::{LoadChannel, LoadEvent, LoadProgress, LoadReport, Loader},
        store::{FrameHandle, FrameSequence},
    },
};

/// Counters accumulated over the engine's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct EngineStats {
    /// Frames blitted to the surface.
    pub draws: u64,
    /// Draws that found their slot empty and cleared instead.
    pub clears: u64,
    /// Draw requests that left the surface untouched (unchanged state or zero-area surface).
    pub skipped: u64,
    /// Frames stored after a successful load.
    pub frames_loaded: u64,
    /// Frames whose load failed.
    pub load_failures: u64,
    /// Scheduled redraws superseded or cancelled before they ran.
    pub redraws_cancelled: u64,
}

type ProgressCallback = Box<dyn FnMut(LoadProgress)>;

/// Everything that determines what the last draw put on the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
struct DrawnState {
    index: Option<usize>,
    available: bool,
    layout: LayoutSample,
}

/// Scroll-synchronized frame engine.
///
/// The engine owns the configuration, the frame slots and the current layout sample. The host
/// owns the event sources and the drawing surface, and forwards events to the handlers:
///
/// - [`FrameEngine::on_resize`] re-measures the layout and redraws unconditionally.
/// - [`FrameEngine::on_scroll`] maps the new offset to a frame and redraws if anything changed.
/// - [`FrameEngine::poll_loads`] stores finished loads and schedules one coalesced redraw.
/// - [`FrameEngine::on_animation_frame`] runs the scheduled redraw, if any.
///
/// Handlers never return errors. Failures are logged and the handler becomes a no-op.
pub struct FrameEngine {
    config: SequenceConfig,
    frames: FrameSequence,
    layout: Option<LayoutSample>,
    scroll_offset: f64,
    last_drawn: Option<DrawnState>,
    redraw: RedrawScheduler,
    loads: Option<LoadChannel>,
    loads_started: bool,
    progress: LoadProgress,
    on_progress: Option<ProgressCallback>,
    stats: EngineStats,
    detached: bool,
}

impl std::fmt::Debug for FrameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameEngine")
            .field("frames", &self.frames.len())
            .field("occupied", &self.frames.occupied())
            .field("layout", &self.layout)
            .field("scroll_offset", &self.scroll_offset)
            .field("redraw_pending", &self.redraw.is_pending())
            .field("progress", &self.progress)
            .field("detached", &self.detached)
            .finish()
    }
}

impl FrameEngine {
    /// Validate `config` and build an engine with every slot empty.
    pub fn new(config: SequenceConfig) -> ScrollSeqResult<Self> {
        config.validate()?;
        let frames = FrameSequence::new(config.forward_len(), config.concat_reverse);
        Ok(Self {
            config,
            frames,
            layout: None,
            scroll_offset: 0.0,
            last_drawn: None,
            redraw: RedrawScheduler::new(),
            loads: None,
            loads_started: false,
            progress: LoadProgress::default(),
            on_progress: None,
            stats: EngineStats::default(),
            detached: false,
        })
    }

    /// Register a callback invoked with updated totals after every load completion.
    pub fn with_progress_callback(mut self, f: impl FnMut(LoadProgress) + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Issue one load per configured URL on `loader`'s pool.
    ///
    /// Results are picked up by [`FrameEngine::poll_loads`] or [`FrameEngine::wait_for_loads`].
    /// Loads can only be started once per engine.
    #[tracing::instrument(skip(self, loader, fetcher))]
    pub fn start_loading(
        &mut self,
        loader: &Loader,
        fetcher: Arc<dyn FrameFetcher>,
    ) -> ScrollSeqResult<()> {
        if self.detached {
            return Err(ScrollSeqError::validation("engine is detached"));
        }
        if self.loads_started {
            return Err(ScrollSeqError::validation("frame loads already started"));
        }
        let channel = loader.spawn_all(&self.config.urls, fetcher);
        self.progress = LoadProgress {
            loaded: 0,
            failed: 0,
            total: channel.total(),
        };
        tracing::info!(total = channel.total(), "issued frame loads");
        self.loads = Some(channel);
        self.loads_started = true;
        Ok(())
    }

    /// First layout pass: equivalent to a resize.
    pub fn attach(&mut self, host: &dyn LayoutHost, surface: &mut dyn DrawSurface) {
        tracing::debug!("attaching engine");
        self.on_resize(host, surface);
    }

    /// Re-measure the layout, reconfigure the surface and redraw.
    ///
    /// On a layout error the previous sample is kept and nothing is drawn.
    #[tracing::instrument(skip(self, host, surface))]
    pub fn on_resize(&mut self, host: &dyn LayoutHost, surface: &mut dyn DrawSurface) {
        if self.detached {
            return;
        }
        let layout = match sample(host, &self.config) {
            Ok(layout) => layout,
            Err(e) => {
                tracing::warn!(error = %e, "layout sampling failed, keeping previous layout");
                return;
            }
        };
        let (width, height) = layout.backing_size();
        if let Err(e) = surface.configure(width, height, layout.pixel_ratio) {
            tracing::warn!(error = %e, width, height, "surface configure failed");
            return;
        }
        tracing::debug!(
            width,
            height,
            pixel_ratio = layout.pixel_ratio,
            animation_distance = layout.animation_distance,
            "layout sampled"
        );
        self.layout = Some(layout);
        self.render(surface, true);
    }

    /// Record the new scroll offset and draw the frame it maps to.
    pub fn on_scroll(&mut self, scroll_offset: f64, surface: &mut dyn DrawSurface) {
        if self.detached {
            return;
        }
        self.scroll_offset = scroll_offset;
        self.render(surface, false);
    }

    /// Display refresh tick. Runs the pending redraw, if one is scheduled, as a scroll to the
    /// last known offset. Returns `true` when a redraw was due.
    pub fn on_animation_frame(&mut self, surface: &mut dyn DrawSurface) -> bool {
        if self.detached || self.redraw.take_due().is_none() {
            return false;
        }
        self.render(surface, false);
        true
    }

    /// Store every load result that has arrived so far, without blocking.
    pub fn poll_loads(&mut self) -> LoadReport {
        let mut report = LoadReport::default();
        if !self.detached {
            while let Some(ev) = self.loads.as_ref().and_then(LoadChannel::try_next) {
                self.apply_load(ev, &mut report);
            }
        }
        report.progress = self.progress;
        report
    }

    /// Store load results until every frame has settled or `timeout` elapses.
    pub fn wait_for_loads(&mut self, timeout: Duration) -> LoadReport {
        let deadline = Instant::now() + timeout;
        let mut report = LoadReport::default();
        while !self.detached && !self.progress.is_settled() {
            let Some(ev) = self.loads.as_ref().and_then(|c| c.next_before(deadline)) else {
                break;
            };
            self.apply_load(ev, &mut report);
        }
        if !self.progress.is_settled() {
            tracing::warn!(pending = self.progress.pending(), "frame loads still pending");
        }
        report.progress = self.progress;
        report
    }

    /// Stop handling events: cancel the pending redraw and drop the load receiver so late
    /// results are discarded by the workers.
    pub fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.redraw.cancel();
        self.loads = None;
        self.detached = true;
        tracing::debug!("engine detached");
    }

    /// `true` after [`FrameEngine::detach`].
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// `true` while a coalesced redraw waits for the next tick.
    pub fn redraw_pending(&self) -> bool {
        self.redraw.is_pending()
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    /// Frame slots.
    pub fn frames(&self) -> &FrameSequence {
        &self.frames
    }

    /// Latest successful layout sample.
    pub fn layout(&self) -> Option<&LayoutSample> {
        self.layout.as_ref()
    }

    /// Last offset passed to [`FrameEngine::on_scroll`].
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Slot the current offset maps to, once a layout exists.
    pub fn current_frame_index(&self) -> Option<usize> {
        let layout = self.layout.as_ref()?;
        frame_index(self.scroll_offset, layout, self.frames.len())
    }

    /// Load totals so far.
    pub fn progress(&self) -> LoadProgress {
        self.progress
    }

    /// Lifetime counters.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            redraws_cancelled: self.redraw.cancelled(),
            ..self.stats
        }
    }

    pub(crate) fn apply_load(&mut self, ev: LoadEvent, report: &mut LoadReport) {
        match ev.result {
            Ok(handle) => {
                if !self.frames.set_frame(ev.index, handle) {
                    return;
                }
                self.progress.loaded += 1;
                self.stats.frames_loaded += 1;
                report.loaded.push(ev.index);
                self.redraw.schedule();
            }
            Err(e) => {
                tracing::warn!(
                    index = e.index,
                    url = %e.url,
                    kind = %e.kind,
                    error = %e.message,
                    "frame failed to load"
                );
                self.progress.failed += 1;
                self.stats.load_failures += 1;
                report.failures.push(e);
                // The last failure can be what releases a held-back sequence.
                if self.config.wait_for_all && self.progress.is_settled() {
                    self.redraw.schedule();
                }
            }
        }
        if let Some(cb) = self.on_progress.as_mut() {
            cb(self.progress);
        }
    }

    fn visible_frame(&self, index: usize) -> Option<FrameHandle> {
        if self.config.wait_for_all && !self.progress.is_settled() {
            return None;
        }
        self.frames.frame_at(index).cloned()
    }

    fn render(&mut self, surface: &mut dyn DrawSurface, force: bool) {
        let Some(layout) = self.layout else {
            tracing::debug!("no layout yet, not drawing");
            return;
        };
        let index = frame_index(self.scroll_offset, &layout, self.frames.len());
        let frame = index.and_then(|i| self.visible_frame(i));
        let state = DrawnState {
            index,
            available: frame.is_some(),
            layout,
        };
        if !force && self.last_drawn == Some(state) {
            self.stats.skipped += 1;
            tracing::debug!(?index, "frame unchanged, skipping draw");
            return;
        }

        match draw(
            surface,
            frame.as_deref(),
            &layout,
            self.config.intrinsic_width,
            self.config.intrinsic_height,
        ) {
            Ok(DrawOutcome::Drawn { dest }) => {
                self.stats.draws += 1;
                tracing::debug!(?index, ?dest, "drew frame");
            }
            Ok(DrawOutcome::Cleared { dest }) => {
                self.stats.clears += 1;
                tracing::debug!(?index, ?dest, "frame not loaded, cleared");
            }
            Ok(DrawOutcome::Skipped) => {
                self.stats.skipped += 1;
                tracing::debug!("surface has no area, nothing drawn");
            }
            Err(e) => {
                tracing::warn!(error = %e, ?index, "draw failed");
                self.last_drawn = None;
                return;
            }
        }
        self.last_drawn = Some(state);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/trigger.rs"]
mod tests;

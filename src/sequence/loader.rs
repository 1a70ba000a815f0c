use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, mpsc},
    time::Instant,
};

use crate::{
    assets::{decode::decode_image, fetch::FrameFetcher},
    foundation::error::{LoadError, LoadErrorKind, ScrollSeqError, ScrollSeqResult},
    sequence::store::{DecodedFrame, FrameHandle},
};

/// Outcome of one frame load, delivered to the engine thread.
#[derive(Debug)]
pub(crate) struct LoadEvent {
    pub(crate) index: usize,
    pub(crate) result: Result<FrameHandle, LoadError>,
}

/// Running totals of load completions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadProgress {
    /// Frames decoded and stored.
    pub loaded: usize,
    /// Frames that failed to fetch or decode.
    pub failed: usize,
    /// Frames requested.
    pub total: usize,
}

impl LoadProgress {
    /// Frames still outstanding.
    pub fn pending(self) -> usize {
        self.total.saturating_sub(self.loaded + self.failed)
    }

    /// `true` when nothing is outstanding.
    pub fn is_settled(self) -> bool {
        self.pending() == 0
    }

    /// Completed fraction in `[0, 1]`; an empty request counts as done.
    pub fn ratio(self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.loaded + self.failed) as f64 / self.total as f64
    }
}

/// What a single drain of the load channel produced.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Forward indices stored during this drain, in arrival order.
    pub loaded: Vec<usize>,
    /// Failures reported during this drain.
    pub failures: Vec<LoadError>,
    /// Totals after this drain.
    pub progress: LoadProgress,
}

impl LoadReport {
    /// `true` when the drain saw no completions at all.
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty() && self.failures.is_empty()
    }
}

/// Worker pool that fetches and decodes frames off the engine thread.
#[derive(Clone)]
pub struct Loader {
    pool: Arc<rayon::ThreadPool>,
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

impl Loader {
    /// Build a loader with `threads` workers, or rayon's default when `None`.
    pub fn new(threads: Option<usize>) -> ScrollSeqResult<Self> {
        Ok(Self {
            pool: Arc::new(build_thread_pool(threads)?),
        })
    }

    /// Issue one independent task per URL. Results arrive on the returned channel in
    /// completion order.
    pub(crate) fn spawn_all(
        &self,
        urls: &[String],
        fetcher: Arc<dyn FrameFetcher>,
    ) -> LoadChannel {
        let (tx, rx) = mpsc::channel::<LoadEvent>();
        for (index, url) in urls.iter().enumerate() {
            let tx = tx.clone();
            let fetcher = Arc::clone(&fetcher);
            let url = url.clone();
            self.pool.spawn(move || {
                let result = load_frame(fetcher.as_ref(), index, &url);
                if tx.send(LoadEvent { index, result }).is_err() {
                    tracing::trace!(index, url = %url, "engine gone, discarding frame");
                }
            });
        }
        LoadChannel {
            rx,
            total: urls.len(),
        }
    }
}

/// Fetch and decode one frame.
///
/// A panic in the fetcher or the decoder is caught and reported as a failure of this frame
/// only, so the slot stays empty and the batch still settles.
pub fn load_frame(
    fetcher: &dyn FrameFetcher,
    index: usize,
    url: &str,
) -> Result<FrameHandle, LoadError> {
    let bytes = isolate_panic(index, url, LoadErrorKind::Fetch, || {
        fetcher.fetch(index, url)
    })?;
    let decoded = isolate_panic(index, url, LoadErrorKind::Decode, || {
        decode_image(&bytes)
            .and_then(|img| DecodedFrame::from_prepared(&img))
            .map_err(|e| LoadError::new(index, url, LoadErrorKind::Decode, e.to_string()))
    })?;
    Ok(Arc::new(decoded))
}

fn isolate_panic<T>(
    index: usize,
    url: &str,
    kind: LoadErrorKind,
    f: impl FnOnce() -> Result<T, LoadError>,
) -> Result<T, LoadError> {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let msg = panic_message(payload.as_ref());
        tracing::error!(index, url, %kind, panic = %msg, "frame loader panicked");
        Err(LoadError::new(index, url, kind, format!("panicked: {msg}")))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Receiving side of an issued batch of loads.
pub(crate) struct LoadChannel {
    rx: mpsc::Receiver<LoadEvent>,
    total: usize,
}

impl LoadChannel {
    pub(crate) fn total(&self) -> usize {
        self.total
    }

    pub(crate) fn try_next(&self) -> Option<LoadEvent> {
        self.rx.try_recv().ok()
    }

    /// Block until the next completion or `deadline`. `None` on timeout or when every
    /// worker has finished.
    pub(crate) fn next_before(&self, deadline: Instant) -> Option<LoadEvent> {
        let remaining = deadline.checked_duration_since(Instant::now())?;
        self.rx.recv_timeout(remaining).ok()
    }
}

fn build_thread_pool(threads: Option<usize>) -> ScrollSeqResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ScrollSeqError::validation(
            "loader 'threads' must be >= 1 when set",
        ));
    }
    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("scrollseq-load-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ScrollSeqError::validation(format!("failed to build loader pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/loader.rs"]
mod tests;

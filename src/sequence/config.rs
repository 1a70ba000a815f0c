use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;

use crate::foundation::error::{ScrollSeqError, ScrollSeqResult};

/// Immutable description of one scroll-driven image sequence.
///
/// Every frame shares the same intrinsic size; the compositor uses these dimensions (not the
/// decoded image's) so that the destination rectangle is stable before any frame has arrived.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SequenceConfig {
    /// Ordered frame source locations.
    pub urls: Vec<String>,
    /// Intrinsic frame width in pixels.
    pub intrinsic_width: f64,
    /// Intrinsic frame height in pixels.
    pub intrinsic_height: f64,
    /// Selector of the drawing target element.
    pub surface_selector: String,
    /// Selector of the element whose height defines the scroll range.
    pub scene_selector: String,
    /// Pixels excluded from the scroll range at its start.
    #[serde(default)]
    pub padding_start: f64,
    /// Pixels excluded from the scroll range at its end.
    #[serde(default)]
    pub padding_end: f64,
    /// Append the sequence reversed after the forward sequence.
    #[serde(default)]
    pub concat_reverse: bool,
    /// Draw nothing until every frame has either loaded or failed.
    #[serde(default)]
    pub wait_for_all: bool,
}

impl SequenceConfig {
    /// Build a config with zero padding and forward-only playback.
    pub fn new(
        urls: Vec<String>,
        intrinsic_width: f64,
        intrinsic_height: f64,
        surface_selector: impl Into<String>,
        scene_selector: impl Into<String>,
    ) -> Self {
        Self {
            urls,
            intrinsic_width,
            intrinsic_height,
            surface_selector: surface_selector.into(),
            scene_selector: scene_selector.into(),
            padding_start: 0.0,
            padding_end: 0.0,
            concat_reverse: false,
            wait_for_all: false,
        }
    }

    /// Set start/end padding.
    pub fn with_padding(mut self, start: f64, end: f64) -> Self {
        self.padding_start = start;
        self.padding_end = end;
        self
    }

    /// Enable or disable mirrored-reversal concatenation.
    pub fn with_concat_reverse(mut self, on: bool) -> Self {
        self.concat_reverse = on;
        self
    }

    /// Enable or disable all-or-nothing drawing.
    pub fn with_wait_for_all(mut self, on: bool) -> Self {
        self.wait_for_all = on;
        self
    }

    /// Read and validate a JSON config file.
    pub fn from_json_path(path: impl AsRef<Path>) -> ScrollSeqResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| ScrollSeqError::serde(format!("parse '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Expand a numbered file pattern into a URL list.
    ///
    /// `{index}` is replaced by the plain number, `{index:NN}` by the number zero-padded to
    /// `NN` digits. Numbering starts at `first`.
    pub fn urls_from_pattern(
        pattern: &str,
        first: usize,
        count: usize,
    ) -> ScrollSeqResult<Vec<String>> {
        let (head, width, tail) = split_index_placeholder(pattern)?;
        let end = first.checked_add(count).ok_or_else(|| {
            ScrollSeqError::validation(format!("frame numbers {first}+{count} overflow usize"))
        })?;
        Ok((first..end)
            .map(|n| format!("{head}{n:0width$}{tail}"))
            .collect())
    }

    /// Forward (unmirrored) sequence length.
    pub fn forward_len(&self) -> usize {
        self.urls.len()
    }

    /// Total slot count, including the mirrored half when enabled.
    pub fn sequence_len(&self) -> usize {
        if self.concat_reverse {
            self.urls.len() * 2
        } else {
            self.urls.len()
        }
    }

    /// Check invariants the engine relies on.
    pub fn validate(&self) -> ScrollSeqResult<()> {
        if self.surface_selector.trim().is_empty() {
            return Err(ScrollSeqError::validation("surface_selector must be non-empty"));
        }
        if self.scene_selector.trim().is_empty() {
            return Err(ScrollSeqError::validation("scene_selector must be non-empty"));
        }
        for (name, v) in [
            ("intrinsic_width", self.intrinsic_width),
            ("intrinsic_height", self.intrinsic_height),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(ScrollSeqError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        for (name, v) in [
            ("padding_start", self.padding_start),
            ("padding_end", self.padding_end),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ScrollSeqError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if let Some(i) = self.urls.iter().position(|u| u.trim().is_empty()) {
            return Err(ScrollSeqError::validation(format!(
                "urls[{i}] must be non-empty"
            )));
        }
        Ok(())
    }
}

fn split_index_placeholder(pattern: &str) -> ScrollSeqResult<(&str, usize, &str)> {
    let start = pattern
        .find("{index")
        .ok_or_else(|| ScrollSeqError::validation("pattern must contain '{index}'"))?;
    let rest = &pattern[start + "{index".len()..];
    let close = rest
        .find('}')
        .ok_or_else(|| ScrollSeqError::validation("unterminated '{index' placeholder"))?;
    let inner = &rest[..close];
    let width = match inner.strip_prefix(':') {
        None if inner.is_empty() => 0,
        Some(digits) => digits.parse::<usize>().map_err(|_| {
            ScrollSeqError::validation(format!("invalid index width '{digits}'"))
        })?,
        None => {
            return Err(ScrollSeqError::validation(format!(
                "invalid index placeholder '{{index{inner}}}'"
            )));
        }
    };
    Ok((&pattern[..start], width, &rest[close + 1..]))
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/config.rs"]
mod tests;

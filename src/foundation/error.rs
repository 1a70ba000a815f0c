/// Convenience result type used across scrollseq.
pub type ScrollSeqResult<T> = Result<T, ScrollSeqError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum ScrollSeqError {
    /// Invalid user-provided configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// A single frame failed to fetch or decode.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// A reference element could not be measured.
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Errors raised by a drawing surface.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScrollSeqError {
    /// Build a [`ScrollSeqError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ScrollSeqError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ScrollSeqError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// What went wrong while loading one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// The bytes could not be fetched.
    Fetch,
    /// The bytes were fetched but are not a decodable image.
    Decode,
    /// The URL was refused before any IO happened (bad path, unknown scheme).
    Rejected,
}

impl std::fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Fetch => "fetch",
            Self::Decode => "decode",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Per-frame load failure. Never fatal: the slot stays empty.
#[derive(thiserror::Error, Debug, Clone)]
#[error("frame {index} ('{url}') {kind} failed: {message}")]
pub struct LoadError {
    /// Forward index of the frame in the configured URL list.
    pub index: usize,
    /// Source URL.
    pub url: String,
    /// Failure category.
    pub kind: LoadErrorKind,
    /// Human-readable cause.
    pub message: String,
}

impl LoadError {
    /// Build a load error for `url` at forward `index`.
    pub fn new(
        index: usize,
        url: impl Into<String>,
        kind: LoadErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            index,
            url: url.into(),
            kind,
            message: message.into(),
        }
    }
}

/// Failure to measure the reference elements for one layout cycle.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// The host could not resolve the selector to an element.
    #[error("element '{selector}' could not be resolved")]
    MissingElement {
        /// Selector that failed to resolve.
        selector: String,
    },

    /// The host returned a box that cannot be used (NaN, infinite or negative).
    #[error("element '{selector}' reported an invalid box {width}x{height}")]
    InvalidMeasurement {
        /// Selector of the measured element.
        selector: String,
        /// Reported width.
        width: f64,
        /// Reported height.
        height: f64,
    },
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

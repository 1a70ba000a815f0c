use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::foundation::error::{LoadError, LoadErrorKind, ScrollSeqError, ScrollSeqResult};

/// Source of encoded frame bytes.
///
/// Implementations are called from loader worker threads, once per frame, with no ordering
/// between calls. They must not assume they run on the engine's thread.
pub trait FrameFetcher: Send + Sync {
    /// Fetch the encoded bytes for `url`, the frame at forward position `index`.
    fn fetch(&self, index: usize, url: &str) -> Result<Vec<u8>, LoadError>;
}

/// Fetches frames from a directory on the local filesystem.
///
/// URLs are relative paths (an optional `file://` prefix is stripped) resolved under `root`.
#[derive(Clone, Debug)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    /// Resolve frame URLs under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory used when resolving relative URLs.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a frame URL to the file it refers to.
    pub fn resolve(&self, url: &str) -> ScrollSeqResult<PathBuf> {
        let rel = url.strip_prefix("file://").unwrap_or(url);
        let norm = normalize_rel_path(rel)?;
        Ok(self.root.join(Path::new(&norm)))
    }
}

impl FrameFetcher for FsFetcher {
    fn fetch(&self, index: usize, url: &str) -> Result<Vec<u8>, LoadError> {
        let path = self
            .resolve(url)
            .map_err(|e| LoadError::new(index, url, LoadErrorKind::Rejected, e.to_string()))?;
        std::fs::read(&path).map_err(|e| {
            LoadError::new(
                index,
                url,
                LoadErrorKind::Fetch,
                format!("read '{}': {e}", path.display()),
            )
        })
    }
}

/// In-memory frame source keyed by URL.
#[derive(Clone, Debug, Default)]
pub struct MemoryFetcher {
    entries: HashMap<String, Arc<Vec<u8>>>,
}

impl MemoryFetcher {
    /// Empty fetcher; every fetch fails until bytes are inserted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded bytes under `url`.
    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(url.into(), Arc::new(bytes));
    }

    /// Builder form of [`MemoryFetcher::insert`].
    pub fn with(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(url, bytes);
        self
    }
}

impl FrameFetcher for MemoryFetcher {
    fn fetch(&self, index: usize, url: &str) -> Result<Vec<u8>, LoadError> {
        self.entries
            .get(url)
            .map(|b| b.as_ref().clone())
            .ok_or_else(|| LoadError::new(index, url, LoadErrorKind::Fetch, "no such entry"))
    }
}

/// Normalize a relative frame path to `/`-separated segments.
///
/// `.` segments and repeated separators are dropped. Absolute paths (including Windows drive
/// prefixes), `..` segments and paths without a file name are rejected.
pub fn normalize_rel_path(source: &str) -> ScrollSeqResult<String> {
    let unified = source.replace('\\', "/");
    let has_drive = unified.as_bytes().get(1) == Some(&b':')
        && unified.as_bytes().first().is_some_and(u8::is_ascii_alphabetic);
    if unified.starts_with('/') || has_drive {
        return Err(ScrollSeqError::validation(format!(
            "frame path '{source}' must be relative"
        )));
    }

    let segments = unified
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .map(|seg| {
            if seg == ".." {
                Err(ScrollSeqError::validation(format!(
                    "frame path '{source}' escapes its root"
                )))
            } else {
                Ok(seg)
            }
        })
        .collect::<ScrollSeqResult<Vec<_>>>()?;

    if segments.is_empty() {
        return Err(ScrollSeqError::validation(format!(
            "frame path '{source}' has no file name"
        )));
    }
    Ok(segments.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;

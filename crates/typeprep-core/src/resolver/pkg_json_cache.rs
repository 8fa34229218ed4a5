//! Package.json parse cache.
//!
//! Parsed manifests are memoized for one resolution pass. Entries carry an
//! mtime/size stamp so a manifest rewritten mid-pass is read again.

use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// File stamp for cache invalidation.
#[derive(Debug, Clone, Default)]
pub struct PkgJsonStamp {
    /// Modification time in milliseconds since epoch.
    pub mtime_ms: Option<u64>,
    /// File size in bytes.
    pub size: Option<u64>,
}

impl PkgJsonStamp {
    /// Create stamp from a path by reading its metadata.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_path(path: &Path) -> Self {
        if let Ok(meta) = path.metadata() {
            let mtime_ms = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as u64);
            Self {
                mtime_ms,
                size: Some(meta.len()),
            }
        } else {
            Self::default()
        }
    }

    /// Check if the stamp matches the current file state.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        let current = Self::from_path(path);
        if current.size.is_none() {
            return false;
        }

        if self.mtime_ms.is_some() && self.mtime_ms != current.mtime_ms {
            return false;
        }

        self.size.is_none() || self.size == current.size
    }
}

/// Trait for caching parsed package.json files.
///
/// Shared across rayon workers, so implementations must be `Send + Sync`.
pub trait PkgJsonCache: Send + Sync + std::fmt::Debug {
    /// Look up a cached package.json by path.
    ///
    /// Returns None if not cached or if the stamp is invalid.
    fn get(&self, path: &Path) -> Option<Value>;

    /// Store a parsed package.json in the cache.
    fn set(&self, path: &Path, value: Value);
}

/// No-op cache implementation (always misses, never stores).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPkgJsonCache;

impl PkgJsonCache for NoPkgJsonCache {
    fn get(&self, _path: &Path) -> Option<Value> {
        None
    }

    fn set(&self, _path: &Path, _value: Value) {}
}

#[derive(Debug)]
struct CachedPkgJson {
    value: Value,
    stamp: PkgJsonStamp,
}

/// In-memory cache with mtime/size invalidation.
#[derive(Debug, Default)]
pub struct MemoryPkgJsonCache {
    entries: RwLock<HashMap<PathBuf, CachedPkgJson>>,
}

impl MemoryPkgJsonCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached manifests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PkgJsonCache for MemoryPkgJsonCache {
    fn get(&self, path: &Path) -> Option<Value> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(path)?;

        entry.stamp.matches(path).then(|| entry.value.clone())
    }

    fn set(&self, path: &Path, value: Value) {
        let stamp = PkgJsonStamp::from_path(path);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(path.to_path_buf(), CachedPkgJson { value, stamp });
    }
}

//! Persistent per-file block cache.
//!
//! One JSON file holds every entry, keyed by absolute path. The store is
//! loaded once before a scan, shared by all workers, and flushed once after.
//! Reads take a shared lock; `put` takes the single writer lock.
//!
//! ## Module Structure
//!
//! - `error`: `CacheError`
//! - `fingerprint`: size / mtime / content hash / pattern-set version

use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::core::types::{CommentBlock, ScanWarning};

pub mod error;
pub mod fingerprint;

pub use error::{CacheError, CacheResult};
pub use fingerprint::Fingerprint;

pub const FORMAT_VERSION: u32 = 1;

/// Blocks extracted from one file, valid for exactly one fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub file_path: String,
    pub fingerprint: Fingerprint,
    pub blocks: Vec<CommentBlock>,
}

/// On-disk shape. Entries stay raw until each one is decoded on its own.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheFile {
    format_version: u32,
    #[serde(default)]
    entries: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug)]
pub struct CacheStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, CacheEntry>>,
    dirty: AtomicBool,
    discarded: usize,
}

impl CacheStore {
    /// An empty store that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: RwLock::new(BTreeMap::new()),
            dirty: AtomicBool::new(false),
            discarded: 0,
        }
    }

    /// Load the store at `path`. A missing file is an empty cache.
    ///
    /// Entries that fail to decode are dropped one by one and counted in
    /// [`CacheStore::discarded`]; the rest stay usable.
    pub fn load(path: impl Into<PathBuf>) -> CacheResult<Self> {
        let path = path.into();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::empty(path)),
            Err(e) => return Err(e.into()),
        };

        let file: CacheFile =
            serde_json::from_str(&content).map_err(|e| CacheError::Corrupted(e.to_string()))?;
        if file.format_version != FORMAT_VERSION {
            return Err(CacheError::VersionMismatch {
                found: file.format_version,
                expected: FORMAT_VERSION,
            });
        }

        let total = file.entries.len();
        let entries: BTreeMap<String, CacheEntry> = file
            .entries
            .into_iter()
            .filter_map(|(key, raw)| {
                serde_json::from_value::<CacheEntry>(raw)
                    .ok()
                    .map(|entry| (key, entry))
            })
            .collect();
        let discarded = total - entries.len();

        Ok(Self {
            path,
            entries: RwLock::new(entries),
            dirty: AtomicBool::new(discarded > 0),
            discarded,
        })
    }

    /// Load the store, falling back to an empty cache on any failure.
    pub fn load_or_empty(path: impl Into<PathBuf>) -> (Self, Option<ScanWarning>) {
        let path = path.into();
        match Self::load(&path) {
            Ok(store) if store.discarded > 0 => {
                let warning = ScanWarning::new(
                    path.display().to_string(),
                    format!("dropped {} malformed cache entries", store.discarded),
                );
                (store, Some(warning))
            }
            Ok(store) => (store, None),
            Err(e) => {
                let warning = ScanWarning::new(
                    path.display().to_string(),
                    format!("{}; starting with an empty cache", e),
                );
                // The unusable file gets overwritten on the next flush.
                let store = Self::empty(path);
                store.dirty.store(true, Ordering::Relaxed);
                (store, Some(warning))
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries dropped while loading because they could not be decoded.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Cached blocks for `key`, only if the stored fingerprint matches exactly.
    pub fn get(&self, key: &str, fingerprint: &Fingerprint) -> Option<Vec<CommentBlock>> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|entry| entry.fingerprint == *fingerprint)
            .map(|entry| entry.blocks.clone())
    }

    /// Insert or wholesale replace the entry for `key`.
    pub fn put(&self, key: impl Into<String>, entry: CacheEntry) {
        self.entries.write().insert(key.into(), entry);
        self.dirty.store(true, Ordering::Relaxed);
    }

    /// Drop entries whose file no longer exists. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| Path::new(key).exists());
        let removed = before - entries.len();
        if removed > 0 {
            self.dirty.store(true, Ordering::Relaxed);
        }
        removed
    }

    /// Prune, then write the store to disk if anything changed.
    ///
    /// The file is written to a sibling temp file and renamed into place so a
    /// crash never leaves a half-written cache.
    pub fn flush(&self) -> CacheResult<()> {
        self.prune();
        if !self.dirty.load(Ordering::Relaxed) {
            return Ok(());
        }

        let content = {
            let entries = self.entries.read();
            let file = CacheFileRef {
                format_version: FORMAT_VERSION,
                entries: &*entries,
            };
            serde_json::to_string(&file).map_err(|e| CacheError::Serialization(e.to_string()))?
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        self.dirty.store(false, Ordering::Relaxed);
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CacheFileRef<'a> {
    format_version: u32,
    entries: &'a BTreeMap<String, CacheEntry>,
}

//! File fingerprints: the identity a cache entry is valid for.

use std::{fs::Metadata, time::SystemTime};

use serde::{Deserialize, Serialize};

/// Size, modification time and blake3 content hash of a file, tied to the
/// pattern set that produced its blocks. Any field differing is a miss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fingerprint {
    pub size: u64,
    pub mtime_ns: u64,
    pub content_hash: String,
    pub pattern_set_version: String,
}

impl Fingerprint {
    /// Fingerprint already-read file content.
    pub fn compute(bytes: &[u8], metadata: Option<&Metadata>, pattern_set_version: &str) -> Self {
        Self {
            size: bytes.len() as u64,
            mtime_ns: metadata.map(mtime_ns).unwrap_or(0),
            content_hash: content_hash(bytes),
            pattern_set_version: pattern_set_version.to_string(),
        }
    }
}

pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

fn mtime_ns(metadata: &Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache file is corrupted: {0}")]
    Corrupted(String),

    #[error("cache format version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("cannot serialize cache: {0}")]
    Serialization(String),

    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

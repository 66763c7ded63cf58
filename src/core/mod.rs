//! Comment extraction engine.
//!
//! A scan runs as a pipeline:
//!
//! 1. **Walk** (`walker`): enumerate candidate files under the root
//! 2. **Extract** (`pool`): per file, serve blocks from `cache` or run the
//!    `tokenizer` and `grouper` (optionally `symbol`) on a worker pool
//! 3. **Report** (`filter`, `stats`): narrow and summarize the sorted result
//!
//! ## Module Structure
//!
//! - `types`: occurrences, blocks, file errors, scan result
//! - `registry`: per-extension comment rules and their sources
//! - `tokenizer`: line-oriented comment state machine
//! - `grouper`: merges adjacent single-line comments into blocks
//! - `symbol`: enclosing declaration lookup
//! - `cache`: fingerprinted on-disk block cache
//! - `walker`: depth-limited directory traversal and explicit file inputs
//! - `pool`: bounded worker pool and cancellation
//! - `filter`: kind/extension/content/size filters and fail markers
//! - `stats`: aggregate statistics for `--summary`
//! - `context`: `ScanContext`, the resolved settings for one run

pub mod cache;
pub mod context;
pub mod filter;
pub mod grouper;
pub mod pool;
pub mod registry;
pub mod stats;
pub mod symbol;
pub mod tokenizer;
pub mod types;
pub mod walker;

pub use context::ScanContext;
pub use types::{
    CommentBlock, CommentKind, CommentOccurrence, FileError, FileErrorReason, ScanResult,
    ScanStats, ScanWarning,
};

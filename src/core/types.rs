//! Data types shared by every stage of the extraction pipeline.
//!
//! Occurrences are produced by the tokenizer and consumed by the grouper.
//! Blocks, file errors and the aggregated [`ScanResult`] form the engine's
//! output contract and are what the CLI reports and the cache persists.

use serde::{Deserialize, Serialize};

/// Whether a comment rule (and everything it produces) is line- or span-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentKind {
    /// Marker runs to the end of the line: `// ...`, `# ...`
    Single,
    /// Start/end marker pair: `/* ... */`, `<!-- ... -->`
    Multi,
}

impl std::fmt::Display for CommentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommentKind::Single => write!(f, "single"),
            CommentKind::Multi => write!(f, "multi"),
        }
    }
}

/// One raw comment match within a file, before grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentOccurrence {
    /// 1-based line of the opening marker.
    pub start_line: usize,
    /// 1-based line of the closing marker (or the last line if unterminated).
    pub end_line: usize,
    pub kind: CommentKind,
    pub raw_text: String,
    /// Byte offset of the opening marker within its line.
    pub column: usize,
    /// True when non-blank text precedes the marker on its start line.
    pub leading_code: bool,
    /// Multi-line comment still open at end of file.
    pub unterminated: bool,
}

impl CommentOccurrence {
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// A logical comment unit: a single multi-line occurrence, or a maximal run
/// of adjacent single-line occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentBlock {
    pub file_path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub kind: CommentKind,
    pub line_count: usize,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enclosing_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unterminated: bool,
}

impl CommentBlock {
    /// Lowercased extension of the file this block came from, without the dot.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

/// Why a file was excluded from the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum FileErrorReason {
    /// File could not be opened or read (permissions, I/O failure, walk error).
    Unreadable(String),
    /// An explicitly requested file does not exist.
    NotFound,
    /// File content is not valid UTF-8.
    Undecodable,
    /// An explicitly requested file has no registered comment rules.
    NoRules,
}

impl std::fmt::Display for FileErrorReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileErrorReason::Unreadable(detail) => write!(f, "unreadable: {}", detail),
            FileErrorReason::NotFound => write!(f, "file not found"),
            FileErrorReason::Undecodable => write!(f, "content is not valid UTF-8"),
            FileErrorReason::NoRules => write!(f, "no comment rules registered for extension"),
        }
    }
}

/// A per-file failure, collected instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub path: String,
    pub reason: FileErrorReason,
}

/// A non-fatal problem worth surfacing to the user (skipped rule source,
/// corrupted cache, failed cache flush).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanWarning {
    pub subject: String,
    pub message: String,
}

impl ScanWarning {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

/// Counters describing how a run was served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Files handed to workers (excludes cancelled tasks).
    pub files_scanned: usize,
    /// Files whose blocks came from the cache.
    pub cache_hits: usize,
    /// Files that went through the tokenizer.
    pub tokenized: usize,
    /// Tasks skipped because the run was cancelled.
    pub cancelled: usize,
}

/// Ordered aggregate of all blocks across all scanned files.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Sorted by file path, then start line.
    pub blocks: Vec<CommentBlock>,
    /// Sorted by path.
    pub errors: Vec<FileError>,
    pub warnings: Vec<ScanWarning>,
    pub stats: ScanStats,
}

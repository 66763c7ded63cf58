use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Result, bail};
use glob::{Pattern, glob};
use regex::Regex;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::core::{
    registry::{PatternRegistry, normalize_extension},
    types::{FileError, FileErrorReason},
};

/// How far below the root the walk descends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DepthRepr", into = "DepthRepr")]
pub enum Depth {
    /// `Limited(0)` scans the root directory only; `Limited(n)` goes n levels down.
    Limited(usize),
    Unbounded,
}

impl Default for Depth {
    fn default() -> Self {
        Depth::Limited(0)
    }
}

impl Depth {
    /// Equivalent `walkdir` max depth (the root itself is depth 0).
    fn max_walk_depth(self) -> Option<usize> {
        match self {
            Depth::Limited(n) => Some(n.saturating_add(1)),
            Depth::Unbounded => None,
        }
    }
}

impl FromStr for Depth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unbounded") {
            return Ok(Depth::Unbounded);
        }
        match s.parse::<usize>() {
            Ok(n) => Ok(Depth::Limited(n)),
            Err(_) => bail!(
                "Invalid depth '{}': expected a non-negative number or 'unbounded'",
                s
            ),
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Depth::Limited(n) => write!(f, "{}", n),
            Depth::Unbounded => write!(f, "unbounded"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DepthRepr {
    Number(usize),
    Word(String),
}

impl TryFrom<DepthRepr> for Depth {
    type Error = String;

    fn try_from(repr: DepthRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            DepthRepr::Number(n) => Ok(Depth::Limited(n)),
            DepthRepr::Word(w) => w.parse().map_err(|e: anyhow::Error| e.to_string()),
        }
    }
}

impl From<Depth> for DepthRepr {
    fn from(depth: Depth) -> Self {
        match depth {
            Depth::Limited(n) => DepthRepr::Number(n),
            Depth::Unbounded => DepthRepr::Word("unbounded".to_string()),
        }
    }
}

/// Candidate-file selection rules. Built once from the merged configuration.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Normalized extension allow-list; empty means every registered extension.
    pub extensions: Vec<String>,
    /// Lowercased substrings; a path containing any of them is excluded.
    pub ignore_substrings: Vec<String>,
    pub ignore_globs: Vec<Pattern>,
    pub ignore_regex: Option<Regex>,
    pub depth: Depth,
    /// Absolute paths never handed to workers (the cache file).
    pub skip: Vec<PathBuf>,
}

impl WalkOptions {
    /// Compile user-supplied exclusion settings. Invalid patterns are errors.
    pub fn new(
        extensions: &[String],
        ignore: &[String],
        ignore_patterns: &[String],
        ignore_regex: Option<&str>,
        depth: Depth,
    ) -> Result<Self> {
        let ignore_globs = ignore_patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| anyhow::anyhow!("Invalid ignore pattern '{}': {}", p, e))
            })
            .collect::<Result<Vec<_>>>()?;
        let ignore_regex = ignore_regex
            .map(|r| Regex::new(r).map_err(|e| anyhow::anyhow!("Invalid ignoreRegex '{}': {}", r, e)))
            .transpose()?;

        Ok(Self {
            extensions: extensions
                .iter()
                .map(|e| normalize_extension(e))
                .filter(|e| !e.is_empty())
                .collect(),
            ignore_substrings: ignore
                .iter()
                .filter(|s| !s.is_empty())
                .map(|s| s.to_lowercase())
                .collect(),
            ignore_globs,
            ignore_regex,
            depth,
            skip: Vec::new(),
        })
    }

    /// True if the root-relative path matches any exclusion.
    pub fn is_excluded(&self, relative: &str) -> bool {
        let lowered = relative.to_lowercase();
        self.ignore_substrings.iter().any(|s| lowered.contains(s))
            || self.ignore_globs.iter().any(|p| p.matches(relative))
            || self.ignore_regex.as_ref().is_some_and(|r| r.is_match(relative))
    }

    fn allows_extension(&self, extension: &str) -> bool {
        self.extensions.is_empty() || self.extensions.iter().any(|e| e == extension)
    }

    fn is_skipped(&self, path: &Path) -> bool {
        if self.skip.is_empty() {
            return false;
        }
        std::path::absolute(path).is_ok_and(|abs| self.skip.contains(&abs))
    }
}

/// One file handed to a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    /// Path used to open the file.
    pub path: PathBuf,
    /// Path shown to the user and stored on blocks.
    pub display: String,
    /// Normalized extension (rules lookup key).
    pub extension: String,
}

/// Files found plus per-file errors raised while finding them.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub files: Vec<FileTask>,
    pub errors: Vec<FileError>,
}

fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(normalize_extension)
}

fn display_path(path: &Path) -> String {
    path.strip_prefix(".")
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Walk `root` up to the configured depth, collecting scannable files.
pub fn walk(root: &Path, registry: &PatternRegistry, options: &WalkOptions) -> WalkOutcome {
    let mut outcome = WalkOutcome::default();

    let mut walker = WalkDir::new(root).sort_by_file_name();
    if let Some(max) = options.depth.max_walk_depth() {
        walker = walker.max_depth(max);
    }

    let entries = walker.into_iter().filter_entry(|entry| {
        if entry.depth() == 0 {
            return true;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        !options.is_excluded(&relative.to_string_lossy().replace('\\', "/"))
    });

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e
                    .path()
                    .map(display_path)
                    .unwrap_or_else(|| display_path(root));
                outcome.errors.push(FileError {
                    path,
                    reason: FileErrorReason::Unreadable(e.to_string()),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(extension) = file_extension(path) else {
            continue;
        };
        if !registry.contains(&extension) || !options.allows_extension(&extension) {
            continue;
        }
        if options.is_skipped(path) {
            continue;
        }

        outcome.files.push(FileTask {
            path: path.to_path_buf(),
            display: display_path(path),
            extension,
        });
    }

    outcome
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || (input.contains('[') && input.contains(']'))
}

/// Resolve explicit file inputs (paths or glob patterns) into tasks.
///
/// These replace the walk: depth and exclusions do not apply, the extension
/// allow-list does. Missing files and files without rules become errors.
pub fn explicit_files(
    inputs: &[String],
    registry: &PatternRegistry,
    options: &WalkOptions,
) -> WalkOutcome {
    let mut outcome = WalkOutcome::default();
    let mut seen = std::collections::HashSet::new();

    let mut candidates: Vec<PathBuf> = Vec::new();
    for input in inputs {
        if is_glob_pattern(input) {
            match glob(input) {
                Ok(paths) => {
                    for entry in paths {
                        match entry {
                            Ok(path) if path.is_file() => candidates.push(path),
                            Ok(_) => {}
                            Err(e) => outcome.errors.push(FileError {
                                path: display_path(e.path()),
                                reason: FileErrorReason::Unreadable(e.error().to_string()),
                            }),
                        }
                    }
                }
                Err(e) => outcome.errors.push(FileError {
                    path: input.clone(),
                    reason: FileErrorReason::Unreadable(format!("invalid glob pattern: {}", e)),
                }),
            }
        } else {
            candidates.push(PathBuf::from(input));
        }
    }

    for path in candidates {
        let display = display_path(&path);
        if !seen.insert(display.clone()) {
            continue;
        }
        let extension = file_extension(&path).unwrap_or_default();
        if !options.allows_extension(&extension) || options.is_skipped(&path) {
            continue;
        }
        if !path.exists() {
            outcome.errors.push(FileError {
                path: display,
                reason: FileErrorReason::NotFound,
            });
            continue;
        }
        if !registry.contains(&extension) {
            outcome.errors.push(FileError {
                path: display,
                reason: FileErrorReason::NoRules,
            });
            continue;
        }
        outcome.files.push(FileTask {
            path,
            display,
            extension,
        });
    }

    outcome
}

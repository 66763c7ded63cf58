//! Post-extraction predicates over comment blocks.

use anyhow::Result;
use clap::ValueEnum;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::core::{
    registry::normalize_extension,
    types::{CommentBlock, CommentKind},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    Single,
    Multi,
    #[default]
    Both,
}

impl KindFilter {
    pub fn accepts(self, kind: CommentKind) -> bool {
        match self {
            KindFilter::Single => kind == CommentKind::Single,
            KindFilter::Multi => kind == CommentKind::Multi,
            KindFilter::Both => true,
        }
    }
}

/// Compile user patterns as case-insensitive regexes.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|e| anyhow::anyhow!("Invalid pattern '{}': {}", p, e))
        })
        .collect()
}

/// Which blocks survive to the report.
#[derive(Debug, Clone, Default)]
pub struct BlockFilter {
    pub kind: KindFilter,
    /// Normalized extensions; empty keeps every extension.
    pub extensions: Vec<String>,
    /// A block passes if any pattern matches its text; empty keeps all.
    pub contains: Vec<Regex>,
    /// Minimum `line_count`; 0 and 1 keep all.
    pub min_lines: usize,
}

impl BlockFilter {
    pub fn new(
        kind: KindFilter,
        extensions: &[String],
        contains: &[String],
        min_lines: usize,
    ) -> Result<Self> {
        Ok(Self {
            kind,
            extensions: extensions
                .iter()
                .map(|e| normalize_extension(e))
                .filter(|e| !e.is_empty())
                .collect(),
            contains: compile_patterns(contains)?,
            min_lines,
        })
    }

    pub fn matches(&self, block: &CommentBlock) -> bool {
        if !self.kind.accepts(block.kind) || block.line_count < self.min_lines {
            return false;
        }
        if !self.extensions.is_empty() {
            let Some(ext) = block.extension() else {
                return false;
            };
            if !self.extensions.contains(&ext) {
                return false;
            }
        }
        self.contains.is_empty() || self.contains.iter().any(|r| r.is_match(&block.text))
    }

    pub fn apply(&self, blocks: Vec<CommentBlock>) -> Vec<CommentBlock> {
        blocks.into_iter().filter(|b| self.matches(b)).collect()
    }
}

/// Markers that make a run fail when present in any reported block.
#[derive(Debug, Clone, Default)]
pub struct FailMarker {
    patterns: Vec<Regex>,
}

impl FailMarker {
    pub fn new(patterns: &[String]) -> Result<Self> {
        Ok(Self {
            patterns: compile_patterns(patterns)?,
        })
    }

    /// Blocks whose text matches any marker.
    pub fn matches<'b>(&self, blocks: &'b [CommentBlock]) -> Vec<&'b CommentBlock> {
        if self.patterns.is_empty() {
            return Vec::new();
        }
        blocks
            .iter()
            .filter(|b| self.patterns.iter().any(|r| r.is_match(&b.text)))
            .collect()
    }
}

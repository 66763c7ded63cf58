//! Merges adjacent single-line occurrences into logical comment blocks.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::types::{CommentBlock, CommentKind, CommentOccurrence};

/// When two neighbouring single-line occurrences belong to the same block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GroupingPolicy {
    /// Same kind, exactly consecutive lines.
    #[default]
    Consecutive,
    /// As `Consecutive`, and both comments start their line at the same column.
    IndentAware,
}

impl GroupingPolicy {
    fn joins(self, prev: &CommentOccurrence, next: &CommentOccurrence) -> bool {
        let adjacent = prev.kind == CommentKind::Single
            && next.kind == CommentKind::Single
            && next.start_line == prev.end_line + 1;
        match self {
            GroupingPolicy::Consecutive => adjacent,
            GroupingPolicy::IndentAware => {
                adjacent && !prev.leading_code && !next.leading_code && prev.column == next.column
            }
        }
    }
}

impl std::fmt::Display for GroupingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupingPolicy::Consecutive => write!(f, "consecutive"),
            GroupingPolicy::IndentAware => write!(f, "indent-aware"),
        }
    }
}

/// Group a file's occurrences (in source order) into blocks.
///
/// Multi-line occurrences always form a block of their own.
pub fn group(
    file_path: &str,
    occurrences: Vec<CommentOccurrence>,
    policy: GroupingPolicy,
) -> Vec<CommentBlock> {
    let mut blocks: Vec<CommentBlock> = Vec::new();
    let mut prev: Option<CommentOccurrence> = None;

    for occurrence in occurrences {
        match (prev.as_ref(), blocks.last_mut()) {
            (Some(p), Some(block)) if policy.joins(p, &occurrence) => {
                block.end_line = occurrence.end_line;
                block.line_count = block.end_line - block.start_line + 1;
                block.text.push('\n');
                block.text.push_str(&occurrence.raw_text);
            }
            _ => blocks.push(CommentBlock {
                file_path: file_path.to_string(),
                start_line: occurrence.start_line,
                end_line: occurrence.end_line,
                kind: occurrence.kind,
                line_count: occurrence.line_count(),
                text: occurrence.raw_text.clone(),
                enclosing_symbol: None,
                unterminated: occurrence.unterminated,
            }),
        }
        prev = Some(occurrence);
    }

    blocks
}

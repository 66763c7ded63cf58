//! Aggregate figures for the `--summary` report.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::types::{CommentBlock, CommentKind};

const TOP_FILES: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub total_blocks: usize,
    pub total_lines: usize,
    pub single: usize,
    pub multi: usize,
    pub unterminated: usize,
    pub files_with_comments: usize,
    /// Extension → block count (blocks from files without an extension are not counted).
    pub by_extension: BTreeMap<String, usize>,
    /// Files with the most blocks, descending; ties by path.
    pub top_files: Vec<(String, usize)>,
}

impl ScanSummary {
    pub fn from_blocks(blocks: &[CommentBlock]) -> Self {
        let mut summary = ScanSummary::default();
        let mut per_file: BTreeMap<&str, usize> = BTreeMap::new();

        for block in blocks {
            summary.total_blocks += 1;
            summary.total_lines += block.line_count;
            match block.kind {
                CommentKind::Single => summary.single += 1,
                CommentKind::Multi => summary.multi += 1,
            }
            if block.unterminated {
                summary.unterminated += 1;
            }
            if let Some(ext) = block.extension() {
                *summary.by_extension.entry(ext).or_default() += 1;
            }
            *per_file.entry(block.file_path.as_str()).or_default() += 1;
        }

        summary.files_with_comments = per_file.len();
        let mut files: Vec<(String, usize)> = per_file
            .into_iter()
            .map(|(path, count)| (path.to_string(), count))
            .collect();
        // BTreeMap order already sorts by path; a stable sort keeps it for ties.
        files.sort_by(|a, b| b.1.cmp(&a.1));
        files.truncate(TOP_FILES);
        summary.top_files = files;

        summary
    }
}

//! Common utility functions shared across the codebase.

use std::sync::LazyLock;

use regex::Regex;

static LEADING_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:///+|//+|#+|/\*+|<!--|"""|'''|\*+/?)"#).unwrap()
});
static TRAILING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s*(?:\*+/|-->|"""|''')\s*$"#).unwrap());
static SUMMARY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</?summary>").unwrap());

/// Removes comment markers and doc-comment `<summary>` tags from every line of
/// a comment block, trimming what is left.
///
/// # Examples
///
/// ```
/// use commentary::utils::strip_comment_markers;
///
/// assert_eq!(strip_comment_markers("// hello"), "hello");
/// assert_eq!(strip_comment_markers("/* one\n * two */"), "one\ntwo");
/// assert_eq!(strip_comment_markers("/// <summary>Doc</summary>"), "Doc");
/// ```
pub fn strip_comment_markers(text: &str) -> String {
    text.lines()
        .map(|line| {
            let line = LEADING_MARKER.replace(line, "");
            let line = TRAILING_MARKER.replace(&line, "");
            SUMMARY_TAG.replace_all(&line, "").trim().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

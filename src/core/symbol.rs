//! Best-effort enclosing-symbol lookup.
//!
//! No syntax tree is built: the enclosing symbol of a block is the nearest
//! preceding line that is indented strictly less than the block's first line
//! and looks like a declaration.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::types::CommentBlock;

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:(?:pub(?:\([^)]*\))?|export|default|public|private|protected|internal|static|abstract|final|async|unsafe|extern|override|open|data|sealed)\s+)*(?:fn|def|class|struct|enum|trait|impl|interface|function|func|module|namespace)\b\s*(?:<[^>]*>\s*)?([A-Za-z_$][\w$]*(?:::[A-Za-z_$][\w$]*)*)",
    )
    .expect("declaration regex is valid")
});

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Name of the declaration enclosing 1-based `line_no`, if any.
pub fn enclosing_symbol(lines: &[&str], line_no: usize) -> Option<String> {
    let current = lines.get(line_no.checked_sub(1)?)?;
    let mut limit = indent_width(current);

    for line in lines[..line_no - 1].iter().rev() {
        if limit == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let indent = indent_width(line);
        if indent >= limit {
            continue;
        }
        if let Some(caps) = DECLARATION.captures(line) {
            return Some(caps[1].to_string());
        }
        // Shallower non-declaration line: keep looking for something shallower still.
        limit = indent;
    }
    None
}

/// Fill `enclosing_symbol` on every block of one file.
pub fn annotate(blocks: &mut [CommentBlock], text: &str) {
    let lines: Vec<&str> = text.lines().collect();
    for block in blocks {
        block.enclosing_symbol = enclosing_symbol(&lines, block.start_line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(source: &str) -> Vec<&str> {
        source.lines().collect()
    }

    #[test]
    fn test_rust_function() {
        let source = "pub fn compute(x: u32) -> u32 {\n    // doubles x\n    x * 2\n}\n";
        assert_eq!(
            enclosing_symbol(&lines(source), 2).as_deref(),
            Some("compute")
        );
    }

    #[test]
    fn test_nested_python_method() {
        let source = "class Parser:\n    def parse(self):\n        # walk tokens\n        pass\n    # class level\n";
        let lines = lines(source);
        assert_eq!(enclosing_symbol(&lines, 3).as_deref(), Some("parse"));
        assert_eq!(enclosing_symbol(&lines, 5).as_deref(), Some("Parser"));
    }

    #[test]
    fn test_top_level_has_no_symbol() {
        let source = "fn main() {}\n// top level\n";
        assert_eq!(enclosing_symbol(&lines(source), 2), None);
    }

    #[test]
    fn test_non_declaration_block_stops_outward_search_at_its_level() {
        let source = "fn outer() {\n    if ready {\n        // inside if\n    }\n}\n";
        assert_eq!(
            enclosing_symbol(&lines(source), 3).as_deref(),
            Some("outer")
        );
    }

    #[test]
    fn test_modifiers_and_generics() {
        let source = "export default class Widget {\n  // field\n}\nimpl<T> Stack {\n    // push\n}\n";
        let lines = lines(source);
        assert_eq!(enclosing_symbol(&lines, 2).as_deref(), Some("Widget"));
        assert_eq!(enclosing_symbol(&lines, 5).as_deref(), Some("Stack"));
    }

    #[test]
    fn test_out_of_range_line() {
        assert_eq!(enclosing_symbol(&lines("fn a() {}\n"), 0), None);
        assert_eq!(enclosing_symbol(&lines("fn a() {}\n"), 5), None);
    }

    #[test]
    fn test_annotate_blocks() {
        use crate::core::types::CommentKind;

        let source = "def run():\n    # step one\n    go()\n";
        let mut blocks = vec![CommentBlock {
            file_path: "a.py".to_string(),
            start_line: 2,
            end_line: 2,
            kind: CommentKind::Single,
            line_count: 1,
            text: "# step one".to_string(),
            enclosing_symbol: None,
            unterminated: false,
        }];
        annotate(&mut blocks, source);
        assert_eq!(blocks[0].enclosing_symbol.as_deref(), Some("run"));
    }
}

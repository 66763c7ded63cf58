//! Pattern-driven comment tokenizer.
//!
//! Turns one file's text into an ordered list of [`CommentOccurrence`]s using
//! the rules registered for its extension. The tokenizer is a two-state
//! machine over lines:
//!
//! - **Scanning code**: every rule's start matcher is tried from the cursor;
//!   the earliest match wins and ties go to the rule registered first.
//!   A single-line match ends the line. A multi-line start either closes on
//!   the same line (the rest of the line is scanned again) or switches to
//!   the inside-comment state.
//! - **Inside comment**: only the end matcher of the rule that opened the
//!   comment is searched for. Text after the end marker is scanned as code.
//!
//! Reaching end of file inside a comment emits the occurrence up to the last
//! line with `unterminated` set.
//!
//! There is no awareness of string or character literals: a marker inside a
//! literal is reported as a comment unless the rule set accounts for it.

use regex::{Match, Regex};

use crate::core::{
    registry::PatternRule,
    types::{CommentKind, CommentOccurrence},
};

enum Mode<'r> {
    ScanningCode,
    InsideComment(OpenComment<'r>),
}

/// A multi-line comment whose end marker has not been seen yet.
struct OpenComment<'r> {
    end: &'r Regex,
    start_line: usize,
    column: usize,
    leading_code: bool,
    text: String,
}

impl OpenComment<'_> {
    fn close(self, end_line: usize, unterminated: bool) -> CommentOccurrence {
        CommentOccurrence {
            start_line: self.start_line,
            end_line,
            kind: CommentKind::Multi,
            raw_text: self.text,
            column: self.column,
            leading_code: self.leading_code,
            unterminated,
        }
    }
}

/// Extract comment occurrences from `text` using `rules` (in precedence order).
pub fn tokenize(text: &str, rules: &[PatternRule]) -> Vec<CommentOccurrence> {
    let mut occurrences = Vec::new();
    if rules.is_empty() {
        return occurrences;
    }

    let mut mode = Mode::ScanningCode;
    let mut last_line = 0;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        let mut pos = 0;

        loop {
            let (next, cursor) = match mode {
                Mode::ScanningCode => match earliest_start(rules, line, pos) {
                    Some((rule, start)) => {
                        open_at(rule, start, line, line_no, pos, &mut occurrences)
                    }
                    None => (Mode::ScanningCode, None),
                },
                Mode::InsideComment(open) => continue_comment(open, line, line_no, &mut occurrences),
            };
            mode = next;
            match cursor {
                Some(next_pos) => pos = next_pos,
                None => break,
            }
        }
    }

    if let Mode::InsideComment(open) = mode {
        push(&mut occurrences, open.close(last_line, true));
    }

    occurrences
}

/// Handle a start marker found while scanning code.
///
/// Returns the next mode and where to resume on this line, if anywhere.
fn open_at<'r>(
    rule: &'r PatternRule,
    start: Match<'_>,
    line: &str,
    line_no: usize,
    pos: usize,
    occurrences: &mut Vec<CommentOccurrence>,
) -> (Mode<'r>, Option<usize>) {
    let leading_code = !line[..start.start()].trim().is_empty();

    let Some(end) = &rule.end else {
        push(
            occurrences,
            CommentOccurrence {
                start_line: line_no,
                end_line: line_no,
                kind: CommentKind::Single,
                raw_text: start.as_str().trim().to_string(),
                column: start.start(),
                leading_code,
                unterminated: false,
            },
        );
        return (Mode::ScanningCode, None);
    };

    match end.find_at(line, start.end()) {
        Some(close) => {
            push(
                occurrences,
                CommentOccurrence {
                    start_line: line_no,
                    end_line: line_no,
                    kind: CommentKind::Multi,
                    raw_text: line[start.start()..close.end()].to_string(),
                    column: start.start(),
                    leading_code,
                    unterminated: false,
                },
            );
            (Mode::ScanningCode, next_cursor(line, pos, close.end()))
        }
        None => {
            let open = OpenComment {
                end,
                start_line: line_no,
                column: start.start(),
                leading_code,
                text: line[start.start()..].trim_end().to_string(),
            };
            (Mode::InsideComment(open), None)
        }
    }
}

/// Look for the end marker of an open comment on the next line.
fn continue_comment<'r>(
    mut open: OpenComment<'r>,
    line: &str,
    line_no: usize,
    occurrences: &mut Vec<CommentOccurrence>,
) -> (Mode<'r>, Option<usize>) {
    open.text.push('\n');
    match open.end.find_at(line, 0) {
        Some(close) => {
            open.text.push_str(&line[..close.end()]);
            push(occurrences, open.close(line_no, false));
            (Mode::ScanningCode, next_cursor(line, 0, close.end()))
        }
        None => {
            open.text.push_str(line.trim_end());
            (Mode::InsideComment(open), None)
        }
    }
}

/// The rule whose start matcher matches earliest at or after `pos`.
fn earliest_start<'r, 'l>(
    rules: &'r [PatternRule],
    line: &'l str,
    pos: usize,
) -> Option<(&'r PatternRule, Match<'l>)> {
    let mut best: Option<(&PatternRule, Match)> = None;
    for rule in rules {
        if let Some(m) = rule.start.find_at(line, pos)
            && best.is_none_or(|(_, b)| m.start() < b.start())
        {
            best = Some((rule, m));
        }
    }
    best
}

/// Cursor after a comment closed at `closed_at`, or `None` if the line is done.
///
/// Always moves forward so zero-width markers cannot stall the scan.
fn next_cursor(line: &str, pos: usize, closed_at: usize) -> Option<usize> {
    let next = if closed_at > pos {
        closed_at
    } else {
        line[pos..]
            .chars()
            .next()
            .map(|c| pos + c.len_utf8())?
    };
    (next < line.len()).then_some(next)
}

/// Append an occurrence, coalescing with the previous one when both open on
/// the same line so start lines stay strictly increasing.
fn push(occurrences: &mut Vec<CommentOccurrence>, occurrence: CommentOccurrence) {
    if let Some(last) = occurrences.last_mut()
        && last.start_line == occurrence.start_line
    {
        last.raw_text.push(' ');
        last.raw_text.push_str(&occurrence.raw_text);
        last.end_line = last.end_line.max(occurrence.end_line);
        last.unterminated |= occurrence.unterminated;
        return;
    }
    occurrences.push(occurrence);
}

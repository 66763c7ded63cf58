//! Report formatting and printing utilities.
//!
//! Block listings and summaries go to stdout; file errors and warnings go to
//! stderr. Every printer has a `*_to` variant taking a writer so output can be
//! captured in tests.

use std::io::{self, Write};

use colored::{Color, Colorize};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use super::{
    args::OutputFormat,
    commands::{
        CommandResult, CommandSummary, InitSummary, LanguagesSummary, ReportOptions, ScanReport,
    },
};
use crate::{
    config::CONFIG_FILE_NAME,
    core::{CommentBlock, FileError, ScanWarning, stats::ScanSummary},
    utils::strip_comment_markers,
};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

const HIGHLIGHT_COLORS: [Color; 6] = [
    Color::Red,
    Color::Magenta,
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Blue,
];

/// Colors whole-word, case-insensitive occurrences of keywords.
///
/// Each keyword gets the next color in a fixed rotation.
pub struct Highlighter {
    words: Vec<(Regex, Color)>,
}

impl Highlighter {
    pub fn new(words: &[String]) -> Self {
        let words = words
            .iter()
            .filter(|w| !w.trim().is_empty())
            .enumerate()
            .filter_map(|(i, word)| {
                RegexBuilder::new(&format!(r"\b{}\b", regex::escape(word.trim())))
                    .case_insensitive(true)
                    .build()
                    .ok()
                    .map(|re| (re, HIGHLIGHT_COLORS[i % HIGHLIGHT_COLORS.len()]))
            })
            .collect();
        Self { words }
    }

    /// Non-overlapping keyword spans in `line`, leftmost-longest first.
    fn spans(&self, line: &str) -> Vec<(usize, usize, Color)> {
        let mut found: Vec<(usize, usize, Color)> = self
            .words
            .iter()
            .flat_map(|(re, color)| re.find_iter(line).map(|m| (m.start(), m.end(), *color)))
            .collect();
        found.sort_by_key(|&(start, end, _)| (start, std::cmp::Reverse(end)));

        let mut spans = Vec::with_capacity(found.len());
        let mut pos = 0;
        for (start, end, color) in found {
            if start >= pos {
                spans.push((start, end, color));
                pos = end;
            }
        }
        spans
    }

    /// Render one line: keywords in their color, everything else green.
    pub fn highlight(&self, line: &str) -> String {
        let mut out = String::new();
        let mut pos = 0;
        for (start, end, color) in self.spans(line) {
            if start > pos {
                out.push_str(&line[pos..start].green().to_string());
            }
            out.push_str(&line[start..end].color(color).bold().to_string());
            pos = end;
        }
        if pos < line.len() {
            out.push_str(&line[pos..].green().to_string());
        }
        out
    }
}

/// Print the outcome of any command.
pub fn print(result: &CommandResult, verbose: bool) {
    match &result.summary {
        CommandSummary::Scan(report) => print_scan(report, verbose),
        CommandSummary::Init(summary) => print_init(summary),
        CommandSummary::Languages(summary) => {
            print_languages_to(summary, &mut io::stdout().lock());
            print_warnings_to(&summary.warnings, &mut io::stderr().lock());
        }
    }
}

fn print_scan(report: &ScanReport, verbose: bool) {
    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();

    match report.options.format {
        OutputFormat::Json => {
            print_json_to(report, &mut out);
            print_failures_to(&report.failures, &mut err);
        }
        OutputFormat::Text => {
            report_blocks_to(&report.blocks, &report.options, &mut out);
            if report.options.summary {
                print_statistics_to(&ScanSummary::from_blocks(&report.blocks), &mut out);
            }
            print_failures_to(&report.failures, &mut out);
            print_scan_summary_to(report, &mut out);
        }
    }

    print_file_errors_to(&report.errors, verbose, &mut err);
    print_warnings_to(&report.warnings, &mut err);
}

/// Print comment blocks as `path:line: text` or a `path:start-end:` header
/// followed by the block's lines, with a blank line after each block.
///
/// With `show_content` only the text is printed.
pub fn report_blocks_to<W: Write>(
    blocks: &[CommentBlock],
    options: &ReportOptions,
    writer: &mut W,
) {
    let highlighter = Highlighter::new(&options.highlight);

    for block in blocks {
        let text = if options.strip_markers {
            strip_comment_markers(&block.text)
        } else {
            block.text.clone()
        };
        let lines: Vec<String> = text.split('\n').map(|l| highlighter.highlight(l)).collect();

        if options.show_content {
            let _ = writeln!(writer, "{}", lines.join("\n"));
        } else {
            let tags = block_tags(block);
            if block.start_line == block.end_line {
                let _ = writeln!(
                    writer,
                    "{}:{}: {}{}",
                    block.file_path.blue(),
                    block.start_line.to_string().yellow(),
                    lines.join(" "),
                    tags
                );
            } else {
                let _ = writeln!(
                    writer,
                    "{}:{}:{}",
                    block.file_path.blue(),
                    format!("{}-{}", block.start_line, block.end_line).yellow(),
                    tags
                );
                let _ = writeln!(writer, "{}", lines.join("\n"));
            }
        }
        let _ = writeln!(writer);
    }
}

fn block_tags(block: &CommentBlock) -> String {
    let mut tags = String::new();
    if let Some(symbol) = &block.enclosing_symbol {
        tags.push_str(&format!(" {}", format!("(in {})", symbol).dimmed()));
    }
    if block.unterminated {
        tags.push_str(&format!(" {}", "(unterminated)".bold().yellow()));
    }
    tags
}

/// Print `✓ Scanned N files: B blocks, U unterminated, E errors`.
pub fn print_scan_summary_to<W: Write>(report: &ScanReport, writer: &mut W) {
    let files = report.stats.files_scanned;
    let blocks = report.blocks.len();
    let unterminated = report.blocks.iter().filter(|b| b.unterminated).count();
    let errors = report.errors.len();

    let mark = if report.failures.is_empty() {
        SUCCESS_MARK.green()
    } else {
        FAILURE_MARK.red()
    };
    let _ = writeln!(
        writer,
        "{} Scanned {} {}: {} {}, {} unterminated, {} {}",
        mark,
        files,
        if files == 1 { "file" } else { "files" },
        blocks,
        if blocks == 1 { "block" } else { "blocks" },
        unterminated,
        errors,
        if errors == 1 { "error" } else { "errors" }
    );
}

/// List blocks that matched a `--fail-on` marker.
pub fn print_failures_to<W: Write>(failures: &[CommentBlock], writer: &mut W) {
    if failures.is_empty() {
        return;
    }
    let _ = writeln!(
        writer,
        "{} {} {} matched --fail-on:",
        FAILURE_MARK.red(),
        failures.len(),
        if failures.len() == 1 { "block" } else { "blocks" }
    );
    for block in failures {
        let _ = writeln!(
            writer,
            "  {} {}:{}",
            "-->".blue(),
            block.file_path,
            block.start_line
        );
    }
    let _ = writeln!(writer);
}

/// Print per-file failures; without `verbose` only a count and a hint.
pub fn print_file_errors_to<W: Write>(errors: &[FileError], verbose: bool, writer: &mut W) {
    if errors.is_empty() {
        return;
    }
    if verbose {
        for error in errors {
            let _ = writeln!(
                writer,
                "{} {}: {}",
                "warning:".bold().yellow(),
                error.path,
                error.reason
            );
        }
    } else {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be scanned (use {} for details)",
            "warning:".bold().yellow(),
            errors.len(),
            "-v".cyan()
        );
    }
}

pub fn print_warnings_to<W: Write>(warnings: &[ScanWarning], writer: &mut W) {
    for warning in warnings {
        let _ = writeln!(
            writer,
            "{} {}: {}",
            "warning:".bold().yellow(),
            warning.subject,
            warning.message
        );
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    blocks: &'a [CommentBlock],
    errors: &'a [FileError],
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ScanSummary>,
}

/// Print `{ "blocks": [...], "errors": [...] }`, plus `summary` when requested.
pub fn print_json_to<W: Write>(report: &ScanReport, writer: &mut W) {
    let json = JsonReport {
        blocks: &report.blocks,
        errors: &report.errors,
        summary: report
            .options
            .summary
            .then(|| ScanSummary::from_blocks(&report.blocks)),
    };
    if serde_json::to_writer_pretty(&mut *writer, &json).is_ok() {
        let _ = writeln!(writer);
    }
}

/// Print the `--summary` statistics table.
pub fn print_statistics_to<W: Write>(summary: &ScanSummary, writer: &mut W) {
    let _ = writeln!(writer, "{}", "Summary".bold());
    let _ = writeln!(
        writer,
        "  {:<14} {} ({} single, {} multi)",
        "Blocks", summary.total_blocks, summary.single, summary.multi
    );
    let _ = writeln!(writer, "  {:<14} {}", "Comment lines", summary.total_lines);
    let _ = writeln!(writer, "  {:<14} {}", "Unterminated", summary.unterminated);
    let _ = writeln!(writer, "  {:<14} {}", "Files", summary.files_with_comments);

    if !summary.by_extension.is_empty() {
        let _ = writeln!(writer, "{}", "By extension".bold());
        let width = summary
            .by_extension
            .keys()
            .map(|ext| ext.len())
            .max()
            .unwrap_or(0);
        for (ext, count) in &summary.by_extension {
            let _ = writeln!(writer, "  {:<width$}  {}", ext, count, width = width);
        }
    }

    if !summary.top_files.is_empty() {
        let _ = writeln!(writer, "{}", "Top files".bold());
        let width = summary
            .top_files
            .iter()
            .map(|(path, _)| UnicodeWidthStr::width(path.as_str()))
            .max()
            .unwrap_or(0);
        for (path, count) in &summary.top_files {
            let padding = width - UnicodeWidthStr::width(path.as_str());
            let _ = writeln!(writer, "  {}{}  {}", path, " ".repeat(padding), count);
        }
    }
    let _ = writeln!(writer);
}

fn print_init(summary: &InitSummary) {
    if summary.created {
        println!(
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    } else {
        eprintln!("Error: {} already exists", CONFIG_FILE_NAME);
    }
}

/// Print one line per extension: name and comment patterns.
pub fn print_languages_to<W: Write>(summary: &LanguagesSummary, writer: &mut W) {
    let name_width = summary
        .languages
        .iter()
        .filter_map(|l| l.name)
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0);

    for language in &summary.languages {
        let name = language.name.unwrap_or("-");
        let padding = name_width.saturating_sub(UnicodeWidthStr::width(name));
        let _ = writeln!(
            writer,
            "  {:<6}  {}{}  {}",
            language.extension.cyan(),
            name,
            " ".repeat(padding),
            language.rules.join(", ")
        );
    }
}

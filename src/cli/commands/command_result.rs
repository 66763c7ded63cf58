use crate::{
    cli::{args::OutputFormat, exit_status::ExitStatus},
    core::{CommentBlock, FileError, ScanStats, ScanWarning},
};

#[derive(Debug)]
pub enum CommandSummary {
    Scan(ScanReport),
    Init(InitSummary),
    Languages(LanguagesSummary),
}

/// How `scan` output is rendered.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub format: OutputFormat,
    pub show_content: bool,
    pub strip_markers: bool,
    pub summary: bool,
    pub highlight: Vec<String>,
}

#[derive(Debug)]
pub struct ScanReport {
    /// Blocks that passed the filters, in result order.
    pub blocks: Vec<CommentBlock>,
    pub errors: Vec<FileError>,
    pub warnings: Vec<ScanWarning>,
    pub stats: ScanStats,
    /// Reported blocks matching a `--fail-on` marker.
    pub failures: Vec<CommentBlock>,
    pub options: ReportOptions,
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
}

#[derive(Debug)]
pub struct LanguageEntry {
    pub extension: String,
    /// `None` for extensions only known from a rule file.
    pub name: Option<&'static str>,
    pub rules: Vec<String>,
}

#[derive(Debug)]
pub struct LanguagesSummary {
    pub languages: Vec<LanguageEntry>,
    pub warnings: Vec<ScanWarning>,
}

/// Result of running a commentary command
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
}

impl CommandResult {
    pub fn new(summary: CommandSummary) -> Self {
        Self { summary }
    }

    /// `Failure` when a fail marker matched or `init` found an existing config.
    pub fn exit_status(&self) -> ExitStatus {
        let failed = match &self.summary {
            CommandSummary::Scan(report) => !report.failures.is_empty(),
            CommandSummary::Init(summary) => !summary.created,
            CommandSummary::Languages(_) => false,
        };
        if failed {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}

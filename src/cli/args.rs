//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `scan`: Extract and report comment blocks under a directory
//! - `init`: Initialize commentary configuration file
//! - `languages`: List extensions with comment rules

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

use crate::core::{filter::KindFilter, grouper::GroupingPolicy, walker::Depth};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Scan(cmd)) => cmd.args.verbose,
            Some(Command::Languages(cmd)) => cmd.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Only scan these extensions, comma separated (overrides config file)
    #[arg(long = "ext", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Skip paths containing this word, case-insensitive (adds to config file)
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Skip paths matching this glob (adds to config file)
    #[arg(long = "ignore-pattern")]
    pub ignore_patterns: Vec<String>,

    /// Skip paths matching this regex (overrides config file)
    #[arg(long)]
    pub ignore_regex: Option<String>,

    /// Directory depth below the root: a number or "unbounded" (default: root only)
    #[arg(long)]
    pub max_depth: Option<Depth>,

    /// Number of worker threads (default: twice the CPU count)
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Only report blocks with at least this many lines
    #[arg(long)]
    pub min_lines: Option<usize>,

    /// Only report this comment kind
    #[arg(long, value_enum)]
    pub only: Option<KindFilter>,

    /// Only report blocks matching this case-insensitive regex (repeatable)
    #[arg(long)]
    pub contains: Vec<String>,

    /// Exit with status 1 if any reported block matches this regex (repeatable)
    #[arg(long)]
    pub fail_on: Vec<String>,

    /// Load extra comment rules from a JSON rule file (repeatable)
    #[arg(long = "plugin")]
    pub plugins: Vec<PathBuf>,

    /// Scan these files or glob patterns instead of walking the root
    #[arg(long, num_args = 1..)]
    pub files: Vec<String>,

    /// Read files to scan from this list, one per line
    #[arg(long)]
    pub filelist: Option<PathBuf>,

    /// Do not read or write the cache
    #[arg(long)]
    pub no_cache: bool,

    /// Cache file location (default: .commentary-cache.json in the root)
    #[arg(long)]
    pub cache_path: Option<PathBuf>,

    /// How adjacent single-line comments are grouped
    #[arg(long, value_enum)]
    pub grouping: Option<GroupingPolicy>,

    /// Resolve the enclosing declaration of each block
    #[arg(long)]
    pub symbols: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print only comment text, without file and line information
    #[arg(long)]
    pub show_content: bool,

    /// Remove comment markers from printed text
    #[arg(long)]
    pub strip_markers: bool,

    /// Print statistics after the report
    #[arg(long)]
    pub summary: bool,

    /// Highlight these words in text output (overrides config file)
    #[arg(long)]
    pub highlight: Vec<String>,

    /// Print each file to stderr as it is scanned
    #[arg(long)]
    pub progress: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Default for ScanArgs {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            extensions: Vec::new(),
            ignore: Vec::new(),
            ignore_patterns: Vec::new(),
            ignore_regex: None,
            max_depth: None,
            workers: None,
            min_lines: None,
            only: None,
            contains: Vec::new(),
            fail_on: Vec::new(),
            plugins: Vec::new(),
            files: Vec::new(),
            filelist: None,
            no_cache: false,
            cache_path: None,
            grouping: None,
            symbols: false,
            format: OutputFormat::default(),
            show_content: false,
            strip_markers: false,
            summary: false,
            highlight: Vec::new(),
            progress: false,
            verbose: false,
        }
    }
}

#[derive(Debug, Args)]
pub struct ScanCommand {
    #[command(flatten)]
    pub args: ScanArgs,
}

#[derive(Debug, Args)]
pub struct LanguagesCommand {
    /// Also list extensions from this JSON rule file (repeatable)
    #[arg(long = "plugin")]
    pub plugins: Vec<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find comment blocks in source files
    Scan(ScanCommand),
    /// Initialize a new .commentaryrc.json configuration file
    Init,
    /// List file extensions that have comment rules
    Languages(LanguagesCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Arguments {
        Arguments::try_parse_from(std::iter::once("commentary").chain(args.iter().copied()))
            .unwrap()
    }

    fn scan_args(args: &[&str]) -> ScanArgs {
        match parse(args).command {
            Some(Command::Scan(cmd)) => cmd.args,
            other => panic!("expected scan command, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_defaults() {
        let args = scan_args(&["scan"]);
        assert_eq!(args.root, PathBuf::from("."));
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.max_depth.is_none());
        assert!(!args.no_cache);
    }

    #[test]
    fn test_scan_options() {
        let args = scan_args(&[
            "scan",
            "src",
            "--ext",
            "rs,py",
            "--max-depth",
            "unbounded",
            "-j",
            "3",
            "--only",
            "multi",
            "--grouping",
            "indent-aware",
            "--fail-on",
            "FIXME",
            "--fail-on",
            "XXX",
            "--format",
            "json",
        ]);
        assert_eq!(args.root, PathBuf::from("src"));
        assert_eq!(args.extensions, vec!["rs", "py"]);
        assert_eq!(args.max_depth, Some(Depth::Unbounded));
        assert_eq!(args.workers, Some(3));
        assert_eq!(args.only, Some(KindFilter::Multi));
        assert_eq!(args.grouping, Some(GroupingPolicy::IndentAware));
        assert_eq!(args.fail_on, vec!["FIXME", "XXX"]);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_invalid_depth_rejected() {
        let result = Arguments::try_parse_from(["commentary", "scan", "--max-depth", "deep"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbose_flag() {
        assert!(parse(&["scan", "-v"]).verbose());
        assert!(!parse(&["init"]).verbose());
    }

    #[test]
    fn test_files_take_multiple_values() {
        let args = scan_args(&["scan", "--files", "a.rs", "src/*.py", "--summary"]);
        assert_eq!(args.files, vec!["a.rs", "src/*.py"]);
        assert!(args.summary);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Arguments::command().debug_assert();
    }
}

use anyhow::Result;

use super::super::args::ScanCommand;
use super::{CommandResult, CommandSummary, ReportOptions, ScanReport};
use crate::core::{ScanContext, ScanResult};

pub fn scan(cmd: ScanCommand) -> Result<CommandResult> {
    let args = &cmd.args;
    let ctx = ScanContext::new(args)?;

    let ScanResult {
        blocks,
        errors,
        warnings,
        stats,
    } = ctx.scan()?;

    let blocks = ctx.filter.apply(blocks);
    let failures = ctx
        .fail_marker
        .matches(&blocks)
        .into_iter()
        .cloned()
        .collect();

    Ok(CommandResult::new(CommandSummary::Scan(ScanReport {
        blocks,
        errors,
        warnings,
        stats,
        failures,
        options: ReportOptions {
            format: args.format,
            show_content: args.show_content,
            strip_markers: args.strip_markers,
            summary: args.summary,
            highlight: ctx.config.highlight.clone(),
        },
    })))
}

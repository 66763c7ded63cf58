use anyhow::Result;

use super::super::args::LanguagesCommand;
use super::{CommandResult, CommandSummary, LanguageEntry, LanguagesSummary};
use crate::core::registry::{
    AnyRuleSource, JsonRuleFile, PatternRegistry, PatternRule, language_name,
};

pub fn languages(cmd: LanguagesCommand) -> Result<CommandResult> {
    let mut registry = PatternRegistry::with_builtins();
    let sources: Vec<AnyRuleSource> = cmd
        .plugins
        .iter()
        .map(|path| JsonRuleFile::new(path).into())
        .collect();
    let warnings = registry.load_sources(&sources);

    let languages = registry
        .extensions()
        .into_iter()
        .map(|extension| LanguageEntry {
            extension: extension.to_string(),
            name: language_name(extension),
            rules: registry
                .rules_for(extension)
                .iter()
                .map(PatternRule::describe)
                .collect(),
        })
        .collect();

    Ok(CommandResult::new(CommandSummary::Languages(
        LanguagesSummary {
            languages,
            warnings,
        },
    )))
}

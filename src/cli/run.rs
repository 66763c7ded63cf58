use anyhow::{Result, bail};

use super::{
    args::{Arguments, Command},
    commands::{CommandResult, init::init, languages::languages, scan::scan},
};

/// Dispatches to the handler for the parsed subcommand.
///
/// # Returns
/// - `Ok(CommandResult)` with everything the reporter needs
/// - `Err` if the command cannot run (invalid config, missing root, ...)
pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Scan(cmd)) => scan(cmd),
        Some(Command::Init) => init(),
        Some(Command::Languages(cmd)) => languages(cmd),
        None => bail!("No command provided. Use --help to see available commands."),
    }
}

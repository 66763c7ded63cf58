use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): Command completed, nothing to flag
/// - `Failure` (1): A `--fail-on` marker matched (or `init` found an existing config)
/// - `Error` (2): Command could not run (invalid config, bad arguments, I/O error)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}

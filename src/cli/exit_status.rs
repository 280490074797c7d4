use std::process::ExitCode;

use super::args::FailOn;
use crate::issues::Severity;

/// Exit status for CLI commands, following common conventions for linter tools.
///
/// - `Success` (0): Command completed, nothing at or above the failure threshold
/// - `Failure` (1): Command completed but found issues at or above the threshold
/// - `Error` (2): Command failed (config error, unwritable locale file, etc.)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// Command completed successfully, no issues found.
    Success,
    /// Command completed but found issues.
    Failure,
    /// Command failed due to internal error.
    Error,
}

impl ExitStatus {
    /// The highest severity present decides, compared against `fail_on`.
    pub fn from_severity(highest: Option<Severity>, fail_on: FailOn) -> Self {
        match (highest, fail_on.threshold()) {
            (Some(highest), Some(threshold)) if highest >= threshold => ExitStatus::Failure,
            _ => ExitStatus::Success,
        }
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_values() {
        assert_eq!(ExitCode::from(ExitStatus::Success), ExitCode::from(0));
        assert_eq!(ExitCode::from(ExitStatus::Failure), ExitCode::from(1));
        assert_eq!(ExitCode::from(ExitStatus::Error), ExitCode::from(2));
    }

    #[test]
    fn highest_severity_against_threshold() {
        use Severity::*;
        assert_eq!(
            ExitStatus::from_severity(Some(Error), FailOn::Error),
            ExitStatus::Failure
        );
        assert_eq!(
            ExitStatus::from_severity(Some(Warning), FailOn::Error),
            ExitStatus::Success
        );
        assert_eq!(
            ExitStatus::from_severity(Some(Warning), FailOn::Warning),
            ExitStatus::Failure
        );
        assert_eq!(
            ExitStatus::from_severity(Some(Info), FailOn::Info),
            ExitStatus::Failure
        );
        assert_eq!(
            ExitStatus::from_severity(Some(Error), FailOn::Never),
            ExitStatus::Success
        );
        assert_eq!(
            ExitStatus::from_severity(None, FailOn::Info),
            ExitStatus::Success
        );
    }
}

use std::fmt::{Display, Formatter, Result as FmtResult};

/// How a launched process finished.
///
/// A non-zero exit is not an error of the runner. It is reported as
/// [`ExitOutcome::FatalExit`] and the caller decides whether to terminate the
/// host process with the same code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The process exited with code 0, or a detached process was aborted.
    Success,
    /// The process was terminated by a signal and has no exit code.
    Signaled { signal: i32 },
    /// The process exited with a non-zero code.
    FatalExit { code: i32 },
}

impl ExitOutcome {
    /// Returns `true` if the host process should fail with the child's code.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::FatalExit { .. })
    }

    /// The exit code the host process should use.
    pub fn code(&self) -> i32 {
        match self {
            Self::Success | Self::Signaled { .. } => 0,
            Self::FatalExit { code } => *code,
        }
    }
}

impl Display for ExitOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Success => f.write_str("success"),
            Self::Signaled { signal } => write!(f, "terminated by signal {signal}"),
            Self::FatalExit { code } => write!(f, "exited with code {code}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_code() {
        assert_eq!(ExitOutcome::Success.code(), 0);
        assert_eq!(ExitOutcome::Signaled { signal: 15 }.code(), 0);
        assert_eq!(ExitOutcome::FatalExit { code: 3 }.code(), 3);
        assert!(ExitOutcome::FatalExit { code: 3 }.is_fatal());
        assert!(!ExitOutcome::Signaled { signal: 9 }.is_fatal());
    }
}

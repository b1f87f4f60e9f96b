use nix::sys::wait::WaitStatus;
use std::fmt;

/// How a child process finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Exited(i32),
    Signaled(i32),
}

impl ExitOutcome {
    /// `None` for wait results that are not terminations (still running,
    /// stopped, continued).
    pub fn from_wait_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(ExitOutcome::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(ExitOutcome::Signaled(signal as i32)),
            _ => None,
        }
    }
}

impl Default for ExitOutcome {
    fn default() -> Self {
        ExitOutcome::Exited(0)
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Exited(code) => write!(f, "exit value {}", code),
            ExitOutcome::Signaled(signal) => write!(f, "terminated by signal {}", signal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;
    use nix::unistd::Pid;

    #[test]
    fn test_display() {
        assert_eq!(ExitOutcome::Exited(0).to_string(), "exit value 0");
        assert_eq!(ExitOutcome::Exited(3).to_string(), "exit value 3");
        assert_eq!(ExitOutcome::Signaled(15).to_string(), "terminated by signal 15");
    }

    #[test]
    fn test_from_wait_status() {
        let pid = Pid::from_raw(42);
        assert_eq!(
            ExitOutcome::from_wait_status(WaitStatus::Exited(pid, 2)),
            Some(ExitOutcome::Exited(2))
        );
        assert_eq!(
            ExitOutcome::from_wait_status(WaitStatus::Signaled(pid, Signal::SIGINT, false)),
            Some(ExitOutcome::Signaled(2))
        );
        assert_eq!(ExitOutcome::from_wait_status(WaitStatus::StillAlive), None);
        assert_eq!(
            ExitOutcome::from_wait_status(WaitStatus::Stopped(pid, Signal::SIGSTOP)),
            None
        );
    }
}

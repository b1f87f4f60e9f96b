use crate::shell::job_control::JobRegistry;
use crate::shell::signal_handler::FOREGROUND_ONLY;
use crate::shell::status::ExitOutcome;
use std::sync::atomic::{AtomicBool, Ordering};

/// Mutable state shared by the launcher, built-ins and the read loop.
pub struct ShellState {
    pub pid: u32,
    pub last_status: ExitOutcome,
    pub jobs: JobRegistry,
    foreground_only: &'static AtomicBool,
}

impl ShellState {
    pub fn new(max_jobs: usize) -> Self {
        Self::with_mode_flag(max_jobs, &FOREGROUND_ONLY)
    }

    pub fn with_mode_flag(max_jobs: usize, foreground_only: &'static AtomicBool) -> Self {
        ShellState {
            pid: std::process::id(),
            last_status: ExitOutcome::default(),
            jobs: JobRegistry::new(max_jobs),
            foreground_only,
        }
    }

    pub fn foreground_only(&self) -> bool {
        self.foreground_only.load(Ordering::SeqCst)
    }
}

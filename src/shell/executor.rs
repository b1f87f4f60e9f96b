// src/shell/executor.rs
use crate::shell::command_parser::Directive;
use crate::shell::redirection;
use crate::shell::signal_handler;
use crate::shell::state::ShellState;
use crate::shell::status::ExitOutcome;
use log::debug;
use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::waitpid;
use nix::unistd::Pid;
use std::fmt;
use std::io;
use std::os::unix::process::CommandExt;
use std::process::Command;

/// Status recorded when a foreground launch fails before the program runs.
const LAUNCH_FAILURE: ExitOutcome = ExitOutcome::Exited(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Input,
    Output,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Input => write!(f, "input"),
            StreamKind::Output => write!(f, "output"),
        }
    }
}

#[derive(Debug)]
pub enum LaunchError {
    Redirect {
        kind: StreamKind,
        path: String,
        source: io::Error,
    },
    NotFound {
        program: String,
        source: io::Error,
    },
    TooManyJobs {
        capacity: usize,
    },
    Wait {
        pid: Pid,
        source: nix::Error,
    },
    Fork(io::Error),
}

impl LaunchError {
    /// Only a failed fork stops the shell; it cannot make progress without
    /// new processes.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LaunchError::Fork(_))
    }
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::Redirect { kind, path, .. } => {
                write!(f, "cannot open {} file {}", kind, path)
            }
            LaunchError::NotFound { program, .. } => write!(f, "cannot execute {}", program),
            LaunchError::TooManyJobs { capacity } => {
                write!(f, "too many background jobs (limit {})", capacity)
            }
            LaunchError::Wait { pid, .. } => write!(f, "failed to wait for pid {}", pid),
            LaunchError::Fork(_) => write!(f, "cannot create process"),
        }
    }
}

impl std::error::Error for LaunchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LaunchError::Redirect { source, .. } | LaunchError::NotFound { source, .. } => Some(source),
            LaunchError::Wait { source, .. } => Some(source),
            LaunchError::Fork(e) => Some(e),
            LaunchError::TooManyJobs { .. } => None,
        }
    }
}

/// Foreground terminations printed as soon as they are reaped. Everything
/// else is only shown by `status`.
fn announces(outcome: ExitOutcome) -> bool {
    matches!(outcome, ExitOutcome::Signaled(signal) if signal == Signal::SIGINT as i32)
}

pub struct Executor;

impl Executor {
    /// Spawns the directive's program. Foreground directives are waited for
    /// and their outcome stored in `last_status`; background ones are
    /// registered and left running. Redirections are opened and the exec is
    /// attempted before anything is registered, so a background launch that
    /// fails is reported here and never announced as `background pid P`.
    pub fn launch(directive: &Directive, state: &mut ShellState) -> Result<(), LaunchError> {
        if directive.background && state.jobs.is_full() {
            return Err(LaunchError::TooManyJobs {
                capacity: state.jobs.capacity(),
            });
        }

        let result = Self::spawn(directive).and_then(|pid| {
            if directive.background {
                Self::detach(pid, state)
            } else {
                Self::wait_foreground(pid, state)
            }
        });

        if let Err(e) = &result {
            if !directive.background && !e.is_fatal() {
                state.last_status = LAUNCH_FAILURE;
            }
        }
        result
    }

    fn spawn(directive: &Directive) -> Result<Pid, LaunchError> {
        let streams = redirection::resolve(directive)?;
        let foreground = !directive.background;

        let mut command = Command::new(&directive.program);
        command
            .args(&directive.args[1..])
            .stdin(streams.stdin)
            .stdout(streams.stdout);
        unsafe {
            command.pre_exec(move || signal_handler::reset_child_signals(foreground).map_err(io::Error::from));
        }

        let child = command.spawn().map_err(|e| match Errno::from_i32(e.raw_os_error().unwrap_or(0)) {
            Errno::EAGAIN | Errno::ENOMEM => LaunchError::Fork(e),
            _ => LaunchError::NotFound {
                program: directive.program.clone(),
                source: e,
            },
        })?;

        let pid = Pid::from_raw(child.id() as i32);
        debug!("Spawned {} as pid {} (background: {})", directive.program, pid, directive.background);
        Ok(pid)
    }

    fn detach(pid: Pid, state: &mut ShellState) -> Result<(), LaunchError> {
        if state.jobs.insert(pid).is_none() {
            return Err(LaunchError::TooManyJobs {
                capacity: state.jobs.capacity(),
            });
        }
        println!("background pid {}", pid);
        Ok(())
    }

    fn wait_foreground(pid: Pid, state: &mut ShellState) -> Result<(), LaunchError> {
        loop {
            match waitpid(pid, None) {
                Ok(status) => {
                    if let Some(outcome) = ExitOutcome::from_wait_status(status) {
                        debug!("Foreground pid {} finished: {}", pid, outcome);
                        state.last_status = outcome;
                        if announces(outcome) {
                            println!("{}", outcome);
                        }
                        return Ok(());
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(source) => return Err(LaunchError::Wait { pid, source }),
            }
        }
    }
}

mod command_parser;
mod executor;
mod expander;
mod job_control;
mod redirection;
mod signal_handler;
mod state;
mod status;

use crate::config::Config;
use crate::terminal::Terminal;
use anyhow::{anyhow, Context, Result};
use log::debug;
use std::path::PathBuf;

use self::command_parser::{CommandParser, Directive};
use self::executor::{Executor, LaunchError};
use self::signal_handler::SignalHandler;
use self::state::ShellState;

pub struct Shell {
    terminal: Terminal,
    state: ShellState,
    max_args: usize,
}

impl Shell {
    pub fn new(config: &Config) -> Self {
        Shell {
            terminal: Terminal::new(&config.prompt, config.max_input),
            state: ShellState::new(config.max_jobs),
            max_args: config.max_args,
        }
    }

    /// Reads and runs lines until `exit` or end of input, then kills any
    /// background jobs still registered. Errors only for conditions the shell
    /// cannot continue past.
    pub fn run(&mut self) -> Result<()> {
        SignalHandler::initialize().context("Failed to install signal handlers")?;

        let result = self.read_eval_loop();
        self.shutdown();
        result
    }

    fn read_eval_loop(&mut self) -> Result<()> {
        loop {
            let line = match self.terminal.read_line()? {
                Some(line) => line,
                None => {
                    debug!("End of input");
                    return Ok(());
                }
            };

            match self.execute_line(&line) {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) if is_fatal(&e) => return Err(e),
                Err(e) => eprintln!("minish: {:#}", e),
            }

            self.report_finished_jobs();
        }
    }

    /// Returns `Ok(true)` when the line asked the shell to exit.
    fn execute_line(&mut self, line: &str) -> Result<bool> {
        let tokens = expander::tokenize(line, self.state.pid);
        let directive = match CommandParser::parse(&tokens, self.state.foreground_only(), self.max_args)? {
            Some(directive) => directive,
            None => return Ok(false),
        };

        if let Some(result) = self.handle_builtin_command(&directive) {
            return result;
        }

        Executor::launch(&directive, &mut self.state)?;
        Ok(false)
    }

    fn handle_builtin_command(&mut self, directive: &Directive) -> Option<Result<bool>> {
        match directive.program.as_str() {
            "exit" => Some(Ok(true)),

            "status" => {
                println!("{}", self.state.last_status);
                Some(Ok(false))
            }

            "cd" => {
                let target = match directive.args.get(1) {
                    Some(dir) => PathBuf::from(dir),
                    None => match dirs::home_dir() {
                        Some(home) => home,
                        None => return Some(Err(anyhow!("cd: home directory not found"))),
                    },
                };

                Some(
                    std::env::set_current_dir(&target)
                        .with_context(|| format!("cd: {}", target.display()))
                        .map(|_| false),
                )
            }

            _ => None,
        }
    }

    fn report_finished_jobs(&mut self) {
        for completion in self.state.jobs.reap_finished() {
            println!("background pid {} is done: {}", completion.pid, completion.outcome);
        }
    }

    fn shutdown(&mut self) {
        if !self.state.jobs.is_empty() {
            debug!("Shutting down with {} background job(s)", self.state.jobs.len());
            self.state.jobs.terminate_all();
        }
    }
}

fn is_fatal(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<LaunchError>()
        .map_or(false, LaunchError::is_fatal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::status::ExitOutcome;
    use std::fs;
    use std::sync::atomic::AtomicBool;
    use std::thread;
    use std::time::{Duration, Instant};

    fn shell_with_mode(foreground_only: bool) -> Shell {
        let config = Config::default();
        Shell {
            terminal: Terminal::new(&config.prompt, config.max_input),
            state: ShellState::with_mode_flag(
                config.max_jobs,
                Box::leak(Box::new(AtomicBool::new(foreground_only))),
            ),
            max_args: config.max_args,
        }
    }

    #[test]
    fn test_blank_and_comment_lines_are_noops() {
        let mut shell = shell_with_mode(false);
        shell.state.last_status = ExitOutcome::Exited(9);

        assert!(!shell.execute_line("").unwrap());
        assert!(!shell.execute_line("# sleep 5 &").unwrap());
        assert_eq!(shell.state.last_status, ExitOutcome::Exited(9));
        assert!(shell.state.jobs.is_empty());
    }

    #[test]
    fn test_exit_and_status_builtins() {
        let mut shell = shell_with_mode(false);
        assert!(shell.execute_line("exit").unwrap());
        assert!(!shell.execute_line("status").unwrap());
    }

    #[test]
    fn test_parse_error_is_recoverable() {
        let mut shell = shell_with_mode(false);
        let err = shell.execute_line("cat <").unwrap_err();
        assert!(!is_fatal(&err));
        assert_eq!(err.to_string(), "missing redirection target after '<'");
    }

    #[test]
    fn test_launch_failure_is_recoverable() {
        let mut shell = shell_with_mode(false);
        let err = shell.execute_line("no-such-program-for-minish").unwrap_err();
        assert!(!is_fatal(&err));
        assert_eq!(shell.state.last_status, ExitOutcome::Exited(1));
    }

    #[test]
    fn test_foreground_status_is_recorded() {
        let mut shell = shell_with_mode(false);
        shell.execute_line("false").unwrap();
        assert_eq!(shell.state.last_status, ExitOutcome::Exited(1));
        shell.execute_line("true").unwrap();
        assert_eq!(shell.state.last_status, ExitOutcome::Exited(0));
    }

    #[test]
    fn test_background_job_is_registered_and_reaped() {
        let mut shell = shell_with_mode(false);
        shell.execute_line("sleep 0 &").unwrap();
        assert_eq!(shell.state.jobs.len(), 1);

        let deadline = Instant::now() + Duration::from_secs(10);
        while !shell.state.jobs.is_empty() && Instant::now() < deadline {
            shell.report_finished_jobs();
            thread::sleep(Duration::from_millis(20));
        }
        assert!(shell.state.jobs.is_empty());
    }

    #[test]
    fn test_foreground_only_mode_waits() {
        let mut shell = shell_with_mode(true);
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("exit5.sh");
        fs::write(&script, "exit 5\n").unwrap();

        shell.execute_line(&format!("sh {} &", script.display())).unwrap();
        assert!(shell.state.jobs.is_empty());
        assert_eq!(shell.state.last_status, ExitOutcome::Exited(5));
    }

    #[test]
    fn test_builtins_ignore_background_marker() {
        let mut shell = shell_with_mode(false);
        assert!(shell.execute_line("exit &").unwrap());
    }

    #[test]
    fn test_shutdown_clears_registry() {
        let mut shell = shell_with_mode(false);
        shell.execute_line("sleep 30 &").unwrap();
        assert_eq!(shell.state.jobs.len(), 1);
        shell.shutdown();
        assert!(shell.state.jobs.is_empty());
    }

    #[test]
    fn test_cd() {
        let original = std::env::current_dir().unwrap();
        let mut shell = shell_with_mode(false);

        let err = shell.execute_line("cd /nonexistent/minish/path").unwrap_err();
        assert!(err.to_string().starts_with("cd: /nonexistent/minish/path"));
        assert_eq!(std::env::current_dir().unwrap(), original);

        if let Some(home) = dirs::home_dir() {
            shell.execute_line("cd").unwrap();
            assert_eq!(
                std::env::current_dir().unwrap().canonicalize().unwrap(),
                home.canonicalize().unwrap()
            );
        }

        let dir = tempfile::tempdir().unwrap();
        shell.execute_line(&format!("cd {}", dir.path().display())).unwrap();
        assert_eq!(
            std::env::current_dir().unwrap().canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );

        std::env::set_current_dir(original).unwrap();
    }
}

use log::debug;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set while `&` is being ignored. Flipped only by the SIGTSTP handler.
pub static FOREGROUND_ONLY: AtomicBool = AtomicBool::new(false);

const ENTER_MESSAGE: &[u8] = b"\nentering foreground-only mode\n: ";
const EXIT_MESSAGE: &[u8] = b"\nexiting foreground-only mode\n: ";

pub struct SignalHandler;

impl SignalHandler {
    /// SIGINT is ignored by the shell itself; SIGTSTP toggles
    /// foreground-only mode.
    pub fn initialize() -> Result<(), nix::Error> {
        debug!("Initializing signal handlers");

        let sigint_action = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
        unsafe { signal::sigaction(Signal::SIGINT, &sigint_action)? };

        let sigtstp_action = SigAction::new(
            SigHandler::Handler(Self::handle_sigtstp),
            SaFlags::SA_RESTART,
            SigSet::all(),
        );
        unsafe { signal::sigaction(Signal::SIGTSTP, &sigtstp_action)? };

        Ok(())
    }

    extern "C" fn handle_sigtstp(_: i32) {
        let message = if toggle_foreground_only(&FOREGROUND_ONLY) {
            ENTER_MESSAGE
        } else {
            EXIT_MESSAGE
        };
        // only async-signal-safe calls from here on
        let _ = unistd::write(libc::STDOUT_FILENO, message);
    }
}

/// Flips the mode flag and returns the new value.
pub fn toggle_foreground_only(flag: &AtomicBool) -> bool {
    !flag.fetch_xor(true, Ordering::SeqCst)
}

/// Runs in the forked child before exec. Foreground children get the default
/// SIGINT back; every child ignores SIGTSTP.
pub fn reset_child_signals(foreground: bool) -> Result<(), nix::Error> {
    unsafe {
        if foreground {
            signal::signal(Signal::SIGINT, SigHandler::SigDfl)?;
        }
        signal::signal(Signal::SIGTSTP, SigHandler::SigIgn)?;
    }
    Ok(())
}

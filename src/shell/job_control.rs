use crate::shell::status::ExitOutcome;
use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

/// A background job that has been reaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub pid: Pid,
    pub outcome: ExitOutcome,
}

/// Fixed-capacity table of background pids.
///
/// Free slots are found by a circular scan starting at a rotating cursor, so
/// slot reuse is spread across the table instead of always restarting at 0.
#[derive(Debug)]
pub struct JobRegistry {
    slots: Vec<Option<Pid>>,
    cursor: usize,
}

impl JobRegistry {
    pub fn new(capacity: usize) -> Self {
        JobRegistry {
            slots: vec![None; capacity],
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.slots.iter().flatten().copied()
    }

    /// Records `pid` in the next free slot. Returns the slot index, or `None`
    /// when every slot is taken; existing entries are never overwritten.
    pub fn insert(&mut self, pid: Pid) -> Option<usize> {
        debug_assert!(!self.pids().any(|p| p == pid), "pid {} registered twice", pid);

        let capacity = self.capacity();
        let index = (0..capacity)
            .map(|offset| (self.cursor + offset) % capacity)
            .find(|&index| self.slots[index].is_none())?;

        self.slots[index] = Some(pid);
        self.cursor = (index + 1) % capacity;
        debug!("Registered background pid {} in slot {}", pid, index);
        Some(index)
    }

    #[cfg(test)]
    fn remove(&mut self, pid: Pid) {
        for slot in self.slots.iter_mut().filter(|slot| **slot == Some(pid)) {
            *slot = None;
        }
    }

    /// Non-blocking check of every registered job, in table order. Finished
    /// jobs are freed and returned.
    pub fn reap_finished(&mut self) -> Vec<Completion> {
        let mut completions = Vec::new();

        for index in 0..self.slots.len() {
            let pid = match self.slots[index] {
                Some(pid) => pid,
                None => continue,
            };

            match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) | Err(Errno::EINTR) => {}
                Ok(status) => {
                    if let Some(outcome) = ExitOutcome::from_wait_status(status) {
                        debug!("Reaped background pid {}: {}", pid, outcome);
                        self.slots[index] = None;
                        completions.push(Completion { pid, outcome });
                    }
                }
                Err(e) => {
                    warn!("Dropping background pid {} after wait failed: {}", pid, e);
                    self.slots[index] = None;
                }
            }
        }

        completions
    }

    /// Sends SIGKILL to every registered job and empties the table without
    /// waiting for the children to be reaped.
    pub fn terminate_all(&mut self) {
        for slot in self.slots.iter_mut() {
            if let Some(pid) = slot.take() {
                debug!("Killing background pid {}", pid);
                if let Err(e) = signal::kill(pid, Signal::SIGKILL) {
                    debug!("Failed to kill pid {}: {}", pid, e);
                }
            }
        }
    }
}

impl Drop for JobRegistry {
    fn drop(&mut self) {
        self.terminate_all();
    }
}

// This file is part of tsh, a tiny shell with job control.
// Copyright (C) 2026 WATANABE Yuki
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! System simulated in Rust.
//!
//! [`VirtualSystem`] is a [`System`] implementation for testing. It does not
//! start any real process. Instead, it records what the shell asked for in a
//! [`SystemState`] that the test can inspect:
//!
//! - Text written to the standard output is accumulated in
//!   [`stdout`](SystemState::stdout).
//! - Signals sent by [`kill`](System::kill) are appended to
//!   [`signals`](SystemState::signals).
//! - Each [`fork`](System::fork) returns [`ForkResult::Parent`] with a new
//!   process ID taken from [`next_pid`](SystemState::next_pid). The child side
//!   is never simulated.
//!
//! Since no real child exists, no `SIGCHLD` ever arrives. To keep
//! [`Env::wait_for_foreground`](crate::Env::wait_for_foreground) from
//! spinning forever, [`sigsuspend`](System::sigsuspend) applies
//! [`SystemState::foreground_outcome`] to the foreground job of the job table
//! the state refers to, as if the signal handler had run.

use super::Errno;
use super::ForkResult;
use super::Pid;
use super::SigSet;
use super::SigmaskHow;
use super::Signal;
use super::System;
use crate::job::JobState;
use crate::job::JobTable;
use crate::semantics::ExitStatus;
use std::cell::RefCell;
use std::convert::Infallible;
use std::ffi::CStr;
use std::ffi::CString;
use std::rc::Rc;

/// What happens to the foreground job while the shell is suspended
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ForegroundOutcome {
    /// The job terminates and is removed from the job table.
    #[default]
    Terminate,
    /// The job is stopped by a signal.
    Stop,
    /// Nothing happens.
    Ignore,
}

/// State of the virtual system
#[derive(Clone, Debug)]
pub struct SystemState {
    /// Text written to the standard output
    pub stdout: String,
    /// Current signal blocking mask
    pub sigmask: SigSet,
    /// Signals sent by `kill`, with the target process (group)
    pub signals: Vec<(Pid, Option<Signal>)>,
    /// Error to be returned by `kill`, if any
    pub kill_error: Option<Errno>,
    /// Process ID to be returned by the next `fork`
    ///
    /// If this is `None`, `fork` fails with `EAGAIN`.
    pub next_pid: Option<Pid>,
    /// Process groups set by `setpgid`
    pub process_groups: Vec<(Pid, Pid)>,
    /// Job table whose foreground job is affected by `sigsuspend`
    pub jobs: Option<&'static JobTable>,
    /// Effect of `sigsuspend` on the foreground job
    pub foreground_outcome: ForegroundOutcome,
    /// Number of times `sigsuspend` has been called
    pub suspensions: usize,
}

impl Default for SystemState {
    fn default() -> Self {
        SystemState {
            stdout: String::new(),
            sigmask: SigSet::empty(),
            signals: Vec::new(),
            kill_error: None,
            next_pid: Some(Pid::from_raw(100)),
            process_groups: Vec::new(),
            jobs: None,
            foreground_outcome: ForegroundOutcome::default(),
            suspensions: 0,
        }
    }
}

/// Simulated system
///
/// See the [module-level documentation](self) to grasp a basic understanding
/// of `VirtualSystem`.
///
/// The state is shared through a reference-counted pointer so that a test can
/// keep a clone of the system after passing another to the environment.
#[derive(Clone, Debug, Default)]
pub struct VirtualSystem {
    /// State of the system
    pub state: Rc<RefCell<SystemState>>,
}

impl VirtualSystem {
    /// Creates a virtual system with an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a virtual system that simulates the jobs in the table.
    #[must_use]
    pub fn with_jobs(jobs: &'static JobTable) -> Self {
        let system = Self::new();
        system.state.borrow_mut().jobs = Some(jobs);
        system
    }
}

impl System for VirtualSystem {
    fn sigmask(
        &mut self,
        how: SigmaskHow,
        set: Option<&SigSet>,
        oldset: Option<&mut SigSet>,
    ) -> Result<(), Errno> {
        let mut state = self.state.borrow_mut();
        if let Some(oldset) = oldset {
            *oldset = state.sigmask;
        }
        if let Some(set) = set {
            match how {
                SigmaskHow::SIG_BLOCK => {
                    for signal in set.iter() {
                        state.sigmask.add(signal);
                    }
                }
                SigmaskHow::SIG_UNBLOCK => {
                    for signal in set.iter() {
                        state.sigmask.remove(signal);
                    }
                }
                SigmaskHow::SIG_SETMASK => state.sigmask = *set,
                _ => return Err(Errno::EINVAL),
            }
        }
        Ok(())
    }

    fn sigsuspend(&mut self, _mask: &SigSet) {
        let mut state = self.state.borrow_mut();
        state.suspensions += 1;
        let Some(jobs) = state.jobs else { return };
        let Some(pid) = jobs.foreground_pid() else {
            return;
        };
        match state.foreground_outcome {
            ForegroundOutcome::Terminate => {
                jobs.remove(pid);
            }
            ForegroundOutcome::Stop => {
                jobs.set_state(pid, JobState::Stopped);
            }
            ForegroundOutcome::Ignore => {}
        }
    }

    fn kill(&mut self, target: Pid, signal: Option<Signal>) -> Result<(), Errno> {
        let mut state = self.state.borrow_mut();
        state.signals.push((target, signal));
        match state.kill_error {
            Some(errno) => Err(errno),
            None => Ok(()),
        }
    }

    /// Pretends to create a child process.
    ///
    /// This function only returns in the parent. The process ID of the
    /// imaginary child is incremented for the next call.
    fn fork(&mut self) -> Result<ForkResult, Errno> {
        let mut state = self.state.borrow_mut();
        let child = state.next_pid.ok_or(Errno::EAGAIN)?;
        state.next_pid = Some(Pid::from_raw(child.as_raw() + 1));
        Ok(ForkResult::Parent { child })
    }

    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> Result<(), Errno> {
        self.state.borrow_mut().process_groups.push((pid, pgid));
        Ok(())
    }

    /// Always fails with `ENOSYS` since the virtual system cannot run
    /// external utilities.
    fn execvp(&mut self, _file: &CStr, _args: &[CString]) -> Result<Infallible, Errno> {
        Err(Errno::ENOSYS)
    }

    fn write_stdout(&mut self, text: &str) -> Result<(), Errno> {
        self.state.borrow_mut().stdout.push_str(text);
        Ok(())
    }

    /// Panics since the virtual system never runs a child process.
    fn exit_child(&mut self, exit_status: ExitStatus) -> ! {
        panic!("exit_child({exit_status}) called in the virtual system")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn leaked_table() -> &'static JobTable {
        Box::leak(Box::new(JobTable::new()))
    }

    #[test]
    fn sigmask_block_unblock_and_set() {
        let mut system = VirtualSystem::new();
        let mut set = SigSet::empty();
        set.add(Signal::SIGCHLD);
        set.add(Signal::SIGINT);
        let mut old = SigSet::all();
        system
            .sigmask(SigmaskHow::SIG_BLOCK, Some(&set), Some(&mut old))
            .unwrap();
        assert_eq!(old, SigSet::empty());
        assert!(system.state.borrow().sigmask.contains(Signal::SIGCHLD));
        assert!(system.state.borrow().sigmask.contains(Signal::SIGINT));

        let mut chld = SigSet::empty();
        chld.add(Signal::SIGCHLD);
        system
            .sigmask(SigmaskHow::SIG_UNBLOCK, Some(&chld), None)
            .unwrap();
        assert!(!system.state.borrow().sigmask.contains(Signal::SIGCHLD));
        assert!(system.state.borrow().sigmask.contains(Signal::SIGINT));

        system
            .sigmask(SigmaskHow::SIG_SETMASK, Some(&old), None)
            .unwrap();
        assert_eq!(system.state.borrow().sigmask, SigSet::empty());
    }

    #[test]
    fn fork_returns_increasing_pids() {
        let mut system = VirtualSystem::new();
        assert_matches!(system.fork(), Ok(ForkResult::Parent { child }) => {
            assert_eq!(child, Pid::from_raw(100));
        });
        assert_matches!(system.fork(), Ok(ForkResult::Parent { child }) => {
            assert_eq!(child, Pid::from_raw(101));
        });
        system.state.borrow_mut().next_pid = None;
        assert_matches!(system.fork(), Err(Errno::EAGAIN));
    }

    #[test]
    fn kill_records_signals() {
        let mut system = VirtualSystem::new();
        let target = Pid::from_raw(-42);
        assert_eq!(system.kill(target, Some(Signal::SIGCONT)), Ok(()));
        system.state.borrow_mut().kill_error = Some(Errno::ESRCH);
        assert_eq!(system.kill(target, Some(Signal::SIGINT)), Err(Errno::ESRCH));
        assert_eq!(
            system.state.borrow().signals,
            [
                (target, Some(Signal::SIGCONT)),
                (target, Some(Signal::SIGINT))
            ]
        );
    }

    #[test]
    fn sigsuspend_terminates_foreground_job() {
        let jobs = leaked_table();
        jobs.add(Pid::from_raw(5), JobState::Background, "a &").unwrap();
        jobs.add(Pid::from_raw(6), JobState::Foreground, "b").unwrap();
        let mut system = VirtualSystem::with_jobs(jobs);
        system.sigsuspend(&SigSet::empty());
        assert_eq!(jobs.find_by_pid(Pid::from_raw(6)), None);
        assert_eq!(jobs.len(), 1);
        assert_eq!(system.state.borrow().suspensions, 1);
    }

    #[test]
    fn sigsuspend_stops_foreground_job() {
        let jobs = leaked_table();
        jobs.add(Pid::from_raw(6), JobState::Foreground, "b").unwrap();
        let mut system = VirtualSystem::with_jobs(jobs);
        system.state.borrow_mut().foreground_outcome = ForegroundOutcome::Stop;
        system.sigsuspend(&SigSet::empty());
        let job = jobs.find_by_pid(Pid::from_raw(6)).unwrap();
        assert_eq!(job.state, JobState::Stopped);
    }

    #[test]
    fn write_stdout_accumulates_text() {
        let mut system = VirtualSystem::new();
        system.write_stdout("tsh> ").unwrap();
        system.write_stdout("foo\n").unwrap();
        assert_eq!(system.state.borrow().stdout, "tsh> foo\n");
    }

    #[test]
    fn execvp_is_unsupported() {
        let mut system = VirtualSystem::new();
        let file = CString::new("ls").unwrap();
        let result = system.execvp(&file, &[file.clone()]);
        assert_eq!(result, Err(Errno::ENOSYS));
    }
}

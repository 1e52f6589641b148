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

//! This crate defines the shell execution environment.
//!
//! A shell execution environment, [`Env`], is a collection of data that may
//! affect or be affected by the execution of commands. It consists of the
//! built-ins, the [job table](job::JobTable), and the [`System`] that
//! interfaces with the underlying operating system.
//!
//! The job table is shared with the [signal handlers](signal), which is why
//! the environment refers to it with a `'static` reference rather than owning
//! it. [`RealSystem`] provides an implementation for `System` that interacts
//! with the underlying system. [`VirtualSystem`] is a dummy for simulating the
//! system's behavior without affecting the actual system.

pub mod builtin;
pub mod io;
pub mod job;
pub mod semantics;
pub mod signal;
pub mod system;

use self::builtin::Builtin;
use self::job::JobTable;
use self::job::Pid;
use self::semantics::ExitStatus;
pub use self::system::RealSystem;
pub use self::system::System;
pub use self::system::VirtualSystem;
use nix::errno::Errno;
use nix::sys::signal::SigSet;
use nix::sys::signal::SigmaskHow;
use std::collections::HashMap;

/// Whole shell execution environment.
#[derive(Debug)]
pub struct Env {
    /// Built-in utilities available in the environment.
    pub builtins: HashMap<&'static str, Builtin>,

    /// Exit status of the last executed command.
    pub exit_status: ExitStatus,

    /// Jobs managed in the environment.
    ///
    /// The same table is registered to the signal handlers.
    pub jobs: &'static JobTable,

    /// Interface to the system-managed parts of the environment.
    pub system: Box<dyn System>,
}

impl Env {
    /// Creates a new environment with the given system and job table.
    ///
    /// Built-ins are empty and the exit status is zero.
    pub fn with_system(system: Box<dyn System>, jobs: &'static JobTable) -> Env {
        Env {
            builtins: Default::default(),
            exit_status: Default::default(),
            jobs,
            system,
        }
    }

    /// Creates a new environment with a [`VirtualSystem`].
    ///
    /// A new job table is leaked to obtain the `'static` reference, and the
    /// virtual system is set up to simulate the jobs in it. Use this function
    /// in tests only.
    pub fn new_virtual() -> Env {
        let jobs = Box::leak(Box::new(JobTable::new()));
        Env::with_system(Box::new(VirtualSystem::with_jobs(jobs)), jobs)
    }

    /// Prints the text to the standard output.
    ///
    /// Returns [`ExitStatus::FAILURE`] if the text could not be written, and
    /// [`ExitStatus::SUCCESS`] otherwise.
    pub fn print(&mut self, text: &str) -> ExitStatus {
        match self.system.write_stdout(text) {
            Ok(()) => ExitStatus::SUCCESS,
            Err(_) => ExitStatus::FAILURE,
        }
    }

    /// Blocks the [job signals](signal::job_signals).
    ///
    /// Returns the previous signal blocking mask, which should be passed to
    /// [`restore_sigmask`](Self::restore_sigmask) after the critical section.
    pub fn block_job_signals(&mut self) -> Result<SigSet, Errno> {
        let mut old_mask = SigSet::empty();
        self.system.sigmask(
            SigmaskHow::SIG_BLOCK,
            Some(&signal::job_signals()),
            Some(&mut old_mask),
        )?;
        Ok(old_mask)
    }

    /// Sets the signal blocking mask to the one returned by
    /// [`block_job_signals`](Self::block_job_signals).
    pub fn restore_sigmask(&mut self, old_mask: &SigSet) -> Result<(), Errno> {
        self.system
            .sigmask(SigmaskHow::SIG_SETMASK, Some(old_mask), None)
    }

    /// Waits until the job with the process ID is no longer in the foreground.
    ///
    /// The job leaves the foreground when the `SIGCHLD` handler removes it
    /// after termination or marks it stopped, or when the `SIGTSTP` handler
    /// marks it stopped. This function returns immediately if the job is not
    /// the foreground job.
    ///
    /// The job signals are blocked while the table is examined and atomically
    /// unblocked while waiting with `sigsuspend`, so a state change cannot slip
    /// in between the check and the wait. There is no timeout.
    pub fn wait_for_foreground(&mut self, pid: Pid) -> Result<(), Errno> {
        let old_mask = self.block_job_signals()?;
        let mut suspend_mask = old_mask;
        for signal in signal::job_signals().iter() {
            suspend_mask.remove(signal);
        }
        while self.jobs.foreground_pid() == Some(pid) {
            self.system.sigsuspend(&suspend_mask);
        }
        self.restore_sigmask(&old_mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobState;
    use crate::system::r#virtual::ForegroundOutcome;
    use nix::sys::signal::Signal;

    fn virtual_env() -> (Env, VirtualSystem) {
        let jobs = Box::leak(Box::new(JobTable::new()));
        let system = VirtualSystem::with_jobs(jobs);
        let env = Env::with_system(Box::new(system.clone()), jobs);
        (env, system)
    }

    #[test]
    fn print_writes_to_stdout() {
        let (mut env, system) = virtual_env();
        assert_eq!(env.print("hello\n"), ExitStatus::SUCCESS);
        assert_eq!(system.state.borrow().stdout, "hello\n");
    }

    #[test]
    fn block_and_restore_job_signals() {
        let (mut env, system) = virtual_env();
        let old_mask = env.block_job_signals().unwrap();
        assert_eq!(old_mask, SigSet::empty());
        {
            let state = system.state.borrow();
            assert!(state.sigmask.contains(Signal::SIGCHLD));
            assert!(state.sigmask.contains(Signal::SIGINT));
            assert!(state.sigmask.contains(Signal::SIGTSTP));
        }
        env.restore_sigmask(&old_mask).unwrap();
        assert_eq!(system.state.borrow().sigmask, SigSet::empty());
    }

    #[test]
    fn wait_for_foreground_returns_at_once_for_non_foreground_job() {
        let (mut env, system) = virtual_env();
        let pid = Pid::from_raw(10);
        env.jobs.add(pid, JobState::Background, "a &").unwrap();
        env.wait_for_foreground(pid).unwrap();
        assert_eq!(system.state.borrow().suspensions, 0);
        assert_eq!(env.jobs.len(), 1);
    }

    #[test]
    fn wait_for_foreground_until_job_terminates() {
        let (mut env, system) = virtual_env();
        let pid = Pid::from_raw(10);
        env.jobs.add(pid, JobState::Foreground, "./myspin 1").unwrap();
        env.wait_for_foreground(pid).unwrap();
        assert_eq!(system.state.borrow().suspensions, 1);
        assert!(env.jobs.is_empty());
        assert_eq!(system.state.borrow().sigmask, SigSet::empty());
    }

    #[test]
    fn wait_for_foreground_until_job_stops() {
        let (mut env, system) = virtual_env();
        system.state.borrow_mut().foreground_outcome = ForegroundOutcome::Stop;
        let pid = Pid::from_raw(10);
        env.jobs.add(pid, JobState::Foreground, "./myspin 1").unwrap();
        env.wait_for_foreground(pid).unwrap();
        assert_eq!(env.jobs.find_by_pid(pid).unwrap().state, JobState::Stopped);
    }

    #[test]
    fn wait_for_foreground_keeps_other_blocked_signals() {
        let (mut env, system) = virtual_env();
        system.state.borrow_mut().sigmask.add(Signal::SIGUSR1);
        let pid = Pid::from_raw(10);
        env.jobs.add(pid, JobState::Foreground, "./myspin 1").unwrap();
        env.wait_for_foreground(pid).unwrap();
        let state = system.state.borrow();
        assert!(state.sigmask.contains(Signal::SIGUSR1));
        assert!(!state.sigmask.contains(Signal::SIGCHLD));
    }

    #[test]
    fn new_virtual_has_empty_job_table() {
        let env = Env::new_virtual();
        assert!(env.jobs.is_empty());
        assert!(env.builtins.is_empty());
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
    }
}

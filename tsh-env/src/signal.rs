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

//! Signal relay
//!
//! This module installs the handlers for the signals the shell responds to:
//!
//! - `SIGCHLD` reaps every child that has terminated or stopped, updates the
//!   [job table](crate::job::JobTable), and reports jobs stopped or killed by
//!   a signal. This is the only place where jobs are removed from the table.
//! - `SIGINT` is forwarded to the process group of the foreground job. The
//!   job is removed later, when its termination is reaped.
//! - `SIGTSTP` is forwarded to the process group of the foreground job, which
//!   is marked stopped at once.
//! - `SIGQUIT` terminates the shell.
//!
//! The handlers reach the job table through a process-wide pointer set by
//! [`install`]. They can only perform async-signal-safe operations: atomic
//! loads and stores on the table, `waitpid`, `kill`, and `write` through
//! [`print_line_signal_safe`]. Each handler is installed with the
//! [job signals](job_signals) in its mask so handlers that touch the table
//! never preempt each other.
//!
//! The state transitions are implemented in [`record_child_status`] and
//! [`forward`], which are independent of real signal delivery.

use crate::io::print_line_signal_safe;
use crate::job::Jid;
use crate::job::JobState;
use crate::job::JobTable;
use crate::job::Pid;
use nix::errno::Errno;
use nix::sys::signal::SaFlags;
use nix::sys::signal::SigAction;
use nix::sys::signal::SigHandler;
use nix::sys::signal::SigSet;
use nix::sys::signal::Signal;
use nix::sys::wait::WaitPidFlag;
use nix::sys::wait::WaitStatus;
use std::ffi::c_int;
use std::fmt::Display;
use std::fmt::Formatter;
use std::ptr::null_mut;
use std::sync::atomic::AtomicPtr;
use std::sync::atomic::Ordering;

/// Job table the handlers operate on
static JOBS: AtomicPtr<JobTable> = AtomicPtr::new(null_mut());

fn installed_jobs() -> Option<&'static JobTable> {
    // SAFETY: The pointer is either null or derived from a `&'static JobTable`
    // in `install`.
    unsafe { JOBS.load(Ordering::Acquire).as_ref() }
}

/// Returns the set of signals whose handlers access the job table.
///
/// The set contains `SIGCHLD`, `SIGINT`, and `SIGTSTP`. Code that reads the
/// command lines in the job table or inserts a job should block these signals.
#[must_use]
pub fn job_signals() -> SigSet {
    let mut set = SigSet::empty();
    set.add(Signal::SIGCHLD);
    set.add(Signal::SIGINT);
    set.add(Signal::SIGTSTP);
    set
}

/// Report of a job state change printed by the `SIGCHLD` handler
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Notice {
    /// The job has been stopped by a signal.
    Stopped { jid: Jid, pid: Pid, signal: Signal },
    /// The job has been terminated by a signal and removed.
    Terminated { jid: Jid, pid: Pid, signal: Signal },
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Notice::Stopped { jid, pid, signal } => {
                write!(f, "Job [{jid}] ({pid}) stopped by signal {}", signal as c_int)
            }
            Notice::Terminated { jid, pid, signal } => {
                write!(
                    f,
                    "Job [{jid}] ({pid}) terminated by signal {}",
                    signal as c_int
                )
            }
        }
    }
}

/// Applies a status reported by `waitpid` to the job table.
///
/// - A stopped job is marked [`JobState::Stopped`]. A job that is already
///   stopped (by the `SIGTSTP` handler) is reported all the same.
/// - A job terminated by a signal is removed and reported.
/// - A job that exited normally is removed silently.
///
/// Statuses of processes not in the table are ignored. The return value is
/// the notice to be printed, if any.
///
/// This function is handler-safe.
pub fn record_child_status(jobs: &JobTable, status: WaitStatus) -> Option<Notice> {
    match status {
        WaitStatus::Stopped(pid, signal) => {
            let jid = jobs.set_state(pid, JobState::Stopped)?;
            Some(Notice::Stopped { jid, pid, signal })
        }
        WaitStatus::Signaled(pid, signal, _) => {
            let jid = jobs.remove(pid)?;
            Some(Notice::Terminated { jid, pid, signal })
        }
        WaitStatus::Exited(pid, _) => {
            jobs.remove(pid);
            None
        }
        _ => None,
    }
}

/// Reaps all children that have terminated or stopped, without blocking.
///
/// Each status is applied to `jobs` by [`record_child_status`] and the
/// resulting notice is printed to the standard output. If `jobs` is `None`,
/// children are reaped without notice.
///
/// Returns `Ok(())` when no more children are immediately reapable, including
/// when there is no child at all (`ECHILD`). Other errors are returned.
///
/// This function is handler-safe.
pub fn reap_children(jobs: Option<&JobTable>) -> Result<(), Errno> {
    let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED;
    loop {
        match nix::sys::wait::waitpid(None, Some(flags)) {
            Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => return Ok(()),
            Ok(status) => {
                let notice = jobs.and_then(|jobs| record_child_status(jobs, status));
                if let Some(notice) = notice {
                    print_line_signal_safe(format_args!("{notice}"));
                }
            }
            Err(Errno::EINTR) => continue,
            Err(errno) => return Err(errno),
        }
    }
}

/// Forwards a signal to the process group of the foreground job.
///
/// The signal is sent with `kill` to the negated process ID of the foreground
/// job. If the signal is `SIGTSTP`, the job is marked stopped after sending.
/// Returns the process ID of the job the signal was forwarded to, or
/// `Ok(None)` if there is no foreground job.
///
/// This function is handler-safe if `kill` is.
pub fn forward<F>(jobs: &JobTable, signal: Signal, kill: F) -> Result<Option<Pid>, Errno>
where
    F: FnOnce(Pid, Signal) -> Result<(), Errno>,
{
    let Some(pid) = jobs.foreground_pid() else {
        return Ok(None);
    };
    kill(Pid::from_raw(-pid.as_raw()), signal)?;
    if signal == Signal::SIGTSTP {
        jobs.set_state(pid, JobState::Stopped);
    }
    Ok(Some(pid))
}

/// Saves `errno` and restores it when dropped.
struct ErrnoGuard(i32);

impl ErrnoGuard {
    fn new() -> Self {
        ErrnoGuard(Errno::last_raw())
    }
}

impl Drop for ErrnoGuard {
    fn drop(&mut self) {
        Errno::set_raw(self.0)
    }
}

fn exit_from_handler() -> ! {
    // SAFETY: _exit is async-signal-safe.
    unsafe { libc::_exit(1) }
}

fn send_signal(target: Pid, signal: Signal) -> Result<(), Errno> {
    match nix::sys::signal::kill(target, signal) {
        // The group may have gone between the check and the kill.
        Err(Errno::ESRCH) => Ok(()),
        result => result,
    }
}

extern "C" fn on_child(_: c_int) {
    let _guard = ErrnoGuard::new();
    if let Err(errno) = reap_children(installed_jobs()) {
        print_line_signal_safe(format_args!("waitpid error: {}", errno.desc()));
        exit_from_handler();
    }
}

fn on_job_control_signal(signal: c_int) {
    let _guard = ErrnoGuard::new();
    let Some(jobs) = installed_jobs() else { return };
    let Ok(signal) = Signal::try_from(signal) else {
        return;
    };
    if let Err(errno) = forward(jobs, signal, send_signal) {
        print_line_signal_safe(format_args!("kill error: {}", errno.desc()));
        exit_from_handler();
    }
}

extern "C" fn on_interrupt(signal: c_int) {
    on_job_control_signal(signal)
}

extern "C" fn on_stop(signal: c_int) {
    on_job_control_signal(signal)
}

extern "C" fn on_quit(_: c_int) {
    print_line_signal_safe(format_args!("Terminating after receipt of SIGQUIT signal"));
    exit_from_handler();
}

/// Error in [`install`]
#[derive(Clone, Copy, Debug, Eq, thiserror::Error, PartialEq)]
#[error("sigaction error: {errno}")]
pub struct InstallError {
    /// Signal whose handler could not be installed
    pub signal: Signal,
    /// Error returned by `sigaction`
    pub errno: Errno,
}

/// Installs the signal handlers operating on the job table.
///
/// The handlers are installed with `SA_RESTART` so that an interrupted read
/// of the next command line is resumed.
///
/// This function should be called once before the shell starts any job.
/// Calling it again replaces the job table the handlers refer to.
pub fn install(jobs: &'static JobTable) -> Result<(), InstallError> {
    let ptr: *const JobTable = jobs;
    JOBS.store(ptr.cast_mut(), Ordering::Release);

    let handlers: [(Signal, extern "C" fn(c_int)); 4] = [
        (Signal::SIGCHLD, on_child),
        (Signal::SIGINT, on_interrupt),
        (Signal::SIGTSTP, on_stop),
        (Signal::SIGQUIT, on_quit),
    ];
    for (signal, handler) in handlers {
        let action = SigAction::new(
            SigHandler::Handler(handler),
            SaFlags::SA_RESTART,
            job_signals(),
        );
        // SAFETY: The handlers only perform async-signal-safe operations.
        unsafe { nix::sys::signal::sigaction(signal, &action) }
            .map_err(|errno| InstallError { signal, errno })?;
    }
    Ok(())
}

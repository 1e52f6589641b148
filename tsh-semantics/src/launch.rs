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

//! Process launcher
//!
//! [`launch`] starts an external utility as a new job:
//!
//! 1. The job signals are blocked so that the `SIGCHLD` handler cannot see
//!    the child before the job is in the table.
//! 2. The shell forks. The child restores the signal mask, moves to a new
//!    process group whose ID is its own process ID, and executes the utility.
//!    If the execution fails, the child prints an error and exits with status
//!    1 without returning to the shell.
//! 3. The parent also puts the child into the new process group, adds the
//!    job to the table, and restores the signal mask.

use log::debug;
use std::ffi::CString;
use std::ffi::NulError;
use thiserror::Error;
use tsh_env::Env;
use tsh_env::job::Jid;
use tsh_env::job::JobState;
use tsh_env::job::Pid;
use tsh_env::semantics::ExitStatus;
use tsh_env::system::Errno;
use tsh_env::system::ForkResult;
use tsh_env::system::SigSet;

/// Error in [`launch`]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum LaunchError {
    /// The argument vector is empty.
    #[error("no command to launch")]
    EmptyCommand,
    /// An argument contains a null byte.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] NulError),
    /// The `fork` system call failed.
    #[error("fork error: {}", .0.desc())]
    Fork(Errno),
    /// The signal blocking mask could not be changed.
    #[error("sigprocmask error: {}", .0.desc())]
    SignalMask(Errno),
}

impl LaunchError {
    /// Whether the error should terminate the shell
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, LaunchError::Fork(_) | LaunchError::SignalMask(_))
    }
}

/// Error in executing the utility in the child process
///
/// This error is reported by the child, so the shell never sees it.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{name}: Command not found")]
pub struct ExecError {
    /// Name of the utility
    pub name: String,
}

/// Result of a successful [`launch`]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Launched {
    /// Process ID of the child, which is also its process group ID
    pub pid: Pid,
    /// Job number, or `None` if the job could not be added to the table
    pub jid: Option<Jid>,
}

/// Starts an external utility as a new job.
///
/// `argv` is the argument vector of the utility, whose first element names
/// the utility to be searched for in `$PATH`. `state` is the initial state of
/// the job, either [`JobState::Foreground`] or [`JobState::Background`].
/// `command_line` is retained in the job table for display.
///
/// If the job table is full, an error message is printed and the child keeps
/// running untracked. The returned [`Launched::jid`] is `None` in that case.
///
/// See the [module documentation](self) for the steps.
pub fn launch(
    env: &mut Env,
    argv: &[String],
    state: JobState,
    command_line: &str,
) -> Result<Launched, LaunchError> {
    let Some(name) = argv.first() else {
        return Err(LaunchError::EmptyCommand);
    };
    let args = argv
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    // The child does not allocate.
    let not_found = format!("{}\n", ExecError { name: name.clone() });

    let old_mask = env.block_job_signals().map_err(LaunchError::SignalMask)?;
    match env.system.fork() {
        Err(errno) => {
            _ = env.restore_sigmask(&old_mask);
            Err(LaunchError::Fork(errno))
        }

        Ok(ForkResult::Child) => run_child(env, &old_mask, &args, &not_found),

        Ok(ForkResult::Parent { child }) => {
            // The child may not have called setpgid yet.
            _ = env.system.setpgid(child, child);
            let jid = match env.jobs.add(child, state, command_line) {
                Ok(jid) => {
                    debug!("Added job [{jid}] {child} {command_line}");
                    Some(jid)
                }
                Err(error) => {
                    env.print(&format!("{error}\n"));
                    None
                }
            };
            env.restore_sigmask(&old_mask)
                .map_err(LaunchError::SignalMask)?;
            Ok(Launched { pid: child, jid })
        }
    }
}

/// Performs the child side of [`launch`]. Never returns.
fn run_child(env: &mut Env, old_mask: &SigSet, args: &[CString], not_found: &str) -> ! {
    _ = env.restore_sigmask(old_mask);
    _ = env.system.setpgid(Pid::from_raw(0), Pid::from_raw(0));
    if let Some(file) = args.first() {
        _ = env.system.execvp(file, args);
    }
    env.print(not_found);
    env.system.exit_child(ExitStatus::FAILURE)
}

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

//! Bg built-in
//!
//! This module implements the `bg` built-in, which resumes a job in the
//! background.
//!
//! The built-in takes one operand, a job ID of the form `%n` (job number) or
//! `n` (process ID). It sends `SIGCONT` to the process group of the job, marks
//! the job running in the background, and prints `[jid] (pid) command_line`.
//! Extra operands are ignored.
//!
//! # Implementation notes
//!
//! The signal is sent even if the job is already running. If the process
//! group has already gone (`ESRCH`), the error is ignored since the `SIGCHLD`
//! handler will remove the job.

use crate::common::report_failure;
use crate::common::report_system_error;
use crate::common::with_job_signals_blocked;
use log::debug;
use std::ops::ControlFlow::Continue;
use thiserror::Error;
use tsh_env::Env;
use tsh_env::job::Job;
use tsh_env::job::JobState;
use tsh_env::job::Pid;
use tsh_env::job::fmt::Report;
use tsh_env::job::id::FindError;
use tsh_env::job::id::ParseError;
use tsh_env::job::id::parse;
use tsh_env::system::Errno;
use tsh_env::system::Signal;
use tsh_semantics::SystemError;

// Some definitions in this module are shared with the `fg` built-in.

/// Errors that may occur when resuming a job
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub(crate) enum ResumeError {
    /// No operand is given.
    #[error("{0} command requires PID or %jobid argument")]
    MissingOperand(String),
    /// The operand is not a job ID.
    #[error("{0}: {1}")]
    InvalidJobId(String, ParseError),
    /// No job has the job number. The operand is kept as typed.
    #[error("{0}: No such job")]
    NoSuchJob(String),
    /// No job has the process ID. The operand is kept as typed.
    #[error("({0}): No such process")]
    NoSuchProcess(String),
    /// A system call failed.
    #[error(transparent)]
    SystemError(#[from] SystemError),
}

impl ResumeError {
    /// Reports the error.
    ///
    /// A [`SystemError`] aborts the shell. Other errors only make the
    /// built-in fail.
    pub(crate) fn report(&self, env: &mut Env) -> crate::Result {
        match *self {
            ResumeError::SystemError(error) => report_system_error(env, error),
            _ => report_failure(env, self),
        }
    }
}

/// Sends `SIGCONT` to the process group of the job.
fn continue_job(env: &mut Env, pid: Pid) -> Result<(), SystemError> {
    match env.system.kill(Pid::from_raw(-pid.as_raw()), Some(Signal::SIGCONT)) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(errno) => Err(SystemError {
            primitive: "kill",
            errno,
        }),
    }
}

/// Resumes the job specified by the operand of the built-in.
///
/// `args` are the command line words including the built-in name. The job is
/// continued and put into `state` with the job signals blocked, so the
/// `SIGCHLD` handler cannot remove the job in the middle. Returns a snapshot
/// of the resumed job.
pub(crate) fn resume(env: &mut Env, args: &[String], state: JobState) -> Result<Job, ResumeError> {
    let name = args.first().map_or("", String::as_str);
    let Some(operand) = args.get(1) else {
        return Err(ResumeError::MissingOperand(name.to_owned()));
    };
    let job_id =
        parse(operand).map_err(|error| ResumeError::InvalidJobId(name.to_owned(), error))?;

    let job = with_job_signals_blocked(env, |env: &mut Env| -> Result<Job, ResumeError> {
        let mut job = job_id.find(env.jobs).map_err(|error| match error {
            FindError::NoSuchJob(_) => ResumeError::NoSuchJob(operand.clone()),
            FindError::NoSuchProcess(_) => ResumeError::NoSuchProcess(operand.clone()),
        })?;
        continue_job(env, job.pid)?;
        env.jobs.set_state(job.pid, state);
        job.state = state;
        Ok(job)
    })??;

    debug!("Resumed job [{}] ({})", job.jid, job.pid);
    Ok(job)
}

/// Entry point of the `bg` built-in
pub fn main(env: &mut Env, args: Vec<String>) -> crate::Result {
    match resume(env, &args, JobState::Background) {
        Ok(job) => {
            let exit_status = env.print(&format!("{:#}\n", Report { job: &job }));
            (exit_status, Continue(()))
        }
        Err(error) => error.report(env),
    }
}

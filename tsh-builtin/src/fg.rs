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

//! Fg built-in
//!
//! This module implements the `fg` built-in, which resumes a job in the
//! foreground.
//!
//! The built-in takes the same operand as the [`bg`](crate::bg) built-in. It
//! sends `SIGCONT` to the process group of the job, marks the job as the
//! foreground job, and waits until the job terminates or stops again. Nothing
//! is printed on success.
//!
//! The exit status is zero if the job was resumed. The exit status of the job
//! itself is not known to the shell.

use crate::bg::resume;
use crate::common::report_system_error;
use std::ops::ControlFlow::Continue;
use tsh_env::Env;
use tsh_env::job::JobState;
use tsh_env::semantics::ExitStatus;
use tsh_semantics::SystemError;

/// Entry point of the `fg` built-in
pub fn main(env: &mut Env, args: Vec<String>) -> crate::Result {
    let job = match resume(env, &args, JobState::Foreground) {
        Ok(job) => job,
        Err(error) => return error.report(env),
    };

    match env.wait_for_foreground(job.pid) {
        Ok(()) => (ExitStatus::SUCCESS, Continue(())),
        Err(errno) => {
            let primitive = "sigprocmask";
            report_system_error(env, SystemError { primitive, errno })
        }
    }
}

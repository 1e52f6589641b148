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

//! Common items for implementing built-ins.

use std::fmt::Display;
use std::ops::ControlFlow::Continue;
use tsh_env::Env;
use tsh_env::semantics::ExitStatus;
use tsh_env::system::Errno;
use tsh_env::system::SigSet;
use tsh_semantics::Handle;
use tsh_semantics::SystemError;

/// Prints an error message and returns a failure result.
///
/// The message is followed by a newline. The read-eval loop continues.
pub fn report_failure<M: Display + ?Sized>(env: &mut Env, message: &M) -> crate::Result {
    env.print(&format!("{message}\n"));
    (ExitStatus::FAILURE, Continue(()))
}

/// Handles a [`SystemError`], which aborts the shell.
pub fn report_system_error(env: &mut Env, error: SystemError) -> crate::Result {
    (ExitStatus::FAILURE, error.handle(env))
}

/// Runs the function with the job signals blocked.
///
/// The signal blocking mask is restored before returning, whatever the
/// function returns. Errors in changing the mask are returned as
/// [`SystemError`]s.
pub fn with_job_signals_blocked<T, F>(env: &mut Env, f: F) -> Result<T, SystemError>
where
    F: FnOnce(&mut Env) -> T,
{
    let to_system_error = |errno: Errno| SystemError {
        primitive: "sigprocmask",
        errno,
    };
    let old_mask: SigSet = env.block_job_signals().map_err(to_system_error)?;
    let result = f(env);
    env.restore_sigmask(&old_mask).map_err(to_system_error)?;
    Ok(result)
}

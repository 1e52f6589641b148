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

//! Error handlers.

use crate::launch::LaunchError;
use std::ops::ControlFlow::{Break, Continue};
use thiserror::Error;
use tsh_env::Env;
use tsh_env::semantics::Divert;
use tsh_env::semantics::ExitStatus;
use tsh_env::system::Errno;

/// Error handler.
///
/// Most errors in the shell are handled by printing an error message and
/// setting a non-zero exit status. This trait provides a standard interface
/// for implementing that behavior.
pub trait Handle {
    /// Handles the error.
    fn handle(&self, env: &mut Env) -> super::Result;
}

/// Failure of a system call the shell cannot do without
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("{primitive} error: {}", .errno.desc())]
pub struct SystemError {
    /// Name of the failed system call
    pub primitive: &'static str,
    /// Error returned by the system call
    pub errno: Errno,
}

/// Prints an error message and aborts the shell.
///
/// This implementation returns `Divert::Abort(ExitStatus::FAILURE)`.
impl Handle for SystemError {
    fn handle(&self, env: &mut Env) -> super::Result {
        env.print(&format!("tsh: {self}\n"));
        env.exit_status = ExitStatus::FAILURE;
        Break(Divert::Abort(ExitStatus::FAILURE))
    }
}

/// Prints an error message and sets the exit status to non-zero.
///
/// The read-eval loop continues with the next line.
impl Handle for tsh_syntax::Error {
    fn handle(&self, env: &mut Env) -> super::Result {
        env.print(&format!("tsh: {self}\n"));
        env.exit_status = ExitStatus::FAILURE;
        Continue(())
    }
}

/// Prints an error message and sets the exit status to non-zero.
///
/// Failures of `fork` and `sigprocmask` abort the shell as [`SystemError`]s
/// do. Other errors only affect the current command.
impl Handle for LaunchError {
    fn handle(&self, env: &mut Env) -> super::Result {
        let primitive = match *self {
            LaunchError::Fork(errno) => Some(("fork", errno)),
            LaunchError::SignalMask(errno) => Some(("sigprocmask", errno)),
            LaunchError::EmptyCommand | LaunchError::InvalidArgument(_) => None,
        };
        if let Some((primitive, errno)) = primitive {
            return SystemError { primitive, errno }.handle(env);
        }
        env.print(&format!("tsh: {self}\n"));
        env.exit_status = ExitStatus::FAILURE;
        Continue(())
    }
}

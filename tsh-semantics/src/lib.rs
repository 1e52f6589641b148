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

//! Semantics of the shell language.
//!
//! This crate defines how a command line is evaluated. [`eval`] runs a
//! built-in or [launches](launch::launch) an external utility as a job and
//! waits for it if it is in the foreground.
//!
//! [`read_eval_loop`] reads and evaluates command lines from an input until
//! the end of input or until a command requests the shell to exit.

pub mod launch;

#[doc(no_inline)]
pub use tsh_env::semantics::*;

mod handle;
pub use handle::Handle;
pub use handle::SystemError;

mod runner;
pub use runner::MAX_LINE;
pub use runner::read_eval_loop;

use self::launch::launch;
use std::ops::ControlFlow::Continue;
use tsh_env::Env;
use tsh_env::job::Job;
use tsh_env::job::JobState;
use tsh_env::job::fmt::Report;

/// Evaluates a command line.
///
/// The line is tokenized by [`tsh_syntax::parse`]. A blank line does nothing.
/// If the first word names a built-in in `env.builtins`, the built-in is
/// executed and its result is returned. Otherwise, the words are executed as
/// an external utility in a new job:
///
/// - A background job is reported as `[jid] (pid) command_line`.
/// - For a foreground job, this function waits until the job terminates or
///   stops. If the job could not be added to the table, it is not waited for.
///
/// The command line retained in the job table is `line` without the trailing
/// newline.
pub fn eval(env: &mut Env, line: &str) -> Result {
    let command_line = line.strip_suffix('\n').unwrap_or(line);
    let command = match tsh_syntax::parse(command_line) {
        Ok(command) => command,
        Err(error) => return error.handle(env),
    };
    let Some(name) = command.name() else {
        return Continue(());
    };

    if let Some(builtin) = env.builtins.get(name).copied() {
        let (exit_status, result) = (builtin.execute)(env, command.argv);
        env.exit_status = exit_status;
        return result;
    }

    let state = if command.background {
        JobState::Background
    } else {
        JobState::Foreground
    };
    let launched = match launch(env, &command.argv, state, command_line) {
        Ok(launched) => launched,
        Err(error) => return error.handle(env),
    };
    env.exit_status = ExitStatus::SUCCESS;
    let Some(jid) = launched.jid else {
        return Continue(());
    };

    if command.background {
        let job = Job {
            pid: launched.pid,
            jid,
            state,
            command_line: command_line.to_owned(),
        };
        env.print(&format!("{:#}\n", Report { job: &job }));
    } else if let Err(errno) = env.wait_for_foreground(launched.pid) {
        let primitive = "sigprocmask";
        return SystemError { primitive, errno }.handle(env);
    }
    Continue(())
}

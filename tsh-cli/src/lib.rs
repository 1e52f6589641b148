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

//! This is an internal library crate for the tsh shell. **This crate is not
//! intended to be used as a library by other crates.**
//!
//! The entry point for the shell is the [`main`] function, which is to be used
//! as the `main` function in the binary crate. The function sets up the shell
//! environment and runs the main read-eval loop.

pub mod startup;

use self::startup::USAGE;
use self::startup::args::Parse;
use self::startup::args::Run;
use log::debug;
use std::ops::ControlFlow::{Break, Continue};
use tsh_env::Env;
use tsh_env::RealSystem;
use tsh_env::job::JobTable;
use tsh_env::signal;
use tsh_semantics::ExitStatus;
use tsh_semantics::read_eval_loop;

/// Parses the command-line arguments.
///
/// Returns the exit status if the shell should exit without running the loop.
fn parse_args(env: &mut Env) -> Result<Run, ExitStatus> {
    match startup::args::parse(std::env::args()) {
        Ok(Parse::Run(run)) => Ok(run),
        Ok(Parse::Help) => {
            env.print(USAGE);
            Err(ExitStatus::FAILURE)
        }
        Err(e) => {
            env.print(&format!("tsh: {e}\n{USAGE}"));
            Err(ExitStatus::FAILURE)
        }
    }
}

/// Runs the shell and returns its exit status.
fn run_as_shell_process(env: &mut Env) -> ExitStatus {
    let run = match parse_args(env) {
        Ok(run) => run,
        Err(exit_status) => return exit_status,
    };

    startup::init_logger(run.verbose);

    if let Err(e) = signal::install(env.jobs) {
        env.print(&format!("tsh: {e}\n"));
        return ExitStatus::FAILURE;
    }
    debug!("Installed signal handlers");

    env.builtins.extend(tsh_builtin::BUILTINS.iter().copied());

    let stdin = std::io::stdin();
    match read_eval_loop(env, stdin.lock(), run.prompt) {
        Continue(()) => ExitStatus::SUCCESS,
        Break(divert) => divert.exit_status(),
    }
}

pub fn main() -> ! {
    // On failure, messages go to the original standard error.
    _ = startup::redirect_stderr_to_stdout();

    static JOBS: JobTable = JobTable::new();

    // SAFETY: This is the only instance of RealSystem we create in the whole
    // process.
    let system = unsafe { RealSystem::new() };
    let mut env = Env::with_system(Box::new(system), &JOBS);

    let exit_status = run_as_shell_process(&mut env);
    std::process::exit(exit_status.0)
}

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

//! Jobs built-in
//!
//! This module implements the `jobs` built-in, which lists the jobs in the
//! job table.
//!
//! Each job is printed on its own line as `[jid] (pid) state command_line`
//! where the state is one of `Running`, `Foreground`, or `Stopped`. Jobs are
//! listed in the order of the table slots, which may differ from the order of
//! the job numbers. Operands are ignored.
//!
//! Listing does not change the table, so running the built-in twice in a row
//! prints the same result.

use crate::common::report_system_error;
use crate::common::with_job_signals_blocked;
use std::fmt::Write;
use std::ops::ControlFlow::Continue;
use tsh_env::Env;
use tsh_env::job::fmt::Report;

/// Entry point of the `jobs` built-in
pub fn main(env: &mut Env, _args: Vec<String>) -> crate::Result {
    let jobs = match with_job_signals_blocked(env, |env| env.jobs.list()) {
        Ok(jobs) => jobs,
        Err(error) => return report_system_error(env, error),
    };

    let mut output = String::new();
    for job in &jobs {
        writeln!(output, "{}", Report { job }).ok();
    }
    (env.print(&output), Continue(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::virtual_env;
    use tsh_env::job::JobState;
    use tsh_env::job::Pid;
    use tsh_env::semantics::ExitStatus;
    use tsh_env::system::SigSet;

    #[test]
    fn no_jobs() {
        let (mut env, state) = virtual_env();
        let result = main(&mut env, vec!["jobs".to_string()]);
        assert_eq!(result, (ExitStatus::SUCCESS, Continue(())));
        assert_eq!(state.borrow().stdout, "");
    }

    #[test]
    fn jobs_are_listed_with_states() {
        let (mut env, state) = virtual_env();
        env.jobs.add(Pid::from_raw(10), JobState::Background, "./myspin 2 &").unwrap();
        env.jobs.add(Pid::from_raw(11), JobState::Stopped, "./myspin 5").unwrap();
        env.jobs.add(Pid::from_raw(12), JobState::Foreground, "./myspin 3").unwrap();

        let result = main(&mut env, vec!["jobs".to_string()]);
        assert_eq!(result, (ExitStatus::SUCCESS, Continue(())));
        assert_eq!(
            state.borrow().stdout,
            "[1] (10) Running ./myspin 2 &\n\
             [2] (11) Stopped ./myspin 5\n\
             [3] (12) Foreground ./myspin 3\n"
        );
        assert_eq!(state.borrow().sigmask, SigSet::empty());
    }

    #[test]
    fn jobs_are_listed_in_slot_order() {
        let (mut env, state) = virtual_env();
        env.jobs.add(Pid::from_raw(10), JobState::Background, "a &").unwrap();
        env.jobs.add(Pid::from_raw(11), JobState::Background, "b &").unwrap();
        env.jobs.add(Pid::from_raw(12), JobState::Background, "c &").unwrap();
        env.jobs.remove(Pid::from_raw(11));
        env.jobs.add(Pid::from_raw(13), JobState::Background, "d &").unwrap();

        _ = main(&mut env, vec!["jobs".to_string()]);
        assert_eq!(
            state.borrow().stdout,
            "[1] (10) Running a &\n\
             [4] (13) Running d &\n\
             [3] (12) Running c &\n"
        );
    }

    #[test]
    fn listing_is_idempotent() {
        let (mut env, state) = virtual_env();
        env.jobs.add(Pid::from_raw(10), JobState::Stopped, "vi").unwrap();

        _ = main(&mut env, vec!["jobs".to_string()]);
        let first = std::mem::take(&mut state.borrow_mut().stdout);
        _ = main(&mut env, vec!["jobs".to_string()]);
        assert_eq!(state.borrow().stdout, first);
        assert_eq!(env.jobs.len(), 1);
    }
}

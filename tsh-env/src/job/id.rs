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

//! Job ID parsing
//!
//! This module provides functionalities to parse job IDs and find jobs by using
//! them. A job ID is a string that identifies a job contained in a job table.
//! The string can take two forms:
//!
//! - A job ID of the form `%n` (where `n` is a decimal integer) refers to the
//!   job with job number `n`.
//! - A job ID of the form `n` (where `n` is a decimal integer) refers to the
//!   job whose process group leader has process ID `n`.
//!
//! You can parse a job ID with [`parse`] and get a [`JobId`] as a result.

use super::Jid;
use super::Job;
use super::JobTable;
use super::Pid;
use std::fmt::Display;
use std::fmt::Formatter;
use thiserror::Error;

/// Result of parsing a job ID
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum JobId {
    /// Job with a specific job number (`%n`)
    JobNumber(u32),
    /// Job with a specific process ID (`n`)
    ProcessId(Pid),
}

/// Converts a job ID to the original string form.
impl Display for JobId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            JobId::JobNumber(number) => write!(f, "%{number}"),
            JobId::ProcessId(pid) => pid.fmt(f),
        }
    }
}

/// Error that may occur in job ID [parsing](parse)
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
#[error("argument must be a PID or %jobid")]
pub struct ParseError;

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a job ID.
///
/// ```
/// # use tsh_env::job::Pid;
/// # use tsh_env::job::id::{JobId, ParseError, parse};
/// assert_eq!(parse("%1"), Ok(JobId::JobNumber(1)));
/// assert_eq!(parse("1234"), Ok(JobId::ProcessId(Pid::from_raw(1234))));
/// assert_eq!(parse("%"), Err(ParseError));
/// assert_eq!(parse("%foo"), Err(ParseError));
/// assert_eq!(parse("foo"), Err(ParseError));
/// ```
pub fn parse(job_id: &str) -> Result<JobId, ParseError> {
    match job_id.strip_prefix('%') {
        Some(number) if is_decimal(number) => {
            number.parse().map(JobId::JobNumber).map_err(|_| ParseError)
        }
        Some(_) => Err(ParseError),
        None if is_decimal(job_id) => job_id
            .parse()
            .map(|pid| JobId::ProcessId(Pid::from_raw(pid)))
            .map_err(|_| ParseError),
        None => Err(ParseError),
    }
}

/// Parses a job ID string.
impl TryFrom<&str> for JobId {
    type Error = ParseError;
    #[inline(always)]
    fn try_from(s: &str) -> Result<JobId, ParseError> {
        parse(s)
    }
}

/// Error that may occur in [`JobId::find`]
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
pub enum FindError {
    /// There is no job with the job number.
    #[error("%{0}: No such job")]
    NoSuchJob(u32),

    /// There is no job with the process ID.
    #[error("({0}): No such process")]
    NoSuchProcess(Pid),
}

impl JobId {
    /// Returns a snapshot of the job matching the job ID.
    ///
    /// The table should not be modified by signal handlers while this function
    /// is running.
    pub fn find(&self, jobs: &JobTable) -> Result<Job, FindError> {
        match *self {
            JobId::JobNumber(number) => Jid::new(number)
                .and_then(|jid| jobs.find_by_jid(jid))
                .ok_or(FindError::NoSuchJob(number)),
            JobId::ProcessId(pid) => jobs.find_by_pid(pid).ok_or(FindError::NoSuchProcess(pid)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::JobState;
    use super::*;

    #[test]
    fn job_id_display() {
        assert_eq!(JobId::JobNumber(42).to_string(), "%42");
        assert_eq!(JobId::ProcessId(Pid::from_raw(1234)).to_string(), "1234");
    }

    #[test]
    fn parse_rejects_malformed_ids() {
        assert_eq!(parse(""), Err(ParseError));
        assert_eq!(parse("%"), Err(ParseError));
        assert_eq!(parse("%%"), Err(ParseError));
        assert_eq!(parse("%+1"), Err(ParseError));
        assert_eq!(parse("+1"), Err(ParseError));
        assert_eq!(parse("-1"), Err(ParseError));
        assert_eq!(parse("12abc"), Err(ParseError));
        assert_eq!(parse("99999999999"), Err(ParseError));
    }

    #[test]
    fn parse_accepts_zero() {
        assert_eq!(parse("%0"), Ok(JobId::JobNumber(0)));
        assert_eq!(parse("0"), Ok(JobId::ProcessId(Pid::from_raw(0))));
    }

    fn sample_job_table() -> JobTable {
        let table = JobTable::new();
        table.add(Pid::from_raw(10), JobState::Background, "first job &").unwrap();
        table.add(Pid::from_raw(11), JobState::Stopped, "job 2").unwrap();
        table
    }

    #[test]
    fn find_job_by_job_number() {
        let table = sample_job_table();
        let job = JobId::JobNumber(2).find(&table).unwrap();
        assert_eq!(job.pid, Pid::from_raw(11));
        assert_eq!(job.command_line, "job 2");
    }

    #[test]
    fn find_job_by_process_id() {
        let table = sample_job_table();
        let job = JobId::ProcessId(Pid::from_raw(10)).find(&table).unwrap();
        assert_eq!(job.jid.get(), 1);
        assert_eq!(job.state, JobState::Background);
    }

    #[test]
    fn find_no_job_for_job_number() {
        let table = sample_job_table();
        assert_eq!(
            JobId::JobNumber(3).find(&table),
            Err(FindError::NoSuchJob(3))
        );
        assert_eq!(
            JobId::JobNumber(0).find(&table),
            Err(FindError::NoSuchJob(0))
        );
    }

    #[test]
    fn find_no_job_for_process_id() {
        let table = sample_job_table();
        let pid = Pid::from_raw(999999);
        assert_eq!(
            JobId::ProcessId(pid).find(&table),
            Err(FindError::NoSuchProcess(pid))
        );
    }

    #[test]
    fn find_error_messages() {
        assert_eq!(FindError::NoSuchJob(5).to_string(), "%5: No such job");
        assert_eq!(
            FindError::NoSuchProcess(Pid::from_raw(999999)).to_string(),
            "(999999): No such process"
        );
    }
}

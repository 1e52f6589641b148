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

//! Job report formatting
//!
//! This module defines the format of a job as printed by the jobs built-in.
//! The format includes the job number, the process ID, the current state, and
//! the command line, in this order. An example of a formatted job is:
//!
//! ```text
//! [2] (24437) Running sleep 10 &
//! ```
//!
//! The state is omitted when the alternate mode flag (`#`) is used. That form
//! is printed when a job is started or resumed in the background:
//!
//! ```text
//! [2] (24437) sleep 10 &
//! ```
//!
//! To format a job, you create an instance of [`Report`] and use the `Display`
//! trait's method (typically by using the `format!` macro).
//!
//! ```
//! use tsh_env::job::{Jid, Job, JobState, Pid};
//! use tsh_env::job::fmt::Report;
//! let job = Job {
//!     pid: Pid::from_raw(123),
//!     jid: Jid::new(3).unwrap(),
//!     state: JobState::Stopped,
//!     command_line: "sleep 10".to_string(),
//! };
//! let report = Report { job: &job };
//! assert_eq!(format!("{report}"), "[3] (123) Stopped sleep 10");
//! assert_eq!(format!("{report:#}"), "[3] (123) sleep 10");
//! ```

use super::Job;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

/// Wrapper for implementing job status formatting
///
/// See the [module documentation](self) for details.
#[derive(Clone, Copy, Debug)]
pub struct Report<'a> {
    /// Job to be reported
    pub job: &'a Job,
}

/// Formats a job status report.
impl Display for Report<'_> {
    fn fmt(&self, f: &mut Formatter) -> Result {
        let jid = self.job.jid;
        let pid = self.job.pid;
        let command_line = &self.job.command_line;
        if f.alternate() {
            write!(f, "[{jid}] ({pid}) {command_line}")
        } else {
            let state = self.job.state;
            write!(f, "[{jid}] ({pid}) {state} {command_line}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Jid, JobState, Pid};
    use super::*;

    fn sample_job() -> Job {
        Job {
            pid: Pid::from_raw(42),
            jid: Jid::new(1).unwrap(),
            state: JobState::Background,
            command_line: "./myspin 2 &".to_string(),
        }
    }

    #[test]
    fn report_standard() {
        let mut job = sample_job();
        let report = Report { job: &job };
        assert_eq!(report.to_string(), "[1] (42) Running ./myspin 2 &");

        job.state = JobState::Stopped;
        let report = Report { job: &job };
        assert_eq!(report.to_string(), "[1] (42) Stopped ./myspin 2 &");

        job.state = JobState::Foreground;
        job.command_line = "./myspin 5".to_string();
        let report = Report { job: &job };
        assert_eq!(report.to_string(), "[1] (42) Foreground ./myspin 5");
    }

    #[test]
    fn report_alternate() {
        let mut job = sample_job();
        job.pid = Pid::from_raw(123456);
        job.jid = Jid::new(12).unwrap();
        let report = Report { job: &job };
        assert_eq!(format!("{report:#}"), "[12] (123456) ./myspin 2 &");
    }
}

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

//! Type definitions for job management.
//!
//! A [`JobTable`] is a fixed-capacity arena of job slots. The table is shared
//! between the read-eval loop and the signal handlers of the
//! [signal relay](crate::signal), which preempt the loop at arbitrary points.
//! Since a signal handler cannot take a lock, every field a handler reads or
//! writes is an atomic word, and every handler-side mutation is a single store
//! (set a state, clear a slot).
//!
//! The methods of `JobTable` fall into two groups:
//!
//! - Handler-safe methods never allocate and only touch atomic fields:
//!   [`jid_of`](JobTable::jid_of), [`set_state`](JobTable::set_state),
//!   [`remove`](JobTable::remove), and
//!   [`foreground_pid`](JobTable::foreground_pid).
//! - The other methods also access the command line retained for display.
//!   They must be called from the read-eval loop with the job signals blocked
//!   (see [`Env::block_job_signals`](crate::Env::block_job_signals)).

use std::num::NonZeroU32;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicI32;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering::{Acquire, Relaxed, Release};
use thiserror::Error;

#[doc(no_inline)]
pub use nix::unistd::Pid;

pub mod fmt;
pub mod id;

/// Maximum number of jobs the table can hold at a time
pub const MAX_JOBS: usize = 16;

/// Job number
///
/// A job number is a small positive integer assigned to a job when it is
/// added to a [`JobTable`]. Unlike a process ID, it is local to the shell.
#[derive(Clone, Copy, Debug, derive_more::Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Jid(NonZeroU32);

impl Jid {
    /// Creates a job number, or returns `None` for zero.
    #[must_use]
    pub const fn new(number: u32) -> Option<Jid> {
        match NonZeroU32::new(number) {
            Some(number) => Some(Jid(number)),
            None => None,
        }
    }

    /// Returns the job number as a raw integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

/// State of a job
///
/// The `Display` implementation yields the label used in job listings.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, strum::Display, strum::FromRepr)]
#[repr(u8)]
pub enum JobState {
    /// The slot is empty.
    #[default]
    Undefined = 0,
    /// The shell is waiting for the job to finish or stop.
    Foreground = 1,
    /// The job runs while the shell reads further commands.
    #[strum(to_string = "Running")]
    Background = 2,
    /// The job has been stopped by a signal.
    Stopped = 3,
}

/// Snapshot of a job contained in a [`JobTable`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Job {
    /// Process ID of the process group leader
    pub pid: Pid,
    /// Job number
    pub jid: Jid,
    /// Current state
    pub state: JobState,
    /// Command line that started the job
    pub command_line: String,
}

/// Error that may occur in [`JobTable::add`]
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
pub enum AddError {
    /// The process ID is zero or negative.
    #[error("invalid process ID {0}")]
    InvalidPid(Pid),
    /// All slots are in use.
    #[error("Tried to create too many jobs")]
    CapacityExceeded,
}

/// Element of a job table
#[derive(Debug)]
struct Slot {
    /// Raw process ID, or 0 for an empty slot
    pid: AtomicI32,
    /// Raw job number, or 0 for an empty slot
    jid: AtomicU32,
    /// Raw [`JobState`]
    state: AtomicU8,
    /// Never touched by signal handlers
    command_line: Mutex<String>,
}

impl Slot {
    const fn new() -> Self {
        Slot {
            pid: AtomicI32::new(0),
            jid: AtomicU32::new(0),
            state: AtomicU8::new(JobState::Undefined as u8),
            command_line: Mutex::new(String::new()),
        }
    }

    fn pid(&self) -> Option<Pid> {
        match self.pid.load(Acquire) {
            0 => None,
            raw => Some(Pid::from_raw(raw)),
        }
    }

    fn jid(&self) -> Option<Jid> {
        Jid::new(self.jid.load(Relaxed))
    }

    fn state(&self) -> JobState {
        JobState::from_repr(self.state.load(Relaxed)).unwrap_or_default()
    }

    fn snapshot(&self) -> Option<Job> {
        let pid = self.pid()?;
        let jid = self.jid()?;
        let state = self.state();
        let command_line = self
            .command_line
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Some(Job {
            pid,
            jid,
            state,
            command_line,
        })
    }
}

/// Fixed-capacity collection of jobs
///
/// See the [module documentation](self) for the concurrency discipline.
#[derive(Debug)]
pub struct JobTable {
    slots: [Slot; MAX_JOBS],
    next_jid: AtomicU32,
}

impl JobTable {
    /// Creates an empty job table.
    #[must_use]
    pub const fn new() -> Self {
        // In the array creation, the repeat operand must be const.
        #[allow(clippy::declare_interior_mutable_const)]
        const EMPTY_SLOT: Slot = Slot::new();
        JobTable {
            slots: [EMPTY_SLOT; MAX_JOBS],
            next_jid: AtomicU32::new(1),
        }
    }

    fn slot_of(&self, pid: Pid) -> Option<&Slot> {
        if pid.as_raw() <= 0 {
            return None;
        }
        self.slots.iter().find(|slot| slot.pid.load(Acquire) == pid.as_raw())
    }

    fn is_jid_active(&self, jid: u32) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.pid.load(Acquire) != 0 && slot.jid.load(Relaxed) == jid)
    }

    /// Returns the largest job number of the active jobs, or 0 if none.
    fn max_jid(&self) -> u32 {
        self.slots
            .iter()
            .filter(|slot| slot.pid.load(Acquire) != 0)
            .map(|slot| slot.jid.load(Relaxed))
            .max()
            .unwrap_or(0)
    }

    /// Picks the job number for a new job and advances the counter.
    fn allocate_jid(&self) -> Jid {
        let mut candidate = self.next_jid.load(Relaxed);
        loop {
            if candidate == 0 || candidate as usize > MAX_JOBS {
                candidate = 1;
            }
            if !self.is_jid_active(candidate) {
                break;
            }
            candidate += 1;
        }
        self.next_jid.store(candidate + 1, Relaxed);
        Jid::new(candidate).unwrap_or(Jid(NonZeroU32::MIN))
    }

    /// Adds a job to the table.
    ///
    /// The job takes the first empty slot and a fresh job number, which is
    /// returned. The process ID becomes visible to the other methods only after
    /// the rest of the slot has been filled in.
    ///
    /// This function must be called with the job signals blocked.
    pub fn add(&self, pid: Pid, state: JobState, command_line: &str) -> Result<Jid, AddError> {
        if pid.as_raw() <= 0 {
            return Err(AddError::InvalidPid(pid));
        }
        let slot = self
            .slots
            .iter()
            .find(|slot| slot.pid.load(Acquire) == 0)
            .ok_or(AddError::CapacityExceeded)?;

        let jid = self.allocate_jid();
        slot.jid.store(jid.get(), Relaxed);
        slot.state.store(state as u8, Relaxed);
        {
            let mut line = slot
                .command_line
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            line.clear();
            line.push_str(command_line);
        }
        slot.pid.store(pid.as_raw(), Release);
        Ok(jid)
    }

    /// Removes the job with the specified process ID.
    ///
    /// Returns the job number of the removed job, or `None` if there is no
    /// such job. The retained command line is left in place to be overwritten
    /// by the next [`add`](Self::add) since freeing it is not async-signal-safe.
    ///
    /// This function is handler-safe.
    pub fn remove(&self, pid: Pid) -> Option<Jid> {
        let slot = self.slot_of(pid)?;
        let jid = slot.jid();
        slot.pid.store(0, Release);
        slot.state.store(JobState::Undefined as u8, Relaxed);
        slot.jid.store(0, Relaxed);
        self.next_jid.store(self.max_jid() + 1, Relaxed);
        jid
    }

    /// Returns the job number of the job with the specified process ID.
    ///
    /// This function is handler-safe.
    #[must_use]
    pub fn jid_of(&self, pid: Pid) -> Option<Jid> {
        self.slot_of(pid)?.jid()
    }

    /// Changes the state of the job with the specified process ID.
    ///
    /// Returns the job number of the job, or `None` if there is no such job.
    /// Setting [`JobState::Undefined`] is not allowed; use
    /// [`remove`](Self::remove) instead.
    ///
    /// This function is handler-safe.
    pub fn set_state(&self, pid: Pid, state: JobState) -> Option<Jid> {
        if state == JobState::Undefined {
            return None;
        }
        let slot = self.slot_of(pid)?;
        slot.state.store(state as u8, Relaxed);
        slot.jid()
    }

    /// Returns the process ID of the foreground job, if any.
    ///
    /// This function is handler-safe.
    #[must_use]
    pub fn foreground_pid(&self) -> Option<Pid> {
        self.slots
            .iter()
            .filter(|slot| slot.state() == JobState::Foreground)
            .find_map(Slot::pid)
    }

    /// Returns a snapshot of the job with the specified process ID.
    #[must_use]
    pub fn find_by_pid(&self, pid: Pid) -> Option<Job> {
        self.slot_of(pid)?.snapshot()
    }

    /// Returns a snapshot of the job with the specified job number.
    #[must_use]
    pub fn find_by_jid(&self, jid: Jid) -> Option<Job> {
        self.slots
            .iter()
            .filter(|slot| slot.jid.load(Relaxed) == jid.get())
            .find_map(Slot::snapshot)
    }

    /// Returns snapshots of all the jobs in slot order.
    #[must_use]
    pub fn list(&self) -> Vec<Job> {
        self.slots.iter().filter_map(Slot::snapshot).collect()
    }

    /// Returns the number of jobs in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.pid.load(Acquire) != 0)
            .count()
    }

    /// Returns true if the table contains no jobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn jid(number: u32) -> Jid {
        Jid::new(number).unwrap()
    }

    #[test]
    fn job_state_labels() {
        assert_eq!(JobState::Foreground.to_string(), "Foreground");
        assert_eq!(JobState::Background.to_string(), "Running");
        assert_eq!(JobState::Stopped.to_string(), "Stopped");
        assert_eq!(JobState::Undefined.to_string(), "Undefined");
    }

    #[test]
    fn job_state_round_trips_through_raw_value() {
        for state in [
            JobState::Undefined,
            JobState::Foreground,
            JobState::Background,
            JobState::Stopped,
        ] {
            assert_eq!(JobState::from_repr(state as u8), Some(state));
        }
        assert_eq!(JobState::from_repr(4), None);
    }

    #[test]
    fn add_assigns_sequential_job_numbers() {
        let table = JobTable::new();
        let first = table.add(Pid::from_raw(10), JobState::Background, "a &");
        let second = table.add(Pid::from_raw(11), JobState::Background, "b &");
        let third = table.add(Pid::from_raw(12), JobState::Foreground, "c");
        assert_eq!(first, Ok(jid(1)));
        assert_eq!(second, Ok(jid(2)));
        assert_eq!(third, Ok(jid(3)));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn add_rejects_non_positive_pid() {
        let table = JobTable::new();
        assert_eq!(
            table.add(Pid::from_raw(0), JobState::Background, "x"),
            Err(AddError::InvalidPid(Pid::from_raw(0)))
        );
        assert_eq!(
            table.add(Pid::from_raw(-3), JobState::Background, "x"),
            Err(AddError::InvalidPid(Pid::from_raw(-3)))
        );
        assert!(table.is_empty());
    }

    #[test]
    fn add_fails_when_table_is_full() {
        let table = JobTable::new();
        for i in 0..MAX_JOBS {
            let pid = Pid::from_raw(100 + i as i32);
            assert_matches!(table.add(pid, JobState::Background, "sleep 1 &"), Ok(_));
        }
        let result = table.add(Pid::from_raw(999), JobState::Background, "x &");
        assert_eq!(result, Err(AddError::CapacityExceeded));
        assert_eq!(table.len(), MAX_JOBS);
        assert_eq!(table.find_by_pid(Pid::from_raw(999)), None);
    }

    #[test]
    fn remove_frees_slot_and_returns_jid() {
        let table = JobTable::new();
        table.add(Pid::from_raw(10), JobState::Background, "a &").unwrap();
        table.add(Pid::from_raw(11), JobState::Background, "b &").unwrap();

        assert_eq!(table.remove(Pid::from_raw(10)), Some(jid(1)));
        assert_eq!(table.find_by_pid(Pid::from_raw(10)), None);
        assert_eq!(table.find_by_jid(jid(1)), None);
        assert_eq!(table.len(), 1);

        // The freed slot is reused, keeping the slot order of the listing.
        table.add(Pid::from_raw(12), JobState::Background, "c &").unwrap();
        let pids: Vec<_> = table.list().iter().map(|job| job.pid.as_raw()).collect();
        assert_eq!(pids, [12, 11]);
    }

    #[test]
    fn remove_of_unknown_pid_is_no_op() {
        let table = JobTable::new();
        table.add(Pid::from_raw(10), JobState::Background, "a &").unwrap();
        assert_eq!(table.remove(Pid::from_raw(77)), None);
        assert_eq!(table.remove(Pid::from_raw(0)), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn next_jid_follows_largest_active_jid_after_removal() {
        let table = JobTable::new();
        table.add(Pid::from_raw(10), JobState::Background, "a &").unwrap();
        table.add(Pid::from_raw(11), JobState::Background, "b &").unwrap();
        table.add(Pid::from_raw(12), JobState::Background, "c &").unwrap();
        table.remove(Pid::from_raw(12));
        assert_eq!(
            table.add(Pid::from_raw(13), JobState::Background, "d &"),
            Ok(jid(3))
        );
        table.remove(Pid::from_raw(10));
        table.remove(Pid::from_raw(11));
        table.remove(Pid::from_raw(13));
        assert_eq!(
            table.add(Pid::from_raw(14), JobState::Background, "e &"),
            Ok(jid(1))
        );
    }

    #[test]
    fn jid_wraps_after_capacity_and_skips_active_numbers() {
        let table = JobTable::new();
        for i in 0..MAX_JOBS {
            table
                .add(Pid::from_raw(100 + i as i32), JobState::Background, "x &")
                .unwrap();
        }
        // Free job 2 while job 16 (the largest) stays active.
        table.remove(Pid::from_raw(101));
        let new = table.add(Pid::from_raw(200), JobState::Background, "y &");
        assert_eq!(new, Ok(jid(2)));

        let mut jids: Vec<_> = table.list().iter().map(|job| job.jid.get()).collect();
        jids.sort_unstable();
        jids.dedup();
        assert_eq!(jids.len(), MAX_JOBS);
    }

    #[test]
    fn find_by_pid_and_jid() {
        let table = JobTable::new();
        table.add(Pid::from_raw(10), JobState::Background, "a &").unwrap();
        table.add(Pid::from_raw(11), JobState::Stopped, "b").unwrap();

        let expected = Job {
            pid: Pid::from_raw(11),
            jid: jid(2),
            state: JobState::Stopped,
            command_line: "b".to_string(),
        };
        assert_eq!(table.find_by_pid(Pid::from_raw(11)), Some(expected.clone()));
        assert_eq!(table.find_by_jid(jid(2)), Some(expected));
        assert_eq!(table.find_by_pid(Pid::from_raw(12)), None);
        assert_eq!(table.find_by_jid(jid(3)), None);
    }

    #[test]
    fn foreground_pid_finds_unique_foreground_job() {
        let table = JobTable::new();
        assert_eq!(table.foreground_pid(), None);
        table.add(Pid::from_raw(10), JobState::Background, "a &").unwrap();
        assert_eq!(table.foreground_pid(), None);
        table.add(Pid::from_raw(11), JobState::Foreground, "b").unwrap();
        assert_eq!(table.foreground_pid(), Some(Pid::from_raw(11)));

        table.set_state(Pid::from_raw(11), JobState::Stopped);
        assert_eq!(table.foreground_pid(), None);
    }

    #[test]
    fn set_state_changes_state_of_existing_job() {
        let table = JobTable::new();
        table.add(Pid::from_raw(10), JobState::Foreground, "a").unwrap();
        assert_eq!(table.set_state(Pid::from_raw(10), JobState::Stopped), Some(jid(1)));
        assert_eq!(
            table.find_by_pid(Pid::from_raw(10)).unwrap().state,
            JobState::Stopped
        );
        // Stopping an already stopped job is harmless.
        assert_eq!(table.set_state(Pid::from_raw(10), JobState::Stopped), Some(jid(1)));

        assert_eq!(table.set_state(Pid::from_raw(99), JobState::Stopped), None);
        assert_eq!(table.set_state(Pid::from_raw(10), JobState::Undefined), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn jid_of_returns_job_number() {
        let table = JobTable::new();
        table.add(Pid::from_raw(10), JobState::Background, "a &").unwrap();
        assert_eq!(table.jid_of(Pid::from_raw(10)), Some(jid(1)));
        assert_eq!(table.jid_of(Pid::from_raw(11)), None);
    }

    #[test]
    fn at_most_one_foreground_job_across_launch_sequence() {
        let table = JobTable::new();
        for i in 0..40 {
            let pid = Pid::from_raw(1000 + i);
            let state = if i % 3 == 0 {
                JobState::Foreground
            } else {
                JobState::Background
            };
            table.add(pid, state, "job").unwrap();
            if state == JobState::Foreground {
                // The shell waits until the foreground job stops or exits.
                if i % 2 == 0 {
                    table.set_state(pid, JobState::Stopped);
                } else {
                    table.remove(pid);
                }
            }
            let foreground = table
                .list()
                .iter()
                .filter(|job| job.state == JobState::Foreground)
                .count();
            assert!(foreground <= 1);
            if table.len() == MAX_JOBS {
                for job in table.list() {
                    table.remove(job.pid);
                }
            }
        }
    }
}

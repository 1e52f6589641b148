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

//! Implementation of `System` that actually interacts with the system.

use super::Errno;
use super::ForkResult;
use super::Pid;
use super::SigSet;
use super::SigmaskHow;
use super::Signal;
use super::System;
use crate::io::STDOUT;
use crate::io::write_all;
use crate::semantics::ExitStatus;
use std::convert::Infallible;
use std::ffi::CStr;
use std::ffi::CString;

/// Implementation of `System` that actually interacts with the system.
///
/// `RealSystem` is an empty `struct` because the underlying operating system
/// manages the system's internal state.
#[derive(Debug)]
pub struct RealSystem(());

impl RealSystem {
    /// Returns an instance of `RealSystem`.
    ///
    /// # Safety
    ///
    /// This function is marked `unsafe` because improper use of `RealSystem`
    /// may lead to undefined behavior. The shell forks without care for other
    /// threads, so you should never use `RealSystem` in a multi-threaded
    /// program, and it is your responsibility to make sure you are using only
    /// one instance of `RealSystem` in the process.
    pub unsafe fn new() -> Self {
        RealSystem(())
    }
}

impl System for RealSystem {
    fn sigmask(
        &mut self,
        how: SigmaskHow,
        set: Option<&SigSet>,
        oldset: Option<&mut SigSet>,
    ) -> Result<(), Errno> {
        nix::sys::signal::sigprocmask(how, set, oldset)
    }

    fn sigsuspend(&mut self, mask: &SigSet) {
        // sigsuspend always fails with EINTR after a handler has run.
        // SAFETY: The mask is a valid sigset_t owned by `mask`.
        unsafe { libc::sigsuspend(mask.as_ref()) };
    }

    fn kill(&mut self, target: Pid, signal: Option<Signal>) -> Result<(), Errno> {
        nix::sys::signal::kill(target, signal)
    }

    /// Creates a new child process.
    ///
    /// This implementation calls the `fork` system call and returns both in the
    /// parent and child process.
    fn fork(&mut self) -> Result<ForkResult, Errno> {
        // SAFETY: As stated on RealSystem::new, the caller is responsible for
        // making only one instance of RealSystem in a single-threaded process.
        unsafe { nix::unistd::fork() }
    }

    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> Result<(), Errno> {
        nix::unistd::setpgid(pid, pgid)
    }

    fn execvp(&mut self, file: &CStr, args: &[CString]) -> Result<Infallible, Errno> {
        loop {
            let result = nix::unistd::execvp(file, args);
            if result != Err(Errno::EINTR) {
                return result;
            }
        }
    }

    /// Writes the text to the standard output.
    ///
    /// This implementation bypasses the buffer of [`std::io::Stdout`] so that
    /// the output is ordered with messages written by signal handlers.
    fn write_stdout(&mut self, text: &str) -> Result<(), Errno> {
        write_all(STDOUT, text.as_bytes())
    }

    fn exit_child(&mut self, exit_status: ExitStatus) -> ! {
        // SAFETY: _exit is always safe to call.
        unsafe { libc::_exit(exit_status.0) }
    }
}

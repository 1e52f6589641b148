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

//! API declarations and implementations for system-managed parts of the
//! environment
//!
//! The [`System`] trait defines a collection of methods to access the
//! underlying operating system from the shell as an application program.
//! There are two substantial implementors for this trait: [`RealSystem`] and
//! [`VirtualSystem`].
//!
//! The [signal handlers](crate::signal) do not go through this trait. They are
//! bound to the real system by nature.

pub mod real;
pub mod r#virtual;

pub use self::real::RealSystem;
pub use self::r#virtual::VirtualSystem;
use crate::semantics::ExitStatus;
#[doc(no_inline)]
pub use nix::errno::Errno;
#[doc(no_inline)]
pub use nix::sys::signal::{SigSet, SigmaskHow, Signal};
#[doc(no_inline)]
pub use nix::unistd::{ForkResult, Pid};
use std::convert::Infallible;
use std::ffi::CStr;
use std::ffi::CString;
use std::fmt::Debug;

/// API to the system-managed parts of the environment.
pub trait System: Debug {
    /// Gets and/or sets the signal blocking mask.
    ///
    /// This is a thin wrapper around the `sigprocmask` system call.
    fn sigmask(
        &mut self,
        how: SigmaskHow,
        set: Option<&SigSet>,
        oldset: Option<&mut SigSet>,
    ) -> Result<(), Errno>;

    /// Waits for a signal to be caught.
    ///
    /// This is a thin wrapper around the `sigsuspend` system call. The signal
    /// blocking mask is replaced with `mask` while waiting, and restored when
    /// the function returns after a signal handler has run.
    fn sigsuspend(&mut self, mask: &SigSet);

    /// Sends a signal to a process or process group.
    ///
    /// This is a thin wrapper around the `kill` system call. A negative
    /// `target` specifies the process group whose ID is `-target`.
    fn kill(&mut self, target: Pid, signal: Option<Signal>) -> Result<(), Errno>;

    /// Creates a new child process.
    ///
    /// This is a thin wrapper around the `fork` system call.
    fn fork(&mut self) -> Result<ForkResult, Errno>;

    /// Changes the process group of a process.
    ///
    /// This is a thin wrapper around the `setpgid` system call.
    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> Result<(), Errno>;

    /// Replaces the current process with an external utility found in `$PATH`.
    ///
    /// This is a thin wrapper around the `execvp` library function.
    fn execvp(&mut self, file: &CStr, args: &[CString]) -> Result<Infallible, Errno>;

    /// Writes the text to the standard output.
    fn write_stdout(&mut self, text: &str) -> Result<(), Errno>;

    /// Terminates the current process immediately.
    ///
    /// This is a thin wrapper around the `_exit` system call. It is used in a
    /// child process that failed to execute a utility, where running exit
    /// handlers of the parent shell would be wrong.
    fn exit_child(&mut self, exit_status: ExitStatus) -> !;
}

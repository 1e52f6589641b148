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

//! Async-signal-safe output
//!
//! Signal handlers must not allocate memory or touch the buffered standard
//! output of the standard library. This module provides [`SignalSafeBuffer`],
//! a fixed-capacity buffer on the stack that implements [`std::fmt::Write`],
//! and a function that writes the buffer contents with the bare `write`
//! system call.

use nix::errno::Errno;
use std::fmt::Write;
use std::os::fd::BorrowedFd;
use std::os::fd::RawFd;

/// File descriptor of the standard output
pub const STDOUT: RawFd = libc::STDOUT_FILENO;

/// Fixed-capacity text buffer that can be filled without heap allocation.
///
/// Text that does not fit in the buffer is silently dropped, but the buffer
/// never splits a UTF-8 character.
#[derive(Clone, Debug)]
pub struct SignalSafeBuffer<const N: usize = 256> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> SignalSafeBuffer<N> {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        SignalSafeBuffer {
            bytes: [0; N],
            len: 0,
        }
    }

    /// Returns the text written so far.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // `write_str` only copies whole characters.
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }

    /// Writes the buffer contents to the file descriptor.
    ///
    /// See [`write_all`].
    pub fn write_to(&self, fd: RawFd) -> Result<(), Errno> {
        write_all(fd, &self.bytes[..self.len])
    }
}

/// Writes all the bytes to the file descriptor.
///
/// This function only calls the `write` system call, so it is
/// async-signal-safe. Partial writes are continued and `EINTR` is retried.
pub fn write_all(fd: RawFd, bytes: &[u8]) -> Result<(), Errno> {
    // SAFETY: The descriptor is only borrowed for the duration of the call.
    let fd = unsafe { BorrowedFd::borrow_raw(fd) };
    let mut rest = bytes;
    while !rest.is_empty() {
        match nix::unistd::write(fd, rest) {
            Ok(0) => return Err(Errno::EIO),
            Ok(count) => rest = &rest[count..],
            Err(Errno::EINTR) => continue,
            Err(errno) => return Err(errno),
        }
    }
    Ok(())
}

impl<const N: usize> Default for SignalSafeBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Write for SignalSafeBuffer<N> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        let room = N - self.len;
        let mut count = s.len().min(room);
        while !s.is_char_boundary(count) {
            count -= 1;
        }
        self.bytes[self.len..self.len + count].copy_from_slice(&s.as_bytes()[..count]);
        self.len += count;
        if count == s.len() {
            Ok(())
        } else {
            Err(std::fmt::Error)
        }
    }
}

/// Formats a line and writes it to the standard output without allocation.
///
/// A newline is appended to the formatted text. Errors are ignored since
/// there is nothing a signal handler could do about them.
pub fn print_line_signal_safe(args: std::fmt::Arguments<'_>) {
    let mut buffer = SignalSafeBuffer::<256>::new();
    _ = buffer.write_fmt(args);
    _ = buffer.write_char('\n');
    _ = buffer.write_to(STDOUT);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_collects_formatted_text() {
        let mut buffer = SignalSafeBuffer::<64>::new();
        write!(buffer, "Job [{}] ({}) stopped by signal {}", 1, 4242, 20).unwrap();
        assert_eq!(buffer.as_str(), "Job [1] (4242) stopped by signal 20");
    }

    #[test]
    fn buffer_truncates_overflowing_text() {
        let mut buffer = SignalSafeBuffer::<8>::new();
        assert!(buffer.write_str("0123456789").is_err());
        assert_eq!(buffer.as_str(), "01234567");
        assert!(buffer.write_str("x").is_err());
        assert_eq!(buffer.as_str(), "01234567");
    }

    #[test]
    fn buffer_does_not_split_characters() {
        let mut buffer = SignalSafeBuffer::<4>::new();
        assert!(buffer.write_str("ab\u{3042}").is_err());
        assert_eq!(buffer.as_str(), "ab");
    }

    #[test]
    fn empty_buffer_writes_nothing() {
        let buffer = SignalSafeBuffer::<4>::default();
        assert_eq!(buffer.as_str(), "");
        assert_eq!(buffer.write_to(STDOUT), Ok(()));
    }
}

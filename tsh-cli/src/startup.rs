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

//! Shell startup

use log::LevelFilter;
use tsh_env::system::Errno;

pub mod args;

/// Help message printed for the `-h` option and for unknown options
pub const USAGE: &str = "\
Usage: shell [-hvp]
   -h   print this message
   -v   print additional diagnostic information
   -p   do not emit a command prompt
";

/// Returns the maximum log level for the `-v` option.
#[must_use]
pub fn log_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Initializes the logger.
///
/// Log records are written to the standard error without timestamps. This
/// function should be called only once.
pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(log_level(verbose))
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
}

/// Makes the standard error refer to the same file as the standard output.
///
/// All the output of the shell, including error messages and logs, then goes
/// to the standard output.
pub fn redirect_stderr_to_stdout() -> Result<(), Errno> {
    // SAFETY: dup2 only manipulates the file descriptor table.
    let result = unsafe { libc::dup2(libc::STDOUT_FILENO, libc::STDERR_FILENO) };
    Errno::result(result).map(drop)
}

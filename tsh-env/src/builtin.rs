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

//! Type definitions for built-in utilities.
//!
//! This module provides data types for defining built-in utilities.
//!
//! Note that concrete implementations of built-ins are not included in the
//! `tsh_env` crate. For implementations of `quit`, `jobs`, `bg`, and `fg`, see
//! the `tsh_builtin` crate.

use crate::Env;
use crate::semantics::ExitStatus;
use std::fmt::Debug;

/// Result of built-in utility execution.
///
/// The first element is the exit status of the built-in. The second tells the
/// read-eval loop whether to go on reading commands.
pub type Result = (ExitStatus, crate::semantics::Result);

/// Type of functions that implement the behavior of a built-in.
///
/// The vector contains the command name followed by the arguments.
pub type Main = fn(&mut Env, Vec<String>) -> Result;

/// Built-in utility definition.
#[derive(Clone, Copy)]
pub struct Builtin {
    /// Function that implements the behavior of the built-in.
    pub execute: Main,
}

impl Builtin {
    /// Creates a new built-in utility definition.
    pub const fn new(execute: Main) -> Self {
        Self { execute }
    }
}

impl Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin").finish_non_exhaustive()
    }
}

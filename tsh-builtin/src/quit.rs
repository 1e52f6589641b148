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

//! Quit built-in
//!
//! The `quit` built-in makes the shell exit with status zero. Operands are
//! ignored. Remaining jobs are neither waited for nor killed.

use crate::Result;
use std::ops::ControlFlow::Break;
use tsh_env::Env;
use tsh_env::semantics::Divert;
use tsh_env::semantics::ExitStatus;

/// Entry point of the `quit` built-in
pub fn main(_env: &mut Env, _args: Vec<String>) -> Result {
    (ExitStatus::SUCCESS, Break(Divert::Exit(ExitStatus::SUCCESS)))
}

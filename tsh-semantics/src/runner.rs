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

//! Implementation of the read-eval loop

use crate::Divert;
use crate::ExitStatus;
use crate::Result;
use crate::eval;
use log::debug;
use std::io::BufRead;
use std::ops::ControlFlow::{Break, Continue};
use tsh_env::Env;

/// Maximum length of an input line in bytes, including the newline
pub const MAX_LINE: usize = 1024;

/// Prompt printed before reading each line
const PROMPT: &str = "tsh> ";

/// Read-eval loop
///
/// The loop reads a line from `input` and [evaluates](eval) it, and repeats
/// until the end of input or until the evaluation results in a
/// `Break(Divert::...)`. If `prompt` is true, the loop prints a prompt before
/// reading each line.
///
/// A line longer than [`MAX_LINE`] is rejected with an error message and the
/// loop continues. A line that is not valid UTF-8 is evaluated after invalid
/// sequences are replaced. A read error aborts the loop.
///
/// Returns `Continue(())` at the end of input.
///
/// # Example
///
/// ```
/// # use std::ops::ControlFlow::Continue;
/// # use tsh_env::Env;
/// # use tsh_semantics::*;
/// let mut env = Env::new_virtual();
/// let input = "\n\n".as_bytes();
/// let result = read_eval_loop(&mut env, input, false);
/// assert_eq!(result, Continue(()));
/// assert_eq!(env.exit_status, ExitStatus::SUCCESS);
/// ```
pub fn read_eval_loop<R: BufRead>(env: &mut Env, mut input: R, prompt: bool) -> Result {
    let mut buffer = Vec::with_capacity(MAX_LINE);
    loop {
        if prompt {
            env.print(PROMPT);
        }

        buffer.clear();
        match input.read_until(b'\n', &mut buffer) {
            Ok(0) => break,
            Ok(_) => (),
            Err(error) => {
                env.print(&format!("tsh: read error: {error}\n"));
                env.exit_status = ExitStatus::FAILURE;
                return Break(Divert::Abort(ExitStatus::FAILURE));
            }
        }

        if buffer.len() > MAX_LINE {
            env.print("tsh: input line too long\n");
            env.exit_status = ExitStatus::FAILURE;
            continue;
        }

        let line = String::from_utf8_lossy(&buffer);
        eval(env, &line)?;
    }

    debug!("End of input");
    Continue(())
}

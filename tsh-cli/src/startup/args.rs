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

//! Command line argument parser for the shell

use thiserror::Error;

/// Configuration for starting the main read-eval loop
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Run {
    /// Whether to print a prompt before reading each line (cleared by `-p`)
    pub prompt: bool,
    /// Whether to print diagnostic messages (set by `-v`)
    pub verbose: bool,
}

impl Default for Run {
    fn default() -> Self {
        Run {
            prompt: true,
            verbose: false,
        }
    }
}

/// Parse result
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Parse {
    /// Runs the shell
    Run(Run),
    /// Prints help message and exit
    Help,
}

impl From<Run> for Parse {
    fn from(run: Run) -> Self {
        Parse::Run(run)
    }
}

/// Error in command line parsing
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// Short option that is not defined
    #[error("unknown option '-{0}'")]
    UnknownOption(char),
}

/// Parses command line arguments.
///
/// The first item of `args` is the command name, which is ignored. Options
/// may be combined in one argument as in `-vp`. Operands are ignored, and
/// options following an operand are still recognized. An argument `--` ends
/// the options.
///
/// If `-h` is found, the result is [`Parse::Help`] regardless of the other
/// arguments that follow.
pub fn parse<I, S>(args: I) -> Result<Parse, Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut result = Run::default();

    for arg in args.into_iter().map(Into::into).skip(1) {
        if arg == "--" {
            break;
        }
        let Some(options) = arg.strip_prefix('-') else {
            continue;
        };
        for c in options.chars() {
            match c {
                'h' => return Ok(Parse::Help),
                'p' => result.prompt = false,
                'v' => result.verbose = true,
                _ => return Err(Error::UnknownOption(c)),
            }
        }
    }

    Ok(Parse::Run(result))
}

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

//! Command line syntax and tokenizer.
//!
//! This crate defines [`Command`](syntax::Command), the result of splitting a
//! command line into an argument vector. See the [`syntax`] module for the
//! data type and the [`parser`] module for the tokenization rules.
//!
//! To tokenize a command line, you can use the `parse` function on a `&str`,
//! which is enabled by the implementation of [`FromStr`](std::str::FromStr)
//! for `Command`:
//!
//! ```
//! # use tsh_syntax::syntax::Command;
//! let command: Command = "sleep 10 &".parse().unwrap();
//! assert_eq!(command.argv, ["sleep", "10"]);
//! assert!(command.background);
//! ```

pub mod parser;
pub mod syntax;

pub use self::parser::Error;
pub use self::parser::parse;

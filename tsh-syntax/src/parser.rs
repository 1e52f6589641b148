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

//! Command line tokenizer
//!
//! The [`parse`] function splits a command line into words:
//!
//! - Words are separated by blanks (spaces and tabs).
//! - A single-quoted span (`'...'`) is part of the word verbatim, including
//!   blanks. The quotes themselves are removed. A pair of adjacent quotes
//!   (`''`) makes an empty word.
//! - An unquoted `&` followed only by blanks ends the command line and marks
//!   it for background execution, whether or not it is separated from the
//!   last word. An `&` anywhere else is an ordinary character.
//! - A trailing newline is ignored.

use crate::syntax::Command;
use thiserror::Error;

/// Maximum number of words in a command line
pub const MAX_ARGS: usize = 128;

/// Error in tokenizing a command line
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum Error {
    /// A single quotation lacks a closing `'`.
    #[error("unclosed single quote")]
    UnclosedSingleQuote {
        /// Byte index of the opening quote in the line
        opening_index: usize,
    },
    /// The command line has more than [`MAX_ARGS`] words.
    #[error("too many arguments")]
    TooManyArguments,
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn push_word(argv: &mut Vec<String>, word: String) -> Result<(), Error> {
    if argv.len() >= MAX_ARGS {
        return Err(Error::TooManyArguments);
    }
    argv.push(word);
    Ok(())
}

/// Tokenizes a command line.
///
/// See the [module documentation](self) for the rules.
///
/// ```
/// # use tsh_syntax::parse;
/// let command = parse("echo 'hello,  world'&\n").unwrap();
/// assert_eq!(command.argv, ["echo", "hello,  world"]);
/// assert!(command.background);
/// ```
pub fn parse(line: &str) -> Result<Command, Error> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let mut argv = Vec::new();
    let mut word: Option<String> = None;
    let mut background = false;

    let mut chars = line.char_indices();
    while let Some((index, c)) = chars.next() {
        match c {
            c if is_blank(c) => {
                if let Some(word) = word.take() {
                    push_word(&mut argv, word)?;
                }
            }
            '\'' => {
                let word = word.get_or_insert_with(String::new);
                loop {
                    match chars.next() {
                        Some((_, '\'')) => break,
                        Some((_, c)) => word.push(c),
                        None => {
                            return Err(Error::UnclosedSingleQuote {
                                opening_index: index,
                            });
                        }
                    }
                }
            }
            '&' if line[index + 1..].chars().all(is_blank) => {
                background = true;
                break;
            }
            c => word.get_or_insert_with(String::new).push(c),
        }
    }
    if let Some(word) = word {
        push_word(&mut argv, word)?;
    }

    Ok(Command { argv, background })
}

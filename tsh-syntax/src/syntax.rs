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

//! Command line syntax
//!
//! A command line consists of words separated by blanks (spaces and tabs),
//! optionally followed by `&`. A [`Command`] holds the words after quote
//! removal and whether the command is to be run in the background.

use std::fmt;
use std::str::FromStr;

/// Tokenized command line
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Command {
    /// Words of the command line
    ///
    /// The first word names the command. The vector is empty for a blank line.
    pub argv: Vec<String>,
    /// Whether the command line ended with `&`
    pub background: bool,
}

impl Command {
    /// Returns the command name, or `None` for a blank line.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }
}

/// Formats the command by joining the words with spaces.
///
/// Words are not quoted, so the result may not parse back to the same
/// command.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words = self.argv.iter();
        if let Some(first) = words.next() {
            f.write_str(first)?;
            for word in words {
                write!(f, " {word}")?;
            }
        }
        if self.background {
            f.write_str(" &")?;
        }
        Ok(())
    }
}

/// Parses a command line with [`parse`](crate::parser::parse).
impl FromStr for Command {
    type Err = crate::parser::Error;
    fn from_str(s: &str) -> Result<Command, Self::Err> {
        crate::parser::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_name() {
        assert_eq!(Command::default().name(), None);
        let command = Command {
            argv: vec!["ls".to_string(), "-l".to_string()],
            background: false,
        };
        assert_eq!(command.name(), Some("ls"));
    }

    #[test]
    fn command_display() {
        let command = Command {
            argv: vec!["sleep".to_string(), "10".to_string()],
            background: true,
        };
        assert_eq!(command.to_string(), "sleep 10 &");
        assert_eq!(Command::default().to_string(), "");
    }
}

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

//! Implementation of the built-in utilities of tsh.
//!
//! Each submodule implements a built-in as a `main` function of the
//! [`Main`] type. [`BUILTINS`] lists all of them so that they can be
//! registered in [`Env::builtins`](tsh_env::Env::builtins):
//!
//! ```
//! # use tsh_env::Env;
//! let mut env = Env::new_virtual();
//! env.builtins.extend(tsh_builtin::BUILTINS.iter().copied());
//! assert!(env.builtins.contains_key("jobs"));
//! ```
//!
//! The built-ins operate on the job table directly and never fork.

pub mod bg;
pub mod common;
pub mod fg;
pub mod jobs;
pub mod quit;

#[doc(no_inline)]
pub use tsh_env::builtin::*;

/// Array of all the implemented built-in utilities.
///
/// The array items are ordered alphabetically.
pub const BUILTINS: &[(&str, Builtin)] = &[
    ("bg", Builtin::new(bg::main)),
    ("fg", Builtin::new(fg::main)),
    ("jobs", Builtin::new(jobs::main)),
    ("quit", Builtin::new(quit::main)),
];


#[cfg(test)]
mod builtins_tests {
    use super::*;

    #[test]
    fn builtins_are_sorted() {
        BUILTINS
            .windows(2)
            .for_each(|pair| assert!(pair[0].0 < pair[1].0, "disordered pair: {pair:?}"))
    }
}

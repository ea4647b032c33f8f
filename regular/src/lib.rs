//! Front-ends that compile regular languages into Moore machines.
//!
//! Two input notations are supported: regular grammars (left- or
//! right-linear, see [`grammar`]) and regular expressions over `|`, `*`,
//! implicit concatenation and parentheses (see [`regex`]). Both produce an
//! NFA in Moore form whose state outputs encode acceptance as `"1"` vs
//! `"0"`; the grammar pipeline additionally determinizes its result, which
//! leans on the accepting-dominates subset merge of
//! [`machines::automaton::Moore::determinize`].
#![warn(missing_docs)]

mod error;
pub mod grammar;
pub mod regex;

pub use error::Error;

/// Result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

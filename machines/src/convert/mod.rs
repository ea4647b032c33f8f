//! Conversion to and from graph-description text.

mod dot;
pub(crate) mod fmt;

pub use dot::{parse_mealy, parse_moore, ToDot};

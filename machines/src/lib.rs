//! Library for constructing, transforming and minimizing finite-state
//! transducers.
//!
//! Two classical machine kinds are supported: [`Mealy`](automaton::Mealy)
//! machines, which emit an output on every transition, and
//! [`Moore`](automaton::Moore) machines, which attach an output to every
//! state. Both share the same underlying representation (insertion-ordered
//! state and alphabet lists plus a transition relation) and the same
//! algorithmic toolbox: subset-construction determinization, reachability
//! pruning and partition-refinement minimization.
//!
//! Machines can be exchanged as graph-description text via
//! [`convert::ToDot`] and the lenient parsers in [`convert`].
#![warn(missing_docs)]

pub mod algorithms;
pub mod automaton;
pub mod convert;
mod error;
mod seq;

pub use error::Error;
pub use seq::OrderedSet;

/// The map implementation used throughout this crate. Iteration order is
/// deterministic, which the canonical-ordering guarantees rely on.
pub type Map<K, V> = std::collections::BTreeMap<K, V>;

/// Set counterpart of [`Map`].
pub type Set<T> = std::collections::BTreeSet<T>;

/// Result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Commonly used imports, bundled for glob-importing.
pub mod prelude {
    pub use crate::automaton::{
        bridge::{mealy_to_moore, moore_to_mealy},
        Input, Mealy, MealyEdge, Moore, Output, StateId, EPSILON,
    };
    pub use crate::convert::{parse_mealy, parse_moore, ToDot};
    pub use crate::{Error, Map, OrderedSet, Result, Set};
}

use thiserror::Error;

/// Errors produced while reading or transforming a machine.
///
/// None of these are recovered from inside the library; they unwind to the
/// caller, which is expected to report them and give up on the operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A deterministic read found no outgoing transition.
    #[error("no transition from state `{state}` on input `{input}`")]
    NoTransition {
        /// Source state of the attempted read.
        state: String,
        /// Input symbol of the attempted read.
        input: String,
    },

    /// A deterministic read hit a point with more than one successor.
    #[error("ambiguous transition from state `{state}` on input `{input}`")]
    AmbiguousTransition {
        /// Source state of the attempted read.
        state: String,
        /// Input symbol of the attempted read.
        input: String,
    },

    /// Subset construction found irreconcilable outputs.
    #[error("not determinizable: {0}")]
    NonDeterminizable(String),

    /// Minimization was asked for on a nondeterministic Moore machine.
    #[error("cannot minimize a nondeterministic Moore machine, determinize it first")]
    CannotMinimize,

    /// A Moore state was read before an output had been recorded for it.
    #[error("no output recorded for state `{0}`")]
    MissingStateOutput(String),

    /// The graph-description text could not be understood.
    #[error("malformed graph description: {0}")]
    Parse(String),
}

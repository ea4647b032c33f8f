use thiserror::Error;

/// Errors produced while compiling a grammar or a regular expression.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input text does not follow the grammar or regex syntax.
    #[error("parse error: {0}")]
    Parse(String),

    /// A rule is neither left- nor right-linear.
    #[error("rule `{0}` is not regular")]
    NotRegular(String),

    /// Left- and right-linear rules appear in the same grammar.
    #[error("grammar mixes left-linear and right-linear rules")]
    MixedLinearity,

    /// An error bubbled up from the machine layer, typically from
    /// determinization.
    #[error(transparent)]
    Machine(#[from] machines::Error),
}

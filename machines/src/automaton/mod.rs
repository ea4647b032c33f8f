//! The two machine kinds and the conversions between them.

pub mod bridge;
mod mealy;
mod moore;

pub use mealy::{Mealy, MealyEdge};
pub use moore::Moore;

/// States are identified by short strings with value equality.
pub type StateId = String;

/// Input symbols are opaque identifiers.
pub type Input = String;

/// Output symbols are opaque identifiers.
pub type Output = String;

/// The silent input. An edge on ε is taken without consuming a symbol; ε is
/// never listed in the public input alphabet.
pub const EPSILON: &str = "";

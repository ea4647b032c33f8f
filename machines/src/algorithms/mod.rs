//! Algorithms shared by both machine kinds.

mod partition_refinement;

pub use partition_refinement::{refine, Partition};

//! Recognition of type-R distance matrices.
//!
//! Starting from the full matrix, every admissible reduction `(x, y: z)α`
//! is undone recursively until four items remain, where the quadruple
//! condition decides. The explored branches form a [`RecognitionTree`].

pub mod candidates;
pub mod quadruple;
pub mod recognizer;
pub mod reduce;
pub mod tree;

pub use candidates::{find_candidates, Candidate, StepPositions};
pub use quadruple::{compute_deltas, distance_sums, estimate_alpha, is_r_map, is_r_map_on_4, Deltas};
pub use recognizer::{recognize, RecognitionConfig, Recognizer};
pub use reduce::{reduce, Reduction};
pub use tree::{FailureReason, NodeId, RecognitionNode, RecognitionTree, ReductionStep};

//! Distance matrices and the pseudometric axioms.

pub mod matrix;
pub mod pseudometric;
pub mod tolerance;

pub use pseudometric::{
    check_pseudometric, check_pseudometric_labeled, is_pseudometric, MetricViolation,
};
pub use tolerance::Tolerance;

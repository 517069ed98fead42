//! # erdbeermet
//!
//! Recognition of **type-R distance matrices**: symmetric distances that
//! arise from a single ancestral item by a sequence of duplications and
//! recombinations, each followed by independent growth of every item.
//!
//! ## Components
//!
//! 1. **Metric**: tolerance-aware comparisons and pseudometric checks
//! 2. **Recognition**: depth-first search over reduction hypotheses `(x, y: z)α`
//! 3. **Simulation**: random and replayed event histories
//! 4. **IO**: history files and recognition reports
//!
//! ## Example
//!
//! ```no_run
//! use erdbeermet::recognition::recognize;
//! use erdbeermet::simulation::{simulate, SimulationConfig};
//!
//! let scenario = simulate(8, &SimulationConfig::default(), 42).unwrap();
//! let tree = recognize(scenario.distances(), false).unwrap();
//! println!("{}", tree.to_newick(4));
//! ```

pub mod error;
pub mod io;
pub mod metric;
pub mod recognition;
pub mod simulation;

pub use error::{HistoryError, ShapeError};
pub use recognition::{recognize, RecognitionConfig, RecognitionTree, Recognizer};
pub use simulation::{simulate, Scenario, SimulationConfig};

/// Numeric defaults and search thresholds.
pub mod config {
    /// Relative tolerance for floating-point comparisons.
    pub const DEFAULT_RTOL: f64 = 1e-5;

    /// Absolute tolerance for floating-point comparisons.
    pub const DEFAULT_ATOL: f64 = 1e-8;

    /// Blend coefficient assumed when no witness pair determines α.
    pub const FALLBACK_ALPHA: f64 = 0.5;

    /// Matrices up to this size are type-R without search.
    pub const MAX_TRIVIAL_ITEMS: usize = 3;

    /// Size at which the closed-form quadruple test decides.
    pub const BASE_CASE_ITEMS: usize = 4;

    /// Nodes up to this size are always expanded exhaustively.
    pub const EXHAUSTIVE_ITEMS: usize = 5;

    /// Decimal places of α in Newick labels.
    pub const NEWICK_PRECISION: usize = 4;

    /// Decimal places of α and distances in reports.
    pub const REPORT_PRECISION: usize = 8;

    /// Width of the dashed rule between report nodes.
    pub const REPORT_RULE_WIDTH: usize = 80;
}

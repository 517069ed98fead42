//! Enumeration of reduction hypotheses `(x, y: z)α`.
//!
//! Every triple with `x < y` and `z ∉ {x, y}` is considered, in
//! lexicographic order of `(x, y, z)`. The blend coefficient is voted on by
//! every witness pair `u < v` outside the triple:
//!
//! 1. all defined estimates agree with the first defined one: accept that
//!    value, snapped to 0/1 when close, if it lies in `[0, 1]`;
//! 2. some estimates disagree: reject the triple;
//! 3. no estimate is defined: accept with α = [`FALLBACK_ALPHA`] and the
//!    first item outside the triple as witness.
//!
//! Rejected triples leave no trace in the recognition tree.

use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::quadruple::estimate_alpha;
use crate::config::FALLBACK_ALPHA;
use crate::metric::Tolerance;

/// An accepted reduction hypothesis, in item labels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub x: usize,
    pub y: usize,
    /// The item removed by the reduction.
    pub z: usize,
    /// Item used to solve for the increments; `None` only when no item
    /// outside the triple exists.
    pub witness: Option<usize>,
    pub alpha: f64,
}

/// Matrix positions of a candidate relative to one item sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepPositions {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub witness: Option<usize>,
}

impl Candidate {
    /// Resolve the candidate's labels to positions in `items`.
    pub fn positions(&self, items: &[usize]) -> Option<StepPositions> {
        let find = |label: usize| items.iter().position(|&item| item == label);
        let witness = match self.witness {
            Some(label) => Some(find(label)?),
            None => None,
        };
        Some(StepPositions {
            x: find(self.x)?,
            y: find(self.y)?,
            z: find(self.z)?,
            witness,
        })
    }

    /// Whether α was resolved to an exact duplication.
    #[allow(clippy::float_cmp)]
    pub fn is_duplication(&self) -> bool {
        self.alpha == 0.0 || self.alpha == 1.0
    }
}

/// Outcome of the witness vote for one triple.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Consensus {
    Agreed(f64),
    Conflicting,
    Undetermined,
}

fn consensus(estimates: &[Option<f64>], tol: &Tolerance) -> Consensus {
    let mut defined = estimates.iter().flatten().copied();
    let Some(reference) = defined.next() else {
        return Consensus::Undetermined;
    };
    if defined.all(|alpha| tol.is_close(alpha, reference)) {
        Consensus::Agreed(reference)
    } else {
        Consensus::Conflicting
    }
}

/// Evaluate the triple at positions `(x, y, z)`; labels come from `items`.
fn evaluate_triple(
    d: &Array2<f64>,
    items: &[usize],
    tol: &Tolerance,
    (x, y, z): (usize, usize, usize),
) -> Option<Candidate> {
    let n = items.len();
    let outside: Vec<usize> = (0..n).filter(|&i| i != x && i != y && i != z).collect();

    let mut estimates = Vec::with_capacity(outside.len() * outside.len().saturating_sub(1) / 2);
    let mut witness = None;
    for (a, &u) in outside.iter().enumerate() {
        for &v in &outside[a + 1..] {
            let alpha = estimate_alpha(d, tol, x, y, z, u, v);
            if witness.is_none() && alpha.is_some() {
                witness = Some(u);
            }
            estimates.push(alpha);
        }
    }

    let (alpha, witness) = match consensus(&estimates, tol) {
        Consensus::Agreed(alpha) => {
            let alpha = tol.snap_unit(alpha);
            if !(0.0..=1.0).contains(&alpha) {
                return None;
            }
            (alpha, witness)
        }
        Consensus::Conflicting => return None,
        Consensus::Undetermined => (FALLBACK_ALPHA, outside.first().copied()),
    };

    Some(Candidate {
        x: items[x],
        y: items[y],
        z: items[z],
        witness: witness.map(|w| items[w]),
        alpha,
    })
}

/// All `(x, y, z)` position triples with `x < y` and `z ∉ {x, y}`.
fn triples(n: usize) -> Vec<(usize, usize, usize)> {
    let mut out = Vec::with_capacity(n * n.saturating_sub(1) * n.saturating_sub(2) / 2);
    for x in 0..n {
        for y in (x + 1)..n {
            for z in (0..n).filter(|&z| z != x && z != y) {
                out.push((x, y, z));
            }
        }
    }
    out
}

/// Find every accepted reduction hypothesis for the matrix `d` on `items`.
///
/// With `parallel` the triples are scored on the rayon pool; the result is
/// identical to the sequential order either way.
pub fn find_candidates(
    d: &Array2<f64>,
    items: &[usize],
    tol: &Tolerance,
    parallel: bool,
) -> Vec<Candidate> {
    let triples = triples(items.len());
    let candidates: Vec<Candidate> = if parallel {
        triples
            .par_iter()
            .filter_map(|&t| evaluate_triple(d, items, tol, t))
            .collect()
    } else {
        triples
            .iter()
            .filter_map(|&t| evaluate_triple(d, items, tol, t))
            .collect()
    };

    trace!(
        n = items.len(),
        triples = triples.len(),
        accepted = candidates.len(),
        "candidate search"
    );
    candidates
}

//! Depth-first recognition driver.
//!
//! The search keeps an explicit stack of frontier nodes:
//!
//! - the root fails with `no pseudometric` on invalid input and succeeds
//!   immediately when it has at most three items;
//! - a node with four items is decided by the closed-form base case;
//! - a larger node expands into one child per candidate. Children whose
//!   increments are negative or whose reduced matrix is not a pseudometric
//!   are recorded as failed leaves, the rest are pushed onto the stack.
//!
//! With `first_candidate_only`, expansion of a node with more than five
//! items stops at its first accepted child. Five-item nodes are always
//! expanded exhaustively.

use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::candidates::{find_candidates, Candidate};
use super::quadruple::{compute_deltas, is_r_map};
use super::reduce::reduce;
use super::tree::{FailureReason, NodeId, RecognitionNode, RecognitionTree, ReductionStep};
use crate::config::{BASE_CASE_ITEMS, EXHAUSTIVE_ITEMS, MAX_TRIVIAL_ITEMS};
use crate::error::ShapeError;
use crate::metric::matrix::{ensure_square, from_rows};
use crate::metric::{check_pseudometric_labeled, is_pseudometric, Tolerance};

/// Recognition settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Keep only the first accepted candidate per node (above five items).
    pub first_candidate_only: bool,

    /// Tolerance for every numeric comparison.
    pub tolerance: Tolerance,

    /// Score candidates on the rayon pool.
    pub parallel: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            first_candidate_only: false,
            tolerance: Tolerance::default(),
            parallel: true,
        }
    }
}

impl RecognitionConfig {
    pub fn with_first_candidate_only(mut self, first_candidate_only: bool) -> Self {
        self.first_candidate_only = first_candidate_only;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Recognise `d` with default settings.
pub fn recognize(
    d: &Array2<f64>,
    first_candidate_only: bool,
) -> Result<RecognitionTree, ShapeError> {
    Recognizer::new(RecognitionConfig::default().with_first_candidate_only(first_candidate_only))
        .recognize(d)
}

/// Runs the recognition search under one configuration.
pub struct Recognizer {
    config: RecognitionConfig,
}

impl Recognizer {
    pub fn new(config: RecognitionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecognitionConfig {
        &self.config
    }

    /// Recognise a matrix given as rows.
    pub fn recognize_rows(&self, rows: &[Vec<f64>]) -> Result<RecognitionTree, ShapeError> {
        self.recognize(&from_rows(rows)?)
    }

    /// Build the full recognition tree of `d`.
    ///
    /// Fails only when `d` is not a non-empty square matrix.
    pub fn recognize(&self, d: &Array2<f64>) -> Result<RecognitionTree, ShapeError> {
        let n = ensure_square(d)?;
        let tol = &self.config.tolerance;

        let mut tree = RecognitionTree::with_root(RecognitionNode::new(
            (0..n).collect(),
            Some(d.clone()),
            None,
        ));
        let root = tree.root();
        let mut stack = Vec::new();

        if !is_pseudometric(d, tol) {
            debug!(n, "input is not a pseudometric");
            tree.node_mut(root).fail(FailureReason::NoPseudometric);
        } else if n <= MAX_TRIVIAL_ITEMS {
            debug!(n, "trivially recognised");
            tree.node_mut(root).succeed();
        } else {
            stack.push(root);
        }

        while let Some(id) = stack.pop() {
            if tree.node(id).item_count() > BASE_CASE_ITEMS {
                self.expand(&mut tree, id, &mut stack);
            } else {
                self.resolve_base_case(&mut tree, id);
            }
        }

        tree.finalize();
        debug!(
            n,
            nodes = tree.len(),
            successes = tree.total_successes(),
            "recognition finished"
        );
        Ok(tree)
    }

    fn resolve_base_case(&self, tree: &mut RecognitionTree, id: NodeId) {
        let node = tree.node(id);
        let recognised = node
            .matrix()
            .is_some_and(|m| is_r_map(m, &self.config.tolerance));
        debug!(items = ?node.items(), recognised, "base case");

        let node = tree.node_mut(id);
        if recognised {
            node.succeed();
        } else {
            node.fail(FailureReason::SpikesTooShort);
        }
    }

    fn expand(&self, tree: &mut RecognitionTree, id: NodeId, stack: &mut Vec<NodeId>) {
        let node = tree.node(id);
        let children = match node.matrix() {
            Some(matrix) => self.expand_children(matrix, node.items()),
            None => Vec::new(),
        };

        let mut found_valid = false;
        for child in children {
            let accepted = child.failure_reason().is_none();
            let child_id = tree.add_child(id, child);
            if accepted {
                found_valid = true;
                stack.push(child_id);
            }
        }

        if !found_valid {
            tree.node_mut(id).fail(FailureReason::NoCandidate);
        }
    }

    /// One child per candidate, in enumeration order.
    fn expand_children(&self, matrix: &Array2<f64>, items: &[usize]) -> Vec<RecognitionNode> {
        let n = items.len();
        let candidates = find_candidates(matrix, items, &self.config.tolerance, self.config.parallel);
        debug!(n, items = ?items, candidates = candidates.len(), "expanding node");

        if self.config.first_candidate_only && n > EXHAUSTIVE_ITEMS {
            let mut children = Vec::new();
            for candidate in &candidates {
                let child = self.evaluate(matrix, items, candidate);
                let accepted = child.failure_reason().is_none();
                children.push(child);
                if accepted {
                    break;
                }
            }
            children
        } else if self.config.parallel {
            candidates
                .par_iter()
                .map(|candidate| self.evaluate(matrix, items, candidate))
                .collect()
        } else {
            candidates
                .iter()
                .map(|candidate| self.evaluate(matrix, items, candidate))
                .collect()
        }
    }

    /// Build the child node for one candidate, marking it failed when the
    /// step is not admissible.
    fn evaluate(&self, matrix: &Array2<f64>, items: &[usize], candidate: &Candidate) -> RecognitionNode {
        let tol = &self.config.tolerance;
        let step = ReductionStep {
            x: candidate.x,
            y: candidate.y,
            z: candidate.z,
            alpha: candidate.alpha,
        };
        let child_items: Vec<usize> = items.iter().copied().filter(|&i| i != candidate.z).collect();

        let admissible = candidate.positions(items).and_then(|positions| {
            let deltas = compute_deltas(
                matrix,
                candidate.alpha,
                positions.x,
                positions.y,
                positions.z,
                positions.witness,
            )?;
            debug!(
                step = %step,
                delta_x = deltas.delta_x,
                delta_y = deltas.delta_y,
                delta_z = deltas.delta_z,
                d_xy = deltas.d_xy,
                "candidate deltas"
            );
            deltas
                .all_non_negative(tol)
                .then(|| reduce(matrix, items, &positions, &deltas))
        });

        let Some(reduction) = admissible else {
            debug!(step = %step, "negative delta/dxy");
            let mut child = RecognitionNode::new(child_items, None, Some(step));
            child.fail(FailureReason::NegativeDelta);
            return child;
        };

        let verdict = check_pseudometric_labeled(&reduction.matrix, &reduction.items, tol);
        let mut child = RecognitionNode::new(reduction.items, Some(reduction.matrix), Some(step));
        match verdict {
            Ok(()) => debug!(step = %step, "stacked"),
            Err(violation) => {
                debug!(step = %step, %violation, "no pseudometric");
                child.fail(FailureReason::NoPseudometric);
            }
        }
        child
    }
}

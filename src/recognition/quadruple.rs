//! Closed-form algebra on four or five items at a time.
//!
//! - [`is_r_map_on_4`]: the base case, deciding whether four points are
//!   realisable by a single duplication/recombination step.
//! - [`estimate_alpha`]: the blend coefficient implied by one witness pair
//!   for a hypothesised reduction `(x, y: z)`.
//! - [`compute_deltas`]: the increments `δz`, `δx`, `δy` and the pre-event
//!   distance `d_xy` implied by a chosen α and one witness.
//!
//! All indices here are matrix positions, not item labels.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::metric::matrix::restrict;
use crate::metric::{is_pseudometric, Tolerance};

/// The three pairwise sums of a quadruple:
/// `[wx + yz, wy + xz, wz + xy]`.
pub fn distance_sums(d: &Array2<f64>, w: usize, x: usize, y: usize, z: usize) -> [f64; 3] {
    [
        d[[w, x]] + d[[y, z]],
        d[[w, y]] + d[[x, z]],
        d[[w, z]] + d[[x, y]],
    ]
}

/// Whether `{a, b}` can be the parent pair of the last event among
/// `a, b, c, e`.
fn parent_pair_fits(d: &Array2<f64>, tol: &Tolerance, a: usize, b: usize, c: usize, e: usize) -> bool {
    let ab = d[[a, b]];
    let left = ab * (ab + 2.0 * d[[c, e]] - d[[a, c]] - d[[b, e]] - d[[a, e]] - d[[b, c]]);
    let right = (d[[a, c]] - d[[b, c]]) * (d[[b, e]] - d[[a, e]]);
    tol.at_most(left, right)
}

fn split_fits(d: &Array2<f64>, tol: &Tolerance, a: usize, b: usize, c: usize, e: usize) -> bool {
    parent_pair_fits(d, tol, a, b, c, e) || parent_pair_fits(d, tol, c, e, a, b)
}

/// Base-case recognition of four items `w, x, y, z` of `d`.
///
/// The split with the largest pairwise sum (first one on ties) determines
/// the two candidate parent pairs.
#[allow(clippy::float_cmp)]
pub fn is_r_map_on_4(d: &Array2<f64>, tol: &Tolerance, w: usize, x: usize, y: usize, z: usize) -> bool {
    if !is_pseudometric(&restrict(d, &[w, x, y, z]), tol) {
        return false;
    }

    let sums = distance_sums(d, w, x, y, z);
    let max = sums.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if sums[0] == max {
        split_fits(d, tol, w, x, y, z)
    } else if sums[1] == max {
        split_fits(d, tol, w, y, x, z)
    } else {
        split_fits(d, tol, w, z, x, y)
    }
}

/// Base-case recognition of a 4×4 matrix.
pub fn is_r_map(d: &Array2<f64>, tol: &Tolerance) -> bool {
    d.dim() == (4, 4) && is_r_map_on_4(d, tol, 0, 1, 2, 3)
}

/// Blend coefficient for `(x, y: z)` implied by the witness pair `(u, v)`.
///
/// Returns `None` when the witnesses cannot discriminate `x` from `y`
/// (vanishing denominator).
pub fn estimate_alpha(
    d: &Array2<f64>,
    tol: &Tolerance,
    x: usize,
    y: usize,
    z: usize,
    u: usize,
    v: usize,
) -> Option<f64> {
    let numerator = (d[[u, z]] + d[[v, y]]) - (d[[v, z]] + d[[u, y]]);
    let denominator = (d[[u, x]] + d[[v, y]]) - (d[[v, x]] + d[[u, y]]);

    if tol.is_zero(denominator) {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// Increments implied by undoing `(x, y: z)α`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deltas {
    /// Growth of `z` since the event.
    pub delta_z: f64,

    /// Distance between `x` and `y` at the time of the event.
    pub d_xy: f64,

    /// Growth of `x` since the event.
    pub delta_x: f64,

    /// Growth of `y` since the event.
    pub delta_y: f64,
}

impl Deltas {
    /// All four quantities are non-negative up to tolerance.
    pub fn all_non_negative(&self, tol: &Tolerance) -> bool {
        [self.delta_z, self.d_xy, self.delta_x, self.delta_y]
            .iter()
            .all(|&v| tol.non_negative(v))
    }
}

/// Solve for the increments of `(x, y: z)α` using witness `u`.
///
/// A duplication (`α` exactly 0 or 1) needs no witness and attributes no
/// growth to `x` or `y`. A recombination without a witness has no solution.
#[allow(clippy::float_cmp)]
pub fn compute_deltas(
    d: &Array2<f64>,
    alpha: f64,
    x: usize,
    y: usize,
    z: usize,
    witness: Option<usize>,
) -> Option<Deltas> {
    let (xy, xz, yz) = (d[[x, y]], d[[x, z]], d[[y, z]]);
    let delta_z = 0.5 * (xz + yz - xy);

    if alpha == 0.0 || alpha == 1.0 {
        return Some(Deltas {
            delta_z,
            d_xy: xy,
            delta_x: 0.0,
            delta_y: 0.0,
        });
    }

    let u = witness?;
    let (ux, uy, uz) = (d[[u, x]], d[[u, y]], d[[u, z]]);

    let d_xy = (uz - alpha * ux - (1.0 - alpha) * uy - 2.0 * delta_z + alpha * xz
        + (1.0 - alpha) * yz)
        / (2.0 * alpha * (1.0 - alpha));

    Some(Deltas {
        delta_z,
        d_xy,
        delta_x: xz - (1.0 - alpha) * d_xy - delta_z,
        delta_y: yz - alpha * d_xy - delta_z,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    use crate::simulation::scenario::sample_history;
    use crate::simulation::{simulate, Scenario, SimulationConfig};

    /// Five items: one duplication followed by three recombinations.
    fn five_item_scenario() -> Scenario {
        Scenario::truncated(&sample_history(), 5).expect("history covers five items")
    }

    #[test]
    fn test_distance_sums() {
        let d = array![
            [0.0, 1.0, 2.0, 3.0],
            [1.0, 0.0, 4.0, 5.0],
            [2.0, 4.0, 0.0, 6.0],
            [3.0, 5.0, 6.0, 0.0]
        ];
        assert_eq!(distance_sums(&d, 0, 1, 2, 3), [7.0, 7.0, 7.0]);
    }

    #[test]
    fn test_zero_matrix_on_4_is_r_map() {
        assert!(is_r_map(&Array2::zeros((4, 4)), &Tolerance::default()));
    }

    #[test]
    fn test_duplication_quadruple_is_r_map() {
        // Item 3 is an exact duplicate of item 1 that then grew by 0.2.
        let base = array![[0.0, 1.0, 2.0], [1.0, 0.0, 1.5], [2.0, 1.5, 0.0]];
        let mut d = Array2::zeros((4, 4));
        for i in 0..3 {
            for j in 0..3 {
                d[[i, j]] = base[[i, j]];
            }
            if i != 1 {
                d[[i, 3]] = base[[i, 1]] + 0.2;
                d[[3, i]] = base[[i, 1]] + 0.2;
            }
        }
        d[[1, 3]] = 0.2;
        d[[3, 1]] = 0.2;
        assert!(is_r_map(&d, &Tolerance::default()));
    }

    #[test]
    fn test_simulated_duplications_on_4_are_r_maps() {
        let config = SimulationConfig::default().with_branching_prob(1.0);
        for seed in 0..50 {
            let scenario = simulate(4, &config, seed).expect("valid simulation");
            assert!(
                is_r_map(scenario.distances(), &Tolerance::default()),
                "seed {seed} failed"
            );
        }
    }

    #[test]
    fn test_simulated_on_4_mostly_r_maps() {
        let config = SimulationConfig::default();
        let tol = Tolerance::default();
        let hits = (0..1000u64)
            .filter(|&seed| {
                let scenario = simulate(4, &config, seed).expect("valid simulation");
                is_r_map(scenario.distances(), &tol)
            })
            .count();
        assert!(hits >= 990, "only {hits} of 1000 recognised");
    }

    #[test]
    fn test_non_metric_quadruple_is_rejected() {
        let mut d = Array2::zeros((4, 4));
        d[[0, 1]] = 5.0;
        d[[1, 0]] = 5.0;
        assert!(!is_r_map(&d, &Tolerance::default()));
    }

    #[test]
    fn test_wrong_size_is_rejected() {
        assert!(!is_r_map(&Array2::zeros((5, 5)), &Tolerance::default()));
    }

    #[test]
    fn test_estimate_alpha_recovers_last_event() {
        let scenario = five_item_scenario();
        let d = scenario.distances();
        let alpha = estimate_alpha(d, &Tolerance::default(), 0, 3, 4, 1, 2).expect("defined");
        assert!((alpha - 0.35).abs() < 1e-9, "alpha = {alpha}");
    }

    #[test]
    fn test_estimate_alpha_mirror_relation() {
        // α(x, y) + α(y, x) = 1 for any witness pair.
        let scenario = five_item_scenario();
        let d = scenario.distances();
        let tol = Tolerance::default();
        for (x, y, z, u, v) in [(0, 3, 4, 1, 2), (1, 2, 0, 3, 4), (0, 2, 3, 1, 4)] {
            let a = estimate_alpha(d, &tol, x, y, z, u, v).expect("defined");
            let b = estimate_alpha(d, &tol, y, x, z, u, v).expect("defined");
            assert!(tol.is_close(a + b, 1.0), "{a} + {b} != 1");
        }
    }

    #[test]
    fn test_estimate_alpha_undefined_for_equidistant_witnesses() {
        let d = Array2::from_elem((5, 5), 1.0) - Array2::<f64>::eye(5);
        assert_eq!(estimate_alpha(&d, &Tolerance::default(), 0, 1, 2, 3, 4), None);
    }

    #[test]
    fn test_compute_deltas_recovers_increments() {
        let scenario = five_item_scenario();
        let d = scenario.distances();
        let deltas = compute_deltas(d, 0.35, 0, 3, 4, Some(1)).expect("witness given");
        assert!((deltas.delta_z - 0.18).abs() < 1e-9);
        assert!((deltas.delta_x - 0.11).abs() < 1e-9);
        assert!((deltas.delta_y - 0.13).abs() < 1e-9);

        let before = Scenario::truncated(scenario.history(), 4).expect("four items");
        assert!((deltas.d_xy - before.distances()[[0, 3]]).abs() < 1e-9);
        assert!(deltas.all_non_negative(&Tolerance::default()));
    }

    #[test]
    fn test_compute_deltas_duplication() {
        let d = array![[0.0, 1.0, 1.5], [1.0, 0.0, 0.5], [1.5, 0.5, 0.0]];
        let deltas = compute_deltas(&d, 1.0, 0, 1, 2, None).expect("duplication");
        assert_eq!(deltas.d_xy, 1.0);
        assert_eq!(deltas.delta_x, 0.0);
        assert_eq!(deltas.delta_y, 0.0);
        assert!((deltas.delta_z - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_compute_deltas_needs_witness_for_recombination() {
        let d = Array2::zeros((3, 3));
        assert_eq!(compute_deltas(&d, 0.5, 0, 1, 2, None), None);
    }
}

//! Undo one event: drop `z` and shrink the distances of `x` and `y` by the
//! growth they accumulated since the event.

use ndarray::Array2;

use super::candidates::StepPositions;
use super::quadruple::Deltas;
use crate::metric::matrix::without_index;

/// The state left after one reduction step.
#[derive(Clone, Debug, PartialEq)]
pub struct Reduction {
    /// Parent items without `z`, order preserved.
    pub items: Vec<usize>,
    pub matrix: Array2<f64>,
}

/// Subtract `delta` from every distance touching position `idx`.
#[allow(clippy::float_cmp)]
fn shrink_item(m: &mut Array2<f64>, idx: usize, delta: f64) {
    if delta == 0.0 {
        return;
    }
    m.row_mut(idx).mapv_inplace(|v| v - delta);
    m.column_mut(idx).mapv_inplace(|v| v - delta);
    m[[idx, idx]] = 0.0;
}

/// Build the child state of `(d, items)` for a step at `positions`.
///
/// The parent matrix is left untouched.
pub fn reduce(
    d: &Array2<f64>,
    items: &[usize],
    positions: &StepPositions,
    deltas: &Deltas,
) -> Reduction {
    let z = positions.z;
    let shifted = |idx: usize| if idx > z { idx - 1 } else { idx };

    let mut matrix = without_index(d, z);
    shrink_item(&mut matrix, shifted(positions.x), deltas.delta_x);
    shrink_item(&mut matrix, shifted(positions.y), deltas.delta_y);

    let items = items
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != z)
        .map(|(_, &item)| item)
        .collect();

    Reduction { items, matrix }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn positions(x: usize, y: usize, z: usize) -> StepPositions {
        StepPositions {
            x,
            y,
            z,
            witness: None,
        }
    }

    #[test]
    fn test_reduce_removes_z_and_keeps_labels() {
        let d = array![
            [0.0, 1.0, 2.0, 3.0],
            [1.0, 0.0, 4.0, 5.0],
            [2.0, 4.0, 0.0, 6.0],
            [3.0, 5.0, 6.0, 0.0]
        ];
        let deltas = Deltas {
            delta_z: 0.0,
            d_xy: 0.0,
            delta_x: 0.0,
            delta_y: 0.0,
        };
        let r = reduce(&d, &[10, 11, 12, 13], &positions(0, 2, 1), &deltas);
        assert_eq!(r.items, vec![10, 12, 13]);
        assert_eq!(r.matrix, array![[0.0, 2.0, 3.0], [2.0, 0.0, 6.0], [3.0, 6.0, 0.0]]);
    }

    #[test]
    fn test_reduce_shrinks_x_and_y() {
        let d = array![
            [0.0, 1.0, 2.0, 3.0],
            [1.0, 0.0, 4.0, 5.0],
            [2.0, 4.0, 0.0, 6.0],
            [3.0, 5.0, 6.0, 0.0]
        ];
        let deltas = Deltas {
            delta_z: 0.5,
            d_xy: 1.0,
            delta_x: 0.25,
            delta_y: 0.5,
        };
        // x = position 1, y = position 3, z = position 2.
        let r = reduce(&d, &[0, 1, 2, 3], &positions(1, 3, 2), &deltas);
        assert_eq!(r.items, vec![0, 1, 3]);
        let expected = array![[0.0, 0.75, 2.5], [0.75, 0.0, 4.25], [2.5, 4.25, 0.0]];
        for (a, b) in r.matrix.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
        // Parent untouched.
        assert_eq!(d[[1, 3]], 5.0);
    }

    #[test]
    fn test_reduce_keeps_diagonal_exactly_zero() {
        let d = array![[0.0, 0.3, 0.3], [0.3, 0.0, 0.3], [0.3, 0.3, 0.0]];
        let deltas = Deltas {
            delta_z: 0.15,
            d_xy: 0.3,
            delta_x: 0.1,
            delta_y: 0.1,
        };
        let r = reduce(&d, &[0, 1, 2], &positions(0, 1, 2), &deltas);
        assert_eq!(r.matrix[[0, 0]], 0.0);
        assert_eq!(r.matrix[[1, 1]], 0.0);
        assert!((r.matrix[[0, 1]] - 0.1).abs() < 1e-12);
    }
}

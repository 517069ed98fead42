//! Pseudometric axioms: non-negativity, zero diagonal, symmetry and the
//! triangle inequality, each checked up to a [`Tolerance`].
//!
//! Checks run in that order and stop at the first violation. For the
//! triangle inequality the first offending pair (earliest `i`, then `j`)
//! is reported together with the item realising the shortest detour.

use std::fmt;

use ndarray::Array2;

use super::tolerance::Tolerance;

/// The first metric axiom a matrix violates.
///
/// Indices are item labels when the check was run with labels, matrix
/// positions otherwise.
#[derive(Clone, Debug, PartialEq)]
pub enum MetricViolation {
    NegativeDistance { row: usize, col: usize, value: f64 },
    NonZeroDiagonal { item: usize, value: f64 },
    Asymmetric { row: usize, col: usize },
    Triangle {
        i: usize,
        j: usize,
        via: usize,
        direct: f64,
        detour: f64,
    },
}

impl fmt::Display for MetricViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeDistance { row, col, value } => {
                write!(f, "negative distances: D[v{row},v{col}]={value}")
            }
            Self::NonZeroDiagonal { item, value } => {
                write!(f, "non-zero diagonal: D[v{item},v{item}]={value}")
            }
            Self::Asymmetric { row, col } => {
                write!(f, "not symmetric: D[v{row},v{col}] != D[v{col},v{row}]")
            }
            Self::Triangle {
                i,
                j,
                via,
                direct,
                detour,
            } => write!(
                f,
                "triangle inequality violation: D[v{i},v{j}]={direct} > {detour} over v{via}"
            ),
        }
    }
}

/// Whether `d` is a pseudometric.
pub fn is_pseudometric(d: &Array2<f64>, tol: &Tolerance) -> bool {
    check_pseudometric(d, tol).is_ok()
}

/// Check the pseudometric axioms, reporting matrix positions.
pub fn check_pseudometric(d: &Array2<f64>, tol: &Tolerance) -> Result<(), MetricViolation> {
    check(d, tol, |i| i)
}

/// Check the pseudometric axioms, reporting item labels from `items`.
///
/// `items` must have one label per row of `d`.
pub fn check_pseudometric_labeled(
    d: &Array2<f64>,
    items: &[usize],
    tol: &Tolerance,
) -> Result<(), MetricViolation> {
    debug_assert_eq!(items.len(), d.nrows());
    check(d, tol, |i| items[i])
}

fn check<L>(d: &Array2<f64>, tol: &Tolerance, label: L) -> Result<(), MetricViolation>
where
    L: Fn(usize) -> usize,
{
    let n = d.nrows();

    if let Some(((row, col), &value)) = d.indexed_iter().find(|(_, &v)| !tol.non_negative(v)) {
        return Err(MetricViolation::NegativeDistance {
            row: label(row),
            col: label(col),
            value,
        });
    }

    if let Some((item, &value)) = d.diag().iter().enumerate().find(|(_, &v)| v != 0.0) {
        return Err(MetricViolation::NonZeroDiagonal {
            item: label(item),
            value,
        });
    }

    for ((row, col), &value) in d.indexed_iter() {
        if !tol.is_close(value, d[[col, row]]) {
            return Err(MetricViolation::Asymmetric {
                row: label(row),
                col: label(col),
            });
        }
    }

    for i in 0..n.saturating_sub(1) {
        for j in (i + 1)..n {
            let (via, detour) = shortest_detour(d, i, j);
            let direct = d[[i, j]];
            if detour < direct && !tol.is_close(detour, direct) {
                return Err(MetricViolation::Triangle {
                    i: label(i),
                    j: label(j),
                    via: label(via),
                    direct,
                    detour,
                });
            }
        }
    }

    Ok(())
}

/// `min_k D[i,k] + D[k,j]` and the first `k` attaining it.
fn shortest_detour(d: &Array2<f64>, i: usize, j: usize) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for k in 0..d.nrows() {
        let through = d[[i, k]] + d[[k, j]];
        if through < best.1 {
            best = (k, through);
        }
    }
    best
}

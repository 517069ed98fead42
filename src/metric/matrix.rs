//! Construction and slicing of square distance matrices.

use ndarray::{Array2, Axis};

use crate::error::ShapeError;

/// Build a square matrix from row vectors, rejecting jagged or empty input.
pub fn from_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>, ShapeError> {
    let n = rows.len();
    if n == 0 {
        return Err(ShapeError::Empty);
    }

    let width = rows[0].len();
    for (row, values) in rows.iter().enumerate() {
        if values.len() != width {
            return Err(ShapeError::JaggedRow {
                row,
                len: values.len(),
                expected: width,
            });
        }
    }
    if width != n {
        return Err(ShapeError::NotSquare {
            rows: n,
            cols: width,
        });
    }

    Ok(Array2::from_shape_fn((n, n), |(i, j)| rows[i][j]))
}

/// Return the side length of a square, non-empty matrix.
pub fn ensure_square(d: &Array2<f64>) -> Result<usize, ShapeError> {
    let (rows, cols) = d.dim();
    if rows != cols {
        return Err(ShapeError::NotSquare { rows, cols });
    }
    if rows == 0 {
        return Err(ShapeError::Empty);
    }
    Ok(rows)
}

/// Restrict `d` to the given rows/columns, in the given order.
///
/// Panics if an index is out of range.
pub fn restrict(d: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    d.select(Axis(0), indices).select(Axis(1), indices)
}

/// Copy of `d` with row and column `index` removed.
pub fn without_index(d: &Array2<f64>, index: usize) -> Array2<f64> {
    let keep: Vec<usize> = (0..d.nrows()).filter(|&i| i != index).collect();
    restrict(d, &keep)
}

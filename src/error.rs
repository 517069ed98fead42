//! Structural errors.
//!
//! Only malformed input shapes are errors. A matrix that merely fails the
//! metric axioms or the recombination model is reported as data on the
//! recognition tree instead.

use thiserror::Error;

/// A distance matrix that cannot be interpreted as an n×n array.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("distance matrix must have at least one row")]
    Empty,
    #[error("distance matrix is not square: {rows} rows, {cols} columns")]
    NotSquare { rows: usize, cols: usize },
    #[error("row {row} has {len} entries, expected {expected}")]
    JaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },
}

/// An event history that does not describe a valid sequence of
/// duplication/recombination events.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum HistoryError {
    #[error("line {line}: malformed event '{text}'")]
    Malformed { line: usize, text: String },
    #[error("event introducing item {z} carries {len} increments, expected {expected}")]
    IncrementLength {
        z: usize,
        len: usize,
        expected: usize,
    },
    #[error("event {index} introduces item {z}, expected item {expected}")]
    OutOfOrder {
        index: usize,
        z: usize,
        expected: usize,
    },
    #[error("event introducing item {z} references unknown parent {parent}")]
    UnknownParent { z: usize, parent: usize },
    #[error("event introducing item {z} has blend coefficient {alpha} outside [0, 1]")]
    AlphaOutOfRange { z: usize, alpha: f64 },
    #[error("not enough events to build {requested} items (history covers {available})")]
    TooShort { requested: usize, available: usize },
}

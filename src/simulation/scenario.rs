//! Event histories and the distance matrices they generate.
//!
//! Item 0 exists from the start. Event `i` introduces item `z = i + 1`
//! either as a duplicate of an existing item or as a blend of two existing
//! items `x` and `y`:
//!
//! ```text
//! D[u, z] = α · D[x, u] + (1 - α) · D[y, u]      u ∉ {x, y}
//! D[x, z] = (1 - α) · D[x, y]
//! D[y, z] = α · D[x, y]
//! ```
//!
//! after which every item `p ≤ z` grows independently by `delta[p]`, i.e.
//! `D[p, q] += delta[p] + delta[q]`.

use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;

/// One duplication or recombination event plus the increments that follow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub x: usize,
    pub y: usize,
    /// The item introduced by this event.
    pub z: usize,
    pub alpha: f64,
    /// Independent growth of items `0..=z` after the event.
    pub delta: Vec<f64>,
}

/// Ordered sequence of events; event `i` introduces item `i + 1`.
pub type History = Vec<Event>;

impl Event {
    pub fn new(x: usize, y: usize, z: usize, alpha: f64, delta: Vec<f64>) -> Self {
        Self {
            x,
            y,
            z,
            alpha,
            delta,
        }
    }

    /// Pure duplication: same parents or a blend coefficient of 0 or 1.
    #[allow(clippy::float_cmp)]
    pub fn is_duplication(&self) -> bool {
        self.x == self.y || self.alpha == 0.0 || self.alpha == 1.0
    }

    /// The duplicated item; `y` when α is 0, `x` otherwise.
    #[allow(clippy::float_cmp)]
    pub fn source(&self) -> usize {
        if self.alpha == 0.0 {
            self.y
        } else {
            self.x
        }
    }

    fn validate(&self, index: usize) -> Result<(), HistoryError> {
        let expected = index + 1;
        if self.z != expected {
            return Err(HistoryError::OutOfOrder {
                index,
                z: self.z,
                expected,
            });
        }
        for parent in [self.x, self.y] {
            if parent >= self.z {
                return Err(HistoryError::UnknownParent { z: self.z, parent });
            }
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(HistoryError::AlphaOutOfRange {
                z: self.z,
                alpha: self.alpha,
            });
        }
        if self.delta.len() != self.z + 1 {
            return Err(HistoryError::IncrementLength {
                z: self.z,
                len: self.delta.len(),
                expected: self.z + 1,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Event {
    /// `(x, y: z) alpha; [d0,d1,...,dz]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}: {}) {:?}; [", self.x, self.y, self.z, self.alpha)?;
        for (i, d) in self.delta.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{d:?}")?;
        }
        f.write_str("]")
    }
}

/// A history together with its distance matrix.
#[derive(Clone, Debug)]
pub struct Scenario {
    history: History,
    matrix: Array2<f64>,
    /// Circular successor of each item, while every recombination joined
    /// neighbours.
    successors: Option<Vec<usize>>,
}

impl Scenario {
    /// Replay `history` from a single item.
    pub fn from_history(history: History) -> Result<Self, HistoryError> {
        let n = history.len() + 1;
        let mut d = Array2::<f64>::zeros((n, n));
        let mut successors = Some(vec![0usize; n]);

        for (index, event) in history.iter().enumerate() {
            event.validate(index)?;
            let z = event.z;

            if event.is_duplication() {
                let src = event.source();
                for u in 0..z {
                    let value = if u == src { 0.0 } else { d[[u, src]] };
                    d[[u, z]] = value;
                    d[[z, u]] = value;
                }
                if let Some(succ) = successors.as_mut() {
                    succ[z] = succ[src];
                    succ[src] = z;
                }
            } else {
                let (x, y, alpha) = (event.x, event.y, event.alpha);
                for u in (0..z).filter(|&u| u != x && u != y) {
                    let value = alpha * d[[x, u]] + (1.0 - alpha) * d[[y, u]];
                    d[[u, z]] = value;
                    d[[z, u]] = value;
                }
                let xy = d[[x, y]];
                d[[x, z]] = (1.0 - alpha) * xy;
                d[[z, x]] = (1.0 - alpha) * xy;
                d[[y, z]] = alpha * xy;
                d[[z, y]] = alpha * xy;

                successors = successors.and_then(|mut succ| {
                    if succ[x] == y {
                        succ[x] = z;
                        succ[z] = y;
                    } else if succ[y] == x {
                        succ[y] = z;
                        succ[z] = x;
                    } else {
                        return None;
                    }
                    Some(succ)
                });
            }

            for p in 0..z {
                for q in (p + 1)..=z {
                    d[[p, q]] += event.delta[p] + event.delta[q];
                    d[[q, p]] = d[[p, q]];
                }
            }
        }

        Ok(Self {
            history,
            matrix: d,
            successors,
        })
    }

    /// Replay only as many events as needed for `stop_after` items.
    pub fn truncated(history: &[Event], stop_after: usize) -> Result<Self, HistoryError> {
        let available = history.len() + 1;
        if stop_after == 0 || stop_after > available {
            return Err(HistoryError::TooShort {
                requested: stop_after,
                available,
            });
        }
        Self::from_history(history[..stop_after - 1].to_vec())
    }

    pub fn item_count(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn distances(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub fn history(&self) -> &[Event] {
        &self.history
    }

    /// Whether every recombination so far joined circular neighbours.
    pub fn is_circular(&self) -> bool {
        self.successors.is_some()
    }

    /// Circular order of the items starting at item 0, if circular.
    pub fn circular_order(&self) -> Option<Vec<usize>> {
        let succ = self.successors.as_ref()?;
        let mut order = vec![0];
        let mut visited = vec![false; succ.len()];
        visited[0] = true;
        loop {
            let next = succ[order[order.len() - 1]];
            if visited[next] {
                break;
            }
            visited[next] = true;
            order.push(next);
        }
        Some(order)
    }
}

/// Six items from one duplication and four recombinations.
#[cfg(test)]
pub(crate) fn sample_history() -> History {
    vec![
        Event::new(0, 0, 1, 1.0, vec![0.30, 0.25]),
        Event::new(0, 1, 2, 0.4, vec![0.10, 0.20, 0.15]),
        Event::new(1, 2, 3, 0.7, vec![0.05, 0.12, 0.08, 0.22]),
        Event::new(0, 3, 4, 0.35, vec![0.11, 0.07, 0.09, 0.13, 0.18]),
        Event::new(2, 4, 5, 0.6, vec![0.04, 0.06, 0.10, 0.03, 0.12, 0.16]),
    ]
}

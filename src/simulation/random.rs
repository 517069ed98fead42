//! Random event histories for generating type-R test matrices.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_distr::Exp1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::scenario::{Event, History, Scenario};
use crate::error::HistoryError;

/// Shape of the random process.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Probability that an event after the first is a pure duplication.
    pub branching_prob: f64,
    /// Only recombine circular neighbours.
    pub circular: bool,
    /// One shared increment per event instead of one per item.
    pub clocklike: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            branching_prob: 0.0,
            circular: false,
            clocklike: false,
        }
    }
}

impl SimulationConfig {
    pub fn with_branching_prob(mut self, branching_prob: f64) -> Self {
        self.branching_prob = branching_prob;
        self
    }

    pub fn with_circular(mut self, circular: bool) -> Self {
        self.circular = circular;
        self
    }

    pub fn with_clocklike(mut self, clocklike: bool) -> Self {
        self.clocklike = clocklike;
        self
    }
}

/// Draw a history on `n` items.
///
/// The first event always duplicates item 0. Increments follow an
/// exponential distribution with mean `1 / n`.
pub fn random_history<R: Rng + ?Sized>(n: usize, config: &SimulationConfig, rng: &mut R) -> History {
    let mut history = Vec::with_capacity(n.saturating_sub(1));
    let mut successors = vec![0usize; n.max(1)];
    let scale = 1.0 / n.max(1) as f64;

    for z in 1..n {
        let duplicate = z == 1 || rng.gen::<f64>() < config.branching_prob;

        let (x, y, alpha) = if duplicate {
            let x = rng.gen_range(0..z);
            let y = if config.circular { successors[x] } else { x };
            (x, y, 1.0)
        } else if config.circular {
            let x = rng.gen_range(0..z);
            (x, successors[x], rng.gen::<f64>())
        } else {
            let pair = index::sample(rng, z, 2);
            (pair.index(0), pair.index(1), rng.gen::<f64>())
        };

        if config.circular {
            successors[z] = successors[x];
            successors[x] = z;
        }

        let delta = if config.clocklike {
            let shared: f64 = rng.sample::<f64, _>(Exp1) * scale;
            vec![shared; z + 1]
        } else {
            (0..=z).map(|_| rng.sample::<f64, _>(Exp1) * scale).collect()
        };

        history.push(Event::new(x, y, z, alpha, delta));
    }

    history
}

/// Simulate a scenario on `n` items from a seeded generator.
pub fn simulate(n: usize, config: &SimulationConfig, seed: u64) -> Result<Scenario, HistoryError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let history = random_history(n, config, &mut rng);
    debug!(n, seed, events = history.len(), "simulated history");
    Scenario::from_history(history)
}

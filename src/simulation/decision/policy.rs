//! Action selection.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::simulation::decision::state::first_max;
use crate::simulation::params::{EPSILON, SOFTMAX_TEMPERATURE};

/// How the agent trades exploration against exploitation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Exploration {
    /// Random action with probability `epsilon`, otherwise the first best.
    EpsilonGreedy { epsilon: f64 },
    /// Sample in proportion to `exp(Q / temperature)`.
    Softmax { temperature: f64 },
}

impl Default for Exploration {
    fn default() -> Self {
        Self::EpsilonGreedy { epsilon: EPSILON }
    }
}

impl Exploration {
    /// Pure exploitation.
    #[must_use]
    pub const fn greedy() -> Self {
        Self::EpsilonGreedy { epsilon: 0.0 }
    }

    #[must_use]
    pub const fn softmax() -> Self {
        Self::Softmax {
            temperature: SOFTMAX_TEMPERATURE,
        }
    }

    /// Whether the parameters are usable.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match *self {
            Self::EpsilonGreedy { epsilon } => (0.0..=1.0).contains(&epsilon),
            Self::Softmax { temperature } => temperature > 0.0 && temperature.is_finite(),
        }
    }

    /// Picks an action index given the values of the current state.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn choose<R: Rng + ?Sized>(&self, values: &[f64], rng: &mut R) -> usize {
        assert!(!values.is_empty(), "cannot choose from an empty action set");
        match *self {
            Self::EpsilonGreedy { epsilon } => {
                if rng.random::<f64>() < epsilon {
                    rng.random_range(0..values.len())
                } else {
                    first_max(values).unwrap_or(0)
                }
            }
            Self::Softmax { temperature } => softmax_sample(values, temperature, rng),
        }
    }
}

fn softmax_sample<R: Rng + ?Sized>(values: &[f64], temperature: f64, rng: &mut R) -> usize {
    // Shift by the maximum so the largest weight is exp(0) = 1.
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = values
        .iter()
        .map(|q| ((q - max) / temperature).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return rng.random_range(0..values.len());
    }

    let mut draw = rng.random::<f64>() * total;
    for (i, w) in weights.iter().enumerate() {
        if draw < *w {
            return i;
        }
        draw -= w;
    }
    values.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_greedy_takes_first_best() {
        let mut rng = StdRng::seed_from_u64(7);
        let policy = Exploration::greedy();
        for _ in 0..20 {
            assert_eq!(policy.choose(&[1.0, 3.0, 3.0, -1.0], &mut rng), 1);
        }
    }

    #[test]
    fn test_full_exploration_covers_all_actions() {
        let mut rng = StdRng::seed_from_u64(7);
        let policy = Exploration::EpsilonGreedy { epsilon: 1.0 };
        let mut seen = [false; 4];
        for _ in 0..500 {
            seen[policy.choose(&[0.0; 4], &mut rng)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_softmax_favours_high_values() {
        let mut rng = StdRng::seed_from_u64(11);
        let policy = Exploration::Softmax { temperature: 0.5 };
        let mut counts = [0usize; 2];
        for _ in 0..2000 {
            counts[policy.choose(&[0.0, 3.0], &mut rng)] += 1;
        }
        assert!(counts[1] > counts[0] * 10, "counts: {counts:?}");
    }

    #[test]
    fn test_softmax_survives_huge_values() {
        let mut rng = StdRng::seed_from_u64(3);
        let policy = Exploration::softmax();
        let choice = policy.choose(&[1e6, 1e6 + 1.0], &mut rng);
        assert!(choice < 2);
    }

    #[test]
    fn test_validity() {
        assert!(Exploration::default().is_valid());
        assert!(!Exploration::EpsilonGreedy { epsilon: 1.5 }.is_valid());
        assert!(!Exploration::Softmax { temperature: 0.0 }.is_valid());
    }
}

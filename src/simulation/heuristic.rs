//! Heuristic decision maker.
//!
//! Looks for the minority color first (top-down guidance), reads the value
//! behind every perceived element and stops as soon as either positive or
//! negative evidence covers half the layout, or once no unsearched element
//! of the guided color is left.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::simulation::attention::most_active;
use crate::simulation::decision::{randomise_values, Answer};
use crate::simulation::error::{DecisionError, LayoutError};
use crate::simulation::layout::{ElementId, Surface};
use crate::simulation::params::{DEFAULT_COLOR, NEGATIVE_COLOR, POSITIVE_COLOR, POSITIVE_THRESHOLD};
use crate::simulation::search::SearchState;

/// Why the heuristic stopped looking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// One class of evidence reached half of the elements.
    Majority,
    /// No unsearched element carries the guided color.
    GuidedClassExhausted,
    /// Every element was searched.
    Exhausted,
}

/// Result of one heuristic decision.
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionOutcome {
    pub total_time: f64,
    pub scanpath: Vec<ElementId>,
    pub positives: usize,
    pub negatives: usize,
    pub answer: Answer,
    pub stop: StopReason,
}

/// Settings of the heuristic decision maker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicDecision {
    pub positive_color: String,
    pub negative_color: String,
    /// Values strictly above this count as positive evidence. Defaults to
    /// [`POSITIVE_THRESHOLD`], the midpoint of randomised values.
    pub threshold: f64,
    pub force_fixation: bool,
}

impl Default for HeuristicDecision {
    fn default() -> Self {
        Self {
            positive_color: POSITIVE_COLOR.to_string(),
            negative_color: NEGATIVE_COLOR.to_string(),
            threshold: POSITIVE_THRESHOLD,
            force_fixation: false,
        }
    }
}

impl HeuristicDecision {
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// The minority color, or `None` when the classes are balanced or the
    /// minority is absent.
    #[must_use]
    pub fn guidance(&self, surface: &Surface) -> Option<&str> {
        let count = |color: &str| surface.elements().iter().filter(|e| e.color == color).count();
        let positives = count(&self.positive_color);
        let negatives = count(&self.negative_color);
        match positives.cmp(&negatives) {
            std::cmp::Ordering::Less if positives > 0 => Some(&self.positive_color),
            std::cmp::Ordering::Greater if negatives > 0 => Some(&self.negative_color),
            _ => None,
        }
    }

    /// Runs the heuristic from `start` (default: the surface's eye location).
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::EmptyLayout`] for an empty surface.
    pub fn decide(
        &self,
        surface: &Surface,
        start: Option<ElementId>,
    ) -> Result<DecisionOutcome, LayoutError> {
        let start = start.or(surface.eye()).ok_or(LayoutError::EmptyLayout)?;
        let top_down = self.guidance(surface);
        let n = surface.len();
        let mut state = SearchState::new(start);
        let (mut positives, mut negatives) = (0, 0);
        let mut stop = StopReason::Exhausted;

        while !state.is_exhausted(surface) {
            let activation = state.candidates(surface, top_down);
            let Some(candidate) = most_active(&activation) else {
                unreachable!("inhibition of return emptied a non-exhausted activation map");
            };
            state.perceive(surface, candidate, self.force_fixation);

            if surface.element(candidate).data > self.threshold {
                positives += 1;
            } else {
                negatives += 1;
            }
            if 2 * positives >= n || 2 * negatives >= n {
                stop = StopReason::Majority;
                break;
            }

            if let Some(color) = top_down {
                let remaining = activation
                    .keys()
                    .filter(|&&id| id != candidate && surface.element(id).color == color)
                    .count();
                if remaining == 0 {
                    stop = StopReason::GuidedClassExhausted;
                    break;
                }
            }
        }

        let answer = match stop {
            // The guided color is the minority; whatever is left is the majority.
            StopReason::GuidedClassExhausted if top_down == Some(self.positive_color.as_str()) => {
                Answer::Negative
            }
            StopReason::GuidedClassExhausted => Answer::Positive,
            StopReason::Majority if 2 * positives >= n => Answer::Positive,
            StopReason::Majority => Answer::Negative,
            StopReason::Exhausted if positives >= negatives => Answer::Positive,
            StopReason::Exhausted => Answer::Negative,
        };
        debug!(positives, negatives, ?answer, ?stop, "heuristic decision");

        Ok(DecisionOutcome {
            total_time: state.elapsed,
            scanpath: state.scanpath,
            positives,
            negatives,
            answer,
            stop,
        })
    }
}

/// Writes values into the layout and colors each element by its value.
///
/// Values above the decision threshold take the positive color, others the
/// negative color; with `colours` off every element turns grey.
pub fn assign_values(
    surface: &mut Surface,
    values: &[(ElementId, f64)],
    colours: bool,
    decision: &HeuristicDecision,
) {
    for &(id, value) in values {
        surface.set_data(id, value);
        let color = if !colours {
            DEFAULT_COLOR
        } else if value > decision.threshold {
            decision.positive_color.as_str()
        } else {
            decision.negative_color.as_str()
        };
        surface.recolor(id, color);
    }
}

/// Aggregate performance over many randomised layouts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatchSummary {
    pub trials: usize,
    pub accuracy: f64,
    pub mean_time: f64,
    pub mean_fixations: f64,
}

/// Runs the heuristic on `trials` independently randomised copies of
/// `surface` in parallel. Trial `i` is seeded with `seed + i`.
///
/// Randomised values straddle [`POSITIVE_THRESHOLD`], the default threshold
/// of [`HeuristicDecision`]; a custom threshold skews the verdicts.
///
/// # Errors
///
/// Fails if the layout cannot be randomised (fewer than 3 elements).
pub fn evaluate_batch(
    surface: &Surface,
    decision: &HeuristicDecision,
    trials: usize,
    seed: u64,
) -> Result<BatchSummary, DecisionError> {
    let results: Vec<(bool, f64, usize)> = (0..trials)
        .into_par_iter()
        .map(|i| -> Result<(bool, f64, usize), DecisionError> {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            let mut trial = surface.clone();
            let correct = randomise_values(
                &mut trial,
                &mut rng,
                true,
                &decision.positive_color,
                &decision.negative_color,
            )?;
            let start = trial.ids().nth(rng.random_range(0..trial.len()));
            let outcome = decision.decide(&trial, start)?;
            Ok((outcome.answer == correct, outcome.total_time, outcome.scanpath.len()))
        })
        .collect::<Result<_, DecisionError>>()?;

    let n = results.len().max(1) as f64;
    Ok(BatchSummary {
        trials: results.len(),
        accuracy: results.iter().filter(|r| r.0).count() as f64 / n,
        mean_time: results.iter().map(|r| r.1).sum::<f64>() / n,
        mean_fixations: results.iter().map(|r| r.2 as f64).sum::<f64>() / n,
    })
}

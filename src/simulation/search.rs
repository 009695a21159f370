//! Guided visual search.
//!
//! The controller repeatedly picks the most active element that has not been
//! searched yet (perfect inhibition of return), charges the EMMA time to
//! perceive it, and stops when the target is found or every element has been
//! searched. Long-term memory can take over once enough time has passed to
//! recall the target's color or position.

use tracing::debug;

use crate::simulation::attention::{guided_activation, most_active, ActivationMap};
use crate::simulation::error::LayoutError;
use crate::simulation::layout::{ElementId, Point, Surface};
use crate::simulation::timing::Fixation;

/// Parameters of one search episode.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchQuery {
    /// Starting fixation; defaults to the surface's eye location.
    pub start: Option<ElementId>,
    /// Element being looked for; `None` searches the whole surface.
    pub target: Option<ElementId>,
    /// Requested color used as top-down guidance.
    pub top_down: Option<String>,
    /// Move the eye to every candidate even when EMMA perceives it from afar.
    pub force_fixation: bool,
}

impl SearchQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn starting_at(mut self, start: ElementId) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub fn looking_for(mut self, target: ElementId) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn guided_by(mut self, color: impl Into<String>) -> Self {
        self.top_down = Some(color.into());
        self
    }

    #[must_use]
    pub fn forcing_fixation(mut self) -> Self {
        self.force_fixation = true;
        self
    }
}

/// Result of a search episode.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    /// Seconds spent searching.
    pub total_time: f64,
    /// Elements actually fixated, starting with the start element.
    pub scanpath: Vec<ElementId>,
    /// Every element perceived, with or without an eye movement.
    pub searched: Vec<ElementId>,
    /// Whether the requested target was reached.
    pub found: bool,
}

/// Bookkeeping of an in-progress search.
#[derive(Clone, Debug)]
pub struct SearchState {
    pub eye: ElementId,
    pub searched: Vec<ElementId>,
    pub scanpath: Vec<ElementId>,
    pub elapsed: f64,
}

impl SearchState {
    #[must_use]
    pub fn new(start: ElementId) -> Self {
        Self {
            eye: start,
            searched: vec![start],
            scanpath: vec![start],
            elapsed: 0.0,
        }
    }

    /// True once every element has been searched.
    #[must_use]
    pub fn is_exhausted(&self, surface: &Surface) -> bool {
        self.searched.len() >= surface.len()
    }

    /// Activation of every element not yet searched.
    #[must_use]
    pub fn candidates(&self, surface: &Surface, top_down: Option<&str>) -> ActivationMap {
        let mut activation = guided_activation(surface, self.eye, top_down);
        for id in &self.searched {
            activation.remove(id);
        }
        activation
    }

    /// Perceives `candidate` from the current eye location.
    ///
    /// The candidate always joins the search history; the scanpath and eye
    /// location only advance if the eye moved (or `force` is set, for the eye).
    pub fn perceive(&mut self, surface: &Surface, candidate: ElementId, force: bool) -> Fixation {
        let fixation = surface.emma_time(candidate, Some(self.eye));
        self.elapsed += fixation.time;
        if fixation.moved {
            self.scanpath.push(candidate);
        }
        self.searched.push(candidate);
        if fixation.moved || force {
            self.eye = candidate;
        }
        debug!(
            candidate = surface.name(candidate),
            moved = fixation.moved,
            elapsed = self.elapsed,
            "perceived"
        );
        fixation
    }

    #[must_use]
    pub fn into_outcome(self, found: bool) -> SearchOutcome {
        SearchOutcome {
            total_time: self.elapsed,
            scanpath: self.scanpath,
            searched: self.searched,
            found,
        }
    }
}

/// Memory-based overrides available at a given moment of a search.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecallOverride {
    /// Remembered color of the target, replacing the top-down feature.
    pub color: Option<String>,
    /// Remembered location of the target; the nearest candidate to it is
    /// fixated instead of the most active one.
    pub position: Option<Point>,
}

/// Source of long-term-memory recall during search.
pub trait RecallStrategy {
    /// Overrides that have become available for `target` after `elapsed`
    /// seconds of searching.
    fn recall(&self, surface: &Surface, target: ElementId, elapsed: f64) -> RecallOverride;
}

/// Search purely by perception.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRecall;

impl RecallStrategy for NoRecall {
    fn recall(&self, _surface: &Surface, _target: ElementId, _elapsed: f64) -> RecallOverride {
        RecallOverride::default()
    }
}

/// Recall from the surface's long-term memory once each fact's recall time
/// has elapsed.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryRecall;

impl RecallStrategy for MemoryRecall {
    fn recall(&self, surface: &Surface, target: ElementId, elapsed: f64) -> RecallOverride {
        let memory = surface.memory();
        RecallOverride {
            color: memory
                .color(target)
                .filter(|trace| elapsed >= trace.recall_time())
                .map(|trace| trace.fact.clone()),
            position: memory
                .position(target)
                .filter(|trace| elapsed >= trace.recall_time())
                .map(|trace| trace.fact),
        }
    }
}

/// Saliency- and memory-guided search over a surface.
pub struct GuidedSearch<'s, R = MemoryRecall> {
    surface: &'s Surface,
    recall: R,
}

impl<'s> GuidedSearch<'s, MemoryRecall> {
    #[must_use]
    pub fn new(surface: &'s Surface) -> Self {
        Self {
            surface,
            recall: MemoryRecall,
        }
    }
}

impl<'s, R: RecallStrategy> GuidedSearch<'s, R> {
    /// Replaces the recall strategy.
    #[must_use]
    pub fn with_recall<Q: RecallStrategy>(self, recall: Q) -> GuidedSearch<'s, Q> {
        GuidedSearch {
            surface: self.surface,
            recall,
        }
    }

    /// Runs one search episode.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::EmptyLayout`] if there is nowhere to start.
    pub fn run(&self, query: &SearchQuery) -> Result<SearchOutcome, LayoutError> {
        let surface = self.surface;
        let start = query
            .start
            .or(surface.eye())
            .ok_or(LayoutError::EmptyLayout)?;
        let mut state = SearchState::new(start);

        if query.target == Some(start) {
            state.elapsed = surface.emma_time(start, Some(start)).time;
            return Ok(state.into_outcome(true));
        }

        let mut top_down = query.top_down.clone();
        while !state.is_exhausted(surface) {
            let recalled = query
                .target
                .map(|target| self.recall.recall(surface, target, state.elapsed))
                .unwrap_or_default();
            if recalled.color.is_some() {
                top_down = recalled.color;
            }

            let activation = state.candidates(surface, top_down.as_deref());
            let candidate = match recalled.position {
                Some(remembered) => surface.nearest_element(remembered, activation.keys().copied()),
                None => most_active(&activation),
            };
            let Some(candidate) = candidate else {
                unreachable!("inhibition of return emptied a non-exhausted activation map");
            };

            state.perceive(surface, candidate, query.force_fixation);
            if Some(candidate) == query.target {
                return Ok(state.into_outcome(true));
            }
        }

        Ok(state.into_outcome(query.target.is_none()))
    }
}

/// Guided search using the surface's long-term memory.
///
/// # Errors
///
/// Returns [`LayoutError::EmptyLayout`] for an empty surface.
pub fn run_search(surface: &Surface, query: &SearchQuery) -> Result<SearchOutcome, LayoutError> {
    GuidedSearch::new(surface).run(query)
}

/// Nearest-first search with perfect inhibition of return.
///
/// # Errors
///
/// Returns [`LayoutError::EmptyLayout`] for an empty surface.
pub fn exhaustive_search(
    surface: &Surface,
    start: Option<ElementId>,
    target: Option<ElementId>,
) -> Result<SearchOutcome, LayoutError> {
    let start = start.or(surface.eye()).ok_or(LayoutError::EmptyLayout)?;
    let mut state = SearchState::new(start);

    while !state.is_exhausted(surface) {
        let eye = state.eye;
        let unsearched = surface.ids().filter(|id| !state.searched.contains(id));
        let Some(candidate) = surface.nearest_element(surface.element(eye).center(), unsearched)
        else {
            unreachable!("unsearched elements remain while not exhausted");
        };
        state.perceive(surface, candidate, false);
        if Some(candidate) == target {
            return Ok(state.into_outcome(true));
        }
    }

    Ok(state.into_outcome(target.is_none()))
}

/// Time and fixations for visiting a prescribed sequence of elements.
///
/// Targets perceived without a saccade do not become fixations, and the
/// next target is timed from the last actual fixation.
#[must_use]
pub fn emma_scanpath(surface: &Surface, path: &[ElementId]) -> SearchOutcome {
    let Some((&first, rest)) = path.split_first() else {
        return SearchOutcome {
            total_time: 0.0,
            scanpath: Vec::new(),
            searched: Vec::new(),
            found: false,
        };
    };
    let mut state = SearchState::new(first);
    for &next in rest {
        state.perceive(surface, next, false);
    }
    state.into_outcome(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::layout::{Element, Expertise};

    fn row_of_four() -> Surface {
        let mut surface = Surface::new(800.0, 200.0);
        for (i, color) in ["red", "red", "blue", "red"].iter().enumerate() {
            let x = i as f64 * 200.0;
            surface
                .add(Element::new(format!("e{i}"), x, 0.0, 100.0, 100.0).with_color(*color))
                .unwrap();
        }
        surface
    }

    #[test]
    fn test_start_equals_target_is_immediate() {
        let surface = row_of_four();
        let e0 = surface.id("e0").unwrap();
        let query = SearchQuery::new().starting_at(e0).looking_for(e0);
        let outcome = run_search(&surface, &query).unwrap();
        assert!(outcome.found);
        assert_eq!(outcome.scanpath, vec![e0]);
        assert!((outcome.total_time - surface.emma_time(e0, Some(e0)).time).abs() < 1e-12);
    }

    #[test]
    fn test_free_search_visits_everything_once() {
        let surface = row_of_four();
        let outcome = run_search(&surface, &SearchQuery::new()).unwrap();
        assert_eq!(outcome.searched.len(), surface.len());
        let mut sorted = outcome.searched.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), surface.len());
        assert!(outcome.found);
    }

    #[test]
    fn test_position_recall_jumps_to_remembered_target() {
        let mut surface = row_of_four();
        let target = surface.id("e3").unwrap();
        // A very strong memory is due at (almost) zero elapsed time.
        surface.learn_position(target, Expertise::Strength(50.0));
        let outcome = run_search(&surface, &SearchQuery::new().looking_for(target)).unwrap();
        assert!(outcome.found);
        // Recall is due after the first perception at the latest.
        assert!(outcome.searched.len() <= 3);

        let forgetful = GuidedSearch::new(&surface)
            .with_recall(NoRecall)
            .run(&SearchQuery::new().looking_for(target))
            .unwrap();
        assert!(forgetful.searched.len() >= 2);
    }

    #[test]
    fn test_exhaustive_search_goes_nearest_first() {
        let surface = row_of_four();
        let ids: Vec<ElementId> = surface.ids().collect();
        let outcome = exhaustive_search(&surface, Some(ids[0]), Some(ids[3])).unwrap();
        assert!(outcome.found);
        assert_eq!(outcome.searched, ids);

        let free = exhaustive_search(&surface, Some(ids[0]), None).unwrap();
        assert_eq!(free.searched.len(), surface.len());
        assert!(free.found);
    }

    #[test]
    fn test_emma_scanpath_of_empty_path() {
        let surface = row_of_four();
        let outcome = emma_scanpath(&surface, &[]);
        assert!(outcome.scanpath.is_empty());
        assert!(outcome.total_time.abs() < f64::EPSILON);
    }
}

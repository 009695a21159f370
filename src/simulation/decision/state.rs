//! Perceptual state and the action-value table keyed by it.

use std::collections::HashMap;

/// What the agent knows about one element.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Percept {
    /// Whether the element has been the target of a fixation.
    pub observed: bool,
    /// Color, once perceived directly or in the periphery.
    pub color: Option<String>,
}

/// Per-element percepts, indexed by element id.
///
/// Two episodes with the same percepts share one learned state regardless
/// of the underlying coordinates or values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PerceptualState(Vec<Percept>);

impl PerceptualState {
    /// Nothing observed, no colors known.
    #[must_use]
    pub fn blank(elements: usize) -> Self {
        Self(vec![Percept::default(); elements])
    }

    #[must_use]
    pub fn percepts(&self) -> &[Percept] {
        &self.0
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Percept> {
        self.0.get(index)
    }

    /// Marks an element as fixated with the given perceived color.
    pub fn observe(&mut self, index: usize, color: impl Into<String>) {
        self.0[index] = Percept {
            observed: true,
            color: Some(color.into()),
        };
    }

    /// Records a peripheral color without marking the element fixated.
    pub fn glimpse(&mut self, index: usize, color: impl Into<String>) {
        self.0[index].color = Some(color.into());
    }

    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.0.iter().filter(|p| p.observed).count()
    }
}

/// Lazily populated action values, one row per perceptual state.
///
/// Rows are created with every action at 0.0 on first visit and never pruned.
#[derive(Clone, Debug)]
pub struct QTable {
    actions: usize,
    rows: HashMap<PerceptualState, Vec<f64>>,
}

impl QTable {
    #[must_use]
    pub fn new(actions: usize) -> Self {
        Self {
            actions,
            rows: HashMap::new(),
        }
    }

    /// Number of actions per state.
    #[must_use]
    pub const fn actions(&self) -> usize {
        self.actions
    }

    /// Number of states visited so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of a state, if it has been visited.
    #[must_use]
    pub fn values(&self, state: &PerceptualState) -> Option<&[f64]> {
        self.rows.get(state).map(Vec::as_slice)
    }

    /// Values of a state, creating a zeroed row on first visit.
    pub fn visit(&mut self, state: &PerceptualState) -> &mut [f64] {
        let actions = self.actions;
        self.rows
            .entry(state.clone())
            .or_insert_with(|| vec![0.0; actions])
    }

    /// Highest value of a state (0.0 for an unvisited state).
    #[must_use]
    pub fn max_value(&self, state: &PerceptualState) -> f64 {
        self.values(state)
            .and_then(|values| values.iter().copied().reduce(f64::max))
            .unwrap_or(0.0)
    }

    /// Bootstrapped update: `Q(s,a) += alpha * (r + gamma * max Q(s') - Q(s,a))`.
    pub fn update_bootstrapped(
        &mut self,
        state: &PerceptualState,
        action: usize,
        reward: f64,
        next: &PerceptualState,
        alpha: f64,
        gamma: f64,
    ) {
        let next_max = self.max_value(next);
        let q = &mut self.visit(state)[action];
        *q += alpha * (reward + gamma * next_max - *q);
    }

    /// Terminal update without bootstrap: `Q(s,a) += alpha * (r - Q(s,a))`.
    pub fn update_terminal(
        &mut self,
        state: &PerceptualState,
        action: usize,
        reward: f64,
        alpha: f64,
    ) {
        let q = &mut self.visit(state)[action];
        *q += alpha * (reward - *q);
    }
}

/// Index of the highest value; ties go to the first.
#[must_use]
pub fn first_max(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if best.is_none_or(|(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_row_is_zeroed() {
        let mut table = QTable::new(5);
        let state = PerceptualState::blank(3);
        assert!(table.values(&state).is_none());
        assert_eq!(table.visit(&state).to_vec(), vec![0.0; 5]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_structurally_equal_states_share_a_row() {
        let mut table = QTable::new(2);
        let mut a = PerceptualState::blank(2);
        a.observe(0, "red");
        let mut b = PerceptualState::blank(2);
        b.glimpse(0, "red");
        b.observe(0, "red");
        table.visit(&a)[1] = 3.0;
        assert_eq!(table.values(&b), Some(&[0.0, 3.0][..]));
    }

    #[test]
    fn test_bootstrapped_update() {
        let mut table = QTable::new(2);
        let s = PerceptualState::blank(1);
        let mut next = PerceptualState::blank(1);
        next.observe(0, "green");
        table.visit(&next)[0] = 10.0;
        table.update_bootstrapped(&s, 1, 1.0, &next, 0.5, 0.9);
        // 0 + 0.5 * (1 + 9 - 0)
        assert!((table.values(&s).unwrap()[1] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_terminal_update_ignores_successors() {
        let mut table = QTable::new(1);
        let s = PerceptualState::blank(1);
        table.update_terminal(&s, 0, 20.0, 0.1);
        assert!((table.values(&s).unwrap()[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_first_max_breaks_ties_to_first() {
        assert_eq!(first_max(&[0.0, 2.0, 2.0]), Some(1));
        assert_eq!(first_max(&[0.0, 0.0]), Some(0));
        assert_eq!(first_max(&[]), None);
    }
}

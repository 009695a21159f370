//! The decision agent and its episode environment.
//!
//! One episode is one randomised assignment of values to the layout's
//! elements. The agent fixates elements (paying EMMA time) until it commits
//! to accept ("mostly positive") or reject ("mostly negative").

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::simulation::decision::{
    Action, AgentConfig, Answer, Exploration, PerceptualState, QTable,
};
use crate::simulation::error::DecisionError;
use crate::simulation::layout::{ElementId, Surface};
use crate::simulation::params::{
    DECISION_TIME, DEFAULT_COLOR, PERIPHERAL_RADIUS, POSITIVE_THRESHOLD,
};

/// Assigns random values to every element so that the majority answer is
/// fixed in advance, and returns that answer.
///
/// Either answer is drawn with equal probability. A positive episode gets
/// between `floor(n/2) + 1` and `n - 1` positive elements, a negative one
/// between 0 and `ceil(n/2) - 1`, i.e. any strict minority: 4 of 9 can be
/// positive in a negative episode. Positive values lie in `[0.51, 0.99]`,
/// negative ones in `[0.01, 0.49]`. Elements are colored
/// `positive`/`negative` by value, or grey with `colours` off.
///
/// # Errors
///
/// Returns [`DecisionError::TooFewElements`] for layouts with fewer than
/// three elements, where no such split exists.
pub fn randomise_values<R: Rng + ?Sized>(
    surface: &mut Surface,
    rng: &mut R,
    colours: bool,
    positive: &str,
    negative: &str,
) -> Result<Answer, DecisionError> {
    let n = surface.len();
    if n < 3 {
        return Err(DecisionError::TooFewElements(n));
    }

    let answer = if rng.random_bool(0.5) {
        Answer::Positive
    } else {
        Answer::Negative
    };
    let positives = match answer {
        Answer::Positive => rng.random_range(n / 2 + 1..=n - 1),
        Answer::Negative => rng.random_range(0..=n.div_ceil(2) - 1),
    };

    let mut ids: Vec<ElementId> = surface.ids().collect();
    ids.shuffle(rng);
    for (rank, id) in ids.into_iter().enumerate() {
        let (value, color) = if rank < positives {
            (f64::from(rng.random_range(51..=99_u32)) / 100.0, positive)
        } else {
            (f64::from(rng.random_range(1..=49_u32)) / 100.0, negative)
        };
        surface.set_data(id, value);
        surface.recolor(id, if colours { color } else { DEFAULT_COLOR });
    }
    Ok(answer)
}

/// Tabular Q-learning agent for the accept/reject task.
///
/// The agent owns its layout and RNG; independent agents share nothing.
#[derive(Clone, Debug)]
pub struct DecisionAgent {
    surface: Surface,
    config: AgentConfig,
    actions: Vec<Action>,
    q_table: QTable,
    rng: StdRng,
    learning: bool,

    // Episode state
    percepts: PerceptualState,
    current_state: PerceptualState,
    previous_state: Option<PerceptualState>,
    action: Option<usize>,
    previous_action: Option<usize>,
    eye: ElementId,
    scanpath: Vec<ElementId>,
    task_time: f64,
    terminal: bool,
    reward: f64,
    correct_answer: Answer,
}

impl DecisionAgent {
    /// Creates an agent over `surface` and starts a first random episode.
    ///
    /// The action set is one fixation per element followed by accept and
    /// reject.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError::TooFewElements`] for layouts with fewer than
    /// three elements.
    pub fn new(surface: Surface, config: AgentConfig) -> Result<Self, DecisionError> {
        let n = surface.len();
        if n < 3 {
            return Err(DecisionError::TooFewElements(n));
        }

        let mut actions: Vec<Action> = surface.ids().map(Action::Fixate).collect();
        actions.extend([Action::Accept, Action::Reject]);
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let first = ElementId(0);

        let mut agent = Self {
            q_table: QTable::new(actions.len()),
            actions,
            rng,
            learning: true,
            percepts: PerceptualState::blank(n),
            current_state: PerceptualState::blank(n),
            previous_state: None,
            action: None,
            previous_action: None,
            eye: first,
            scanpath: vec![first],
            task_time: 0.0,
            terminal: false,
            reward: 0.0,
            correct_answer: Answer::Positive,
            surface,
            config,
        };
        agent.reset()?;
        Ok(agent)
    }

    /// Starts a new episode on freshly randomised values.
    ///
    /// # Errors
    ///
    /// Propagates [`randomise_values`] failures.
    pub fn reset(&mut self) -> Result<(), DecisionError> {
        self.correct_answer = randomise_values(
            &mut self.surface,
            &mut self.rng,
            self.config.colours,
            &self.config.positive_color,
            &self.config.negative_color,
        )?;
        self.begin_episode();
        Ok(())
    }

    /// Starts a new episode with the given values written over a random
    /// assignment.
    ///
    /// The correct answer is [`Answer::Negative`] iff more than half of all
    /// elements end up below the positive threshold.
    ///
    /// # Errors
    ///
    /// Propagates [`randomise_values`] failures.
    pub fn reset_with_values(&mut self, values: &[(ElementId, f64)]) -> Result<(), DecisionError> {
        randomise_values(
            &mut self.surface,
            &mut self.rng,
            self.config.colours,
            &self.config.positive_color,
            &self.config.negative_color,
        )?;
        for &(id, value) in values {
            self.surface.set_data(id, value);
            let color = if !self.config.colours {
                DEFAULT_COLOR
            } else if value < POSITIVE_THRESHOLD {
                self.config.negative_color.as_str()
            } else {
                self.config.positive_color.as_str()
            };
            self.surface.recolor(id, color.to_string());
        }

        let below = self
            .surface
            .elements()
            .iter()
            .filter(|e| e.data < POSITIVE_THRESHOLD)
            .count();
        self.correct_answer = if 2 * below > self.surface.len() {
            Answer::Negative
        } else {
            Answer::Positive
        };
        self.begin_episode();
        Ok(())
    }

    fn begin_episode(&mut self) {
        let n = self.surface.len();
        self.percepts = PerceptualState::blank(n);
        self.current_state = self.percepts.clone();
        self.previous_state = None;
        self.action = None;
        self.previous_action = None;
        self.eye = ElementId(self.rng.random_range(0..n));
        self.scanpath = vec![self.eye];
        self.task_time = 0.0;
        self.terminal = false;
        self.reward = 0.0;
        self.q_table.visit(&self.current_state);
    }

    /// Advances the episode by one action, chosen by the exploration policy
    /// unless `forced`.
    ///
    /// Learning, when enabled, first updates the previous transition with a
    /// bootstrapped target and, on a terminal action, updates the terminal
    /// pair with the immediate reward only.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError::EpisodeFinished`] after a terminal action and
    /// [`DecisionError::UnknownAction`] for a forced action outside the
    /// action set. Neither mutates the agent.
    pub fn step(&mut self, forced: Option<Action>) -> Result<(), DecisionError> {
        if self.terminal {
            return Err(DecisionError::EpisodeFinished);
        }
        let forced = forced
            .map(|a| {
                self.actions
                    .iter()
                    .position(|&b| b == a)
                    .ok_or(DecisionError::UnknownAction)
            })
            .transpose()?;

        let previous = std::mem::replace(&mut self.current_state, self.percepts.clone());
        self.previous_state = Some(previous);
        self.previous_action = self.action;
        self.q_table.visit(&self.current_state);

        if self.learning {
            if let (Some(state), Some(action)) = (&self.previous_state, self.previous_action) {
                self.q_table.update_bootstrapped(
                    state,
                    action,
                    self.reward,
                    &self.current_state,
                    self.config.alpha,
                    self.config.gamma,
                );
            }
        }

        let index = match forced {
            Some(index) => index,
            None => {
                let values = self.q_table.visit(&self.current_state);
                self.config.exploration.choose(values, &mut self.rng)
            }
        };
        self.action = Some(index);

        let action = self.actions[index];
        let elapsed = match action {
            Action::Fixate(target) => self.fixate(target),
            Action::Accept | Action::Reject => {
                self.terminal = true;
                DECISION_TIME
            }
        };
        self.task_time += elapsed;
        self.reward = self.reward_for(action);

        if self.terminal && self.learning {
            self.q_table
                .update_terminal(&self.current_state, index, self.reward, self.config.alpha);
        }

        debug!(
            ?action,
            elapsed,
            task_time = self.task_time,
            reward = self.reward,
            "agent step"
        );
        Ok(())
    }

    /// Looks at `target` and returns the time it took.
    fn fixate(&mut self, target: ElementId) -> f64 {
        let fixation = self.surface.emma_time(target, Some(self.eye));
        if fixation.moved {
            self.eye = target;
            self.scanpath.push(target);
        }

        let color = if self.surface.element(target).data >= POSITIVE_THRESHOLD {
            &self.config.positive_color
        } else {
            &self.config.negative_color
        };
        self.percepts.observe(target.index(), color.as_str());

        if self.config.colours {
            for other in self.surface.ids() {
                let fixated = self
                    .percepts
                    .get(other.index())
                    .is_some_and(|p| p.observed);
                if fixated {
                    continue;
                }
                let proximity =
                    self.surface.distance(other, target) / self.surface.element_size(other);
                if proximity < PERIPHERAL_RADIUS {
                    self.percepts
                        .glimpse(other.index(), self.surface.element(other).color.as_str());
                }
            }
        }

        fixation.time + self.config.encoding_penalty
    }

    fn reward_for(&self, action: Action) -> f64 {
        match action.answer() {
            None => 0.0,
            Some(answer) if answer == self.correct_answer => {
                self.config.correct_reward - self.task_time * self.config.time_cost
            }
            Some(_) => self.config.incorrect_reward - self.task_time * self.config.time_cost,
        }
    }

    /// Whether the episode has ended with accept or reject.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Seconds spent in the current episode.
    #[must_use]
    pub const fn task_time(&self) -> f64 {
        self.task_time
    }

    /// Eye positions of the current episode, starting location first.
    #[must_use]
    pub fn scanpath(&self) -> &[ElementId] {
        &self.scanpath
    }

    /// The action taken in the latest step.
    #[must_use]
    pub fn action(&self) -> Option<Action> {
        self.action.map(|i| self.actions[i])
    }

    #[must_use]
    pub const fn correct_answer(&self) -> Answer {
        self.correct_answer
    }

    /// Reward earned by the latest step.
    #[must_use]
    pub const fn reward(&self) -> f64 {
        self.reward
    }

    /// Current eye location.
    #[must_use]
    pub const fn eye(&self) -> ElementId {
        self.eye
    }

    /// Percepts gathered so far in this episode.
    #[must_use]
    pub const fn percepts(&self) -> &PerceptualState {
        &self.percepts
    }

    /// State the latest step acted from.
    #[must_use]
    pub const fn current_state(&self) -> &PerceptualState {
        &self.current_state
    }

    #[must_use]
    pub const fn q_table(&self) -> &QTable {
        &self.q_table
    }

    #[must_use]
    pub const fn surface(&self) -> &Surface {
        &self.surface
    }

    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Fixations first (in element order), then accept and reject.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    #[must_use]
    pub const fn is_learning(&self) -> bool {
        self.learning
    }

    pub fn set_learning(&mut self, learning: bool) {
        self.learning = learning;
    }

    pub fn set_exploration(&mut self, exploration: Exploration) {
        self.config.exploration = exploration;
    }
}

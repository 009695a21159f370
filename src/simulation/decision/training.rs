//! Episode loop, training and greedy evaluation.

use tracing::{info, warn};

use crate::simulation::decision::{Action, DecisionAgent, Exploration};
use crate::simulation::error::DecisionError;

/// How one episode ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EpisodeOutcome {
    /// The agent accepted or rejected.
    Decided {
        action: Action,
        correct: bool,
        reward: f64,
        task_time: f64,
        fixations: usize,
    },
    /// No terminal action within the step cap; the episode is inconclusive.
    Stuck { steps: usize },
}

impl EpisodeOutcome {
    #[must_use]
    pub const fn is_stuck(&self) -> bool {
        matches!(self, Self::Stuck { .. })
    }
}

impl DecisionAgent {
    /// Steps the current episode until it ends or `max_steps` is reached.
    ///
    /// The agent is left as it stands; callers reset before the next episode.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError::EpisodeFinished`] if the episode had already
    /// ended.
    pub fn run_episode(&mut self) -> Result<EpisodeOutcome, DecisionError> {
        let max_steps = self.config().max_steps;
        for _ in 0..max_steps {
            self.step(None)?;
            if self.is_terminal() {
                let Some(action) = self.action() else {
                    unreachable!("terminal agent without an action");
                };
                return Ok(EpisodeOutcome::Decided {
                    action,
                    correct: action.answer() == Some(self.correct_answer()),
                    reward: self.reward(),
                    task_time: self.task_time(),
                    fixations: self.scanpath().len(),
                });
            }
        }
        warn!(steps = max_steps, "episode got stuck without a decision");
        Ok(EpisodeOutcome::Stuck { steps: max_steps })
    }
}

/// Summary of a training run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainingReport {
    pub episodes: usize,
    /// Mean terminal reward over decided episodes.
    pub mean_reward: f64,
    pub stuck: usize,
}

/// Trains `agent` for `episodes` random episodes with its configured
/// exploration, logging the running mean reward every tenth of the run.
///
/// # Errors
///
/// Propagates episode errors.
pub fn train(agent: &mut DecisionAgent, episodes: usize) -> Result<TrainingReport, DecisionError> {
    let report_every = (episodes / 10).max(1);
    let (mut total, mut decided, mut stuck) = (0.0, 0usize, 0usize);
    let (mut window, mut window_len) = (0.0, 0usize);

    for episode in 1..=episodes {
        agent.reset()?;
        match agent.run_episode()? {
            EpisodeOutcome::Decided { reward, .. } => {
                total += reward;
                decided += 1;
                window += reward;
                window_len += 1;
            }
            EpisodeOutcome::Stuck { .. } => stuck += 1,
        }

        if episode % report_every == 0 {
            let mean = if window_len > 0 { window / window_len as f64 } else { 0.0 };
            info!(
                progress = episode as f64 / episodes as f64,
                mean_reward = mean,
                states = agent.q_table().len(),
                "training"
            );
            window = 0.0;
            window_len = 0;
        }
    }

    Ok(TrainingReport {
        episodes,
        mean_reward: if decided > 0 { total / decided as f64 } else { 0.0 },
        stuck,
    })
}

/// Greedy performance of a trained agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    pub episodes: usize,
    /// Share of decided episodes answered correctly.
    pub accuracy: f64,
    pub mean_task_time: f64,
    /// Mean scanpath length of decided episodes.
    pub mean_fixations: f64,
    pub stuck: usize,
}

/// Runs `episodes` greedy episodes with learning off.
///
/// The agent's exploration and learning settings are restored afterwards,
/// also on error.
///
/// # Errors
///
/// Propagates episode errors.
pub fn evaluate(agent: &mut DecisionAgent, episodes: usize) -> Result<Evaluation, DecisionError> {
    let exploration = agent.config().exploration;
    let learning = agent.is_learning();
    agent.set_exploration(Exploration::greedy());
    agent.set_learning(false);

    let result = run_greedy(agent, episodes);

    agent.set_exploration(exploration);
    agent.set_learning(learning);
    result
}

fn run_greedy(agent: &mut DecisionAgent, episodes: usize) -> Result<Evaluation, DecisionError> {
    let (mut correct, mut decided, mut stuck) = (0usize, 0usize, 0usize);
    let (mut time, mut fixations) = (0.0, 0usize);

    for _ in 0..episodes {
        agent.reset()?;
        match agent.run_episode()? {
            EpisodeOutcome::Decided {
                correct: right,
                task_time,
                fixations: f,
                ..
            } => {
                decided += 1;
                correct += usize::from(right);
                time += task_time;
                fixations += f;
            }
            EpisodeOutcome::Stuck { .. } => stuck += 1,
        }
    }

    let n = decided.max(1) as f64;
    Ok(Evaluation {
        episodes,
        accuracy: correct as f64 / n,
        mean_task_time: time / n,
        mean_fixations: fixations as f64 / n,
        stuck,
    })
}

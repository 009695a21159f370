//! Reinforcement-learning decision agent.
//!
//! The agent learns which element to look at next and when to accept or
//! reject, with tabular Q-learning over a discretised perceptual state.
//! Its environment is the layout model plus EMMA timing; it does not use
//! the attention engine.

mod agent;
mod config;
mod policy;
mod state;
mod training;

pub use agent::{randomise_values, DecisionAgent};
pub use config::AgentConfig;
pub use policy::Exploration;
pub use state::{Percept, PerceptualState, QTable};
pub use training::{evaluate, train, EpisodeOutcome, Evaluation, TrainingReport};

use crate::simulation::layout::ElementId;

/// The binary judgement a decision task asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Answer {
    /// Mostly positive values.
    Positive,
    /// Mostly negative values.
    Negative,
}

/// Something the agent can do in one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Look at an element.
    Fixate(ElementId),
    /// Answer "mostly positive" and end the episode.
    Accept,
    /// Answer "mostly negative" and end the episode.
    Reject,
}

impl Action {
    /// The answer given by a terminal action.
    #[must_use]
    pub const fn answer(self) -> Option<Answer> {
        match self {
            Self::Fixate(_) => None,
            Self::Accept => Some(Answer::Positive),
            Self::Reject => Some(Answer::Negative),
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Fixate(_))
    }
}

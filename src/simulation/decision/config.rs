use serde::{Deserialize, Serialize};

use crate::simulation::decision::Exploration;
use crate::simulation::error::ConfigError;
use crate::simulation::params::{
    CORRECT_REWARD, DISCOUNT, INCORRECT_REWARD, LEARNING_RATE, MAX_EPISODE_STEPS,
    NEGATIVE_COLOR, POSITIVE_COLOR, TIME_COST,
};

/// Hyperparameters and task settings of the decision agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Learning rate.
    pub alpha: f64,
    /// Discount of future value.
    pub gamma: f64,
    pub exploration: Exploration,
    pub correct_reward: f64,
    pub incorrect_reward: f64,
    /// Reward lost per second of task time.
    pub time_cost: f64,
    /// Extra seconds charged for every fixation.
    pub encoding_penalty: f64,
    /// Whether elements are colored by their value (peripheral cue).
    pub colours: bool,
    pub positive_color: String,
    pub negative_color: String,
    /// Steps after which an episode counts as stuck.
    pub max_steps: usize,
    /// Seed for the agent's RNG; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            alpha: LEARNING_RATE,
            gamma: DISCOUNT,
            exploration: Exploration::default(),
            correct_reward: CORRECT_REWARD,
            incorrect_reward: INCORRECT_REWARD,
            time_cost: TIME_COST,
            encoding_penalty: 0.0,
            colours: true,
            positive_color: POSITIVE_COLOR.to_string(),
            negative_color: NEGATIVE_COLOR.to_string(),
            max_steps: MAX_EPISODE_STEPS,
            seed: None,
        }
    }
}

impl AgentConfig {
    /// Validate the configuration parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(ConfigError::Invalid(format!("alpha {} not in [0, 1]", self.alpha)));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(ConfigError::Invalid(format!("gamma {} not in [0, 1]", self.gamma)));
        }
        if !self.exploration.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "invalid exploration {:?}",
                self.exploration
            )));
        }
        if self.max_steps == 0 {
            return Err(ConfigError::Invalid("max_steps must be positive".into()));
        }
        if self.time_cost < 0.0 || self.encoding_penalty < 0.0 {
            return Err(ConfigError::Invalid(
                "time_cost and encoding_penalty must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

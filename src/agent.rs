pub mod crossover;
pub mod random;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};

use crate::{
    error::GymResult,
    gym::trading::{action::Action, observation::Observation},
};

/// Represents the unique identifier of an agent, used for tracking results in
/// leaderboards and logs. The `String` can represent custom agent names or
/// parameterized types (e.g., "SmaCrossover(20,50)").
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    Default,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentIdentifier {
    /// A custom user-defined agent.
    #[strum(to_string = "{0}")]
    Named(Arc<String>),

    #[default]
    Random,
}

/// The episode-driver seam: anything that can map observations to actions
/// can drive a trading environment. The environment is agnostic to how
/// actions are chosen; an RL trainer, a rule, or a random policy all fit.
pub trait Agent {
    /// Decide on an action based on the current observation.
    fn act(&mut self, obs: &Observation) -> GymResult<Action>;

    /// Optional agent name for logging/reporting.
    fn identifier(&self) -> AgentIdentifier {
        AgentIdentifier::Named(Arc::new(
            "UnnamedAgent: override Agent::identifier()".to_string(),
        ))
    }

    /// Reset internal state at the end of an episode. Default is no-op.
    fn reset(&mut self) {}
}

impl Agent for Box<dyn Agent> {
    fn act(&mut self, obs: &Observation) -> GymResult<Action> {
        (**self).act(obs)
    }

    fn identifier(&self) -> AgentIdentifier {
        (**self).identifier()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

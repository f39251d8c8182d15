use rand::{SeedableRng, rngs::StdRng};

use crate::{
    agent::{Agent, AgentIdentifier},
    error::GymResult,
    gym::trading::{action::Action, action_space::ActionSpace, observation::Observation},
};

/// Uniformly random policy over the action space. Seeded, so evaluation runs
/// are reproducible; useful as a baseline and in tests.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    seed: u64,
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn act(&mut self, _obs: &Observation) -> GymResult<Action> {
        Ok(ActionSpace::sample(&mut self.rng))
    }

    fn identifier(&self) -> AgentIdentifier {
        AgentIdentifier::Random
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }
}

use crate::{
    error::GymResult,
    gym::{
        Reward, StepOutcome,
        trading::{
            action::Action,
            env::StepInfo,
            observation::Observation,
        },
    },
};

pub mod action;
pub mod action_space;
pub mod config;
pub mod env;
pub mod ledger;
pub mod observation;

/// The environment capability exposed to an episode driver (e.g. an RL
/// trainer). Any host loop that can call `reset`/`step` can drive a
/// [`env::TradingEnv`] without depending on a specific framework base type.
pub trait Env {
    /// Reinitializes the episode and returns the observation for step 0.
    /// Idempotent: two consecutive calls produce identical state.
    fn reset(&mut self) -> GymResult<Observation>;

    /// Executes one action at the cursor's close price and advances time.
    fn step(&mut self, action: Action)
    -> GymResult<(Observation, Reward, StepOutcome, StepInfo)>;
}

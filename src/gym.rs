use serde::{Deserialize, Serialize};

use crate::{impl_add_sub_mul_div_primitive, impl_from_primitive};

pub mod trading;

/// Represents a step reward as the fractional change in portfolio valuation.
///
/// A value of `0.095` means the mark-to-market account value grew by 9.5%
/// relative to the previous step's valuation. Rewards are dimensionless and
/// comparable across episodes regardless of the configured initial capital.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Reward(pub f64);
impl_from_primitive!(Reward, f64);
impl_add_sub_mul_div_primitive!(Reward, f64);

/// Represents the lifecycle status of the trading environment.
///
/// The environment follows a finite state machine (FSM) with the following valid
/// transitions. Stepping a `Done` environment returns an error.
///
/// ```md
/// Current State              | Action  | Next State | Notes
/// ---------------------------|---------|------------|---------------------------------
/// `Ready`                    | step()  | Running    | First step of the episode
/// `Running` (cursor < n-1)   | step()  | Running    | Continue within episode
/// `Running` (cursor == n-1)  | step()  | Done       | Episode terminates, data exhausted
/// `Ready` / `Running` / `Done` | reset() | Ready    | Restart at the first row
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvStatus {
    /// Post-reset, before any step has been taken.
    Ready,

    /// An episode is active and the environment accepts `step()` calls.
    Running,

    /// The episode has reached the end of the market series.
    ///
    /// A call to `reset()` is required before stepping again.
    Done,
}

impl EnvStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Outcome of a single `step()` call, returned alongside the reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    InProgress,
    /// The advanced cursor reached the last row of the series.
    Done,
}

impl StepOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress)
    }
}

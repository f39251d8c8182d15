use rand::Rng;
use strum::{EnumCount, IntoEnumIterator};

use crate::gym::trading::{action::Action, observation::Observation};

/// The discrete action space: three actions, no masking.
///
/// Invalid combinations (e.g. `Buy` while Long) are not masked out; they are
/// documented no-ops at the ledger, so an agent sampling uniformly stays
/// well-defined on every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionSpace;

impl ActionSpace {
    pub const N: usize = Action::COUNT;

    pub fn iter() -> impl Iterator<Item = Action> {
        Action::iter()
    }

    /// Samples a uniformly random action.
    pub fn sample<R: Rng>(rng: &mut R) -> Action {
        let idx = rng.random_range(0..Self::N);
        Action::iter().nth(idx).unwrap_or(Action::Hold)
    }
}

/// The fixed-length real vector space of observations, one component per
/// feature column of the market series. Stable across `reset` calls and
/// across episodes sharing the same series schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationSpace {
    len: usize,
}

impl ObservationSpace {
    pub fn new(len: usize) -> Self {
        Self { len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, obs: &Observation) -> bool {
        obs.len() == self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn sample_covers_all_actions() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            seen.insert(ActionSpace::sample(&mut rng));
        }
        assert_eq!(seen.len(), ActionSpace::N);
    }
}

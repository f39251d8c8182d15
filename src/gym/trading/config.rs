// ================================================================================================
// Environment Configuration
// ================================================================================================

use serde::{Deserialize, Serialize};

use crate::{
    error::{EnvError, GymResult},
    impl_from_primitive,
};

/// Fraction of current capital committed when opening a new position.
///
/// Applied to capital at the moment of opening, not continuously. Must lie
/// in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RiskFraction(pub f64);
impl_from_primitive!(RiskFraction, f64);

impl Default for RiskFraction {
    fn default() -> Self {
        Self(0.95)
    }
}

/// Static configuration of a [`crate::gym::trading::env::TradingEnv`].
///
/// Validated once at environment construction; an invalid configuration is a
/// fatal error, never a silently clamped value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Realized cash the ledger starts each episode with.
    pub initial_capital: f64,

    /// Sizing rule for newly opened positions.
    pub risk_fraction: RiskFraction,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            risk_fraction: RiskFraction::default(),
        }
    }
}

impl EnvConfig {
    pub fn with_initial_capital(self, initial_capital: f64) -> Self {
        Self {
            initial_capital,
            ..self
        }
    }

    pub fn with_risk_fraction(self, risk_fraction: RiskFraction) -> Self {
        Self {
            risk_fraction,
            ..self
        }
    }

    pub fn validate(&self) -> GymResult<()> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(EnvError::InvalidConfig(format!(
                "initial_capital must be positive and finite, got {}",
                self.initial_capital
            ))
            .into());
        }
        let rf = self.risk_fraction.0;
        if !rf.is_finite() || rf <= 0.0 || rf > 1.0 {
            return Err(EnvError::InvalidConfig(format!(
                "risk_fraction must lie in (0, 1], got {rf}"
            ))
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EnvConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_capital() {
        let cfg = EnvConfig::default().with_initial_capital(0.0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_risk_fraction() {
        for rf in [0.0, -0.5, 1.5, f64::NAN] {
            let cfg = EnvConfig::default().with_risk_fraction(RiskFraction(rf));
            assert!(cfg.validate().is_err(), "risk_fraction {rf} should fail");
        }
    }
}

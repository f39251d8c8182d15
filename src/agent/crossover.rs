use std::sync::Arc;

use serde::Serialize;

use crate::{
    agent::{Agent, AgentIdentifier},
    error::{AgentError, GymResult},
    gym::trading::{action::Action, observation::Observation},
    math::indicator::{StreamingIndicator, StreamingSma},
};

/// SMA crossover policy on one observation field.
///
/// Buys while the fast average is above the slow one (golden cross), sells
/// while it is below (death cross), holds until both averages are warm.
/// Repeated signals in the same direction are harmless: re-entries are
/// no-ops at the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct SmaCrossover {
    close_field: String,
    fast_period: u16,
    slow_period: u16,
    #[serde(skip)]
    fast_sma: StreamingSma,
    #[serde(skip)]
    slow_sma: StreamingSma,
}

impl SmaCrossover {
    pub fn new(close_field: &str, fast_period: u16, slow_period: u16) -> Self {
        Self {
            close_field: close_field.to_string(),
            fast_sma: StreamingSma::new(fast_period),
            slow_sma: StreamingSma::new(slow_period),
            fast_period,
            slow_period,
        }
    }
}

impl Agent for SmaCrossover {
    fn act(&mut self, obs: &Observation) -> GymResult<Action> {
        let close = obs.field(&self.close_field).ok_or_else(|| {
            AgentError::MissingObservationField(self.close_field.clone())
        })?;

        let fast = self.fast_sma.update(close);
        let slow = self.slow_sma.update(close);

        match (fast, slow) {
            (Some(fast), Some(slow)) if fast > slow => Ok(Action::Buy),
            (Some(fast), Some(slow)) if fast < slow => Ok(Action::Sell),
            _ => Ok(Action::Hold),
        }
    }

    fn identifier(&self) -> AgentIdentifier {
        AgentIdentifier::Named(Arc::new(format!(
            "SmaCrossover({},{})",
            self.fast_period, self.slow_period
        )))
    }

    fn reset(&mut self) {
        self.fast_sma.reset();
        self.slow_sma.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{config::SeriesSchema, series::MarketSeries};
    use chrono::{TimeZone, Utc};

    fn observations(closes: &[f64]) -> Vec<Observation> {
        let timestamps = (0..closes.len())
            .map(|i| Utc.with_ymd_and_hms(2024, 1, 1 + i as u32, 0, 0, 0).unwrap())
            .collect();
        let series = MarketSeries::from_columns(
            timestamps,
            vec![("gold_Close".to_string(), closes.to_vec())],
            &SeriesSchema::default(),
        )
        .unwrap();
        (0..closes.len())
            .map(|row| Observation::from_series(&series, row).unwrap())
            .collect()
    }

    #[test]
    fn holds_until_warm_then_buys_into_an_uptrend() {
        let mut agent = SmaCrossover::new("gold_Close", 2, 3);
        let obs = observations(&[100.0, 101.0, 103.0, 106.0]);

        assert_eq!(agent.act(&obs[0]).unwrap(), Action::Hold);
        assert_eq!(agent.act(&obs[1]).unwrap(), Action::Hold);
        // Both SMAs warm; rising prices put the fast average on top.
        assert_eq!(agent.act(&obs[2]).unwrap(), Action::Buy);
        assert_eq!(agent.act(&obs[3]).unwrap(), Action::Buy);
    }

    #[test]
    fn sells_into_a_downtrend() {
        let mut agent = SmaCrossover::new("gold_Close", 2, 3);
        let obs = observations(&[106.0, 104.0, 101.0, 97.0]);

        agent.act(&obs[0]).unwrap();
        agent.act(&obs[1]).unwrap();
        assert_eq!(agent.act(&obs[2]).unwrap(), Action::Sell);
        assert_eq!(agent.act(&obs[3]).unwrap(), Action::Sell);
    }

    #[test]
    fn missing_field_is_an_agent_error() {
        let mut agent = SmaCrossover::new("no_such_column", 2, 3);
        let obs = observations(&[100.0, 101.0]);
        assert!(agent.act(&obs[0]).is_err());
    }
}

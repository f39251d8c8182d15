use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
    data::domain::{Price, Quantity},
    error::{EnvError, GymResult},
    gym::{
        Reward,
        trading::{
            action::Action,
            config::{EnvConfig, RiskFraction},
        },
    },
};

/// Direction of an open position.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum TradeType {
    Long,
    Short,
}

/// Direction summary of the ledger, suitable for step info and reporting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum PositionKind {
    Flat,
    Long,
    Short,
}

/// Current directional exposure of the account.
///
/// `entry_price` and `size` only exist while a position is open; `size` is
/// always positive, the direction lives in `trade_type`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Position {
    Flat,
    Open {
        trade_type: TradeType,
        entry_price: Price,
        size: Quantity,
    },
}

impl Position {
    pub fn is_flat(&self) -> bool {
        matches!(self, Self::Flat)
    }

    pub fn direction(&self) -> Option<TradeType> {
        match self {
            Self::Flat => None,
            Self::Open { trade_type, .. } => Some(*trade_type),
        }
    }

    pub fn kind(&self) -> PositionKind {
        match self {
            Self::Flat => PositionKind::Flat,
            Self::Open {
                trade_type: TradeType::Long,
                ..
            } => PositionKind::Long,
            Self::Open {
                trade_type: TradeType::Short,
                ..
            } => PositionKind::Short,
        }
    }
}

/// The authoritative account record for one episode.
///
/// Tracks realized capital, the open position, and the append-only valuation
/// history (seeded with the initial capital, one entry per completed step).
/// The last valuation is mirrored in an explicit `previous_value` field so
/// reward computation never indexes from the end of an unbounded list.
///
/// No fees, slippage, or financing cost are modeled; all profit and loss is
/// linear in position size.
#[derive(Debug, Clone)]
pub struct Ledger {
    initial_capital: f64,
    risk_fraction: RiskFraction,
    capital: f64,
    position: Position,
    valuations: Vec<f64>,
    previous_value: f64,
}

impl Ledger {
    pub fn new(cfg: &EnvConfig) -> Self {
        Self {
            initial_capital: cfg.initial_capital,
            risk_fraction: cfg.risk_fraction,
            capital: cfg.initial_capital,
            position: Position::Flat,
            valuations: vec![cfg.initial_capital],
            previous_value: cfg.initial_capital,
        }
    }

    /// Restores the ledger to its episode-start state: flat, initial capital,
    /// single-element valuation history.
    pub fn reset(&mut self) {
        self.capital = self.initial_capital;
        self.position = Position::Flat;
        self.valuations.clear();
        self.valuations.push(self.initial_capital);
        self.previous_value = self.initial_capital;
    }

    /// Applies one action at `price` under the closes-before-opens policy.
    pub fn apply(&mut self, action: Action, price: Price) {
        match action {
            Action::Hold => {}
            Action::Buy => self.rotate(TradeType::Long, price),
            Action::Sell => self.rotate(TradeType::Short, price),
        }
    }

    /// Opens a new position sized as `(capital * risk_fraction) / price`.
    ///
    /// No-op while any position is held: same-direction re-entry is excluded
    /// by the action policy, and a direction change must be preceded by
    /// [`Ledger::close`]. This mirrors the environment's action policy; it is
    /// not a ledger-internal guard.
    pub fn open(&mut self, trade_type: TradeType, price: Price) {
        if !self.position.is_flat() {
            tracing::debug!(?trade_type, "Open ignored: position already held");
            return;
        }
        let size = Quantity((self.capital * self.risk_fraction.0) / price.0);
        self.position = Position::Open {
            trade_type,
            entry_price: price,
            size,
        };
        tracing::debug!(?trade_type, price = price.0, size = size.0, "Position opened");
    }

    /// Closes the open position at `price`, realizing its profit and loss
    /// into capital. Returns the realized amount; zero if already flat.
    pub fn close(&mut self, price: Price) -> f64 {
        let realized = self.unrealized(price);
        if let Position::Open { trade_type, .. } = self.position {
            self.capital += realized;
            self.position = Position::Flat;
            tracing::debug!(?trade_type, price = price.0, realized, "Position closed");
        }
        realized
    }

    /// Paper profit and loss of the open position at `price`; zero when flat.
    pub fn unrealized(&self, price: Price) -> f64 {
        match self.position {
            Position::Flat => 0.0,
            Position::Open {
                trade_type: TradeType::Long,
                entry_price,
                size,
            } => (price.0 - entry_price.0) * size.0,
            Position::Open {
                trade_type: TradeType::Short,
                entry_price,
                size,
            } => (entry_price.0 - price.0) * size.0,
        }
    }

    /// Account valuation at `price` without closing anything.
    pub fn mark_to_market(&self, price: Price) -> f64 {
        self.capital + self.unrealized(price)
    }

    /// Marks the account to `price`, appends the valuation to the history and
    /// returns `(current_value, reward)` where the reward is the fractional
    /// change versus the previous valuation.
    ///
    /// Fails with [`EnvError::DegenerateValuation`] if the previous valuation
    /// is non-positive: the fractional return is undefined there, and
    /// propagating the division artifact would silently corrupt training.
    pub fn record_valuation(&mut self, price: Price) -> GymResult<(f64, Reward)> {
        if self.previous_value <= 0.0 {
            return Err(EnvError::DegenerateValuation {
                value: self.previous_value,
            }
            .into());
        }

        let current_value = self.mark_to_market(price);
        self.valuations.push(current_value);
        let reward = Reward((current_value - self.previous_value) / self.previous_value);
        self.previous_value = current_value;

        Ok((current_value, reward))
    }

    pub fn capital(&self) -> f64 {
        self.capital
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Mark-to-market valuations, one per completed step, seeded with the
    /// initial capital. Append-only, never retroactively mutated.
    pub fn valuations(&self) -> &[f64] {
        &self.valuations
    }

    /// Profit and loss of the episode so far, marked at the last valuation.
    pub fn pnl(&self) -> f64 {
        self.previous_value - self.initial_capital
    }

    fn rotate(&mut self, target: TradeType, price: Price) {
        match self.position.direction() {
            Some(current) if current == target => {
                // Documented no-op: no re-entry, no resize.
                tracing::debug!(?target, "Already positioned in this direction, no-op");
            }
            Some(_) => {
                self.close(price);
                self.open(target, price);
            }
            None => self.open(target, price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> Ledger {
        Ledger::new(&EnvConfig::default())
    }

    #[test]
    fn open_sizes_position_from_risk_fraction() {
        let mut ledger = ledger();
        ledger.open(TradeType::Long, Price(100.0));

        let Position::Open {
            trade_type,
            entry_price,
            size,
        } = ledger.position()
        else {
            panic!("expected open position");
        };
        assert_eq!(trade_type, TradeType::Long);
        assert_eq!(entry_price, Price(100.0));
        // 100_000 * 0.95 / 100
        assert_eq!(size, Quantity(950.0));
    }

    #[test]
    fn close_realizes_long_pnl_into_capital() {
        let mut ledger = ledger();
        ledger.open(TradeType::Long, Price(100.0));
        let realized = ledger.close(Price(110.0));

        assert_eq!(realized, 9_500.0);
        assert_eq!(ledger.capital(), 109_500.0);
        assert!(ledger.position().is_flat());
    }

    #[test]
    fn close_realizes_short_pnl_with_inverted_sign() {
        let mut ledger = ledger();
        ledger.open(TradeType::Short, Price(100.0));
        let realized = ledger.close(Price(90.0));

        assert_eq!(realized, 9_500.0);
        assert_eq!(ledger.capital(), 109_500.0);
    }

    #[test]
    fn close_while_flat_is_a_zero_profit_noop() {
        let mut ledger = ledger();
        assert_eq!(ledger.close(Price(123.0)), 0.0);
        assert_eq!(ledger.capital(), 100_000.0);
    }

    #[test]
    fn unrealized_is_zero_when_flat_and_does_not_mutate() {
        let mut ledger = ledger();
        assert_eq!(ledger.unrealized(Price(50.0)), 0.0);

        ledger.open(TradeType::Long, Price(100.0));
        let before = ledger.capital();
        assert_eq!(ledger.unrealized(Price(105.0)), 950.0 * 5.0);
        assert_eq!(ledger.capital(), before);
    }

    #[test]
    fn same_direction_open_does_not_reenter_or_resize() {
        let mut ledger = ledger();
        ledger.apply(Action::Buy, Price(100.0));
        let first = ledger.position();

        // Boundary: Buy while already Long must not change entry_price or size.
        ledger.apply(Action::Buy, Price(150.0));
        assert_eq!(ledger.position(), first);
    }

    #[test]
    fn reversal_closes_then_opens_at_the_same_price() {
        let mut ledger = ledger();
        ledger.apply(Action::Buy, Price(100.0));
        let capital_before = ledger.capital();

        ledger.apply(Action::Sell, Price(105.0));

        // close() followed by open() in the opposite direction: capital grows
        // by the realized pnl and the new entry price is the shared price.
        let realized = 950.0 * 5.0;
        assert_eq!(ledger.capital(), capital_before + realized);
        let Position::Open {
            trade_type,
            entry_price,
            size,
        } = ledger.position()
        else {
            panic!("expected short position");
        };
        assert_eq!(trade_type, TradeType::Short);
        assert_eq!(entry_price, Price(105.0));
        assert!((size.0 - 104_750.0 * 0.95 / 105.0).abs() < 1e-9);
    }

    #[test]
    fn hold_never_touches_the_ledger() {
        let mut ledger = ledger();
        ledger.apply(Action::Buy, Price(100.0));
        let snapshot = ledger.position();
        let capital = ledger.capital();

        ledger.apply(Action::Hold, Price(500.0));
        assert_eq!(ledger.position(), snapshot);
        assert_eq!(ledger.capital(), capital);
    }

    #[test]
    fn record_valuation_appends_and_rewards_fractional_change() {
        let mut ledger = ledger();
        ledger.apply(Action::Buy, Price(100.0));

        let (value, reward) = ledger.record_valuation(Price(100.0)).unwrap();
        assert_eq!(value, 100_000.0);
        assert_eq!(reward, Reward(0.0));

        let (value, reward) = ledger.record_valuation(Price(110.0)).unwrap();
        assert_eq!(value, 109_500.0);
        assert_eq!(reward, Reward(0.095));

        assert_eq!(ledger.valuations(), &[100_000.0, 100_000.0, 109_500.0]);
    }

    #[test]
    fn reward_sign_tracks_valuation_change() {
        let mut ledger = ledger();
        ledger.apply(Action::Buy, Price(100.0));
        ledger.record_valuation(Price(100.0)).unwrap();

        let (_, up) = ledger.record_valuation(Price(101.0)).unwrap();
        assert!(up > Reward(0.0));
        let (_, flat) = ledger.record_valuation(Price(101.0)).unwrap();
        assert_eq!(flat, Reward(0.0));
        let (_, down) = ledger.record_valuation(Price(100.0)).unwrap();
        assert!(down < Reward(0.0));
    }

    #[test]
    fn non_positive_previous_valuation_is_an_explicit_error() {
        let cfg = EnvConfig::default().with_initial_capital(1_000.0);
        let mut ledger = Ledger::new(&cfg);
        ledger.open(TradeType::Short, Price(100.0));

        // Price triples against the short; the account is wiped out.
        let (value, _) = ledger.record_valuation(Price(300.0)).unwrap();
        assert!(value < 0.0);

        let err = ledger.record_valuation(Price(300.0)).unwrap_err();
        assert!(err.to_string().contains("Degenerate valuation"));
    }

    #[test]
    fn reset_restores_episode_start_state() {
        let mut ledger = ledger();
        ledger.apply(Action::Buy, Price(100.0));
        ledger.record_valuation(Price(110.0)).unwrap();

        ledger.reset();
        assert!(ledger.position().is_flat());
        assert_eq!(ledger.capital(), 100_000.0);
        assert_eq!(ledger.valuations(), &[100_000.0]);
        assert_eq!(ledger.pnl(), 0.0);
    }
}

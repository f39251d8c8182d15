use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString};

/// The discrete action space of the single-asset environment.
///
/// Actions follow the **closes-before-opens** policy: reversing direction
/// first closes the open position at the current close price (realizing its
/// profit and loss), then opens the new position sized from the updated
/// capital. Re-issuing the direction of an already-open position is a
/// documented no-op; it never re-enters or resizes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    /// Leave the ledger untouched.
    Hold,
    /// Go long: Flat opens a long, Short closes then opens a long,
    /// Long is a no-op.
    Buy,
    /// Go short: Flat opens a short, Long closes then opens a short,
    /// Short is a no-op.
    Sell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_lowercase_names() {
        assert_eq!(Action::from_str("buy").unwrap(), Action::Buy);
        assert_eq!(Action::from_str("hold").unwrap(), Action::Hold);
        assert_eq!(Action::from_str("sell").unwrap(), Action::Sell);
    }

    #[test]
    fn action_space_has_three_variants() {
        assert_eq!(Action::iter().count(), 3);
    }
}

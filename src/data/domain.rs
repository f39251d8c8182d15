// ================================================================================================
// Domain Strong Types (NewTypes)
// ================================================================================================

use serde::{Deserialize, Serialize};

use crate::{impl_add_sub_mul_div_primitive, impl_from_primitive};

/// A price denominated in the quote currency of the primary instrument.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Price(pub f64);
impl_from_primitive!(Price, f64);
impl_add_sub_mul_div_primitive!(Price, f64);

/// A position size in units of the primary instrument. Always positive for open positions;
/// the direction is carried by the position variant, not the sign.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Quantity(pub f64);
impl_from_primitive!(Quantity, f64);
impl_add_sub_mul_div_primitive!(Quantity, f64);

//! Discount types for the OpenSettle discount engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{LevelRequirement, SettleError};

/// A level-gated fractional discount on the bid amount.
///
/// Discounts accumulate per listing (append-only); the engine applies the
/// eligible one with the greatest fraction, first-registered winning ties.
/// The discount reduces what the bidder pays, not the value compared
/// against the ask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// The tier the bidder must hold for this discount to apply.
    pub level: LevelRequirement,
    /// Fraction of the bid amount taken off, in `[0, 1)`.
    pub fraction: Decimal,
}

impl Discount {
    /// Structural validation.
    ///
    /// # Errors
    /// Returns `InvalidDiscount` unless the fraction lies in `[0, 1)`.
    pub fn validate(&self) -> crate::Result<()> {
        if self.fraction < Decimal::ZERO || self.fraction >= Decimal::ONE {
            return Err(SettleError::InvalidDiscount {
                reason: format!("fraction {} outside [0, 1)", self.fraction),
            });
        }
        Ok(())
    }

    /// The amount taken off a bid of `amount`: `floor(amount × fraction)`.
    #[must_use]
    pub fn amount_off(&self, amount: Decimal) -> Decimal {
        (amount * self.fraction).floor()
    }
}

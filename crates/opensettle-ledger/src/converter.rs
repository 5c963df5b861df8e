//! Currency conversion into the common settlement unit.
//!
//! Ask/bid comparisons only ever happen in the common unit; raw currency
//! amounts are never compared against an ask.

use std::collections::HashMap;

use opensettle_types::{AssetId, Result, SettleError};
use rust_decimal::Decimal;

/// The external conversion oracle.
///
/// Implementations MUST be non-reentrant (see `TokenLedger`). A missing
/// rate is an ordinary rejection for the caller, never a fatal condition.
pub trait ValueConverter {
    /// Value of `amount` of `currency` in the common settlement unit.
    ///
    /// # Errors
    /// `NoValueMapping` if the currency has no known rate.
    fn convert(&self, currency: AssetId, amount: Decimal) -> Result<Decimal>;
}

/// In-memory oracle with fixed per-currency rates.
#[derive(Debug, Default)]
pub struct FixedRateConverter {
    /// Common-unit value of one unit of each currency.
    rates: HashMap<AssetId, Decimal>,
}

impl FixedRateConverter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the common-unit value of one unit of `currency`.
    pub fn set_rate(&mut self, currency: AssetId, rate: Decimal) {
        self.rates.insert(currency, rate);
    }
}

impl ValueConverter for FixedRateConverter {
    fn convert(&self, currency: AssetId, amount: Decimal) -> Result<Decimal> {
        let rate = self
            .rates
            .get(&currency)
            .ok_or(SettleError::NoValueMapping(currency))?;
        Ok(amount * rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEMS: AssetId = AssetId(7);

    #[test]
    fn convert_applies_rate() {
        let mut oracle = FixedRateConverter::new();
        oracle.set_rate(GEMS, Decimal::new(100, 0));
        let value = oracle.convert(GEMS, Decimal::new(130_000_000, 0)).unwrap();
        assert_eq!(value, Decimal::new(13_000_000_000, 0));
    }

    #[test]
    fn unmapped_currency_fails() {
        let oracle = FixedRateConverter::new();
        let err = oracle.convert(GEMS, Decimal::ONE).unwrap_err();
        assert!(matches!(err, SettleError::NoValueMapping(c) if c == GEMS));
    }

    #[test]
    fn zero_rate_converts_to_zero() {
        let mut oracle = FixedRateConverter::new();
        oracle.set_rate(GEMS, Decimal::ZERO);
        assert_eq!(oracle.convert(GEMS, Decimal::new(500, 0)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn fractional_rate() {
        let mut oracle = FixedRateConverter::new();
        oracle.set_rate(GEMS, Decimal::new(5, 1)); // 0.5
        assert_eq!(
            oracle.convert(GEMS, Decimal::new(200, 0)).unwrap(),
            Decimal::new(100, 0)
        );
    }
}

//! Item lot types for the OpenSettle item vault.
//!
//! An [`ItemLot`] is the merchant-supplied escrow of sellable units: an
//! ordered list of (token, per-unit amount) entries and a count of
//! remaining units. Each finalization releases one unit's worth of every
//! entry to the winning bidder.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ActorId, AssetId, SettleError, constants};

/// One (token, per-unit amount) line of an item lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotEntry {
    /// The item token.
    pub token: AssetId,
    /// Amount of `token` delivered per sold unit.
    pub amount: Decimal,
}

/// The escrowed inventory behind a listing.
///
/// Locking pulls `amount × quantity` of every entry from the merchant into
/// escrow; each finalization releases a multiplier of 1 and decrements
/// `quantity`. At quantity 0 the listing is exhausted and gets signalled
/// for burn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLot {
    /// The merchant who supplied (and is refunded) this lot.
    pub merchant: ActorId,
    /// Ordered (token, per-unit amount) entries.
    pub entries: Vec<LotEntry>,
    /// Remaining sellable units.
    pub quantity: u64,
}

impl ItemLot {
    /// Structural validation, checked before any transfer is attempted.
    ///
    /// # Errors
    /// Returns `InvalidLot` for a null merchant, an empty or oversized
    /// entry list, a non-positive entry amount, or a zero quantity (a lot
    /// that can never sell would wedge the listing).
    pub fn validate(&self) -> crate::Result<()> {
        if self.merchant.is_null() {
            return Err(SettleError::InvalidLot {
                reason: "merchant is the null actor".into(),
            });
        }
        if self.entries.is_empty() {
            return Err(SettleError::InvalidLot {
                reason: "lot has no entries".into(),
            });
        }
        if self.entries.len() > constants::MAX_LOT_ENTRIES {
            return Err(SettleError::InvalidLot {
                reason: format!(
                    "lot has {} entries, max {}",
                    self.entries.len(),
                    constants::MAX_LOT_ENTRIES
                ),
            });
        }
        if let Some(entry) = self.entries.iter().find(|e| e.amount <= Decimal::ZERO) {
            return Err(SettleError::InvalidLot {
                reason: format!("non-positive amount for {}", entry.token),
            });
        }
        if self.quantity == 0 {
            return Err(SettleError::InvalidLot {
                reason: "quantity is zero".into(),
            });
        }
        Ok(())
    }

    /// Returns `true` once every unit has been sold.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.quantity == 0
    }
}

/// Outcome of releasing one unit from a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotStatus {
    /// Units remain sellable.
    Remaining(u64),
    /// The last unit was just released; the listing should be burned.
    Exhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_lot() -> ItemLot {
        ItemLot {
            merchant: ActorId([1u8; 32]),
            entries: vec![LotEntry {
                token: AssetId(10),
                amount: Decimal::new(1000, 0),
            }],
            quantity: 10,
        }
    }

    #[test]
    fn valid_lot_passes() {
        assert!(make_lot().validate().is_ok());
    }

    #[test]
    fn null_merchant_rejected() {
        let mut lot = make_lot();
        lot.merchant = ActorId::NULL;
        assert!(matches!(
            lot.validate().unwrap_err(),
            SettleError::InvalidLot { .. }
        ));
    }

    #[test]
    fn empty_entries_rejected() {
        let mut lot = make_lot();
        lot.entries.clear();
        assert!(lot.validate().is_err());
    }

    #[test]
    fn zero_entry_amount_rejected() {
        let mut lot = make_lot();
        lot.entries[0].amount = Decimal::ZERO;
        assert!(lot.validate().is_err());
    }

    #[test]
    fn zero_quantity_rejected() {
        let mut lot = make_lot();
        lot.quantity = 0;
        assert!(lot.validate().is_err());
    }

    #[test]
    fn oversized_lot_rejected() {
        let mut lot = make_lot();
        lot.entries = (0..=constants::MAX_LOT_ENTRIES as u64)
            .map(|i| LotEntry {
                token: AssetId(i),
                amount: Decimal::ONE,
            })
            .collect();
        assert!(lot.validate().is_err());
    }

    #[test]
    fn exhaustion_at_zero() {
        let mut lot = make_lot();
        assert!(!lot.is_exhausted());
        lot.quantity = 0;
        assert!(lot.is_exhausted());
    }

    #[test]
    fn lot_serde_roundtrip() {
        let lot = make_lot();
        let json = serde_json::to_string(&lot).unwrap();
        let back: ItemLot = serde_json::from_str(&json).unwrap();
        assert_eq!(lot, back);
    }
}

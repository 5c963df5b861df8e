//! Item vault — lockup and release of merchant-supplied item lots.
//!
//! Every lot operation is all-or-nothing across the lot's (token, amount)
//! entries: a failure on any entry rolls back the entries already moved,
//! so no partial lock or release is ever retained.

use opensettle_ledger::TokenLedger;
use opensettle_types::{
    ActorId, ItemLot, ListingId, LotEntry, LotStatus, Result, SettleError,
};
use rust_decimal::Decimal;

use crate::arena::ListingRecord;

/// Moves item lots in and out of the engine's escrow account.
#[derive(Debug, Clone, Copy)]
pub struct ItemVault {
    /// The ledger account holding escrowed items.
    escrow: ActorId,
}

impl ItemVault {
    #[must_use]
    pub fn new(escrow: ActorId) -> Self {
        Self { escrow }
    }

    /// Lock a new lot for `listing`, refunding any existing lot to its
    /// merchant in full first.
    ///
    /// Returns the refunded merchant when a replacement happened.
    ///
    /// # Errors
    /// `InvalidLot` before any transfer; `TransferFailed` /
    /// `InsufficientBalance` if pulling the new lot fails — in that case
    /// the refunded prior lot is re-locked so the operation fails closed.
    pub fn lock(
        &self,
        ledger: &mut dyn TokenLedger,
        record: &mut ListingRecord,
        listing: ListingId,
        lot: ItemLot,
    ) -> Result<Option<ActorId>> {
        lot.validate()?;

        let replaced = match record.lot.clone() {
            Some(prior) => {
                let merchant = self.refund_all(ledger, record, listing)?;
                Some((prior, merchant))
            }
            None => None,
        };

        let multiplier = Decimal::from(lot.quantity);
        if let Err(err) = self.pull_entries(ledger, lot.merchant, &lot.entries, multiplier) {
            // Fail closed: re-lock the prior lot we just refunded.
            if let Some((prior, merchant)) = replaced {
                let qty = Decimal::from(prior.quantity);
                if self
                    .pull_entries(ledger, merchant, &prior.entries, qty)
                    .is_err()
                {
                    tracing::warn!(
                        %listing, %merchant,
                        "could not re-lock refunded lot after failed replacement"
                    );
                } else {
                    record.lot = Some(prior);
                }
            }
            return Err(err);
        }

        tracing::info!(%listing, merchant = %lot.merchant, quantity = lot.quantity, "lot locked");
        record.lot = Some(lot);
        Ok(replaced.map(|(_, merchant)| merchant))
    }

    /// Release one unit's worth of every entry to `to` and decrement the
    /// remaining quantity. Reports [`LotStatus::Exhausted`] when the last
    /// unit goes out; the lot is dropped from the record at that point.
    ///
    /// # Errors
    /// `NoActiveLot` if nothing is locked; transfer errors roll back any
    /// entries already released.
    pub fn release_one(
        &self,
        ledger: &mut dyn TokenLedger,
        record: &mut ListingRecord,
        listing: ListingId,
        to: ActorId,
    ) -> Result<LotStatus> {
        let lot = record.lot.as_mut().ok_or(SettleError::NoActiveLot)?;

        Self::move_entries(ledger, self.escrow, to, &lot.entries, Decimal::ONE)?;
        lot.quantity -= 1;

        if lot.is_exhausted() {
            record.lot = None;
            tracing::info!(%listing, %to, "last unit released, lot exhausted");
            Ok(LotStatus::Exhausted)
        } else {
            let remaining = lot.quantity;
            tracing::debug!(%listing, %to, remaining, "unit released");
            Ok(LotStatus::Remaining(remaining))
        }
    }

    /// Refund the full remaining lot to its merchant and clear it.
    ///
    /// # Errors
    /// `NoActiveLot` if nothing is locked; transfer errors leave the lot
    /// in place.
    pub fn refund_all(
        &self,
        ledger: &mut dyn TokenLedger,
        record: &mut ListingRecord,
        listing: ListingId,
    ) -> Result<ActorId> {
        let lot = record.lot.take().ok_or(SettleError::NoActiveLot)?;
        let merchant = lot.merchant;
        if let Err(err) = self.push_entries(ledger, merchant, &lot.entries, lot.quantity) {
            record.lot = Some(lot);
            return Err(err);
        }
        tracing::info!(%listing, %merchant, "lot refunded in full");
        Ok(merchant)
    }

    /// Pull `amount × multiplier` of every entry from `from` into escrow.
    fn pull_entries(
        &self,
        ledger: &mut dyn TokenLedger,
        from: ActorId,
        entries: &[LotEntry],
        multiplier: Decimal,
    ) -> Result<()> {
        Self::move_entries(ledger, from, self.escrow, entries, multiplier)
    }

    /// Push `amount × quantity` of every entry from escrow to `to`.
    fn push_entries(
        &self,
        ledger: &mut dyn TokenLedger,
        to: ActorId,
        entries: &[LotEntry],
        quantity: u64,
    ) -> Result<()> {
        Self::move_entries(ledger, self.escrow, to, entries, Decimal::from(quantity))
    }

    /// All-or-nothing entry walk: on a failed transfer, already-moved
    /// entries are sent back before the error propagates.
    fn move_entries(
        ledger: &mut dyn TokenLedger,
        from: ActorId,
        to: ActorId,
        entries: &[LotEntry],
        multiplier: Decimal,
    ) -> Result<()> {
        for (done, entry) in entries.iter().enumerate() {
            if let Err(err) = ledger.transfer(from, to, entry.token, entry.amount * multiplier) {
                for rolled in &entries[..done] {
                    let _ = ledger.transfer(to, from, rolled.token, rolled.amount * multiplier);
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opensettle_ledger::InMemoryLedger;
    use opensettle_types::AssetId;

    const SWORD: AssetId = AssetId(10);
    const SHIELD: AssetId = AssetId(11);
    const LISTING: ListingId = ListingId(1);

    struct Fixture {
        ledger: InMemoryLedger,
        record: ListingRecord,
        vault: ItemVault,
        escrow: ActorId,
        merchant: ActorId,
    }

    fn setup() -> Fixture {
        let escrow = ActorId([0xee; 32]);
        let merchant = ActorId::random();
        let mut ledger = InMemoryLedger::new();
        ledger.mint(merchant, SWORD, Decimal::new(100_000, 0));
        ledger.mint(merchant, SHIELD, Decimal::new(100_000, 0));
        Fixture {
            ledger,
            record: ListingRecord::default(),
            vault: ItemVault::new(escrow),
            escrow,
            merchant,
        }
    }

    fn two_entry_lot(merchant: ActorId, quantity: u64) -> ItemLot {
        ItemLot {
            merchant,
            entries: vec![
                LotEntry {
                    token: SWORD,
                    amount: Decimal::new(1000, 0),
                },
                LotEntry {
                    token: SHIELD,
                    amount: Decimal::new(500, 0),
                },
            ],
            quantity,
        }
    }

    #[test]
    fn lock_pulls_full_multiplier() {
        let mut fx = setup();
        let lot = two_entry_lot(fx.merchant, 10);
        let replaced = fx
            .vault
            .lock(&mut fx.ledger, &mut fx.record, LISTING, lot)
            .unwrap();
        assert!(replaced.is_none());

        // 10 × 1000 SWORD and 10 × 500 SHIELD escrowed.
        assert_eq!(
            fx.ledger.balance_of(fx.escrow, SWORD),
            Decimal::new(10_000, 0)
        );
        assert_eq!(
            fx.ledger.balance_of(fx.escrow, SHIELD),
            Decimal::new(5_000, 0)
        );
        assert_eq!(
            fx.ledger.balance_of(fx.merchant, SWORD),
            Decimal::new(90_000, 0)
        );
        assert!(fx.record.has_inventory());
    }

    #[test]
    fn lock_invalid_lot_moves_nothing() {
        let mut fx = setup();
        let mut lot = two_entry_lot(fx.merchant, 10);
        lot.quantity = 0;
        let err = fx
            .vault
            .lock(&mut fx.ledger, &mut fx.record, LISTING, lot)
            .unwrap_err();
        assert!(matches!(err, SettleError::InvalidLot { .. }));
        assert_eq!(fx.ledger.balance_of(fx.escrow, SWORD), Decimal::ZERO);
    }

    #[test]
    fn lock_rolls_back_partial_pull() {
        let mut fx = setup();
        // Merchant has SWORD but not enough SHIELD for the multiplier.
        let poor = ActorId::random();
        fx.ledger.mint(poor, SWORD, Decimal::new(100_000, 0));
        fx.ledger.mint(poor, SHIELD, Decimal::new(100, 0));

        let lot = two_entry_lot(poor, 10);
        let err = fx
            .vault
            .lock(&mut fx.ledger, &mut fx.record, LISTING, lot)
            .unwrap_err();
        assert!(matches!(err, SettleError::InsufficientBalance { .. }));

        // The SWORD entry that succeeded must have been rolled back.
        assert_eq!(
            fx.ledger.balance_of(poor, SWORD),
            Decimal::new(100_000, 0)
        );
        assert_eq!(fx.ledger.balance_of(fx.escrow, SWORD), Decimal::ZERO);
        assert!(fx.record.lot.is_none());
    }

    #[test]
    fn replacement_refunds_prior_merchant_in_full() {
        let mut fx = setup();
        let other = ActorId::random();
        fx.ledger.mint(other, SWORD, Decimal::new(100_000, 0));
        fx.ledger.mint(other, SHIELD, Decimal::new(100_000, 0));

        fx.vault
            .lock(
                &mut fx.ledger,
                &mut fx.record,
                LISTING,
                two_entry_lot(fx.merchant, 10),
            )
            .unwrap();
        let replaced = fx
            .vault
            .lock(
                &mut fx.ledger,
                &mut fx.record,
                LISTING,
                two_entry_lot(other, 4),
            )
            .unwrap();
        assert_eq!(replaced, Some(fx.merchant));

        // Prior merchant made whole; escrow holds exactly the new lot.
        assert_eq!(
            fx.ledger.balance_of(fx.merchant, SWORD),
            Decimal::new(100_000, 0)
        );
        assert_eq!(
            fx.ledger.balance_of(fx.escrow, SWORD),
            Decimal::new(4_000, 0)
        );
        assert_eq!(
            fx.ledger.balance_of(fx.escrow, SHIELD),
            Decimal::new(2_000, 0)
        );
        assert_eq!(fx.record.lot.as_ref().unwrap().merchant, other);
    }

    #[test]
    fn failed_replacement_relocks_prior_lot() {
        let mut fx = setup();
        let broke = ActorId::random(); // owns nothing

        fx.vault
            .lock(
                &mut fx.ledger,
                &mut fx.record,
                LISTING,
                two_entry_lot(fx.merchant, 10),
            )
            .unwrap();
        let err = fx
            .vault
            .lock(
                &mut fx.ledger,
                &mut fx.record,
                LISTING,
                two_entry_lot(broke, 2),
            )
            .unwrap_err();
        assert!(matches!(err, SettleError::InsufficientBalance { .. }));

        // Prior lot is back in escrow, record unchanged.
        assert_eq!(
            fx.ledger.balance_of(fx.escrow, SWORD),
            Decimal::new(10_000, 0)
        );
        assert_eq!(fx.record.lot.as_ref().unwrap().merchant, fx.merchant);
        assert_eq!(fx.record.lot.as_ref().unwrap().quantity, 10);
    }

    #[test]
    fn release_one_decrements_and_reports() {
        let mut fx = setup();
        let buyer = ActorId::random();
        fx.vault
            .lock(
                &mut fx.ledger,
                &mut fx.record,
                LISTING,
                two_entry_lot(fx.merchant, 2),
            )
            .unwrap();

        let status = fx
            .vault
            .release_one(&mut fx.ledger, &mut fx.record, LISTING, buyer)
            .unwrap();
        assert_eq!(status, LotStatus::Remaining(1));
        assert_eq!(fx.ledger.balance_of(buyer, SWORD), Decimal::new(1000, 0));
        assert_eq!(fx.ledger.balance_of(buyer, SHIELD), Decimal::new(500, 0));

        let status = fx
            .vault
            .release_one(&mut fx.ledger, &mut fx.record, LISTING, buyer)
            .unwrap();
        assert_eq!(status, LotStatus::Exhausted);
        assert!(fx.record.lot.is_none());
        assert_eq!(fx.ledger.balance_of(fx.escrow, SWORD), Decimal::ZERO);
    }

    #[test]
    fn release_without_lot_fails() {
        let mut fx = setup();
        let err = fx
            .vault
            .release_one(&mut fx.ledger, &mut fx.record, LISTING, ActorId::random())
            .unwrap_err();
        assert!(matches!(err, SettleError::NoActiveLot));
    }

    #[test]
    fn refund_all_returns_remaining_quantity() {
        let mut fx = setup();
        let buyer = ActorId::random();
        fx.vault
            .lock(
                &mut fx.ledger,
                &mut fx.record,
                LISTING,
                two_entry_lot(fx.merchant, 5),
            )
            .unwrap();
        fx.vault
            .release_one(&mut fx.ledger, &mut fx.record, LISTING, buyer)
            .unwrap();

        let merchant = fx
            .vault
            .refund_all(&mut fx.ledger, &mut fx.record, LISTING)
            .unwrap();
        assert_eq!(merchant, fx.merchant);
        // 4 of 5 units refunded (one sold), escrow drained.
        assert_eq!(
            fx.ledger.balance_of(fx.merchant, SWORD),
            Decimal::new(99_000, 0)
        );
        assert_eq!(fx.ledger.balance_of(fx.escrow, SWORD), Decimal::ZERO);
        assert!(fx.record.lot.is_none());
    }
}

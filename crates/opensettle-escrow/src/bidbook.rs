//! Bid book — the per-(listing, bidder) escrow slot state machine.
//!
//! Each slot runs Empty → Active → {Refunded | Finalized} → Empty. A
//! replacing bid fully refunds the prior one before its own deposit is
//! requested; finalization reads and clears the slot before any value
//! moves out.

use opensettle_ledger::{LevelRegistry, TokenLedger, ValueConverter, transfer_reporting};
use opensettle_types::{ActorId, Bid, Discount, ListingId, Result, SettleError};
use rust_decimal::Decimal;

use crate::arena::ListingRecord;

/// Outcome of a successful [`BidBook::place`].
#[derive(Debug, Clone)]
pub struct Placement {
    /// The bid as stored: `amount` is the escrowed (post-discount,
    /// post-fee) balance delta.
    pub stored: Bid,
    /// The prior bid that was refunded to make room, if any.
    pub replaced: Option<Bid>,
    /// `(fraction, amount_off)` when a discount was applied.
    pub discount_applied: Option<(Decimal, Decimal)>,
    /// Common-unit value of the original (pre-discount) bid amount.
    pub spend_value: Decimal,
    /// Whether the ask threshold was met and the caller must finalize.
    pub auto_finalize: bool,
}

/// Escrow operations on a listing's bid slots.
#[derive(Debug, Clone, Copy)]
pub struct BidBook {
    /// The ledger account holding escrowed bid value.
    escrow: ActorId,
}

impl BidBook {
    #[must_use]
    pub fn new(escrow: ActorId) -> Self {
        Self { escrow }
    }

    /// Place a bid for `record`'s listing, funded by `spender`.
    ///
    /// Check order is load-bearing: input validation, inventory,
    /// conversion, level gate, prior-bid refund, discount, deposit. The
    /// refund of a prior bid is a precondition of the new deposit, not a
    /// side effect interleaved with it.
    ///
    /// The auto-finalize signal compares the ask against the converted
    /// value of the ORIGINAL bid amount — the discount is a settlement
    /// mechanic, not a price mechanic.
    ///
    /// `select_discount` runs after the prior-bid refund (the refund can
    /// change the bidder's balances, and with them discount eligibility)
    /// and sees the ledger state the deposit will run against.
    ///
    /// # Errors
    /// `ZeroBidder` / `ZeroRecipient` / `ZeroAmount`, `NoInventory`,
    /// `NoSpendValue`, `LevelNotMet`, or a transfer error. All fail with
    /// prior state restored.
    #[allow(clippy::too_many_arguments)]
    pub fn place<F>(
        &self,
        ledger: &mut dyn TokenLedger,
        converter: &dyn ValueConverter,
        levels: &dyn LevelRegistry,
        record: &mut ListingRecord,
        listing: ListingId,
        bid: Bid,
        spender: ActorId,
        select_discount: F,
    ) -> Result<Placement>
    where
        F: FnOnce(&dyn TokenLedger) -> Option<Discount>,
    {
        if bid.bidder.is_null() {
            return Err(SettleError::ZeroBidder);
        }
        if bid.recipient.is_null() {
            return Err(SettleError::ZeroRecipient);
        }
        if bid.amount <= Decimal::ZERO {
            return Err(SettleError::ZeroAmount);
        }
        if !record.has_inventory() {
            return Err(SettleError::NoInventory);
        }

        // Common-unit value of the pre-discount amount; unmapped and
        // zero-valued currencies are ordinary rejections.
        let spend_value = converter
            .convert(bid.currency, bid.amount)
            .map_err(|_| SettleError::NoSpendValue)?;
        if spend_value <= Decimal::ZERO {
            return Err(SettleError::NoSpendValue);
        }

        if let Some(req) = &record.level_requirement {
            let required = levels.required_balance(req.setter, req.token, &req.label);
            let actual = ledger.balance_of(spender, req.token);
            if actual < required {
                return Err(SettleError::LevelNotMet {
                    label: req.label.clone(),
                    required,
                    actual,
                });
            }
        }

        // Refund any prior bid from this bidder before the new deposit.
        let replaced = match record.bids.remove(&bid.bidder) {
            Some(prior) => {
                if let Err(err) =
                    ledger.transfer(self.escrow, prior.bidder, prior.currency, prior.amount)
                {
                    record.bids.insert(bid.bidder, prior);
                    return Err(err);
                }
                Some(prior)
            }
            None => None,
        };

        let discount_applied =
            select_discount(&*ledger).map(|d| (d.fraction, d.amount_off(bid.amount)));
        let charged = bid.amount - discount_applied.map_or(Decimal::ZERO, |(_, off)| off);

        // Escrow records what actually arrived, not what was requested.
        let received = match transfer_reporting(ledger, spender, self.escrow, bid.currency, charged)
        {
            Ok(received) => received,
            Err(err) => {
                // Restore the prior bid we refunded above.
                if let Some(prior) = replaced {
                    if transfer_reporting(
                        ledger,
                        prior.bidder,
                        self.escrow,
                        prior.currency,
                        prior.amount,
                    )
                    .is_ok()
                    {
                        record.bids.insert(prior.bidder, prior);
                    } else {
                        tracing::warn!(
                            %listing, bidder = %prior.bidder,
                            "could not restore refunded bid after failed deposit"
                        );
                    }
                }
                return Err(err);
            }
        };

        let stored = Bid {
            amount: received,
            ..bid
        };
        record.bids.insert(stored.bidder, stored.clone());

        let auto_finalize = record
            .ask
            .is_some_and(|ask| spend_value >= ask.amount);

        tracing::info!(
            %listing, bidder = %stored.bidder, amount = %stored.amount,
            %spend_value, auto_finalize, "bid placed"
        );
        Ok(Placement {
            stored,
            replaced,
            discount_applied,
            spend_value,
            auto_finalize,
        })
    }

    /// Refund and clear the bidder's active bid. Safe to call after the
    /// listing's lot has been exhausted or burned — the slot outlives the
    /// inventory.
    ///
    /// # Errors
    /// `EmptyBid` if no active bid exists; a transfer error leaves the bid
    /// in place.
    pub fn remove(
        &self,
        ledger: &mut dyn TokenLedger,
        record: &mut ListingRecord,
        listing: ListingId,
        bidder: ActorId,
    ) -> Result<Bid> {
        let bid = record.bids.remove(&bidder).ok_or(SettleError::EmptyBid)?;
        if let Err(err) = ledger.transfer(self.escrow, bid.bidder, bid.currency, bid.amount) {
            record.bids.insert(bidder, bid);
            return Err(err);
        }
        tracing::info!(%listing, %bidder, amount = %bid.amount, "bid refunded");
        Ok(bid)
    }

    /// Take the stored bid for finalization after checking it still has
    /// the terms the acceptor saw: amount, currency, and recipient must
    /// all match exactly.
    ///
    /// # Errors
    /// `EmptyBid` if the slot is empty, `BidMismatch` on any differing
    /// term (the stored bid stays put).
    pub fn accept(&self, record: &mut ListingRecord, expected: &Bid) -> Result<Bid> {
        let stored = record
            .bids
            .get(&expected.bidder)
            .ok_or(SettleError::EmptyBid)?;
        if !stored.matches(expected) {
            return Err(SettleError::BidMismatch);
        }
        self.take(record, expected.bidder)
    }

    /// Read-and-clear the bidder's slot. This is finalize's first step —
    /// the slot must be empty before any value moves, so nothing observing
    /// intermediate state can drain a stale bid.
    ///
    /// # Errors
    /// `EmptyBid` if the slot is empty.
    pub fn take(&self, record: &mut ListingRecord, bidder: ActorId) -> Result<Bid> {
        record.bids.remove(&bidder).ok_or(SettleError::EmptyBid)
    }
}

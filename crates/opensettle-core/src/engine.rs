//! The settlement core — atomic orchestration of bid book, discount
//! engine, and item vault.
//!
//! Every public operation is one indivisible unit of work: it either fully
//! completes or fully fails with prior state untouched (the burn signal
//! after a completed trade is the single documented exception). The
//! `&mut self` receiver makes interleaving of two operations
//! unrepresentable; the collaborators are synchronous and non-reentrant
//! by contract.

use opensettle_escrow::{BidBook, ItemVault, ListingArena, ListingRecord};
use opensettle_ledger::{LevelRegistry, ListingRegistry, TokenLedger, ValueConverter};
use opensettle_types::{
    ActorId, Ask, Bid, Discount, EngineConfig, EventEnvelope, ItemLot, LevelRequirement,
    ListingId, LotStatus, Result, SettleError, SettlementEvent, SettlementId,
};
use rust_decimal::Decimal;

use crate::discount;

/// The OpenSettle settlement core.
///
/// Single-threaded and serialized: callers drive it one operation at a
/// time on behalf of the listing registry, which has already
/// authenticated the acting users. The engine's only trust check is that
/// `origin` is the configured registry actor.
pub struct SettlementEngine {
    config: EngineConfig,
    arena: ListingArena,
    vault: ItemVault,
    book: BidBook,
    ledger: Box<dyn TokenLedger>,
    converter: Box<dyn ValueConverter>,
    levels: Box<dyn LevelRegistry>,
    registry: Box<dyn ListingRegistry>,
    events: Vec<EventEnvelope>,
    event_seq: u64,
}

impl SettlementEngine {
    #[must_use]
    pub fn new(
        config: EngineConfig,
        ledger: Box<dyn TokenLedger>,
        converter: Box<dyn ValueConverter>,
        levels: Box<dyn LevelRegistry>,
        registry: Box<dyn ListingRegistry>,
    ) -> Self {
        let vault = ItemVault::new(config.escrow_account);
        let book = BidBook::new(config.escrow_account);
        Self {
            config,
            arena: ListingArena::new(),
            vault,
            book,
            ledger,
            converter,
            levels,
            registry,
            events: Vec::new(),
            event_seq: 0,
        }
    }

    // =====================================================================
    // Registry-driven operations
    // =====================================================================

    /// Set (or overwrite) the listing's auto-accept threshold, in the
    /// common settlement unit.
    pub fn set_ask(&mut self, origin: ActorId, listing: ListingId, amount: Decimal) -> Result<()> {
        self.ensure_registry(origin)?;
        if amount <= Decimal::ZERO {
            return Err(SettleError::ZeroAmount);
        }
        self.arena.entry(listing).ask = Some(Ask { amount });
        self.emit(SettlementEvent::AskSet { listing, amount });
        Ok(())
    }

    /// Remove the listing's auto-accept threshold. A missing ask is a
    /// no-op.
    pub fn remove_ask(&mut self, origin: ActorId, listing: ListingId) -> Result<()> {
        self.ensure_registry(origin)?;
        let removed = self
            .arena
            .record_mut(listing)
            .is_some_and(|record| record.ask.take().is_some());
        if removed {
            self.emit(SettlementEvent::AskRemoved { listing });
        }
        Ok(())
    }

    /// Lock an item lot for the listing. An existing lot is refunded to
    /// its merchant in full before the new one is pulled.
    pub fn set_items(&mut self, origin: ActorId, listing: ListingId, lot: ItemLot) -> Result<()> {
        self.ensure_registry(origin)?;
        let merchant = lot.merchant;
        let quantity = lot.quantity;
        let record = self.arena.entry(listing);
        let replaced = self
            .vault
            .lock(self.ledger.as_mut(), record, listing, lot)?;
        if let Some(refunded) = replaced {
            self.emit(SettlementEvent::LotRefunded {
                listing,
                merchant: refunded,
            });
        }
        self.emit(SettlementEvent::LotLocked {
            listing,
            merchant,
            quantity,
        });
        Ok(())
    }

    /// Place (or replace) `bid` against the listing, funded by `spender`.
    /// Finalizes immediately when the converted bid value meets the ask.
    pub fn set_bid(
        &mut self,
        origin: ActorId,
        listing: ListingId,
        bid: Bid,
        spender: ActorId,
    ) -> Result<()> {
        self.ensure_registry(origin)?;
        let bidder = bid.bidder;
        let record = self.arena.entry(listing);
        let levels = self.levels.as_ref();
        // Selection runs inside `place`, after any prior-bid refund, so
        // eligibility reflects the refunded balances.
        let discounts = record.discounts.clone();
        let placement = self.book.place(
            self.ledger.as_mut(),
            self.converter.as_ref(),
            levels,
            record,
            listing,
            bid,
            spender,
            |ledger: &dyn TokenLedger| discount::best_discount(&discounts, ledger, levels, bidder),
        )?;

        if let Some(prior) = &placement.replaced {
            self.emit(SettlementEvent::BidRemoved {
                listing,
                bidder,
                currency: prior.currency,
                amount: prior.amount,
            });
        }
        if let Some((fraction, amount_off)) = placement.discount_applied {
            self.emit(SettlementEvent::DiscountApplied {
                listing,
                bidder,
                fraction,
                amount_off,
            });
        }
        self.emit(SettlementEvent::BidPlaced {
            listing,
            bid: placement.stored.clone(),
        });

        if placement.auto_finalize {
            self.finalize(listing, bidder)?;
        }
        Ok(())
    }

    /// Refund and clear the bidder's active bid.
    pub fn remove_bid(
        &mut self,
        origin: ActorId,
        listing: ListingId,
        bidder: ActorId,
    ) -> Result<()> {
        self.ensure_registry(origin)?;
        let record = self
            .arena
            .record_mut(listing)
            .ok_or(SettleError::EmptyBid)?;
        let bid = self
            .book
            .remove(self.ledger.as_mut(), record, listing, bidder)?;
        self.emit(SettlementEvent::BidRemoved {
            listing,
            bidder,
            currency: bid.currency,
            amount: bid.amount,
        });
        Ok(())
    }

    /// Accept the stored bid matching `expected` exactly and finalize it.
    pub fn accept_bid(&mut self, origin: ActorId, listing: ListingId, expected: &Bid) -> Result<()> {
        self.ensure_registry(origin)?;
        let record = self
            .arena
            .record_mut(listing)
            .ok_or(SettleError::EmptyBid)?;
        let bid = self.book.accept(record, expected)?;
        self.finalize_taken(listing, bid)
    }

    /// Register a level-gated discount for the listing.
    pub fn set_discount(
        &mut self,
        origin: ActorId,
        listing: ListingId,
        new: Discount,
    ) -> Result<()> {
        self.ensure_registry(origin)?;
        let label = new.level.label.clone();
        let fraction = new.fraction;
        let record = self.arena.entry(listing);
        discount::register_discount(record, self.levels.as_ref(), new)?;
        self.emit(SettlementEvent::DiscountRegistered {
            listing,
            label,
            fraction,
        });
        Ok(())
    }

    /// Configure the listing's eligibility gate. Set-once.
    pub fn set_level_requirement(
        &mut self,
        origin: ActorId,
        listing: ListingId,
        requirement: LevelRequirement,
    ) -> Result<()> {
        self.ensure_registry(origin)?;
        let record = self.arena.entry(listing);
        if record.level_requirement.is_some() {
            return Err(SettleError::AlreadyConfigured {
                what: "level requirement".into(),
            });
        }
        let label = requirement.label.clone();
        record.level_requirement = Some(requirement);
        self.emit(SettlementEvent::LevelRequirementSet { listing, label });
        Ok(())
    }

    // =====================================================================
    // Finalization
    // =====================================================================

    /// Finalize the bidder's active bid: clear the slot, move the value,
    /// release one unit.
    fn finalize(&mut self, listing: ListingId, bidder: ActorId) -> Result<()> {
        let record = self
            .arena
            .record_mut(listing)
            .ok_or(SettleError::EmptyBid)?;
        // Read-and-clear happens-before any external transfer, so nothing
        // re-entering could drain a stale bid.
        let bid = self.book.take(record, bidder)?;
        self.finalize_taken(listing, bid)
    }

    /// Complete finalization for a bid already removed from its slot.
    fn finalize_taken(&mut self, listing: ListingId, bid: Bid) -> Result<()> {
        let escrow = self.config.escrow_account;
        let record = self
            .arena
            .record_mut(listing)
            .ok_or_else(|| SettleError::Internal(format!("no record for {listing}")))?;

        // Value to the recipient. On failure, restore the bid: fail closed.
        if let Err(err) =
            self.ledger
                .transfer(escrow, bid.recipient, bid.currency, bid.amount)
        {
            record.bids.insert(bid.bidder, bid);
            return Err(err);
        }

        // One unit to the bidder. On failure, compensate the value
        // transfer and restore the bid.
        let status = match self
            .vault
            .release_one(self.ledger.as_mut(), record, listing, bid.bidder)
        {
            Ok(status) => status,
            Err(err) => {
                let _ = self
                    .ledger
                    .transfer(bid.recipient, escrow, bid.currency, bid.amount);
                record.bids.insert(bid.bidder, bid);
                return Err(err);
            }
        };

        let fill = record.fills;
        record.fills += 1;
        let settlement = SettlementId::deterministic(listing, fill);

        if status == LotStatus::Exhausted {
            // The trade is already complete; a failed burn signal is
            // surfaced for reconciliation, never rolled back.
            match self.registry.signal_exhausted(listing) {
                Ok(()) => self.emit(SettlementEvent::ListingExhausted { listing }),
                Err(err) => {
                    tracing::warn!(%listing, error = %err, "burn signal failed after finalization");
                    self.emit(SettlementEvent::ExhaustionSignalFailed {
                        listing,
                        reason: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            %listing, %settlement, bidder = %bid.bidder,
            amount = %bid.amount, "bid finalized"
        );
        self.emit(SettlementEvent::BidFinalized {
            listing,
            settlement,
            bid,
        });
        Ok(())
    }

    // =====================================================================
    // Boundary & plumbing
    // =====================================================================

    /// The single origin check at the boundary: only the configured
    /// registry may drive the engine.
    fn ensure_registry(&self, origin: ActorId) -> Result<()> {
        if origin == self.config.registry {
            Ok(())
        } else {
            Err(SettleError::UnauthorizedOrigin)
        }
    }

    fn emit(&mut self, event: SettlementEvent) {
        tracing::debug!(kind = event.kind(), listing = %event.listing(), "event");
        let envelope = EventEnvelope::new(self.event_seq, event);
        self.event_seq += 1;
        self.events.push(envelope);
    }

    /// Drain the buffered audit trail, oldest first.
    pub fn drain_events(&mut self) -> Vec<EventEnvelope> {
        std::mem::take(&mut self.events)
    }

    /// Read access to a listing's record, if any state exists for it.
    #[must_use]
    pub fn record(&self, listing: ListingId) -> Option<&ListingRecord> {
        self.arena.record(listing)
    }

    /// Read access to the token ledger.
    #[must_use]
    pub fn ledger(&self) -> &dyn TokenLedger {
        self.ledger.as_ref()
    }

    /// Mutable access to the token ledger (deposits, test setup).
    pub fn ledger_mut(&mut self) -> &mut dyn TokenLedger {
        self.ledger.as_mut()
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

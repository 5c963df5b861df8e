//! The token-transfer primitive the settlement engine moves value through.
//!
//! The external ledger owns all fungible and item balances. The engine
//! only ever moves value via [`TokenLedger::transfer`]; escrowed balances
//! live under the engine's escrow account like any other holding.

use std::collections::HashMap;

use opensettle_types::{ActorId, AssetId, Result, SettleError};
use rust_decimal::Decimal;

/// The external transfer primitive.
///
/// Implementations MUST be non-reentrant: a `transfer` call must complete
/// without calling back into the settlement engine. The engine's
/// transfer-then-continue flows rely on this — a re-entrant ledger could
/// observe a half-applied operation.
pub trait TokenLedger {
    /// Move `amount` of `asset` from `from` to `to`.
    ///
    /// The amount debited from `from` is exactly `amount`; the amount
    /// credited to `to` may be less for fee-on-transfer assets. Callers
    /// that need the received amount use [`transfer_reporting`].
    ///
    /// # Errors
    /// `InsufficientBalance` or `TransferFailed`; either way no balance
    /// changes.
    fn transfer(
        &mut self,
        from: ActorId,
        to: ActorId,
        asset: AssetId,
        amount: Decimal,
    ) -> Result<()>;

    /// Current balance of `owner` in `asset`.
    fn balance_of(&self, owner: ActorId, asset: AssetId) -> Decimal;
}

/// Fee-aware transfer: snapshots the receiver's balance around the
/// transfer and returns the delta actually received.
///
/// This is how escrowed bid amounts are recorded — the engine never trusts
/// the nominally requested amount.
///
/// # Errors
/// Propagates the underlying transfer error.
pub fn transfer_reporting(
    ledger: &mut dyn TokenLedger,
    from: ActorId,
    to: ActorId,
    asset: AssetId,
    amount: Decimal,
) -> Result<Decimal> {
    let before = ledger.balance_of(to, asset);
    ledger.transfer(from, to, asset, amount)?;
    Ok(ledger.balance_of(to, asset) - before)
}

/// In-memory reference ledger.
///
/// Supports an optional per-asset transfer fee (skimmed in transit) so the
/// fee-aware escrow paths can be exercised in tests.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    /// Per-(owner, asset) balances.
    balances: HashMap<(ActorId, AssetId), Decimal>,
    /// Per-asset fee fraction taken out of every transfer.
    fees: HashMap<AssetId, Decimal>,
}

impl InMemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `owner` with freshly minted `amount` of `asset`.
    pub fn mint(&mut self, owner: ActorId, asset: AssetId, amount: Decimal) {
        *self.balances.entry((owner, asset)).or_default() += amount;
    }

    /// Configure a fee-on-transfer fraction for `asset`.
    ///
    /// # Panics
    /// Panics if `fraction` is outside `[0, 1)` — this is test plumbing,
    /// not a validated input path.
    pub fn set_transfer_fee(&mut self, asset: AssetId, fraction: Decimal) {
        assert!(
            fraction >= Decimal::ZERO && fraction < Decimal::ONE,
            "fee fraction must be in [0, 1)"
        );
        self.fees.insert(asset, fraction);
    }

    /// Total supply of `asset` across all owners.
    #[must_use]
    pub fn total_supply(&self, asset: AssetId) -> Decimal {
        self.balances
            .iter()
            .filter(|((_, a), _)| *a == asset)
            .map(|(_, amount)| *amount)
            .sum()
    }
}

impl TokenLedger for InMemoryLedger {
    fn transfer(
        &mut self,
        from: ActorId,
        to: ActorId,
        asset: AssetId,
        amount: Decimal,
    ) -> Result<()> {
        if amount < Decimal::ZERO {
            return Err(SettleError::TransferFailed {
                reason: "negative amount".into(),
            });
        }
        let available = self.balance_of(from, asset);
        if available < amount {
            return Err(SettleError::InsufficientBalance {
                needed: amount,
                available,
            });
        }

        let fee = self
            .fees
            .get(&asset)
            .map_or(Decimal::ZERO, |fraction| amount * fraction);

        *self.balances.entry((from, asset)).or_default() -= amount;
        *self.balances.entry((to, asset)).or_default() += amount - fee;
        tracing::debug!(%from, %to, %asset, %amount, %fee, "ledger transfer");
        Ok(())
    }

    fn balance_of(&self, owner: ActorId, asset: AssetId) -> Decimal {
        self.balances
            .get(&(owner, asset))
            .copied()
            .unwrap_or_default()
    }
}

/// Shared-handle forwarding for the single-threaded composition model:
/// the engine owns one handle, the embedding test or process keeps
/// another for deposits and balance checks.
impl<L: TokenLedger> TokenLedger for std::rc::Rc<std::cell::RefCell<L>> {
    fn transfer(
        &mut self,
        from: ActorId,
        to: ActorId,
        asset: AssetId,
        amount: Decimal,
    ) -> Result<()> {
        self.borrow_mut().transfer(from, to, asset, amount)
    }

    fn balance_of(&self, owner: ActorId, asset: AssetId) -> Decimal {
        self.borrow().balance_of(owner, asset)
    }
}

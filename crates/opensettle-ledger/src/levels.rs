//! Tiered-membership classification.
//!
//! Tier lists are owned per (setter, token) and kept in ascending
//! threshold order. A holder's level is the LAST tier whose threshold is
//! ≤ the holder's balance — given thresholds [0, 100], a balance of 1000
//! resolves to the 100-threshold tier, not an error, because no tier
//! exceeds it.

use std::collections::HashMap;

use opensettle_types::{ActorId, AssetId, Level, Result, SettleError};
use rust_decimal::Decimal;

/// The external tier registry.
///
/// Implementations MUST be non-reentrant (see `TokenLedger`). Queries take
/// the holder's balance rather than the holder id; callers snapshot the
/// balance from the token ledger.
pub trait LevelRegistry {
    /// Classify `balance` against the tiers `setter` configured for
    /// `token`.
    ///
    /// # Errors
    /// `LevelNotFound` when no tier's threshold is ≤ `balance` (including
    /// when no tiers are configured at all).
    fn level_for_balance(
        &self,
        setter: ActorId,
        token: AssetId,
        balance: Decimal,
    ) -> Result<Level>;

    /// Balance required for the tier named `label`. Returns 0 for an
    /// unknown label — not found is not an error.
    fn required_balance(&self, setter: ActorId, token: AssetId, label: &str) -> Decimal;

    /// Whether a tier named `label` exists for (`setter`, `token`).
    fn tier_exists(&self, setter: ActorId, token: AssetId, label: &str) -> bool;
}

/// In-memory tier registry.
#[derive(Debug, Default)]
pub struct TieredLevelRegistry {
    /// Per-(setter, token) tiers, ascending by threshold.
    tiers: HashMap<(ActorId, AssetId), Vec<Level>>,
}

impl TieredLevelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tier, keeping the list sorted ascending by threshold.
    pub fn register_tier(
        &mut self,
        setter: ActorId,
        token: AssetId,
        label: impl Into<String>,
        threshold: Decimal,
    ) {
        let tiers = self.tiers.entry((setter, token)).or_default();
        let at = tiers.partition_point(|t| t.threshold <= threshold);
        tiers.insert(
            at,
            Level {
                label: label.into(),
                threshold,
            },
        );
    }
}

impl LevelRegistry for TieredLevelRegistry {
    fn level_for_balance(
        &self,
        setter: ActorId,
        token: AssetId,
        balance: Decimal,
    ) -> Result<Level> {
        let tiers = self.tiers.get(&(setter, token));
        // Linear scan: the last tier not exceeding the balance wins.
        let mut found = None;
        for tier in tiers.into_iter().flatten() {
            if tier.threshold <= balance {
                found = Some(tier);
            }
        }
        found
            .cloned()
            .ok_or(SettleError::LevelNotFound { balance })
    }

    fn required_balance(&self, setter: ActorId, token: AssetId, label: &str) -> Decimal {
        self.tiers
            .get(&(setter, token))
            .and_then(|tiers| tiers.iter().find(|t| t.label == label))
            .map_or(Decimal::ZERO, |t| t.threshold)
    }

    fn tier_exists(&self, setter: ActorId, token: AssetId, label: &str) -> bool {
        self.tiers
            .get(&(setter, token))
            .is_some_and(|tiers| tiers.iter().any(|t| t.label == label))
    }
}

/// Shared-handle forwarding, mirroring the `TokenLedger` impl.
impl<R: LevelRegistry> LevelRegistry for std::rc::Rc<std::cell::RefCell<R>> {
    fn level_for_balance(
        &self,
        setter: ActorId,
        token: AssetId,
        balance: Decimal,
    ) -> Result<Level> {
        self.borrow().level_for_balance(setter, token, balance)
    }

    fn required_balance(&self, setter: ActorId, token: AssetId, label: &str) -> Decimal {
        self.borrow().required_balance(setter, token, label)
    }

    fn tier_exists(&self, setter: ActorId, token: AssetId, label: &str) -> bool {
        self.borrow().tier_exists(setter, token, label)
    }
}

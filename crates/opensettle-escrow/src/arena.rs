//! The per-listing record arena.
//!
//! All mutable settlement state lives here: one [`ListingRecord`] per
//! listing, holding its bid slots, ask, item lot, discounts, and level
//! requirement. There is no other shared mutable state in the engine.

use std::collections::HashMap;

use opensettle_types::{ActorId, Ask, Bid, Discount, ItemLot, LevelRequirement, ListingId};

/// Everything the engine tracks for one listing.
#[derive(Debug, Default)]
pub struct ListingRecord {
    /// At most one active bid per bidder.
    pub bids: HashMap<ActorId, Bid>,
    /// Auto-accept threshold in the common unit; `None` = no auto-accept.
    pub ask: Option<Ask>,
    /// The active escrowed item lot, if any.
    pub lot: Option<ItemLot>,
    /// Append-only discount list, in registration order.
    pub discounts: Vec<Discount>,
    /// Optional eligibility gate, set once.
    pub level_requirement: Option<LevelRequirement>,
    /// Count of finalizations so far; feeds deterministic settlement ids.
    pub fills: u64,
}

impl ListingRecord {
    /// Whether the listing currently has sellable inventory.
    #[must_use]
    pub fn has_inventory(&self) -> bool {
        self.lot.as_ref().is_some_and(|lot| lot.quantity > 0)
    }
}

/// Arena of listing records indexed by [`ListingId`].
#[derive(Debug, Default)]
pub struct ListingArena {
    records: HashMap<ListingId, ListingRecord>,
}

impl ListingArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access; `None` if the listing was never touched.
    #[must_use]
    pub fn record(&self, listing: ListingId) -> Option<&ListingRecord> {
        self.records.get(&listing)
    }

    /// Write access to an existing record.
    pub fn record_mut(&mut self, listing: ListingId) -> Option<&mut ListingRecord> {
        self.records.get_mut(&listing)
    }

    /// Write access, creating an empty record on first touch.
    pub fn entry(&mut self, listing: ListingId) -> &mut ListingRecord {
        self.records.entry(listing).or_default()
    }

    /// Number of listings with any state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opensettle_types::{AssetId, LotEntry};
    use rust_decimal::Decimal;

    #[test]
    fn entry_creates_on_first_touch() {
        let mut arena = ListingArena::new();
        assert!(arena.record(ListingId(1)).is_none());
        arena.entry(ListingId(1));
        assert!(arena.record(ListingId(1)).is_some());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn fresh_record_is_blank() {
        let mut arena = ListingArena::new();
        let record = arena.entry(ListingId(1));
        assert!(record.bids.is_empty());
        assert!(record.ask.is_none());
        assert!(record.lot.is_none());
        assert!(record.discounts.is_empty());
        assert!(record.level_requirement.is_none());
        assert!(!record.has_inventory());
    }

    #[test]
    fn has_inventory_tracks_quantity() {
        let mut record = ListingRecord {
            lot: Some(ItemLot {
                merchant: ActorId([1u8; 32]),
                entries: vec![LotEntry {
                    token: AssetId(1),
                    amount: Decimal::ONE,
                }],
                quantity: 1,
            }),
            ..ListingRecord::default()
        };
        assert!(record.has_inventory());
        record.lot.as_mut().unwrap().quantity = 0;
        assert!(!record.has_inventory());
    }
}

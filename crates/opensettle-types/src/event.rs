//! Audit-trail events emitted by the settlement engine.
//!
//! Every externally observable state transition produces a
//! [`SettlementEvent`], wrapped in an [`EventEnvelope`] carrying a
//! time-ordered id, a per-engine sequence number, and a timestamp. The
//! engine buffers envelopes; callers drain them after each operation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ActorId, AssetId, Bid, EventId, ListingId, SettlementId};

/// An observable state transition in the settlement core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementEvent {
    /// An ask was set or overwritten.
    AskSet { listing: ListingId, amount: Decimal },
    /// The ask was removed.
    AskRemoved { listing: ListingId },
    /// An item lot was locked into escrow.
    LotLocked {
        listing: ListingId,
        merchant: ActorId,
        quantity: u64,
    },
    /// A replaced lot was refunded in full to its merchant.
    LotRefunded {
        listing: ListingId,
        merchant: ActorId,
    },
    /// A bid entered the book. `bid.amount` is the escrowed (post-discount,
    /// post-fee) amount.
    BidPlaced { listing: ListingId, bid: Bid },
    /// A discount was applied to a bid before the deposit was pulled.
    DiscountApplied {
        listing: ListingId,
        bidder: ActorId,
        fraction: Decimal,
        amount_off: Decimal,
    },
    /// A bid was refunded — explicit removal or replacement by a new bid.
    BidRemoved {
        listing: ListingId,
        bidder: ActorId,
        currency: AssetId,
        amount: Decimal,
    },
    /// A bid finalized: value to the recipient, one unit to the bidder.
    /// Carries the original bid snapshot.
    BidFinalized {
        listing: ListingId,
        settlement: SettlementId,
        bid: Bid,
    },
    /// The lot's last unit was sold; the listing was signalled for burn.
    ListingExhausted { listing: ListingId },
    /// The burn signal failed after the trade completed. Surfaced for
    /// out-of-band reconciliation — the financial transfer is not rolled
    /// back.
    ExhaustionSignalFailed { listing: ListingId, reason: String },
    /// A discount was registered for a listing.
    DiscountRegistered {
        listing: ListingId,
        label: String,
        fraction: Decimal,
    },
    /// A level requirement was configured for a listing.
    LevelRequirementSet { listing: ListingId, label: String },
}

impl SettlementEvent {
    /// The listing this event concerns.
    #[must_use]
    pub fn listing(&self) -> ListingId {
        match self {
            Self::AskSet { listing, .. }
            | Self::AskRemoved { listing }
            | Self::LotLocked { listing, .. }
            | Self::LotRefunded { listing, .. }
            | Self::BidPlaced { listing, .. }
            | Self::DiscountApplied { listing, .. }
            | Self::BidRemoved { listing, .. }
            | Self::BidFinalized { listing, .. }
            | Self::ListingExhausted { listing }
            | Self::ExhaustionSignalFailed { listing, .. }
            | Self::DiscountRegistered { listing, .. }
            | Self::LevelRequirementSet { listing, .. } => *listing,
        }
    }

    /// Short uppercase tag for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AskSet { .. } => "ASK_SET",
            Self::AskRemoved { .. } => "ASK_REMOVED",
            Self::LotLocked { .. } => "LOT_LOCKED",
            Self::LotRefunded { .. } => "LOT_REFUNDED",
            Self::BidPlaced { .. } => "BID_PLACED",
            Self::DiscountApplied { .. } => "DISCOUNT_APPLIED",
            Self::BidRemoved { .. } => "BID_REMOVED",
            Self::BidFinalized { .. } => "BID_FINALIZED",
            Self::ListingExhausted { .. } => "LISTING_EXHAUSTED",
            Self::ExhaustionSignalFailed { .. } => "EXHAUSTION_SIGNAL_FAILED",
            Self::DiscountRegistered { .. } => "DISCOUNT_REGISTERED",
            Self::LevelRequirementSet { .. } => "LEVEL_REQUIREMENT_SET",
        }
    }
}

/// An event plus its audit metadata. Envelopes form an append-only trail
/// ordered by `seq` within one engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Time-ordered unique id.
    pub id: EventId,
    /// Engine-local monotonic sequence number.
    pub seq: u64,
    /// When the event was recorded.
    pub occurred_at: DateTime<Utc>,
    /// The event itself.
    pub event: SettlementEvent,
}

impl EventEnvelope {
    #[must_use]
    pub fn new(seq: u64, event: SettlementEvent) -> Self {
        Self {
            id: EventId::new(),
            seq,
            occurred_at: Utc::now(),
            event,
        }
    }
}

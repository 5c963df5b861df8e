//! Bid and ask types for the OpenSettle bid book.
//!
//! A [`Bid`] is a buyer's currency deposit held in escrow against a listing.
//! An [`Ask`] is the merchant's minimum acceptable value in the common
//! settlement unit; a bid whose converted value meets it finalizes
//! immediately.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ActorId, AssetId};

/// A buyer's escrowed offer against a listing.
///
/// At most one bid exists per (listing, bidder). Once stored, `amount` is
/// the balance delta the escrow account **actually received** — with
/// fee-on-transfer currencies this can be less than the amount the bidder
/// requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// Who placed the bid (and receives the item on finalization).
    pub bidder: ActorId,
    /// Who receives the bid value on finalization.
    pub recipient: ActorId,
    /// The currency the bid is denominated in.
    pub currency: AssetId,
    /// Escrowed amount in `currency`.
    pub amount: Decimal,
}

impl Bid {
    /// Exact-match comparison used by acceptance: amount, currency, and
    /// recipient must all equal the stored bid. Guards against a bid
    /// changing between submission and acceptance.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.amount == other.amount
            && self.currency == other.currency
            && self.recipient == other.recipient
    }
}

impl std::fmt::Display for Bid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bid[{} {} by {} for {}]",
            self.amount, self.currency, self.bidder, self.recipient,
        )
    }
}

/// A merchant's auto-accept threshold, denominated in the common
/// settlement unit. Absence means "no auto-accept".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ask {
    /// Minimum acceptable converted bid value.
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bid() -> Bid {
        Bid {
            bidder: ActorId([1u8; 32]),
            recipient: ActorId([2u8; 32]),
            currency: AssetId(5),
            amount: Decimal::new(1000, 0),
        }
    }

    #[test]
    fn matches_on_identical_terms() {
        let a = make_bid();
        let b = a.clone();
        assert!(a.matches(&b));
    }

    #[test]
    fn mismatch_on_amount() {
        let a = make_bid();
        let mut b = a.clone();
        b.amount = Decimal::new(999, 0);
        assert!(!a.matches(&b));
    }

    #[test]
    fn mismatch_on_currency() {
        let a = make_bid();
        let mut b = a.clone();
        b.currency = AssetId(6);
        assert!(!a.matches(&b));
    }

    #[test]
    fn mismatch_on_recipient() {
        let a = make_bid();
        let mut b = a.clone();
        b.recipient = ActorId([3u8; 32]);
        assert!(!a.matches(&b));
    }

    #[test]
    fn bidder_not_part_of_match() {
        // Acceptance addresses the slot by bidder; the guard compares the
        // remaining fields only.
        let a = make_bid();
        let mut b = a.clone();
        b.bidder = ActorId([9u8; 32]);
        assert!(a.matches(&b));
    }

    #[test]
    fn bid_serde_roundtrip() {
        let bid = make_bid();
        let json = serde_json::to_string(&bid).unwrap();
        let back: Bid = serde_json::from_str(&json).unwrap();
        assert_eq!(bid, back);
    }

    #[test]
    fn ask_serde_roundtrip() {
        let ask = Ask {
            amount: Decimal::new(100, 0),
        };
        let json = serde_json::to_string(&ask).unwrap();
        let back: Ask = serde_json::from_str(&json).unwrap();
        assert_eq!(ask, back);
    }
}

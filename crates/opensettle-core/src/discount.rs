//! Discount selection — a pure query over a listing's discount list.
//!
//! Registration is append-only. Selection scans linearly and only updates
//! on a strictly greater fraction, so the first-registered discount wins
//! ties; the scan order is part of the contract, not an implementation
//! detail.

use opensettle_escrow::ListingRecord;
use opensettle_ledger::{LevelRegistry, TokenLedger};
use opensettle_types::{ActorId, Discount, Result, SettleError, constants};

/// The best discount `bidder` is eligible for, if any.
///
/// A discount is a candidate when the bidder's current level on the
/// discount's (setter, token) pair carries exactly (byte-equal) the
/// required label. Among candidates the greatest fraction wins; equal
/// fractions keep the earliest registration. Never mutates state.
#[must_use]
pub fn best_discount(
    discounts: &[Discount],
    ledger: &dyn TokenLedger,
    levels: &dyn LevelRegistry,
    bidder: ActorId,
) -> Option<Discount> {
    let mut best: Option<&Discount> = None;
    for discount in discounts {
        let balance = ledger.balance_of(bidder, discount.level.token);
        let Ok(level) =
            levels.level_for_balance(discount.level.setter, discount.level.token, balance)
        else {
            // Bidder holds no level at all on this pair: not a candidate.
            continue;
        };
        if level.label != discount.level.label {
            continue;
        }
        if best.is_none_or(|b| discount.fraction > b.fraction) {
            best = Some(discount);
        }
    }
    best.cloned()
}

/// Append a discount to the listing's list.
///
/// # Errors
/// `InvalidDiscount` if the fraction is outside `[0, 1)` or the listing's
/// list is full; `UnknownLevel` unless the registry knows the required
/// tier label.
pub fn register_discount(
    record: &mut ListingRecord,
    levels: &dyn LevelRegistry,
    discount: Discount,
) -> Result<()> {
    discount.validate()?;
    if record.discounts.len() >= constants::MAX_DISCOUNTS_PER_LISTING {
        return Err(SettleError::InvalidDiscount {
            reason: format!(
                "listing already has {} discounts",
                constants::MAX_DISCOUNTS_PER_LISTING
            ),
        });
    }
    if !levels.tier_exists(
        discount.level.setter,
        discount.level.token,
        &discount.level.label,
    ) {
        return Err(SettleError::UnknownLevel {
            label: discount.level.label.clone(),
        });
    }
    record.discounts.push(discount);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opensettle_ledger::{InMemoryLedger, TieredLevelRegistry};
    use opensettle_types::{AssetId, LevelRequirement};
    use rust_decimal::Decimal;

    const TOKEN: AssetId = AssetId(3);

    struct Fixture {
        ledger: InMemoryLedger,
        levels: TieredLevelRegistry,
        setter: ActorId,
        bidder: ActorId,
    }

    fn setup() -> Fixture {
        let setter = ActorId::random();
        let bidder = ActorId::random();
        let mut levels = TieredLevelRegistry::new();
        levels.register_tier(setter, TOKEN, "bronze", Decimal::ZERO);
        levels.register_tier(setter, TOKEN, "gold", Decimal::new(100, 0));
        let mut ledger = InMemoryLedger::new();
        ledger.mint(bidder, TOKEN, Decimal::new(150, 0)); // gold
        Fixture {
            ledger,
            levels,
            setter,
            bidder,
        }
    }

    fn discount(fx: &Fixture, label: &str, fraction: Decimal) -> Discount {
        Discount {
            level: LevelRequirement {
                setter: fx.setter,
                token: TOKEN,
                label: label.into(),
            },
            fraction,
        }
    }

    #[test]
    fn eligible_label_is_candidate() {
        let fx = setup();
        let discounts = vec![discount(&fx, "gold", Decimal::new(10, 2))];
        let best = best_discount(&discounts, &fx.ledger, &fx.levels, fx.bidder).unwrap();
        assert_eq!(best.fraction, Decimal::new(10, 2));
    }

    #[test]
    fn wrong_level_is_skipped() {
        let fx = setup();
        // Bidder is gold, not bronze: a bronze-gated discount doesn't apply.
        let discounts = vec![discount(&fx, "bronze", Decimal::new(50, 2))];
        assert!(best_discount(&discounts, &fx.ledger, &fx.levels, fx.bidder).is_none());
    }

    #[test]
    fn greatest_fraction_wins() {
        let fx = setup();
        let discounts = vec![
            discount(&fx, "gold", Decimal::new(5, 2)),
            discount(&fx, "gold", Decimal::new(20, 2)),
            discount(&fx, "gold", Decimal::new(10, 2)),
        ];
        let best = best_discount(&discounts, &fx.ledger, &fx.levels, fx.bidder).unwrap();
        assert_eq!(best.fraction, Decimal::new(20, 2));
    }

    #[test]
    fn ties_keep_first_registered() {
        let mut fx = setup();
        let other_setter = ActorId::random();
        fx.levels
            .register_tier(other_setter, TOKEN, "gold", Decimal::new(100, 0));

        // Same fraction, distinguishable by setter: the earlier one wins.
        let first = discount(&fx, "gold", Decimal::new(10, 2));
        let mut second = discount(&fx, "gold", Decimal::new(10, 2));
        second.level.setter = other_setter;

        let discounts = vec![first.clone(), second];
        let best = best_discount(&discounts, &fx.ledger, &fx.levels, fx.bidder).unwrap();
        assert_eq!(best.level.setter, first.level.setter);
    }

    #[test]
    fn no_tiers_no_candidates() {
        let fx = setup();
        let stranger = ActorId::random();
        let mut d = discount(&fx, "gold", Decimal::new(10, 2));
        d.level.setter = stranger; // no tiers registered under this setter
        assert!(best_discount(&[d], &fx.ledger, &fx.levels, fx.bidder).is_none());
    }

    #[test]
    fn register_unknown_label_fails() {
        let fx = setup();
        let mut record = ListingRecord::default();
        let err = register_discount(
            &mut record,
            &fx.levels,
            discount(&fx, "platinum", Decimal::new(10, 2)),
        )
        .unwrap_err();
        assert!(matches!(err, SettleError::UnknownLevel { .. }));
        assert!(record.discounts.is_empty());
    }

    #[test]
    fn register_bad_fraction_fails() {
        let fx = setup();
        let mut record = ListingRecord::default();
        let err = register_discount(
            &mut record,
            &fx.levels,
            discount(&fx, "gold", Decimal::ONE),
        )
        .unwrap_err();
        assert!(matches!(err, SettleError::InvalidDiscount { .. }));
    }

    #[test]
    fn register_appends_in_order() {
        let fx = setup();
        let mut record = ListingRecord::default();
        register_discount(&mut record, &fx.levels, discount(&fx, "gold", Decimal::new(5, 2)))
            .unwrap();
        register_discount(&mut record, &fx.levels, discount(&fx, "bronze", Decimal::new(7, 2)))
            .unwrap();
        assert_eq!(record.discounts.len(), 2);
        assert_eq!(record.discounts[0].fraction, Decimal::new(5, 2));
    }

    #[test]
    fn register_caps_per_listing() {
        let fx = setup();
        let mut record = ListingRecord::default();
        for _ in 0..opensettle_types::constants::MAX_DISCOUNTS_PER_LISTING {
            register_discount(
                &mut record,
                &fx.levels,
                discount(&fx, "gold", Decimal::new(1, 2)),
            )
            .unwrap();
        }
        let err = register_discount(
            &mut record,
            &fx.levels,
            discount(&fx, "gold", Decimal::new(1, 2)),
        )
        .unwrap_err();
        assert!(matches!(err, SettleError::InvalidDiscount { .. }));
    }
}
